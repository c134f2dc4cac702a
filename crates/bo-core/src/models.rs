//! Case classification enums.
//!
//! Subject type, case type and record status are stored as integer codes.
//! Each enum has two total, inverse mappings: label <-> variant and
//! code <-> variant. Unknown labels and unknown codes are errors.

use serde::{Deserialize, Serialize};

use crate::error::Error;

// =============================================================================
// SUBJECT TYPE
// =============================================================================

/// Kind of entity a case refers to.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum SubjectType {
    Individual,
    Company,
    Organization,
}

impl SubjectType {
    /// Every subject type, in code order. Used when no filter is selected.
    pub const ALL: [SubjectType; 3] = [Self::Individual, Self::Company, Self::Organization];

    /// Integer code stored in `cases.subject_type`.
    pub fn code(self) -> i32 {
        match self {
            Self::Individual => 1,
            Self::Company => 2,
            Self::Organization => 3,
        }
    }

    /// Canonical display label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Individual => "individual",
            Self::Company => "company",
            Self::Organization => "organization",
        }
    }
}

impl std::fmt::Display for SubjectType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for SubjectType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "individual" => Ok(Self::Individual),
            "company" => Ok(Self::Company),
            "organization" => Ok(Self::Organization),
            _ => Err(format!("Invalid subject type: {}", s)),
        }
    }
}

impl TryFrom<i32> for SubjectType {
    type Error = Error;
    fn try_from(code: i32) -> std::result::Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| Error::DataIntegrity(format!("unknown subject type code {}", code)))
    }
}

// =============================================================================
// CASE TYPE
// =============================================================================

/// Classification of a case.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum CaseType {
    Verdict,
    Blacklist,
    Sanction,
}

impl CaseType {
    /// Default case types, in code order. Used when no filter is selected.
    pub const ALL: [CaseType; 3] = [Self::Verdict, Self::Blacklist, Self::Sanction];

    /// Integer code stored in `cases.case_type`.
    pub fn code(self) -> i32 {
        match self {
            Self::Verdict => 1,
            Self::Blacklist => 2,
            Self::Sanction => 3,
        }
    }

    /// Canonical display label.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Verdict => "verdict",
            Self::Blacklist => "blacklist",
            Self::Sanction => "sanction",
        }
    }
}

impl std::fmt::Display for CaseType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

impl std::str::FromStr for CaseType {
    type Err = String;
    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "verdict" => Ok(Self::Verdict),
            "blacklist" => Ok(Self::Blacklist),
            "sanction" => Ok(Self::Sanction),
            _ => Err(format!("Invalid case type: {}", s)),
        }
    }
}

impl TryFrom<i32> for CaseType {
    type Error = Error;
    fn try_from(code: i32) -> std::result::Result<Self, Self::Error> {
        Self::ALL
            .into_iter()
            .find(|t| t.code() == code)
            .ok_or_else(|| Error::DataIntegrity(format!("unknown case type code {}", code)))
    }
}

// =============================================================================
// CASE STATUS
// =============================================================================

/// Review status of a case record. Only validated cases are searchable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
#[serde(rename_all = "snake_case")]
pub enum CaseStatus {
    Draft,
    WaitingForApproval,
    Validated,
    Rejected,
}

impl CaseStatus {
    /// Status a case must have to appear in search results.
    pub const SEARCHABLE: CaseStatus = CaseStatus::Validated;

    /// Integer code stored in `cases.status`.
    pub fn code(self) -> i32 {
        match self {
            Self::Draft => 1,
            Self::WaitingForApproval => 2,
            Self::Validated => 3,
            Self::Rejected => 4,
        }
    }
}
