//! Case search request and response types.
//!
//! A [`SearchRequest`] arrives already validated from an outer layer. Rows
//! scanned from the database become [`RawResultRecord`]s, which are mapped
//! into [`SearchResultItem`]s and wrapped in a [`PaginatedResponse`].

use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::defaults::{FIRST_PAGE, PAGE_SIZE};
use crate::error::Result;
use crate::models::{CaseType, SubjectType};

// =============================================================================
// REQUEST
// =============================================================================

/// Free-text query plus categorical filters.
///
/// Empty filter lists mean "match every value in that dimension".
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SearchRequest {
    #[serde(default)]
    pub query: String,
    #[serde(default)]
    pub subject_types: Vec<String>,
    /// Case type labels.
    #[serde(default)]
    pub types: Vec<String>,
    #[serde(default)]
    pub nations: Vec<String>,
    #[serde(default)]
    pub years: Vec<String>,
    /// 1-based page number.
    #[serde(default = "default_page")]
    pub page: i64,
}

fn default_page() -> i64 {
    FIRST_PAGE
}

impl Default for SearchRequest {
    fn default() -> Self {
        Self {
            query: String::new(),
            subject_types: Vec::new(),
            types: Vec::new(),
            nations: Vec::new(),
            years: Vec::new(),
            page: FIRST_PAGE,
        }
    }
}

impl SearchRequest {
    /// Create a request for the given query on the first page.
    pub fn new(query: impl Into<String>) -> Self {
        Self {
            query: query.into(),
            ..Default::default()
        }
    }

    pub fn with_subject_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.subject_types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_types<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.types = types.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_nations<I, S>(mut self, nations: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.nations = nations.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_years<I, S>(mut self, years: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.years = years.into_iter().map(Into::into).collect();
        self
    }

    pub fn with_page(mut self, page: i64) -> Self {
        self.page = page;
        self
    }

    /// Whether a free-text query was supplied.
    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }
}

// =============================================================================
// ROWS
// =============================================================================

/// One scanned `cases` row, with enum columns still as stored codes.
#[derive(Debug, Clone, PartialEq)]
pub struct RawResultRecord {
    pub id: Uuid,
    pub subject: String,
    pub subject_type: i32,
    pub person_in_charge: Option<String>,
    pub beneficiary_ownership: Option<String>,
    pub nation: String,
    pub case_type: i32,
    /// Free-form year; may be a range or partial value.
    pub year: String,
    pub rank: f32,
}

/// A search hit with enum codes replaced by their display labels.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct SearchResultItem {
    pub id: Uuid,
    pub subject: String,
    pub subject_type: SubjectType,
    pub person_in_charge: Option<String>,
    #[serde(alias = "benificiary_ownership")]
    pub beneficiary_ownership: Option<String>,
    pub nation: String,
    #[serde(rename = "type")]
    pub case_type: CaseType,
    pub year: String,
}

impl TryFrom<RawResultRecord> for SearchResultItem {
    type Error = crate::error::Error;

    /// Decode stored codes. An unknown code is a data integrity error.
    fn try_from(raw: RawResultRecord) -> Result<Self> {
        Ok(Self {
            id: raw.id,
            subject: raw.subject,
            subject_type: SubjectType::try_from(raw.subject_type)?,
            person_in_charge: raw.person_in_charge,
            beneficiary_ownership: raw.beneficiary_ownership,
            nation: raw.nation,
            case_type: CaseType::try_from(raw.case_type)?,
            year: raw.year,
        })
    }
}

// =============================================================================
// PAGINATION
// =============================================================================

/// Pagination metadata derived from the count result and the page size.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PaginationMeta {
    pub current_page: i64,
    pub last_page: i64,
    pub per_page: i64,
    pub total: i64,
}

impl PaginationMeta {
    /// Build metadata for `total` matching rows; `last_page` is
    /// `ceil(total / per_page)`.
    pub fn new(current_page: i64, total: i64, per_page: i64) -> Self {
        let last_page = if per_page > 0 {
            (total + per_page - 1) / per_page
        } else {
            0
        };
        Self {
            current_page,
            last_page,
            per_page,
            total,
        }
    }

    /// Metadata for the fixed search page size.
    pub fn for_search(current_page: i64, total: i64) -> Self {
        Self::new(current_page, total, PAGE_SIZE)
    }
}

/// One page of search hits.
///
/// "No rows" is represented by [`PaginatedResponse::EMPTY`], which carries
/// no metadata at all.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, utoipa::ToSchema)]
pub struct PaginatedResponse {
    pub data: Vec<SearchResultItem>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub meta: Option<PaginationMeta>,
}

impl PaginatedResponse {
    /// The empty sentinel.
    pub const EMPTY: PaginatedResponse = PaginatedResponse {
        data: Vec::new(),
        meta: None,
    };

    /// A populated page.
    pub fn page(data: Vec<SearchResultItem>, meta: PaginationMeta) -> Self {
        Self {
            data,
            meta: Some(meta),
        }
    }

    pub fn is_empty(&self) -> bool {
        self.meta.is_none() && self.data.is_empty()
    }
}
