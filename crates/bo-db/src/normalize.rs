//! Filter normalization.
//!
//! Converts caller-supplied filter lists into the scalar or array forms the
//! case search query binds. Pure functions, no I/O.
//!
//! Year and nation lists become a single `|`-joined pattern matched with
//! `~*` (case-insensitive POSIX regex). Entries are not escaped, so regex
//! metacharacters in an entry keep their regex meaning. An empty list yields
//! an empty pattern, and `col ~* ''` matches every non-null value: no filter
//! selected means "all years" / "all nations".
//!
//! Subject and case type lists become arrays of stored codes. An empty list
//! expands to every known type; an unknown label fails the request.

use bo_core::{CaseStatus, CaseType, Error, Result, SearchRequest, SubjectType};

/// Alternation delimiter for year/nation patterns.
pub const PATTERN_DELIMITER: &str = "|";

/// Join year filters into one case-insensitive regex pattern.
pub fn normalize_years(years: &[String]) -> String {
    years.join(PATTERN_DELIMITER)
}

/// Join nation filters into one case-insensitive regex pattern.
pub fn normalize_nations(nations: &[String]) -> String {
    nations.join(PATTERN_DELIMITER)
}

/// Resolve subject type labels to stored codes.
pub fn normalize_subject_types(subject_types: &[String]) -> Result<Vec<i32>> {
    if subject_types.is_empty() {
        return Ok(SubjectType::ALL.iter().map(|t| t.code()).collect());
    }
    subject_types
        .iter()
        .map(|label| {
            label
                .parse::<SubjectType>()
                .map(SubjectType::code)
                .map_err(Error::Normalization)
        })
        .collect()
}

/// Resolve case type labels to stored codes.
pub fn normalize_case_types(case_types: &[String]) -> Result<Vec<i32>> {
    if case_types.is_empty() {
        return Ok(CaseType::ALL.iter().map(|t| t.code()).collect());
    }
    case_types
        .iter()
        .map(|label| {
            label
                .parse::<CaseType>()
                .map(CaseType::code)
                .map_err(Error::Normalization)
        })
        .collect()
}

/// Every filter value of a request in its bindable form.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NormalizedFilters {
    pub query: String,
    pub subject_types: Vec<i32>,
    pub year_pattern: String,
    pub case_types: Vec<i32>,
    pub nation_pattern: String,
    pub status: i32,
}

impl NormalizedFilters {
    pub fn from_request(req: &SearchRequest) -> Result<Self> {
        Ok(Self {
            query: req.query.clone(),
            subject_types: normalize_subject_types(&req.subject_types)?,
            year_pattern: normalize_years(&req.years),
            case_types: normalize_case_types(&req.types)?,
            nation_pattern: normalize_nations(&req.nations),
            status: CaseStatus::SEARCHABLE.code(),
        })
    }

    pub fn has_query(&self) -> bool {
        !self.query.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn test_years_joined_with_alternation() {
        assert_eq!(normalize_years(&strings(&["2019", "2020"])), "2019|2020");
        assert_eq!(normalize_years(&strings(&["2018"])), "2018");
    }

    #[test]
    fn test_empty_years_yield_empty_pattern() {
        assert_eq!(normalize_years(&[]), "");
        assert_eq!(normalize_nations(&[]), "");
    }

    #[test]
    fn test_nations_are_not_escaped() {
        assert_eq!(
            normalize_nations(&strings(&["Indonesia", "U.S.A", "Korea (South)"])),
            "Indonesia|U.S.A|Korea (South)"
        );
    }

    #[test]
    fn test_empty_subject_types_expand_to_all() {
        assert_eq!(normalize_subject_types(&[]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_empty_case_types_expand_to_all() {
        assert_eq!(normalize_case_types(&[]).unwrap(), vec![1, 2, 3]);
    }

    #[test]
    fn test_subject_types_resolved_in_order() {
        let codes = normalize_subject_types(&strings(&["organization", "individual"])).unwrap();
        assert_eq!(
            codes,
            vec![
                SubjectType::Organization.code(),
                SubjectType::Individual.code()
            ]
        );
    }

    #[test]
    fn test_case_types_resolved() {
        let codes = normalize_case_types(&strings(&["blacklist"])).unwrap();
        assert_eq!(codes, vec![CaseType::Blacklist.code()]);
    }

    #[test]
    fn test_unknown_subject_type_fails() {
        let err = normalize_subject_types(&strings(&["individual", "trust"])).unwrap_err();
        match err {
            Error::Normalization(msg) => assert!(msg.contains("trust")),
            other => panic!("Expected Normalization error, got {:?}", other),
        }
    }

    #[test]
    fn test_unknown_case_type_fails() {
        assert!(matches!(
            normalize_case_types(&strings(&["indictment"])),
            Err(Error::Normalization(_))
        ));
    }

    #[test]
    fn test_from_request_defaults() {
        let filters = NormalizedFilters::from_request(&SearchRequest::default()).unwrap();
        assert!(!filters.has_query());
        assert_eq!(filters.subject_types, vec![1, 2, 3]);
        assert_eq!(filters.case_types, vec![1, 2, 3]);
        assert_eq!(filters.year_pattern, "");
        assert_eq!(filters.nation_pattern, "");
        assert_eq!(filters.status, CaseStatus::Validated.code());
    }

    #[test]
    fn test_from_request_propagates_normalization_error() {
        let req = SearchRequest::new("fraud").with_types(["verdict", "bogus"]);
        assert!(matches!(
            NormalizedFilters::from_request(&req),
            Err(Error::Normalization(_))
        ));
    }
}
