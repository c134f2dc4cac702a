//! Centralized default constants for case search.
//!
//! Crates reference these constants instead of defining their own magic
//! numbers.

// =============================================================================
// PAGINATION
// =============================================================================

/// Fixed page size for case search results.
pub const PAGE_SIZE: i64 = 20;

/// First page number (pages are 1-based).
pub const FIRST_PAGE: i64 = 1;

// =============================================================================
// FULL-TEXT SEARCH
// =============================================================================

/// Text search configuration used for `phraseto_tsquery`.
pub const TEXT_SEARCH_CONFIG: &str = "english";

/// `ts_rank_cd` normalization flag 32: divides the rank by itself + 1.
pub const RANK_NORMALIZATION: i32 = 32;

/// Column holding the precomputed tsvector of a case.
pub const FULLTEXT_INDEX_COLUMN: &str = "fulltext_search_index";

/// Table holding case records.
pub const CASES_TABLE: &str = "cases";

// =============================================================================
// DATABASE
// =============================================================================

/// Default maximum number of connections in the pool.
pub const DB_MAX_CONNECTIONS: u32 = 10;

/// Default connection acquire timeout in seconds.
pub const DB_CONNECT_TIMEOUT_SECS: u64 = 30;

/// Default idle connection timeout in seconds.
pub const DB_IDLE_TIMEOUT_SECS: u64 = 600;
