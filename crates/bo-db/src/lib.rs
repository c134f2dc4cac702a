//! # bo-db
//!
//! PostgreSQL layer for beneficiary-ownership case search.
//!
//! This crate provides:
//! - Filter normalization into bindable values
//! - A shared-predicate builder for the count and ranked select statements
//! - Execution of both statements inside a caller-supplied transaction
//! - Connection pool management and environment configuration
//!
//! ## Example
//!
//! ```rust,ignore
//! use bo_db::{create_pool, PgCaseSearch, SearchRequest};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let pool = create_pool("postgres://localhost/bo").await?;
//!     let search = PgCaseSearch::new(pool.clone());
//!
//!     let mut tx = pool.begin().await?;
//!     let page = search
//!         .search_tx(&mut tx, &SearchRequest::new("fraud").with_years(["2020"]))
//!         .await?;
//!     tx.commit().await?;
//!
//!     println!("{} results", page.data.len());
//!     Ok(())
//! }
//! ```
pub mod case_filter;
pub mod config;
pub mod normalize;
pub mod pool;
pub mod search;

// Test fixtures for integration tests
// Note: Always compiled so integration tests (in tests/) can use DEFAULT_TEST_DATABASE_URL
pub mod test_fixtures;

// Re-export core types
pub use bo_core::*;

pub use case_filter::{CasePredicate, CaseSearchPlan, CaseSearchQueryBuilder, QueryParam};
pub use config::{DatabaseConfig, PoolConfig};
pub use normalize::{
    normalize_case_types, normalize_nations, normalize_subject_types, normalize_years,
    NormalizedFilters,
};
pub use pool::{create_pool, create_pool_with_config, pool_options};
pub use search::{execute_plan, CaseSearchBackend, PgCaseSearch, TxBackend};
