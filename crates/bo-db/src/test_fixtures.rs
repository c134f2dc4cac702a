//! Test fixtures for database integration tests.
//!
//! Tests run inside a transaction that is rolled back at the end. The
//! transaction creates a temporary `cases` table, which shadows any
//! permanent table of the same name for its lifetime, so fixtures never
//! touch real data.
//!
//! ## Configuration
//!
//! The test database URL is configured via the `DATABASE_URL` environment variable.
//! If not set, defaults to [`DEFAULT_TEST_DATABASE_URL`].
//!
//! ## Usage
//!
//! ```rust,ignore
//! use bo_db::test_fixtures::{begin_with_cases_table, test_pool, CaseFixture};
//!
//! #[tokio::test]
//! async fn test_something() {
//!     let pool = test_pool().await;
//!     let mut tx = begin_with_cases_table(&pool).await;
//!     CaseFixture::new("ACME Corp").insert(&mut tx).await;
//!
//!     // Run your tests...
//!
//!     tx.rollback().await.unwrap();
//! }
//! ```

use sqlx::{PgPool, Postgres, Transaction};
use uuid::Uuid;

use bo_core::{CaseStatus, CaseType, SubjectType};

use crate::pool::create_pool;

/// Default test database URL when DATABASE_URL is not set.
pub const DEFAULT_TEST_DATABASE_URL: &str = "postgres://bo:bo@localhost:15432/bo_test";

const CREATE_TEMP_CASES_TABLE: &str = r#"
    CREATE TEMPORARY TABLE cases (
        id uuid PRIMARY KEY,
        subject text NOT NULL,
        subject_type integer NOT NULL,
        person_in_charge text,
        beneficiary_ownership text,
        nation text NOT NULL,
        case_type integer NOT NULL,
        year text NOT NULL,
        summary text NOT NULL DEFAULT '',
        status integer NOT NULL,
        fulltext_search_index tsvector GENERATED ALWAYS AS (
            to_tsvector('english',
                subject || ' ' || coalesce(beneficiary_ownership, '') || ' ' || summary)
        ) STORED
    ) ON COMMIT DROP
"#;

/// Connect to the test database.
pub async fn test_pool() -> PgPool {
    let database_url = std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| DEFAULT_TEST_DATABASE_URL.to_string());
    create_pool(&database_url)
        .await
        .expect("Failed to create test pool")
}

/// Begin a transaction containing an empty temporary `cases` table.
pub async fn begin_with_cases_table(pool: &PgPool) -> Transaction<'static, Postgres> {
    let mut tx = pool.begin().await.expect("Failed to begin transaction");
    sqlx::query(CREATE_TEMP_CASES_TABLE)
        .execute(&mut *tx)
        .await
        .expect("Failed to create temporary cases table");
    tx
}

/// Builder for one case row.
#[derive(Debug, Clone)]
pub struct CaseFixture {
    pub id: Uuid,
    pub subject: String,
    pub subject_type: SubjectType,
    pub person_in_charge: Option<String>,
    pub beneficiary_ownership: Option<String>,
    pub nation: String,
    pub case_type: CaseType,
    pub year: String,
    pub summary: String,
    pub status: CaseStatus,
}

impl CaseFixture {
    /// A validated verdict against an individual in Indonesia, 2020.
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            id: Uuid::new_v4(),
            subject: subject.into(),
            subject_type: SubjectType::Individual,
            person_in_charge: None,
            beneficiary_ownership: None,
            nation: "Indonesia".to_string(),
            case_type: CaseType::Verdict,
            year: "2020".to_string(),
            summary: String::new(),
            status: CaseStatus::Validated,
        }
    }

    pub fn subject_type(mut self, subject_type: SubjectType) -> Self {
        self.subject_type = subject_type;
        self
    }

    pub fn case_type(mut self, case_type: CaseType) -> Self {
        self.case_type = case_type;
        self
    }

    pub fn nation(mut self, nation: impl Into<String>) -> Self {
        self.nation = nation.into();
        self
    }

    pub fn year(mut self, year: impl Into<String>) -> Self {
        self.year = year.into();
        self
    }

    pub fn summary(mut self, summary: impl Into<String>) -> Self {
        self.summary = summary.into();
        self
    }

    pub fn beneficiary_ownership(mut self, owner: impl Into<String>) -> Self {
        self.beneficiary_ownership = Some(owner.into());
        self
    }

    pub fn person_in_charge(mut self, person: impl Into<String>) -> Self {
        self.person_in_charge = Some(person.into());
        self
    }

    pub fn status(mut self, status: CaseStatus) -> Self {
        self.status = status;
        self
    }

    /// Insert into the transaction's `cases` table and return the row id.
    pub async fn insert(&self, tx: &mut Transaction<'_, Postgres>) -> Uuid {
        sqlx::query(
            r#"
            INSERT INTO cases (
                id, subject, subject_type, person_in_charge, beneficiary_ownership,
                nation, case_type, year, summary, status
            )
            VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(self.id)
        .bind(&self.subject)
        .bind(self.subject_type.code())
        .bind(&self.person_in_charge)
        .bind(&self.beneficiary_ownership)
        .bind(&self.nation)
        .bind(self.case_type.code())
        .bind(&self.year)
        .bind(&self.summary)
        .bind(self.status.code())
        .execute(&mut **tx)
        .await
        .expect("Failed to insert case fixture");
        self.id
    }
}

/// Insert a row with a raw subject type code, bypassing the enum.
pub async fn insert_raw_subject_type(tx: &mut Transaction<'_, Postgres>, code: i32) -> Uuid {
    let id = Uuid::new_v4();
    sqlx::query(
        r#"
        INSERT INTO cases (id, subject, subject_type, nation, case_type, year, status)
        VALUES ($1, 'Corrupted row', $2, 'Indonesia', $3, '2020', $4)
        "#,
    )
    .bind(id)
    .bind(code)
    .bind(CaseType::Verdict.code())
    .bind(CaseStatus::Validated.code())
    .execute(&mut **tx)
    .await
    .expect("Failed to insert raw case row");
    id
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_fixture_defaults_are_searchable() {
        let case = CaseFixture::new("ACME");
        assert_eq!(case.status, CaseStatus::Validated);
        assert_eq!(case.subject_type, SubjectType::Individual);
        assert_eq!(case.case_type, CaseType::Verdict);
    }

    #[test]
    fn test_fixture_builder() {
        let case = CaseFixture::new("ACME")
            .subject_type(SubjectType::Company)
            .year("2018-2019")
            .status(CaseStatus::Draft);
        assert_eq!(case.subject_type, SubjectType::Company);
        assert_eq!(case.year, "2018-2019");
        assert_eq!(case.status, CaseStatus::Draft);
    }

    #[tokio::test]
    #[ignore] // Requires DATABASE_URL
    async fn test_temp_table_is_created() {
        let pool = test_pool().await;
        let mut tx = begin_with_cases_table(&pool).await;
        CaseFixture::new("ACME").insert(&mut tx).await;
        let count: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM cases")
            .fetch_one(&mut *tx)
            .await
            .unwrap();
        assert_eq!(count, 1);
        tx.rollback().await.unwrap();
    }
}
