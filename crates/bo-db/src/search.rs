//! Case search execution.
//!
//! Runs the count statement, short-circuits on zero matches, then streams
//! the select statement's rows inside the same caller-supplied transaction
//! and maps them into a [`PaginatedResponse`].
//!
//! Between the two statements a concurrent writer may delete or unpublish
//! rows. When the select then yields nothing despite a positive count, the
//! empty sentinel is returned; the window is accepted and never retried.

use std::time::Instant;

use async_trait::async_trait;
use futures::TryStreamExt;
use sqlx::postgres::{PgArguments, PgRow};
use sqlx::query::Query;
use sqlx::{Pool, Postgres, Row, Transaction};
use tracing::{debug, error, info, trace};

use bo_core::{
    Error, PaginatedResponse, PaginationMeta, RawResultRecord, Result, SearchRequest,
    SearchResultItem,
};

use crate::case_filter::{CaseSearchPlan, QueryParam};

/// Statement execution seam for the case search sequence.
///
/// The PostgreSQL implementation is [`TxBackend`]; tests substitute a
/// recording backend.
#[async_trait]
pub trait CaseSearchBackend: Send {
    /// Run a count statement and return its single `cnt` column.
    async fn count(&mut self, sql: &str, params: &[QueryParam]) -> Result<i64>;

    /// Run a select statement and scan every row.
    async fn fetch_records(
        &mut self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<RawResultRecord>>;
}

/// Bind parameters in placeholder order.
fn bind_params<'q>(
    mut query: Query<'q, Postgres, PgArguments>,
    params: &'q [QueryParam],
) -> Query<'q, Postgres, PgArguments> {
    for param in params {
        query = match param {
            QueryParam::Text(value) => query.bind(value.as_str()),
            QueryParam::IntArray(values) => query.bind(values.as_slice()),
            QueryParam::Int(value) => query.bind(*value),
            QueryParam::BigInt(value) => query.bind(*value),
        };
    }
    query
}

fn scan_err(column: &str, e: sqlx::Error) -> Error {
    Error::Scan(format!("column {}: {}", column, e))
}

/// Decode one select row into a [`RawResultRecord`].
pub fn scan_record(row: &PgRow) -> Result<RawResultRecord> {
    Ok(RawResultRecord {
        id: row.try_get("id").map_err(|e| scan_err("id", e))?,
        subject: row.try_get("subject").map_err(|e| scan_err("subject", e))?,
        subject_type: row
            .try_get("subject_type")
            .map_err(|e| scan_err("subject_type", e))?,
        person_in_charge: row
            .try_get("person_in_charge")
            .map_err(|e| scan_err("person_in_charge", e))?,
        beneficiary_ownership: row
            .try_get("beneficiary_ownership")
            .map_err(|e| scan_err("beneficiary_ownership", e))?,
        nation: row.try_get("nation").map_err(|e| scan_err("nation", e))?,
        case_type: row
            .try_get("case_type")
            .map_err(|e| scan_err("case_type", e))?,
        year: row.try_get("year").map_err(|e| scan_err("year", e))?,
        rank: row.try_get("rank").map_err(|e| scan_err("rank", e))?,
    })
}

/// [`CaseSearchBackend`] over an externally managed transaction.
///
/// Never begins, commits or rolls back; the caller owns the transaction.
pub struct TxBackend<'a, 'c> {
    tx: &'a mut Transaction<'c, Postgres>,
}

impl<'a, 'c> TxBackend<'a, 'c> {
    pub fn new(tx: &'a mut Transaction<'c, Postgres>) -> Self {
        Self { tx }
    }
}

#[async_trait]
impl<'a, 'c> CaseSearchBackend for TxBackend<'a, 'c> {
    async fn count(&mut self, sql: &str, params: &[QueryParam]) -> Result<i64> {
        let row = bind_params(sqlx::query(sql), params)
            .fetch_one(&mut **self.tx)
            .await
            .map_err(Error::Database)?;
        row.try_get("cnt").map_err(|e| scan_err("cnt", e))
    }

    async fn fetch_records(
        &mut self,
        sql: &str,
        params: &[QueryParam],
    ) -> Result<Vec<RawResultRecord>> {
        // The cursor lives in `rows` and is released when it drops, including
        // on the early returns below.
        let mut rows = bind_params(sqlx::query(sql), params).fetch(&mut **self.tx);
        let mut records = Vec::new();
        while let Some(row) = rows.try_next().await.map_err(Error::Database)? {
            let record = scan_record(&row)?;
            trace!(
                subsystem = "search",
                component = "case_search",
                case_id = %record.id,
                rank = record.rank,
                "Scanned case row"
            );
            records.push(record);
        }
        Ok(records)
    }
}

/// Map scanned rows and attach pagination metadata.
///
/// Fails on the first stored enum code without a label; no partial page is
/// returned.
pub fn map_records(
    records: Vec<RawResultRecord>,
    page: i64,
    total: i64,
) -> Result<PaginatedResponse> {
    let data = records
        .into_iter()
        .map(SearchResultItem::try_from)
        .collect::<Result<Vec<_>>>()?;
    if data.is_empty() {
        return Ok(PaginatedResponse::EMPTY);
    }
    Ok(PaginatedResponse::page(
        data,
        PaginationMeta::for_search(page, total),
    ))
}

/// Run a plan's count and select statements against a backend.
pub async fn execute_plan<B>(backend: &mut B, plan: &CaseSearchPlan) -> Result<PaginatedResponse>
where
    B: CaseSearchBackend + ?Sized,
{
    debug!(
        subsystem = "search",
        component = "case_search",
        op = "count",
        sql = %plan.count_sql,
        "Executing count statement"
    );
    let total = backend.count(&plan.count_sql, &plan.params).await?;

    if total == 0 {
        debug!(
            subsystem = "search",
            component = "case_search",
            op = "count",
            "No matching cases, skipping select"
        );
        return Ok(PaginatedResponse::EMPTY);
    }

    debug!(
        subsystem = "search",
        component = "case_search",
        op = "select",
        total,
        ranked = plan.ranked,
        limit = plan.limit,
        offset = plan.offset,
        sql = %plan.select_sql,
        "Executing select statement"
    );
    let records = backend
        .fetch_records(&plan.select_sql, &plan.select_params())
        .await?;

    if records.is_empty() {
        debug!(
            subsystem = "search",
            component = "case_search",
            op = "select",
            total,
            page = plan.page,
            "Select returned no rows despite a positive count"
        );
        return Ok(PaginatedResponse::EMPTY);
    }

    map_records(records, plan.page, total)
}

/// Full-text case search over PostgreSQL.
#[derive(Clone)]
pub struct PgCaseSearch {
    pool: Pool<Postgres>,
}

impl PgCaseSearch {
    /// Create a new PgCaseSearch with the given connection pool.
    pub fn new(pool: Pool<Postgres>) -> Self {
        Self { pool }
    }

    /// Search within a caller-supplied transaction.
    pub async fn search_tx(
        &self,
        tx: &mut Transaction<'_, Postgres>,
        req: &SearchRequest,
    ) -> Result<PaginatedResponse> {
        let start = Instant::now();
        let plan = CaseSearchPlan::for_request(req)?;

        let mut backend = TxBackend::new(tx);
        match execute_plan(&mut backend, &plan).await {
            Ok(response) => {
                info!(
                    subsystem = "search",
                    component = "case_search",
                    op = "search",
                    query = %req.query,
                    page = req.page,
                    result_count = response.data.len(),
                    total = response.meta.map(|m| m.total).unwrap_or(0),
                    duration_ms = start.elapsed().as_millis() as u64,
                    "Case search completed"
                );
                Ok(response)
            }
            Err(e) => {
                error!(
                    subsystem = "search",
                    component = "case_search",
                    op = "search",
                    query = %req.query,
                    page = req.page,
                    error_kind = e.kind(),
                    error = %e,
                    "Case search failed"
                );
                Err(e)
            }
        }
    }

    /// Search in a fresh transaction from the pool, committed on success.
    pub async fn search(&self, req: &SearchRequest) -> Result<PaginatedResponse> {
        let mut tx = self.pool.begin().await.map_err(Error::Database)?;
        let response = self.search_tx(&mut tx, req).await?;
        tx.commit().await.map_err(Error::Database)?;
        Ok(response)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bo_core::{CaseType, SubjectType};
    use uuid::Uuid;

    /// Backend that returns canned results and records which statements ran.
    struct RecordingBackend {
        count: Option<Result<i64>>,
        rows: Option<Result<Vec<RawResultRecord>>>,
        calls: Vec<(&'static str, usize)>,
    }

    impl RecordingBackend {
        fn new(count: Result<i64>, rows: Result<Vec<RawResultRecord>>) -> Self {
            Self {
                count: Some(count),
                rows: Some(rows),
                calls: Vec::new(),
            }
        }
    }

    #[async_trait]
    impl CaseSearchBackend for RecordingBackend {
        async fn count(&mut self, _sql: &str, params: &[QueryParam]) -> Result<i64> {
            self.calls.push(("count", params.len()));
            self.count.take().expect("count called once")
        }

        async fn fetch_records(
            &mut self,
            _sql: &str,
            params: &[QueryParam],
        ) -> Result<Vec<RawResultRecord>> {
            self.calls.push(("select", params.len()));
            self.rows.take().expect("select called once")
        }
    }

    fn record(subject_type: i32, case_type: i32, rank: f32) -> RawResultRecord {
        RawResultRecord {
            id: Uuid::new_v4(),
            subject: format!("Subject {}", rank),
            subject_type,
            person_in_charge: None,
            beneficiary_ownership: None,
            nation: "Indonesia".to_string(),
            case_type,
            year: "2020".to_string(),
            rank,
        }
    }

    fn plan(req: &SearchRequest) -> CaseSearchPlan {
        CaseSearchPlan::for_request(req).unwrap()
    }

    #[tokio::test]
    async fn test_zero_count_skips_select() {
        let mut backend = RecordingBackend::new(Ok(0), Ok(vec![record(1, 1, 0.0)]));
        let resp = execute_plan(&mut backend, &plan(&SearchRequest::default()))
            .await
            .unwrap();

        assert_eq!(resp, PaginatedResponse::EMPTY);
        assert_eq!(backend.calls, vec![("count", 6)]);
    }

    #[tokio::test]
    async fn test_select_receives_pagination_params() {
        let rows = (0..20).map(|_| record(1, 1, 0.0)).collect();
        let mut backend = RecordingBackend::new(Ok(25), Ok(rows));
        let resp = execute_plan(&mut backend, &plan(&SearchRequest::default()))
            .await
            .unwrap();

        assert_eq!(backend.calls, vec![("count", 6), ("select", 8)]);
        assert_eq!(resp.data.len(), 20);
        assert_eq!(
            resp.meta,
            Some(PaginationMeta {
                current_page: 1,
                last_page: 2,
                per_page: 20,
                total: 25,
            })
        );
    }

    #[tokio::test]
    async fn test_positive_count_with_no_rows_is_empty() {
        let mut backend = RecordingBackend::new(Ok(3), Ok(Vec::new()));
        let resp = execute_plan(&mut backend, &plan(&SearchRequest::default().with_page(2)))
            .await
            .unwrap();
        assert!(resp.is_empty());
    }

    #[tokio::test]
    async fn test_count_error_surfaces_without_select() {
        let mut backend =
            RecordingBackend::new(Err(Error::Database(sqlx::Error::PoolTimedOut)), Ok(vec![]));
        let err = execute_plan(&mut backend, &plan(&SearchRequest::default()))
            .await
            .unwrap_err();

        assert!(matches!(err, Error::Database(_)));
        assert_eq!(backend.calls.len(), 1);
    }

    #[tokio::test]
    async fn test_scan_error_surfaces() {
        let mut backend = RecordingBackend::new(
            Ok(2),
            Err(Error::Scan("column year: unexpected null".to_string())),
        );
        let err = execute_plan(&mut backend, &plan(&SearchRequest::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::Scan(_)));
    }

    #[tokio::test]
    async fn test_unknown_stored_code_is_fatal() {
        let rows = vec![record(1, 1, 0.0), record(7, 1, 0.0)];
        let mut backend = RecordingBackend::new(Ok(2), Ok(rows));
        let err = execute_plan(&mut backend, &plan(&SearchRequest::default()))
            .await
            .unwrap_err();
        assert!(matches!(err, Error::DataIntegrity(_)));
    }

    #[tokio::test]
    async fn test_row_order_is_preserved() {
        let rows = vec![record(1, 1, 0.9), record(2, 2, 0.4), record(3, 3, 0.1)];
        let expected: Vec<Uuid> = rows.iter().map(|r| r.id).collect();
        let mut backend = RecordingBackend::new(Ok(3), Ok(rows));
        let resp = execute_plan(&mut backend, &plan(&SearchRequest::new("fraud")))
            .await
            .unwrap();

        let ids: Vec<Uuid> = resp.data.iter().map(|i| i.id).collect();
        assert_eq!(ids, expected);
        assert_eq!(resp.data[1].subject_type, SubjectType::Company);
        assert_eq!(resp.data[2].case_type, CaseType::Sanction);
    }

    #[test]
    fn test_map_records_builds_meta_from_count() {
        let resp = map_records(vec![record(1, 2, 0.0)], 3, 45).unwrap();
        let meta = resp.meta.unwrap();
        assert_eq!(meta.current_page, 3);
        assert_eq!(meta.last_page, 3);
        assert_eq!(meta.total, 45);
    }
}
