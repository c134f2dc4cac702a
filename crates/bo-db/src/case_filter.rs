//! Case search query builder.
//!
//! Both the count statement and the ranked select statement are rendered
//! from one [`CasePredicate`], so their WHERE clauses and parameter lists are
//! identical by construction. The select statement only adds projected
//! columns, optional rank ordering and the pagination parameters.

use std::fmt::Write as _;

use bo_core::defaults::{
    CASES_TABLE, FULLTEXT_INDEX_COLUMN, PAGE_SIZE, RANK_NORMALIZATION, TEXT_SEARCH_CONFIG,
};
use bo_core::{Error, Result, SearchRequest};

use crate::normalize::NormalizedFilters;

/// Columns projected by the select statement, in scan order.
pub const RESULT_COLUMNS: &str =
    "id, subject, subject_type, person_in_charge, beneficiary_ownership, nation, case_type, year";

/// Type-safe parameter binding for SQL queries.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum QueryParam {
    /// Text parameter.
    Text(String),
    /// Array of integers (for ANY operations).
    IntArray(Vec<i32>),
    /// Integer parameter.
    Int(i32),
    /// 64-bit integer parameter (LIMIT/OFFSET).
    BigInt(i64),
}

/// One condition of the case predicate.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Condition {
    /// Full-text phrase match against the case tsvector.
    FullText,
    /// Always true; keeps the query parameter slot bound when no text query
    /// is given.
    Tautology,
    /// `column = ANY($n::int[])`
    AnyOf(&'static str),
    /// `column ~* $n`
    Matches(&'static str),
    /// `column = $n`
    Equals(&'static str),
}

impl Condition {
    fn render(&self, placeholder: usize) -> String {
        match self {
            Condition::FullText => format!(
                "{} @@ phraseto_tsquery('{}', ${})",
                FULLTEXT_INDEX_COLUMN, TEXT_SEARCH_CONFIG, placeholder
            ),
            Condition::Tautology => format!("${0}::text = ${0}::text", placeholder),
            Condition::AnyOf(column) => format!("{} = ANY(${}::int[])", column, placeholder),
            Condition::Matches(column) => format!("{} ~* ${}", column, placeholder),
            Condition::Equals(column) => format!("{} = ${}", column, placeholder),
        }
    }
}

/// A condition together with the single parameter it binds.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Clause {
    pub condition: Condition,
    pub param: QueryParam,
}

/// The shared WHERE predicate of both case search statements.
///
/// Clause order is fixed: text, subject type, year, case type, nation,
/// status. Clause `i` binds placeholder `$i+1`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CasePredicate {
    clauses: Vec<Clause>,
}

impl CasePredicate {
    pub fn new(filters: &NormalizedFilters) -> Self {
        let text = if filters.has_query() {
            Condition::FullText
        } else {
            Condition::Tautology
        };

        let clauses = vec![
            Clause {
                condition: text,
                param: QueryParam::Text(filters.query.clone()),
            },
            Clause {
                condition: Condition::AnyOf("subject_type"),
                param: QueryParam::IntArray(filters.subject_types.clone()),
            },
            Clause {
                condition: Condition::Matches("year"),
                param: QueryParam::Text(filters.year_pattern.clone()),
            },
            Clause {
                condition: Condition::AnyOf("case_type"),
                param: QueryParam::IntArray(filters.case_types.clone()),
            },
            Clause {
                condition: Condition::Matches("nation"),
                param: QueryParam::Text(filters.nation_pattern.clone()),
            },
            Clause {
                condition: Condition::Equals("status"),
                param: QueryParam::Int(filters.status),
            },
        ];

        Self { clauses }
    }

    pub fn clauses(&self) -> &[Clause] {
        &self.clauses
    }

    /// Render as `cond AND cond AND ...` with placeholders `$1..$n`.
    pub fn to_sql(&self) -> String {
        self.clauses
            .iter()
            .enumerate()
            .map(|(idx, clause)| clause.condition.render(idx + 1))
            .collect::<Vec<_>>()
            .join("\n  AND ")
    }

    /// Parameters in placeholder order.
    pub fn params(&self) -> Vec<QueryParam> {
        self.clauses.iter().map(|c| c.param.clone()).collect()
    }

    /// Whether the predicate contains a full-text match.
    pub fn is_ranked(&self) -> bool {
        self.clauses
            .iter()
            .any(|c| c.condition == Condition::FullText)
    }

    /// Placeholder index of the full-text query parameter.
    fn query_placeholder(&self) -> usize {
        self.clauses
            .iter()
            .position(|c| matches!(c.condition, Condition::FullText | Condition::Tautology))
            .map(|idx| idx + 1)
            .unwrap_or(1)
    }
}

/// Both statements of one case search, plus everything needed to run them.
#[derive(Debug, Clone, PartialEq)]
pub struct CaseSearchPlan {
    pub count_sql: String,
    pub select_sql: String,
    /// Parameters of the count statement; a prefix of [`Self::select_params`].
    pub params: Vec<QueryParam>,
    pub page: i64,
    pub limit: i64,
    pub offset: i64,
    /// Whether rows are ordered by descending relevance.
    pub ranked: bool,
}

impl CaseSearchPlan {
    /// Normalize a request and build its plan.
    pub fn for_request(req: &SearchRequest) -> Result<Self> {
        let filters = NormalizedFilters::from_request(req)?;
        CaseSearchQueryBuilder::new(&filters, req.page).build()
    }

    /// Count parameters followed by LIMIT and OFFSET.
    pub fn select_params(&self) -> Vec<QueryParam> {
        let mut params = self.params.clone();
        params.push(QueryParam::BigInt(self.limit));
        params.push(QueryParam::BigInt(self.offset));
        params
    }
}

/// Builds a [`CaseSearchPlan`] from normalized filters and a page number.
pub struct CaseSearchQueryBuilder {
    predicate: CasePredicate,
    page: i64,
    page_size: i64,
}

impl CaseSearchQueryBuilder {
    pub fn new(filters: &NormalizedFilters, page: i64) -> Self {
        Self {
            predicate: CasePredicate::new(filters),
            page,
            page_size: PAGE_SIZE,
        }
    }

    pub fn predicate(&self) -> &CasePredicate {
        &self.predicate
    }

    pub fn count_sql(&self) -> String {
        format!(
            "SELECT COUNT(id) AS cnt\nFROM {}\nWHERE {}",
            CASES_TABLE,
            self.predicate.to_sql()
        )
    }

    /// Relevance score for the text branch, constant zero otherwise.
    fn rank_expression(&self) -> String {
        if self.predicate.is_ranked() {
            format!(
                "ts_rank_cd({}, phraseto_tsquery('{}', ${}), {})",
                FULLTEXT_INDEX_COLUMN,
                TEXT_SEARCH_CONFIG,
                self.predicate.query_placeholder(),
                RANK_NORMALIZATION
            )
        } else {
            "0::real".to_string()
        }
    }

    pub fn select_sql(&self) -> String {
        let param_count = self.predicate.clauses().len();
        let mut sql = format!(
            "SELECT {}, {} AS rank\nFROM {}\nWHERE {}",
            RESULT_COLUMNS,
            self.rank_expression(),
            CASES_TABLE,
            self.predicate.to_sql()
        );
        if self.predicate.is_ranked() {
            sql.push_str("\nORDER BY rank DESC");
        }
        let _ = write!(
            sql,
            "\nLIMIT ${} OFFSET ${}",
            param_count + 1,
            param_count + 2
        );
        sql
    }

    /// Build both statements. Pages are 1-based; `page < 1` is rejected.
    pub fn build(&self) -> Result<CaseSearchPlan> {
        if self.page < 1 {
            return Err(Error::InvalidInput(format!(
                "page must be >= 1, got {}",
                self.page
            )));
        }

        let offset = (self.page - 1)
            .checked_mul(self.page_size)
            .ok_or_else(|| Error::InvalidInput(format!("page {} is out of range", self.page)))?;

        Ok(CaseSearchPlan {
            count_sql: self.count_sql(),
            select_sql: self.select_sql(),
            params: self.predicate.params(),
            page: self.page,
            limit: self.page_size,
            offset,
            ranked: self.predicate.is_ranked(),
        })
    }
}
