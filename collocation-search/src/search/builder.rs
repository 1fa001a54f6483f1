//! Parameterized SQL generation for collocation searches
//!
//! Every predicate is emitted together with the argument it binds: asking the
//! [`Params`] accumulator for a placeholder pushes the argument and returns
//! `$n` for it. Placeholders therefore always form the dense sequence
//! `$1..$N` with `N == args.len()`, whichever filters are present.
//!
//! Arguments are allocated in this order:
//!
//! | # | argument            | present when                  |
//! |---|---------------------|-------------------------------|
//! | 1 | head text pattern   | `head_text` non-empty         |
//! | 2 | dependent pattern   | `dpdt_text` non-empty         |
//! | 3 | head POS set        | `head_pos` non-empty          |
//! | 4 | dependent POS set   | `dpdt_pos` non-empty          |
//! | 5 | dependency types    | `dep_type` non-empty          |
//! | 6 | minimum frequency   | always                        |
//! | 7 | maximum frequency   | `freq_sup` set                |
//! | 8 | book names          | `book_names` non-empty        |
//! | 9 | book categories     | `book_categories` non-empty   |
//! | 10| book periods        | `book_periods` non-empty      |
//! | 11| book styles         | `book_styles` non-empty       |
//! | 12| examples limit      | page plan                     |
//! | 13| examples offset     | page plan                     |
//! | 14| results limit       | page plan                     |
//! | 15| results offset      | page plan                     |
//!
//! The book filter is a single `WHERE EXISTS (...)` fragment built once and
//! embedded verbatim in both the example page and the example count
//! subqueries, so both see the same placeholders.

use serde::Serialize;

use super::filters::SearchFilters;
use crate::config::SearchConfig;

/// Examples of the current collocation, numbered by array position
const EXAMPLE_SOURCE: &str =
    "jsonb_array_elements(c.examples) WITH ORDINALITY AS e(value, idx)";

/// A value bound to one positional placeholder
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(untagged)]
pub enum SqlArg {
    Text(String),
    TextArray(Vec<String>),
    Int(i64),
}

/// Accumulates arguments, handing out the placeholder for each
#[derive(Debug, Default)]
struct Params {
    args: Vec<SqlArg>,
}

impl Params {
    fn bind(&mut self, arg: SqlArg) -> String {
        self.args.push(arg);
        format!("${}", self.args.len())
    }
}

/// Conjunction of predicates sharing one [`Params`]
struct Conditions<'p> {
    params: &'p mut Params,
    clauses: Vec<String>,
}

impl<'p> Conditions<'p> {
    fn new(params: &'p mut Params) -> Self {
        Self {
            params,
            clauses: Vec::new(),
        }
    }

    /// `column LIKE '%text%'`, with LIKE wildcards in `text` matched literally
    ///
    /// A `%` or `_` typed by a user is not a wildcard: `100%` only matches
    /// text containing `100%`.
    fn contains(&mut self, column: &str, text: Option<&str>) {
        if let Some(text) = text {
            let p = self.params.bind(SqlArg::Text(like_pattern(text)));
            self.clauses.push(format!("{} LIKE {}", column, p));
        }
    }

    /// `column = ANY(values)`, skipped for an empty set
    fn any_of(&mut self, column: &str, values: &[String]) {
        if !values.is_empty() {
            let p = self.params.bind(SqlArg::TextArray(values.to_vec()));
            self.clauses.push(format!("{} = ANY({}::text[])", column, p));
        }
    }

    fn compare(&mut self, column: &str, op: &str, value: Option<i64>) {
        if let Some(value) = value {
            let p = self.params.bind(SqlArg::Int(value));
            self.clauses.push(format!("{} {} {}", column, op, p));
        }
    }

    fn into_clauses(self) -> Vec<String> {
        self.clauses
    }
}

/// Wrap `text` for a substring LIKE match
///
/// `\`, `%` and `_` are escaped with the default LIKE escape character.
pub fn like_pattern(text: &str) -> String {
    let mut pattern = String::with_capacity(text.len() + 2);
    pattern.push('%');
    for c in text.chars() {
        if matches!(c, '\\' | '%' | '_') {
            pattern.push('\\');
        }
        pattern.push(c);
    }
    pattern.push('%');
    pattern
}

/// Compiled SQL text plus its ordered arguments
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct QueryPlan {
    sql: String,
    args: Vec<SqlArg>,
    predicates: Vec<String>,
    book_filter: String,
    filters: SearchFilters,
}

impl QueryPlan {
    /// SQL text with `$n` placeholders
    pub fn sql(&self) -> &str {
        &self.sql
    }

    /// Arguments in placeholder order
    pub fn args(&self) -> &[SqlArg] {
        &self.args
    }

    /// Predicates applied to the collocation rows, in emission order
    pub fn predicates(&self) -> &[String] {
        &self.predicates
    }

    /// The `WHERE EXISTS` book fragment, empty without book filters
    pub fn book_filter(&self) -> &str {
        &self.book_filter
    }

    /// The request this plan was compiled from
    pub fn filters(&self) -> &SearchFilters {
        &self.filters
    }
}

/// Compiles [`SearchFilters`] into [`QueryPlan`]s
///
/// Holds only the configured relation names, which are checked as plain
/// identifiers when the configuration is loaded.
#[derive(Debug, Clone)]
pub struct QueryBuilder {
    collocations_table: String,
    books_table: String,
}

impl Default for QueryBuilder {
    fn default() -> Self {
        Self::new(&SearchConfig::default())
    }
}

impl QueryBuilder {
    pub fn new(config: &SearchConfig) -> Self {
        Self {
            collocations_table: config.collocations_table.clone(),
            books_table: config.books_table.clone(),
        }
    }

    /// One page of collocations with their paginated, book-filtered examples
    ///
    /// Output columns: `dependent_text`, `dependent_pos`, `head_text`,
    /// `head_pos`, `dependency_type`, `examples` (JSON array or NULL),
    /// `example_count`, `frequency` and `total_collocations_count`.
    pub fn page_plan(&self, filters: &SearchFilters) -> QueryPlan {
        let mut params = Params::default();

        let predicates = self.collocation_predicates(filters, &mut params);
        let book_filter = self.book_filter(filters, &mut params);
        let examples_limit = params.bind(SqlArg::Int(filters.examples_limit));
        let examples_offset = params.bind(SqlArg::Int(filters.examples_offset));
        let results_limit = params.bind(SqlArg::Int(filters.results_limit));
        let results_offset = params.bind(SqlArg::Int(filters.results_offset));

        let sql = format!(
            "SELECT\n\
             \x20   c.dependent_text,\n\
             \x20   c.dependent_pos,\n\
             \x20   c.head_text,\n\
             \x20   c.head_pos,\n\
             \x20   c.dependency_type,\n\
             \x20   (SELECT jsonb_agg(page.value ORDER BY page.idx)\n\
             \x20      FROM (SELECT e.value, e.idx\n\
             \x20              FROM {source}\n\
             \x20              {book_filter}\n\
             \x20             ORDER BY e.idx\n\
             \x20             LIMIT {examples_limit} OFFSET {examples_offset}) AS page) AS examples,\n\
             \x20   (SELECT COUNT(*)\n\
             \x20      FROM {source}\n\
             \x20      {book_filter}) AS example_count,\n\
             \x20   c.frequency::bigint AS frequency,\n\
             \x20   COUNT(*) OVER () AS total_collocations_count\n\
             FROM {table} AS c\n\
             {where_clause}\n\
             ORDER BY example_count DESC, frequency DESC,\n\
             \x20        c.head_text, c.dependent_text, c.head_pos, c.dependent_pos, c.dependency_type\n\
             LIMIT {results_limit} OFFSET {results_offset}",
            source = EXAMPLE_SOURCE,
            book_filter = book_filter,
            examples_limit = examples_limit,
            examples_offset = examples_offset,
            table = self.collocations_table,
            where_clause = where_clause(&predicates),
            results_limit = results_limit,
            results_offset = results_offset,
        );

        QueryPlan {
            sql,
            args: params.args,
            predicates,
            book_filter,
            filters: filters.clone(),
        }
    }

    /// Number of collocations matching the filters, ignoring pagination
    ///
    /// Shares the page plan's predicates, so it counts exactly the rows the
    /// page plan windows over.
    pub fn count_plan(&self, filters: &SearchFilters) -> QueryPlan {
        let mut params = Params::default();
        let predicates = self.collocation_predicates(filters, &mut params);

        let sql = format!(
            "SELECT COUNT(*) AS total_collocations_count\nFROM {} AS c\n{}",
            self.collocations_table,
            where_clause(&predicates),
        );

        QueryPlan {
            sql,
            args: params.args,
            predicates,
            book_filter: String::new(),
            filters: filters.clone(),
        }
    }

    fn collocation_predicates(&self, filters: &SearchFilters, params: &mut Params) -> Vec<String> {
        let mut conditions = Conditions::new(params);
        conditions.contains("c.head_text", filters.head_text());
        conditions.contains("c.dependent_text", filters.dpdt_text());
        conditions.any_of("c.head_pos", &filters.head_pos);
        conditions.any_of("c.dependent_pos", &filters.dpdt_pos);
        conditions.any_of("c.dependency_type", &filters.dep_type);
        conditions.compare("c.frequency", ">=", Some(filters.freq_inf));
        conditions.compare("c.frequency", "<=", filters.freq_sup);
        conditions.into_clauses()
    }

    /// Restrict `e.value` (one example) to the requested books
    ///
    /// Dimensions are ANDed; values within one dimension are ORed.
    fn book_filter(&self, filters: &SearchFilters, params: &mut Params) -> String {
        if !filters.has_book_filter() {
            return String::new();
        }

        let mut conditions = Conditions::new(params);
        conditions.any_of("b.name", &filters.book_names);
        conditions.any_of("b.category", &filters.book_categories);
        conditions.any_of("b.period", &filters.book_periods);
        conditions.any_of("b.style", &filters.book_styles);

        let mut clauses = vec!["b.name = e.value->>'book'".to_string()];
        clauses.extend(conditions.into_clauses());

        format!(
            "WHERE EXISTS (SELECT 1 FROM {} AS b WHERE {})",
            self.books_table,
            clauses.join(" AND ")
        )
    }
}

fn where_clause(predicates: &[String]) -> String {
    if predicates.is_empty() {
        String::new()
    } else {
        format!("WHERE {}", predicates.join("\n  AND "))
    }
}
