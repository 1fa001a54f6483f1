//! Turns database rows into the search response
//!
//! Rows carry the window total on every row; the response carries it once.

use serde::{Deserialize, Serialize};
use serde_json::Value;

/// One row produced by a page plan
#[derive(Debug, Clone, PartialEq)]
pub struct CollocationRow {
    pub dependent_text: String,
    pub dependent_pos: String,
    pub head_text: String,
    pub head_pos: String,
    pub dependency_type: String,
    /// Paginated examples, `None` when the page is empty
    pub examples: Option<Vec<Value>>,
    pub example_count: i64,
    pub frequency: i64,
    /// Number of collocations matching the filters, repeated on each row
    pub total_collocations_count: i64,
}

/// A collocation as returned to clients
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Collocation {
    pub dependent_text: String,
    pub dependent_pos: String,
    pub head_text: String,
    pub head_pos: String,
    pub dependency_type: String,
    /// Example records, passed through unchanged; `null` when the example
    /// page is empty
    pub examples: Option<Vec<Value>>,
    /// Examples surviving the book filter, before example pagination
    pub example_count: i64,
    pub frequency: i64,
}

impl From<CollocationRow> for Collocation {
    fn from(row: CollocationRow) -> Self {
        Self {
            dependent_text: row.dependent_text,
            dependent_pos: row.dependent_pos,
            head_text: row.head_text,
            head_pos: row.head_pos,
            dependency_type: row.dependency_type,
            examples: row.examples,
            example_count: row.example_count,
            frequency: row.frequency,
        }
    }
}

/// Body of a successful search
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SearchResponse {
    pub total_collocations_count: i64,
    pub results: Vec<Collocation>,
}

impl SearchResponse {
    pub fn empty() -> Self {
        Self {
            total_collocations_count: 0,
            results: Vec::new(),
        }
    }
}

/// Window total carried by the rows, 0 when there are none
pub fn total_collocations_count(rows: &[CollocationRow]) -> i64 {
    rows.first().map_or(0, |row| row.total_collocations_count)
}

/// Lift the total out of the rows and strip it from each result
///
/// Row order is preserved.
pub fn shape(rows: Vec<CollocationRow>) -> SearchResponse {
    let total = total_collocations_count(&rows);
    if rows.iter().any(|row| row.total_collocations_count != total) {
        tracing::warn!("Rows disagree on total_collocations_count; using the first row");
    }

    SearchResponse {
        total_collocations_count: total,
        results: rows.into_iter().map(Collocation::from).collect(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn row(head: &str, examples: Option<Vec<Value>>, total: i64) -> CollocationRow {
        CollocationRow {
            dependent_text: "quickly".into(),
            dependent_pos: "ADV".into(),
            head_text: head.into(),
            head_pos: "VERB".into(),
            dependency_type: "advmod".into(),
            example_count: examples.as_ref().map_or(0, |e| e.len() as i64),
            examples,
            frequency: 42,
            total_collocations_count: total,
        }
    }

    #[test]
    fn test_shape_empty() {
        assert_eq!(shape(Vec::new()), SearchResponse::empty());
    }

    #[test]
    fn test_shape_lifts_total_and_keeps_order() {
        let response = shape(vec![
            row("run", Some(vec![json!({"book": "A"})]), 17),
            row("ran", None, 17),
        ]);

        assert_eq!(response.total_collocations_count, 17);
        let heads: Vec<_> = response.results.iter().map(|c| c.head_text.as_str()).collect();
        assert_eq!(heads, ["run", "ran"]);
    }

    #[test]
    fn test_serialized_shape() {
        let response = shape(vec![row("run", None, 1)]);
        let value = serde_json::to_value(&response).unwrap();

        assert_eq!(value["total_collocations_count"], 1);
        let result = &value["results"][0];
        assert!(result.get("total_collocations_count").is_none());
        assert_eq!(result["examples"], Value::Null);
        assert_eq!(result["example_count"], 0);
        assert_eq!(result["dependency_type"], "advmod");
    }

    #[test]
    fn test_examples_passed_through() {
        let example = json!({"book": "Odes", "sentence": "they run", "extra": [1, 2]});
        let response = shape(vec![row("run", Some(vec![example.clone()]), 1)]);
        assert_eq!(response.results[0].examples, Some(vec![example]));
    }
}
