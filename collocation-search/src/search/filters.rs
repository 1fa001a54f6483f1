//! Search request type, defaults, validation and query-string decoding
//!
//! # Example
//!
//! ```rust
//! use collocation_search::search::SearchFilters;
//!
//! let filters = SearchFilters::new()
//!     .with_head_text("run")
//!     .with_head_pos(["VERB"])
//!     .with_book_categories(["poetry"])
//!     .with_results_page(2, 0);
//!
//! assert_eq!(filters.head_text(), Some("run"));
//! assert_eq!(filters.freq_inf, 1);
//! assert_eq!(filters.examples_limit, 5);
//! ```

use std::borrow::Cow;

use serde::{Deserialize, Deserializer, Serialize};

use crate::config::SearchConfig;
use crate::error::{Error, Result};

/// Default minimum collocation frequency
pub const DEFAULT_FREQ_INF: i64 = 1;

/// Default number of collocations per page
pub const DEFAULT_RESULTS_LIMIT: i64 = 8;

/// Default number of examples per collocation
pub const DEFAULT_EXAMPLES_LIMIT: i64 = 5;

/// Filters and pagination windows for one search
///
/// Empty strings and empty sets mean "no filter". Book filters restrict which
/// examples are shown and counted; they never change which collocations match.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct SearchFilters {
    /// Substring of the head token text
    pub head_text: Option<String>,
    /// Accepted head POS tags
    #[serde(deserialize_with = "null_as_empty")]
    pub head_pos: Vec<String>,
    /// Substring of the dependent token text
    pub dpdt_text: Option<String>,
    /// Accepted dependent POS tags
    #[serde(deserialize_with = "null_as_empty")]
    pub dpdt_pos: Vec<String>,
    /// Accepted dependency types
    #[serde(deserialize_with = "null_as_empty")]
    pub dep_type: Vec<String>,
    /// Minimum frequency, always applied
    pub freq_inf: i64,
    /// Maximum frequency
    pub freq_sup: Option<i64>,
    /// Collocation page size
    pub results_limit: i64,
    /// Collocation page offset
    pub results_offset: i64,
    /// Example page size, per collocation
    pub examples_limit: i64,
    /// Example page offset, per collocation
    pub examples_offset: i64,
    /// Examples must come from one of these books
    #[serde(deserialize_with = "null_as_empty")]
    pub book_names: Vec<String>,
    /// Examples must come from a book in one of these categories
    #[serde(deserialize_with = "null_as_empty")]
    pub book_categories: Vec<String>,
    /// Examples must come from a book of one of these periods
    #[serde(deserialize_with = "null_as_empty")]
    pub book_periods: Vec<String>,
    /// Examples must come from a book in one of these styles
    #[serde(deserialize_with = "null_as_empty")]
    pub book_styles: Vec<String>,
}

/// `null` on a set field means the same as leaving it out
fn null_as_empty<'de, D>(deserializer: D) -> std::result::Result<Vec<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(Option::<Vec<String>>::deserialize(deserializer)?.unwrap_or_default())
}

impl Default for SearchFilters {
    fn default() -> Self {
        Self {
            head_text: None,
            head_pos: Vec::new(),
            dpdt_text: None,
            dpdt_pos: Vec::new(),
            dep_type: Vec::new(),
            freq_inf: DEFAULT_FREQ_INF,
            freq_sup: None,
            results_limit: DEFAULT_RESULTS_LIMIT,
            results_offset: 0,
            examples_limit: DEFAULT_EXAMPLES_LIMIT,
            examples_offset: 0,
            book_names: Vec::new(),
            book_categories: Vec::new(),
            book_periods: Vec::new(),
            book_styles: Vec::new(),
        }
    }
}

fn strings<I, S>(values: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: Into<String>,
{
    values.into_iter().map(Into::into).collect()
}

impl SearchFilters {
    /// Create a request with every default applied and no filters
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn with_head_text(mut self, text: impl Into<String>) -> Self {
        self.head_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_dpdt_text(mut self, text: impl Into<String>) -> Self {
        self.dpdt_text = Some(text.into());
        self
    }

    #[must_use]
    pub fn with_head_pos<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.head_pos = strings(tags);
        self
    }

    #[must_use]
    pub fn with_dpdt_pos<I, S>(mut self, tags: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dpdt_pos = strings(tags);
        self
    }

    #[must_use]
    pub fn with_dep_type<I, S>(mut self, types: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.dep_type = strings(types);
        self
    }

    /// Set the frequency bounds; `max` of `None` means unbounded
    #[must_use]
    pub fn with_frequency(mut self, min: i64, max: Option<i64>) -> Self {
        self.freq_inf = min;
        self.freq_sup = max;
        self
    }

    #[must_use]
    pub fn with_book_names<I, S>(mut self, names: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book_names = strings(names);
        self
    }

    #[must_use]
    pub fn with_book_categories<I, S>(mut self, categories: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book_categories = strings(categories);
        self
    }

    #[must_use]
    pub fn with_book_periods<I, S>(mut self, periods: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book_periods = strings(periods);
        self
    }

    #[must_use]
    pub fn with_book_styles<I, S>(mut self, styles: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.book_styles = strings(styles);
        self
    }

    /// Set the collocation pagination window
    #[must_use]
    pub fn with_results_page(mut self, limit: i64, offset: i64) -> Self {
        self.results_limit = limit;
        self.results_offset = offset;
        self
    }

    /// Set the per-collocation example pagination window
    #[must_use]
    pub fn with_examples_page(mut self, limit: i64, offset: i64) -> Self {
        self.examples_limit = limit;
        self.examples_offset = offset;
        self
    }

    /// Head text filter, `None` when absent or empty
    pub fn head_text(&self) -> Option<&str> {
        self.head_text.as_deref().filter(|s| !s.is_empty())
    }

    /// Dependent text filter, `None` when absent or empty
    pub fn dpdt_text(&self) -> Option<&str> {
        self.dpdt_text.as_deref().filter(|s| !s.is_empty())
    }

    /// Whether any book dimension restricts the examples
    pub fn has_book_filter(&self) -> bool {
        !(self.book_names.is_empty()
            && self.book_categories.is_empty()
            && self.book_periods.is_empty()
            && self.book_styles.is_empty())
    }

    /// Reject requests that must not reach the query builder
    ///
    /// A missing text filter is a [`Error::BadRequest`]; out-of-range numbers
    /// are a [`Error::ValidationError`].
    pub fn validate(&self, config: &SearchConfig) -> Result<()> {
        if self.head_text().is_none() && self.dpdt_text().is_none() {
            return Err(Error::BadRequest(
                "At least one of 'head_text' or 'dpdt_text' must be provided.".to_string(),
            ));
        }

        check(self.freq_inf >= 1, "freq_inf must be greater than or equal to 1")?;
        if let Some(sup) = self.freq_sup {
            check(sup >= 1, "freq_sup must be greater than or equal to 1")?;
        }
        check(self.results_limit > 0, "results_limit must be greater than 0")?;
        check(self.results_offset >= 0, "results_offset must be greater than or equal to 0")?;
        check(self.examples_limit > 0, "examples_limit must be greater than 0")?;
        check(self.examples_offset >= 0, "examples_offset must be greater than or equal to 0")?;

        if self.results_limit > config.max_results_limit {
            return Err(Error::ValidationError(format!(
                "results_limit must be at most {}",
                config.max_results_limit
            )));
        }
        if self.examples_limit > config.max_examples_limit {
            return Err(Error::ValidationError(format!(
                "examples_limit must be at most {}",
                config.max_examples_limit
            )));
        }

        Ok(())
    }

    /// Decode a raw URL query string
    ///
    /// Set-valued filters are given by repeating the key
    /// (`head_pos=NOUN&head_pos=VERB`). Repeated scalar keys keep the last
    /// value. Unknown keys are ignored.
    pub fn from_query_string(query: &str) -> Result<Self> {
        Self::from_query_pairs(url::form_urlencoded::parse(query.as_bytes()))
    }

    /// Decode already-split `key=value` pairs
    pub fn from_query_pairs<'a, I>(pairs: I) -> Result<Self>
    where
        I: IntoIterator<Item = (Cow<'a, str>, Cow<'a, str>)>,
    {
        let mut filters = Self::default();

        for (key, value) in pairs {
            let value = value.into_owned();
            match key.as_ref() {
                "head_text" => filters.head_text = Some(value),
                "dpdt_text" => filters.dpdt_text = Some(value),
                "head_pos" => filters.head_pos.push(value),
                "dpdt_pos" => filters.dpdt_pos.push(value),
                "dep_type" => filters.dep_type.push(value),
                "book_names" => filters.book_names.push(value),
                "book_categories" => filters.book_categories.push(value),
                "book_periods" => filters.book_periods.push(value),
                "book_styles" => filters.book_styles.push(value),
                "freq_inf" => filters.freq_inf = parse_int(&key, &value)?,
                "freq_sup" => filters.freq_sup = Some(parse_int(&key, &value)?),
                "results_limit" => filters.results_limit = parse_int(&key, &value)?,
                "results_offset" => filters.results_offset = parse_int(&key, &value)?,
                "examples_limit" => filters.examples_limit = parse_int(&key, &value)?,
                "examples_offset" => filters.examples_offset = parse_int(&key, &value)?,
                _ => {}
            }
        }

        Ok(filters)
    }
}

fn check(ok: bool, message: &str) -> Result<()> {
    if ok {
        Ok(())
    } else {
        Err(Error::ValidationError(message.to_string()))
    }
}

fn parse_int(key: &str, value: &str) -> Result<i64> {
    value.trim().parse().map_err(|_| {
        Error::ValidationError(format!("{} must be an integer, got {:?}", key, value))
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config() -> SearchConfig {
        SearchConfig::default()
    }

    #[test]
    fn test_defaults() {
        let filters = SearchFilters::default();
        assert_eq!(filters.freq_inf, 1);
        assert_eq!(filters.freq_sup, None);
        assert_eq!(filters.results_limit, 8);
        assert_eq!(filters.results_offset, 0);
        assert_eq!(filters.examples_limit, 5);
        assert_eq!(filters.examples_offset, 0);
        assert!(!filters.has_book_filter());
    }

    #[test]
    fn test_requires_a_text_filter() {
        let err = SearchFilters::new()
            .with_head_pos(["NOUN"])
            .validate(&config())
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_empty_text_counts_as_missing() {
        let err = SearchFilters::new()
            .with_head_text("")
            .with_dpdt_text("")
            .validate(&config())
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_either_text_filter_is_enough() {
        assert!(SearchFilters::new().with_head_text("run").validate(&config()).is_ok());
        assert!(SearchFilters::new().with_dpdt_text("fast").validate(&config()).is_ok());
    }

    #[test]
    fn test_bounds() {
        let base = SearchFilters::new().with_head_text("run");

        let cases = [
            base.clone().with_frequency(0, None),
            base.clone().with_frequency(1, Some(0)),
            base.clone().with_results_page(0, 0),
            base.clone().with_results_page(8, -1),
            base.clone().with_examples_page(0, 0),
            base.clone().with_examples_page(5, -3),
        ];
        for filters in cases {
            let err = filters.validate(&config()).unwrap_err();
            assert!(matches!(err, Error::ValidationError(_)), "{filters:?}");
        }
    }

    #[test]
    fn test_configured_caps() {
        let mut cfg = config();
        cfg.max_results_limit = 10;
        cfg.max_examples_limit = 6;

        let base = SearchFilters::new().with_head_text("run");
        assert!(base.clone().validate(&cfg).is_ok());
        assert!(base.clone().with_results_page(10, 0).validate(&cfg).is_ok());
        assert!(base.clone().with_results_page(11, 0).validate(&cfg).is_err());
        assert!(base.clone().with_examples_page(6, 0).validate(&cfg).is_ok());
        assert!(base.clone().with_examples_page(7, 0).validate(&cfg).is_err());
    }

    #[test]
    fn test_missing_text_reported_before_bounds() {
        let err = SearchFilters::new()
            .with_results_page(0, -1)
            .validate(&config())
            .unwrap_err();
        assert!(matches!(err, Error::BadRequest(_)));
    }

    #[test]
    fn test_from_query_string_repeated_keys() {
        let filters = SearchFilters::from_query_string(
            "head_text=run&head_pos=VERB&head_pos=AUX&dep_type=advmod\
             &book_categories=poetry&freq_inf=5&freq_sup=90\
             &results_limit=2&results_offset=4&examples_limit=3&examples_offset=1",
        )
        .unwrap();

        assert_eq!(filters.head_text(), Some("run"));
        assert_eq!(filters.head_pos, vec!["VERB", "AUX"]);
        assert_eq!(filters.dep_type, vec!["advmod"]);
        assert_eq!(filters.book_categories, vec!["poetry"]);
        assert_eq!(filters.freq_inf, 5);
        assert_eq!(filters.freq_sup, Some(90));
        assert_eq!((filters.results_limit, filters.results_offset), (2, 4));
        assert_eq!((filters.examples_limit, filters.examples_offset), (3, 1));
    }

    #[test]
    fn test_from_query_string_decodes_percent_escapes() {
        let filters =
            SearchFilters::from_query_string("dpdt_text=caf%C3%A9&book_names=Les+Fleurs+du+mal")
                .unwrap();
        assert_eq!(filters.dpdt_text(), Some("café"));
        assert_eq!(filters.book_names, vec!["Les Fleurs du mal"]);
    }

    #[test]
    fn test_from_query_string_defaults_and_unknown_keys() {
        let filters = SearchFilters::from_query_string("head_text=run&verbose=1").unwrap();
        assert_eq!(filters, SearchFilters::new().with_head_text("run"));
    }

    #[test]
    fn test_from_query_string_rejects_non_integer() {
        let err = SearchFilters::from_query_string("head_text=run&results_limit=ten").unwrap_err();
        assert!(matches!(err, Error::ValidationError(ref msg) if msg.contains("results_limit")));
    }

    #[test]
    fn test_json_body_uses_defaults() {
        let filters: SearchFilters =
            serde_json::from_str(r#"{"dpdt_text": "quickly", "book_styles": ["prose"]}"#).unwrap();
        assert_eq!(filters.dpdt_text(), Some("quickly"));
        assert_eq!(filters.book_styles, vec!["prose"]);
        assert_eq!(filters.results_limit, DEFAULT_RESULTS_LIMIT);
        assert!(filters.has_book_filter());
    }

    #[test]
    fn test_json_body_null_sets_are_empty() {
        let filters: SearchFilters = serde_json::from_str(
            r#"{"head_text": "run", "head_pos": null, "dep_type": null, "book_names": null}"#,
        )
        .unwrap();
        assert!(filters.head_pos.is_empty());
        assert!(filters.dep_type.is_empty());
        assert!(!filters.has_book_filter());
        assert!(filters.validate(&config()).is_ok());
    }
}
