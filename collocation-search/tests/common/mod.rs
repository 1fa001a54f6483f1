//! In-memory collocation store shared by the integration tests
//!
//! Evaluates a plan's request directly over a small fixture corpus with the
//! same semantics the SQL plan has: substring text matches, set filters,
//! frequency bounds, book-filtered example counts, example pagination in array
//! order and the `example_count DESC, frequency DESC` ranking with its
//! lexicographic tie-break.

#![allow(dead_code)]

use std::cmp::Reverse;
use std::sync::atomic::{AtomicUsize, Ordering};

use async_trait::async_trait;
use collocation_search::error::Result;
use collocation_search::search::{CollocationRow, CollocationStore, QueryPlan, SearchFilters};
use serde_json::{json, Value};

// ============================================================================
// Fixture corpus
// ============================================================================

#[derive(Debug, Clone)]
pub struct Book {
    pub name: &'static str,
    pub category: &'static str,
    pub period: &'static str,
    pub style: &'static str,
}

#[derive(Debug, Clone)]
pub struct Entry {
    pub head_text: &'static str,
    pub head_pos: &'static str,
    pub dependent_text: &'static str,
    pub dependent_pos: &'static str,
    pub dependency_type: &'static str,
    pub frequency: i64,
    pub examples: Vec<Value>,
}

fn example(book: &str, sentence: &str) -> Value {
    json!({ "book": book, "sentence": sentence })
}

pub fn books() -> Vec<Book> {
    vec![
        Book {
            name: "Odes",
            category: "poetry",
            period: "romantic",
            style: "verse",
        },
        Book {
            name: "Sonnets",
            category: "poetry",
            period: "renaissance",
            style: "verse",
        },
        Book {
            name: "Moby Dick",
            category: "novel",
            period: "romantic",
            style: "prose",
        },
        Book {
            name: "Essays",
            category: "essay",
            period: "modern",
            style: "prose",
        },
    ]
}

pub fn entries() -> Vec<Entry> {
    vec![
        Entry {
            head_text: "run",
            head_pos: "VERB",
            dependent_text: "fast",
            dependent_pos: "ADV",
            dependency_type: "advmod",
            frequency: 40,
            examples: vec![
                example("Moby Dick", "the whales run fast"),
                example("Odes", "the rivers run fast to the sea"),
                example("Essays", "markets run fast"),
                example("Sonnets", "time doth run fast"),
            ],
        },
        Entry {
            head_text: "run",
            head_pos: "VERB",
            dependent_text: "river",
            dependent_pos: "NOUN",
            dependency_type: "nsubj",
            frequency: 25,
            examples: vec![
                example("Odes", "the river runs"),
                example("Odes", "a river ran beside"),
                example("Moby Dick", "the river ran black"),
            ],
        },
        Entry {
            head_text: "running",
            head_pos: "VERB",
            dependent_text: "water",
            dependent_pos: "NOUN",
            dependency_type: "obj",
            frequency: 25,
            examples: vec![
                example("Essays", "running water is cheap"),
                example("Moby Dick", "running water below"),
                example("Essays", "they were running water tests"),
            ],
        },
        Entry {
            head_text: "rerun",
            head_pos: "NOUN",
            dependent_text: "old",
            dependent_pos: "ADJ",
            dependency_type: "amod",
            frequency: 3,
            examples: vec![example("Essays", "an old rerun")],
        },
        Entry {
            head_text: "walk",
            head_pos: "VERB",
            dependent_text: "slowly",
            dependent_pos: "ADV",
            dependency_type: "advmod",
            frequency: 60,
            examples: vec![
                example("Odes", "we walk slowly"),
                example("Moby Dick", "he walked slowly aft"),
            ],
        },
        Entry {
            head_text: "run",
            head_pos: "VERB",
            dependent_text: "home",
            dependent_pos: "ADV",
            dependency_type: "advmod",
            frequency: 2,
            examples: Vec::new(),
        },
    ]
}

// ============================================================================
// Store
// ============================================================================

/// Fixture-backed [`CollocationStore`] counting the calls it receives
pub struct MemoryStore {
    entries: Vec<Entry>,
    books: Vec<Book>,
    pub page_calls: AtomicUsize,
    pub count_calls: AtomicUsize,
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new(entries(), books())
    }
}

impl MemoryStore {
    pub fn new(entries: Vec<Entry>, books: Vec<Book>) -> Self {
        Self {
            entries,
            books,
            page_calls: AtomicUsize::new(0),
            count_calls: AtomicUsize::new(0),
        }
    }

    pub fn calls(&self) -> usize {
        self.page_calls.load(Ordering::SeqCst) + self.count_calls.load(Ordering::SeqCst)
    }

    fn matches(entry: &Entry, f: &SearchFilters) -> bool {
        let in_set = |set: &[String], value: &str| set.is_empty() || set.iter().any(|v| v == value);

        f.head_text().map_or(true, |t| entry.head_text.contains(t))
            && f.dpdt_text().map_or(true, |t| entry.dependent_text.contains(t))
            && in_set(&f.head_pos, entry.head_pos)
            && in_set(&f.dpdt_pos, entry.dependent_pos)
            && in_set(&f.dep_type, entry.dependency_type)
            && entry.frequency >= f.freq_inf
            && f.freq_sup.map_or(true, |sup| entry.frequency <= sup)
    }

    fn example_kept(&self, example: &Value, f: &SearchFilters) -> bool {
        if !f.has_book_filter() {
            return true;
        }
        let in_set = |set: &[String], value: &str| set.is_empty() || set.iter().any(|v| v == value);
        let Some(name) = example.get("book").and_then(Value::as_str) else {
            return false;
        };

        self.books.iter().any(|b| {
            b.name == name
                && in_set(&f.book_names, b.name)
                && in_set(&f.book_categories, b.category)
                && in_set(&f.book_periods, b.period)
                && in_set(&f.book_styles, b.style)
        })
    }

    fn ranked(&self, f: &SearchFilters) -> Vec<CollocationRow> {
        let mut rows: Vec<CollocationRow> = self
            .entries
            .iter()
            .filter(|e| Self::matches(e, f))
            .map(|e| {
                let kept: Vec<Value> = e
                    .examples
                    .iter()
                    .filter(|ex| self.example_kept(ex, f))
                    .cloned()
                    .collect();
                let example_count = kept.len() as i64;
                let page: Vec<Value> = kept
                    .into_iter()
                    .skip(f.examples_offset as usize)
                    .take(f.examples_limit as usize)
                    .collect();

                CollocationRow {
                    dependent_text: e.dependent_text.to_string(),
                    dependent_pos: e.dependent_pos.to_string(),
                    head_text: e.head_text.to_string(),
                    head_pos: e.head_pos.to_string(),
                    dependency_type: e.dependency_type.to_string(),
                    examples: (!page.is_empty()).then_some(page),
                    example_count,
                    frequency: e.frequency,
                    total_collocations_count: 0,
                }
            })
            .collect();

        rows.sort_by(|a, b| {
            (
                Reverse(a.example_count),
                Reverse(a.frequency),
                &a.head_text,
                &a.dependent_text,
                &a.head_pos,
                &a.dependent_pos,
                &a.dependency_type,
            )
                .cmp(&(
                    Reverse(b.example_count),
                    Reverse(b.frequency),
                    &b.head_text,
                    &b.dependent_text,
                    &b.head_pos,
                    &b.dependent_pos,
                    &b.dependency_type,
                ))
        });
        rows
    }
}

#[async_trait]
impl CollocationStore for MemoryStore {
    async fn fetch_page(&self, plan: &QueryPlan) -> Result<Vec<CollocationRow>> {
        self.page_calls.fetch_add(1, Ordering::SeqCst);
        let f = plan.filters();
        let rows = self.ranked(f);
        let total = rows.len() as i64;

        Ok(rows
            .into_iter()
            .skip(f.results_offset as usize)
            .take(f.results_limit as usize)
            .map(|mut row| {
                row.total_collocations_count = total;
                row
            })
            .collect())
    }

    async fn count_matches(&self, plan: &QueryPlan) -> Result<i64> {
        self.count_calls.fetch_add(1, Ordering::SeqCst);
        Ok(self.ranked(plan.filters()).len() as i64)
    }

    async fn ping(&self) -> Result<()> {
        Ok(())
    }
}
