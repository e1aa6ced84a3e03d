//! Search and sort state plus the rows derived from it.
//!
//! `filtered_rows` always equals `sort(filter(bindings, query), column, direction)`
//! and is rebuilt from scratch whenever any input changes.

use std::cmp::Ordering;
use std::sync::Arc;

use icu_collator::{CaseFirst, Collator, CollatorOptions, Strength};
use log::{trace, warn};

use crate::model::ResultDocument;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum SortDirection {
    #[default]
    Asc,
    Desc,
}

impl SortDirection {
    pub fn flipped(self) -> Self {
        match self {
            SortDirection::Asc => SortDirection::Desc,
            SortDirection::Desc => SortDirection::Asc,
        }
    }

    pub fn indicator(self) -> &'static str {
        match self {
            SortDirection::Asc => "▲",
            SortDirection::Desc => "▼",
        }
    }
}

#[derive(Debug, Default)]
pub struct ViewState {
    document: Option<Arc<ResultDocument>>,
    search_query: String,
    sort_column: Option<String>,
    sort_direction: SortDirection,
    filtered_rows: Vec<usize>,
}

impl ViewState {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn document(&self) -> Option<&ResultDocument> {
        self.document.as_deref()
    }

    pub fn set_document(&mut self, document: Option<Arc<ResultDocument>>) {
        self.document = document;
        self.recompute();
    }

    pub fn search_query(&self) -> &str {
        &self.search_query
    }

    pub fn set_search_query(&mut self, query: impl Into<String>) {
        self.search_query = query.into();
        self.recompute();
    }

    pub fn sort_column(&self) -> Option<&str> {
        self.sort_column.as_deref()
    }

    pub fn sort_direction(&self) -> SortDirection {
        self.sort_direction
    }

    /// Header click: a new column sorts ascending, the current one flips.
    pub fn toggle_sort(&mut self, column: &str) {
        if self.sort_column.as_deref() == Some(column) {
            self.sort_direction = self.sort_direction.flipped();
        } else {
            self.sort_column = Some(column.to_string());
            self.sort_direction = SortDirection::Asc;
        }
        self.recompute();
    }

    /// Indices into the document's bindings, filtered and sorted.
    pub fn filtered_rows(&self) -> &[usize] {
        &self.filtered_rows
    }

    /// What the table shows. Nothing until the user has typed a query.
    pub fn visible_rows(&self) -> &[usize] {
        if self.search_query.is_empty() {
            &[]
        } else {
            &self.filtered_rows
        }
    }

    pub fn total_rows(&self) -> usize {
        self.document.as_ref().map_or(0, |doc| doc.row_count())
    }

    pub fn summary(&self) -> String {
        format!(
            "Showing {} of {} rows",
            self.visible_rows().len(),
            self.total_rows()
        )
    }

    fn recompute(&mut self) {
        self.filtered_rows = match &self.document {
            Some(doc) => derive_rows(
                doc,
                &self.search_query,
                self.sort_column.as_deref(),
                self.sort_direction,
            ),
            None => Vec::new(),
        };
        trace!(
            "Derived {} of {} rows for query {:?}",
            self.filtered_rows.len(),
            self.total_rows(),
            self.search_query
        );
    }
}

pub fn derive_rows(
    doc: &ResultDocument,
    query: &str,
    sort_column: Option<&str>,
    direction: SortDirection,
) -> Vec<usize> {
    let mut rows = filter_rows(doc, query);
    if let Some(column) = sort_column {
        sort_rows(doc, &mut rows, column, direction);
    }
    rows
}

/// Rows where any column value contains `query`, ignoring case. An empty
/// query keeps every row.
pub fn filter_rows(doc: &ResultDocument, query: &str) -> Vec<usize> {
    if query.is_empty() {
        return (0..doc.row_count()).collect();
    }
    let needle = query.to_lowercase();
    doc.rows()
        .iter()
        .enumerate()
        .filter(|(_, row)| {
            doc.columns()
                .iter()
                .any(|column| row.value(column).to_lowercase().contains(&needle))
        })
        .map(|(index, _)| index)
        .collect()
}

/// Stable in both directions: equal values keep their relative order.
pub fn sort_rows(doc: &ResultDocument, rows: &mut [usize], column: &str, direction: SortDirection) {
    let bindings = doc.rows();
    let collator = LocaleCollator::new();
    rows.sort_by(|&a, &b| {
        let a = bindings[a].value(column);
        let b = bindings[b].value(column);
        match direction {
            SortDirection::Asc => collator.compare(a, b),
            SortDirection::Desc => collator.compare(b, a),
        }
    });
}

/// Root-locale collation at tertiary strength with lowercase first, the
/// order a browser's `localeCompare` gives for an undetermined locale.
pub struct LocaleCollator(Option<Collator>);

impl LocaleCollator {
    pub fn new() -> Self {
        let mut options = CollatorOptions::new();
        options.strength = Some(Strength::Tertiary);
        options.case_first = Some(CaseFirst::LowerFirst);
        match Collator::try_new(&Default::default(), options) {
            Ok(collator) => Self(Some(collator)),
            Err(e) => {
                warn!("Root collation unavailable, sorting by folded code points: {}", e);
                Self(None)
            }
        }
    }

    pub fn compare(&self, a: &str, b: &str) -> Ordering {
        match &self.0 {
            Some(collator) => collator.compare(a, b),
            None => folded_compare(a, b),
        }
    }
}

impl Default for LocaleCollator {
    fn default() -> Self {
        Self::new()
    }
}

/// One-off comparison; sorting builds a single [`LocaleCollator`] instead.
pub fn locale_compare(a: &str, b: &str) -> Ordering {
    LocaleCollator::new().compare(a, b)
}

fn folded_compare(a: &str, b: &str) -> Ordering {
    a.chars()
        .flat_map(char::to_lowercase)
        .cmp(b.chars().flat_map(char::to_lowercase))
        .then_with(|| {
            a.chars()
                .map(char::is_uppercase)
                .cmp(b.chars().map(char::is_uppercase))
        })
        .then_with(|| a.cmp(b))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::{Cell, Row};

    fn doc(vars: &[&str], rows: &[&[(&str, &str)]]) -> Arc<ResultDocument> {
        let bindings = rows
            .iter()
            .map(|cells| {
                cells
                    .iter()
                    .fold(Row::new(), |row, (col, val)| row.with(*col, Cell::literal(*val)))
            })
            .collect();
        Arc::new(ResultDocument::new(
            vars.iter().map(|v| v.to_string()).collect(),
            bindings,
        ))
    }

    fn names() -> Arc<ResultDocument> {
        doc(
            &["name", "group"],
            &[
                &[("name", "Alice"), ("group", "b")],
                &[("name", "bob"), ("group", "a")],
                &[("name", "Carol"), ("group", "b")],
                &[("name", "dave")],
                &[("name", "Bea"), ("group", "a")],
            ],
        )
    }

    #[test]
    fn filter_is_case_insensitive_across_columns() {
        let doc = names();
        assert_eq!(filter_rows(&doc, "B"), vec![0, 1, 2, 4]);
        assert_eq!(filter_rows(&doc, "aro"), vec![2]);
        assert_eq!(filter_rows(&doc, "zzz"), Vec::<usize>::new());
        assert_eq!(filter_rows(&doc, ""), vec![0, 1, 2, 3, 4]);
    }

    #[test]
    fn filter_matches_brute_force() {
        let doc = names();
        for query in ["a", "A", "e", "ol", "b", "x", "Da"] {
            let expected: Vec<usize> = doc
                .rows()
                .iter()
                .enumerate()
                .filter(|(_, row)| {
                    doc.columns().iter().any(|c| {
                        row.value(c)
                            .to_lowercase()
                            .contains(&query.to_lowercase())
                    })
                })
                .map(|(i, _)| i)
                .collect();
            assert_eq!(filter_rows(&doc, query), expected, "query {query}");
        }
    }

    #[test]
    fn filter_ignores_cells_outside_head_vars() {
        let doc = doc(&["name"], &[&[("name", "x"), ("hidden", "needle")]]);
        assert!(filter_rows(&doc, "needle").is_empty());
    }

    #[test]
    fn sort_is_stable_in_both_directions() {
        let doc = names();
        let mut rows: Vec<usize> = (0..5).collect();
        sort_rows(&doc, &mut rows, "group", SortDirection::Asc);
        // row 3 has no group and sorts as the empty string
        assert_eq!(rows, vec![3, 1, 4, 0, 2]);

        let mut rows: Vec<usize> = (0..5).collect();
        sort_rows(&doc, &mut rows, "group", SortDirection::Desc);
        assert_eq!(rows, vec![0, 2, 1, 4, 3]);
    }

    #[test]
    fn sort_uses_case_insensitive_order() {
        let doc = names();
        let mut rows: Vec<usize> = (0..5).collect();
        sort_rows(&doc, &mut rows, "name", SortDirection::Asc);
        assert_eq!(rows, vec![0, 4, 1, 2, 3]);
    }

    #[test]
    fn locale_compare_orders_lowercase_first_on_ties() {
        assert_eq!(locale_compare("a", "B"), Ordering::Less);
        assert_eq!(locale_compare("b", "A"), Ordering::Greater);
        assert_eq!(locale_compare("a", "A"), Ordering::Less);
        assert_eq!(locale_compare("", "a"), Ordering::Less);
        assert_eq!(locale_compare("same", "same"), Ordering::Equal);
    }

    #[test]
    fn accented_letters_sort_with_their_base_letter() {
        assert_eq!(locale_compare("éclair", "fig"), Ordering::Less);
        assert_eq!(locale_compare("Ångström", "beta"), Ordering::Less);
        assert_eq!(locale_compare("eclair", "éclair"), Ordering::Less);
        assert_eq!(locale_compare("éclair", "eclairs"), Ordering::Less);
    }

    #[test]
    fn sort_places_accented_values_among_plain_ones() {
        let doc = doc(
            &["word"],
            &[
                &[("word", "fig")],
                &[("word", "éclair")],
                &[("word", "beta")],
                &[("word", "Ångström")],
                &[("word", "zeta")],
            ],
        );
        let mut rows: Vec<usize> = (0..5).collect();
        sort_rows(&doc, &mut rows, "word", SortDirection::Asc);
        assert_eq!(rows, vec![3, 2, 1, 0, 4]);
    }

    #[test]
    fn toggle_rules() {
        let mut view = ViewState::new();
        view.set_document(Some(names()));
        assert_eq!(view.sort_column(), None);

        view.toggle_sort("name");
        assert_eq!(view.sort_column(), Some("name"));
        assert_eq!(view.sort_direction(), SortDirection::Asc);

        view.toggle_sort("name");
        assert_eq!(view.sort_direction(), SortDirection::Desc);
        view.toggle_sort("name");
        assert_eq!(view.sort_direction(), SortDirection::Asc);

        view.toggle_sort("name");
        view.toggle_sort("group");
        assert_eq!(view.sort_column(), Some("group"));
        assert_eq!(view.sort_direction(), SortDirection::Asc);
    }

    #[test]
    fn derived_rows_follow_every_input() {
        let mut view = ViewState::new();
        view.set_document(Some(names()));
        view.set_search_query("b");
        assert_eq!(view.filtered_rows(), &[0, 1, 2, 4]);

        view.toggle_sort("name");
        assert_eq!(view.filtered_rows(), &[0, 4, 1, 2]);
        view.toggle_sort("name");
        assert_eq!(view.filtered_rows(), &[2, 1, 4, 0]);

        view.set_search_query("BE");
        assert_eq!(view.filtered_rows(), &[4]);
        assert_eq!(view.summary(), "Showing 1 of 5 rows");

        view.set_document(None);
        assert!(view.filtered_rows().is_empty());
        assert_eq!(view.total_rows(), 0);
    }

    #[test]
    fn empty_query_hides_all_rows() {
        let mut view = ViewState::new();
        view.set_document(Some(names()));
        assert_eq!(view.filtered_rows().len(), 5);
        assert!(view.visible_rows().is_empty());
        assert_eq!(view.summary(), "Showing 0 of 5 rows");
    }
}
