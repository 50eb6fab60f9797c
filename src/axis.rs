//! Axis selection options
//!
//! Derives selectable value sets per candidate axis column and manages the
//! select-all / deselect-all sentinel policy. Tiny domains default to fully
//! selected; huge domains (past [`SIZE_THRESHOLD`] distinct values) start
//! with a single concrete value so the UI never renders hundreds of chips.
//!
//! All option lists and selections live in an [`AxisState`] owned by the
//! caller for the lifetime of one UI session; nothing here is shared across
//! result sets.

use std::collections::{HashMap, HashSet};

use serde::Serialize;

use crate::infer::ColType;
use crate::table::{TableColumn, TableRow};
use crate::value::Value;

/// Domain cardinality above which an axis starts out mostly deselected.
pub const SIZE_THRESHOLD: usize = 400;

/// Separator used for composite labels and axis keys.
pub const SEPARATOR: &str = "-";

pub const SELECT_ALL: &str = "select-all";
pub const DESELECT_ALL: &str = "deselect-all";
/// Placeholder standing for "the entire domain" in a selection set.
pub const ALL_SELECTED: &str = "all-selected";

/// One selectable axis value.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct AxisOption {
    pub label: String,
    pub value: String,
}

impl AxisOption {
    pub fn new(label: impl Into<String>, value: impl Into<String>) -> Self {
        AxisOption {
            label: label.into(),
            value: value.into(),
        }
    }

    fn select_all() -> Self {
        AxisOption::new("Select All", SELECT_ALL)
    }

    fn deselect_all() -> Self {
        AxisOption::new("Deselect All", DESELECT_ALL)
    }

    fn all_selected() -> Self {
        AxisOption::new("All", ALL_SELECTED)
    }

    /// True for the synthetic select-all / deselect-all toggle.
    pub fn is_sentinel(&self) -> bool {
        self.value == SELECT_ALL || self.value == DESELECT_ALL
    }
}

/// Join cell values into a composite label with the shared separator.
pub fn join_values<'a>(values: impl IntoIterator<Item = &'a Value>) -> String {
    values
        .into_iter()
        .map(Value::to_key_string)
        .collect::<Vec<_>>()
        .join(SEPARATOR)
}

/// Lowercase and hyphenate a label into an option value.
pub fn clean_string(s: &str) -> String {
    s.to_lowercase().replace(' ', "-")
}

/// Distinct composite values of the given columns, in order of first
/// appearance across the rows.
pub fn column_values(rows: &[TableRow], keys: &[String]) -> Vec<String> {
    if keys.is_empty() || rows.is_empty() {
        return Vec::new();
    }
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for row in rows {
        let label = join_values(keys.iter().map(|k| row.get(k).unwrap_or(&Value::Null)));
        if seen.insert(label.clone()) {
            out.push(label);
        }
    }
    out
}

/// Build the option list for one axis: the concrete values (cleaned for
/// string-typed columns) behind a sentinel sized to the domain.
pub fn build_options(values: &[String], col_type: ColType) -> Vec<AxisOption> {
    let mut opts: Vec<AxisOption> = values
        .iter()
        .map(|v| {
            let value = if col_type == ColType::String {
                clean_string(v)
            } else {
                v.clone()
            };
            AxisOption::new(v.clone(), value)
        })
        .collect();

    let sentinel = if opts.len() > SIZE_THRESHOLD {
        AxisOption::select_all()
    } else {
        AxisOption::deselect_all()
    };
    opts.insert(0, sentinel);
    opts
}

/// Initial selection for an axis: small domains are fully selected (the
/// `All` placeholder), large domains start with exactly the first concrete
/// value.
fn default_selection(options: &[AxisOption], domain_size: usize) -> Vec<AxisOption> {
    if domain_size > SIZE_THRESHOLD {
        options.get(1).cloned().into_iter().collect()
    } else {
        vec![AxisOption::all_selected()]
    }
}

/// Caller-owned cache of per-axis value domains, option lists, and current
/// selections. Lives for one UI session alongside one result set.
#[derive(Debug, Default)]
pub struct AxisState {
    values: HashMap<String, Vec<String>>,
    options: HashMap<String, Vec<AxisOption>>,
    selected: HashMap<String, Vec<AxisOption>>,
}

impl AxisState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Cache key for a set of axis columns.
    pub fn axis_key(columns: &[&TableColumn]) -> String {
        columns
            .iter()
            .map(|c| c.key.as_str())
            .collect::<Vec<_>>()
            .join(SEPARATOR)
    }

    /// Activate an axis selection: derive its value domain and option list
    /// on first use (a multi-column composite is treated as its own
    /// string-typed column), reset the sentinel to match the domain size on
    /// reuse, and install the default selection. Returns the axis key.
    pub fn activate(&mut self, rows: &[TableRow], columns: &[&TableColumn]) -> String {
        let key = Self::axis_key(columns);
        if columns.is_empty() {
            return key;
        }

        if !self.values.contains_key(&key) {
            let keys: Vec<String> = columns.iter().map(|c| c.key.clone()).collect();
            let values = column_values(rows, &keys);
            // Composites have no inferred type of their own.
            let col_type = if columns.len() == 1 {
                columns[0]
                    .descriptor
                    .as_ref()
                    .map(|d| d.col_type)
                    .unwrap_or(ColType::String)
            } else {
                ColType::String
            };
            let options = build_options(&values, col_type);
            self.values.insert(key.clone(), values);
            self.options.insert(key.clone(), options);
        } else if let Some(options) = self.options.get_mut(&key) {
            // Revisited axis: the sentinel must reflect the domain size
            // again, whatever state a previous toggle left it in.
            let domain_size = self.values.get(&key).map(Vec::len).unwrap_or(0);
            if let Some(first) = options.first_mut() {
                *first = if domain_size > SIZE_THRESHOLD {
                    AxisOption::select_all()
                } else {
                    AxisOption::deselect_all()
                };
            }
        }

        let domain_size = self.values.get(&key).map(Vec::len).unwrap_or(0);
        let selection = self
            .options
            .get(&key)
            .map(|opts| default_selection(opts, domain_size))
            .unwrap_or_default();
        self.selected.insert(key.clone(), selection);
        key
    }

    /// Apply a selection change for an axis, handling the sentinel toggle:
    ///
    /// - picking `select-all` collapses the selection to the `All`
    ///   placeholder and flips the sentinel to `Deselect All`;
    /// - picking `deselect-all` empties the selection and flips the
    ///   sentinel back to `Select All`;
    /// - picking concrete values resets the sentinel to `Select All` and
    ///   drops any lingering placeholder from the selection.
    ///
    /// An unknown axis key is a diagnostic, not an error: the selection
    /// state is left unchanged.
    pub fn apply_selection(&mut self, axis: &str, chosen: &[AxisOption]) {
        let Some(options) = self.options.get_mut(axis) else {
            log::warn!("selection change for unknown axis '{}'; ignoring", axis);
            return;
        };
        let Some(sentinel) = options.first_mut() else {
            return;
        };

        let selection = if chosen.iter().any(|o| o.value == SELECT_ALL) {
            *sentinel = AxisOption::deselect_all();
            vec![AxisOption::all_selected()]
        } else if chosen.iter().any(|o| o.value == DESELECT_ALL) {
            *sentinel = AxisOption::select_all();
            Vec::new()
        } else {
            *sentinel = AxisOption::select_all();
            chosen
                .iter()
                .filter(|o| !o.label.is_empty() && o.value != ALL_SELECTED)
                .cloned()
                .collect()
        };
        self.selected.insert(axis.to_string(), selection);
    }

    /// Current selection for an axis (empty when unknown).
    pub fn selected(&self, axis: &str) -> &[AxisOption] {
        self.selected.get(axis).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Current option list for an axis (sentinel first; empty when unknown).
    pub fn options(&self, axis: &str) -> &[AxisOption] {
        self.options.get(axis).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Cached value domain for an axis.
    pub fn values(&self, axis: &str) -> &[String] {
        self.values.get(axis).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Expand the selection for consumption by the chart aggregator: the
    /// `All` placeholder becomes the full concrete option list.
    pub fn resolve_selected(&self, axis: &str) -> Vec<AxisOption> {
        let selection = self.selected(axis);
        if selection.iter().any(|o| o.value == ALL_SELECTED) {
            self.options(axis)
                .iter()
                .skip(1)
                .cloned()
                .collect()
        } else {
            selection.to_vec()
        }
    }
}
