use serde::{Deserialize, Serialize};

use super::encode::{append_field, format_key, FormEncode};
use super::values::Values;

/// Free-form pairs for parameters the typed structs do not model.
///
/// Each pair is emitted under the enclosing key path, after every structured
/// field of the parameter struct.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ExtraValues {
    values: Values,
}

impl ExtraValues {
    /// Creates an empty bag.
    #[must_use]
    pub const fn new() -> Self {
        Self { values: Values::new() }
    }

    /// Adds a raw pair. `key` may already contain brackets.
    pub fn add(&mut self, key: impl Into<String>, value: impl Into<String>) {
        self.values.add(key, value);
    }

    /// Whether any pair was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl FormEncode for ExtraValues {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        for (key, value) in self.values.iter() {
            let mut path = keys.to_vec();
            path.push(key.to_string());
            values.add(format_key(&path), value);
        }
    }
}

/// One `key[op]=value` filter.
#[derive(Debug, Clone, PartialEq, Eq)]
struct Filter {
    key: String,
    op: Option<String>,
    value: String,
}

/// List filters such as `created[gte]=...`.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Filters {
    filters: Vec<Filter>,
}

impl Filters {
    /// Creates an empty filter set.
    #[must_use]
    pub const fn new() -> Self {
        Self { filters: Vec::new() }
    }

    /// Adds a filter. An empty `op` produces a plain `key=value` pair.
    pub fn add_filter(
        &mut self,
        key: impl Into<String>,
        op: impl Into<String>,
        value: impl Into<String>,
    ) {
        let op = op.into();
        self.filters.push(Filter {
            key: key.into(),
            op: (!op.is_empty()).then_some(op),
            value: value.into(),
        });
    }

    /// Whether any filter was added.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.filters.is_empty()
    }
}

impl FormEncode for Filters {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        for filter in &self.filters {
            let mut path = keys.to_vec();
            path.push(filter.key.clone());
            if let Some(op) = &filter.op {
                path.push(op.clone());
            }
            values.add(format_key(&path), filter.value.clone());
        }
    }
}

/// Range bounds on a numeric list field (`created`, `amount`, ...).
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RangeQueryParams {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub gte: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lt: Option<i64>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub lte: Option<i64>,
}

impl FormEncode for RangeQueryParams {
    fn append_to(&self, values: &mut Values, keys: &[String]) {
        append_field(values, keys, "gt", &self.gt);
        append_field(values, keys, "gte", &self.gte);
        append_field(values, keys, "lt", &self.lt);
        append_field(values, keys, "lte", &self.lte);
    }
}
