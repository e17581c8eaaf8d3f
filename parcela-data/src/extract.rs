//! Schema-tolerant field access over registry payloads.
//!
//! The registry's JSON drifts between service revisions: keys change case,
//! single records turn into one-element lists, and empty strings stand in
//! for missing values. [`NormalizedExtractor`] hides those differences
//! behind candidate paths tried in priority order.
//!
//! # Path rules
//!
//! - Paths are dot-separated object keys matched exactly (`"dt.locs.lous"`).
//!   The empty path addresses the root.
//! - At every step, and on the final value, an array stands for its first
//!   element.
//! - A missing key anywhere yields `None`, never an error.
//! - `null`, blank strings, `[]` and `{}` count as empty.
//!
//! # Examples
//!
//! ```
//! use parcela_data::NormalizedExtractor;
//! use serde_json::json;
//!
//! let payload = json!({"bico": [{"bi": {"debi": {"luso": " Residencial ", "sfc": "120"}}}]});
//! let extractor = NormalizedExtractor::new(&payload);
//!
//! assert_eq!(
//!     extractor.text(&["bico.bi.debi.uso", "bico.bi.debi.luso"]),
//!     Some("Residencial".to_owned())
//! );
//! assert_eq!(extractor.number(&["bico.bi.debi.sfc"]), Some(120.0));
//! assert!(extractor.value(&["bico.bi.dt"]).is_none());
//! ```

use serde_json::Value;

/// Read-only view over a JSON document with normalised path lookup.
#[derive(Debug, Clone, Copy)]
pub struct NormalizedExtractor<'a> {
    root: &'a Value,
}

impl<'a> NormalizedExtractor<'a> {
    /// Wrap `root`.
    #[must_use]
    pub const fn new(root: &'a Value) -> Self {
        Self { root }
    }

    /// The document this extractor reads from.
    #[must_use]
    pub const fn root(&self) -> &'a Value {
        self.root
    }

    /// First non-empty value among `paths`.
    #[must_use]
    pub fn value(&self, paths: &[&str]) -> Option<&'a Value> {
        paths
            .iter()
            .filter_map(|path| self.walk(path))
            .map(first_of)
            .find(|value| !is_empty(value))
    }

    /// First non-empty value among `paths` rendered as trimmed text.
    ///
    /// Numbers and booleans are rendered with their JSON spelling; objects
    /// and arrays of objects are skipped.
    #[must_use]
    pub fn text(&self, paths: &[&str]) -> Option<String> {
        paths
            .iter()
            .filter_map(|path| self.walk(path))
            .find_map(|value| as_text(first_of(value)))
    }

    /// First value among `paths` readable as a finite number.
    ///
    /// Numeric strings are accepted, including a decimal comma (`"4,2"`).
    #[must_use]
    pub fn number(&self, paths: &[&str]) -> Option<f64> {
        paths
            .iter()
            .filter_map(|path| self.walk(path))
            .find_map(|value| as_number(first_of(value)))
    }

    /// Records at the first of `paths` holding a non-empty value.
    ///
    /// A list yields its non-empty elements; a single record yields a
    /// one-element list.
    #[must_use]
    pub fn records(&self, paths: &[&str]) -> Vec<&'a Value> {
        let Some(found) = paths
            .iter()
            .filter_map(|path| self.walk(path))
            .find(|value| !is_empty(value))
        else {
            return Vec::new();
        };
        match found {
            Value::Array(items) => items.iter().filter(|item| !is_empty(item)).collect(),
            single => vec![single],
        }
    }

    /// Re-root extraction on the first non-empty sub-document among `paths`.
    #[must_use]
    pub fn scope(&self, paths: &[&str]) -> Option<Self> {
        self.value(paths).map(Self::new)
    }

    /// Follow `path`, normalising arrays on every intermediate step but
    /// leaving the final value untouched.
    fn walk(&self, path: &str) -> Option<&'a Value> {
        path.split('.')
            .filter(|segment| !segment.is_empty())
            .try_fold(self.root, |current, segment| first_of(current).get(segment))
    }
}

fn first_of(value: &Value) -> &Value {
    match value {
        Value::Array(items) => items.first().unwrap_or(value),
        other => other,
    }
}

fn is_empty(value: &Value) -> bool {
    match value {
        Value::Null => true,
        Value::String(text) => text.trim().is_empty(),
        Value::Array(items) => items.is_empty(),
        Value::Object(fields) => fields.is_empty(),
        Value::Bool(_) | Value::Number(_) => false,
    }
}

fn as_text(value: &Value) -> Option<String> {
    match value {
        Value::String(text) => {
            let trimmed = text.trim();
            (!trimmed.is_empty()).then(|| trimmed.to_owned())
        }
        Value::Number(number) => Some(number.to_string()),
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Null | Value::Array(_) | Value::Object(_) => None,
    }
}

fn as_number(value: &Value) -> Option<f64> {
    let parsed = match value {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => parse_decimal(text.trim()),
        Value::Null | Value::Bool(_) | Value::Array(_) | Value::Object(_) => None,
    };
    parsed.filter(|number| number.is_finite())
}

fn parse_decimal(text: &str) -> Option<f64> {
    if text.is_empty() {
        return None;
    }
    if text.contains(',') && !text.contains('.') {
        return text.replacen(',', ".", 1).parse().ok();
    }
    text.parse().ok()
}
