//! Typed scalar cells and header-keyed rows.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};

/// A single normalized cell value.
///
/// The variant is decided once, when the source is parsed, and is preserved
/// verbatim through storage and every later read. Serialized untagged so the
/// stored JSON reads naturally: `"Ada"`, `30`, `true`, `null`.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(untagged)]
pub enum CellValue {
    /// Missing or blank value.
    #[default]
    Empty,
    Bool(bool),
    Number(f64),
    Text(String),
}

impl CellValue {
    /// Creates a text cell.
    pub fn text(value: impl Into<String>) -> Self {
        Self::Text(value.into())
    }

    /// Returns true for `Empty` and for whitespace-only text.
    pub fn is_blank(&self) -> bool {
        match self {
            Self::Empty => true,
            Self::Text(s) => s.trim().is_empty(),
            Self::Bool(_) | Self::Number(_) => false,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Self::Number(n) => Some(*n),
            _ => None,
        }
    }

    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Text(s) => Some(s),
            _ => None,
        }
    }

    pub fn as_bool(&self) -> Option<bool> {
        match self {
            Self::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl fmt::Display for CellValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Empty => Ok(()),
            Self::Bool(b) => write!(f, "{b}"),
            // Integral values print without a trailing ".0"
            Self::Number(n) if n.fract() == 0.0 && n.abs() < 1e15 => write!(f, "{n:.0}"),
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
        }
    }
}

impl From<&str> for CellValue {
    fn from(value: &str) -> Self {
        Self::Text(value.to_string())
    }
}

impl From<String> for CellValue {
    fn from(value: String) -> Self {
        Self::Text(value)
    }
}

impl From<f64> for CellValue {
    fn from(value: f64) -> Self {
        Self::Number(value)
    }
}

impl From<bool> for CellValue {
    fn from(value: bool) -> Self {
        Self::Bool(value)
    }
}

/// One record of a dataset: a mapping from header name to cell value.
///
/// Rows built through [`Row::from_cells`] contain exactly one entry per
/// header, so every header is addressable in every row.
#[derive(Debug, Clone, PartialEq, Default, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Row(BTreeMap<String, CellValue>);

impl Row {
    /// Builds a row from positional cells.
    ///
    /// Missing trailing cells are filled with `filler`; cells beyond the
    /// last header are dropped.
    pub fn from_cells<I>(headers: &[String], cells: I, filler: &CellValue) -> Self
    where
        I: IntoIterator<Item = CellValue>,
    {
        let mut cells = cells.into_iter();
        let map = headers
            .iter()
            .map(|header| {
                let value = cells.next().unwrap_or_else(|| filler.clone());
                (header.clone(), value)
            })
            .collect();
        Self(map)
    }

    pub fn get(&self, header: &str) -> Option<&CellValue> {
        self.0.get(header)
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Returns the cells in the given header order.
    pub fn values_in<'a>(&'a self, headers: &'a [String]) -> impl Iterator<Item = &'a CellValue> {
        static EMPTY: CellValue = CellValue::Empty;
        headers.iter().map(|h| self.0.get(h).unwrap_or(&EMPTY))
    }

    /// Returns true when every header of the dataset has an entry in this row.
    pub fn covers(&self, headers: &[String]) -> bool {
        headers.iter().all(|h| self.0.contains_key(h))
    }
}

impl<K: Into<String>, V: Into<CellValue>> FromIterator<(K, V)> for Row {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self(iter.into_iter().map(|(k, v)| (k.into(), v.into())).collect())
    }
}
