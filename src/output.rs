//! `OutputConfig`: the terminal, typed output of a column's transformation
//! chain, before nil-handling resolves it into a [`crate::cell::CellValue`].
//!
//! Every terminal variant carries an `Option<T>` (spec §3's invariant); the
//! presence or absence of a value is meaningful independently of whether the
//! column's nil-handling mode will later substitute a default.

use crate::cell::BoolExpr;
use chrono::{DateTime, FixedOffset};

/// The exhaustive set of terminal output shapes a column's transform chain
/// may produce (spec §3, §4.1).
#[derive(Debug, Clone, PartialEq)]
pub enum OutputConfig {
    Text(Option<String>),
    Int(Option<i64>),
    Double(Option<f64>),
    Bool(Option<bool>, BoolExpr),
    Date(Option<DateTime<FixedOffset>>),
    Url(Option<String>),
    Percentage(Option<f64>, u8),
}

impl OutputConfig {
    /// Whether the underlying `Option` is `None`.
    pub fn is_nil(&self) -> bool {
        match self {
            OutputConfig::Text(v) => v.is_none(),
            OutputConfig::Int(v) => v.is_none(),
            OutputConfig::Double(v) => v.is_none(),
            OutputConfig::Bool(v, _) => v.is_none(),
            OutputConfig::Date(v) => v.is_none(),
            OutputConfig::Url(v) => v.is_none(),
            OutputConfig::Percentage(v, _) => v.is_none(),
        }
    }
}
