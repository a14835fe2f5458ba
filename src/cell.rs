//! The cell-value model: the closed sum of encodings a cell may take.
//!
//! Splitting optional from non-optional variants is load-bearing (spec
//! §3): XML emission for non-optional variants skips nil checks entirely,
//! and the transform chain can tell statically whether a closure must
//! accept `Option<T>` or `T`.

use chrono::{DateTime, FixedOffset};

/// How a boolean value is rendered in the worksheet.
#[derive(Debug, Clone, PartialEq, Eq, Hash)]
pub enum BoolExpr {
    /// Native Excel boolean: `t="b"`, value `1`/`0`.
    OneZero,
    /// Text "TRUE"/"FALSE", interned as a shared string.
    TrueFalse,
    /// Text "YES"/"NO", interned as a shared string.
    YesNo,
    /// Text "T"/"F", interned as a shared string.
    TF,
    /// Caller-chosen text pair, interned as a shared string.
    Custom { true_str: String, false_str: String },
}

impl BoolExpr {
    /// A [`BoolExpr::Custom`] built from any string-like pair.
    pub fn custom(true_str: impl Into<String>, false_str: impl Into<String>) -> Self {
        BoolExpr::Custom {
            true_str: true_str.into(),
            false_str: false_str.into(),
        }
    }

    /// `true` only for `OneZero`: the one encoding that uses the native `t="b"` path.
    pub fn is_native(&self) -> bool {
        matches!(self, BoolExpr::OneZero)
    }

    /// The text rendering of `value` under this expression. Meaningless for `OneZero`.
    pub fn render(&self, value: bool) -> &str {
        match (self, value) {
            (BoolExpr::OneZero, true) => "1",
            (BoolExpr::OneZero, false) => "0",
            (BoolExpr::TrueFalse, true) => "TRUE",
            (BoolExpr::TrueFalse, false) => "FALSE",
            (BoolExpr::YesNo, true) => "YES",
            (BoolExpr::YesNo, false) => "NO",
            (BoolExpr::TF, true) => "T",
            (BoolExpr::TF, false) => "F",
            (BoolExpr::Custom { true_str, .. }, true) => true_str,
            (BoolExpr::Custom { false_str, .. }, false) => false_str,
        }
    }
}

/// A cell value together with the encoding rules that determine how it is
/// written into a worksheet's `<c>` element (spec §3).
#[derive(Debug, Clone, PartialEq)]
pub enum CellValue {
    StringValue(String),
    OptionalString(Option<String>),
    IntValue(i64),
    OptionalInt(Option<i64>),
    DoubleValue(f64),
    OptionalDouble(Option<f64>),
    DateValue(DateTime<FixedOffset>),
    OptionalDate(Option<DateTime<FixedOffset>>),
    BoolValue(bool, BoolExpr),
    OptionalBool(Option<bool>, BoolExpr),
    URLValue(String),
    OptionalURL(Option<String>),
    /// precision is the number of decimal digits shown after the `%` scaling.
    Percentage(Option<f64>, u8),
    Empty,
}

impl CellValue {
    /// Whether this cell, once resolved, must be routed through the
    /// shared-string registry rather than written inline.
    pub fn is_string_like(&self) -> bool {
        match self {
            CellValue::StringValue(_) => true,
            CellValue::OptionalString(v) => v.is_some(),
            CellValue::URLValue(_) => true,
            CellValue::OptionalURL(v) => v.is_some(),
            CellValue::BoolValue(_, expr) => !expr.is_native(),
            CellValue::OptionalBool(Some(_), expr) => !expr.is_native(),
            _ => false,
        }
    }

    /// Whether emission should skip the cell entirely (no `<v>` element),
    /// per the `KeepEmpty` + `None` rule (spec §4.1).
    pub fn is_empty_cell(&self) -> bool {
        matches!(
            self,
            CellValue::Empty
                | CellValue::OptionalString(None)
                | CellValue::OptionalInt(None)
                | CellValue::OptionalDouble(None)
                | CellValue::OptionalDate(None)
                | CellValue::OptionalURL(None)
                | CellValue::OptionalBool(None, _)
                | CellValue::Percentage(None, _)
        )
    }
}
