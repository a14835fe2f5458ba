//! The column engine: `Column<R>`, `ColumnBuilder<R, T>`, nil-handling, and
//! the transformation chain that produces a terminal `OutputConfig`.
//!
//! No teacher analogue exists (the teacher writes untyped rows of
//! `CellValue` directly); the type-erased `Box<dyn Fn(&R) -> OutputConfig>`
//! wrapper is the Rust re-expression of the generic accessor the original
//! design calls for, matching the "plain struct + inherent methods, no
//! macros" style seen throughout the teacher's `writer.rs`.

use crate::cell::BoolExpr;
use crate::output::OutputConfig;
use crate::style::{CellStyle, ColumnWidth};
use chrono::{DateTime, FixedOffset};

/// How a column resolves a missing (`None`) extracted value at emission time.
#[derive(Clone)]
pub enum NilHandling<T> {
    /// Absence stays absence; the cell is emitted empty.
    KeepEmpty,
    /// Absence is replaced by `v` before emission.
    DefaultValue(T),
}

/// A fully assembled, type-erased column ready to join a `Sheet<R>`.
pub struct Column<R> {
    display_name: String,
    width: Option<ColumnWidth>,
    header_style: Option<CellStyle>,
    body_style: Option<CellStyle>,
    when: Option<Box<dyn Fn(&R) -> bool>>,
    resolve: Box<dyn Fn(&R) -> OutputConfig>,
}

impl<R> Column<R> {
    pub fn display_name(&self) -> &str {
        &self.display_name
    }

    pub fn width(&self) -> Option<ColumnWidth> {
        self.width
    }

    pub fn header_style(&self) -> Option<&CellStyle> {
        self.header_style.as_ref()
    }

    pub fn body_style(&self) -> Option<&CellStyle> {
        self.body_style.as_ref()
    }

    /// The visibility predicate, checked against the first record (spec
    /// §4.1): empty input keeps every column active so headers still appear.
    pub fn is_visible(&self, first_record: Option<&R>) -> bool {
        match (&self.when, first_record) {
            (Some(predicate), Some(record)) => predicate(record),
            _ => true,
        }
    }

    /// Run this column's full transformation chain against one record.
    pub fn resolve(&self, record: &R) -> OutputConfig {
        (self.resolve)(record)
    }
}

type Accessor<R, T> = Box<dyn Fn(&R) -> Option<T>>;
type Predicate<R> = Box<dyn Fn(&R) -> bool>;

/// A column under construction: a display name bound to an accessor,
/// optionally refined with nil-handling, conditional mapping, a visibility
/// predicate, widths, and per-column styles, before a terminal `to_*` call
/// produces the finished `Column<R>` (spec §4.1).
pub struct ColumnBuilder<R, T> {
    display_name: String,
    accessor: Accessor<R, T>,
    conditional: Option<(Predicate<R>, Accessor<R, T>, Accessor<R, T>)>,
    nil_handling: NilHandling<T>,
    width: Option<ColumnWidth>,
    header_style: Option<CellStyle>,
    body_style: Option<CellStyle>,
    when: Option<Predicate<R>>,
}

impl<R, T> ColumnBuilder<R, T>
where
    R: 'static,
    T: Clone + 'static,
{
    /// Bind a display name to an accessor that may be absent per record.
    pub fn optional(
        display_name: impl Into<String>,
        accessor: impl Fn(&R) -> Option<T> + 'static,
    ) -> Self {
        ColumnBuilder {
            display_name: display_name.into(),
            accessor: Box::new(accessor),
            conditional: None,
            nil_handling: NilHandling::KeepEmpty,
            width: None,
            header_style: None,
            body_style: None,
            when: None,
        }
    }

    /// Bind a display name to an accessor that is always present.
    pub fn required(
        display_name: impl Into<String>,
        accessor: impl Fn(&R) -> T + 'static,
    ) -> Self {
        ColumnBuilder::optional(display_name, move |record| Some(accessor(record)))
    }

    /// Substitute `default` wherever the accessor (or conditional mapping)
    /// yields `None`, instead of keeping the cell empty.
    pub fn default_value(mut self, default: T) -> Self {
        self.nil_handling = NilHandling::DefaultValue(default);
        self
    }

    /// Restrict this column to records for which `predicate` holds. The
    /// sheet engine evaluates this only against the first record (spec §4.1).
    pub fn when(mut self, predicate: impl Fn(&R) -> bool + 'static) -> Self {
        self.when = Some(Box::new(predicate));
        self
    }

    /// Route extraction through one of two accessors depending on
    /// `filter(record)`. Conditional mapping runs before nil-handling
    /// (spec §4.1).
    pub fn conditional(
        mut self,
        filter: impl Fn(&R) -> bool + 'static,
        if_true: impl Fn(&R) -> Option<T> + 'static,
        if_false: impl Fn(&R) -> Option<T> + 'static,
    ) -> Self {
        self.conditional = Some((Box::new(filter), Box::new(if_true), Box::new(if_false)));
        self
    }

    pub fn width(mut self, width: ColumnWidth) -> Self {
        self.width = Some(width);
        self
    }

    pub fn header_style(mut self, style: CellStyle) -> Self {
        self.header_style = Some(style);
        self
    }

    pub fn body_style(mut self, style: CellStyle) -> Self {
        self.body_style = Some(style);
        self
    }

}

/// Shared plumbing for every terminal `to_*_with`/`to_*_opt_with` pair:
/// builds the final `Column<R>` from a builder's fields plus a closure that
/// turns the resolved `Option<T>` into the target `OutputConfig` variant.
fn build<R, T>(
    builder: ColumnBuilder<R, T>,
    to_output: impl Fn(Option<T>) -> OutputConfig + 'static,
) -> Column<R>
where
    R: 'static,
    T: Clone + 'static,
{
    let ColumnBuilder {
        display_name,
        accessor,
        conditional,
        nil_handling,
        width,
        header_style,
        body_style,
        when,
    } = builder;

    let resolve = move |record: &R| -> OutputConfig {
        let extracted = match &conditional {
            Some((filter, if_true, if_false)) => {
                if filter(record) {
                    if_true(record)
                } else {
                    if_false(record)
                }
            }
            None => accessor(record),
        };
        let resolved = match extracted {
            Some(v) => Some(v),
            None => match &nil_handling {
                NilHandling::DefaultValue(default) => Some(default.clone()),
                NilHandling::KeepEmpty => None,
            },
        };
        to_output(resolved)
    };

    Column {
        display_name,
        width,
        header_style,
        body_style,
        when,
        resolve: Box::new(resolve),
    }
}

impl<R> ColumnBuilder<R, String>
where
    R: 'static,
{
    /// Terminal conversion for columns whose nil-handling resolves to a
    /// value (`DefaultValue`, or an accessor that is never `None`).
    /// `f` receives the resolved value directly; if nil-handling is
    /// `KeepEmpty` and the accessor yields `None`, `f` is simply skipped
    /// and the cell stays empty; Rust's `Option::map` makes the "legal
    /// only when non-optional" constraint from the original design
    /// unnecessary to enforce separately.
    pub fn to_string_with(self, f: impl Fn(String) -> String + 'static) -> Column<R> {
        build(self, move |resolved| OutputConfig::Text(resolved.map(&f)))
    }

    /// Terminal conversion that always receives the full `Option<String>`,
    /// for transforms that care about absence itself.
    pub fn to_string_opt_with(
        self,
        f: impl Fn(Option<String>) -> Option<String> + 'static,
    ) -> Column<R> {
        build(self, move |resolved| OutputConfig::Text(f(resolved)))
    }

    pub fn to_url_with(self, f: impl Fn(String) -> String + 'static) -> Column<R> {
        build(self, move |resolved| OutputConfig::Url(resolved.map(&f)))
    }

    pub fn to_url_opt_with(
        self,
        f: impl Fn(Option<String>) -> Option<String> + 'static,
    ) -> Column<R> {
        build(self, move |resolved| OutputConfig::Url(f(resolved)))
    }
}

impl<R> ColumnBuilder<R, i64>
where
    R: 'static,
{
    pub fn to_int_with(self, f: impl Fn(i64) -> i64 + 'static) -> Column<R> {
        build(self, move |resolved| OutputConfig::Int(resolved.map(&f)))
    }

    pub fn to_int_opt_with(self, f: impl Fn(Option<i64>) -> Option<i64> + 'static) -> Column<R> {
        build(self, move |resolved| OutputConfig::Int(f(resolved)))
    }
}

impl<R> ColumnBuilder<R, f64>
where
    R: 'static,
{
    pub fn to_double_with(self, f: impl Fn(f64) -> f64 + 'static) -> Column<R> {
        build(self, move |resolved| OutputConfig::Double(resolved.map(&f)))
    }

    pub fn to_double_opt_with(
        self,
        f: impl Fn(Option<f64>) -> Option<f64> + 'static,
    ) -> Column<R> {
        build(self, move |resolved| OutputConfig::Double(f(resolved)))
    }

    /// Wraps the resolved double as a `Percentage` cell, scaled and
    /// rendered to `precision` decimal places by the style/number-format
    /// layer (spec §4.3).
    pub fn to_percentage_with(self, precision: u8) -> Column<R> {
        build(self, move |resolved| {
            OutputConfig::Percentage(resolved, precision)
        })
    }
}

impl<R> ColumnBuilder<R, bool>
where
    R: 'static,
{
    pub fn to_bool_with(self, expr: BoolExpr, f: impl Fn(bool) -> bool + 'static) -> Column<R> {
        build(self, move |resolved| {
            OutputConfig::Bool(resolved.map(&f), expr.clone())
        })
    }

    pub fn to_bool_opt_with(
        self,
        expr: BoolExpr,
        f: impl Fn(Option<bool>) -> Option<bool> + 'static,
    ) -> Column<R> {
        build(self, move |resolved| {
            OutputConfig::Bool(f(resolved), expr.clone())
        })
    }
}

impl<R> ColumnBuilder<R, DateTime<FixedOffset>>
where
    R: 'static,
{
    pub fn to_date_with(
        self,
        f: impl Fn(DateTime<FixedOffset>) -> DateTime<FixedOffset> + 'static,
    ) -> Column<R> {
        build(self, move |resolved| OutputConfig::Date(resolved.map(&f)))
    }

    pub fn to_date_opt_with(
        self,
        f: impl Fn(Option<DateTime<FixedOffset>>) -> Option<DateTime<FixedOffset>> + 'static,
    ) -> Column<R> {
        build(self, move |resolved| OutputConfig::Date(f(resolved)))
    }
}
