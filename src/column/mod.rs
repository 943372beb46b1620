//! Column generators.
//!
//! A column generator produces one value per row. It receives the partially
//! built row (to read earlier columns) and the session (to sample other
//! tables or draw random numbers).

mod biased;
mod reference;

pub use biased::{Biased, DEFAULT_SKIP_PROBABILITY};
pub use reference::Reference;

use crate::error::Result;
use crate::row::RowBuilder;
use crate::session::Session;
use crate::value::Value;

/// Produces the value of one column for each generated row.
pub trait ColumnGenerator {
    fn generate(&mut self, row: &RowBuilder<'_>, session: &mut Session) -> Result<Value>;
}

impl<G: ColumnGenerator + ?Sized> ColumnGenerator for Box<G> {
    fn generate(&mut self, row: &RowBuilder<'_>, session: &mut Session) -> Result<Value> {
        (**self).generate(row, session)
    }
}

/// Generator backed by a closure over the in-progress row.
pub struct FromFn<F>(F);

impl<F> ColumnGenerator for FromFn<F>
where
    F: FnMut(&RowBuilder<'_>) -> Result<Value>,
{
    fn generate(&mut self, row: &RowBuilder<'_>, _session: &mut Session) -> Result<Value> {
        (self.0)(row)
    }
}

/// Column derived from the earlier columns of the same row
pub fn from_fn<F>(f: F) -> FromFn<F>
where
    F: FnMut(&RowBuilder<'_>) -> Result<Value>,
{
    FromFn(f)
}

/// Generator backed by an argument-less closure.
pub struct Simple<F>(F);

impl<F, V> ColumnGenerator for Simple<F>
where
    F: FnMut() -> V,
    V: Into<Value>,
{
    fn generate(&mut self, _row: &RowBuilder<'_>, _session: &mut Session) -> Result<Value> {
        Ok((self.0)().into())
    }
}

/// Column whose values are independent draws from `f`
pub fn simple<F, V>(f: F) -> Simple<F>
where
    F: FnMut() -> V,
    V: Into<Value>,
{
    Simple(f)
}

/// Same value on every row.
#[derive(Debug, Clone)]
pub struct Constant(Value);

impl ColumnGenerator for Constant {
    fn generate(&mut self, _row: &RowBuilder<'_>, _session: &mut Session) -> Result<Value> {
        Ok(self.0.clone())
    }
}

pub fn constant(value: impl Into<Value>) -> Constant {
    Constant(value.into())
}

/// Incrementing integers, one per generated row.
#[derive(Debug, Clone)]
pub struct Sequence {
    next: i64,
}

impl Sequence {
    pub fn starting_at(start: i64) -> Self {
        Self { next: start }
    }
}

impl Default for Sequence {
    fn default() -> Self {
        Self::starting_at(1)
    }
}

impl ColumnGenerator for Sequence {
    fn generate(&mut self, _row: &RowBuilder<'_>, _session: &mut Session) -> Result<Value> {
        let current = self.next;
        self.next = self.next.wrapping_add(1);
        Ok(Value::Int(current))
    }
}
