//! CSV-backed persistence for the two ledger shapes.
//!
//! Both stores share the same failure posture: a missing file loads as an
//! empty table, any other read problem degrades to an empty table with a
//! user-visible warning, and every write replaces the whole file after a
//! rotating backup snapshot. There is no locking; concurrent writers are
//! last-writer-wins.

mod flat;
mod matrix;

pub use flat::LedgerStore;
pub use matrix::MatrixStore;

/// Outcome of a load: the table plus an optional warning when the read
/// degraded (unreadable file, skipped rows). The warning is surfaced to the
/// user; it never aborts the interaction.
#[derive(Debug, Clone)]
pub struct Loaded<T> {
    pub table: T,
    pub warning: Option<String>,
}

impl<T: Default> Loaded<T> {
    fn empty() -> Self {
        Loaded {
            table: T::default(),
            warning: None,
        }
    }

    fn degraded(warning: String) -> Self {
        Loaded {
            table: T::default(),
            warning: Some(warning),
        }
    }
}
