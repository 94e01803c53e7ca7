//! Types that represent the core data model, such as `LedgerEntry`, `Month`
//! and the category × month `ExpenseMatrix`.
mod amount;
mod entry;
mod matrix;
mod month;
pub mod taxonomy;

pub use amount::Amount;
pub use entry::{
    EntryForm, LedgerEntry, CATEGORIA_STR, DATA_ATUAL_STR, DATE_FORMAT, ITEM_STR, LEDGER_HEADERS,
    MES_STR, VALOR_STR,
};
pub use matrix::{ExpenseMatrix, MatrixForm, MatrixRow, TOTAL_LABEL};
pub use month::Month;
