//! Summary views computed from a loaded ledger.
//!
//! Everything here is a pure function recomputed from scratch on every call;
//! nothing is cached and nothing is persisted. The dashboard feeds these
//! results straight into its tables and charts.

use crate::model::{Amount, ExpenseMatrix, LedgerEntry, MatrixRow, Month, TOTAL_LABEL};
use std::collections::HashMap;

/// Total spent per category. Categories with no rows are absent.
pub fn total_by_category(entries: &[LedgerEntry]) -> HashMap<String, Amount> {
    let mut totals = HashMap::new();
    for entry in entries {
        *totals.entry(entry.categoria.clone()).or_insert(Amount::ZERO) += entry.valor;
    }
    totals
}

/// Total spent per item. Items with no rows are absent.
pub fn total_by_item(entries: &[LedgerEntry]) -> HashMap<String, Amount> {
    let mut totals = HashMap::new();
    for entry in entries {
        *totals.entry(entry.item.clone()).or_insert(Amount::ZERO) += entry.valor;
    }
    totals
}

/// Total spent per month, in calendar order, optionally restricted to one
/// category. Months with no rows are absent.
pub fn total_by_month(entries: &[LedgerEntry], categoria: Option<&str>) -> Vec<(Month, Amount)> {
    let mut totals: HashMap<Month, Amount> = HashMap::new();
    for entry in entries {
        if let Some(categoria) = categoria {
            if entry.categoria != categoria {
                continue;
            }
        }
        *totals.entry(entry.mes).or_insert(Amount::ZERO) += entry.valor;
    }

    Month::ALL
        .into_iter()
        .filter_map(|mes| totals.get(&mes).map(|total| (mes, *total)))
        .collect()
}

/// Sum over every row; zero for an empty table.
pub fn grand_total(entries: &[LedgerEntry]) -> Amount {
    entries.iter().map(|entry| entry.valor).sum()
}

/// Column-wise month sums across every matrix row, one per calendar month.
pub fn column_totals(matrix: &ExpenseMatrix) -> [Amount; 12] {
    let mut totals = [Amount::ZERO; 12];
    for row in matrix.rows() {
        for (total, cell) in totals.iter_mut().zip(row.meses.iter()) {
            *total += *cell;
        }
    }
    totals
}

/// Per-category totals of the matrix, in row order.
pub fn row_totals(matrix: &ExpenseMatrix) -> Vec<(String, Amount)> {
    matrix
        .rows()
        .iter()
        .map(|row| (row.categoria.clone(), row.total()))
        .collect()
}

/// Sum over every cell of the matrix.
pub fn matrix_grand_total(matrix: &ExpenseMatrix) -> Amount {
    column_totals(matrix).iter().sum()
}

/// The matrix rows plus the display-only "Total" row holding the column
/// sums. The result is for rendering; the totals row is never written back
/// to the store, so repeated reload/recompute cycles cannot accumulate it.
pub fn with_totals_row(matrix: &ExpenseMatrix) -> Vec<MatrixRow> {
    let mut rows = matrix.rows().to_vec();
    rows.push(MatrixRow {
        categoria: TOTAL_LABEL.to_string(),
        meses: column_totals(matrix),
    });
    rows
}
