use crate::model::{Amount, Month};
use crate::Result;
use anyhow::bail;
use serde::{Deserialize, Serialize};

/// Label of the display-only totals row. Never persisted.
pub const TOTAL_LABEL: &str = "Total";

/// One category row of the month matrix: a category name plus twelve
/// running month totals.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MatrixRow {
    pub categoria: String,
    pub meses: [Amount; 12],
}

impl MatrixRow {
    /// A fresh row with every month cell at zero.
    pub fn new(categoria: impl Into<String>) -> Self {
        MatrixRow {
            categoria: categoria.into(),
            meses: [Amount::ZERO; 12],
        }
    }

    pub fn get(&self, mes: Month) -> Amount {
        self.meses[mes.index()]
    }

    pub fn add(&mut self, mes: Month, valor: Amount) {
        self.meses[mes.index()] += valor;
    }

    /// Sum of the twelve month cells.
    pub fn total(&self) -> Amount {
        self.meses.iter().sum()
    }
}

/// The category × month ledger.
///
/// Rows keep file order. Invariant: at most one row per categoria, enforced
/// by [`ExpenseMatrix::merge`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExpenseMatrix {
    rows: Vec<MatrixRow>,
}

impl ExpenseMatrix {
    pub fn new(rows: Vec<MatrixRow>) -> Self {
        ExpenseMatrix { rows }
    }

    pub fn rows(&self) -> &[MatrixRow] {
        &self.rows
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Merge-on-append: an existing categoria row has its `mes` cell
    /// incremented; an unknown categoria gets a fresh row with only that
    /// cell set.
    pub fn merge(&mut self, categoria: &str, mes: Month, valor: Amount) {
        match self.rows.iter_mut().find(|row| row.categoria == categoria) {
            Some(row) => row.add(mes, valor),
            None => {
                let mut row = MatrixRow::new(categoria);
                row.add(mes, valor);
                self.rows.push(row);
            }
        }
    }
}

/// A matrix submission as it arrives from the entry form.
#[derive(Debug, Clone, Deserialize)]
pub struct MatrixForm {
    pub categoria: String,
    /// Month name chosen from the selector; must be one of the twelve
    /// column names.
    pub mes: String,
    pub valor: Amount,
}

impl MatrixForm {
    /// Validates the submission. An unknown month name or non-positive
    /// amount is rejected before the store is touched.
    pub fn normalize(&self) -> Result<(String, Month, Amount)> {
        let categoria = self.categoria.trim();
        if categoria.is_empty() {
            bail!("Por favor, selecione uma categoria antes de salvar.");
        }
        let Ok(mes) = self.mes.trim().parse::<Month>() else {
            bail!("Erro ao adicionar despesa. Verifique o mês selecionado.");
        };
        if !self.valor.is_positive() {
            bail!("O valor da despesa deve ser maior que zero.");
        }
        Ok((categoria.to_string(), mes, self.valor))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_merge_creates_row_with_single_cell() {
        let mut matrix = ExpenseMatrix::default();
        matrix.merge("Lazer", Month::Janeiro, amount("10"));

        assert_eq!(matrix.rows().len(), 1);
        let row = &matrix.rows()[0];
        assert_eq!(row.get(Month::Janeiro), amount("10"));
        for mes in Month::ALL.into_iter().filter(|m| *m != Month::Janeiro) {
            assert!(row.get(mes).is_zero());
        }
    }

    #[test]
    fn test_merge_same_categoria_different_months() {
        let mut matrix = ExpenseMatrix::default();
        matrix.merge("Lazer", Month::Janeiro, amount("10"));
        matrix.merge("Lazer", Month::Marco, amount("7.50"));

        assert_eq!(matrix.rows().len(), 1);
        let row = &matrix.rows()[0];
        assert_eq!(row.get(Month::Janeiro), amount("10"));
        assert_eq!(row.get(Month::Marco), amount("7.50"));
        assert!(row.get(Month::Fevereiro).is_zero());
    }

    #[test]
    fn test_merge_same_cell_accumulates() {
        let mut matrix = ExpenseMatrix::default();
        matrix.merge("Saúde", Month::Junho, amount("15"));
        matrix.merge("Saúde", Month::Junho, amount("5"));

        assert_eq!(matrix.rows().len(), 1);
        assert_eq!(matrix.rows()[0].get(Month::Junho), amount("20"));
    }

    #[test]
    fn test_merge_keeps_one_row_per_categoria() {
        let mut matrix = ExpenseMatrix::default();
        matrix.merge("Lazer", Month::Janeiro, amount("1"));
        matrix.merge("Saúde", Month::Janeiro, amount("2"));
        matrix.merge("Lazer", Month::Fevereiro, amount("3"));

        let categorias: Vec<&str> = matrix.rows().iter().map(|r| r.categoria.as_str()).collect();
        assert_eq!(categorias, vec!["Lazer", "Saúde"]);
    }

    #[test]
    fn test_form_rejects_unknown_month() {
        let form = MatrixForm {
            categoria: "Lazer".to_string(),
            mes: "Smarch".to_string(),
            valor: amount("10"),
        };
        assert!(form.normalize().is_err());
    }

    #[test]
    fn test_form_rejects_non_positive_amount() {
        let form = MatrixForm {
            categoria: "Lazer".to_string(),
            mes: "Janeiro".to_string(),
            valor: Amount::ZERO,
        };
        assert!(form.normalize().is_err());
    }

    #[test]
    fn test_form_accepts_valid_submission() {
        let form = MatrixForm {
            categoria: " Lazer ".to_string(),
            mes: "Março".to_string(),
            valor: amount("12.30"),
        };
        let (categoria, mes, valor) = form.normalize().unwrap();
        assert_eq!(categoria, "Lazer");
        assert_eq!(mes, Month::Marco);
        assert_eq!(valor, amount("12.30"));
    }
}
