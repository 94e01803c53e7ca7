use crate::model::{Amount, Month};
use crate::Result;
use anyhow::{anyhow, bail, Context};
use chrono::NaiveDate;
use serde::{Deserialize, Serialize, Serializer};

pub const CATEGORIA_STR: &str = "Categoria";
pub const ITEM_STR: &str = "Item";
pub const VALOR_STR: &str = "Valor";
pub const MES_STR: &str = "Mês";
pub const DATA_ATUAL_STR: &str = "Data Atual";

/// Column order of the flat ledger file.
pub const LEDGER_HEADERS: [&str; 5] = [CATEGORIA_STR, ITEM_STR, VALOR_STR, MES_STR, DATA_ATUAL_STR];

/// The `DD-MM-YYYY` format of the `Data Atual` column.
pub const DATE_FORMAT: &str = "%d-%m-%Y";

/// A single committed row of the flat ledger.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct LedgerEntry {
    pub categoria: String,
    pub item: String,
    pub valor: Amount,
    /// Derived from `data_atual` at load time, never trusted from storage.
    pub mes: Month,
    #[serde(serialize_with = "serialize_date_br")]
    pub data_atual: NaiveDate,
}

fn serialize_date_br<S>(date: &NaiveDate, serializer: S) -> std::result::Result<S::Ok, S::Error>
where
    S: Serializer,
{
    serializer.serialize_str(&date.format(DATE_FORMAT).to_string())
}

impl LedgerEntry {
    /// Parses one CSV record using the file's header row.
    ///
    /// Unknown columns are ignored. The stored `Mês` cell is ignored too:
    /// the month is recomputed from `Data Atual`.
    pub fn from_record(headers: &csv::StringRecord, record: &csv::StringRecord) -> Result<LedgerEntry> {
        let mut categoria = String::new();
        let mut item = String::new();
        let mut valor = Amount::ZERO;
        let mut data_atual: Option<NaiveDate> = None;

        for (header, cell) in headers.iter().zip(record.iter()) {
            match header.trim() {
                CATEGORIA_STR => categoria = cell.trim().to_string(),
                ITEM_STR => item = cell.trim().to_string(),
                VALOR_STR => {
                    valor = cell
                        .parse()
                        .with_context(|| format!("invalid '{VALOR_STR}' cell '{cell}'"))?
                }
                DATA_ATUAL_STR => {
                    data_atual = Some(
                        NaiveDate::parse_from_str(cell.trim(), DATE_FORMAT)
                            .with_context(|| format!("invalid '{DATA_ATUAL_STR}' cell '{cell}'"))?,
                    )
                }
                _ => {}
            }
        }

        let data_atual = data_atual.ok_or_else(|| anyhow!("missing '{DATA_ATUAL_STR}' cell"))?;
        Ok(LedgerEntry {
            categoria,
            item,
            valor,
            mes: Month::from_date(data_atual),
            data_atual,
        })
    }

    /// Cells in canonical column order, ready for the CSV writer.
    pub fn to_record(&self) -> [String; 5] {
        [
            self.categoria.clone(),
            self.item.clone(),
            self.valor.to_string(),
            self.mes.to_string(),
            self.data_atual.format(DATE_FORMAT).to_string(),
        ]
    }
}

/// An expense submission as it arrives from the entry form, before
/// normalization.
#[derive(Debug, Clone, Deserialize)]
pub struct EntryForm {
    pub categoria: String,
    pub item: String,
    pub valor: Amount,
    /// The expense date from the picker (ISO `YYYY-MM-DD`). The month is
    /// derived from this date; the record keeps its own timestamp.
    #[serde(default)]
    pub data: Option<NaiveDate>,
}

impl EntryForm {
    /// Validates the submission and derives the computed fields.
    ///
    /// Rejects empty category/item and non-positive amounts; nothing is
    /// written on rejection. `today` becomes the `Data Atual` record
    /// timestamp, and the month falls back to it when no date was picked.
    pub fn normalize(&self, today: NaiveDate) -> Result<LedgerEntry> {
        let categoria = self.categoria.trim();
        let item = self.item.trim();
        if categoria.is_empty() || item.is_empty() {
            bail!("Por favor, preencha todos os campos antes de salvar.");
        }
        if !self.valor.is_positive() {
            bail!("O valor do gasto deve ser maior que zero.");
        }

        let referencia = self.data.unwrap_or(today);
        Ok(LedgerEntry {
            categoria: categoria.to_string(),
            item: item.to_string(),
            valor: self.valor,
            mes: Month::from_date(referencia),
            data_atual: today,
        })
    }
}
