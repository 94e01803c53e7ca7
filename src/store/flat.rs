use crate::backup::Backup;
use crate::model::{LedgerEntry, LEDGER_HEADERS};
use crate::store::Loaded;
use crate::{fs, Result};
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Store for the flat ledger: one CSV row per expense entry, columns
/// `Categoria, Item, Valor, Mês, Data Atual`.
#[derive(Debug, Clone)]
pub struct LedgerStore {
    path: PathBuf,
    backup: Backup,
}

impl LedgerStore {
    pub fn new(path: impl Into<PathBuf>, backup: Backup) -> Self {
        Self {
            path: path.into(),
            backup,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole table.
    ///
    /// A missing file is an empty ledger. Any other read problem, and any
    /// malformed row, degrades instead of failing: the interaction continues
    /// with what could be read plus a warning.
    pub fn load(&self) -> Loaded<Vec<LedgerEntry>> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Loaded::empty();
            }
            Err(err) => {
                warn!("unable to read {}: {err}", self.path.display());
                return Loaded::degraded(format!(
                    "Não foi possível ler a tabela de gastos: {err}"
                ));
            }
        };

        let mut reader = csv::ReaderBuilder::new()
            .trim(csv::Trim::Headers)
            .from_reader(file);
        let headers = match reader.headers() {
            Ok(headers) => headers.clone(),
            Err(err) => {
                warn!("unable to parse header row of {}: {err}", self.path.display());
                return Loaded::degraded(format!(
                    "Não foi possível ler a tabela de gastos: {err}"
                ));
            }
        };

        let mut entries = Vec::new();
        let mut skipped: usize = 0;
        for (row, result) in reader.records().enumerate() {
            let parsed = result
                .map_err(anyhow::Error::from)
                .and_then(|record| LedgerEntry::from_record(&headers, &record));
            match parsed {
                Ok(entry) => entries.push(entry),
                Err(err) => {
                    skipped += 1;
                    warn!("skipping row {} of {}: {err}", row + 2, self.path.display());
                }
            }
        }

        let warning = (skipped > 0)
            .then(|| format!("{skipped} linha(s) inválida(s) foram ignoradas na tabela de gastos."));
        Loaded { table: entries, warning }
    }

    /// Appends one entry: reads the current table (or starts empty), adds
    /// the row and writes everything back. Last-writer-wins.
    pub fn append(&self, entry: &LedgerEntry) -> Result<Vec<LedgerEntry>> {
        let mut entries = self.load().table;
        entries.push(entry.clone());
        self.write_all(&entries)?;
        Ok(entries)
    }

    fn write_all(&self, entries: &[LedgerEntry]) -> Result<()> {
        self.backup.snapshot(&self.path)?;
        let bytes = render(entries)?;
        fs::write_atomic(&self.path, bytes)
    }

    /// Full-table export in exactly the stored format (same columns, same
    /// order, `Mês` recomputed).
    pub fn export(&self) -> Result<String> {
        let bytes = render(&self.load().table)?;
        String::from_utf8(bytes).context("Ledger export was not valid UTF-8")
    }
}

fn render(entries: &[LedgerEntry]) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer
            .write_record(LEDGER_HEADERS)
            .context("Unable to serialize the ledger header row")?;
        for entry in entries {
            writer
                .write_record(entry.to_record())
                .context("Unable to serialize a ledger row")?;
        }
        writer.flush().context("Unable to flush the ledger writer")?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate;
    use crate::model::{Amount, Month};
    use chrono::NaiveDate;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> LedgerStore {
        let backups = dir.path().join(".backups");
        std::fs::create_dir(&backups).unwrap();
        LedgerStore::new(dir.path().join("gastos.csv"), Backup::new(backups, 2))
    }

    fn entry(item: &str, valor: &str, date: (i32, u32, u32)) -> LedgerEntry {
        let data_atual = NaiveDate::from_ymd_opt(date.0, date.1, date.2).unwrap();
        LedgerEntry {
            categoria: "Mensal".to_string(),
            item: item.to_string(),
            valor: Amount::from_str(valor).unwrap(),
            mes: Month::from_date(data_atual),
            data_atual,
        }
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = store(&dir).load();
        assert!(loaded.table.is_empty());
        assert!(loaded.warning.is_none());
    }

    #[test]
    fn test_append_then_reload_preserves_rows_and_total() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        let entries = [
            entry("Aluguel", "800", (2024, 1, 5)),
            entry("Energia", "120.50", (2024, 2, 5)),
            entry("Internet", "79.90", (2024, 3, 5)),
        ];
        for e in &entries {
            store.append(e).unwrap();
        }

        let loaded = store.load();
        assert_eq!(loaded.table.len(), 3);
        assert_eq!(loaded.table, entries);
        assert_eq!(
            aggregate::grand_total(&loaded.table),
            Amount::from_str("1000.40").unwrap()
        );
    }

    #[test]
    fn test_written_file_has_canonical_columns() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.append(&entry("Aluguel", "800", (2024, 1, 5))).unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(lines.next().unwrap(), "Categoria,Item,Valor,Mês,Data Atual");
        assert_eq!(lines.next().unwrap(), "Mensal,Aluguel,800,Janeiro,05-01-2024");
    }

    #[test]
    fn test_load_recomputes_month_from_data_atual() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(
            store.path(),
            "Categoria,Item,Valor,Mês,Data Atual\nMensal,Aluguel,800,Dezembro,05-01-2024\n",
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.table[0].mes, Month::Janeiro);
    }

    #[test]
    fn test_load_skips_malformed_rows_with_warning() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(
            store.path(),
            "Categoria,Item,Valor,Mês,Data Atual\n\
             Mensal,Aluguel,oops,,05-01-2024\n\
             Mensal,Energia,120,,05-01-2024\n",
        )
        .unwrap();

        let loaded = store.load();
        assert_eq!(loaded.table.len(), 1);
        assert_eq!(loaded.table[0].item, "Energia");
        assert!(loaded.warning.is_some());
    }

    #[test]
    fn test_append_snapshots_previous_contents() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.append(&entry("Aluguel", "800", (2024, 1, 5))).unwrap();
        // First write has no previous file, so no backup yet.
        assert_eq!(std::fs::read_dir(dir.path().join(".backups")).unwrap().count(), 0);

        store.append(&entry("Energia", "120", (2024, 1, 6))).unwrap();
        assert_eq!(std::fs::read_dir(dir.path().join(".backups")).unwrap().count(), 1);
    }

    #[test]
    fn test_export_matches_stored_format() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.append(&entry("Aluguel", "800", (2024, 1, 5))).unwrap();

        let exported = store.export();
        let stored = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(exported.unwrap(), stored);
    }

    #[test]
    fn test_export_of_empty_store_is_header_only() {
        let dir = TempDir::new().unwrap();
        let exported = store(&dir).export().unwrap();
        assert_eq!(exported, "Categoria,Item,Valor,Mês,Data Atual\n");
    }
}
