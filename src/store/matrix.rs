use crate::backup::Backup;
use crate::model::{Amount, ExpenseMatrix, MatrixRow, Month, CATEGORIA_STR};
use crate::store::Loaded;
use crate::{fs, Result};
use anyhow::Context;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

/// Store for the category × month matrix: one CSV row per category,
/// columns `Categoria, Janeiro, …, Dezembro`.
#[derive(Debug, Clone)]
pub struct MatrixStore {
    path: PathBuf,
    backup: Backup,
}

impl MatrixStore {
    pub fn new(path: impl Into<PathBuf>, backup: Backup) -> Self {
        Self {
            path: path.into(),
            backup,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Loads the whole matrix.
    ///
    /// Same failure posture as the flat store: missing file → empty matrix,
    /// unreadable file or header → empty matrix with a warning, malformed
    /// rows skipped with a warning.
    pub fn load(&self) -> Loaded<ExpenseMatrix> {
        let file = match std::fs::File::open(&self.path) {
            Ok(file) => file,
            Err(err) if err.kind() == ErrorKind::NotFound => {
                debug!("{} does not exist yet, starting empty", self.path.display());
                return Loaded::empty();
            }
            Err(err) => {
                warn!("unable to read {}: {err}", self.path.display());
                return Loaded::degraded(format!(
                    "Não foi possível ler a tabela de despesas: {err}"
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
                    "Não foi possível ler a tabela de despesas: {err}"
                ));
            }
        };

        // Map each column index to its meaning; unknown columns are ignored.
        let mut categoria_idx = None;
        let mut month_columns: Vec<(usize, Month)> = Vec::new();
        for (idx, header) in headers.iter().enumerate() {
            let header = header.trim();
            if header == CATEGORIA_STR {
                categoria_idx = Some(idx);
            } else if let Ok(mes) = header.parse::<Month>() {
                month_columns.push((idx, mes));
            }
        }
        let Some(categoria_idx) = categoria_idx else {
            warn!("{} has no '{CATEGORIA_STR}' column", self.path.display());
            return Loaded::degraded(format!(
                "A tabela de despesas não tem a coluna '{CATEGORIA_STR}'."
            ));
        };

        let mut rows = Vec::new();
        let mut skipped: usize = 0;
        for (row_ix, result) in reader.records().enumerate() {
            match result {
                Ok(record) => match parse_row(&record, categoria_idx, &month_columns) {
                    Ok(Some(row)) => rows.push(row),
                    Ok(None) => {}
                    Err(err) => {
                        skipped += 1;
                        warn!("skipping row {} of {}: {err}", row_ix + 2, self.path.display());
                    }
                },
                Err(err) => {
                    skipped += 1;
                    warn!("skipping row {} of {}: {err}", row_ix + 2, self.path.display());
                }
            }
        }

        let warning = (skipped > 0).then(|| {
            format!("{skipped} linha(s) inválida(s) foram ignoradas na tabela de despesas.")
        });
        Loaded {
            table: ExpenseMatrix::new(rows),
            warning,
        }
    }

    /// Merges one submission into the matrix and persists the result.
    ///
    /// The month is already typed, so an unknown month name can never reach
    /// this point; validation failures happen before any mutation.
    pub fn merge(&self, categoria: &str, mes: Month, valor: Amount) -> Result<ExpenseMatrix> {
        let mut matrix = self.load().table;
        matrix.merge(categoria, mes, valor);
        self.write_all(&matrix)?;
        Ok(matrix)
    }

    fn write_all(&self, matrix: &ExpenseMatrix) -> Result<()> {
        self.backup.snapshot(&self.path)?;
        let bytes = render(matrix)?;
        fs::write_atomic(&self.path, bytes)
    }

    /// Full-table export in exactly the stored format. The display-only
    /// "Total" row is not part of the store and therefore not exported.
    pub fn export(&self) -> Result<String> {
        let bytes = render(&self.load().table)?;
        String::from_utf8(bytes).context("Matrix export was not valid UTF-8")
    }
}

/// The 13-column header row: `Categoria` plus the months in calendar order.
fn header_row() -> Vec<&'static str> {
    let mut row = vec![CATEGORIA_STR];
    row.extend(Month::ALL.iter().map(Month::as_str));
    row
}

fn render(matrix: &ExpenseMatrix) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    {
        let mut writer = csv::Writer::from_writer(&mut buf);
        writer
            .write_record(header_row())
            .context("Unable to serialize the matrix header row")?;
        for row in matrix.rows() {
            let mut record = vec![row.categoria.clone()];
            record.extend(row.meses.iter().map(|valor| valor.to_string()));
            writer
                .write_record(&record)
                .context("Unable to serialize a matrix row")?;
        }
        writer.flush().context("Unable to flush the matrix writer")?;
    }
    Ok(buf)
}

/// Parses one record into a matrix row. `Ok(None)` for blank categoria
/// cells (ignored), `Err` for unparsable amounts (skipped by the caller).
fn parse_row(
    record: &csv::StringRecord,
    categoria_idx: usize,
    month_columns: &[(usize, Month)],
) -> Result<Option<MatrixRow>> {
    let categoria = record.get(categoria_idx).unwrap_or("").trim();
    if categoria.is_empty() {
        return Ok(None);
    }

    let mut row = MatrixRow::new(categoria);
    for (idx, mes) in month_columns {
        let cell = record.get(*idx).unwrap_or("");
        let valor: Amount = cell
            .parse()
            .with_context(|| format!("invalid '{}' cell '{cell}'", mes.as_str()))?;
        row.meses[mes.index()] = valor;
    }
    Ok(Some(row))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::aggregate;
    use std::str::FromStr;
    use tempfile::TempDir;

    fn store(dir: &TempDir) -> MatrixStore {
        let backups = dir.path().join(".backups");
        std::fs::create_dir(&backups).unwrap();
        MatrixStore::new(dir.path().join("despesas.csv"), Backup::new(backups, 2))
    }

    fn amount(s: &str) -> Amount {
        Amount::from_str(s).unwrap()
    }

    #[test]
    fn test_load_missing_file_is_empty() {
        let dir = TempDir::new().unwrap();
        let loaded = store(&dir).load();
        assert!(loaded.table.is_empty());
        assert!(loaded.warning.is_none());
    }

    #[test]
    fn test_merge_persists_and_reloads() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.merge("Lazer", Month::Janeiro, amount("10")).unwrap();
        store.merge("Lazer", Month::Marco, amount("5")).unwrap();
        store.merge("Saúde", Month::Janeiro, amount("8")).unwrap();

        let matrix = store.load().table;
        assert_eq!(matrix.rows().len(), 2);
        assert_eq!(matrix.rows()[0].get(Month::Janeiro), amount("10"));
        assert_eq!(matrix.rows()[0].get(Month::Marco), amount("5"));
        assert_eq!(matrix.rows()[1].get(Month::Janeiro), amount("8"));
    }

    #[test]
    fn test_merge_same_cell_accumulates_across_reloads() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.merge("Lazer", Month::Janeiro, amount("10")).unwrap();
        store.merge("Lazer", Month::Janeiro, amount("2.50")).unwrap();

        let matrix = store.load().table;
        assert_eq!(matrix.rows().len(), 1);
        assert_eq!(matrix.rows()[0].get(Month::Janeiro), amount("12.50"));
    }

    #[test]
    fn test_written_file_has_thirteen_columns() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.merge("Lazer", Month::Janeiro, amount("10")).unwrap();

        let contents = std::fs::read_to_string(store.path()).unwrap();
        let mut lines = contents.lines();
        assert_eq!(
            lines.next().unwrap(),
            "Categoria,Janeiro,Fevereiro,Março,Abril,Maio,Junho,Julho,Agosto,Setembro,Outubro,Novembro,Dezembro"
        );
        assert_eq!(lines.next().unwrap(), "Lazer,10,0,0,0,0,0,0,0,0,0,0,0");
    }

    #[test]
    fn test_totals_row_is_never_persisted() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);

        store.merge("Lazer", Month::Janeiro, amount("10")).unwrap();
        store.merge("Saúde", Month::Janeiro, amount("5")).unwrap();

        // Render with the totals row, reload, recompute: Janeiro stays 15.
        let first = aggregate::with_totals_row(&store.load().table);
        assert_eq!(first.last().unwrap().get(Month::Janeiro), amount("15"));

        let second = aggregate::with_totals_row(&store.load().table);
        assert_eq!(second.last().unwrap().get(Month::Janeiro), amount("15"));

        // The stored file has only the two category rows.
        let contents = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(contents.lines().count(), 3);
    }

    #[test]
    fn test_load_skips_malformed_rows_with_warning() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.merge("Lazer", Month::Janeiro, amount("10")).unwrap();

        let mut contents = std::fs::read_to_string(store.path()).unwrap();
        contents.push_str("Saúde,abc,0,0,0,0,0,0,0,0,0,0,0\n");
        std::fs::write(store.path(), contents).unwrap();

        let loaded = store.load();
        assert_eq!(loaded.table.rows().len(), 1);
        assert!(loaded.warning.is_some());
    }

    #[test]
    fn test_load_without_categoria_column_degrades() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        std::fs::write(store.path(), "Nome,Janeiro\nLazer,10\n").unwrap();

        let loaded = store.load();
        assert!(loaded.table.is_empty());
        assert!(loaded.warning.is_some());
    }

    #[test]
    fn test_export_of_empty_store_is_header_only() {
        let dir = TempDir::new().unwrap();
        let exported = store(&dir).export().unwrap();
        assert_eq!(
            exported,
            "Categoria,Janeiro,Fevereiro,Março,Abril,Maio,Junho,Julho,Agosto,Setembro,Outubro,Novembro,Dezembro\n"
        );
    }

    #[test]
    fn test_export_matches_stored_format() {
        let dir = TempDir::new().unwrap();
        let store = store(&dir);
        store.merge("Educação", Month::Maio, amount("99.90")).unwrap();

        let exported = store.export().unwrap();
        let stored = std::fs::read_to_string(store.path()).unwrap();
        assert_eq!(exported, stored);
    }
}
