use anyhow::{anyhow, Context, Result};
use encoding_rs::Encoding;
use std::fs;
use std::io::ErrorKind;
use std::path::Path;

use crate::table::{infer_column, is_na, Table};

/// Resolve an encoding label such as `latin1` or `utf-8`
pub fn encoding_for_label(label: &str) -> Result<&'static Encoding> {
    Encoding::for_label(label.trim().as_bytes())
        .ok_or_else(|| anyhow!("Unknown text encoding: {}", label))
}

/// Read the works dataset from `path`.
///
/// Returns `Ok(None)` when the file does not exist so the caller can decide
/// what to do; every other read, decode or CSV error is returned as `Err`.
pub fn read_source(path: &Path, encoding: &'static Encoding) -> Result<Option<Table>> {
    let bytes = match fs::read(path) {
        Ok(bytes) => bytes,
        Err(e) if e.kind() == ErrorKind::NotFound => {
            log::error!("Source dataset not found at {}: {}", path.display(), e);
            return Ok(None);
        }
        Err(e) => {
            return Err(e).with_context(|| format!("Failed to read: {:?}", path));
        }
    };

    let (text, actual, had_errors) = encoding.decode(&bytes);
    if had_errors {
        log::warn!(
            "{} contains bytes that are not valid {}; they were replaced",
            path.display(),
            actual.name()
        );
    }

    let table = parse_source(&text)
        .with_context(|| format!("Failed to parse CSV: {:?}", path))?;

    log::info!(
        "Read {} rows x {} columns from {}",
        table.len(),
        table.columns.len(),
        path.display()
    );

    Ok(Some(table))
}

/// Parse `;`-delimited text with a header row into a typed table
pub fn parse_source(text: &str) -> Result<Table> {
    let text = text.strip_prefix('\u{feff}').unwrap_or(text);

    let mut reader = csv::ReaderBuilder::new()
        .delimiter(b';')
        .flexible(false)
        .from_reader(text.as_bytes());

    let columns: Vec<String> = reader
        .headers()
        .context("Failed to read CSV headers")?
        .iter()
        .map(|h| h.trim().to_string())
        .collect();

    let mut records = Vec::new();
    for (line_idx, result) in reader.records().enumerate() {
        let record = result.with_context(|| format!("CSV error on data row {}", line_idx + 1))?;
        records.push(record);
    }

    // Type each column as a whole, then transpose back into rows
    let mut typed_columns = Vec::with_capacity(columns.len());
    for col_idx in 0..columns.len() {
        let raw: Vec<Option<&str>> = records
            .iter()
            .map(|r| r.get(col_idx).filter(|v| !is_na(v)))
            .collect();
        typed_columns.push(infer_column(&raw));
    }

    let mut table = Table::new(columns);
    for row_idx in 0..records.len() {
        table
            .rows
            .push(typed_columns.iter().map(|c| c[row_idx].clone()).collect());
    }

    Ok(table)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::table::Cell;

    #[test]
    fn test_parse_source_types_columns() {
        let text = "\u{feff}nombre;comuna;monto_contrato;plazo_meses\n\
                    Plaza;14;1.234,56;12\n\
                    Puente;;500000;7,5\n";
        let table = parse_source(text).unwrap();

        assert_eq!(table.columns, vec!["nombre", "comuna", "monto_contrato", "plazo_meses"]);
        assert_eq!(table.get(0, "comuna"), &Cell::Integer(14));
        assert_eq!(table.get(1, "comuna"), &Cell::Null);
        assert_eq!(table.get(0, "monto_contrato"), &Cell::from("1.234,56"));
        assert_eq!(table.get(1, "plazo_meses"), &Cell::Real(7.5));
    }

    #[test]
    fn test_ragged_rows_are_fatal() {
        assert!(parse_source("a;b\n1;2;3\n").is_err());
    }

    #[test]
    fn test_missing_file_is_not_an_error() {
        let dir = tempfile::tempdir().unwrap();
        let encoding = encoding_for_label("latin1").unwrap();
        let result = read_source(&dir.path().join("absent.csv"), encoding).unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_latin1_decoding() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("obras.csv");
        // "Núñez" in windows-1252
        std::fs::write(&path, b"barrio;comuna\nN\xfa\xf1ez;13\n").unwrap();

        let encoding = encoding_for_label("latin1").unwrap();
        let table = read_source(&path, encoding).unwrap().unwrap();
        assert_eq!(table.get(0, "barrio"), &Cell::from("Núñez"));
    }

    #[test]
    fn test_unknown_encoding_label() {
        assert!(encoding_for_label("klingon").is_err());
    }
}
