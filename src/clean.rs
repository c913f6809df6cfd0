use thiserror::Error;

use crate::table::columns::{canonical_name, CONTRACT_AMOUNT, REQUIRED_COLUMNS, SOURCE_COLUMNS};
use crate::table::Table;

#[derive(Debug, Error, PartialEq)]
pub enum CleanError {
    #[error("source data has no `{0}` column")]
    MissingColumn(&'static str),
}

/// What the cleaner removed
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CleanSummary {
    pub rows_in: usize,
    pub rows_out: usize,
    pub dropped_columns: Vec<String>,
}

/// Project the raw table to the retained columns and filter unusable rows.
///
/// Columns are visited in source order. Unknown columns are removed; rows
/// missing `district`, `neighborhood` or `featured` are removed; and
/// `contract_amount` is coerced to a number before rows where it is missing
/// are removed. The result holds the canonical columns in canonical order.
pub fn clean(raw: Table) -> Result<(Table, CleanSummary), CleanError> {
    let mut table = raw;
    let mut summary = CleanSummary {
        rows_in: table.len(),
        ..Default::default()
    };

    let mut idx = 0;
    while idx < table.columns.len() {
        let Some(name) = canonical_name(&table.columns[idx]) else {
            summary.dropped_columns.push(table.columns[idx].clone());
            table.drop_column(idx);
            continue;
        };
        table.columns[idx] = name.to_string();

        if REQUIRED_COLUMNS.contains(&name) {
            let dropped = table.drop_missing(idx);
            log::debug!("Dropped {} rows missing {}", dropped, name);
        } else if name == CONTRACT_AMOUNT {
            for row in &mut table.rows {
                row[idx] = row[idx].to_numeric();
            }
            let dropped = table.drop_missing(idx);
            log::debug!("Dropped {} rows with a non-numeric {}", dropped, name);
        }

        idx += 1;
    }

    let table = reorder(table)?;
    summary.rows_out = table.len();

    log::info!(
        "Cleaned dataset: kept {} of {} rows, dropped {} columns",
        summary.rows_out,
        summary.rows_in,
        summary.dropped_columns.len()
    );

    Ok((table, summary))
}

/// Arrange columns in canonical order, failing if one never appeared
fn reorder(table: Table) -> Result<Table, CleanError> {
    let mut positions = Vec::with_capacity(SOURCE_COLUMNS.len());
    for column in SOURCE_COLUMNS {
        let pos = table
            .column_index(column.name)
            .ok_or(CleanError::MissingColumn(column.name))?;
        positions.push(pos);
    }

    let rows = table
        .rows
        .iter()
        .map(|row| positions.iter().map(|&p| row[p].clone()).collect())
        .collect();

    Ok(Table {
        columns: SOURCE_COLUMNS.iter().map(|c| c.name.to_string()).collect(),
        rows,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::extract::parse_source;
    use crate::table::columns::{DISTRICT, FEATURED, NEIGHBORHOOD};
    use crate::table::Cell;

    /// A raw table with every alias header, one extra column, and one row per entry
    fn raw_table(rows: &[(&str, Cell, Cell, Cell)]) -> Table {
        let mut columns: Vec<String> = vec!["lat".into()];
        columns.extend(SOURCE_COLUMNS.iter().map(|c| c.alias.to_string()));
        let mut table = Table::new(columns);

        for (name, amount, district, featured) in rows {
            let mut row = vec![Cell::Real(-34.6)];
            for column in SOURCE_COLUMNS {
                row.push(match column.name {
                    "name" => Cell::from(*name),
                    "contract_amount" => amount.clone(),
                    "district" => district.clone(),
                    "neighborhood" => Cell::from("Palermo"),
                    "featured" => featured.clone(),
                    _ => Cell::from("x"),
                });
            }
            table.rows.push(row);
        }
        table
    }

    #[test]
    fn test_clean_filters_rows_and_columns() {
        let raw = raw_table(&[
            ("a", Cell::from("1.234,56"), Cell::Integer(14), Cell::from("SI")),
            ("b", Cell::from("500000"), Cell::Integer(14), Cell::from("NO")),
            ("c", Cell::from("10"), Cell::Null, Cell::from("NO")),
            ("d", Cell::from("10"), Cell::Integer(2), Cell::Null),
        ]);

        let (table, summary) = clean(raw).unwrap();

        assert_eq!(table.columns.len(), 18);
        assert_eq!(table.columns[0], "name");
        assert_eq!(summary.dropped_columns, vec!["lat".to_string()]);
        assert_eq!(summary.rows_in, 4);
        assert_eq!(summary.rows_out, 1);
        assert_eq!(table.get(0, "name"), &Cell::from("b"));
        assert_eq!(table.get(0, CONTRACT_AMOUNT), &Cell::Integer(500000));
    }

    #[test]
    fn test_clean_is_idempotent() {
        let raw = raw_table(&[
            ("a", Cell::from("abc"), Cell::Integer(1), Cell::from("SI")),
            ("b", Cell::Real(12.5), Cell::Integer(3), Cell::from("NO")),
            ("c", Cell::from("7"), Cell::Integer(3), Cell::from("SI")),
        ]);

        let (once, _) = clean(raw).unwrap();
        let (twice, summary) = clean(once.clone()).unwrap();

        assert_eq!(once, twice);
        assert!(summary.dropped_columns.is_empty());
    }

    #[test]
    fn test_cleaned_rows_have_required_values() {
        let raw = raw_table(&[
            ("a", Cell::from("1"), Cell::Integer(1), Cell::from("SI")),
            ("b", Cell::Null, Cell::Integer(1), Cell::from("SI")),
            ("c", Cell::from("2"), Cell::Integer(1), Cell::Null),
        ]);
        let (table, _) = clean(raw).unwrap();

        for row in 0..table.len() {
            for column in [DISTRICT, NEIGHBORHOOD, FEATURED] {
                assert!(!table.get(row, column).is_null());
            }
            assert!(matches!(
                table.get(row, CONTRACT_AMOUNT),
                Cell::Integer(_) | Cell::Real(_)
            ));
        }
        assert_eq!(table.len(), 1);
    }

    #[test]
    fn test_blank_field_is_a_value() {
        let mut text = SOURCE_COLUMNS
            .iter()
            .map(|c| c.alias)
            .collect::<Vec<_>>()
            .join(";");
        text.push('\n');
        let row: Vec<&str> = SOURCE_COLUMNS
            .iter()
            .map(|c| match c.name {
                CONTRACT_AMOUNT => "1000",
                DISTRICT => "14",
                FEATURED => " ",
                _ => "x",
            })
            .collect();
        text.push_str(&row.join(";"));
        text.push('\n');

        let raw = parse_source(&text).unwrap();
        let (table, summary) = clean(raw).unwrap();

        assert_eq!(summary.rows_out, 1);
        assert_eq!(table.get(0, FEATURED), &Cell::from(" "));
    }

    #[test]
    fn test_missing_column_is_reported() {
        let mut raw = raw_table(&[]);
        let pos = raw.column_index("financiamiento").unwrap();
        raw.drop_column(pos);

        assert_eq!(
            clean(raw).unwrap_err(),
            CleanError::MissingColumn("funding_source")
        );
    }
}
