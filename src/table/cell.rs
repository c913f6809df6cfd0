use rusqlite::types::{ToSql, ToSqlOutput, Value, ValueRef};
use std::fmt;
use std::hash::{Hash, Hasher};

/// Markers read as a missing value; a field must match one exactly
pub const NA_VALUES: &[&str] = &[
    "", "#N/A", "#N/A N/A", "#NA", "-1.#IND", "-1.#QNAN", "-NaN", "-nan", "1.#IND", "1.#QNAN",
    "<NA>", "N/A", "NA", "NULL", "NaN", "None", "n/a", "nan", "null",
];

/// A single value of the in-memory table
#[derive(Debug, Clone)]
pub enum Cell {
    Null,
    Integer(i64),
    Real(f64),
    Text(String),
}

impl Cell {
    pub fn is_null(&self) -> bool {
        matches!(self, Cell::Null)
    }

    /// Coerce to a number the way a lenient numeric conversion would:
    /// numbers stay as they are, text is parsed as an integer or a
    /// dot-decimal float, anything else becomes missing.
    pub fn to_numeric(&self) -> Cell {
        match self {
            Cell::Integer(_) | Cell::Real(_) => self.clone(),
            Cell::Text(s) => {
                let s = s.trim();
                if let Ok(i) = s.parse::<i64>() {
                    Cell::Integer(i)
                } else {
                    match s.parse::<f64>() {
                        Ok(f) if f.is_finite() => Cell::Real(f),
                        _ => Cell::Null,
                    }
                }
            }
            Cell::Null => Cell::Null,
        }
    }

    pub fn as_f64(&self) -> Option<f64> {
        match self {
            Cell::Integer(i) => Some(*i as f64),
            Cell::Real(f) => Some(*f),
            Cell::Text(s) => parse_decimal(s.trim()),
            Cell::Null => None,
        }
    }

    /// Integer view; reals are truncated
    pub fn as_i64(&self) -> Option<i64> {
        match self {
            Cell::Integer(i) => Some(*i),
            Cell::Real(f) => Some(f.trunc() as i64),
            Cell::Text(s) => s.trim().parse().ok(),
            Cell::Null => None,
        }
    }

    /// Integer view that refuses to lose a fractional part
    pub fn as_exact_i64(&self) -> Option<i64> {
        match self {
            Cell::Real(f) if f.fract() == 0.0 => Some(*f as i64),
            Cell::Real(_) => None,
            other => other.as_i64(),
        }
    }

    pub fn as_text(&self) -> Option<String> {
        match self {
            Cell::Null => None,
            other => Some(other.to_string()),
        }
    }
}

impl fmt::Display for Cell {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Cell::Null => write!(f, "NULL"),
            Cell::Integer(i) => write!(f, "{}", i),
            Cell::Real(r) => write!(f, "{}", r),
            Cell::Text(s) => write!(f, "{}", s),
        }
    }
}

// Reals compare by bit pattern so that cells can key a HashSet.
impl PartialEq for Cell {
    fn eq(&self, other: &Self) -> bool {
        match (self, other) {
            (Cell::Null, Cell::Null) => true,
            (Cell::Integer(a), Cell::Integer(b)) => a == b,
            (Cell::Real(a), Cell::Real(b)) => a.to_bits() == b.to_bits(),
            (Cell::Text(a), Cell::Text(b)) => a == b,
            _ => false,
        }
    }
}

impl Eq for Cell {}

impl Hash for Cell {
    fn hash<H: Hasher>(&self, state: &mut H) {
        std::mem::discriminant(self).hash(state);
        match self {
            Cell::Null => {}
            Cell::Integer(i) => i.hash(state),
            Cell::Real(f) => f.to_bits().hash(state),
            Cell::Text(s) => s.hash(state),
        }
    }
}

impl ToSql for Cell {
    fn to_sql(&self) -> rusqlite::Result<ToSqlOutput<'_>> {
        Ok(match self {
            Cell::Null => ToSqlOutput::Owned(Value::Null),
            Cell::Integer(i) => ToSqlOutput::Owned(Value::Integer(*i)),
            Cell::Real(f) => ToSqlOutput::Owned(Value::Real(*f)),
            Cell::Text(s) => ToSqlOutput::Borrowed(ValueRef::Text(s.as_bytes())),
        })
    }
}

impl From<&str> for Cell {
    fn from(s: &str) -> Self {
        Cell::Text(s.to_string())
    }
}

impl From<i64> for Cell {
    fn from(i: i64) -> Self {
        Cell::Integer(i)
    }
}

impl From<Option<String>> for Cell {
    fn from(s: Option<String>) -> Self {
        s.map(Cell::Text).unwrap_or(Cell::Null)
    }
}

pub fn is_na(raw: &str) -> bool {
    NA_VALUES.contains(&raw)
}

/// Parse a number written with `,` as decimal separator.
/// A `.` is not a thousands separator here, so "1.234,56" is rejected.
pub fn parse_decimal(raw: &str) -> Option<f64> {
    if raw.contains('.') && raw.contains(',') {
        return None;
    }
    if raw.contains(',') {
        return raw.replacen(',', ".", 1).parse().ok().filter(|f: &f64| f.is_finite());
    }
    if raw.contains('.') {
        return None;
    }
    raw.parse().ok().filter(|f: &f64| f.is_finite())
}

/// Type a raw CSV column: integers if every value is one, decimals if every
/// value parses as one, text otherwise. Missing markers become `Null`.
pub fn infer_column(raw: &[Option<&str>]) -> Vec<Cell> {
    let present = || raw.iter().flatten().map(|s| s.trim());

    if present().all(|s| s.parse::<i64>().is_ok()) {
        return raw
            .iter()
            .map(|v| match v {
                Some(s) => s.trim().parse().map(Cell::Integer).unwrap_or(Cell::Null),
                None => Cell::Null,
            })
            .collect();
    }

    if present().all(|s| parse_decimal(s).is_some()) {
        return raw
            .iter()
            .map(|v| v.and_then(|s| parse_decimal(s.trim())).map_or(Cell::Null, Cell::Real))
            .collect();
    }

    raw.iter()
        .map(|v| v.map_or(Cell::Null, |s| Cell::Text(s.to_string())))
        .collect()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_decimal_uses_comma() {
        assert_eq!(parse_decimal("1234,56"), Some(1234.56));
        assert_eq!(parse_decimal("500000"), Some(500000.0));
        assert_eq!(parse_decimal("1.234,56"), None);
        assert_eq!(parse_decimal("12.5"), None);
        assert_eq!(parse_decimal("abc"), None);
    }

    #[test]
    fn test_to_numeric_coerces_text() {
        assert_eq!(Cell::from("500000").to_numeric(), Cell::Integer(500000));
        assert_eq!(Cell::from("12.5").to_numeric(), Cell::Real(12.5));
        assert_eq!(Cell::from("1.234,56").to_numeric(), Cell::Null);
        assert_eq!(Cell::from("abc").to_numeric(), Cell::Null);
        assert_eq!(Cell::Real(3.5).to_numeric(), Cell::Real(3.5));
    }

    #[test]
    fn test_infer_integer_column() {
        let cells = infer_column(&[Some("14"), None, Some(" 3 ")]);
        assert_eq!(cells, vec![Cell::Integer(14), Cell::Null, Cell::Integer(3)]);
    }

    #[test]
    fn test_infer_decimal_column() {
        let cells = infer_column(&[Some("12"), Some("7,5")]);
        assert_eq!(cells, vec![Cell::Real(12.0), Cell::Real(7.5)]);
    }

    #[test]
    fn test_infer_mixed_column_stays_text() {
        let cells = infer_column(&[Some("1.234,56"), Some("500000")]);
        assert_eq!(cells, vec![Cell::from("1.234,56"), Cell::from("500000")]);
    }

    #[test]
    fn test_exact_integer_view() {
        assert_eq!(Cell::Real(14.0).as_exact_i64(), Some(14));
        assert_eq!(Cell::Real(14.5).as_exact_i64(), None);
        assert_eq!(Cell::Real(14.5).as_i64(), Some(14));
    }

    #[test]
    fn test_na_markers() {
        assert!(is_na(""));
        assert!(is_na("null"));
        assert!(!is_na(" NA "));
        assert!(!is_na(" "));
        assert!(!is_na("Palermo"));
    }
}
