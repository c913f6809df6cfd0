//! Pure checks on operator answers, kept apart from the prompt loops

use thiserror::Error;

use crate::table::parse_decimal;

#[derive(Debug, Error, PartialEq)]
pub enum InputError {
    #[error("`{input}` is not a valid {field}")]
    InvalidNumber { field: &'static str, input: String },
}

/// How a project leaves the draft stage
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Closing {
    Complete,
    Terminate,
}

/// `SI` / `NO`, exactly
pub fn parse_yes_no(input: &str) -> Option<bool> {
    match input {
        "SI" => Some(true),
        "NO" => Some(false),
        _ => None,
    }
}

/// The featured flag accepts the same two codes and stores them verbatim
pub fn parse_featured(input: &str) -> Option<String> {
    parse_yes_no(input).map(|_| input.to_string())
}

pub fn parse_integer(field: &'static str, input: &str) -> Result<i64, InputError> {
    input.trim().parse().map_err(|_| InputError::InvalidNumber {
        field,
        input: input.to_string(),
    })
}

/// Amounts accept a `.` or a `,` decimal separator
pub fn parse_amount(field: &'static str, input: &str) -> Result<f64, InputError> {
    let trimmed = input.trim();
    trimmed
        .parse::<f64>()
        .ok()
        .or_else(|| parse_decimal(trimmed))
        .filter(|f| f.is_finite())
        .ok_or_else(|| InputError::InvalidNumber {
            field,
            input: input.to_string(),
        })
}

/// `1` completes, `2` terminates, any other number asks again.
/// Non-numeric input is an error.
pub fn parse_closing(input: &str) -> Result<Option<Closing>, InputError> {
    Ok(match parse_integer("option", input)? {
        1 => Some(Closing::Complete),
        2 => Some(Closing::Terminate),
        _ => None,
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_yes_no_is_exact() {
        assert_eq!(parse_yes_no("SI"), Some(true));
        assert_eq!(parse_yes_no("NO"), Some(false));
        assert_eq!(parse_yes_no("si"), None);
        assert_eq!(parse_yes_no("SI "), None);
    }

    #[test]
    fn test_featured() {
        assert_eq!(parse_featured("NO").as_deref(), Some("NO"));
        assert_eq!(parse_featured("Tal vez"), None);
    }

    #[test]
    fn test_amount_separators() {
        assert_eq!(parse_amount("monto", "1500.5"), Ok(1500.5));
        assert_eq!(parse_amount("monto", "1500,5"), Ok(1500.5));
        assert!(parse_amount("monto", "mil").is_err());
    }

    #[test]
    fn test_integer_rejects_garbage() {
        assert_eq!(parse_integer("comuna", " 3 "), Ok(3));
        assert_eq!(
            parse_integer("comuna", "tres"),
            Err(InputError::InvalidNumber {
                field: "comuna",
                input: "tres".into()
            })
        );
    }

    #[test]
    fn test_closing_choice() {
        assert_eq!(parse_closing("1"), Ok(Some(Closing::Complete)));
        assert_eq!(parse_closing("2"), Ok(Some(Closing::Terminate)));
        assert_eq!(parse_closing("3"), Ok(None));
        assert!(parse_closing("dos").is_err());
    }
}
