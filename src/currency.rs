use crate::error::{Error, Result};
use polars::prelude::*;
use regex::Regex;
use std::sync::LazyLock;

// "$" then either plain digits or digits grouped in threes by commas.
static DOLLARS: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^\$(?:\d+|\d{1,3}(?:,\d{3})+)$").expect("valid regex"));

/// Parse a value such as `$425,000,000` into whole dollars.
pub fn parse_dollars(raw: &str) -> Result<i64> {
    let raw = raw.trim();
    if !DOLLARS.is_match(raw) {
        return Err(Error::parse(
            "monetary value",
            format!("`{raw}` is not a dollar amount"),
        ));
    }
    raw.chars()
        .filter(char::is_ascii_digit)
        .collect::<String>()
        .parse::<i64>()
        .map_err(|e| Error::parse("monetary value", format!("`{raw}`: {e}")))
}

/// Replace the string column `name` of `df` with its `Int64` dollar values.
pub fn dollars_column(df: &mut DataFrame, table: &str, name: &str) -> Result<()> {
    let raw = df
        .column(name)
        .map_err(|_| Error::schema(table, name))?
        .cast(&DataType::String)?;

    let values = raw
        .str()?
        .into_iter()
        .enumerate()
        .map(|(row, value)| match value {
            Some(v) => parse_dollars(v).map_err(|e| match e {
                Error::Parse { message, .. } => {
                    Error::parse(format!("{table}.{name} row {row}"), message)
                }
                other => other,
            }),
            None => Err(Error::parse(
                format!("{table}.{name} row {row}"),
                "missing dollar amount",
            )),
        })
        .collect::<Result<Vec<i64>>>()?;

    df.with_column(Column::new(name.into(), values))?;
    Ok(())
}

#[cfg(test)]
mod test_currency {
    use super::*;

    #[test]
    fn test_parse_dollars() -> Result<()> {
        assert_eq!(parse_dollars("$1,000")?, 1000);
        assert_eq!(parse_dollars("$425,000,000")?, 425_000_000);
        assert_eq!(parse_dollars("$7000")?, 7000);
        assert_eq!(parse_dollars("$0")?, 0);
        Ok(())
    }

    #[test]
    fn test_rejects_malformed() {
        for raw in ["1,000", "$", "$1,00", "$12,3456", "USD 5", "$-5", "", "$1.50"] {
            assert!(
                matches!(parse_dollars(raw), Err(Error::Parse { .. })),
                "accepted {raw:?}"
            );
        }
    }

    #[test]
    fn test_dollars_column() -> Result<()> {
        let mut df = df!("movie" => ["A", "B"], "gross" => ["$2,000", "$35"])?;
        dollars_column(&mut df, "budgets", "gross")?;

        let gross = df.column("gross")?.i64()?;
        assert_eq!(gross.get(0), Some(2000));
        assert_eq!(gross.get(1), Some(35));
        Ok(())
    }

    #[test]
    fn test_dollars_column_errors() -> Result<()> {
        let mut df = df!("gross" => [Some("$2,000"), None])?;
        assert!(matches!(
            dollars_column(&mut df, "budgets", "gross"),
            Err(Error::Parse { .. })
        ));

        let mut df = df!("gross" => ["$1", "oops"])?;
        let err = dollars_column(&mut df, "budgets", "gross").unwrap_err();
        assert!(err.to_string().contains("row 1"));

        assert!(matches!(
            dollars_column(&mut df, "budgets", "budget"),
            Err(Error::Schema { .. })
        ));
        Ok(())
    }
}
