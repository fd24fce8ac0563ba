//! # SQLite Specific SQL Queries
//!
//! This module centralizes SQL strings for the record store. The table name
//! is configurable, so every statement is built for a validated, quoted
//! identifier.

use crate::errors::ExtractError;

/// Checks that `table` is safe to splice into SQL as a quoted identifier.
///
/// Only ASCII letters, digits, `_` and `-` are accepted.
pub fn validate_table_name(table: &str) -> Result<(), ExtractError> {
    let valid = !table.is_empty()
        && table
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || c == '_' || c == '-');
    if valid {
        Ok(())
    } else {
        Err(ExtractError::InvalidTableName(table.to_string()))
    }
}

/// Returns the statement that creates the records table if it is missing.
pub fn create_records_table(table: &str) -> String {
    format!(
        r#"
        CREATE TABLE IF NOT EXISTS "{table}" (
            image_id TEXT PRIMARY KEY,
            processing_timestamp TEXT NOT NULL,
            source_bucket TEXT NOT NULL,
            source_key TEXT NOT NULL,
            processing_status TEXT NOT NULL,
            product_specifications TEXT,
            error_message TEXT
        );
    "#
    )
}

/// Returns the keyed upsert for a single record. Expects seven positional
/// parameters in column order.
pub fn upsert_record(table: &str) -> String {
    format!(
        r#"INSERT INTO "{table}" (image_id, processing_timestamp, source_bucket, source_key, processing_status, product_specifications, error_message)
         VALUES (?, ?, ?, ?, ?, ?, ?)
         ON CONFLICT(image_id) DO UPDATE SET
            processing_timestamp=excluded.processing_timestamp,
            source_bucket=excluded.source_bucket,
            source_key=excluded.source_key,
            processing_status=excluded.processing_status,
            product_specifications=excluded.product_specifications,
            error_message=excluded.error_message"#
    )
}

/// Returns the query listing every record, oldest first.
pub fn select_records(table: &str) -> String {
    format!(
        r#"SELECT image_id, processing_timestamp, source_bucket, source_key, processing_status, product_specifications, error_message
         FROM "{table}"
         ORDER BY processing_timestamp ASC"#
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn accepts_plain_table_names() {
        assert!(validate_table_name("product-specifications-1759434139589").is_ok());
        assert!(validate_table_name("records_v2").is_ok());
    }

    #[test]
    fn rejects_names_that_could_break_out_of_quotes() {
        for name in ["", "a\"b", "x; DROP TABLE y", "with space"] {
            assert!(
                matches!(validate_table_name(name), Err(ExtractError::InvalidTableName(_))),
                "expected '{name}' to be rejected"
            );
        }
    }
}
