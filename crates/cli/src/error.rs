//! Error type for the maintenance commands.

use std::io;
use std::path::PathBuf;

use thiserror::Error;

use crate::config::ConfigError;

/// `PostgreSQL` SQLSTATE codes for objects that already exist.
///
/// `42P07` duplicate table, `42P06` duplicate schema, `42710` duplicate
/// object, `42701` duplicate column, `42P16` invalid table definition (e.g. a
/// second primary key), `23505` unique violation.
const DUPLICATE_CODES: &[&str] = &["42P07", "42P06", "42710", "42701", "42P16", "23505"];

/// Errors that can occur while running a command.
#[derive(Debug, Error)]
pub enum CliError {
    #[error(transparent)]
    Config(#[from] ConfigError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("{path}: {source}")]
    Io { path: PathBuf, source: io::Error },

    #[error("Migrations directory not found: {0}")]
    MigrationsNotFound(PathBuf),

    #[error("Migration {file} failed at statement {statement}: {source}")]
    Migration {
        file: String,
        statement: usize,
        source: sqlx::Error,
    },

    #[error("Invalid argument: {0}")]
    InvalidArgument(String),
}

/// Whether `err` says the object being created is already there.
///
/// Such errors are expected when a migration or seed is re-run and are
/// logged instead of failing the command.
#[must_use]
pub fn is_duplicate_error(err: &sqlx::Error) -> bool {
    match err {
        sqlx::Error::Database(db) => is_duplicate(db.code().as_deref(), db.message()),
        _ => false,
    }
}

fn is_duplicate(code: Option<&str>, message: &str) -> bool {
    if code.is_some_and(|code| DUPLICATE_CODES.contains(&code)) {
        return true;
    }
    let message = message.to_lowercase();
    message.contains("already exists") || message.contains("duplicate")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_duplicate_codes() {
        for code in DUPLICATE_CODES {
            assert!(is_duplicate(Some(*code), "boom"), "{code}");
        }
    }

    #[test]
    fn test_duplicate_messages() {
        assert!(is_duplicate(None, "relation \"products\" already exists"));
        assert!(is_duplicate(Some("XX000"), "Duplicate key value"));
    }

    #[test]
    fn test_other_errors_are_fatal() {
        assert!(!is_duplicate(Some("42601"), "syntax error at or near \"TABEL\""));
        assert!(!is_duplicate(None, "connection refused"));
        assert!(!is_duplicate_error(&sqlx::Error::RowNotFound));
    }
}
