//! Schema migrations.
//!
//! # Usage
//!
//! ```bash
//! # Apply every migration in crates/cli/migrations
//! ap-cli migrate
//!
//! # Drop everything in the public schema first
//! ap-cli migrate --reset
//!
//! # Use another directory
//! ap-cli migrate --dir ./sql
//! ```
//!
//! Files ending in `.sql` run in filename order (`001_...`, `002_...`). Each
//! file is split into statements that run one at a time, so a statement
//! that fails because its object already exists is logged and skipped while
//! the rest of the file still applies. There is no bookkeeping table:
//! migrations are written to be re-runnable.

use std::path::{Path, PathBuf};

use sqlx::PgPool;
use tracing::{info, warn};

use crate::error::{CliError, is_duplicate_error};

/// Statements run by `--reset`.
const RESET_SQL: &[&str] = &[
    "DROP SCHEMA IF EXISTS public CASCADE",
    "CREATE SCHEMA public",
    "GRANT ALL ON SCHEMA public TO public",
];

/// Outcome of a migration run.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct MigrationSummary {
    pub files: usize,
    pub executed: usize,
    pub skipped: usize,
}

/// Apply every `.sql` file in `dir`.
///
/// # Errors
///
/// Returns an error if the directory cannot be read or a statement fails
/// for any reason other than a duplicate object.
pub async fn run(pool: &PgPool, dir: &Path, reset: bool) -> Result<MigrationSummary, CliError> {
    let files = migration_files(dir)?;
    info!(dir = %dir.display(), files = files.len(), "Found migrations");

    if reset {
        warn!("Resetting public schema, all data will be lost");
        for statement in RESET_SQL {
            sqlx::raw_sql(statement).execute(pool).await?;
        }
    }

    let mut summary = MigrationSummary::default();

    for path in &files {
        let name = file_name(path);
        let sql = std::fs::read_to_string(path).map_err(|source| CliError::Io {
            path: path.clone(),
            source,
        })?;

        let statements = split_statements(&sql);
        info!(file = %name, statements = statements.len(), "Applying migration");

        for (index, statement) in statements.iter().enumerate() {
            match sqlx::raw_sql(statement).execute(pool).await {
                Ok(_) => summary.executed += 1,
                Err(e) if is_duplicate_error(&e) => {
                    warn!(file = %name, statement = index + 1, error = %e, "Already applied, skipping");
                    summary.skipped += 1;
                }
                Err(source) => {
                    return Err(CliError::Migration {
                        file: name,
                        statement: index + 1,
                        source,
                    });
                }
            }
        }

        summary.files += 1;
    }

    info!(
        files = summary.files,
        executed = summary.executed,
        skipped = summary.skipped,
        "Migrations complete"
    );
    Ok(summary)
}

/// `.sql` files directly inside `dir`, sorted by file name.
///
/// # Errors
///
/// Returns `CliError::MigrationsNotFound` if `dir` is not a directory.
pub fn migration_files(dir: &Path) -> Result<Vec<PathBuf>, CliError> {
    if !dir.is_dir() {
        return Err(CliError::MigrationsNotFound(dir.to_path_buf()));
    }

    let entries = std::fs::read_dir(dir).map_err(|source| CliError::Io {
        path: dir.to_path_buf(),
        source,
    })?;

    let mut files = Vec::new();
    for entry in entries {
        let path = entry
            .map_err(|source| CliError::Io {
                path: dir.to_path_buf(),
                source,
            })?
            .path();
        if path.is_file() && path.extension().is_some_and(|ext| ext == "sql") {
            files.push(path);
        }
    }

    files.sort_by(|a, b| a.file_name().cmp(&b.file_name()));
    Ok(files)
}

fn file_name(path: &Path) -> String {
    path.file_name()
        .map_or_else(|| path.display().to_string(), |n| n.to_string_lossy().into_owned())
}

/// Split a SQL script into statements on top-level `;`.
///
/// Semicolons inside quoted strings and identifiers, `--` and `/* */`
/// comments, and dollar-quoted bodies (`$$ ... $$`, `$fn$ ... $fn$`) do not
/// end a statement. Statements holding nothing but comments are dropped.
#[must_use]
pub fn split_statements(sql: &str) -> Vec<String> {
    let mut statements = Vec::new();
    let mut current = String::new();
    let mut has_code = false;
    let mut chars = sql.char_indices().peekable();

    while let Some((start, c)) = chars.next() {
        match c {
            '\'' | '"' => {
                has_code = true;
                current.push(c);
                // A doubled quote closes and immediately reopens, which
                // leaves the scanner inside the literal as required.
                for (_, next) in chars.by_ref() {
                    current.push(next);
                    if next == c {
                        break;
                    }
                }
            }
            '-' if chars.peek().is_some_and(|&(_, next)| next == '-') => {
                current.push(c);
                for (_, next) in chars.by_ref() {
                    current.push(next);
                    if next == '\n' {
                        break;
                    }
                }
            }
            '/' if chars.peek().is_some_and(|&(_, next)| next == '*') => {
                chars.next();
                current.push_str("/*");
                // Block comments nest in PostgreSQL.
                let mut depth = 1_usize;
                let mut prev = '\0';
                while depth > 0 {
                    let Some((_, next)) = chars.next() else {
                        break;
                    };
                    current.push(next);
                    if prev == '/' && next == '*' {
                        depth += 1;
                        prev = '\0';
                    } else if prev == '*' && next == '/' {
                        depth -= 1;
                        prev = '\0';
                    } else {
                        prev = next;
                    }
                }
            }
            '$' => {
                has_code = true;
                let rest = sql.get(start..).unwrap_or_default();
                match dollar_tag(rest) {
                    Some(tag) => {
                        let body_start = start + tag.len();
                        let body = sql.get(body_start..).unwrap_or_default();
                        let end = body.find(tag).map_or(sql.len(), |pos| body_start + pos + tag.len());
                        current.push_str(sql.get(start..end).unwrap_or_default());
                        while chars.next_if(|&(index, _)| index < end).is_some() {}
                    }
                    None => current.push(c),
                }
            }
            ';' => {
                if has_code {
                    statements.push(current.trim().to_string());
                }
                current.clear();
                has_code = false;
            }
            _ => {
                if !c.is_whitespace() {
                    has_code = true;
                }
                current.push(c);
            }
        }
    }

    if has_code {
        statements.push(current.trim().to_string());
    }

    statements
}

/// The opening `$tag$` of a dollar-quoted string at the start of `s`.
fn dollar_tag(s: &str) -> Option<&str> {
    let inner = s.strip_prefix('$')?;
    let len = inner.find('$')?;
    let name = inner.get(..len)?;

    let valid = name.chars().enumerate().all(|(i, c)| {
        c == '_' || c.is_ascii_alphabetic() || (i > 0 && c.is_ascii_digit())
    });
    if valid { s.get(..len + 2) } else { None }
}

#[cfg(test)]
#[allow(clippy::unwrap_used)]
mod tests {
    use super::*;

    #[test]
    fn test_splits_simple_statements() {
        let sql = "CREATE TABLE a (id INT);\nCREATE TABLE b (id INT);\n";
        assert_eq!(
            split_statements(sql),
            vec!["CREATE TABLE a (id INT)", "CREATE TABLE b (id INT)"]
        );
    }

    #[test]
    fn test_keeps_last_statement_without_semicolon() {
        assert_eq!(
            split_statements("SELECT 1;\nSELECT 2"),
            vec!["SELECT 1", "SELECT 2"]
        );
    }

    #[test]
    fn test_semicolon_inside_quotes() {
        let sql = "INSERT INTO t VALUES ('a;b', 'it''s; fine');\nSELECT \"odd;name\" FROM t;";
        assert_eq!(
            split_statements(sql),
            vec![
                "INSERT INTO t VALUES ('a;b', 'it''s; fine')",
                "SELECT \"odd;name\" FROM t",
            ]
        );
    }

    #[test]
    fn test_semicolon_inside_comments() {
        let sql = "-- first; comment\nSELECT 1; /* block; comment */ SELECT 2;\n-- trailing; note\n";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].ends_with("SELECT 1"));
        assert!(statements[1].ends_with("SELECT 2"));
    }

    #[test]
    fn test_nested_block_comment() {
        let sql = "/* outer /* inner; */ still; comment */ SELECT 1;";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 1);
        assert!(statements[0].ends_with("SELECT 1"));
    }

    #[test]
    fn test_dollar_quoted_function_body() {
        let sql = "CREATE FUNCTION touch() RETURNS trigger AS $$\nBEGIN\n  NEW.updated_at = NOW();\n  RETURN NEW;\nEND;\n$$ LANGUAGE plpgsql;\nSELECT 1;";
        let statements = split_statements(sql);
        assert_eq!(statements.len(), 2);
        assert!(statements[0].starts_with("CREATE FUNCTION"));
        assert!(statements[0].ends_with("LANGUAGE plpgsql"));
        assert_eq!(statements[1], "SELECT 1");
    }

    #[test]
    fn test_tagged_dollar_quote_and_positional_parameter() {
        let sql = "DO $body$ BEGIN PERFORM 1; END $body$;\nPREPARE q AS SELECT $1;";
        assert_eq!(
            split_statements(sql),
            vec![
                "DO $body$ BEGIN PERFORM 1; END $body$",
                "PREPARE q AS SELECT $1",
            ]
        );
    }

    #[test]
    fn test_comment_only_input() {
        assert!(split_statements("-- nothing here;\n/* or here; */\n ; ;").is_empty());
    }

    #[test]
    fn test_dollar_tag() {
        assert_eq!(dollar_tag("$$ body"), Some("$$"));
        assert_eq!(dollar_tag("$fn_1$ body"), Some("$fn_1$"));
        assert_eq!(dollar_tag("$1, $2"), None);
        assert_eq!(dollar_tag("$ x"), None);
    }

    #[test]
    fn test_migration_files_sorted_and_filtered() {
        let dir = tempfile::tempdir().unwrap();
        for name in ["002_seed.sql", "001_schema.sql", "README.md", "010_indexes.sql"] {
            std::fs::write(dir.path().join(name), "SELECT 1;").unwrap();
        }
        std::fs::create_dir(dir.path().join("003_dir.sql")).unwrap();

        let names: Vec<String> = migration_files(dir.path())
            .unwrap()
            .iter()
            .map(|p| file_name(p))
            .collect();
        assert_eq!(names, vec!["001_schema.sql", "002_seed.sql", "010_indexes.sql"]);
    }

    #[test]
    fn test_missing_directory() {
        let err = migration_files(Path::new("/definitely/not/here")).unwrap_err();
        assert!(matches!(err, CliError::MigrationsNotFound(_)));
    }

    #[test]
    fn test_bundled_migrations_split_cleanly() {
        let dir = Path::new(env!("CARGO_MANIFEST_DIR")).join("migrations");
        let files = migration_files(&dir).unwrap();
        assert!(!files.is_empty());
        for file in files {
            let sql = std::fs::read_to_string(&file).unwrap();
            let statements = split_statements(&sql);
            assert!(!statements.is_empty(), "{}", file.display());
            assert!(statements.iter().all(|s| !s.ends_with(';')));
        }
    }
}
