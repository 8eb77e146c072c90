//! Rewrite stored URL prefixes after moving images to a new host.
//!
//! # Usage
//!
//! ```bash
//! # See what would change
//! ap-cli patch-urls --from http://localhost:3000/uploads --to https://cdn.loja.com.br --dry-run
//!
//! # Apply
//! ap-cli patch-urls --from http://localhost:3000/uploads --to https://cdn.loja.com.br
//! ```
//!
//! Only values that start with `--from` are touched; the rest of each URL is
//! kept. All updates run in one transaction.

use sqlx::{PgPool, Postgres, Transaction};
use tracing::{debug, info};

use crate::error::CliError;

/// Text columns holding URLs, as `(table, column)`.
const URL_COLUMNS: &[(&str, &str)] = &[
    ("products", "image_url"),
    ("categories", "image_url"),
    ("slides", "image_url"),
    ("slides", "link_url"),
];

/// `TEXT[]` columns holding URLs, as `(table, column)`.
const URL_ARRAY_COLUMNS: &[(&str, &str)] = &[("products", "images")];

/// A validated `--from` / `--to` pair.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PrefixRewrite {
    from: String,
    to: String,
}

impl PrefixRewrite {
    /// Validate the prefixes.
    ///
    /// # Errors
    ///
    /// Returns `CliError::InvalidArgument` if `from` is blank or both are
    /// the same.
    pub fn new(from: &str, to: &str) -> Result<Self, CliError> {
        let from = from.trim();
        let to = to.trim();

        if from.is_empty() {
            return Err(CliError::InvalidArgument("--from cannot be empty".to_string()));
        }
        if from == to {
            return Err(CliError::InvalidArgument(
                "--from and --to are identical".to_string(),
            ));
        }

        Ok(Self {
            from: from.to_string(),
            to: to.to_string(),
        })
    }

    /// `url` with the prefix replaced, or `None` if it does not match.
    #[must_use]
    pub fn apply(&self, url: &str) -> Option<String> {
        url.strip_prefix(self.from.as_str())
            .map(|rest| format!("{}{rest}", self.to))
    }
}

/// Rows changed (or, in a dry run, that would change) per column.
#[derive(Debug, Default, Clone, PartialEq, Eq)]
pub struct PatchSummary {
    pub columns: Vec<(String, u64)>,
}

impl PatchSummary {
    /// Rows across all columns.
    #[must_use]
    pub fn total(&self) -> u64 {
        self.columns.iter().map(|(_, rows)| rows).sum()
    }
}

/// Rewrite every matching URL.
///
/// # Errors
///
/// Returns an error if a query fails; nothing is committed in that case.
pub async fn run(
    pool: &PgPool,
    rewrite: &PrefixRewrite,
    dry_run: bool,
) -> Result<PatchSummary, CliError> {
    let mut tx = pool.begin().await?;
    let mut summary = PatchSummary::default();

    for &(table, column) in URL_COLUMNS {
        let rows = patch_column(&mut tx, rewrite, table, column, dry_run).await?;
        info!(table, column, rows, dry_run, "URL column patched");
        summary.columns.push((format!("{table}.{column}"), rows));
    }

    for &(table, column) in URL_ARRAY_COLUMNS {
        let rows = patch_array_column(&mut tx, rewrite, table, column, dry_run).await?;
        info!(table, column, rows, dry_run, "URL array column patched");
        summary.columns.push((format!("{table}.{column}"), rows));
    }

    if dry_run {
        tx.rollback().await?;
        info!(rows = summary.total(), "Dry run, nothing written");
    } else {
        tx.commit().await?;
        info!(rows = summary.total(), "URLs patched");
    }

    Ok(summary)
}

async fn patch_column(
    tx: &mut Transaction<'_, Postgres>,
    rewrite: &PrefixRewrite,
    table: &str,
    column: &str,
    dry_run: bool,
) -> Result<u64, sqlx::Error> {
    let select = format!("SELECT id, {column} FROM {table} WHERE starts_with({column}, $1)");
    let rows: Vec<(i32, String)> = sqlx::query_as(&select)
        .bind(&rewrite.from)
        .fetch_all(&mut **tx)
        .await?;

    let mut changed = 0;
    let update = format!("UPDATE {table} SET {column} = $1 WHERE id = $2");
    for (id, url) in rows {
        let Some(patched) = rewrite.apply(&url) else {
            continue;
        };
        debug!(table, id, from = %url, to = %patched, "Rewriting URL");
        if !dry_run {
            sqlx::query(&update)
                .bind(&patched)
                .bind(id)
                .execute(&mut **tx)
                .await?;
        }
        changed += 1;
    }

    Ok(changed)
}

async fn patch_array_column(
    tx: &mut Transaction<'_, Postgres>,
    rewrite: &PrefixRewrite,
    table: &str,
    column: &str,
    dry_run: bool,
) -> Result<u64, sqlx::Error> {
    let select = format!(
        "SELECT id, {column} FROM {table} \
         WHERE EXISTS (SELECT 1 FROM unnest({column}) AS url WHERE starts_with(url, $1))"
    );
    let rows: Vec<(i32, Vec<String>)> = sqlx::query_as(&select)
        .bind(&rewrite.from)
        .fetch_all(&mut **tx)
        .await?;

    let mut changed = 0;
    let update = format!("UPDATE {table} SET {column} = $1 WHERE id = $2");
    for (id, urls) in rows {
        let patched: Vec<String> = urls
            .iter()
            .map(|url| rewrite.apply(url).unwrap_or_else(|| url.clone()))
            .collect();
        if patched == urls {
            continue;
        }
        debug!(table, id, "Rewriting URL list");
        if !dry_run {
            sqlx::query(&update)
                .bind(&patched)
                .bind(id)
                .execute(&mut **tx)
                .await?;
        }
        changed += 1;
    }

    Ok(changed)
}
