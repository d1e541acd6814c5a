// Shared query helpers for SurrealDB.

use anyhow::{Result, anyhow};

use crate::db::Db;

/// Allocate the next integer id for `table`.
///
/// Each table has a counter record `sequence:<table>`; a single UPSERT bumps
/// it atomically, so concurrent inserts never receive the same id.
pub async fn next_id(db: &Db, table: &'static str) -> Result<i64> {
    let mut res = db
        .query(
            r#"
            UPSERT ONLY type::thing('sequence', $table)
                SET value = (value OR 0) + 1
                RETURN VALUE value
            "#,
        )
        .bind(("table", table))
        .await?;

    let next: Option<i64> = res.take(0)?;
    next.ok_or_else(|| anyhow!("failed to allocate id for table {}", table))
}
