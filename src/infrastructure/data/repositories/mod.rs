//! Table-scoped repositories over the shared SurrealDB handle.
//!
//! Records are keyed by UUID strings. Reads project the record key back
//! into a plain `id` string so rows deserialize straight into the domain
//! models.

pub mod audit_entry_repository;
pub mod checklist_repository;
pub mod inventory_repository;
pub mod status_report_repository;
pub mod transaction_repository;
pub mod user_repository;

use serde::{Serialize, de::DeserializeOwned, de::IgnoredAny};
use surrealdb::{
    Error,
    error::Db::{IndexExists, Thrown},
};
use uuid::Uuid;

use crate::infrastructure::data::db_context::surrealdb_context::Db;

/// Field list that exposes the record key as a string `id`.
pub(crate) const RECORD_FIELDS: &str = "*, record::id(id) AS id";

pub(crate) fn new_record_id() -> String {
    Uuid::new_v4().to_string()
}

pub(crate) async fn create_record<T>(
    db: &Db,
    table: &str,
    id: &str,
    content: T,
) -> Result<(), Error>
where
    T: Serialize + 'static,
{
    db.query("CREATE type::thing($table, $id) CONTENT $content RETURN NONE")
        .bind(("table", table.to_owned()))
        .bind(("id", id.to_owned()))
        .bind(("content", content))
        .await?
        .check()?;
    Ok(())
}

pub(crate) async fn select_record<T>(db: &Db, table: &str, id: &str) -> Result<Option<T>, Error>
where
    T: DeserializeOwned,
{
    let mut response = db
        .query(format!("SELECT {RECORD_FIELDS} FROM type::thing($table, $id)"))
        .bind(("table", table.to_owned()))
        .bind(("id", id.to_owned()))
        .await?;

    response.take::<Option<T>>(0)
}

/// Fetches a record that was just written, failing loudly if it vanished.
pub(crate) async fn reload_record<T>(db: &Db, table: &str, id: &str) -> Result<T, Error>
where
    T: DeserializeOwned,
{
    select_record(db, table, id)
        .await?
        .ok_or_else(|| Error::Db(Thrown(format!("Record {table}:{id} disappeared after write"))))
}

/// Merges `patch` into an existing record. Returns `false` when the record
/// does not exist; nothing is created in that case.
pub(crate) async fn merge_record<P>(db: &Db, table: &str, id: &str, patch: P) -> Result<bool, Error>
where
    P: Serialize + 'static,
{
    let mut response = db
        .query("UPDATE type::thing($table, $id) MERGE $patch RETURN AFTER")
        .bind(("table", table.to_owned()))
        .bind(("id", id.to_owned()))
        .bind(("patch", patch))
        .await?;

    let updated = response.take::<Vec<IgnoredAny>>(0)?;
    Ok(!updated.is_empty())
}

/// True when a write was refused by a UNIQUE index. Remote engines only
/// carry the server's message, so that is matched as well.
pub fn is_unique_violation(err: &Error) -> bool {
    match err {
        Error::Db(IndexExists { .. }) => true,
        other => other.to_string().contains("already contains"),
    }
}

/// Returns `false` when there was nothing to delete.
pub(crate) async fn delete_record(db: &Db, table: &str, id: &str) -> Result<bool, Error> {
    let mut response = db
        .query("DELETE type::thing($table, $id) RETURN BEFORE")
        .bind(("table", table.to_owned()))
        .bind(("id", id.to_owned()))
        .await?;

    let deleted = response.take::<Vec<IgnoredAny>>(0)?;
    Ok(!deleted.is_empty())
}
