use surrealdb::Error;

use super::{RECORD_FIELDS, create_record, new_record_id};
use crate::domain::models::audit_entry::{AuditEntry, NewAuditEntry};
use crate::infrastructure::data::db_context::surrealdb_context::Db;

pub struct AuditEntryRepository {
    db: Db,
    table: String,
}

impl AuditEntryRepository {
    pub fn new(db: &Db) -> Self {
        Self {
            db: db.clone(),
            table: String::from("audit_logs"),
        }
    }

    pub async fn log(&self, entry: NewAuditEntry) -> Result<(), Error> {
        create_record(&self.db, &self.table, &new_record_id(), entry).await
    }

    pub async fn query_logs(
        &self,
        username: Option<&str>,
        action: Option<&str>,
        limit: usize,
    ) -> Result<Vec<AuditEntry>, Error> {
        let mut query = format!("SELECT {RECORD_FIELDS} FROM type::table($table)");
        let mut clauses = Vec::new();

        if username.is_some() {
            clauses.push("username = $username");
        }

        if action.is_some() {
            clauses.push("action = $action");
        }

        if !clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&clauses.join(" AND "));
        }

        query.push_str(" ORDER BY timestamp DESC LIMIT $limit");

        let mut statement = self
            .db
            .query(query)
            .bind(("table", self.table.clone()))
            .bind(("limit", limit as i64));

        if let Some(username) = username {
            statement = statement.bind(("username", username.to_owned()));
        }

        if let Some(action) = action {
            statement = statement.bind(("action", action.to_owned()));
        }

        let mut response = statement.await?;
        let entries = response.take::<Vec<AuditEntry>>(0)?;
        Ok(entries)
    }
}
