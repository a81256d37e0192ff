use chrono::{DateTime, Utc};
use surrealdb::Error;

use super::{RECORD_FIELDS, create_record, new_record_id, reload_record};
use crate::domain::models::transaction::{InventoryTransaction, NewInventoryTransaction};
use crate::domain::timestamp;
use crate::infrastructure::data::db_context::surrealdb_context::Db;

pub struct TransactionRepository {
    db: Db,
    table: String,
}

impl TransactionRepository {
    pub fn new(db: &Db) -> Self {
        Self {
            db: db.clone(),
            table: String::from("inventory_transactions"),
        }
    }

    pub async fn append(
        &self,
        transaction: NewInventoryTransaction,
    ) -> Result<InventoryTransaction, Error> {
        let id = new_record_id();
        create_record(&self.db, &self.table, &id, transaction).await?;
        reload_record(&self.db, &self.table, &id).await
    }

    /// Every movement at or before `until`, oldest first.
    pub async fn list_until(
        &self,
        until: &DateTime<Utc>,
    ) -> Result<Vec<InventoryTransaction>, Error> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::table($table) \
                 WHERE timestamp <= $until ORDER BY timestamp ASC"
            ))
            .bind(("table", self.table.clone()))
            .bind(("until", timestamp::format(until)))
            .await?;

        response.take::<Vec<InventoryTransaction>>(0)
    }

    pub async fn list_recent(
        &self,
        item: Option<&str>,
        limit: usize,
    ) -> Result<Vec<InventoryTransaction>, Error> {
        let mut query = format!("SELECT {RECORD_FIELDS} FROM type::table($table)");
        if item.is_some() {
            query.push_str(" WHERE string::lowercase(item) = string::lowercase($item)");
        }
        query.push_str(" ORDER BY timestamp DESC LIMIT $limit");

        let mut statement = self
            .db
            .query(query)
            .bind(("table", self.table.clone()))
            .bind(("limit", limit as i64));

        if let Some(item) = item {
            statement = statement.bind(("item", item.to_owned()));
        }

        let mut response = statement.await?;
        response.take::<Vec<InventoryTransaction>>(0)
    }
}
