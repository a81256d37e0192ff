use serde::de::IgnoredAny;
use surrealdb::Error;

use super::{
    RECORD_FIELDS, create_record, delete_record, merge_record, new_record_id, reload_record,
    select_record,
};
use crate::domain::models::inventory::{
    InventoryItem, InventoryPatch, MAX_STOCK_QUANTITY, NewInventoryItem,
};
use crate::domain::timestamp;
use crate::infrastructure::data::db_context::surrealdb_context::Db;

pub struct InventoryRepository {
    db: Db,
    table: String,
}

impl InventoryRepository {
    pub fn new(db: &Db) -> Self {
        Self {
            db: db.clone(),
            table: String::from("inventory"),
        }
    }

    pub async fn create(&self, item: NewInventoryItem) -> Result<InventoryItem, Error> {
        let id = new_record_id();
        create_record(&self.db, &self.table, &id, item).await?;
        reload_record(&self.db, &self.table, &id).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<InventoryItem>, Error> {
        select_record(&self.db, &self.table, id).await
    }

    /// First row whose name matches ignoring case, oldest row first.
    pub async fn find_by_name(&self, name: &str) -> Result<Option<InventoryItem>, Error> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::table($table) \
                 WHERE string::lowercase(item) = string::lowercase($name) \
                 ORDER BY createdAt ASC LIMIT 1"
            ))
            .bind(("table", self.table.clone()))
            .bind(("name", name.trim().to_owned()))
            .await?;

        response.take::<Option<InventoryItem>>(0)
    }

    pub async fn list(&self) -> Result<Vec<InventoryItem>, Error> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::table($table) ORDER BY item ASC"
            ))
            .bind(("table", self.table.clone()))
            .await?;

        response.take::<Vec<InventoryItem>>(0)
    }

    /// Adds `quantity` in a single statement unless the result would pass
    /// `MAX_STOCK_QUANTITY`. Returns `false` when the ceiling was hit or the
    /// row no longer exists.
    pub async fn increment(
        &self,
        id: &str,
        quantity: i64,
        low_stock_level: Option<i64>,
    ) -> Result<bool, Error> {
        self.adjust(
            id,
            "quantity += $quantity",
            Some("quantity + $quantity <= $max"),
            quantity,
            low_stock_level,
        )
        .await
    }

    /// Removes `quantity` only if at least that much is in stock; the check
    /// and the write are one conditional update. Returns `false` when the
    /// stock was insufficient or the row no longer exists.
    pub async fn decrement_if_available(
        &self,
        id: &str,
        quantity: i64,
        low_stock_level: Option<i64>,
    ) -> Result<bool, Error> {
        self.adjust(
            id,
            "quantity -= $quantity",
            Some("quantity >= $quantity"),
            quantity,
            low_stock_level,
        )
        .await
    }

    async fn adjust(
        &self,
        id: &str,
        assignment: &str,
        condition: Option<&str>,
        quantity: i64,
        low_stock_level: Option<i64>,
    ) -> Result<bool, Error> {
        let mut query = format!("UPDATE type::thing($table, $id) SET {assignment}, updatedAt = $now");
        if low_stock_level.is_some() {
            query.push_str(", lowStockLevel = $low_stock_level");
        }
        if let Some(condition) = condition {
            query.push_str(" WHERE ");
            query.push_str(condition);
        }
        query.push_str(" RETURN AFTER");

        let mut statement = self
            .db
            .query(query)
            .bind(("table", self.table.clone()))
            .bind(("id", id.to_owned()))
            .bind(("quantity", quantity))
            .bind(("max", MAX_STOCK_QUANTITY))
            .bind(("now", timestamp::format(&timestamp::now())));

        if let Some(level) = low_stock_level {
            statement = statement.bind(("low_stock_level", level));
        }

        let mut response = statement.await?;
        let updated = response.take::<Vec<IgnoredAny>>(0)?;
        Ok(!updated.is_empty())
    }

    pub async fn update(
        &self,
        id: &str,
        patch: InventoryPatch,
    ) -> Result<Option<InventoryItem>, Error> {
        if !merge_record(&self.db, &self.table, id, patch).await? {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, Error> {
        delete_record(&self.db, &self.table, id).await
    }
}
