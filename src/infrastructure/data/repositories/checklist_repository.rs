use chrono::NaiveDate;
use surrealdb::Error;

use super::{
    RECORD_FIELDS, create_record, delete_record, merge_record, new_record_id, reload_record,
    select_record,
};
use crate::domain::models::checklist::{Checklist, ChecklistPatch, NewChecklist};
use crate::infrastructure::data::db_context::surrealdb_context::Db;

pub struct ChecklistRepository {
    db: Db,
    table: String,
}

impl ChecklistRepository {
    pub fn new(db: &Db) -> Self {
        Self {
            db: db.clone(),
            table: String::from("checklists"),
        }
    }

    pub async fn create(&self, checklist: NewChecklist) -> Result<Checklist, Error> {
        let id = new_record_id();
        create_record(&self.db, &self.table, &id, checklist).await?;
        reload_record(&self.db, &self.table, &id).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<Checklist>, Error> {
        select_record(&self.db, &self.table, id).await
    }

    /// Newest date first; same-date entries newest submission first.
    pub async fn list(&self, room: Option<&str>) -> Result<Vec<Checklist>, Error> {
        let mut query = format!("SELECT {RECORD_FIELDS} FROM type::table($table)");
        if room.is_some() {
            query.push_str(" WHERE room = $room");
        }
        query.push_str(" ORDER BY date DESC, createdAt DESC");

        let mut statement = self.db.query(query).bind(("table", self.table.clone()));
        if let Some(room) = room {
            statement = statement.bind(("room", room.to_owned()));
        }

        let mut response = statement.await?;
        response.take::<Vec<Checklist>>(0)
    }

    pub async fn list_for_date(&self, date: NaiveDate) -> Result<Vec<Checklist>, Error> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::table($table) WHERE date = $date ORDER BY room ASC"
            ))
            .bind(("table", self.table.clone()))
            .bind(("date", date.to_string()))
            .await?;

        response.take::<Vec<Checklist>>(0)
    }

    /// Supplied `items` replace the stored map; MERGE alone would fold the
    /// old keys back in.
    pub async fn update(
        &self,
        id: &str,
        mut patch: ChecklistPatch,
    ) -> Result<Option<Checklist>, Error> {
        let items = patch.items.take();
        if !merge_record(&self.db, &self.table, id, patch).await? {
            return Ok(None);
        }

        if let Some(items) = items {
            self.db
                .query("UPDATE type::thing($table, $id) SET items = $items RETURN NONE")
                .bind(("table", self.table.clone()))
                .bind(("id", id.to_owned()))
                .bind(("items", items))
                .await?
                .check()?;
        }

        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, Error> {
        delete_record(&self.db, &self.table, id).await
    }
}
