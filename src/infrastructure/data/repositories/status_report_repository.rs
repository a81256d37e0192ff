use chrono::{DateTime, Utc};
use surrealdb::Error;

use super::{
    RECORD_FIELDS, create_record, delete_record, merge_record, new_record_id, reload_record,
    select_record,
};
use crate::domain::models::status_report::{
    NewStatusReport, RoomStatus, StatusReport, StatusReportPatch,
};
use crate::domain::timestamp;
use crate::infrastructure::data::db_context::surrealdb_context::Db;

#[derive(Debug, Default, Clone)]
pub struct StatusReportFilter {
    pub from: Option<DateTime<Utc>>,
    pub until: Option<DateTime<Utc>>,
    pub status: Option<RoomStatus>,
}

pub struct StatusReportRepository {
    db: Db,
    table: String,
}

impl StatusReportRepository {
    pub fn new(db: &Db) -> Self {
        Self {
            db: db.clone(),
            table: String::from("status_reports"),
        }
    }

    pub async fn create(&self, report: NewStatusReport) -> Result<StatusReport, Error> {
        let id = new_record_id();
        create_record(&self.db, &self.table, &id, report).await?;
        reload_record(&self.db, &self.table, &id).await
    }

    pub async fn get_by_id(&self, id: &str) -> Result<Option<StatusReport>, Error> {
        select_record(&self.db, &self.table, id).await
    }

    /// Newest `dateTime` first. `until` is exclusive.
    pub async fn list(&self, filter: &StatusReportFilter) -> Result<Vec<StatusReport>, Error> {
        let mut query = format!("SELECT {RECORD_FIELDS} FROM type::table($table)");
        let mut clauses = Vec::new();

        if filter.from.is_some() {
            clauses.push("dateTime >= $from");
        }
        if filter.until.is_some() {
            clauses.push("dateTime < $until");
        }
        if filter.status.is_some() {
            clauses.push("status = $status");
        }

        if !clauses.is_empty() {
            query.push_str(" WHERE ");
            query.push_str(&clauses.join(" AND "));
        }
        query.push_str(" ORDER BY dateTime DESC");

        let mut statement = self.db.query(query).bind(("table", self.table.clone()));

        if let Some(from) = &filter.from {
            statement = statement.bind(("from", timestamp::format(from)));
        }
        if let Some(until) = &filter.until {
            statement = statement.bind(("until", timestamp::format(until)));
        }
        if let Some(status) = filter.status {
            statement = statement.bind(("status", status.as_str().to_owned()));
        }

        let mut response = statement.await?;
        response.take::<Vec<StatusReport>>(0)
    }

    pub async fn update(
        &self,
        id: &str,
        patch: StatusReportPatch,
    ) -> Result<Option<StatusReport>, Error> {
        if !merge_record(&self.db, &self.table, id, patch).await? {
            return Ok(None);
        }
        self.get_by_id(id).await
    }

    pub async fn delete(&self, id: &str) -> Result<bool, Error> {
        delete_record(&self.db, &self.table, id).await
    }
}
