use serde::Deserialize;
use surrealdb::Error;

use super::{RECORD_FIELDS, create_record, new_record_id, reload_record};
use crate::domain::models::user::{NewUser, User};
use crate::infrastructure::data::db_context::surrealdb_context::Db;

pub struct UserRepository {
    db: Db,
    table: String,
}

impl UserRepository {
    pub fn new(db: &Db) -> Self {
        UserRepository {
            db: db.clone(),
            table: String::from("users"),
        }
    }

    pub async fn get_all(&self) -> Result<Vec<User>, Error> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::table($table) ORDER BY username ASC"
            ))
            .bind(("table", self.table.clone()))
            .await?;

        response.take::<Vec<User>>(0)
    }

    pub async fn add_user(&self, user: NewUser) -> Result<User, Error> {
        let id = new_record_id();
        create_record(&self.db, &self.table, &id, user).await?;
        reload_record(&self.db, &self.table, &id).await
    }

    pub async fn get_by_username(&self, username: &str) -> Result<Option<User>, Error> {
        let mut response = self
            .db
            .query(format!(
                "SELECT {RECORD_FIELDS} FROM type::table($table) WHERE username = $username LIMIT 1"
            ))
            .bind(("table", self.table.clone()))
            .bind(("username", username.to_owned()))
            .await?;

        response.take::<Option<User>>(0)
    }

    pub async fn username_exists(&self, username: &str) -> Result<bool, Error> {
        self.exists_by_field("username", username).await
    }

    async fn exists_by_field(&self, field: &str, value: &str) -> Result<bool, Error> {
        let mut response = self
            .db
            .query(
                "SELECT count() AS count FROM type::table($table) WHERE type::field($field) = $value GROUP ALL",
            )
            .bind(("table", self.table.clone()))
            .bind(("field", field.to_string()))
            .bind(("value", value.to_string()))
            .await?;

        #[derive(Deserialize)]
        struct ExistsResult {
            count: i64,
        }

        let count = response
            .take::<Option<ExistsResult>>(0)?
            .map(|record| record.count)
            .unwrap_or(0);

        Ok(count > 0)
    }
}
