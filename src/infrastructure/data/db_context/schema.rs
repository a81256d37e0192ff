use surrealdb::Error;
use tracing::info;

use crate::infrastructure::data::db_context::surrealdb_context::Db;

const DEFINE_USERS: &str = r#"
DEFINE TABLE IF NOT EXISTS users SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS username ON TABLE users TYPE string;
DEFINE FIELD IF NOT EXISTS password ON TABLE users TYPE string;
DEFINE FIELD IF NOT EXISTS role ON TABLE users TYPE string
    ASSERT $value INSIDE ['admin', 'housekeeper', 'store_manager'];
DEFINE FIELD IF NOT EXISTS createdAt ON TABLE users TYPE string;
DEFINE FIELD IF NOT EXISTS updatedAt ON TABLE users TYPE string;
DEFINE INDEX IF NOT EXISTS users_username ON TABLE users FIELDS username UNIQUE;
"#;

const DEFINE_CHECKLISTS: &str = r#"
DEFINE TABLE IF NOT EXISTS checklists SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS room ON TABLE checklists TYPE string;
DEFINE FIELD IF NOT EXISTS date ON TABLE checklists TYPE string;
DEFINE FIELD IF NOT EXISTS items ON TABLE checklists FLEXIBLE TYPE object;
DEFINE FIELD IF NOT EXISTS createdAt ON TABLE checklists TYPE string;
DEFINE FIELD IF NOT EXISTS updatedAt ON TABLE checklists TYPE string;
"#;

const DEFINE_STATUS_REPORTS: &str = r#"
DEFINE TABLE IF NOT EXISTS status_reports SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS room ON TABLE status_reports TYPE string;
DEFINE FIELD IF NOT EXISTS category ON TABLE status_reports TYPE string;
DEFINE FIELD IF NOT EXISTS status ON TABLE status_reports TYPE string;
DEFINE FIELD IF NOT EXISTS remarks ON TABLE status_reports TYPE string DEFAULT '';
DEFINE FIELD IF NOT EXISTS dateTime ON TABLE status_reports TYPE string;
DEFINE FIELD IF NOT EXISTS createdAt ON TABLE status_reports TYPE string;
DEFINE FIELD IF NOT EXISTS updatedAt ON TABLE status_reports TYPE string;
"#;

const DEFINE_INVENTORY: &str = r#"
DEFINE TABLE IF NOT EXISTS inventory SCHEMAFULL;
DEFINE FIELD IF NOT EXISTS item ON TABLE inventory TYPE string;
DEFINE FIELD IF NOT EXISTS quantity ON TABLE inventory TYPE int ASSERT $value >= 0;
DEFINE FIELD IF NOT EXISTS lowStockLevel ON TABLE inventory TYPE int ASSERT $value >= 0;
DEFINE FIELD IF NOT EXISTS createdAt ON TABLE inventory TYPE string;
DEFINE FIELD IF NOT EXISTS updatedAt ON TABLE inventory TYPE string;
"#;

const DEFINE_INVENTORY_TRANSACTIONS: &str = r#"
DEFINE TABLE IF NOT EXISTS inventory_transactions SCHEMAFULL PERMISSIONS
    FOR select FULL,
    FOR create FULL,
    FOR update NONE,
    FOR delete NONE;
DEFINE FIELD IF NOT EXISTS item ON TABLE inventory_transactions TYPE string;
DEFINE FIELD IF NOT EXISTS quantity ON TABLE inventory_transactions TYPE int ASSERT $value > 0;
DEFINE FIELD IF NOT EXISTS action ON TABLE inventory_transactions TYPE string
    ASSERT $value INSIDE ['add', 'use'];
DEFINE FIELD IF NOT EXISTS timestamp ON TABLE inventory_transactions TYPE string;
"#;

const DEFINE_AUDIT_LOGS: &str = r#"
DEFINE TABLE IF NOT EXISTS audit_logs SCHEMAFULL PERMISSIONS
    FOR select FULL,
    FOR create FULL,
    FOR update NONE,
    FOR delete NONE;
DEFINE FIELD IF NOT EXISTS action ON TABLE audit_logs TYPE string;
DEFINE FIELD IF NOT EXISTS details ON TABLE audit_logs FLEXIBLE TYPE object;
DEFINE FIELD IF NOT EXISTS username ON TABLE audit_logs TYPE option<string>;
DEFINE FIELD IF NOT EXISTS role ON TABLE audit_logs TYPE option<string>;
DEFINE FIELD IF NOT EXISTS timestamp ON TABLE audit_logs TYPE string;
"#;

pub async fn ensure_schema(db: &Db) -> Result<(), Error> {
    for definition in [
        DEFINE_USERS,
        DEFINE_CHECKLISTS,
        DEFINE_STATUS_REPORTS,
        DEFINE_INVENTORY,
        DEFINE_INVENTORY_TRANSACTIONS,
        DEFINE_AUDIT_LOGS,
    ] {
        db.query(definition).await?.check()?;
    }

    info!("database schema ensured");
    Ok(())
}
