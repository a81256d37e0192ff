use surrealdb::{
    Surreal,
    engine::any::{self, Any},
    opt::auth::Root,
};
use tracing::info;

use crate::infrastructure::config::DatabaseConfig;

/// Handle shared by every repository. Cloning is cheap.
pub type Db = Surreal<Any>;

pub async fn init_db(config: &DatabaseConfig) -> Result<Db, surrealdb::Error> {
    info!(url = %config.url, "connecting to SurrealDB");
    let db = any::connect(config.url.as_str()).await?;

    if let (Some(username), Some(password)) = (&config.username, &config.password) {
        info!("signing in as root user");
        db.signin(Root {
            username: username.as_str(),
            password: password.as_str(),
        })
        .await?;
    }

    db.use_ns(config.namespace.as_str())
        .use_db(config.database.as_str())
        .await?;
    info!(
        namespace = %config.namespace,
        database = %config.database,
        "namespace and database selected"
    );

    Ok(db)
}

/// In-memory database with the schema applied.
pub async fn init_memory_db() -> Result<Db, surrealdb::Error> {
    let db = any::connect("mem://").await?;
    db.use_ns("hotel").use_db("operations").await?;
    super::schema::ensure_schema(&db).await?;
    Ok(db)
}
