pub mod schema;
pub mod surrealdb_context;
