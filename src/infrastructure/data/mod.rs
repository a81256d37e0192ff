pub mod db_context;
pub mod repositories;
