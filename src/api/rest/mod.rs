pub mod admin;
pub mod checklists;
pub mod extract;
pub mod healthcheck;
pub mod inventory;
pub mod middleware;
pub mod responses;
pub mod router;
pub mod status_reports;
