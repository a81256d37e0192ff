pub mod audit_entry;
pub mod checklist;
pub mod inventory;
pub mod status_report;
pub mod transaction;
pub mod user;
