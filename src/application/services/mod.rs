pub mod accounts;
pub mod audit;
pub mod auth;
pub mod inventory;
pub mod notifications;
