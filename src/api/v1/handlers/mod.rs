pub mod auth;
pub mod callback;
pub mod dashboard;
pub mod health;
