pub mod auth;
pub mod health;
pub mod note;
pub mod user;
pub mod views;
