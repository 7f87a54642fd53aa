//! Authenticated blog API: bearer-token sessions and owner-only post mutation.

pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod export;
pub mod health;
pub mod posts;
pub mod state;
pub mod store;
pub mod users;
