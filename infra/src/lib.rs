//! # Convo Infrastructure
//!
//! MySQL-backed implementations of the persistence traits defined in
//! `convo_core`, plus connection-pool construction.

pub mod database;

pub use database::mysql::{MySqlRefreshTokenStore, MySqlUserRepository};
pub use database::create_pool;
