// src/core/mod.rs
//! Configuration, storage and the language model client.

pub mod config_manager;
pub mod database;
pub mod llm_client;

pub use config_manager::ConfigManager;
pub use database::Database;
