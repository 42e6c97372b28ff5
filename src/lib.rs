pub mod auth;
pub mod cli;
pub mod core;
pub mod interview;
pub mod web;

pub use core::{ConfigManager, Database};
pub use interview::{InterviewSession, QuestionBank};
pub use web::start_web_server;
