//! deploywatch library
//!
//! Polls a deployment platform for a project's recent deployments and reports
//! new deployments and state transitions in the terminal.

pub mod app;
pub mod errors;
pub mod filesys;
pub mod http;
pub mod logs;
pub mod models;
pub mod render;
pub mod storage;
pub mod utils;
pub mod watch;
pub mod workers;
