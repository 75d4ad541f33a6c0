//! Wire models for the deployment platform REST API

pub mod models;
