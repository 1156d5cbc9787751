// Shared domain, persistence and infrastructure code for the repository hub

pub mod auth;
pub mod bootstrap;
pub mod config;
pub mod db;
pub mod errors;
pub mod models;
pub mod ownership;
pub mod service;
pub mod telemetry;
pub mod validation;
