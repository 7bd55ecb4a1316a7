//! src/lib.rs
pub mod configuration;
pub mod deal_checker;
pub mod domain;
pub mod email_client;
pub mod routes;
pub mod startup;
pub mod telemetry;
