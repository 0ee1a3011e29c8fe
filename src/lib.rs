//! # Triage Board Library
//!
//! Core functionality for the product-feedback triage board API: the
//! normalized item store, status transition model, activity log, SLA
//! computation, AI batch orchestration, tracker integrations, and the HTTP
//! surface that exposes them.

pub mod activity;
pub mod ai;
pub mod board;
pub mod config;
pub mod dataset;
pub mod error;
pub mod handlers;
pub mod models;
pub mod seeds;
pub mod selection;
pub mod server;
pub mod sla;
pub mod store;
pub mod telemetry;
pub mod trackers;
pub mod transitions;
pub mod views;
