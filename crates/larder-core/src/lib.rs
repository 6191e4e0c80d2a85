//! larder-core library.
//!
//! The household side of larder: a durable ingredient inventory, a
//! rule-based ingredient classifier, and the planner that turns expiring
//! stock into a two-day meal plan with a shopping list.
//!
//! # Conventions
//!
//! - **Errors**: store writes return [`error::StoreError`]; everything else
//!   uses `anyhow::Result`.
//! - **Logging**: use `tracing` macros (`info!`, `warn!`, `error!`, `debug!`, `trace!`).

pub mod classify;
pub mod config;
pub mod db;
pub mod error;
pub mod ingest;
pub mod knowledge;
pub mod model;
pub mod plan;
pub mod shopping;
