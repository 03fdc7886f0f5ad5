//! Light sensor monitoring service.
//!
//! Polls a serial-connected multi-channel light sensor, persists raw
//! readings and derived ON/OFF transitions to per-day CSV files, emails a
//! notification per transition, and serves a filterable view over the
//! accumulated transition history through the `dashboard` binary.

pub mod alert;
pub mod config;
pub mod dashboard;
pub mod ingest;
pub mod logging;
pub mod model;
pub mod notify;
pub mod records;
pub mod sensors;
pub mod service;
