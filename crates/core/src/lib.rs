//! # StudioSync Core
//!
//! Domain layer of the StudioSync music-school scheduler. It owns the lesson
//! and recurring-schedule models, the interval conflict rules shared by both
//! booking surfaces, schedule materialization, and the teacher absence /
//! substitute coverage workflow.
//!
//! Persistence is reached only through the [`store::Store`] and
//! [`store::StoreTx`] traits so the same services run against PostgreSQL in
//! production and against [`store::memory::MemoryStore`] in tests.

pub mod booking;
pub mod config;
pub mod conflict;
pub mod coverage;
pub mod errors;
pub mod materializer;
pub mod models;
pub mod notify;
pub mod schedules;
pub mod store;
pub mod time;
