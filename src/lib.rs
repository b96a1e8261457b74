//! event-calendar - calendar events with published and promoted windows
//!
//! Storage, window queries and editor services for a calendar of events
//! backed by SQLite or MySQL.

pub mod cache;
pub mod config;
pub mod db;
pub mod models;
pub mod services;
