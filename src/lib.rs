//! # Planet Tracker
//!
//! A chat-server companion that tracks each player's planet upgrades,
//! pings them when an upgrade finishes, and plans research artifacts.
//!
//! ## Architecture
//!
//! - **models**: Core data structures (slots, player records, research)
//! - **convert**: Duration and number text conversions
//! - **balance**: Game balance formulas (costs, durations, storage)
//! - **reference**: Static reference tables loaded from JSON
//! - **storage**: Persisted player state
//! - **planets**: Upgrade workflow and planet reports
//! - **research**: Artifact estimator
//! - **commands**: Command parsing and dispatch
//! - **notify**: Completion notifications
//! - **scanner**: Periodic upgrade completion
//! - **api**: REST API endpoints
//! - **config**: Configuration loading and validation

pub mod api;
pub mod balance;
pub mod commands;
pub mod config;
pub mod convert;
pub mod models;
pub mod notify;
pub mod planets;
pub mod reference;
pub mod research;
pub mod scanner;
pub mod storage;

pub use models::*;
