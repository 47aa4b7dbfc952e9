//! Core domain + application logic for the homework status bot.
//!
//! This crate is framework-agnostic. The Practicum HTTP API and Telegram live
//! behind ports (traits) implemented in adapter crates.

pub mod bot;
pub mod config;
pub mod domain;
pub mod errors;
pub mod logging;
pub mod messaging;
pub mod notifier;
pub mod poller;
pub mod ports;
pub mod response;
pub mod status;

pub use errors::{Error, Result};
