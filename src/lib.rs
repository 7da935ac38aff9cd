//! Rackwatch - Dedicated-server stock monitoring with Telegram alerts.
//!
//! This crate polls an inventory API for the availability of subscribed
//! server plans, diffs each snapshot against the last observed state, and
//! alerts when a plan crosses the in-stock boundary in either direction.
//!
//! # Architecture
//!
//! The crate separates detection from delivery behind small ports:
//!
//! - **`app::DiffEngine`** - Per-subscription transition detection
//!   - restocks are grouped into one alert per configuration
//!   - sold-out transitions alert individually
//! - **`app::StockMonitor`** - Poll-loop lifecycle and catalog sweeps
//! - **`port`** - Lookup and delivery traits the engine runs against
//! - **`adapter`** - HTTP lookups and Telegram delivery
//!
//! # Modules
//!
//! - [`config`] - Configuration loading from a TOML file
//! - [`domain`] - Subscriptions, availability snapshots, alerts
//! - [`error`] - Error types for the crate
//! - [`port`] - Trait definitions the application layer depends on
//! - [`app`] - Stores, diffing, dispatch, and the poll loop
//! - [`adapter`] - Port implementations
//!
//! # Features
//!
//! - `telegram` - Enable Telegram delivery (on by default)
//!
//! # Example
//!
//! ```no_run
//! use rackwatch::app::SubscriptionStore;
//! use rackwatch::domain::SubscriptionSpec;
//!
//! let store = SubscriptionStore::new();
//! store.add(SubscriptionSpec::new("25skle01"));
//! ```

pub mod adapter;
pub mod app;
pub mod config;
pub mod domain;
pub mod error;
pub mod port;
