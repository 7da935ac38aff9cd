//! Implementations of ports (hexagonal adapters).

pub mod http;

#[cfg(feature = "telegram")]
pub mod telegram;
