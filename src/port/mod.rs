//! Trait definitions (hexagonal ports). Depend only on domain.
//!
//! Ports are the seams to the external collaborators: the availability
//! inventory, the price endpoint, and the alert transport. Adapters
//! implement them; the application layer only sees the traits.

mod availability;
mod notifier;
mod price;

// Availability port
pub use availability::AvailabilityLookup;

// Price port
pub use price::{PriceLookup, PriceQuote};

// Alert transport port
pub use notifier::{AlertAction, AlertSink, NullSink, TracingSink};
