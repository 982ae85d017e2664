//! Map Module
//!
//! Provides the expiring map: entries that disappear once they outlive a
//! configured age, bounded by a maximum length.

mod entry;
mod stats;
mod store;

#[cfg(test)]
mod property_tests;

// Re-export public types
pub use stats::MapStats;
pub use store::ExpiringMap;
