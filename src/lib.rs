//! Expiring Map - a concurrency-safe map whose entries expire
//!
//! Entries are keyed by string and become absent once they outlive a fixed
//! age. The map is bounded: inserting a new key into a full map evicts the
//! oldest entry, or panics when configured to. An optional background
//! sweeper reclaims expired entries that are never read again.
//!
//! ```ignore
//! let map = ExpiringMap::new(Settings::new().with_age(Duration::from_secs(2)))?;
//! map.set("foo", 1);
//! assert_eq!(map.get("foo"), Some(1));
//! ```

pub mod config;
pub mod error;
pub mod map;
pub mod tasks;

pub use config::{ResolvedSettings, Settings};
pub use error::{ExpiringMapError, Result};
pub use map::{ExpiringMap, MapStats};
pub use tasks::SweeperHandle;
