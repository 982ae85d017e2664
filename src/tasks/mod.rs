//! Background Tasks Module
//!
//! # Tasks
//! - Expiry sweeper: removes expired entries at the configured interval

mod sweeper;

pub(crate) use sweeper::spawn_sweeper;
pub use sweeper::SweeperHandle;
