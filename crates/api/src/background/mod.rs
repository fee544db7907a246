//! Background tasks spawned at startup.

pub mod stale_attempts;
