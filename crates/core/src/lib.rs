//! Pure domain logic for the praxia reward engine.
//!
//! Everything here is side-effect free: points arithmetic, the streak state
//! machine, grace-skip eligibility windows, and the badge rule table. The
//! `db` and `rewards` crates wrap these functions with persistence; this
//! crate has zero internal dependencies so the business rules can be unit
//! tested without a database.

pub mod badges;
pub mod error;
pub mod grace;
pub mod points;
pub mod roles;
pub mod streak;
pub mod types;
