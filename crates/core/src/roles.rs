//! Well-known role name constants.
//!
//! Roles are stored as plain text on the `users` row; these constants are the
//! only values the application ever writes.

pub const ROLE_ADMIN: &str = "admin";
pub const ROLE_STUDENT: &str = "student";
