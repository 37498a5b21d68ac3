// handlers/public/mod.rs - Public handlers (no authentication required)
//
// Only token acquisition lives here; every other route sits behind the
// admin guard.
pub mod auth;

pub use auth::*;
