// handlers/protected/mod.rs - Admin-only handlers
//
// Every route in this tier is layered with `middleware::require_admin`, so
// handlers may rely on an `AuthUser` extension being present.
pub mod auth;   // Session introspection
pub mod games;  // Game CRUD with roster normalization
pub mod upload; // Character image upload to the media host

pub use auth::*;
pub use games::*;
pub use upload::upload_post;
