// handlers/mod.rs - Two-tier handler layout
//
// Public (no auth) → Protected (admin JWT, enforced by middleware::require_admin)
pub mod public;    // Token acquisition (/api/auth/login)
pub mod protected; // Admin-only API (/api/games, /api/upload, /api/auth/whoami)
