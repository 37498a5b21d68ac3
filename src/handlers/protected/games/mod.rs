pub mod collection;
pub mod record;
pub mod utils;

// Re-export handler functions for use in routing
pub use collection::list as games_list;
pub use collection::create as games_create;
pub use record::get as game_get;
pub use record::put as game_put;
pub use record::delete as game_delete;
