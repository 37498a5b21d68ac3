pub mod game;
pub mod user;

pub use game::{Game, GameChanges, GameRow, NewGame};
pub use user::{NewUser, User};
