pub mod player;
pub mod state;
pub mod team;
pub mod wallet;

pub use player::*;
pub use state::*;
pub use team::*;
pub use wallet::*;
