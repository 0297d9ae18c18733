pub mod card;
pub mod color;
pub mod config;
pub mod deck;
pub mod error;

pub use card::*;
pub use color::*;
pub use config::Config;
pub use deck::*;
pub use error::*;
