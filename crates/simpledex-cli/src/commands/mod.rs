pub mod common;
pub mod deploy;
pub mod dex;
pub mod events;
pub mod token;
