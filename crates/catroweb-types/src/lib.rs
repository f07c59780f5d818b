//! Wire types shared by the Catroweb API crates.

pub mod api;
pub mod like;
pub mod status;
