//! Pair-matching memory game.
//!
//! [`engine`] holds the game rules and timers and has no toolkit dependency.
//! [`ui`] renders an engine [`engine::Game`] with GTK4 and libadwaita.

pub mod engine;
pub mod error;
#[cfg(feature = "ui")]
pub mod ui;

pub use error::{Error, Result};
