//! Platform abstraction layer
//!
//! Handles the host side of the game loop:
//! - Wall clock to fixed ticks
//! - Input events to simulation commands

pub mod clock;
pub mod input;

pub use clock::FixedClock;
pub use input::{InputEvent, InputMapper};
