//! Horizon engine crate.
//!
//! Owns the platform + GPU runtime pieces used by the scene layer: window
//! loop, device/surface, input translation, frame timing and logging.

pub mod core;
pub mod device;
pub mod input;
pub mod logging;
pub mod render;
pub mod time;
pub mod window;
