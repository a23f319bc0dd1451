//! Time subsystem.
//!
//! Provides stable, testable frame timing utilities without coupling to the runtime.
//! Intended usage:
//! - one `FrameClock` per window, `tick()` once per presented frame
//! - one `FrameTimes` ring per window, fed with the measured frame duration

mod frame_clock;
mod frame_times;

pub use frame_clock::{FrameClock, FrameTime};
pub use frame_times::{fps_title, FrameTimes, TITLE_CAPACITY};
