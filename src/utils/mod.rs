//! Utility Module
//!
//! This module provides small self-contained helpers:
//!
//! - [`FpsCounter`]: Frame rate measurement utility
//! - [`time`]: Frame timing and elapsed-time tracking

pub mod fps_counter;
pub mod time;

pub use fps_counter::FpsCounter;
pub use time::Timer;
