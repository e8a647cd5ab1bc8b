#![forbid(unsafe_code)]

//! Frame-driven motion primitives.
//!
//! Everything here is advanced explicitly by the host with a frame delta;
//! nothing reads a clock, so runs are deterministic.

use std::time::Duration;

pub mod spring;

pub use spring::{Spring, SpringParams};

/// Something that moves toward a resting state as time is fed to it.
pub trait Animation {
    /// Advance by `dt`.
    fn tick(&mut self, dt: Duration);

    /// Whether the animation has come to rest.
    fn is_complete(&self) -> bool;
}
