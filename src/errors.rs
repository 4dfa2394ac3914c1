//! Error Types
//!
//! This module defines the error types used throughout the engine.
//!
//! # Overview
//!
//! The main error type [`VitrineError`] covers all failure modes including:
//! - GPU adapter/device acquisition failures
//! - Surface creation and configuration errors
//! - Experience initialization failures
//! - Windowing/event-loop errors
//!
//! # Usage
//!
//! All public APIs return [`Result<T>`] which is an alias for
//! `std::result::Result<T, VitrineError>`.
//!
//! ```rust,ignore
//! use vitrine::errors::{Result, VitrineError};
//!
//! fn start_session() -> Result<()> {
//!     // Operations that may fail return Result
//!     Ok(())
//! }
//! ```

use thiserror::Error;

/// The main error type for the Vitrine engine.
///
/// This enum covers all possible error conditions that can occur during
/// engine operation. Each variant provides specific context about what
/// went wrong.
#[derive(Error, Debug)]
pub enum VitrineError {
    // ========================================================================
    // GPU & Rendering Errors
    // ========================================================================
    /// Failed to request a compatible GPU adapter.
    #[error("Failed to request WGPU adapter: {0}")]
    AdapterRequestFailed(String),

    /// Failed to create the GPU device.
    #[error("Failed to create WGPU device: {0}")]
    DeviceCreateFailed(#[from] wgpu::RequestDeviceError),

    /// Failed to create the presentation surface.
    #[error("Failed to create rendering surface: {0}")]
    SurfaceCreateFailed(String),

    /// The presentation surface is not supported by the selected adapter.
    #[error("Surface not supported by adapter")]
    SurfaceUnsupported,

    /// Window system error.
    #[error("Window system error: {0}")]
    WindowError(#[from] raw_window_handle::HandleError),

    /// Event loop error (winit).
    #[error("Event loop error: {0}")]
    EventLoopError(#[from] winit::error::EventLoopError),

    // ========================================================================
    // Experience Errors
    // ========================================================================
    /// An experience failed to initialize its GPU resources.
    #[error("Experience '{name}' failed to initialize: {reason}")]
    ExperienceInitFailed {
        /// Label of the experience that failed
        name: &'static str,
        /// Description of the failure
        reason: String,
    },

    /// A name did not match any registered experience.
    #[error("Unknown experience '{0}'")]
    UnknownExperience(String),

    /// An operation required a running session but none is active.
    #[error("Engine is not running")]
    NotRunning,
}

impl From<wgpu::CreateSurfaceError> for VitrineError {
    fn from(err: wgpu::CreateSurfaceError) -> Self {
        VitrineError::SurfaceCreateFailed(err.to_string())
    }
}

/// Alias for `Result<T, VitrineError>`.
pub type Result<T> = std::result::Result<T, VitrineError>;
