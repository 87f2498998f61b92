//! Rendering error types.

use thiserror::Error;

/// Errors that can occur during rendering operations.
#[derive(Error, Debug)]
pub enum RenderError {
    /// Failed to create wgpu adapter.
    #[error("failed to create graphics adapter")]
    AdapterCreationFailed,

    /// Failed to create wgpu device.
    #[error("failed to create graphics device: {0}")]
    DeviceCreationFailed(#[from] wgpu::RequestDeviceError),

    /// The viewport has no measurable size yet.
    #[error("viewport has zero size ({width}x{height})")]
    ZeroSizedViewport { width: u32, height: u32 },

    /// Rendering was requested after the graphics context was lost or disposed.
    #[error("graphics context lost")]
    ContextLost,

    /// Reading rendered pixels back from the GPU failed.
    #[error("frame readback failed: {0}")]
    ReadbackFailed(String),

    /// The platform could not provide a renderer for this viewport.
    #[error("renderer unavailable: {0}")]
    Unavailable(String),
}

/// A specialized Result type for rendering operations.
pub type RenderResult<T> = std::result::Result<T, RenderError>;
