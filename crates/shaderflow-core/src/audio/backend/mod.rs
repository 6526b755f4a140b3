//! Audio frame sources
//!
//! A backend owns whatever OS resource produces samples and hands the
//! session one fixed-size frame per tick. Capture callbacks may run on a
//! foreign thread; backends hide that behind a channel so the analysis side
//! stays single-threaded.

#[cfg(feature = "audio")]
pub mod cpal_backend;
pub mod mock_backend;

pub use mock_backend::MockBackend;

use crate::error::AudioError;

/// Source of fixed-size mono audio frames
pub trait AudioBackend {
    /// Acquire the device and begin capturing.
    ///
    /// Failure here means audio-reactive mode must not start.
    fn start(&mut self) -> Result<(), AudioError>;

    /// Release the device. Calling it again is a no-op.
    fn stop(&mut self);

    /// Whether capture is currently running
    fn is_running(&self) -> bool;

    /// Samples per delivered frame
    fn frame_size(&self) -> usize;

    /// Most recent frame, or `None` if not enough audio has arrived yet
    fn latest_frame(&mut self) -> Option<Vec<f32>>;
}
