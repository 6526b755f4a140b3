//! Scripted frame source for tests and offline hosts

use std::collections::VecDeque;

use super::AudioBackend;
use crate::error::AudioError;

/// Plays back queued frames, one per call to `latest_frame`.
///
/// Once the queue is drained the last frame keeps being returned, the same
/// way a live analyser keeps exposing its most recent window.
#[derive(Debug, Clone)]
pub struct MockBackend {
    frame_size: usize,
    queue: VecDeque<Vec<f32>>,
    last: Option<Vec<f32>>,
    running: bool,
    deny_access: bool,
    start_calls: usize,
    stop_calls: usize,
}

impl MockBackend {
    /// Create an empty mock producing frames of `frame_size` samples
    pub fn new(frame_size: usize) -> Self {
        Self {
            frame_size,
            queue: VecDeque::new(),
            last: None,
            running: false,
            deny_access: false,
            start_calls: 0,
            stop_calls: 0,
        }
    }

    /// Create a mock preloaded with `frames`
    pub fn with_frames(frame_size: usize, frames: impl IntoIterator<Item = Vec<f32>>) -> Self {
        let mut backend = Self::new(frame_size);
        backend.queue.extend(frames);
        backend
    }

    /// Create a mock whose `start` fails like a denied microphone permission
    pub fn denied(frame_size: usize) -> Self {
        Self {
            deny_access: true,
            ..Self::new(frame_size)
        }
    }

    /// Queue another frame
    pub fn push_frame(&mut self, frame: Vec<f32>) {
        self.queue.push_back(frame);
    }

    /// How often `start` was called
    pub fn start_calls(&self) -> usize {
        self.start_calls
    }

    /// How often `stop` released a running capture
    pub fn stop_calls(&self) -> usize {
        self.stop_calls
    }
}

impl AudioBackend for MockBackend {
    fn start(&mut self) -> Result<(), AudioError> {
        self.start_calls += 1;
        if self.deny_access {
            return Err(AudioError::StreamBuild(
                "permission denied for audio input".to_string(),
            ));
        }
        self.running = true;
        Ok(())
    }

    fn stop(&mut self) {
        if self.running {
            self.running = false;
            self.stop_calls += 1;
        }
    }

    fn is_running(&self) -> bool {
        self.running
    }

    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn latest_frame(&mut self) -> Option<Vec<f32>> {
        if !self.running {
            return None;
        }
        if let Some(frame) = self.queue.pop_front() {
            self.last = Some(frame);
        }
        self.last.clone()
    }
}
