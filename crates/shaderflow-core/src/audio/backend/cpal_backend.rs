//! Microphone capture via CPAL

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use crossbeam_channel::{bounded, Receiver, Sender, TrySendError};
use std::collections::VecDeque;
use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use tracing::{debug, error, info, warn};

use super::AudioBackend;
use crate::error::AudioError;

/// Capacity of the callback -> analysis channel, in callback chunks
const CHANNEL_CAPACITY: usize = 64;

/// Input-device backend keeping a sliding window of the latest samples
pub struct CpalBackend {
    device: cpal::Device,
    device_name: String,
    config: cpal::StreamConfig,
    frame_size: usize,
    stream: Option<cpal::Stream>,
    sender: Sender<Vec<f32>>,
    receiver: Receiver<Vec<f32>>,
    window: VecDeque<f32>,
    dropped_chunks: Arc<AtomicU64>,
}

impl CpalBackend {
    /// Open `device_name`, or the default input device when `None`.
    ///
    /// Only f32 input is supported; the stream is down-mixed to mono.
    pub fn new(device_name: Option<String>, frame_size: usize) -> Result<Self, AudioError> {
        if frame_size == 0 {
            return Err(AudioError::InvalidFrameSize);
        }
        let host = cpal::default_host();

        let device = match device_name {
            Some(name) => host
                .input_devices()
                .map_err(|e| AudioError::Device(e.to_string()))?
                .find(|d| d.name().map(|n| n == name).unwrap_or(false))
                .ok_or(AudioError::DeviceNotFound(name))?,
            None => host.default_input_device().ok_or(AudioError::NoInputDevice)?,
        };
        let device_name = device.name().unwrap_or_else(|_| "Unknown".to_string());

        let supported = device
            .default_input_config()
            .map_err(|e| AudioError::Device(e.to_string()))?;
        if supported.sample_format() != cpal::SampleFormat::F32 {
            return Err(AudioError::UnsupportedFormat(format!(
                "{:?} on '{}'",
                supported.sample_format(),
                device_name
            )));
        }
        let config: cpal::StreamConfig = supported.into();

        info!(
            "Audio input: {} ({} ch @ {:?})",
            device_name, config.channels, config.sample_rate
        );

        let (sender, receiver) = bounded(CHANNEL_CAPACITY);

        Ok(Self {
            device,
            device_name,
            config,
            frame_size,
            stream: None,
            sender,
            receiver,
            window: VecDeque::with_capacity(frame_size * 2),
            dropped_chunks: Arc::new(AtomicU64::new(0)),
        })
    }

    /// Names of all available input devices
    pub fn list_devices() -> Result<Option<Vec<String>>, AudioError> {
        let host = cpal::default_host();
        let devices = host
            .input_devices()
            .map_err(|e| AudioError::Device(e.to_string()))?;
        let names: Vec<String> = devices.filter_map(|d| d.name().ok()).collect();
        if names.is_empty() {
            Ok(None)
        } else {
            Ok(Some(names))
        }
    }

    /// Name of the opened device
    pub fn device_name(&self) -> &str {
        &self.device_name
    }

    /// Callback chunks dropped because the analysis side fell behind
    pub fn dropped_chunks(&self) -> u64 {
        self.dropped_chunks.load(Ordering::Relaxed)
    }

    fn drain_channel(&mut self) {
        while let Ok(chunk) = self.receiver.try_recv() {
            self.window.extend(chunk);
        }
        let excess = self.window.len().saturating_sub(self.frame_size);
        self.window.drain(..excess);
    }
}

impl AudioBackend for CpalBackend {
    fn start(&mut self) -> Result<(), AudioError> {
        if self.stream.is_some() {
            return Ok(());
        }

        let channels = usize::from(self.config.channels.max(1));
        let sender = self.sender.clone();
        let dropped = Arc::clone(&self.dropped_chunks);

        let stream = self
            .device
            .build_input_stream(
                &self.config,
                move |data: &[f32], _: &cpal::InputCallbackInfo| {
                    let mono: Vec<f32> = data
                        .chunks(channels)
                        .map(|frame| frame.iter().sum::<f32>() / frame.len() as f32)
                        .collect();
                    if let Err(TrySendError::Full(_)) = sender.try_send(mono) {
                        dropped.fetch_add(1, Ordering::Relaxed);
                    }
                },
                |err| error!("Audio stream error: {}", err),
                None,
            )
            .map_err(|e| AudioError::StreamBuild(e.to_string()))?;

        stream
            .play()
            .map_err(|e| AudioError::StreamPlay(e.to_string()))?;

        self.stream = Some(stream);
        debug!("Audio capture started on '{}'", self.device_name);
        Ok(())
    }

    fn stop(&mut self) {
        if let Some(stream) = self.stream.take() {
            if let Err(e) = stream.pause() {
                warn!("Failed to pause audio stream: {}", e);
            }
            drop(stream);
            self.window.clear();
            while self.receiver.try_recv().is_ok() {}
            debug!(
                "Audio capture stopped on '{}' ({} chunks dropped)",
                self.device_name,
                self.dropped_chunks()
            );
        }
    }

    fn is_running(&self) -> bool {
        self.stream.is_some()
    }

    fn frame_size(&self) -> usize {
        self.frame_size
    }

    fn latest_frame(&mut self) -> Option<Vec<f32>> {
        if self.stream.is_none() {
            return None;
        }
        self.drain_channel();
        if self.window.len() < self.frame_size {
            return None;
        }
        Some(self.window.iter().copied().collect())
    }
}

impl Drop for CpalBackend {
    fn drop(&mut self) {
        self.stop();
    }
}
