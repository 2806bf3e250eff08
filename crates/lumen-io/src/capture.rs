//! Bridges the callback-driven [`AudioBackend`] input stream into the
//! blocking-read pacing model the engine's cooperative main loop expects
//! (§5, §6): one `read_frame` call per loop iteration, blocking until the
//! next buffer arrives from the audio thread.

use crossbeam_channel::{bounded, Receiver};

use crate::backend::{AudioBackend, BackendStreamConfig, StreamHandle};
use crate::Result;

/// Depth of the queue between the real-time input callback and the
/// blocking reader. Kept small: a full queue means the engine is falling
/// behind, and the right thing is to drop the oldest buffered frame, not
/// to block the audio thread waiting for room.
const QUEUE_DEPTH: usize = 4;

/// Monaural audio capture, paced by the underlying device's buffer clock.
pub struct AudioCapture {
    _stream: StreamHandle,
    frames: Receiver<Vec<f32>>,
}

impl AudioCapture {
    /// Open a single-channel input stream at `sample_rate`/`buffer_size` on
    /// `backend`, optionally pinned to `device_name`.
    pub fn open(
        backend: &dyn AudioBackend,
        sample_rate: u32,
        buffer_size: u32,
        device_name: Option<String>,
    ) -> Result<Self> {
        let (tx, rx) = bounded(QUEUE_DEPTH);
        let config = BackendStreamConfig { sample_rate, buffer_size, channels: 1, device_name };

        let stream = backend.build_input_stream(
            &config,
            Box::new(move |data: &[f32]| {
                let _ = tx.try_send(data.to_vec());
            }),
            Box::new(|err| tracing::warn!(error = %err, "audio input stream error")),
        )?;

        Ok(Self { _stream: stream, frames: rx })
    }

    /// Block until the next captured frame is available. This is the main
    /// loop's pacing source: the loop makes no progress faster than the
    /// audio device delivers buffers.
    pub fn read_frame(&self) -> Vec<f32> {
        self.frames.recv().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{ErrorCallback, InputCallback, OutputCallback};
    use crate::AudioDevice;

    struct FakeBackend;

    impl AudioBackend for FakeBackend {
        fn name(&self) -> &str {
            "fake"
        }

        fn list_devices(&self) -> Result<Vec<AudioDevice>> {
            Ok(vec![])
        }

        fn default_output_device(&self) -> Result<Option<AudioDevice>> {
            Ok(None)
        }

        fn default_input_device(&self) -> Result<Option<AudioDevice>> {
            Ok(None)
        }

        fn build_output_stream(
            &self,
            _config: &BackendStreamConfig,
            _callback: OutputCallback,
            _error_callback: ErrorCallback,
        ) -> Result<StreamHandle> {
            Ok(StreamHandle::new(()))
        }

        fn build_input_stream(
            &self,
            _config: &BackendStreamConfig,
            mut callback: InputCallback,
            _error_callback: ErrorCallback,
        ) -> Result<StreamHandle> {
            callback(&[0.1, 0.2, 0.3]);
            Ok(StreamHandle::new(()))
        }
    }

    #[test]
    fn read_frame_returns_the_callback_buffer() {
        let backend = FakeBackend;
        let capture = AudioCapture::open(&backend, 44100, 512, None).unwrap();
        assert_eq!(capture.read_frame(), vec![0.1, 0.2, 0.3]);
    }
}
