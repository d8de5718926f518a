use std::time::Duration;

use crate::shared::constants::{REOPEN_DELAY_MS, REOPEN_MAX_ATTEMPTS};
use crate::shared::frame::Frame;
use crate::video::domain::source_spec::SourceSpec;
use crate::video::domain::video_reader::VideoReader;

/// Bounded reconnect policy for stream sources.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct RetryPolicy {
    pub max_attempts: u32,
    pub delay: Duration,
}

impl Default for RetryPolicy {
    fn default() -> Self {
        Self {
            max_attempts: REOPEN_MAX_ATTEMPTS,
            delay: Duration::from_millis(REOPEN_DELAY_MS),
        }
    }
}

/// Outcome of one [`CaptureSource::read`].
#[derive(Debug)]
pub enum CaptureRead {
    Frame(Frame),
    EndOfStream,
}

/// Owns a [`VideoReader`] and hides reconnect handling from the frame loop.
///
/// A failed read on a stream source releases and re-opens the reader, up to
/// `max_attempts` consecutive times with a fixed delay in between. Any
/// successful read resets the counter. Exhausting the attempts, or any
/// failure on a non-stream source, is reported as end of stream.
pub struct CaptureSource {
    reader: Box<dyn VideoReader>,
    spec: SourceSpec,
    policy: RetryPolicy,
    reopen_attempts: u32,
    opened: bool,
}

impl CaptureSource {
    /// Opens `spec` on `reader`. An open failure is logged and surfaces on the
    /// first `read`, so stream sources get the same reconnect treatment.
    pub fn open(reader: Box<dyn VideoReader>, spec: SourceSpec, policy: RetryPolicy) -> Self {
        let mut source = Self {
            reader,
            spec,
            policy,
            reopen_attempts: 0,
            opened: false,
        };
        source.opened = source.try_open();
        source
    }

    pub fn spec(&self) -> &SourceSpec {
        &self.spec
    }

    /// Consecutive reopen attempts since the last successful read.
    pub fn reopen_attempts(&self) -> u32 {
        self.reopen_attempts
    }

    pub fn read(&mut self) -> CaptureRead {
        loop {
            if let Some(frame) = self.try_read() {
                self.reopen_attempts = 0;
                return CaptureRead::Frame(frame);
            }

            if !self.should_retry() {
                log::info!("Video ended or camera disconnected.");
                return CaptureRead::EndOfStream;
            }

            self.reopen_attempts += 1;
            log::warn!(
                "Read failed. Re-opening {} ({}/{})...",
                self.spec,
                self.reopen_attempts,
                self.policy.max_attempts
            );
            self.release();
            if !self.policy.delay.is_zero() {
                std::thread::sleep(self.policy.delay);
            }
            self.opened = self.try_open();
        }
    }

    pub fn release(&mut self) {
        if self.opened {
            self.reader.close();
            self.opened = false;
        }
    }

    fn should_retry(&self) -> bool {
        self.spec.is_stream() && self.reopen_attempts < self.policy.max_attempts
    }

    fn try_open(&mut self) -> bool {
        match self.reader.open(&self.spec) {
            Ok(metadata) => {
                log::info!(
                    "Opened {}: {}x{} @ {:.1} fps ({})",
                    self.spec,
                    metadata.width,
                    metadata.height,
                    metadata.fps,
                    metadata.codec
                );
                true
            }
            Err(e) => {
                log::error!("Failed to open {}: {e}", self.spec);
                false
            }
        }
    }

    fn try_read(&mut self) -> Option<Frame> {
        if !self.opened {
            return None;
        }
        match self.reader.read_frame() {
            Ok(frame) => frame,
            Err(e) => {
                log::debug!("Frame read error on {}: {e}", self.spec);
                None
            }
        }
    }
}

impl Drop for CaptureSource {
    fn drop(&mut self) {
        self.release();
    }
}
