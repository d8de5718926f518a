//! Scripted collaborators shared by the runner tests.

use std::collections::VecDeque;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex};

use crate::events::domain::evidence_writer::EvidenceWriter;
use crate::events::domain::incident::Incident;
use crate::events::domain::incident_publisher::IncidentPublisher;
use crate::shared::clock::ManualClock;
use crate::shared::frame::Frame;
use crate::shared::video_metadata::VideoMetadata;
use crate::video::domain::capture_source::{CaptureSource, RetryPolicy};
use crate::video::domain::source_spec::SourceSpec;
use crate::video::domain::video_reader::VideoReader;

/// Replays frames from memory. Before handing out frame `i` it sets the
/// shared clock to `i` seconds, and it can raise a cancel flag once a given
/// frame has been read.
pub struct ScriptedReader {
    frames: VecDeque<Frame>,
    clock: ManualClock,
    cancel_after: Option<(usize, Arc<AtomicBool>)>,
    pub closes: Arc<Mutex<usize>>,
}

impl ScriptedReader {
    pub fn new(frames: Vec<Frame>, clock: ManualClock) -> Self {
        Self {
            frames: frames.into(),
            clock,
            cancel_after: None,
            closes: Arc::new(Mutex::new(0)),
        }
    }

    pub fn cancel_after(mut self, index: usize, flag: Arc<AtomicBool>) -> Self {
        self.cancel_after = Some((index, flag));
        self
    }

    pub fn into_source(self) -> CaptureSource {
        CaptureSource::open(
            Box::new(self),
            SourceSpec::Path("scripted.mp4".into()),
            RetryPolicy::default(),
        )
    }
}

impl VideoReader for ScriptedReader {
    fn open(&mut self, source: &SourceSpec) -> Result<VideoMetadata, Box<dyn std::error::Error>> {
        Ok(VideoMetadata {
            width: 64,
            height: 48,
            fps: 25.0,
            codec: "rawvideo".into(),
            source: source.to_string(),
        })
    }

    fn read_frame(&mut self) -> Result<Option<Frame>, Box<dyn std::error::Error>> {
        let Some(frame) = self.frames.pop_front() else {
            return Ok(None);
        };
        self.clock.set(frame.index() as f64);
        if let Some((index, flag)) = &self.cancel_after {
            if frame.index() == *index {
                flag.store(true, Ordering::Relaxed);
            }
        }
        Ok(Some(frame))
    }

    fn close(&mut self) {
        *self.closes.lock().unwrap() += 1;
    }
}

#[derive(Clone, Default)]
pub struct RecordingPublisher {
    pub incidents: Arc<Mutex<Vec<Incident>>>,
}

impl RecordingPublisher {
    pub fn events(&self) -> Vec<String> {
        self.incidents
            .lock()
            .unwrap()
            .iter()
            .map(|i| i.event().to_string())
            .collect()
    }
}

impl IncidentPublisher for RecordingPublisher {
    fn publish(&self, incident: Incident) {
        self.incidents.lock().unwrap().push(incident);
    }
}

#[derive(Clone, Default)]
pub struct RecordingEvidence {
    pub timestamps: Arc<Mutex<Vec<f64>>>,
}

impl EvidenceWriter for RecordingEvidence {
    fn persist(&self, timestamp: f64, _frame: &Frame) -> PathBuf {
        self.timestamps.lock().unwrap().push(timestamp);
        PathBuf::from(format!("event_{}.jpg", (timestamp * 1000.0) as i64))
    }
}
