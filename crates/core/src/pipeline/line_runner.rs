use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::events::domain::evidence_writer::EvidenceWriter;
use crate::events::domain::incident::{EventKind, Incident};
use crate::events::domain::incident_publisher::IncidentPublisher;
use crate::motion::domain::line_crossing::LineCrossingDetector;
use crate::motion::domain::motion_detector::MotionDetector;
use crate::motion::domain::presence_tracker::{PresenceTracker, PresenceTransition};
use crate::shared::clock::Clock;
use crate::shared::frame::Frame;
use crate::video::domain::capture_source::{CaptureRead, CaptureSource};

use super::pipeline_logger::PipelineLogger;
use super::run_summary::{elapsed_ms, emit, RunSummary};

/// Frame loop for the line-crossing scenario.
///
/// Each frame goes through background subtraction, then line-crossing
/// analysis (one `cross_line` incident plus a stored thumbnail per blob on
/// the line), then the presence state machine (`motion_start` /
/// `motion_end`). The clock is read once per frame and that timestamp is
/// shared by every incident the frame produces.
pub struct LineRunner {
    source: CaptureSource,
    detector: Box<dyn MotionDetector>,
    crossing: LineCrossingDetector,
    presence: PresenceTracker,
    publisher: Box<dyn IncidentPublisher>,
    evidence: Box<dyn EvidenceWriter>,
    clock: Box<dyn Clock>,
    logger: Box<dyn PipelineLogger>,
}

impl LineRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: CaptureSource,
        detector: Box<dyn MotionDetector>,
        crossing: LineCrossingDetector,
        no_motion_seconds: f64,
        publisher: Box<dyn IncidentPublisher>,
        evidence: Box<dyn EvidenceWriter>,
        clock: Box<dyn Clock>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        let presence = PresenceTracker::new(no_motion_seconds, clock.now());
        Self {
            source,
            detector,
            crossing,
            presence,
            publisher,
            evidence,
            clock,
            logger,
        }
    }

    pub fn presence(&self) -> &PresenceTracker {
        &self.presence
    }

    /// Runs until the source ends or `cancelled` is set, then releases the
    /// source. The flag is checked between frames.
    pub fn run(&mut self, cancelled: &AtomicBool) -> RunSummary {
        self.logger.info(&format!(
            "Starting line runner: source={} line_y={}",
            self.source.spec(),
            self.crossing.line_y()
        ));

        let mut summary = RunSummary::default();
        loop {
            if cancelled.load(Ordering::Relaxed) {
                self.logger.info("Stop requested.");
                break;
            }

            let start = Instant::now();
            let frame = match self.source.read() {
                CaptureRead::Frame(frame) => frame,
                CaptureRead::EndOfStream => break,
            };
            self.logger.timing("read", elapsed_ms(start));

            summary.frames += 1;
            self.process_frame(&frame, &mut summary);
            self.logger.progress(summary.frames);
        }

        self.source.release();
        self.logger.info("Finished line run.");
        self.logger.summary();
        summary
    }

    fn process_frame(&mut self, frame: &Frame, summary: &mut RunSummary) {
        let now = self.clock.now();

        let start = Instant::now();
        let regions = self.detector.detect(frame);
        self.logger.timing("motion", elapsed_ms(start));

        let analysis = self.crossing.analyze(&regions, now);
        for &cy in &analysis.crossings {
            emit(
                self.publisher.as_ref(),
                self.logger.as_mut(),
                summary,
                Incident::new(now, EventKind::CrossLine).with_y(cy),
            );
            let start = Instant::now();
            self.evidence.persist(now, frame);
            self.logger.timing("thumbnail", elapsed_ms(start));
        }

        let kind = match self.presence.update(analysis.motion_detected, now) {
            Some(PresenceTransition::Started) => EventKind::MotionStart,
            Some(PresenceTransition::Ended) => EventKind::MotionEnd,
            None => return,
        };
        emit(
            self.publisher.as_ref(),
            self.logger.as_mut(),
            summary,
            Incident::new(now, kind),
        );
    }
}
