use std::sync::atomic::{AtomicBool, Ordering};
use std::time::Instant;

use crate::detection::domain::face_capture::FaceCapture;
use crate::events::domain::incident::{EventKind, Incident};
use crate::events::domain::incident_publisher::IncidentPublisher;
use crate::scoring::domain::interaction_scorer::InteractionScorer;
use crate::shared::clock::Clock;
use crate::shared::frame::Frame;
use crate::video::domain::capture_source::{CaptureRead, CaptureSource};
use crate::zones::domain::zone::ZoneDefinition;
use crate::zones::domain::zone_activation::{ZoneActivationTracker, ZoneTransition};

use super::pipeline_logger::PipelineLogger;
use super::run_summary::{elapsed_ms, emit, RunSummary};

/// Frame loop for the zone-interaction scenario.
///
/// Every zone's ROI is scored each frame and fed to the activation tracker.
/// An `interaction_start` triggers one face-capture pass over the full
/// frame; each stored crop becomes a `face_capture` incident.
pub struct ZoneRunner {
    source: CaptureSource,
    zones: Vec<ZoneDefinition>,
    scorer: Box<dyn InteractionScorer>,
    tracker: ZoneActivationTracker,
    face_capture: Box<dyn FaceCapture>,
    publisher: Box<dyn IncidentPublisher>,
    clock: Box<dyn Clock>,
    logger: Box<dyn PipelineLogger>,
}

impl ZoneRunner {
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        source: CaptureSource,
        zones: Vec<ZoneDefinition>,
        scorer: Box<dyn InteractionScorer>,
        mut tracker: ZoneActivationTracker,
        face_capture: Box<dyn FaceCapture>,
        publisher: Box<dyn IncidentPublisher>,
        clock: Box<dyn Clock>,
        logger: Box<dyn PipelineLogger>,
    ) -> Self {
        let now = clock.now();
        for zone in &zones {
            tracker.add_zone(zone.name(), now);
        }
        Self {
            source,
            zones,
            scorer,
            tracker,
            face_capture,
            publisher,
            clock,
            logger,
        }
    }

    pub fn tracker(&self) -> &ZoneActivationTracker {
        &self.tracker
    }

    /// Runs until the source ends or `cancelled` is set, then releases the
    /// source. The flag is checked between frames.
    pub fn run(&mut self, cancelled: &AtomicBool) -> RunSummary {
        let names: Vec<&str> = self.zones.iter().map(|z| z.name()).collect();
        self.logger.info(&format!(
            "Starting zone runner: source={} zones={names:?}",
            self.source.spec()
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
        self.logger.info("Finished zone run.");
        self.logger.summary();
        summary
    }

    fn process_frame(&mut self, frame: &Frame, summary: &mut RunSummary) {
        let now = self.clock.now();

        for zone in &self.zones {
            let start = Instant::now();
            let score = self.scorer.predict(&zone.extract_roi(frame));
            self.logger.timing("score", elapsed_ms(start));

            match self.tracker.update(zone.name(), score, now) {
                Some(ZoneTransition::Started) => {
                    emit(
                        self.publisher.as_ref(),
                        self.logger.as_mut(),
                        summary,
                        Incident::new(now, EventKind::InteractionStart)
                            .with_zone(zone.name())
                            .with_metadata("score", score),
                    );

                    let start = Instant::now();
                    let crops = self.face_capture.capture(frame, zone.name());
                    self.logger.timing("faces", elapsed_ms(start));

                    for path in crops {
                        emit(
                            self.publisher.as_ref(),
                            self.logger.as_mut(),
                            summary,
                            Incident::new(now, EventKind::FaceCapture)
                                .with_zone(zone.name())
                                .with_metadata("path", path.display().to_string()),
                        );
                    }
                }
                Some(ZoneTransition::Ended) => emit(
                    self.publisher.as_ref(),
                    self.logger.as_mut(),
                    summary,
                    Incident::new(now, EventKind::InteractionEnd)
                        .with_zone(zone.name())
                        .with_metadata("score", score),
                ),
                None => {}
            }
        }
    }
}
