use std::time::Instant;

use crate::events::domain::incident::Incident;
use crate::events::domain::incident_publisher::IncidentPublisher;

use super::pipeline_logger::PipelineLogger;

/// Totals returned by a runner once its loop has stopped.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RunSummary {
    pub frames: usize,
    pub incidents: usize,
}

/// Hands `incident` to the publisher, counting it in both `summary` and the
/// logger.
pub(crate) fn emit(
    publisher: &dyn IncidentPublisher,
    logger: &mut dyn PipelineLogger,
    summary: &mut RunSummary,
    incident: Incident,
) {
    summary.incidents += 1;
    logger.count(incident.event().as_str());
    let start = Instant::now();
    publisher.publish(incident);
    logger.timing("publish", elapsed_ms(start));
}

pub(crate) fn elapsed_ms(start: Instant) -> f64 {
    start.elapsed().as_secs_f64() * 1000.0
}
