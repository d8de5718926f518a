use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use crossbeam_channel::{Sender, TrySendError};

use crate::events::domain::incident::Incident;
use crate::events::domain::incident_publisher::IncidentPublisher;

/// Moves delivery off the capture loop onto a dedicated worker thread.
///
/// Incidents are queued in a bounded channel and delivered in order by the
/// wrapped publisher. When the queue is full the incident is dropped with a
/// warning instead of blocking the caller. Dropping the publisher drains the
/// queue and joins the worker.
pub struct QueuedIncidentPublisher {
    sender: Option<Sender<Incident>>,
    worker: Option<JoinHandle<()>>,
    dropped: Arc<AtomicUsize>,
}

impl QueuedIncidentPublisher {
    pub fn new(
        inner: Box<dyn IncidentPublisher>,
        capacity: usize,
    ) -> Result<Self, std::io::Error> {
        let (sender, receiver) = crossbeam_channel::bounded::<Incident>(capacity.max(1));
        let worker = std::thread::Builder::new()
            .name("incident-publisher".into())
            .spawn(move || {
                for incident in receiver {
                    inner.publish(incident);
                }
            })?;

        Ok(Self {
            sender: Some(sender),
            worker: Some(worker),
            dropped: Arc::new(AtomicUsize::new(0)),
        })
    }

    /// Incidents discarded because the queue was full.
    pub fn dropped(&self) -> usize {
        self.dropped.load(Ordering::Relaxed)
    }
}

impl IncidentPublisher for QueuedIncidentPublisher {
    fn publish(&self, incident: Incident) {
        let Some(sender) = self.sender.as_ref() else {
            return;
        };
        match sender.try_send(incident) {
            Ok(()) => {}
            Err(TrySendError::Full(incident)) => {
                self.dropped.fetch_add(1, Ordering::Relaxed);
                log::warn!("Publish queue full, dropping {} incident", incident.event());
            }
            Err(TrySendError::Disconnected(incident)) => {
                log::warn!(
                    "Publish worker stopped, dropping {} incident",
                    incident.event()
                );
            }
        }
    }
}

impl Drop for QueuedIncidentPublisher {
    fn drop(&mut self) {
        // closing the channel ends the worker loop once the queue is drained
        self.sender.take();
        if let Some(worker) = self.worker.take() {
            if worker.join().is_err() {
                log::error!("Publish worker panicked");
            }
        }
    }
}
