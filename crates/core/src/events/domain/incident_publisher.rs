use crate::events::domain::incident::Incident;

/// Delivers incidents downstream on a best-effort basis.
///
/// Takes ownership of each incident. Delivery failures are logged by the
/// implementation and never surface to the caller.
pub trait IncidentPublisher: Send {
    fn publish(&self, incident: Incident);
}
