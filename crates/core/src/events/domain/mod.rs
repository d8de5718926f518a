pub mod evidence_writer;
pub mod incident;
pub mod incident_publisher;
