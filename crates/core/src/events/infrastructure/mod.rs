pub mod http_incident_publisher;
pub mod jsonl_incident_sink;
pub mod queued_incident_publisher;
pub mod thumbnail_writer;
