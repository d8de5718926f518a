pub mod capture_source;
pub mod image_writer;
pub mod source_spec;
pub mod video_reader;
