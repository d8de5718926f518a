pub mod line_runner;
pub mod pipeline_logger;
pub mod run_summary;
pub mod zone_runner;

#[cfg(test)]
mod test_support;
