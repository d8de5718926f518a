pub mod line_crossing;
pub mod motion_detector;
pub mod presence_tracker;
