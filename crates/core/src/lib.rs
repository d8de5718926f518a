pub mod detection;
pub mod events;
pub mod motion;
pub mod pipeline;
pub mod scoring;
pub mod shared;
pub mod video;
pub mod zones;
