pub mod zone;
pub mod zone_activation;
