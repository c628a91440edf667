pub mod drone;

pub use drone::DroneSystem;
