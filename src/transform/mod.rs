pub mod basic;
pub mod combine;
pub mod curve;
pub mod ramp;
