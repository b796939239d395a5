//! Parametrized event effects over a set of named axes.

pub mod engine;
pub mod params;
