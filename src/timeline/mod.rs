pub mod funscript;
pub mod model;
