pub mod classifier;
pub mod classify;
pub mod commons;
pub mod geo_core;
pub mod geometric;
pub mod render;
pub mod tabular;
