pub mod catalog;
pub mod config;
pub mod error;
pub mod evaluation;
pub mod facility;
pub mod geography;
pub mod reporting;
pub mod storage;
pub mod telemetry;

#[cfg(test)]
pub(crate) mod testing;
