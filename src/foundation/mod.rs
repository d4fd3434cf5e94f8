pub mod telemetry;
pub mod utils;
