pub mod chart;
pub mod holding;
pub mod metrics;
pub mod price;
pub mod settings;
