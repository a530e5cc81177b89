pub mod chart_service;
pub mod metrics_engine;
pub mod portfolio_store;
pub mod quote_service;
