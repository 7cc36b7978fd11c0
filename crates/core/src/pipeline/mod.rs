pub mod advance_signal;
pub mod infrastructure;
pub mod navigate_unit;
pub mod navigation_logger;
pub mod navigator;
pub mod partial_debouncer;
pub mod streaming_config;
