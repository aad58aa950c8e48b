pub mod config;
pub mod logging;
pub mod services;

pub use config::{load_config, log_startup_summary};
pub use logging::init_logging;
pub use services::build_handler;
