pub mod config;
pub mod logging;

// Pipeline: urls -> preprocess (protocol + planner) -> scheduler (transport + retry)
pub mod planner;
pub mod preprocess;
pub mod protocol;
pub mod retry;
pub mod scheduler;
pub mod startup;
pub mod task;
pub mod transport;
pub mod url_model;
