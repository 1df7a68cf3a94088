pub mod app_config;
pub mod logging;
pub mod miner;
pub mod task_source;
pub mod transport;

pub use app_config::*;
pub use logging::*;
pub use miner::*;
pub use task_source::*;
pub use transport::*;
