pub mod lifecycle_guard;
pub mod mining_loop;
pub mod outcome_sink;
pub mod task_source_client;
pub mod transmission;

pub use lifecycle_guard::TracingLifecycleGuard;
pub use mining_loop::{MiningLoop, SchedulerSnapshot, SchedulerState};
pub use outcome_sink::spawn_outcome_sink;
pub use task_source_client::{parse_fetch_response, HttpTaskSource};
pub use transmission::{DryRunChannel, EndpointRegistry};
