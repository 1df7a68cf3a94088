pub mod backoff;
pub mod components;
pub mod control;

pub use backoff::{BackoffPolicy, BackoffSettings};
pub use components::{
    parse_fetch_response, DryRunChannel, EndpointRegistry, HttpTaskSource, MiningLoop,
    SchedulerSnapshot, SchedulerState, TracingLifecycleGuard,
};
pub use control::{ControlAck, ControlBridge, ControlCommand, ControlHandle};
