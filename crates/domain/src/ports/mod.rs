pub mod lifecycle;
pub mod task_source;
pub mod transmission;

pub use lifecycle::LifecycleGuard;
pub use task_source::TaskSource;
pub use transmission::TransmissionChannel;
