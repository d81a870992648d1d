/// Scheduler errors that prevent a cycle from starting.
#[derive(Debug, thiserror::Error)]
pub enum SchedulerError {
    #[error("a search cycle is already in flight")]
    CycleInProgress,

    #[error("cycle cancelled before it started")]
    Cancelled,
}
