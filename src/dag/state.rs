/// Outcome of one task attempt, named the way the scheduler reports it.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TaskState {
    Success,
    UpForRetry,
    Failed,
}

impl TaskState {
    pub fn as_str(&self) -> &str {
        match self {
            TaskState::Success => "success",
            TaskState::UpForRetry => "up_for_retry",
            TaskState::Failed => "failed",
        }
    }

    /// The state after attempt number `attempt` (1-based) of `attempts` failed.
    pub fn after_failure(attempt: u32, attempts: u32) -> Self {
        if attempt < attempts {
            TaskState::UpForRetry
        } else {
            TaskState::Failed
        }
    }
}
