//! Lifecycle states of a merge job as seen from the submitting side.

/// Job lifecycle: `Idle → Submitting → Running → {Done, Error} → Idle`.
///
/// Only acceptance of the submission request leads from `Submitting` to
/// `Running`; every other path returns directly to `Idle`. `Done` and
/// `Error` are terminal for the job but collapse back to `Idle` once their
/// one-time side effects (surfacing the result or the error) have been
/// performed, so the UI is always resubmittable afterwards.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum JobState {
    #[default]
    Idle,
    /// The submission request is in flight.
    Submitting,
    /// The job was accepted and progress events are expected.
    Running,
    Done,
    Error,
}

impl JobState {
    /// A new submission may only start from `Idle`.
    pub fn can_submit(self) -> bool {
        matches!(self, JobState::Idle)
    }

    pub fn is_terminal(self) -> bool {
        matches!(self, JobState::Done | JobState::Error)
    }

    /// The job occupies the single submission slot in this state.
    pub fn is_active(self) -> bool {
        matches!(self, JobState::Submitting | JobState::Running)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn only_idle_can_submit() {
        assert!(JobState::Idle.can_submit());
        assert!(!JobState::Submitting.can_submit());
        assert!(!JobState::Running.can_submit());
        assert!(!JobState::Done.can_submit());
        assert!(!JobState::Error.can_submit());
    }

    #[test]
    fn terminal_and_active_are_disjoint() {
        for state in [
            JobState::Idle,
            JobState::Submitting,
            JobState::Running,
            JobState::Done,
            JobState::Error,
        ] {
            assert!(!(state.is_terminal() && state.is_active()));
        }
    }
}
