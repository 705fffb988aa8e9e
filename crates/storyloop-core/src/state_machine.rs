/// Phase of the refinement loop for one request.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum LoopState {
    /// Waiting on a generator call
    Drafting,
    /// Waiting on a critic call for the current draft
    Critiquing,
    /// Rejected with budget remaining; a refinement prompt comes next
    Refining,
    /// Terminal: the critic accepted a draft (or the fallback applied)
    Accepted,
    /// Terminal: unrecoverable error or round budget exhausted
    Failed,
}

/// Observation that drives a state transition.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RoundEvent {
    DraftProduced,
    VerdictAccepted,
    VerdictRejected { budget_remaining: bool },
    RefinementPrepared,
    FatalError,
}

impl LoopState {
    /// Pure transition function.
    ///
    /// Keeping this separate from the runner makes the round-budget and
    /// fallback policies testable without any backend.
    pub fn step(self, event: RoundEvent) -> LoopState {
        use LoopState::*;
        use RoundEvent::*;

        match (self, event) {
            (_, FatalError) => Failed,
            (Drafting, DraftProduced) => Critiquing,
            (Critiquing, VerdictAccepted) => Accepted,
            (Critiquing, VerdictRejected { budget_remaining: true }) => Refining,
            (Critiquing, VerdictRejected { budget_remaining: false }) => Failed,
            (Refining, RefinementPrepared) => Drafting,
            // Terminal states absorb; anything else is a driver bug.
            (state, _) => state,
        }
    }

    pub fn is_terminal(&self) -> bool {
        matches!(self, LoopState::Accepted | LoopState::Failed)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_happy_path_reaches_accepted() {
        let state = LoopState::Drafting
            .step(RoundEvent::DraftProduced)
            .step(RoundEvent::VerdictAccepted);
        assert_eq!(state, LoopState::Accepted);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_rejection_with_budget_cycles_back_to_drafting() {
        let state = LoopState::Drafting
            .step(RoundEvent::DraftProduced)
            .step(RoundEvent::VerdictRejected {
                budget_remaining: true,
            })
            .step(RoundEvent::RefinementPrepared);
        assert_eq!(state, LoopState::Drafting);
    }

    #[test]
    fn test_rejection_without_budget_terminates() {
        let state = LoopState::Critiquing.step(RoundEvent::VerdictRejected {
            budget_remaining: false,
        });
        assert_eq!(state, LoopState::Failed);
        assert!(state.is_terminal());
    }

    #[test]
    fn test_fatal_error_terminates_from_any_state() {
        for state in [
            LoopState::Drafting,
            LoopState::Critiquing,
            LoopState::Refining,
        ] {
            assert_eq!(state.step(RoundEvent::FatalError), LoopState::Failed);
        }
    }

    #[test]
    fn test_terminal_states_absorb_events() {
        assert_eq!(
            LoopState::Accepted.step(RoundEvent::DraftProduced),
            LoopState::Accepted
        );
    }
}
