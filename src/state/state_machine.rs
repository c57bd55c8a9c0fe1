/// High-level phases a game session moves through.
///
/// The flow is strictly linear: `Forming` deals the sampled questions, each
/// round opens as `Round(k)` and is settled in `Scoring(k)`, and after the
/// last round `Finalizing` covers the ranking broadcast and the score
/// reconciliation before the session is `Closed`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SessionPhase {
    /// Group drained from the queue; questions not yet dealt.
    Forming,
    /// Question `k` is open and answers are being collected.
    Round(usize),
    /// Answers for question `k` are being scored and results delivered.
    Scoring(usize),
    /// Final ranking is being broadcast and deltas folded into the store.
    Finalizing,
    /// Session is complete.
    Closed,
}

/// Tracks one game session's position in the fixed session flow.
#[derive(Debug, Clone)]
pub struct SessionStateMachine {
    phase: SessionPhase,
    total_rounds: usize,
}

impl SessionStateMachine {
    /// Create a machine for a session playing `total_rounds` questions.
    pub fn new(total_rounds: usize) -> Self {
        Self {
            phase: SessionPhase::Forming,
            total_rounds,
        }
    }

    /// Inspect the current phase.
    pub fn phase(&self) -> SessionPhase {
        self.phase.clone()
    }

    /// Step to the next phase, returning it.
    ///
    /// The walk is total: a machine that reached `Closed` stays there.
    pub fn advance(&mut self) -> SessionPhase {
        self.phase = match self.phase {
            SessionPhase::Forming if self.total_rounds == 0 => SessionPhase::Finalizing,
            SessionPhase::Forming => SessionPhase::Round(1),
            SessionPhase::Round(k) => SessionPhase::Scoring(k),
            SessionPhase::Scoring(k) if k < self.total_rounds => SessionPhase::Round(k + 1),
            SessionPhase::Scoring(_) => SessionPhase::Finalizing,
            SessionPhase::Finalizing => SessionPhase::Closed,
            SessionPhase::Closed => SessionPhase::Closed,
        };
        self.phase.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn walk(total_rounds: usize) -> Vec<SessionPhase> {
        let mut sm = SessionStateMachine::new(total_rounds);
        let mut phases = Vec::new();
        loop {
            let phase = sm.advance();
            let done = phase == SessionPhase::Closed;
            phases.push(phase);
            if done {
                return phases;
            }
        }
    }

    #[test]
    fn initial_phase_is_forming() {
        let sm = SessionStateMachine::new(3);
        assert_eq!(sm.phase(), SessionPhase::Forming);
    }

    #[test]
    fn visits_every_round_in_order() {
        assert_eq!(
            walk(2),
            vec![
                SessionPhase::Round(1),
                SessionPhase::Scoring(1),
                SessionPhase::Round(2),
                SessionPhase::Scoring(2),
                SessionPhase::Finalizing,
                SessionPhase::Closed,
            ]
        );
    }

    #[test]
    fn zero_round_session_skips_straight_to_finalizing() {
        assert_eq!(
            walk(0),
            vec![SessionPhase::Finalizing, SessionPhase::Closed]
        );
    }

    #[test]
    fn closed_machine_stays_closed() {
        let mut sm = SessionStateMachine::new(1);
        for _ in 0..4 {
            sm.advance();
        }
        assert_eq!(sm.phase(), SessionPhase::Closed);
        assert_eq!(sm.advance(), SessionPhase::Closed);
    }
}
