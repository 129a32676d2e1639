//! Route advertisement state machine.
//!
//! # States
//! - Withdrawn: route not advertised (initial, fail-safe)
//! - Announced: route advertised to peers
//!
//! # State Transitions
//! ```text
//! Withdrawn → Announced: consecutive successes >= success_threshold
//! Announced → Withdrawn: consecutive failures >= failure_threshold
//! ```
//!
//! # Design Decisions
//! - Hysteresis prevents flapping
//! - A result of one polarity zeroes the opposite counter
//! - Only real transitions are reported; steady state reports nothing

use std::fmt;

use serde::Serialize;

use crate::health::Thresholds;

/// Advertised state of a route.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum RouteState {
    #[default]
    Withdrawn,
    Announced,
}

impl RouteState {
    pub fn as_str(&self) -> &'static str {
        match self {
            RouteState::Withdrawn => "withdrawn",
            RouteState::Announced => "announced",
        }
    }
}

impl fmt::Display for RouteState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A state change the announcer must act on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Transition {
    Announce,
    Withdraw,
}

impl Transition {
    /// State after the transition.
    pub fn target(&self) -> RouteState {
        match self {
            Transition::Announce => RouteState::Announced,
            Transition::Withdraw => RouteState::Withdrawn,
        }
    }
}

/// Consecutive result counters.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DebounceCounters {
    pub consecutive_successes: u32,
    pub consecutive_failures: u32,
}

/// Per-route debounce state machine.
#[derive(Debug, Clone)]
pub struct DebounceStateMachine {
    state: RouteState,
    counters: DebounceCounters,
    success_threshold: u32,
    failure_threshold: u32,
}

impl DebounceStateMachine {
    pub fn new(thresholds: &Thresholds) -> Self {
        Self::with_thresholds(thresholds.success_threshold, thresholds.failure_threshold)
    }

    pub fn with_thresholds(success_threshold: u32, failure_threshold: u32) -> Self {
        Self {
            state: RouteState::Withdrawn,
            counters: DebounceCounters::default(),
            success_threshold,
            failure_threshold,
        }
    }

    /// Feed one probe outcome. Returns the transition, if any.
    pub fn observe(&mut self, success: bool) -> Option<Transition> {
        if success {
            self.counters.consecutive_failures = 0;
            self.counters.consecutive_successes = self.counters.consecutive_successes.saturating_add(1);

            if self.state == RouteState::Withdrawn
                && self.counters.consecutive_successes >= self.success_threshold
            {
                self.state = RouteState::Announced;
                return Some(Transition::Announce);
            }
        } else {
            self.counters.consecutive_successes = 0;
            self.counters.consecutive_failures = self.counters.consecutive_failures.saturating_add(1);

            if self.state == RouteState::Announced
                && self.counters.consecutive_failures >= self.failure_threshold
            {
                self.state = RouteState::Withdrawn;
                return Some(Transition::Withdraw);
            }
        }

        None
    }

    /// Withdraw unconditionally (shutdown drain).
    ///
    /// Returns `Some(Transition::Withdraw)` only if the route was announced.
    pub fn force_withdraw(&mut self) -> Option<Transition> {
        self.counters = DebounceCounters::default();
        match self.state {
            RouteState::Announced => {
                self.state = RouteState::Withdrawn;
                Some(Transition::Withdraw)
            }
            RouteState::Withdrawn => None,
        }
    }

    pub fn state(&self) -> RouteState {
        self.state
    }

    pub fn counters(&self) -> DebounceCounters {
        self.counters
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn run(machine: &mut DebounceStateMachine, results: &[bool]) -> Vec<Option<Transition>> {
        results.iter().map(|&r| machine.observe(r)).collect()
    }

    #[test]
    fn test_starts_withdrawn() {
        let machine = DebounceStateMachine::with_thresholds(3, 2);
        assert_eq!(machine.state(), RouteState::Withdrawn);
        assert_eq!(machine.counters(), DebounceCounters::default());
    }

    #[test]
    fn test_announces_after_success_run_following_failures() {
        let mut machine = DebounceStateMachine::with_thresholds(3, 2);
        let transitions = run(&mut machine, &[false, false, true, true, true]);

        assert_eq!(
            transitions,
            vec![None, None, None, None, Some(Transition::Announce)]
        );
        assert_eq!(machine.state(), RouteState::Announced);
    }

    #[test]
    fn test_announces_then_withdraws() {
        let mut machine = DebounceStateMachine::with_thresholds(3, 2);
        let transitions = run(&mut machine, &[true, true, true, false, false]);

        assert_eq!(
            transitions,
            vec![
                None,
                None,
                Some(Transition::Announce),
                None,
                Some(Transition::Withdraw)
            ]
        );
        assert_eq!(machine.state(), RouteState::Withdrawn);
    }

    #[test]
    fn test_single_failure_does_not_withdraw() {
        let mut machine = DebounceStateMachine::with_thresholds(1, 2);
        machine.observe(true);
        assert_eq!(machine.observe(false), None);
        assert_eq!(machine.observe(true), None);
        assert_eq!(machine.observe(false), None);
        assert_eq!(machine.state(), RouteState::Announced);
    }

    #[test]
    fn test_single_success_does_not_announce() {
        let mut machine = DebounceStateMachine::with_thresholds(2, 1);
        for _ in 0..5 {
            assert_eq!(machine.observe(true), None);
            assert_eq!(machine.observe(false), None);
        }
        assert_eq!(machine.state(), RouteState::Withdrawn);
    }

    #[test]
    fn test_opposite_counter_is_reset() {
        let mut machine = DebounceStateMachine::with_thresholds(5, 5);
        run(&mut machine, &[true, true, false]);
        assert_eq!(
            machine.counters(),
            DebounceCounters {
                consecutive_successes: 0,
                consecutive_failures: 1
            }
        );
        machine.observe(true);
        assert_eq!(
            machine.counters(),
            DebounceCounters {
                consecutive_successes: 1,
                consecutive_failures: 0
            }
        );
    }

    #[test]
    fn test_steady_state_emits_nothing() {
        let mut machine = DebounceStateMachine::with_thresholds(2, 2);
        run(&mut machine, &[true, true]);
        for _ in 0..10 {
            assert_eq!(machine.observe(true), None);
        }

        run(&mut machine, &[false, false]);
        for _ in 0..10 {
            assert_eq!(machine.observe(false), None);
        }
    }

    #[test]
    fn test_thresholds_are_independent() {
        // Fast withdraw, slow re-announce.
        let mut machine = DebounceStateMachine::with_thresholds(4, 1);
        run(&mut machine, &[true, true, true, true]);
        assert_eq!(machine.state(), RouteState::Announced);
        assert_eq!(machine.observe(false), Some(Transition::Withdraw));

        let transitions = run(&mut machine, &[true, true, true]);
        assert!(transitions.iter().all(Option::is_none));
        assert_eq!(machine.observe(true), Some(Transition::Announce));
    }

    #[test]
    fn test_matches_reference_model_on_pseudo_random_sequence() {
        // Compare against a direct reading of the run-length rule.
        let (success_threshold, failure_threshold) = (3u32, 2u32);
        let mut machine = DebounceStateMachine::with_thresholds(success_threshold, failure_threshold);
        let mut expected = RouteState::Withdrawn;
        let mut run_len = 0u32;
        let mut last: Option<bool> = None;
        let mut seed = 0x2545_f491_u32;

        for _ in 0..500 {
            seed ^= seed << 13;
            seed ^= seed >> 17;
            seed ^= seed << 5;
            let result = seed % 3 != 0;

            run_len = if last == Some(result) { run_len + 1 } else { 1 };
            last = Some(result);
            if result && run_len >= success_threshold {
                expected = RouteState::Announced;
            }
            if !result && run_len >= failure_threshold {
                expected = RouteState::Withdrawn;
            }

            let before = machine.state();
            let transition = machine.observe(result);
            assert_eq!(machine.state(), expected);
            assert_eq!(transition.is_some(), before != expected);
        }
    }

    #[test]
    fn test_force_withdraw_only_reports_when_announced() {
        let mut machine = DebounceStateMachine::with_thresholds(1, 1);
        assert_eq!(machine.force_withdraw(), None);

        machine.observe(true);
        assert_eq!(machine.force_withdraw(), Some(Transition::Withdraw));
        assert_eq!(machine.state(), RouteState::Withdrawn);
        assert_eq!(machine.force_withdraw(), None);
    }
}
