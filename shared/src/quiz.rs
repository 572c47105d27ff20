use std::collections::HashSet;

use rand::Rng;
use rand::seq::SliceRandom;

use crate::registry::UnitRegistry;

pub const PROMPT_MESSAGE: &str = "Please select:";
pub const COMPLETION_MESSAGE: &str = "Congratulations on completing the quiz";

/// One slot in the quiz sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct QuizEntry {
    pub unit: String,
}

impl QuizEntry {
    pub fn new(unit: impl Into<String>) -> Self {
        Self { unit: unit.into() }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QuizStatus {
    InProgress,
    Terminal,
}

/// Result of feeding a clicked unit into the quiz.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SelectionOutcome {
    /// Wrong unit, empty id, or the run is already over. Nothing changed.
    Ignored,
    /// Correct unit; the quiz moved on to the next target.
    Advanced,
    /// Correct unit and it was the last one.
    Finished,
}

/// Progress through one shuffled pass over every known unit.
#[derive(Debug, Clone, PartialEq)]
pub struct QuizState {
    sequence: Vec<QuizEntry>,
    current_index: usize,
    completed: Vec<String>,
    completed_lookup: HashSet<String>,
    terminal: bool,
    message: String,
    total_units: usize,
}

impl QuizState {
    /// Start a run with every registry unit in a uniformly random order.
    pub fn initialize<R: Rng + ?Sized>(registry: &UnitRegistry, rng: &mut R) -> Self {
        let mut order: Vec<String> = registry.ids().map(str::to_owned).collect();
        order.shuffle(rng);
        Self::from_order(order)
    }

    /// Start a run with a fixed order. Duplicate ids keep their first slot only.
    pub fn from_order<I, S>(order: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut seen = HashSet::new();
        let sequence: Vec<QuizEntry> = order
            .into_iter()
            .map(Into::into)
            .filter(|unit: &String| !unit.is_empty() && seen.insert(unit.clone()))
            .map(QuizEntry::new)
            .collect();
        let total_units = sequence.len();
        // Nothing to find: the run is already complete.
        let message = if total_units == 0 {
            COMPLETION_MESSAGE
        } else {
            PROMPT_MESSAGE
        };
        Self {
            terminal: sequence.is_empty(),
            sequence,
            current_index: 0,
            completed: Vec::new(),
            completed_lookup: HashSet::new(),
            message: message.to_owned(),
            total_units,
        }
    }

    /// Throw away the current run and shuffle a fresh one.
    pub fn restart<R: Rng + ?Sized>(&mut self, registry: &UnitRegistry, rng: &mut R) {
        *self = Self::initialize(registry, rng);
    }

    pub fn submit_selection(&mut self, candidate: &str) -> SelectionOutcome {
        if self.terminal || candidate.is_empty() {
            return SelectionOutcome::Ignored;
        }
        let Some(target) = self.sequence.get(self.current_index) else {
            return SelectionOutcome::Ignored;
        };
        if target.unit != candidate {
            return SelectionOutcome::Ignored;
        }

        if self.completed_lookup.insert(candidate.to_owned()) {
            self.completed.push(candidate.to_owned());
        }
        if self.completed.len() == self.total_units {
            self.message = COMPLETION_MESSAGE.to_owned();
        }

        // The slot is rewritten with an equal entry before advancing.
        self.sequence[self.current_index] = QuizEntry::new(candidate);
        self.current_index += 1;
        if self.current_index == self.sequence.len() {
            self.terminal = true;
            SelectionOutcome::Finished
        } else {
            SelectionOutcome::Advanced
        }
    }

    /// The unit the player is being asked to find, if the run is still going.
    pub fn current_target(&self) -> Option<&str> {
        if self.terminal {
            return None;
        }
        self.sequence
            .get(self.current_index)
            .map(|entry| entry.unit.as_str())
    }

    pub fn is_current_target(&self, unit: &str) -> bool {
        self.current_target() == Some(unit)
    }

    pub fn is_completed(&self, unit: &str) -> bool {
        self.completed_lookup.contains(unit)
    }

    pub fn status(&self) -> QuizStatus {
        if self.terminal {
            QuizStatus::Terminal
        } else {
            QuizStatus::InProgress
        }
    }

    pub fn is_terminal(&self) -> bool {
        self.terminal
    }

    pub fn sequence(&self) -> &[QuizEntry] {
        &self.sequence
    }

    pub fn current_index(&self) -> usize {
        self.current_index
    }

    /// Completed units in the order they were found.
    pub fn completed(&self) -> &[String] {
        &self.completed
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// `(found, total)` for the progress readout.
    pub fn progress(&self) -> (usize, usize) {
        (self.completed.len(), self.total_units)
    }
}

#[cfg(test)]
mod tests {
    use std::collections::{BTreeSet, HashMap};

    use rand::SeedableRng;
    use rand::rngs::StdRng;

    use super::*;

    fn registry(ids: &[&str]) -> UnitRegistry {
        UnitRegistry::from_ids(ids.iter().copied())
    }

    #[test]
    fn initialize_is_a_permutation_of_the_registry() {
        let reg = registry(&["Kent", "Devon", "Essex", "Dorset", "Cumbria", "Rutland"]);
        let expected: BTreeSet<&str> = reg.ids().collect();

        for seed in 0..64 {
            let mut rng = StdRng::seed_from_u64(seed);
            let quiz = QuizState::initialize(&reg, &mut rng);
            assert_eq!(quiz.sequence().len(), reg.len());
            let got: BTreeSet<&str> = quiz.sequence().iter().map(|e| e.unit.as_str()).collect();
            assert_eq!(got, expected);
            assert_eq!(quiz.current_index(), 0);
            assert!(quiz.completed().is_empty());
            assert!(!quiz.is_terminal());
            assert_eq!(quiz.message(), PROMPT_MESSAGE);
        }
    }

    #[test]
    fn shuffle_covers_every_permutation_roughly_evenly() {
        let reg = registry(&["A", "B", "C"]);
        let mut rng = StdRng::seed_from_u64(7);
        let mut counts: HashMap<Vec<String>, usize> = HashMap::new();
        for _ in 0..6000 {
            let quiz = QuizState::initialize(&reg, &mut rng);
            let order = quiz.sequence().iter().map(|e| e.unit.clone()).collect();
            *counts.entry(order).or_default() += 1;
        }

        assert_eq!(counts.len(), 6);
        for (order, count) in counts {
            assert!(
                (800..1200).contains(&count),
                "permutation {order:?} drawn {count} times"
            );
        }
    }

    #[test]
    fn three_unit_scenario() {
        let mut quiz = QuizState::from_order(["B", "A", "C"]);

        assert_eq!(quiz.submit_selection("A"), SelectionOutcome::Ignored);
        assert_eq!(quiz.current_index(), 0);
        assert!(quiz.completed().is_empty());

        assert_eq!(quiz.submit_selection("B"), SelectionOutcome::Advanced);
        assert_eq!(quiz.current_index(), 1);
        assert_eq!(quiz.completed(), ["B"]);

        assert_eq!(quiz.submit_selection("A"), SelectionOutcome::Advanced);
        assert_eq!(quiz.current_index(), 2);
        assert_eq!(quiz.completed(), ["B", "A"]);
        assert_eq!(quiz.message(), PROMPT_MESSAGE);

        assert_eq!(quiz.submit_selection("C"), SelectionOutcome::Finished);
        assert_eq!(quiz.current_index(), 3);
        assert!(quiz.is_terminal());
        assert_eq!(quiz.status(), QuizStatus::Terminal);
        assert_eq!(quiz.completed(), ["B", "A", "C"]);
        assert_eq!(quiz.message(), COMPLETION_MESSAGE);
        assert_eq!(quiz.current_target(), None);
    }

    #[test]
    fn wrong_selection_changes_nothing() {
        let mut quiz = QuizState::from_order(["Kent", "Devon"]);
        let before = quiz.clone();

        assert_eq!(quiz.submit_selection("Devon"), SelectionOutcome::Ignored);
        assert_eq!(quiz.submit_selection("Narnia"), SelectionOutcome::Ignored);
        assert_eq!(quiz.submit_selection(""), SelectionOutcome::Ignored);
        assert_eq!(quiz, before);
    }

    #[test]
    fn resubmitting_a_completed_unit_is_a_no_op() {
        let mut quiz = QuizState::from_order(["Kent", "Devon", "Essex"]);
        quiz.submit_selection("Kent");
        let after_first = quiz.clone();

        assert_eq!(quiz.submit_selection("Kent"), SelectionOutcome::Ignored);
        assert_eq!(quiz, after_first);
    }

    #[test]
    fn completed_count_tracks_current_index() {
        let reg = registry(&["Kent", "Devon", "Essex", "Dorset", "Cumbria"]);
        let mut rng = StdRng::seed_from_u64(42);
        let mut quiz = QuizState::initialize(&reg, &mut rng);

        while let Some(target) = quiz.current_target().map(str::to_owned) {
            quiz.submit_selection("not-a-county");
            assert_eq!(quiz.completed().len(), quiz.current_index());
            let index = quiz.current_index();
            quiz.submit_selection(&target);
            assert_eq!(quiz.current_index(), index + 1);
            assert_eq!(quiz.completed().len(), quiz.current_index());
            assert_eq!(quiz.is_terminal(), quiz.current_index() == quiz.sequence().len());
        }

        assert!(quiz.is_terminal());
        assert_eq!(quiz.progress(), (5, 5));
    }

    #[test]
    fn terminal_is_sticky_until_restart() {
        let reg = registry(&["Kent"]);
        let mut rng = StdRng::seed_from_u64(1);
        let mut quiz = QuizState::initialize(&reg, &mut rng);

        assert_eq!(quiz.submit_selection("Kent"), SelectionOutcome::Finished);
        for _ in 0..3 {
            assert_eq!(quiz.submit_selection("Kent"), SelectionOutcome::Ignored);
            assert!(quiz.is_terminal());
        }

        quiz.restart(&reg, &mut rng);
        assert!(!quiz.is_terminal());
        assert_eq!(quiz.current_index(), 0);
        assert!(quiz.completed().is_empty());
        assert_eq!(quiz.message(), PROMPT_MESSAGE);
    }

    #[test]
    fn restart_resamples_the_order() {
        let reg = registry(&["A", "B", "C", "D", "E", "F", "G", "H"]);
        let mut rng = StdRng::seed_from_u64(99);
        let mut quiz = QuizState::initialize(&reg, &mut rng);
        let first: Vec<QuizEntry> = quiz.sequence().to_vec();

        let mut saw_different = false;
        for _ in 0..10 {
            quiz.restart(&reg, &mut rng);
            assert_eq!(quiz.sequence().len(), first.len());
            saw_different |= quiz.sequence() != first.as_slice();
        }
        assert!(saw_different);
    }

    #[test]
    fn empty_registry_is_immediately_terminal() {
        let reg = UnitRegistry::default();
        let mut rng = StdRng::seed_from_u64(0);
        let mut quiz = QuizState::initialize(&reg, &mut rng);

        assert!(quiz.sequence().is_empty());
        assert!(quiz.is_terminal());
        assert_eq!(quiz.message(), COMPLETION_MESSAGE);
        assert_eq!(quiz.progress(), (0, 0));
        assert_eq!(quiz.current_target(), None);
        assert_eq!(quiz.submit_selection("Kent"), SelectionOutcome::Ignored);
        assert_eq!(quiz.current_index(), 0);
        assert_eq!(quiz.message(), COMPLETION_MESSAGE);
    }

    #[test]
    fn completion_slot_rewrite_keeps_sequence_equal() {
        let mut quiz = QuizState::from_order(["Kent", "Devon"]);
        let before = quiz.sequence().to_vec();
        quiz.submit_selection("Kent");
        assert_eq!(quiz.sequence(), before.as_slice());
    }

    #[test]
    fn target_and_completion_queries() {
        let mut quiz = QuizState::from_order(["Kent", "Devon"]);
        assert!(quiz.is_current_target("Kent"));
        assert!(!quiz.is_completed("Kent"));

        quiz.submit_selection("Kent");
        assert!(quiz.is_completed("Kent"));
        assert!(quiz.is_current_target("Devon"));
        assert_eq!(quiz.progress(), (1, 2));
    }
}
