//! Multiple-choice trivia backed by the coach, with an offline bank.

use rand::RngCore;
use tracing::{debug, instrument, warn};

use super::{GameView, InputMode, InputResult, Minigame, PlayerInput, ViewBody, roll};
use crate::coach::TriviaQuestion;
use crate::lifecycle::AttemptOutcome;

/// Ticks the verdict is displayed before the attempt ends.
const RESULT_TICKS: u64 = 15;

/// Offline question bank used until (and unless) a fetched question lands.
fn offline_bank() -> Vec<TriviaQuestion> {
    vec![
        TriviaQuestion::offline(
            "Which planet has the strongest surface gravity?",
            ["Mars", "Venus", "Jupiter", "Mercury"],
            2,
        ),
        TriviaQuestion::offline(
            "What does a parsec measure?",
            ["Time", "Distance", "Brightness", "Mass"],
            1,
        ),
        TriviaQuestion::offline(
            "Which element powers the Sun's core fusion?",
            ["Helium", "Carbon", "Hydrogen", "Oxygen"],
            2,
        ),
        TriviaQuestion::offline(
            "Roughly how long does sunlight take to reach Earth?",
            ["8 seconds", "8 minutes", "8 hours", "8 days"],
            1,
        ),
        TriviaQuestion::offline(
            "What is the densest known class of star?",
            ["White dwarf", "Red giant", "Neutron star", "Brown dwarf"],
            2,
        ),
    ]
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    Answering,
    Result { ticks_left: u64, outcome: AttemptOutcome },
}

/// One trivia question per attempt. The host may deliver a freshly fetched
/// question through [`PlayerInput::Oracle`]; until then an offline question
/// stands in, so the game works with no network at all.
#[derive(Debug)]
pub struct NebulaTrivia {
    level: u32,
    question: TriviaQuestion,
    fetched: bool,
    selected: Option<usize>,
    phase: Phase,
}

impl NebulaTrivia {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            question: TriviaQuestion::fallback(),
            fetched: false,
            selected: None,
            phase: Phase::Answering,
        }
    }
}

impl Minigame for NebulaTrivia {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        let bank = offline_bank();
        let pick = roll(rng, 0, bank.len() as i64 - 1) as usize;
        self.level = level;
        self.question = bank.into_iter().nth(pick).unwrap_or_else(TriviaQuestion::fallback);
        self.fetched = false;
        self.selected = None;
        self.phase = Phase::Answering;
    }

    fn briefing(&self) -> &'static str {
        "One question, four answers, one shot. Questions come from the coach when it is \
         reachable and from the onboard archive when it is not."
    }

    fn view(&self) -> GameView {
        let mut lines = vec![self.question.question.clone()];
        if let Phase::Result { outcome, .. } = &self.phase {
            lines.push(String::new());
            let correct = &self.question.options[self.question.correct_index];
            lines.push(if outcome.success {
                format!("Correct: {correct}")
            } else {
                format!("The answer was: {correct}")
            });
        }
        GameView {
            status: match self.phase {
                Phase::Answering => "Choose an answer".to_string(),
                Phase::Result { .. } => "Verdict".to_string(),
            },
            body: ViewBody::Lines(lines),
            choices: self.question.options.to_vec(),
            input: match self.phase {
                Phase::Answering => InputMode::Choices(4),
                Phase::Result { .. } => InputMode::Locked,
            },
        }
    }

    #[instrument(skip(self, _rng))]
    fn handle(&mut self, input: PlayerInput, _rng: &mut dyn RngCore) -> InputResult {
        match (&mut self.phase, input) {
            (Phase::Answering, PlayerInput::Oracle(question)) => {
                // A late or malformed fetch never displaces a question the
                // player is already working on.
                if !self.fetched && self.selected.is_none() {
                    if question.is_well_formed() {
                        debug!("Fetched question replaces offline question");
                        self.question = question;
                        self.fetched = true;
                    } else {
                        warn!("Discarding malformed fetched question");
                    }
                }
                InputResult::Continue
            }
            (Phase::Answering, PlayerInput::Choose(choice)) => {
                if choice > 3 {
                    return InputResult::Rejected("Pick one of the four answers".to_string());
                }
                self.selected = Some(choice);
                let outcome = if choice == self.question.correct_index {
                    AttemptOutcome::win(self.level * 200)
                } else {
                    AttemptOutcome::loss(0)
                };
                self.phase = Phase::Result {
                    ticks_left: RESULT_TICKS,
                    outcome,
                };
                InputResult::Continue
            }
            (Phase::Result { ticks_left, outcome }, PlayerInput::Tick) => {
                // Emit the outcome exactly once, when the countdown lands.
                if *ticks_left > 0 {
                    *ticks_left -= 1;
                    if *ticks_left == 0 {
                        return InputResult::Finished(*outcome);
                    }
                }
                InputResult::Continue
            }
            _ => InputResult::Continue,
        }
    }
}
