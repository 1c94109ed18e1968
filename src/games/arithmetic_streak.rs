//! Rapid-fire mental arithmetic with an all-or-nothing streak.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{GameView, InputResult, Minigame, PlayerInput, roll};
use crate::lifecycle::AttemptOutcome;

/// Consecutive correct answers needed to clear a level.
const REQUIRED_STREAK: u32 = 5;

/// One generated question with its answer.
#[derive(Debug, Clone)]
struct Question {
    prompt: String,
    answer: i64,
}

/// Answer a run of arithmetic questions without a single miss.
#[derive(Debug)]
pub struct ArithmeticStreak {
    level: u32,
    streak: u32,
    question: Question,
}

impl ArithmeticStreak {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            streak: 0,
            question: Question {
                prompt: String::new(),
                answer: 0,
            },
        }
    }

    /// Generates one question scaled to the level. Early levels are sums
    /// and differences, later levels mix in products and three terms.
    fn generate(level: u32, rng: &mut dyn RngCore) -> Question {
        let hi = 10 + 5 * level as i64;
        if level <= 3 {
            let a = roll(rng, 2, hi);
            let b = roll(rng, 2, hi);
            if roll(rng, 0, 1) == 0 {
                Question {
                    prompt: format!("{a} + {b}"),
                    answer: a + b,
                }
            } else {
                let (a, b) = (a.max(b), a.min(b));
                Question {
                    prompt: format!("{a} - {b}"),
                    answer: a - b,
                }
            }
        } else if level <= 8 {
            let a = roll(rng, 2, 5 + level as i64);
            let b = roll(rng, 2, 9);
            let c = roll(rng, 1, hi);
            Question {
                prompt: format!("{a} x {b} + {c}"),
                answer: a * b + c,
            }
        } else {
            let a = roll(rng, 3, 8 + level as i64);
            let b = roll(rng, 3, 12);
            let c = roll(rng, 2, 9);
            let d = roll(rng, 1, hi);
            Question {
                prompt: format!("{a} x {b} - {c} x {d}"),
                answer: a * b - c * d,
            }
        }
    }
}

impl Minigame for ArithmeticStreak {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        self.level = level;
        self.streak = 0;
        self.question = Self::generate(level, rng);
        debug!(prompt = %self.question.prompt, "Generated opening question");
    }

    fn briefing(&self) -> &'static str {
        "Answer five arithmetic questions in a row. One wrong answer ends the run, but a partial \
         streak still earns consolation points."
    }

    fn view(&self) -> GameView {
        GameView::text_entry(
            format!("Streak {}/{REQUIRED_STREAK}", self.streak),
            vec![format!("{} = ?", self.question.prompt)],
        )
    }

    fn solution(&self) -> Option<String> {
        Some(format!(
            "{} = {}. Work left to right, resolving products before sums.",
            self.question.prompt, self.question.answer
        ))
    }

    #[instrument(skip(self, rng))]
    fn handle(&mut self, input: PlayerInput, rng: &mut dyn RngCore) -> InputResult {
        let PlayerInput::Submit(text) = input else {
            return InputResult::Continue;
        };
        let Ok(guess) = text.trim().parse::<i64>() else {
            return InputResult::Rejected("Enter a whole number".to_string());
        };
        if guess != self.question.answer {
            debug!(guess, answer = self.question.answer, "Streak broken");
            return InputResult::Finished(AttemptOutcome::loss(self.streak * 10));
        }
        self.streak += 1;
        if self.streak >= REQUIRED_STREAK {
            InputResult::Finished(AttemptOutcome::win(self.level * 300))
        } else {
            self.question = Self::generate(self.level, rng);
            InputResult::Continue
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn full_streak_wins() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = ArithmeticStreak::new();
        game.reset(2, &mut rng);
        for i in 0..REQUIRED_STREAK {
            let answer = game.question.answer.to_string();
            let result = game.handle(PlayerInput::Submit(answer), &mut rng);
            if i + 1 == REQUIRED_STREAK {
                assert_eq!(result, InputResult::Finished(AttemptOutcome::win(600)));
            } else {
                assert_eq!(result, InputResult::Continue);
            }
        }
    }

    #[test]
    fn wrong_answer_loses_with_partial_credit() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = ArithmeticStreak::new();
        game.reset(1, &mut rng);
        let answer = game.question.answer.to_string();
        game.handle(PlayerInput::Submit(answer), &mut rng);
        let wrong = (game.question.answer + 1).to_string();
        assert_eq!(
            game.handle(PlayerInput::Submit(wrong), &mut rng),
            InputResult::Finished(AttemptOutcome::loss(10))
        );
    }

    #[test]
    fn garbage_input_is_rejected_inline() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut game = ArithmeticStreak::new();
        game.reset(1, &mut rng);
        assert!(matches!(
            game.handle(PlayerInput::Submit("banana".to_string()), &mut rng),
            InputResult::Rejected(_)
        ));
        assert_eq!(game.streak, 0);
    }
}
