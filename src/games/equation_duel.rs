//! Compare two arithmetic expressions at a glance.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{GameView, InputResult, Minigame, PlayerInput, roll};
use crate::lifecycle::AttemptOutcome;

/// One side of the duel.
#[derive(Debug, Clone)]
struct Expr {
    text: String,
    value: i64,
}

/// Decide whether the left expression is greater than, equal to, or less
/// than the right one. A single judgment, win or lose.
#[derive(Debug)]
pub struct EquationDuel {
    level: u32,
    left: Expr,
    right: Expr,
}

impl EquationDuel {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            left: Expr {
                text: String::new(),
                value: 0,
            },
            right: Expr {
                text: String::new(),
                value: 0,
            },
        }
    }

    fn gen_expr(level: u32, rng: &mut dyn RngCore) -> Expr {
        let hi = 8 + 3 * level as i64;
        let a = roll(rng, 2, hi);
        let b = roll(rng, 2, hi);
        match roll(rng, 0, 2) {
            0 => Expr {
                text: format!("{a} + {b}"),
                value: a + b,
            },
            1 => {
                let (a, b) = (a.max(b), a.min(b));
                Expr {
                    text: format!("{a} - {b}"),
                    value: a - b,
                }
            }
            _ => {
                let b = roll(rng, 2, 4 + (level as i64 / 3));
                Expr {
                    text: format!("{a} x {b}"),
                    value: a * b,
                }
            }
        }
    }

    fn correct_index(&self) -> usize {
        match self.left.value.cmp(&self.right.value) {
            std::cmp::Ordering::Greater => 0,
            std::cmp::Ordering::Equal => 1,
            std::cmp::Ordering::Less => 2,
        }
    }
}

impl Minigame for EquationDuel {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        self.level = level;
        self.left = Self::gen_expr(level, rng);
        // Roughly a third of instances mirror the left side with reordered
        // terms, forcing an actual evaluation rather than a shape guess.
        self.right = if roll(rng, 0, 9) < 3 {
            let a = roll(rng, 2, 8 + 3 * level as i64);
            let b = self.left.value - a;
            if b >= 0 {
                Expr {
                    text: format!("{a} + {b}"),
                    value: a + b,
                }
            } else {
                Self::gen_expr(level, rng)
            }
        } else {
            Self::gen_expr(level, rng)
        };
        debug!(left = %self.left.text, right = %self.right.text, "Generated duel");
    }

    fn briefing(&self) -> &'static str {
        "Two expressions enter. Decide whether the left side is greater, equal, or less than the \
         right. You get exactly one judgment."
    }

    fn view(&self) -> GameView {
        GameView::with_choices(
            "Compare the sides".to_string(),
            vec![format!("  {}    ?    {}", self.left.text, self.right.text)],
            vec![
                "Left is greater (>)".to_string(),
                "They are equal (=)".to_string(),
                "Right is greater (<)".to_string(),
            ],
        )
    }

    fn solution(&self) -> Option<String> {
        let symbol = [">", "=", "<"][self.correct_index()];
        Some(format!(
            "{} evaluates to {} and {} to {}, so the answer is {symbol}.",
            self.left.text, self.left.value, self.right.text, self.right.value
        ))
    }

    #[instrument(skip(self, _rng))]
    fn handle(&mut self, input: PlayerInput, _rng: &mut dyn RngCore) -> InputResult {
        let PlayerInput::Choose(choice) = input else {
            return InputResult::Continue;
        };
        if choice > 2 {
            return InputResult::Rejected("Pick >, = or <".to_string());
        }
        if choice == self.correct_index() {
            InputResult::Finished(AttemptOutcome::win(self.level * 250))
        } else {
            InputResult::Finished(AttemptOutcome::loss(0))
        }
    }
}
