//! Isolate the unknown in a linear equation, one shot.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{GameView, InputResult, Minigame, PlayerInput, roll};
use crate::lifecycle::AttemptOutcome;

/// Solve `a*x + b = c` for integer `x`. One submission decides the attempt.
#[derive(Debug)]
pub struct FormulaShot {
    level: u32,
    a: i64,
    b: i64,
    c: i64,
    x: i64,
}

impl FormulaShot {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            a: 1,
            b: 0,
            c: 0,
            x: 0,
        }
    }

    fn equation(&self) -> String {
        let b_part = match self.b.cmp(&0) {
            std::cmp::Ordering::Greater => format!(" + {}", self.b),
            std::cmp::Ordering::Less => format!(" - {}", -self.b),
            std::cmp::Ordering::Equal => String::new(),
        };
        format!("{}x{} = {}", self.a, b_part, self.c)
    }
}

impl Minigame for FormulaShot {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        // The solution is drawn first so the equation is always integral.
        let x = roll(rng, -(2 + level as i64), 5 + 2 * level as i64);
        let a = roll(rng, 2, 4 + level as i64 / 2);
        let b = roll(rng, -(10 + 2 * level as i64), 10 + 2 * level as i64);
        self.level = level;
        self.a = a;
        self.b = b;
        self.c = a * x + b;
        self.x = x;
        debug!(equation = %self.equation(), "Generated equation");
    }

    fn briefing(&self) -> &'static str {
        "Solve for x. The unknown is always a whole number and you get exactly one submission."
    }

    fn view(&self) -> GameView {
        GameView::text_entry(
            "Solve for x".to_string(),
            vec![self.equation(), String::new(), "x = ?".to_string()],
        )
    }

    fn solution(&self) -> Option<String> {
        Some(format!(
            "Subtract {} from both sides, then divide by {}: x = ({} - {}) / {} = {}.",
            self.b, self.a, self.c, self.b, self.a, self.x
        ))
    }

    #[instrument(skip(self, _rng))]
    fn handle(&mut self, input: PlayerInput, _rng: &mut dyn RngCore) -> InputResult {
        let PlayerInput::Submit(text) = input else {
            return InputResult::Continue;
        };
        let Ok(guess) = text.trim().parse::<i64>() else {
            return InputResult::Rejected("Enter a whole number".to_string());
        };
        if guess == self.x {
            InputResult::Finished(AttemptOutcome::win(self.level * 400))
        } else {
            InputResult::Finished(AttemptOutcome::loss(0))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    #[test]
    fn generated_equation_holds() {
        let mut rng = StdRng::seed_from_u64(13);
        for level in 1..=20 {
            let mut game = FormulaShot::new();
            game.reset(level, &mut rng);
            assert_eq!(game.a * game.x + game.b, game.c);
            assert!(game.a >= 2);
        }
    }

    #[test]
    fn exact_answer_wins() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut game = FormulaShot::new();
        game.reset(4, &mut rng);
        assert_eq!(
            game.handle(PlayerInput::Submit(game.x.to_string()), &mut rng),
            InputResult::Finished(AttemptOutcome::win(1600))
        );
    }

    #[test]
    fn wrong_answer_scores_zero() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut game = FormulaShot::new();
        game.reset(1, &mut rng);
        let wrong = (game.x + 1).to_string();
        assert_eq!(
            game.handle(PlayerInput::Submit(wrong), &mut rng),
            InputResult::Finished(AttemptOutcome::loss(0))
        );
    }

    #[test]
    fn non_numeric_input_is_rejected() {
        let mut rng = StdRng::seed_from_u64(13);
        let mut game = FormulaShot::new();
        game.reset(1, &mut rng);
        assert!(matches!(
            game.handle(PlayerInput::Submit("x".to_string()), &mut rng),
            InputResult::Rejected(_)
        ));
    }
}
