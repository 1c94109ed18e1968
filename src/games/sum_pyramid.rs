//! Rebuild the missing brick in an addition pyramid.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{GameView, InputResult, Minigame, PlayerInput, roll};
use crate::lifecycle::AttemptOutcome;

/// Tallest pyramid regardless of level.
const MAX_HEIGHT: usize = 5;

/// Each brick is the sum of the two beneath it; one brick above the base
/// is hidden. Type its value.
#[derive(Debug)]
pub struct SumPyramid {
    level: u32,
    /// Rows from base (index 0) to apex; row `r` has `height - r` bricks.
    rows: Vec<Vec<i64>>,
    /// (row, index) of the hidden brick. Never on the base row.
    gap: (usize, usize),
}

impl SumPyramid {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            rows: Vec::new(),
            gap: (1, 0),
        }
    }

    fn height(level: u32) -> usize {
        (3 + level as usize / 5).min(MAX_HEIGHT)
    }

    fn answer(&self) -> i64 {
        self.rows[self.gap.0][self.gap.1]
    }
}

impl Minigame for SumPyramid {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        let height = Self::height(level);
        let hi = 10 + 2 * level as i64;
        let base: Vec<i64> = (0..height).map(|_| roll(rng, 1, hi)).collect();
        let mut rows = vec![base];
        for r in 1..height {
            let below = &rows[r - 1];
            let row = (0..height - r).map(|i| below[i] + below[i + 1]).collect();
            rows.push(row);
        }
        let gap_row = roll(rng, 1, height as i64 - 1) as usize;
        let gap_index = roll(rng, 0, (height - gap_row) as i64 - 1) as usize;
        debug!(height, gap_row, gap_index, "Generated pyramid");
        self.level = level;
        self.rows = rows;
        self.gap = (gap_row, gap_index);
    }

    fn briefing(&self) -> &'static str {
        "Every brick is the sum of the two directly beneath it. One brick is hidden; type its \
         value. One submission decides the attempt."
    }

    fn view(&self) -> GameView {
        let height = self.rows.len();
        // Render apex first, base last, centered with padding.
        let lines = (0..height)
            .rev()
            .map(|r| {
                let padding = " ".repeat(r * 3);
                let bricks: Vec<String> = self.rows[r]
                    .iter()
                    .enumerate()
                    .map(|(i, value)| {
                        if (r, i) == self.gap {
                            format!("{:>4}", "?")
                        } else {
                            format!("{value:>4}")
                        }
                    })
                    .collect();
                format!("{padding}{}", bricks.join("  "))
            })
            .collect();
        GameView::text_entry("Fill the hidden brick".to_string(), lines)
    }

    fn solution(&self) -> Option<String> {
        let (r, i) = self.gap;
        Some(format!(
            "The hidden brick sits on {} + {} = {}.",
            self.rows[r - 1][i],
            self.rows[r - 1][i + 1],
            self.answer()
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
        if guess == self.answer() {
            InputResult::Finished(AttemptOutcome::win(self.level * 300))
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
    fn every_brick_is_the_sum_beneath_it() {
        let mut rng = StdRng::seed_from_u64(43);
        for level in 1..=20 {
            let mut game = SumPyramid::new();
            game.reset(level, &mut rng);
            for r in 1..game.rows.len() {
                for i in 0..game.rows[r].len() {
                    assert_eq!(game.rows[r][i], game.rows[r - 1][i] + game.rows[r - 1][i + 1]);
                }
            }
        }
    }

    #[test]
    fn gap_is_never_on_the_base() {
        let mut rng = StdRng::seed_from_u64(43);
        for _ in 0..50 {
            let mut game = SumPyramid::new();
            game.reset(10, &mut rng);
            assert!(game.gap.0 >= 1);
            assert!(game.gap.1 < game.rows[game.gap.0].len());
        }
    }

    #[test]
    fn height_scales_and_caps() {
        assert_eq!(SumPyramid::height(1), 3);
        assert_eq!(SumPyramid::height(5), 4);
        assert_eq!(SumPyramid::height(10), 5);
        assert_eq!(SumPyramid::height(100), MAX_HEIGHT);
    }

    #[test]
    fn correct_brick_wins() {
        let mut rng = StdRng::seed_from_u64(43);
        let mut game = SumPyramid::new();
        game.reset(2, &mut rng);
        let answer = game.answer().to_string();
        assert_eq!(
            game.handle(PlayerInput::Submit(answer), &mut rng),
            InputResult::Finished(AttemptOutcome::win(600))
        );
    }
}
