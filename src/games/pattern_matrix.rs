//! Grid sequence memory: watch a flashed pattern, then repeat it.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{
    CellAccent, GameView, GridCell, InputMode, InputResult, Minigame, PlayerInput, ViewBody, roll,
};
use crate::lifecycle::AttemptOutcome;

/// Ticks each pattern step occupies during the reveal.
const STEP_TICKS: u64 = 8;
/// Ticks within a step during which the cell is lit.
const LIT_TICKS: u64 = 5;
/// Ticks the verdict is displayed before the attempt ends.
const RESULT_TICKS: u64 = 15;
/// Longest pattern regardless of level.
const MAX_PATTERN: usize = 15;

#[derive(Debug, Clone, PartialEq, Eq)]
enum Phase {
    /// Replaying the pattern to the player; `tick` counts within the reveal.
    Showing { tick: u64 },
    /// Player is repeating the pattern.
    Playing,
    /// Verdict displayed; the attempt ends when the countdown expires.
    Result { ticks_left: u64, outcome: AttemptOutcome },
}

/// Grid memory game: a pattern of cells flashes in order, then the player
/// must click the same cells in the same order.
#[derive(Debug)]
pub struct PatternMatrix {
    level: u32,
    grid_size: usize,
    pattern: Vec<usize>,
    entered: usize,
    phase: Phase,
}

impl PatternMatrix {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            grid_size: 3,
            pattern: Vec::new(),
            entered: 0,
            phase: Phase::Playing,
        }
    }

    /// Index of the currently lit cell during the reveal, if any.
    fn lit_cell(&self) -> Option<usize> {
        match self.phase {
            Phase::Showing { tick } => {
                let step = (tick / STEP_TICKS) as usize;
                if tick % STEP_TICKS < LIT_TICKS {
                    self.pattern.get(step).copied()
                } else {
                    None
                }
            }
            _ => None,
        }
    }

    fn reveal_ticks(&self) -> u64 {
        self.pattern.len() as u64 * STEP_TICKS
    }
}

impl Minigame for PatternMatrix {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        // Level 1-5: 3x3, 6-10: 4x4, 11+: 5x5.
        let grid_size = if level <= 5 {
            3
        } else if level <= 10 {
            4
        } else {
            5
        };
        let length = (level as usize + 2).min(MAX_PATTERN);
        let cells = grid_size * grid_size;
        let pattern = (0..length)
            .map(|_| roll(rng, 0, cells as i64 - 1) as usize)
            .collect();
        debug!(grid_size, length, "Generated pattern");
        self.level = level;
        self.grid_size = grid_size;
        self.pattern = pattern;
        self.entered = 0;
        self.phase = Phase::Showing { tick: 0 };
    }

    fn briefing(&self) -> &'static str {
        "A sequence of cells lights up one at a time. Memorize the order, then select the same \
         cells in the same order. One wrong cell ends the attempt."
    }

    fn view(&self) -> GameView {
        let lit = self.lit_cell();
        let cells = (0..self.grid_size * self.grid_size)
            .map(|i| {
                let accent = match &self.phase {
                    Phase::Showing { .. } if lit == Some(i) => CellAccent::Active,
                    Phase::Result { outcome, .. } if self.pattern[..self.entered].contains(&i) => {
                        if outcome.success {
                            CellAccent::Good
                        } else {
                            CellAccent::Bad
                        }
                    }
                    _ => CellAccent::Normal,
                };
                GridCell::new("  ", accent)
            })
            .collect();
        let (status, input) = match &self.phase {
            Phase::Showing { .. } => ("Memorize the pattern...".to_string(), InputMode::Locked),
            Phase::Playing => (
                format!("Repeat the pattern ({}/{})", self.entered, self.pattern.len()),
                InputMode::Grid {
                    width: self.grid_size,
                    height: self.grid_size,
                },
            ),
            Phase::Result { outcome, .. } => (
                if outcome.success {
                    "Pattern verified".to_string()
                } else {
                    "Sequence failed".to_string()
                },
                InputMode::Locked,
            ),
        };
        GameView {
            status,
            body: ViewBody::Grid {
                width: self.grid_size,
                cells,
            },
            choices: Vec::new(),
            input,
        }
    }

    #[instrument(skip(self, _rng))]
    fn handle(&mut self, input: PlayerInput, _rng: &mut dyn RngCore) -> InputResult {
        match (&mut self.phase, input) {
            (Phase::Showing { tick }, PlayerInput::Tick) => {
                *tick += 1;
                if *tick >= self.reveal_ticks() {
                    self.phase = Phase::Playing;
                }
                InputResult::Continue
            }
            (Phase::Playing, PlayerInput::Choose(cell)) => {
                if self.pattern.get(self.entered) == Some(&cell) {
                    self.entered += 1;
                    if self.entered == self.pattern.len() {
                        self.phase = Phase::Result {
                            ticks_left: RESULT_TICKS,
                            outcome: AttemptOutcome::win(self.level * 500),
                        };
                    }
                } else {
                    self.phase = Phase::Result {
                        ticks_left: RESULT_TICKS,
                        outcome: AttemptOutcome::loss(self.level * 100),
                    };
                }
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

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;
    use rand::rngs::StdRng;

    fn reset_at(level: u32) -> PatternMatrix {
        let mut rng = StdRng::seed_from_u64(7);
        let mut game = PatternMatrix::new();
        game.reset(level, &mut rng);
        game
    }

    #[test]
    fn grid_size_scales_and_caps() {
        assert_eq!(reset_at(1).grid_size, 3);
        assert_eq!(reset_at(6).grid_size, 4);
        assert_eq!(reset_at(11).grid_size, 5);
        assert_eq!(reset_at(100).grid_size, 5);
    }

    #[test]
    fn pattern_length_is_bounded() {
        assert_eq!(reset_at(1).pattern.len(), 3);
        assert_eq!(reset_at(50).pattern.len(), MAX_PATTERN);
    }

    #[test]
    fn correct_replay_wins_after_reveal() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut game = reset_at(1);
        // Sit through the reveal.
        while matches!(game.phase, Phase::Showing { .. }) {
            game.handle(PlayerInput::Tick, &mut rng);
        }
        let pattern = game.pattern.clone();
        for &cell in &pattern {
            assert_eq!(game.handle(PlayerInput::Choose(cell), &mut rng), InputResult::Continue);
        }
        // The verdict holds for a beat, then the attempt finishes.
        let mut finished = None;
        for _ in 0..RESULT_TICKS {
            if let InputResult::Finished(outcome) = game.handle(PlayerInput::Tick, &mut rng) {
                finished = Some(outcome);
            }
        }
        assert_eq!(finished, Some(AttemptOutcome::win(500)));
    }

    #[test]
    fn input_during_reveal_is_ignored() {
        let mut rng = StdRng::seed_from_u64(7);
        let mut game = reset_at(1);
        assert_eq!(game.handle(PlayerInput::Choose(0), &mut rng), InputResult::Continue);
        assert!(matches!(game.phase, Phase::Showing { .. }));
    }
}
