//! Triangulate a hidden emitter from distance pings.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{
    CellAccent, GameView, GridCell, InputMode, InputResult, Minigame, PlayerInput, ViewBody, roll,
};
use crate::lifecycle::AttemptOutcome;

/// Find the hidden cell. Every probe reports its Manhattan distance to the
/// target; probes are limited and shrink with level.
#[derive(Debug)]
pub struct SignalSweep {
    level: u32,
    size: usize,
    target: usize,
    probes: Vec<(usize, u32)>,
    max_probes: u32,
}

impl SignalSweep {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            size: 5,
            target: 0,
            probes: Vec::new(),
            max_probes: 8,
        }
    }

    fn distance(&self, cell: usize) -> u32 {
        let (r1, c1) = (cell / self.size, cell % self.size);
        let (r2, c2) = (self.target / self.size, self.target % self.size);
        (r1.abs_diff(r2) + c1.abs_diff(c2)) as u32
    }

    fn remaining(&self) -> u32 {
        self.max_probes - self.probes.len() as u32
    }
}

impl Minigame for SignalSweep {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        let size = (5 + level as usize / 3).min(10);
        let max_probes = 8u32.saturating_sub(level / 4).max(3);
        let target = roll(rng, 0, (size * size) as i64 - 1) as usize;
        debug!(size, max_probes, "Generated sweep field");
        self.level = level;
        self.size = size;
        self.target = target;
        self.probes = Vec::new();
        self.max_probes = max_probes;
    }

    fn briefing(&self) -> &'static str {
        "A signal source hides somewhere in the field. Each probe reports how many steps away the \
         source is. Pin it down before your probes run out."
    }

    fn view(&self) -> GameView {
        let cells = (0..self.size * self.size)
            .map(|i| match self.probes.iter().find(|(cell, _)| *cell == i) {
                Some((_, 0)) => GridCell::new("**", CellAccent::Good),
                Some((_, distance)) => GridCell::new(format!("{distance:>2}"), CellAccent::Dim),
                None => GridCell::new(" .", CellAccent::Normal),
            })
            .collect();
        GameView {
            status: format!("{} probes left", self.remaining()),
            body: ViewBody::Grid {
                width: self.size,
                cells,
            },
            choices: Vec::new(),
            input: InputMode::Grid {
                width: self.size,
                height: self.size,
            },
        }
    }

    fn solution(&self) -> Option<String> {
        Some(format!(
            "The source was at row {}, column {}. Two probes on the same row or column bracket \
             it; their distances intersect in one cell.",
            self.target / self.size + 1,
            self.target % self.size + 1
        ))
    }

    #[instrument(skip(self, _rng))]
    fn handle(&mut self, input: PlayerInput, _rng: &mut dyn RngCore) -> InputResult {
        let PlayerInput::Choose(cell) = input else {
            return InputResult::Continue;
        };
        if cell >= self.size * self.size {
            return InputResult::Rejected("Outside the field".to_string());
        }
        if self.probes.iter().any(|(probed, _)| *probed == cell) {
            return InputResult::Rejected("Already probed there".to_string());
        }
        let distance = self.distance(cell);
        self.probes.push((cell, distance));
        if distance == 0 {
            let bonus = self.remaining() * 100;
            return InputResult::Finished(AttemptOutcome::win(self.level * 500 + bonus));
        }
        debug!(cell, distance, "Probe missed");
        if self.remaining() == 0 {
            InputResult::Finished(AttemptOutcome::loss(0))
        } else {
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
    fn field_and_probe_budget_scale() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut game = SignalSweep::new();
        game.reset(1, &mut rng);
        assert_eq!((game.size, game.max_probes), (5, 8));
        game.reset(20, &mut rng);
        assert_eq!((game.size, game.max_probes), (10, 3));
        game.reset(100, &mut rng);
        assert_eq!((game.size, game.max_probes), (10, 3));
    }

    #[test]
    fn direct_hit_wins_with_probe_bonus() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut game = SignalSweep::new();
        game.reset(1, &mut rng);
        assert_eq!(
            game.handle(PlayerInput::Choose(game.target), &mut rng),
            InputResult::Finished(AttemptOutcome::win(500 + 8 * 100))
        );
    }

    #[test]
    fn repeat_probe_is_rejected_without_cost() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut game = SignalSweep::new();
        game.reset(1, &mut rng);
        let miss = (game.target + 1) % (game.size * game.size);
        game.handle(PlayerInput::Choose(miss), &mut rng);
        let before = game.remaining();
        assert!(matches!(
            game.handle(PlayerInput::Choose(miss), &mut rng),
            InputResult::Rejected(_)
        ));
        assert_eq!(game.remaining(), before);
    }

    #[test]
    fn exhausting_probes_loses() {
        let mut rng = StdRng::seed_from_u64(23);
        let mut game = SignalSweep::new();
        game.reset(1, &mut rng);
        let mut last = InputResult::Continue;
        let mut cell = 0;
        for _ in 0..game.max_probes {
            while cell == game.target {
                cell += 1;
            }
            last = game.handle(PlayerInput::Choose(cell), &mut rng);
            cell += 1;
        }
        assert_eq!(last, InputResult::Finished(AttemptOutcome::loss(0)));
    }
}
