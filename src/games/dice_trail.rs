//! Track a rolling die through a trail of tilts.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{Direction, GameView, InputResult, Minigame, PlayerInput, roll};
use crate::lifecycle::AttemptOutcome;

/// Longest trail regardless of level.
const MAX_STEPS: usize = 12;

/// Die orientation tracked by three visible faces. Opposite faces always
/// sum to seven, so three faces determine the rest.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct Die {
    top: u8,
    north: u8,
    east: u8,
}

impl Die {
    /// Canonical starting orientation: 1 up, 2 away, 3 right.
    fn start() -> Self {
        Self {
            top: 1,
            north: 2,
            east: 3,
        }
    }

    fn tilt(self, direction: Direction) -> Self {
        match direction {
            Direction::Up => Self {
                top: 7 - self.north,
                north: self.top,
                east: self.east,
            },
            Direction::Down => Self {
                top: self.north,
                north: 7 - self.top,
                east: self.east,
            },
            Direction::Right => Self {
                top: 7 - self.east,
                north: self.north,
                east: self.top,
            },
            Direction::Left => Self {
                top: self.east,
                north: self.north,
                east: 7 - self.top,
            },
        }
    }
}

/// A die starts 1-up and tilts along a listed trail; the player names the
/// face ending on top.
#[derive(Debug)]
pub struct DiceTrail {
    level: u32,
    trail: Vec<Direction>,
    answer: u8,
}

impl DiceTrail {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            trail: Vec::new(),
            answer: 1,
        }
    }

    fn arrow(direction: Direction) -> &'static str {
        match direction {
            Direction::Up => "^",
            Direction::Down => "v",
            Direction::Left => "<",
            Direction::Right => ">",
        }
    }
}

impl Minigame for DiceTrail {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        let steps = (2 + level as usize / 2).min(MAX_STEPS);
        let trail: Vec<Direction> = (0..steps)
            .map(|_| match roll(rng, 0, 3) {
                0 => Direction::Up,
                1 => Direction::Down,
                2 => Direction::Left,
                _ => Direction::Right,
            })
            .collect();
        let final_die = trail.iter().fold(Die::start(), |die, &d| die.tilt(d));
        debug!(steps, answer = final_die.top, "Generated trail");
        self.level = level;
        self.trail = trail;
        self.answer = final_die.top;
    }

    fn briefing(&self) -> &'static str {
        "A die starts with 1 on top, 2 facing away and 3 facing right, then tilts along the shown \
         trail. Name the face that ends on top. Opposite faces sum to seven."
    }

    fn view(&self) -> GameView {
        let trail: String = self
            .trail
            .iter()
            .map(|&d| Self::arrow(d))
            .collect::<Vec<_>>()
            .join(" ");
        GameView::with_choices(
            "Which face ends on top?".to_string(),
            vec![
                "Start: 1 up, 2 away, 3 right".to_string(),
                format!("Trail: {trail}"),
            ],
            (1..=6).map(|n| n.to_string()).collect(),
        )
    }

    fn solution(&self) -> Option<String> {
        Some(format!(
            "Replaying the {} tilts from the 1-up start leaves {} on top.",
            self.trail.len(),
            self.answer
        ))
    }

    #[instrument(skip(self, _rng))]
    fn handle(&mut self, input: PlayerInput, _rng: &mut dyn RngCore) -> InputResult {
        let PlayerInput::Choose(choice) = input else {
            return InputResult::Continue;
        };
        if choice > 5 {
            return InputResult::Rejected("Pick a face from 1 to 6".to_string());
        }
        if choice as u8 + 1 == self.answer {
            InputResult::Finished(AttemptOutcome::win(self.level * 250))
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
    fn opposite_faces_sum_to_seven_through_any_tilt() {
        let mut die = Die::start();
        for direction in [
            Direction::Up,
            Direction::Right,
            Direction::Down,
            Direction::Left,
            Direction::Up,
            Direction::Up,
        ] {
            die = die.tilt(direction);
            assert!((1..=6).contains(&die.top));
            assert_ne!(die.top, die.north);
            assert_ne!(die.top, 7 - die.north);
            assert_ne!(die.top, die.east);
            assert_ne!(die.top, 7 - die.east);
        }
    }

    #[test]
    fn four_tilts_in_one_direction_return_to_start() {
        let mut die = Die::start();
        for _ in 0..4 {
            die = die.tilt(Direction::Right);
        }
        assert_eq!(die, Die::start());
    }

    #[test]
    fn correct_face_wins() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut game = DiceTrail::new();
        game.reset(2, &mut rng);
        let correct = game.answer as usize - 1;
        assert_eq!(
            game.handle(PlayerInput::Choose(correct), &mut rng),
            InputResult::Finished(AttemptOutcome::win(500))
        );
    }

    #[test]
    fn trail_length_caps() {
        let mut rng = StdRng::seed_from_u64(21);
        let mut game = DiceTrail::new();
        game.reset(100, &mut rng);
        assert_eq!(game.trail.len(), MAX_STEPS);
    }
}
