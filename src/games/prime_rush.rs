//! Prime or composite, against a shrinking clock.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{GameView, InputResult, Minigame, PlayerInput, TICKS_PER_SECOND, roll};
use crate::lifecycle::AttemptOutcome;

fn is_prime(n: i64) -> bool {
    if n < 2 {
        return false;
    }
    if n % 2 == 0 {
        return n == 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return false;
        }
        d += 2;
    }
    true
}

/// Smallest factor above one, for the reveal text.
fn smallest_factor(n: i64) -> i64 {
    if n % 2 == 0 {
        return 2;
    }
    let mut d = 3;
    while d * d <= n {
        if n % d == 0 {
            return d;
        }
        d += 2;
    }
    n
}

/// Classify one number as prime or composite before the clock hits zero.
/// Numbers grow and the clock shrinks with level.
#[derive(Debug)]
pub struct PrimeRush {
    level: u32,
    number: i64,
    ticks_left: u64,
}

impl PrimeRush {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            number: 2,
            ticks_left: 0,
        }
    }

    /// Clock budget in ticks: 7.5s at level 1, shrinking to a 3s floor.
    fn budget_ticks(level: u32) -> u64 {
        let secs = (7.5 - 0.22 * level as f64).max(3.0);
        (secs * TICKS_PER_SECOND as f64) as u64
    }
}

impl Minigame for PrimeRush {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        let lo = 10 + 20 * level as i64;
        let hi = 50 + 100 * level as i64;
        let want_prime = roll(rng, 0, 9) < 4;
        // Walk upward from a random start to the next number of the wanted
        // kind; primes are dense enough that this terminates quickly.
        let mut number = roll(rng, lo, hi);
        while is_prime(number) != want_prime {
            number += 1;
        }
        debug!(number, want_prime, "Generated classification target");
        self.level = level;
        self.number = number;
        self.ticks_left = Self::budget_ticks(level);
    }

    fn briefing(&self) -> &'static str {
        "One number appears. Call it prime or composite before the clock runs out. Leftover time \
         converts to bonus points."
    }

    fn view(&self) -> GameView {
        let secs = self.ticks_left as f64 / TICKS_PER_SECOND as f64;
        GameView::with_choices(
            format!("{secs:.1}s left"),
            vec![format!("      {}", self.number)],
            vec!["Prime".to_string(), "Composite".to_string()],
        )
    }

    fn solution(&self) -> Option<String> {
        Some(if is_prime(self.number) {
            format!("{} is prime; no factor up to its square root divides it.", self.number)
        } else {
            format!(
                "{} is composite: it divides by {}.",
                self.number,
                smallest_factor(self.number)
            )
        })
    }

    #[instrument(skip(self, _rng))]
    fn handle(&mut self, input: PlayerInput, _rng: &mut dyn RngCore) -> InputResult {
        match input {
            PlayerInput::Tick => {
                // Emit the timeout exactly once, when the clock lands on zero.
                if self.ticks_left > 0 {
                    self.ticks_left -= 1;
                    if self.ticks_left == 0 {
                        return InputResult::Finished(AttemptOutcome::loss(0));
                    }
                }
                InputResult::Continue
            }
            PlayerInput::Choose(choice) => {
                if choice > 1 {
                    return InputResult::Rejected("Prime or composite".to_string());
                }
                let said_prime = choice == 0;
                if said_prime == is_prime(self.number) {
                    let bonus = (self.ticks_left * 10) as u32;
                    InputResult::Finished(AttemptOutcome::win(self.level * 200 + bonus))
                } else {
                    InputResult::Finished(AttemptOutcome::loss(0))
                }
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

    #[test]
    fn primality_check_agrees_with_known_values() {
        let primes = [2, 3, 5, 7, 97, 7919];
        let composites = [1, 4, 9, 91, 7917];
        for p in primes {
            assert!(is_prime(p), "{p}");
        }
        for c in composites {
            assert!(!is_prime(c), "{c}");
        }
    }

    #[test]
    fn clock_shrinks_to_a_floor() {
        assert_eq!(PrimeRush::budget_ticks(1), 72);
        assert!(PrimeRush::budget_ticks(5) < PrimeRush::budget_ticks(1));
        assert_eq!(PrimeRush::budget_ticks(100), 30);
    }

    #[test]
    fn correct_call_wins_with_time_bonus() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut game = PrimeRush::new();
        game.reset(1, &mut rng);
        let correct = if is_prime(game.number) { 0 } else { 1 };
        let expected = 200 + (game.ticks_left * 10) as u32;
        assert_eq!(
            game.handle(PlayerInput::Choose(correct), &mut rng),
            InputResult::Finished(AttemptOutcome::win(expected))
        );
    }

    #[test]
    fn timeout_loses() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut game = PrimeRush::new();
        game.reset(1, &mut rng);
        let mut last = InputResult::Continue;
        for _ in 0..PrimeRush::budget_ticks(1) {
            last = game.handle(PlayerInput::Tick, &mut rng);
        }
        assert_eq!(last, InputResult::Finished(AttemptOutcome::loss(0)));
    }

    #[test]
    fn numbers_scale_with_level() {
        let mut rng = StdRng::seed_from_u64(31);
        let mut game = PrimeRush::new();
        game.reset(20, &mut rng);
        assert!(game.number >= 410);
    }
}
