//! Fill the blank in a generated number sequence.

use rand::RngCore;
use tracing::{debug, instrument};

use super::{GameView, InputResult, Minigame, PlayerInput, roll};
use crate::lifecycle::AttemptOutcome;

/// Terms shown per sequence.
const SEQUENCE_LEN: usize = 6;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Rule {
    /// Constant difference.
    Add(i64),
    /// Constant ratio.
    Mult(i64),
    /// Consecutive squares from some start.
    Square,
    /// Each term is the sum of the previous two.
    Fibonacci,
}

impl Rule {
    fn describe(self) -> String {
        match self {
            Rule::Add(step) => format!("each term adds {step}"),
            Rule::Mult(factor) => format!("each term multiplies by {factor}"),
            Rule::Square => "the terms are consecutive squares".to_string(),
            Rule::Fibonacci => "each term is the sum of the previous two".to_string(),
        }
    }
}

/// One term of a sequence is hidden; name it. Later levels draw harder
/// rules.
#[derive(Debug)]
pub struct SequenceGap {
    level: u32,
    terms: Vec<i64>,
    gap: usize,
    rule: Rule,
}

impl SequenceGap {
    /// Creates an unmounted game; the arena calls `reset` before play.
    pub fn new() -> Self {
        Self {
            level: 1,
            terms: Vec::new(),
            gap: 0,
            rule: Rule::Add(1),
        }
    }

    fn draw_rule(level: u32, rng: &mut dyn RngCore) -> Rule {
        // Arithmetic only at first; harder rules join the pool with level.
        let pool = if level <= 3 {
            1
        } else if level <= 8 {
            2
        } else {
            4
        };
        match roll(rng, 0, pool - 1) {
            0 => Rule::Add(roll(rng, 2, 5 + level as i64)),
            1 => Rule::Mult(roll(rng, 2, 4)),
            2 => Rule::Square,
            _ => Rule::Fibonacci,
        }
    }

    fn build_terms(rule: Rule, rng: &mut dyn RngCore) -> Vec<i64> {
        match rule {
            Rule::Add(step) => {
                let start = roll(rng, 1, 20);
                (0..SEQUENCE_LEN as i64).map(|i| start + i * step).collect()
            }
            Rule::Mult(factor) => {
                let start = roll(rng, 1, 5);
                let mut terms = Vec::with_capacity(SEQUENCE_LEN);
                let mut value = start;
                for _ in 0..SEQUENCE_LEN {
                    terms.push(value);
                    value *= factor;
                }
                terms
            }
            Rule::Square => {
                let start = roll(rng, 1, 10);
                (start..start + SEQUENCE_LEN as i64).map(|n| n * n).collect()
            }
            Rule::Fibonacci => {
                let mut a = roll(rng, 1, 5);
                let mut b = roll(rng, a, 9);
                let mut terms = vec![a, b];
                while terms.len() < SEQUENCE_LEN {
                    let next = a + b;
                    terms.push(next);
                    a = b;
                    b = next;
                }
                terms
            }
        }
    }

    fn answer(&self) -> i64 {
        self.terms[self.gap]
    }
}

impl Minigame for SequenceGap {
    #[instrument(skip(self, rng))]
    fn reset(&mut self, level: u32, rng: &mut dyn RngCore) {
        let rule = Self::draw_rule(level, rng);
        let terms = Self::build_terms(rule, rng);
        // Keep the first and last terms visible so the rule is inferable.
        let gap = roll(rng, 1, SEQUENCE_LEN as i64 - 2) as usize;
        debug!(?rule, gap, "Generated sequence");
        self.level = level;
        self.terms = terms;
        self.gap = gap;
        self.rule = rule;
    }

    fn briefing(&self) -> &'static str {
        "A number sequence follows one hidden rule. Work out the rule and type the missing term. \
         One submission decides the attempt."
    }

    fn view(&self) -> GameView {
        let rendered: Vec<String> = self
            .terms
            .iter()
            .enumerate()
            .map(|(i, term)| {
                if i == self.gap {
                    "_".to_string()
                } else {
                    term.to_string()
                }
            })
            .collect();
        GameView::text_entry(
            "Fill the gap".to_string(),
            vec![rendered.join(", ")],
        )
    }

    fn solution(&self) -> Option<String> {
        Some(format!(
            "Here {}, so the missing term is {}.",
            self.rule.describe(),
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
            InputResult::Finished(AttemptOutcome::win(self.level * 350))
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
    fn sequences_obey_their_rule() {
        let mut rng = StdRng::seed_from_u64(17);
        for level in 1..=20 {
            let mut game = SequenceGap::new();
            game.reset(level, &mut rng);
            let t = &game.terms;
            assert_eq!(t.len(), SEQUENCE_LEN);
            match game.rule {
                Rule::Add(step) => {
                    for w in t.windows(2) {
                        assert_eq!(w[1] - w[0], step);
                    }
                }
                Rule::Mult(factor) => {
                    for w in t.windows(2) {
                        assert_eq!(w[1], w[0] * factor);
                    }
                }
                Rule::Square => {
                    for w in t.windows(2) {
                        let n = (w[0] as f64).sqrt().round() as i64;
                        assert_eq!(w[0], n * n);
                        assert_eq!(w[1], (n + 1) * (n + 1));
                    }
                }
                Rule::Fibonacci => {
                    for w in t.windows(3) {
                        assert_eq!(w[2], w[0] + w[1]);
                    }
                }
            }
        }
    }

    #[test]
    fn gap_never_hides_the_endpoints() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..50 {
            let mut game = SequenceGap::new();
            game.reset(12, &mut rng);
            assert!(game.gap >= 1 && game.gap <= SEQUENCE_LEN - 2);
        }
    }

    #[test]
    fn early_levels_stay_arithmetic() {
        let mut rng = StdRng::seed_from_u64(17);
        for _ in 0..30 {
            let mut game = SequenceGap::new();
            game.reset(2, &mut rng);
            assert!(matches!(game.rule, Rule::Add(_)));
        }
    }

    #[test]
    fn correct_term_wins() {
        let mut rng = StdRng::seed_from_u64(17);
        let mut game = SequenceGap::new();
        game.reset(2, &mut rng);
        let answer = game.answer().to_string();
        assert_eq!(
            game.handle(PlayerInput::Submit(answer), &mut rng),
            InputResult::Finished(AttemptOutcome::win(700))
        );
    }
}
