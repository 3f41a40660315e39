//! Guess-the-number banter: a rapport-only side channel.

use rand::Rng;
use rand_chacha::ChaCha8Rng;

use crate::config::RapportBounds;

/// Highest number the demon thinks of; guesses run `0..=MAX_GUESS`.
pub const MAX_GUESS: u8 = 2;
/// Rapport gained on a correct guess.
pub const CORRECT_BONUS: i32 = 2;
/// Rapport lost on a wrong guess.
pub const WRONG_PENALTY: i32 = 1;

pub fn is_valid_guess(guess: u8) -> bool {
    guess <= MAX_GUESS
}

pub fn draw_secret(rng: &mut ChaCha8Rng) -> u8 {
    rng.gen_range(0..=MAX_GUESS)
}

/// Rapport after a guess, clamped to `bounds`.
pub fn score_guess(rapport: i32, correct: bool, bounds: &RapportBounds) -> i32 {
    let delta = if correct { CORRECT_BONUS } else { -WRONG_PENALTY };
    bounds.clamp(rapport.saturating_add(delta))
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    #[test]
    fn test_score_guess_clamps() {
        let bounds = RapportBounds::default();
        assert_eq!(score_guess(0, true, &bounds), 2);
        assert_eq!(score_guess(2, true, &bounds), 3);
        assert_eq!(score_guess(3, true, &bounds), 3);
        assert_eq!(score_guess(0, false, &bounds), -1);
        assert_eq!(score_guess(-3, false, &bounds), -3);
    }

    #[test]
    fn test_exhaustive_rapport_stays_bounded() {
        let bounds = RapportBounds::default();
        for start in bounds.min..=bounds.max {
            for correct in [true, false] {
                let after = score_guess(start, correct, &bounds);
                assert!((bounds.min..=bounds.max).contains(&after));
            }
        }
    }

    #[test]
    fn test_secret_in_range() {
        let mut rng = ChaCha8Rng::seed_from_u64(5);
        for _ in 0..100 {
            assert!(is_valid_guess(draw_secret(&mut rng)));
        }
        assert!(!is_valid_guess(3));
    }
}
