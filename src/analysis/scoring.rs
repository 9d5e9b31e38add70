//! Intensity score for one cycle's counters.

use crate::tracking::InteractionCounters;

pub const CLICK_WEIGHT: u64 = 2;
pub const KEY_WEIGHT: u64 = 1;
/// Focus changes weigh most: they stand in for context switching.
pub const FOCUS_WEIGHT: u64 = 3;

pub fn intensity_score(counters: &InteractionCounters) -> u64 {
    counters
        .clicks
        .saturating_mul(CLICK_WEIGHT)
        .saturating_add(counters.keystrokes.saturating_mul(KEY_WEIGHT))
        .saturating_add(counters.focus_changes.saturating_mul(FOCUS_WEIGHT))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn weights_each_counter() {
        assert_eq!(intensity_score(&InteractionCounters::default()), 0);
        assert_eq!(intensity_score(&InteractionCounters::new(1, 0, 0)), 2);
        assert_eq!(intensity_score(&InteractionCounters::new(0, 1, 0)), 1);
        assert_eq!(intensity_score(&InteractionCounters::new(0, 0, 1)), 3);
        assert_eq!(intensity_score(&InteractionCounters::new(7, 11, 4)), 14 + 11 + 12);
    }

    #[test]
    fn matches_linear_formula_over_a_grid() {
        for clicks in 0..12 {
            for keys in 0..12 {
                for focus in 0..12 {
                    let counters = InteractionCounters::new(clicks, keys, focus);
                    assert_eq!(intensity_score(&counters), clicks * 2 + keys + focus * 3);
                }
            }
        }
    }
}
