use std::{fmt, str::FromStr};

use anyhow::{anyhow, Error};
use serde::{Deserialize, Serialize};

/// Scores below this are `Calm`.
pub const BALANCED_THRESHOLD: u64 = 20;
/// Scores at or above this are `Aggressive`.
pub const AGGRESSIVE_THRESHOLD: u64 = 60;

/// Discrete mood of one sampling cycle.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash)]
pub enum Mode {
    Calm,
    Balanced,
    Aggressive,
}

impl Mode {
    pub const ALL: [Mode; 3] = [Mode::Calm, Mode::Balanced, Mode::Aggressive];

    pub fn as_str(&self) -> &'static str {
        match self {
            Mode::Calm => "Calm",
            Mode::Balanced => "Balanced",
            Mode::Aggressive => "Aggressive",
        }
    }

    /// `Calm` and `Aggressive` are the two ends worth warning about.
    pub fn is_extreme(&self) -> bool {
        matches!(self, Mode::Calm | Mode::Aggressive)
    }
}

impl fmt::Display for Mode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Mode {
    type Err = Error;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "Calm" => Ok(Mode::Calm),
            "Balanced" => Ok(Mode::Balanced),
            "Aggressive" => Ok(Mode::Aggressive),
            other => Err(anyhow!("unknown mode '{other}'")),
        }
    }
}

/// `[0, 20)` Calm, `[20, 60)` Balanced, `[60, ∞)` Aggressive.
pub fn classify(score: u64) -> Mode {
    if score < BALANCED_THRESHOLD {
        Mode::Calm
    } else if score < AGGRESSIVE_THRESHOLD {
        Mode::Balanced
    } else {
        Mode::Aggressive
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn boundaries() {
        assert_eq!(classify(0), Mode::Calm);
        assert_eq!(classify(19), Mode::Calm);
        assert_eq!(classify(20), Mode::Balanced);
        assert_eq!(classify(59), Mode::Balanced);
        assert_eq!(classify(60), Mode::Aggressive);
        assert_eq!(classify(u64::MAX), Mode::Aggressive);
    }

    #[test]
    fn classification_is_monotonic() {
        let rank = |mode: Mode| Mode::ALL.iter().position(|m| *m == mode).unwrap();
        let mut previous = rank(classify(0));
        for score in 1..200 {
            let current = rank(classify(score));
            assert!(current >= previous, "score {score} went backwards");
            previous = current;
        }
    }

    #[test]
    fn parses_stored_names_only() {
        for mode in Mode::ALL {
            assert_eq!(mode.as_str().parse::<Mode>().unwrap(), mode);
        }
        assert!("AGGRESSIVE".parse::<Mode>().is_err());
        assert!("".parse::<Mode>().is_err());
    }

    #[test]
    fn balanced_is_not_extreme() {
        assert!(Mode::Calm.is_extreme());
        assert!(Mode::Aggressive.is_extreme());
        assert!(!Mode::Balanced.is_extreme());
    }
}
