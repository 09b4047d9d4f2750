//! Player preferences and custom race selections
//!
//! Held in memory for the lifetime of the process.

use serde::{Deserialize, Serialize};

/// Visual theme (consumed by the renderer palette)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum Theme {
    #[default]
    Cyberpunk,
    Standard,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Cyberpunk => "Cyberpunk",
            Theme::Standard => "Standard",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Theme::Cyberpunk => Theme::Standard,
            Theme::Standard => Theme::Cyberpunk,
        }
    }
}

/// Camera placement relative to the player craft
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, Default)]
pub enum CameraMode {
    /// Behind and above the craft
    #[default]
    Chase,
    /// First person, from the canopy
    Cockpit,
}

impl CameraMode {
    pub fn as_str(&self) -> &'static str {
        match self {
            CameraMode::Chase => "Chase",
            CameraMode::Cockpit => "Cockpit",
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            CameraMode::Chase => CameraMode::Cockpit,
            CameraMode::Cockpit => CameraMode::Chase,
        }
    }
}

/// AI difficulty tier
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize, Default)]
pub enum Difficulty {
    #[default]
    Cadet,
    Pilot,
    Ace,
}

impl Difficulty {
    /// Numeric tier (1-based) used in the AI throttle formula
    pub fn tier(&self) -> u32 {
        match self {
            Difficulty::Cadet => 1,
            Difficulty::Pilot => 2,
            Difficulty::Ace => 3,
        }
    }

    /// Tier lookup, clamping out-of-range values to the nearest tier
    pub fn from_tier(tier: u32) -> Self {
        match tier {
            0 | 1 => Difficulty::Cadet,
            2 => Difficulty::Pilot,
            _ => Difficulty::Ace,
        }
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Difficulty::Cadet => "Cadet",
            Difficulty::Pilot => "Pilot",
            Difficulty::Ace => "Ace",
        }
    }

    pub fn from_str(s: &str) -> Option<Self> {
        match s.to_lowercase().as_str() {
            "cadet" => Some(Difficulty::Cadet),
            "pilot" => Some(Difficulty::Pilot),
            "ace" => Some(Difficulty::Ace),
            _ => None,
        }
    }
}

/// Game settings/preferences
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Settings {
    pub theme: Theme,
    pub camera: CameraMode,

    // === Custom race ===
    /// Laps applied when a custom race is confirmed
    pub custom_laps: u32,
    /// AI difficulty applied when a custom race is confirmed
    pub custom_difficulty: Difficulty,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            theme: Theme::Cyberpunk,
            camera: CameraMode::Chase,
            custom_laps: 1,
            custom_difficulty: Difficulty::Cadet,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_difficulty_tier_clamps() {
        assert_eq!(Difficulty::from_tier(0), Difficulty::Cadet);
        assert_eq!(Difficulty::from_tier(2), Difficulty::Pilot);
        assert_eq!(Difficulty::from_tier(3), Difficulty::Ace);
        assert_eq!(Difficulty::from_tier(42), Difficulty::Ace);
        for d in [Difficulty::Cadet, Difficulty::Pilot, Difficulty::Ace] {
            assert_eq!(Difficulty::from_tier(d.tier()), d);
            assert_eq!(Difficulty::from_str(d.as_str()), Some(d));
        }
    }

    #[test]
    fn test_toggles_flip_back() {
        assert_eq!(Theme::Cyberpunk.toggled().toggled(), Theme::Cyberpunk);
        assert_eq!(CameraMode::Chase.toggled(), CameraMode::Cockpit);
    }
}
