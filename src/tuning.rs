//! Data-driven game balance
//!
//! Every steering, AI and generation constant lives here so tuning passes
//! never touch simulation code. Defaults reproduce the shipped balance; a
//! JSON document can override any subset of fields.

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::consts::{BASE_TRACK_LENGTH, TRACK_LENGTH_PER_LEVEL};

/// Handling constants for one craft role
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CraftConfig {
    /// Throttle is ignored at or above this speed
    pub max_speed: f32,
    /// Longitudinal velocity added per accelerate command
    pub acceleration: f32,
    /// Velocity scale applied per brake command
    pub braking_factor: f32,
    pub steering_power: f32,
    /// Fraction of `steering_power` applied to lateral velocity per steer command
    pub steering_response: f32,
    /// Heading change (degrees) per steer command
    pub heading_step: f32,
    /// Heading is clamped to +/- this many degrees
    pub heading_limit: f32,
    /// Heading relaxation (degrees) per tick without steering input
    pub heading_recenter_step: f32,
    /// Steering has no effect below this speed
    pub min_steer_speed: f32,
    /// Braking has no effect at or below this speed
    pub min_brake_speed: f32,
}

impl CraftConfig {
    pub fn player() -> Self {
        Self {
            max_speed: 14.0,
            ..Self::ai()
        }
    }

    pub fn ai() -> Self {
        Self {
            max_speed: 9.5,
            acceleration: 0.4,
            braking_factor: 0.9,
            steering_power: 2.5,
            steering_response: 0.3,
            heading_step: 2.0,
            heading_limit: 25.0,
            heading_recenter_step: 1.0,
            min_steer_speed: 1.0,
            min_brake_speed: 0.1,
        }
    }
}

impl Default for CraftConfig {
    fn default() -> Self {
        Self::player()
    }
}

/// Heuristics for computer-controlled craft
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AiTuning {
    /// Throttle multiplier at difficulty tier 0
    pub base_factor: f32,
    /// Added to the throttle multiplier per difficulty tier
    pub tier_step: f32,
    /// Added to the throttle multiplier per campaign level above 1
    pub level_bonus: f32,
    /// Longitudinal distance to the player that triggers avoidance
    pub near_band: f32,
    /// Lateral distance to the player considered a collision risk
    pub risk_band: f32,
    pub avoid_nudge: f32,
    /// Idle centering gate: fires when `floor(t * rate + index) % period == 0`
    pub idle_gate_rate: f32,
    pub idle_gate_period: i64,
    pub idle_nudge: f32,
    /// Craft closer to center than this are left alone by idle centering
    pub idle_deadband: f32,
    /// Hard recentering kicks in beyond this fraction of half the track width
    pub hard_recenter_fraction: f32,
    /// Lateral pull per unit of offset when hard recentering
    pub hard_pull: f32,
}

impl Default for AiTuning {
    fn default() -> Self {
        Self {
            base_factor: 0.10,
            tier_step: 0.01,
            level_bonus: 0.15,
            near_band: 200.0,
            risk_band: 120.0,
            avoid_nudge: 0.3,
            idle_gate_rate: 2.0,
            idle_gate_period: 20,
            idle_nudge: 0.05,
            idle_deadband: 20.0,
            hard_recenter_fraction: 2.0 / 3.0,
            hard_pull: 0.05,
        }
    }
}

/// Procedural placement of coins, the shield token and obstacles
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct LevelTuning {
    /// First coin sits this far down the track
    pub coin_start: f32,
    /// No coins within this distance of the far end
    pub coin_end_buffer: f32,
    pub coin_step_min: f32,
    pub coin_step_max: f32,
    /// Shield spawns within this fraction band of the track length
    pub shield_band_start: f32,
    pub shield_band_end: f32,
    pub obstacles_base: u32,
    pub obstacles_per_level: u32,
    /// Obstacles keep this distance from both track ends
    pub obstacle_buffer: f32,
    /// Lateral placement band, as a fraction of track width either side of center
    pub lateral_band_fraction: f32,
    /// Altitude of pickups and obstacles
    pub item_altitude: f32,
}

impl Default for LevelTuning {
    fn default() -> Self {
        Self {
            coin_start: 200.0,
            coin_end_buffer: 500.0,
            coin_step_min: 200.0,
            coin_step_max: 500.0,
            shield_band_start: 0.3,
            shield_band_end: 0.8,
            obstacles_base: 8,
            obstacles_per_level: 4,
            obstacle_buffer: 400.0,
            lateral_band_fraction: 1.0 / 3.0,
            item_altitude: 30.0,
        }
    }
}

/// Campaign structure and race options
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CampaignTuning {
    pub max_level: u32,
    /// Seconds on the campaign-complete screen before the campaign restarts
    pub auto_restart_delay: f32,
    /// Lap counts selectable in custom race setup
    pub lap_options: Vec<u32>,
    pub ai_count: usize,
}

impl Default for CampaignTuning {
    fn default() -> Self {
        Self {
            max_level: 3,
            auto_restart_delay: 3.0,
            lap_options: vec![1, 3, 5],
            ai_count: 3,
        }
    }
}

impl CampaignTuning {
    /// Snap a requested lap count to the nearest selectable option
    pub fn nearest_lap_option(&self, requested: u32) -> u32 {
        self.lap_options
            .iter()
            .copied()
            .min_by_key(|&laps| laps.abs_diff(requested))
            .unwrap_or(1)
    }
}

/// Complete balance sheet
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    pub player: CraftConfig,
    pub ai: CraftConfig,
    pub ai_behavior: AiTuning,
    pub level: LevelTuning,
    pub campaign: CampaignTuning,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            player: CraftConfig::player(),
            ai: CraftConfig::ai(),
            ai_behavior: AiTuning::default(),
            level: LevelTuning::default(),
            campaign: CampaignTuning::default(),
        }
    }
}

/// Errors from loading or validating a tuning document
#[derive(Debug)]
pub enum TuningError {
    /// The document is not valid JSON for `Tuning`
    Parse(serde_json::Error),
    /// A field holds a value the simulation cannot run with
    Invalid {
        field: &'static str,
        reason: &'static str,
    },
}

impl fmt::Display for TuningError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TuningError::Parse(err) => write!(f, "failed to parse tuning: {err}"),
            TuningError::Invalid { field, reason } => {
                write!(f, "invalid tuning field `{field}`: {reason}")
            }
        }
    }
}

impl std::error::Error for TuningError {
    fn source(&self) -> Option<&(dyn std::error::Error + 'static)> {
        match self {
            TuningError::Parse(err) => Some(err),
            TuningError::Invalid { .. } => None,
        }
    }
}

impl From<serde_json::Error> for TuningError {
    fn from(err: serde_json::Error) -> Self {
        TuningError::Parse(err)
    }
}

fn invalid(field: &'static str, reason: &'static str) -> TuningError {
    TuningError::Invalid { field, reason }
}

impl Tuning {
    /// Parse a JSON document (missing fields take defaults) and validate it
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    pub fn to_json(&self) -> Result<String, TuningError> {
        Ok(serde_json::to_string_pretty(self)?)
    }

    /// Reject values that would make generation ranges empty or races unwinnable
    pub fn validate(&self) -> Result<(), TuningError> {
        for (field, craft) in [("player", &self.player), ("ai", &self.ai)] {
            if !(craft.max_speed > 0.0) {
                return Err(invalid(field, "max_speed must be positive"));
            }
            if !(craft.braking_factor > 0.0 && craft.braking_factor < 1.0) {
                return Err(invalid(field, "braking_factor must be in (0, 1)"));
            }
            if !(craft.heading_limit >= 0.0) {
                return Err(invalid(field, "heading_limit must be non-negative"));
            }
        }

        let level = &self.level;
        if !(level.coin_step_min > 0.0 && level.coin_step_min < level.coin_step_max) {
            return Err(invalid(
                "level.coin_step_min",
                "must be positive and below coin_step_max",
            ));
        }
        if !(0.0 <= level.shield_band_start
            && level.shield_band_start < level.shield_band_end
            && level.shield_band_end <= 1.0)
        {
            return Err(invalid(
                "level.shield_band_start",
                "shield band must satisfy 0 <= start < end <= 1",
            ));
        }
        if !(level.lateral_band_fraction > 0.0 && level.lateral_band_fraction <= 0.5) {
            return Err(invalid("level.lateral_band_fraction", "must be in (0, 0.5]"));
        }
        // The shortest track is the level-1 track
        let shortest = BASE_TRACK_LENGTH + TRACK_LENGTH_PER_LEVEL;
        if !(level.obstacle_buffer >= 0.0 && level.obstacle_buffer * 2.0 < shortest) {
            return Err(invalid(
                "level.obstacle_buffer",
                "buffers at both ends must leave room on the track",
            ));
        }

        let campaign = &self.campaign;
        if campaign.max_level == 0 {
            return Err(invalid("campaign.max_level", "must be at least 1"));
        }
        if campaign.lap_options.is_empty() || campaign.lap_options.contains(&0) {
            return Err(invalid(
                "campaign.lap_options",
                "must be non-empty and every option at least 1",
            ));
        }
        if !(campaign.auto_restart_delay >= 0.0) {
            return Err(invalid("campaign.auto_restart_delay", "must be non-negative"));
        }
        if self.ai_behavior.idle_gate_period <= 0 {
            return Err(invalid("ai_behavior.idle_gate_period", "must be positive"));
        }

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_are_valid() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_player_is_faster_than_ai() {
        let tuning = Tuning::default();
        assert!(tuning.player.max_speed > tuning.ai.max_speed);
        assert_eq!(tuning.player.acceleration, tuning.ai.acceleration);
    }

    #[test]
    fn test_missing_ai_section_keeps_ai_handling() {
        let tuning = Tuning::from_json(r#"{ "player": { "max_speed": 16 } }"#).unwrap();
        assert_eq!(tuning.player.max_speed, 16.0);
        assert_eq!(tuning.ai.max_speed, 9.5);
    }

    #[test]
    fn test_partial_json_uses_defaults() {
        let tuning = Tuning::from_json(r#"{ "campaign": { "max_level": 5 } }"#).unwrap();
        assert_eq!(tuning.campaign.max_level, 5);
        assert_eq!(tuning.campaign.lap_options, vec![1, 3, 5]);
        assert_eq!(tuning.level.obstacles_base, 8);
    }

    #[test]
    fn test_json_roundtrip_preserves_tuning() {
        let tuning = Tuning::default();
        let json = tuning.to_json().unwrap();
        assert_eq!(Tuning::from_json(&json).unwrap(), tuning);
    }

    #[test]
    fn test_rejects_malformed_json() {
        let err = Tuning::from_json("{ not json").unwrap_err();
        assert!(matches!(err, TuningError::Parse(_)));
    }

    #[test]
    fn test_rejects_empty_coin_step_range() {
        let json = r#"{ "level": { "coin_step_min": 500, "coin_step_max": 200 } }"#;
        let err = Tuning::from_json(json).unwrap_err();
        assert!(matches!(
            err,
            TuningError::Invalid {
                field: "level.coin_step_min",
                ..
            }
        ));
    }

    #[test]
    fn test_rejects_zero_max_level() {
        let mut tuning = Tuning::default();
        tuning.campaign.max_level = 0;
        assert!(tuning.validate().is_err());
    }

    #[test]
    fn test_nearest_lap_option() {
        let campaign = CampaignTuning::default();
        assert_eq!(campaign.nearest_lap_option(1), 1);
        assert_eq!(campaign.nearest_lap_option(2), 1);
        assert_eq!(campaign.nearest_lap_option(3), 3);
        assert_eq!(campaign.nearest_lap_option(4), 3);
        assert_eq!(campaign.nearest_lap_option(0), 1);
        assert_eq!(campaign.nearest_lap_option(99), 5);
    }
}
