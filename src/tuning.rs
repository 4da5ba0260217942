//! Game balance and timing parameters
//!
//! Every number the simulation reads lives here so a level designer can
//! override it from JSON. Missing fields fall back to the defaults below.

use std::path::Path;

use serde::{Deserialize, Serialize};

use crate::error::TuningError;

/// Data-driven game balance
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Tuning {
    /// Seed for the simulation RNG (direction tie-breaks, wandering)
    pub seed: u64,

    // === Speeds (world units per second, before level scaling) ===
    pub player_speed: f32,
    pub pursuer_speed: f32,
    pub frightened_speed: f32,
    pub eaten_speed: f32,

    // === Frightened mode ===
    /// How long pursuers stay frightened after an energizer
    pub frightened_duration: f32,
    /// Remaining time below which the frightened indicator flashes
    pub flash_threshold: f32,
    /// Flash alternation rate (Hz)
    pub flash_rate: f32,

    // === Coordinator timing ===
    /// Delay before the first pursuer leaves the house
    pub first_release_delay: f32,
    /// Gap between staged releases, and the respawn delay after being eaten
    pub release_interval: f32,
    pub chase_duration: f32,
    pub scatter_duration: f32,
    /// Alternate chase/scatter; when false the coordinator holds chase
    pub scatter_enabled: bool,

    // === Targeting ===
    /// Inky re-roll cadence between direct pursuit and wandering
    pub inky_reroll_interval: f32,
    /// Pinky's lead in cells ahead of the player
    pub pinky_lead_cells: f32,
    /// Clyde retreats to his corner when closer than this (cells)
    pub clyde_shy_cells: f32,
    /// Wander target projection distance (cells)
    pub wander_cells: f32,

    // === Round flow ===
    pub initial_lives: u32,
    /// Delay between losing a life and the round restarting
    pub reset_delay: f32,
    pub speed_increase_per_level: f32,

    // === Scoring ===
    pub dot_score: u32,
    pub energizer_score: u32,
    /// Escalating score per pursuer eaten within one energizer window
    pub eat_scores: Vec<u32>,

    // === Contact radii (cells) ===
    pub catch_radius: f32,
    pub pickup_radius: f32,
    pub probe_radius: f32,
    pub house_exit_radius: f32,
    pub house_return_radius: f32,

    // === Ghost house idle ===
    pub bob_amount: f32,
    pub bob_speed: f32,

    // === Power-ups ===
    pub power_up_base_duration: f32,
    pub power_up_duration_decrease_per_level: f32,
    pub power_up_min_duration: f32,
    pub booster_speed_multiplier: f32,
}

impl Default for Tuning {
    fn default() -> Self {
        Self {
            seed: 0,

            player_speed: 5.0,
            pursuer_speed: 4.0,
            frightened_speed: 2.0,
            eaten_speed: 8.0,

            frightened_duration: 8.0,
            flash_threshold: 2.0,
            flash_rate: 4.0,

            first_release_delay: 1.0,
            release_interval: 5.0,
            chase_duration: 20.0,
            scatter_duration: 7.0,
            scatter_enabled: false,

            inky_reroll_interval: 1.5,
            pinky_lead_cells: 4.0,
            clyde_shy_cells: 8.0,
            wander_cells: 5.0,

            initial_lives: 3,
            reset_delay: 2.0,
            speed_increase_per_level: 0.1,

            dot_score: 10,
            energizer_score: 50,
            eat_scores: vec![200, 400, 800, 1600],

            catch_radius: 0.5,
            pickup_radius: 0.35,
            probe_radius: 0.2,
            house_exit_radius: 0.1,
            house_return_radius: 0.2,

            bob_amount: 0.15,
            bob_speed: 2.0,

            power_up_base_duration: 10.0,
            power_up_duration_decrease_per_level: 0.5,
            power_up_min_duration: 3.0,
            booster_speed_multiplier: 1.5,
        }
    }
}

impl Tuning {
    /// Parse tuning from JSON; absent fields keep their defaults
    pub fn from_json(json: &str) -> Result<Self, TuningError> {
        let tuning: Tuning = serde_json::from_str(json)?;
        tuning.validate()?;
        Ok(tuning)
    }

    /// Load tuning from a JSON file
    pub fn load(path: impl AsRef<Path>) -> Result<Self, TuningError> {
        let json = std::fs::read_to_string(path.as_ref())?;
        let tuning = Self::from_json(&json)?;
        log::info!("Loaded tuning from {}", path.as_ref().display());
        Ok(tuning)
    }

    /// Reject values the simulation cannot run with
    pub fn validate(&self) -> Result<(), TuningError> {
        let positive = [
            ("player_speed", self.player_speed),
            ("pursuer_speed", self.pursuer_speed),
            ("frightened_speed", self.frightened_speed),
            ("eaten_speed", self.eaten_speed),
            ("inky_reroll_interval", self.inky_reroll_interval),
            ("chase_duration", self.chase_duration),
            ("scatter_duration", self.scatter_duration),
        ];
        for (field, value) in positive {
            if !(value.is_finite() && value > 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("must be positive, got {value}"),
                });
            }
        }

        let non_negative = [
            ("frightened_duration", self.frightened_duration),
            ("flash_threshold", self.flash_threshold),
            ("first_release_delay", self.first_release_delay),
            ("release_interval", self.release_interval),
            ("reset_delay", self.reset_delay),
            ("speed_increase_per_level", self.speed_increase_per_level),
            ("catch_radius", self.catch_radius),
            ("pickup_radius", self.pickup_radius),
            ("probe_radius", self.probe_radius),
        ];
        for (field, value) in non_negative {
            if !(value.is_finite() && value >= 0.0) {
                return Err(TuningError::Invalid {
                    field,
                    reason: format!("must be non-negative, got {value}"),
                });
            }
        }

        if self.probe_radius >= 0.5 {
            return Err(TuningError::Invalid {
                field: "probe_radius",
                reason: "must be under half a cell or corridors read as blocked".to_string(),
            });
        }
        if self.eat_scores.is_empty() {
            return Err(TuningError::Invalid {
                field: "eat_scores",
                reason: "needs at least one entry".to_string(),
            });
        }
        if self.initial_lives == 0 {
            return Err(TuningError::Invalid {
                field: "initial_lives",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }

    /// Speed multiplier applied to every agent on the given level (1-based)
    pub fn level_speed_multiplier(&self, level: u32) -> f32 {
        1.0 + level.saturating_sub(1) as f32 * self.speed_increase_per_level
    }

    /// Power-up duration on the given level; shrinks per level down to a floor
    pub fn power_up_duration(&self, level: u32) -> f32 {
        let shrink = level.saturating_sub(1) as f32 * self.power_up_duration_decrease_per_level;
        (self.power_up_base_duration - shrink).max(self.power_up_min_duration)
    }

    /// Score for the n-th pursuer eaten in one energizer window (0-based), capped
    pub fn eat_score(&self, combo: u32) -> u32 {
        let idx = (combo as usize).min(self.eat_scores.len().saturating_sub(1));
        self.eat_scores.get(idx).copied().unwrap_or(0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults_validate() {
        assert!(Tuning::default().validate().is_ok());
    }

    #[test]
    fn test_partial_json_keeps_defaults() {
        let tuning = Tuning::from_json(r#"{ "pursuer_speed": 6.5, "scatter_enabled": true }"#).unwrap();
        assert_eq!(tuning.pursuer_speed, 6.5);
        assert!(tuning.scatter_enabled);
        assert_eq!(tuning.player_speed, 5.0);
        assert_eq!(tuning.eat_scores, vec![200, 400, 800, 1600]);
    }

    #[test]
    fn test_invalid_json_rejected() {
        assert!(matches!(
            Tuning::from_json("{ not json"),
            Err(TuningError::Json(_))
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "eaten_speed": -1.0 }"#),
            Err(TuningError::Invalid { field: "eaten_speed", .. })
        ));
        assert!(matches!(
            Tuning::from_json(r#"{ "eat_scores": [] }"#),
            Err(TuningError::Invalid { field: "eat_scores", .. })
        ));
    }

    #[test]
    fn test_eat_score_caps() {
        let tuning = Tuning::default();
        let scores: Vec<u32> = (0..6).map(|n| tuning.eat_score(n)).collect();
        assert_eq!(scores, vec![200, 400, 800, 1600, 1600, 1600]);
    }

    #[test]
    fn test_level_scaling() {
        let tuning = Tuning::default();
        assert!((tuning.level_speed_multiplier(1) - 1.0).abs() < 1e-6);
        assert!((tuning.level_speed_multiplier(3) - 1.2).abs() < 1e-6);
        assert!((tuning.power_up_duration(1) - 10.0).abs() < 1e-6);
        assert!((tuning.power_up_duration(100) - 3.0).abs() < 1e-6);
    }
}
