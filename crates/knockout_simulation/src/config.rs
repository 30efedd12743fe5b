//! Match configuration (RON)
//!
//! Все tunables боя в одном месте: ledger, player attack, enemy AI, расстановка.
//! Отсутствующие поля берутся из Default (значения оригинального баланса).
//!
//! ```ron
//! (
//!     seed: 7,
//!     player: (position: (0.0, 0.0, 0.0)),
//!     enemies: [
//!         (position: (6.0, 0.0, 0.0), ai: (post_combo: Evade)),
//!     ],
//! )
//! ```

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::ai::{AIConfig, EnemyStrikeConfig};
use crate::components::LedgerConfig;
use crate::player::PlayerCombatConfig;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config: {0}")]
    Parse(#[from] ron::error::SpannedError),

    #[error("invalid config: {0}")]
    Invalid(String),
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerSetup {
    pub position: [f32; 3],
    pub hit_radius: f32,
    pub ledger: LedgerConfig,
    pub combat: PlayerCombatConfig,
}

impl Default for PlayerSetup {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            hit_radius: 0.5,
            ledger: LedgerConfig::player(),
            combat: PlayerCombatConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemySetup {
    pub position: [f32; 3],
    pub hit_radius: f32,
    pub ledger: LedgerConfig,
    pub ai: AIConfig,
    pub strike: EnemyStrikeConfig,
}

impl Default for EnemySetup {
    fn default() -> Self {
        Self {
            position: [6.0, 0.0, 0.0],
            hit_radius: 0.5,
            ledger: LedgerConfig::enemy(),
            ai: AIConfig::default(),
            strike: EnemyStrikeConfig::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ObstacleSetup {
    pub position: [f32; 3],
    pub radius: f32,
}

impl Default for ObstacleSetup {
    fn default() -> Self {
        Self {
            position: [0.0, 0.0, 0.0],
            radius: 0.5,
        }
    }
}

/// Полная конфигурация матча
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct MatchConfig {
    pub seed: u64,
    /// Частота fixed тика (Hz)
    pub tick_rate: f64,
    /// Лимит длительности headless прогона (секунды)
    pub max_duration: f32,
    pub player: PlayerSetup,
    pub enemies: Vec<EnemySetup>,
    pub obstacles: Vec<ObstacleSetup>,
}

impl Default for MatchConfig {
    fn default() -> Self {
        Self {
            seed: 42,
            tick_rate: 60.0,
            max_duration: 120.0,
            player: PlayerSetup::default(),
            enemies: vec![EnemySetup::default()],
            obstacles: Vec::new(),
        }
    }
}

impl MatchConfig {
    pub fn from_ron_str(source: &str) -> Result<Self, ConfigError> {
        let config: MatchConfig = ron::from_str(source)?;
        config.validate()?;
        Ok(config)
    }

    pub fn load_from_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let source = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        Self::from_ron_str(&source)
    }

    /// Fixed timestep (секунды)
    pub fn tick_dt(&self) -> f32 {
        (1.0 / self.tick_rate) as f32
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if !(self.tick_rate > 0.0) || !self.tick_rate.is_finite() {
            return invalid(format!("tick_rate must be positive, got {}", self.tick_rate));
        }
        if !(self.max_duration > 0.0) {
            return invalid(format!("max_duration must be positive, got {}", self.max_duration));
        }

        validate_ledger("player.ledger", &self.player.ledger)?;
        validate_positive("player.hit_radius", self.player.hit_radius)?;
        let combat = &self.player.combat;
        if combat.normal_damage == 0 || combat.heavy_damage < combat.normal_damage {
            return invalid(format!(
                "player.combat damage must satisfy 1 <= normal_damage <= heavy_damage, got ({}, {})",
                combat.normal_damage, combat.heavy_damage
            ));
        }
        validate_positive("player.combat.reach", combat.reach)?;
        validate_non_negative("player.combat.light_cooldown", combat.light_cooldown)?;
        validate_non_negative("player.combat.heavy_cooldown", combat.heavy_cooldown)?;
        validate_non_negative("player.combat.release_latency", combat.release_latency)?;
        validate_non_negative("player.combat.base_knockback", combat.base_knockback)?;
        validate_positive("player.combat.full_charge_time", combat.full_charge_time)?;

        for (index, enemy) in self.enemies.iter().enumerate() {
            let prefix = format!("enemies[{index}]");
            validate_ledger(&format!("{prefix}.ledger"), &enemy.ledger)?;
            validate_positive(&format!("{prefix}.hit_radius"), enemy.hit_radius)?;
            validate_ai(&prefix, &enemy.ai)?;
            validate_positive(&format!("{prefix}.strike.reach"), enemy.strike.reach)?;
            validate_non_negative(&format!("{prefix}.strike.cooldown"), enemy.strike.cooldown)?;
            validate_non_negative(
                &format!("{prefix}.strike.release_latency"),
                enemy.strike.release_latency,
            )?;
        }

        for (index, obstacle) in self.obstacles.iter().enumerate() {
            validate_positive(&format!("obstacles[{index}].radius"), obstacle.radius)?;
        }

        Ok(())
    }
}

fn invalid<T>(message: String) -> Result<T, ConfigError> {
    Err(ConfigError::Invalid(message))
}

fn validate_positive(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value > 0.0 {
        Ok(())
    } else {
        invalid(format!("{name} must be positive, got {value}"))
    }
}

fn validate_non_negative(name: &str, value: f32) -> Result<(), ConfigError> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        invalid(format!("{name} must be non-negative, got {value}"))
    }
}

fn validate_unit(name: &str, value: f32) -> Result<(), ConfigError> {
    if (0.0..=1.0).contains(&value) {
        Ok(())
    } else {
        invalid(format!("{name} must be within [0, 1], got {value}"))
    }
}

fn validate_range(name: &str, (min, max): (f32, f32)) -> Result<(), ConfigError> {
    validate_non_negative(name, min)?;
    if max >= min {
        Ok(())
    } else {
        invalid(format!("{name} range is inverted: ({min}, {max})"))
    }
}

fn validate_ledger(name: &str, ledger: &LedgerConfig) -> Result<(), ConfigError> {
    if ledger.max_health == 0 {
        return invalid(format!("{name}.max_health must be at least 1"));
    }
    validate_unit(&format!("{name}.block_damage_rate"), ledger.block_damage_rate)?;
    validate_non_negative(&format!("{name}.stun_duration"), ledger.stun_duration)?;
    validate_non_negative(
        &format!("{name}.invulnerability_tail"),
        ledger.invulnerability_tail,
    )?;
    validate_positive(&format!("{name}.max_charge"), ledger.max_charge)
}

fn validate_ai(prefix: &str, ai: &AIConfig) -> Result<(), ConfigError> {
    validate_positive(&format!("{prefix}.ai.attack_reach"), ai.attack_reach)?;
    validate_non_negative(&format!("{prefix}.ai.ideal_distance"), ai.ideal_distance)?;
    validate_positive(&format!("{prefix}.ai.chase_threshold"), ai.chase_threshold)?;
    validate_non_negative(&format!("{prefix}.ai.foot_speed"), ai.foot_speed)?;
    validate_non_negative(&format!("{prefix}.ai.chase_speed"), ai.chase_speed)?;
    validate_range(&format!("{prefix}.ai.probe_duration"), ai.probe_duration)?;
    validate_range(&format!("{prefix}.ai.combo_gap"), ai.combo_gap)?;
    if ai.combo_min == 0 || ai.combo_max < ai.combo_min {
        return invalid(format!(
            "{prefix}.ai combo length must satisfy 1 <= combo_min <= combo_max, got ({}, {})",
            ai.combo_min, ai.combo_max
        ));
    }
    validate_unit(&format!("{prefix}.ai.preempt_chance"), ai.preempt_chance)?;
    validate_non_negative(&format!("{prefix}.ai.preempt_radius"), ai.preempt_radius)?;
    validate_non_negative(&format!("{prefix}.ai.block_duration"), ai.block_duration)?;
    validate_non_negative(&format!("{prefix}.ai.evade_duration"), ai.evade_duration)?;
    validate_non_negative(&format!("{prefix}.ai.dodge_duration"), ai.dodge_duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::ai::PostComboPolicy;

    #[test]
    fn test_default_config_is_valid() {
        assert!(MatchConfig::default().validate().is_ok());
    }

    #[test]
    fn test_partial_ron_fills_defaults() {
        let config = MatchConfig::from_ron_str(
            r#"(
                seed: 7,
                enemies: [
                    (position: (4.0, 0.0, 1.0), ai: (post_combo: Evade, combo_min: 2)),
                ],
            )"#,
        )
        .expect("config should parse");

        assert_eq!(config.seed, 7);
        assert_eq!(config.tick_rate, 60.0);
        assert_eq!(config.player.ledger.max_health, 120);
        assert_eq!(config.enemies.len(), 1);
        assert_eq!(config.enemies[0].position, [4.0, 0.0, 1.0]);
        assert_eq!(config.enemies[0].ai.post_combo, PostComboPolicy::Evade);
        assert_eq!(config.enemies[0].ai.combo_min, 2);
        assert_eq!(config.enemies[0].ai.combo_max, 5);
        assert_eq!(config.enemies[0].ledger.max_health, 100);
    }

    #[test]
    fn test_invalid_values_are_rejected() {
        let err = MatchConfig::from_ron_str("(enemies: [(ai: (combo_min: 6, combo_max: 3))])")
            .expect_err("inverted combo range");
        assert!(matches!(err, ConfigError::Invalid(_)));

        let err = MatchConfig::from_ron_str("(player: (ledger: (block_damage_rate: 1.5)))")
            .expect_err("block rate above 1");
        assert!(err.to_string().contains("block_damage_rate"));

        let err = MatchConfig::from_ron_str("(player: (combat: (normal_damage: 0)))")
            .expect_err("zero normal damage");
        assert!(err.to_string().contains("normal_damage"));
    }

    #[test]
    fn test_malformed_ron_is_parse_error() {
        let err = MatchConfig::from_ron_str("(seed: )").expect_err("malformed");
        assert!(matches!(err, ConfigError::Parse(_)));
    }

    #[test]
    fn test_missing_file_is_io_error() {
        let err = MatchConfig::load_from_file("/definitely/not/here.ron").expect_err("missing");
        assert!(matches!(err, ConfigError::Io { .. }));
    }
}
