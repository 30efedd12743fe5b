//! Enemy AI components (phase, brain, config).

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::combat::PhaseKind;

/// Фазы enemy FSM (каждая со своим таймером)
#[derive(Debug, Clone, Copy, PartialEq, Reflect)]
pub enum EnemyPhase {
    /// Probe - держим дистанцию, орбита вокруг цели
    Probe {
        /// Время до решения Approach/Combo
        remaining: f32,
    },

    /// Chase - цель слишком далеко, бежим за ней
    Chase,

    /// Approach - сближение до attack reach
    Approach,

    /// Combo - серия ударов
    Combo {
        /// Сколько ударов ещё осталось в серии
        remaining_strikes: u32,
    },

    /// Block - держим блок фиксированное время
    Block {
        remaining: f32,
        /// После блока отступить (Evade)
        retreat_after: bool,
    },

    /// Evade - отступление от цели
    Evade { remaining: f32 },

    /// Dodge - короткий sidestep (side = ±1)
    Dodge { remaining: f32, side: f32 },

    /// Hit - stun reaction, решения не принимаются
    Hit { remaining: f32 },
}

impl Default for EnemyPhase {
    fn default() -> Self {
        Self::Probe { remaining: 0.0 }
    }
}

impl EnemyPhase {
    pub fn kind(&self) -> PhaseKind {
        match self {
            EnemyPhase::Probe { .. } => PhaseKind::Probe,
            EnemyPhase::Chase => PhaseKind::Chase,
            EnemyPhase::Approach => PhaseKind::Approach,
            EnemyPhase::Combo { .. } => PhaseKind::Combo,
            EnemyPhase::Block { .. } => PhaseKind::Block,
            EnemyPhase::Evade { .. } => PhaseKind::Evade,
            EnemyPhase::Dodge { .. } => PhaseKind::Dodge,
            EnemyPhase::Hit { .. } => PhaseKind::Hit,
        }
    }

    /// Фазы, которые можно прервать Combo / preempt-реакцией
    pub fn is_neutral(&self) -> bool {
        matches!(self, EnemyPhase::Probe { .. } | EnemyPhase::Approach)
    }
}

/// Что делать после завершения Combo
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect, Serialize, Deserialize)]
pub enum PostComboPolicy {
    /// Сразу вернуться в Probe
    #[default]
    Probe,
    /// Отступить (Evade), потом Probe
    Evade,
    /// Блок, затем отступление
    BlockRetreat,
    /// Случайный выбор по `post_combo_weights`
    Weighted,
}

/// Параметры удара врага
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct EnemyStrikeConfig {
    pub damage: u32,
    /// Reach probe'а (от центра атакующего)
    pub reach: f32,
    pub hit_force: f32,
    /// Recovery после полной серии
    pub cooldown: f32,
    pub release_latency: f32,
}

impl Default for EnemyStrikeConfig {
    fn default() -> Self {
        Self {
            damage: 12,
            reach: 2.0,
            hit_force: 6.0,
            cooldown: 1.2,
            release_latency: 0.1,
        }
    }
}

/// Параметры AI
#[derive(Debug, Clone, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct AIConfig {
    /// Дистанция орбиты в Probe (метры)
    pub ideal_distance: f32,
    /// Дистанция, с которой начинается Combo
    pub attack_reach: f32,
    /// Дальше этого → Chase
    pub chase_threshold: f32,
    pub chase_enabled: bool,
    pub foot_speed: f32,
    pub chase_speed: f32,
    /// Частота тангенциального покачивания орбиты (рад/сек)
    pub orbit_frequency: f32,
    /// Длительность Probe, случайная в [min, max]
    pub probe_duration: (f32, f32),
    /// Пауза между ударами серии, случайная в [min, max]
    pub combo_gap: (f32, f32),
    pub combo_min: u32,
    pub combo_max: u32,
    pub post_combo: PostComboPolicy,
    /// Веса (probe, block, evade) для PostComboPolicy::Weighted
    pub post_combo_weights: (f32, f32, f32),
    pub block_enabled: bool,
    pub block_duration: f32,
    pub evade_enabled: bool,
    pub evade_duration: f32,
    pub dodge_enabled: bool,
    pub dodge_duration: f32,
    pub dodge_speed: f32,
    /// Вероятность реакции на замах игрока (одна попытка на замах)
    pub preempt_chance: f32,
    /// Реакция только если цель ближе этого радиуса
    pub preempt_radius: f32,
}

impl Default for AIConfig {
    fn default() -> Self {
        Self {
            ideal_distance: 3.2,
            attack_reach: 2.2,
            chase_threshold: 8.0,
            chase_enabled: true,
            foot_speed: 3.2,
            chase_speed: 4.0,
            orbit_frequency: 2.0,
            probe_duration: (0.5, 1.0),
            combo_gap: (0.2, 0.35),
            combo_min: 3,
            combo_max: 5,
            post_combo: PostComboPolicy::Probe,
            post_combo_weights: (0.6, 0.15, 0.25),
            block_enabled: true,
            block_duration: 0.8,
            evade_enabled: true,
            evade_duration: 0.6,
            dodge_enabled: false,
            dodge_duration: 0.35,
            dodge_speed: 5.0,
            preempt_chance: 0.15,
            preempt_radius: 3.5,
        }
    }
}

/// Enemy controller: текущая фаза + tunables
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct EnemyBrain {
    pub(crate) phase: EnemyPhase,
    pub(crate) config: AIConfig,
    pub(crate) strike: EnemyStrikeConfig,
    /// Замах цели уже оценён (одна попытка preempt на замах)
    pub(crate) windup_seen: bool,
}

impl EnemyBrain {
    pub fn new(config: AIConfig, strike: EnemyStrikeConfig) -> Self {
        Self {
            config,
            strike,
            ..default()
        }
    }

    pub fn phase(&self) -> EnemyPhase {
        self.phase
    }

    pub fn config(&self) -> &AIConfig {
        &self.config
    }

    pub fn strike_config(&self) -> &EnemyStrikeConfig {
        &self.strike
    }

    /// Принудительно выставить фазу (спавн, тесты, скрипты)
    pub fn with_phase(mut self, phase: EnemyPhase) -> Self {
        self.phase = phase;
        self
    }
}
