//! Combat stats ledger - per-actor боевое состояние
//!
//! Ledger хранит числа и флаги, но не принимает решений:
//! - health (0 ≤ health ≤ max_health)
//! - stun / invulnerability окна
//! - blocking флаг + block damage rate
//! - attack cooldown deadline
//! - накопленный charge (только игрок)
//!
//! Контроллеры спрашивают `can_attack`, pipeline вызывает `apply_damage`.

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::shared::{tick_down, SimTime};

/// Tunables ledger'а (загружаются из MatchConfig)
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct LedgerConfig {
    pub max_health: u32,
    /// Доля урона, проходящая через блок (0.15 = 15%)
    pub block_damage_rate: f32,
    /// Длительность stun после пропущенного удара (секунды)
    pub stun_duration: f32,
    /// Invulnerability после окончания stun (секунды)
    pub invulnerability_tail: f32,
    pub max_charge: f32,
}

impl Default for LedgerConfig {
    fn default() -> Self {
        Self::player()
    }
}

impl LedgerConfig {
    pub fn player() -> Self {
        Self {
            max_health: 120,
            block_damage_rate: 0.15,
            stun_duration: 0.35,
            invulnerability_tail: 0.55, // iframe 0.9s всего
            max_charge: 100.0,
        }
    }

    pub fn enemy() -> Self {
        Self {
            max_health: 100,
            block_damage_rate: 0.15,
            stun_duration: 0.35,
            invulnerability_tail: 0.4,
            max_charge: 100.0,
        }
    }
}

/// Переходы таймеров за тик (для логов/событий)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct WindowTransitions {
    pub stun_ended: bool,
    pub invulnerability_ended: bool,
}

/// Боевой ledger актора
///
/// Инварианты:
/// - 0 ≤ health ≤ max_health
/// - 0 ≤ charge ≤ max_charge
/// - stun_timer > 0 ⇒ invulnerable
/// - defeated выставляется ровно один раз
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
pub struct CombatLedger {
    health: u32,
    config: LedgerConfig,
    stun_timer: f32,
    invulnerable_remaining: f32,
    blocking: bool,
    next_attack_ready_at: SimTime,
    charge: f32,
    defeated: bool,
    last_hit_from: Option<Vec3>,
}

impl Default for CombatLedger {
    fn default() -> Self {
        Self::new(LedgerConfig::default())
    }
}

impl CombatLedger {
    pub fn new(config: LedgerConfig) -> Self {
        Self {
            health: config.max_health,
            config,
            stun_timer: 0.0,
            invulnerable_remaining: 0.0,
            blocking: false,
            next_attack_ready_at: SimTime::ZERO,
            charge: 0.0,
            defeated: false,
            last_hit_from: None,
        }
    }

    pub fn config(&self) -> &LedgerConfig {
        &self.config
    }

    pub fn health(&self) -> u32 {
        self.health
    }

    pub fn max_health(&self) -> u32 {
        self.config.max_health
    }

    pub fn health_fraction(&self) -> f32 {
        if self.config.max_health == 0 {
            return 0.0;
        }
        self.health as f32 / self.config.max_health as f32
    }

    pub fn is_alive(&self) -> bool {
        self.health > 0
    }

    pub fn is_stunned(&self) -> bool {
        self.stun_timer > 0.0
    }

    pub fn stun_remaining(&self) -> f32 {
        self.stun_timer
    }

    pub fn is_invulnerable(&self) -> bool {
        self.invulnerable_remaining > 0.0
    }

    pub fn is_blocking(&self) -> bool {
        self.blocking
    }

    pub fn charge(&self) -> f32 {
        self.charge
    }

    pub fn charge_fraction(&self) -> f32 {
        if self.config.max_charge <= 0.0 {
            return 0.0;
        }
        (self.charge / self.config.max_charge).clamp(0.0, 1.0)
    }

    pub fn next_attack_ready_at(&self) -> SimTime {
        self.next_attack_ready_at
    }

    pub fn last_hit_from(&self) -> Option<Vec3> {
        self.last_hit_from
    }

    pub fn is_defeated(&self) -> bool {
        self.defeated
    }

    pub fn cooldown_elapsed(&self, now: SimTime) -> bool {
        now.has_reached(self.next_attack_ready_at)
    }

    /// Может ли актор начать атаку: не в stun, не в блоке, cooldown истёк
    pub fn can_attack(&self, now: SimTime) -> bool {
        !self.is_stunned() && !self.blocking && self.cooldown_elapsed(now)
    }

    /// Применить урон. Возвращает фактически нанесённый урон.
    ///
    /// - invulnerable или уже 0 HP → 0, ledger не меняется
    /// - blocking → ceil(amount × block_damage_rate), минимум 1 если rate > 0
    /// - health уменьшается с насыщением (никогда < 0)
    pub fn apply_damage(&mut self, amount: u32, attacker_position: Vec3) -> u32 {
        if self.is_invulnerable() || self.health == 0 {
            return 0;
        }

        let incoming = if self.blocking {
            blocked_damage(amount, self.config.block_damage_rate)
        } else {
            amount
        };

        let applied = incoming.min(self.health);
        self.health -= applied;
        self.last_hit_from = Some(attacker_position);
        applied
    }

    /// Начать stun: stun_timer = duration, invulnerable на stun + tail.
    ///
    /// Stun не стакается: повторный stun во время активного только
    /// продлевает окна до максимума.
    pub fn begin_stun(&mut self) {
        let stun = self.config.stun_duration.max(0.0);
        let invulnerable = stun + self.config.invulnerability_tail.max(0.0);
        self.stun_timer = self.stun_timer.max(stun);
        self.invulnerable_remaining = self.invulnerable_remaining.max(invulnerable);
    }

    /// Returns true если флаг изменился
    pub fn begin_block(&mut self) -> bool {
        let changed = !self.blocking;
        self.blocking = true;
        changed
    }

    pub fn end_block(&mut self) -> bool {
        let changed = self.blocking;
        self.blocking = false;
        changed
    }

    /// Добавить charge (clamp в [0, max_charge])
    pub fn add_charge(&mut self, delta: f32) -> f32 {
        if delta.is_finite() {
            self.charge = (self.charge + delta).clamp(0.0, self.config.max_charge.max(0.0));
        }
        self.charge
    }

    /// Сбросить charge в 0, вернуть накопленное значение
    pub fn consume_charge(&mut self) -> f32 {
        std::mem::take(&mut self.charge)
    }

    /// Атака использована: следующая не раньше `now + cooldown`
    pub fn mark_attack_used(&mut self, now: SimTime, cooldown: f32) {
        self.next_attack_ready_at = now.after(cooldown);
    }

    /// One-shot defeat: true только при первом вызове
    pub fn mark_defeated(&mut self) -> bool {
        if self.defeated || self.health > 0 {
            return false;
        }
        self.defeated = true;
        self.blocking = false;
        self.charge = 0.0;
        true
    }

    /// Countdown stun/invulnerability окон
    pub fn tick_windows(&mut self, dt: f32) -> WindowTransitions {
        let was_stunned = self.is_stunned();
        let was_invulnerable = self.is_invulnerable();

        self.stun_timer = tick_down(self.stun_timer, dt);
        self.invulnerable_remaining = tick_down(self.invulnerable_remaining, dt);

        // Invulnerability покрывает stun целиком
        if self.is_stunned() && !self.is_invulnerable() {
            self.invulnerable_remaining = self.stun_timer;
        }

        WindowTransitions {
            stun_ended: was_stunned && !self.is_stunned(),
            invulnerability_ended: was_invulnerable && !self.is_invulnerable(),
        }
    }
}

/// Урон через блок: ceil(amount × rate), минимум 1 при rate > 0 и amount > 0
pub fn blocked_damage(amount: u32, rate: f32) -> u32 {
    if amount == 0 || !(rate > 0.0) {
        return 0;
    }
    let rate = rate.min(1.0) as f64;
    // 20 × 0.15f32 даёт 3.0000001 → без поправки ceil вернул бы 4.
    // Шум f32 в rate относителен, поэтому и допуск относительный
    let product = amount as f64 * rate;
    let nearest = product.round();
    let scaled = if (product - nearest).abs() <= product * f32::EPSILON as f64 {
        nearest
    } else {
        product.ceil()
    };
    (scaled as u32).max(1)
}
