//! Player combat state machine (Idle / Charging / Blocking)
//!
//! Input приходит снаружи как уровни кнопок (`PlayerInput`), edges
//! (down/up) вычисляются здесь по предыдущему тику.
//!
//! - Idle → Charging: attack down, только если ledger.can_attack
//! - Charging: charge копится линейно до max, progress ∈ [0,1] каждый тик
//! - Release: damage / knockback / cooldown = lerp(light, heavy, charge/max),
//!   удар резолвится через `release_latency`
//! - Blocking имеет приоритет: отменяет charge и отложенный удар
//! - Stun (callback из pipeline): всё отменяется, input игнорируется до конца stun

use bevy::prelude::*;
use serde::{Deserialize, Serialize};

use crate::actor::{ControlContext, OpponentView};
use crate::combat::{ActorEffects, AnimationCueKind, SoundClip, StrikeThrown, StunReceiver};
use crate::components::CombatLedger;
use crate::shared::{Continuations, PendingStrike, StrikeAim, StrikeTarget};

/// Player attack tunables
#[derive(Debug, Clone, Copy, PartialEq, Reflect, Serialize, Deserialize)]
#[serde(default)]
pub struct PlayerCombatConfig {
    pub normal_damage: u32,
    pub heavy_damage: u32,
    /// Cooldown после незаряженного удара (секунды)
    pub light_cooldown: f32,
    /// Cooldown после полностью заряженного удара (секунды)
    pub heavy_cooldown: f32,
    pub base_knockback: f32,
    pub reach: f32,
    /// Время до полного заряда (секунды)
    pub full_charge_time: f32,
    /// Задержка между замахом и резолвом удара
    pub release_latency: f32,
}

impl Default for PlayerCombatConfig {
    fn default() -> Self {
        Self {
            normal_damage: 10,
            heavy_damage: 25,
            light_cooldown: 0.5,
            heavy_cooldown: 1.0,
            base_knockback: 5.0,
            reach: 2.5,
            full_charge_time: 3.0,
            release_latency: 0.1,
        }
    }
}

/// Уровни кнопок на текущий тик (пишет input layer движка или тест)
#[derive(Component, Debug, Clone, Copy, Default, PartialEq, Reflect)]
#[reflect(Component)]
pub struct PlayerInput {
    pub attack_held: bool,
    pub block_held: bool,
    /// Направление удара (world space). Zero → к текущему Opponent.
    pub aim: Vec3,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Reflect)]
pub enum PlayerCombatState {
    #[default]
    Idle,
    Charging,
    Blocking,
}

/// Параметры удара после release
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ReleasedStrike {
    /// charge / max_charge ∈ [0, 1]
    pub power: f32,
    pub damage: u32,
    pub knockback_force: f32,
    pub cooldown: f32,
}

impl ReleasedStrike {
    pub fn from_power(config: &PlayerCombatConfig, power: f32) -> Self {
        let power = if power.is_finite() {
            power.clamp(0.0, 1.0)
        } else {
            0.0
        };
        let normal = config.normal_damage as f32;
        let heavy = config.heavy_damage as f32;
        let heavy_knockback = if config.normal_damage > 0 {
            config.base_knockback * heavy / normal
        } else {
            config.base_knockback
        };

        Self {
            power,
            damage: lerp(normal, heavy, power).floor().max(0.0) as u32,
            knockback_force: lerp(config.base_knockback, heavy_knockback, power),
            cooldown: lerp(config.light_cooldown, config.heavy_cooldown, power),
        }
    }
}

fn lerp(from: f32, to: f32, t: f32) -> f32 {
    from + (to - from) * t
}

/// Player combat controller
#[derive(Component, Debug, Clone, Default, Reflect)]
#[reflect(Component)]
pub struct PlayerCombat {
    state: PlayerCombatState,
    config: PlayerCombatConfig,
    attack_was_held: bool,
}

impl PlayerCombat {
    pub fn new(config: PlayerCombatConfig) -> Self {
        Self {
            config,
            ..default()
        }
    }

    pub fn state(&self) -> PlayerCombatState {
        self.state
    }

    pub fn config(&self) -> &PlayerCombatConfig {
        &self.config
    }

    /// Скорость набора charge (units/sec) для данного ledger'а
    pub fn charge_rate(&self, ledger: &CombatLedger) -> f32 {
        if self.config.full_charge_time <= 0.0 {
            return ledger.config().max_charge;
        }
        ledger.config().max_charge / self.config.full_charge_time
    }

    /// Один тик контроллера
    pub fn step(
        &mut self,
        ctx: &ControlContext,
        input: &PlayerInput,
        ledger: &mut CombatLedger,
        pending: &mut Continuations,
        opponent: Option<&OpponentView>,
        effects: &mut ActorEffects,
    ) {
        let attack_down = input.attack_held && !self.attack_was_held;
        self.attack_was_held = input.attack_held;

        if ledger.is_defeated() || ledger.is_stunned() {
            return;
        }

        // Blocking - level-based: после stun состояние сверяется с кнопкой
        if input.block_held && self.state != PlayerCombatState::Blocking {
            if self.state == PlayerCombatState::Charging {
                self.cancel_charge(ctx.entity, ledger, pending, effects);
                crate::log(&format!("🛡️ {:?}: charge cancelled by block", ctx.entity));
            }
            self.state = PlayerCombatState::Blocking;
            ledger.begin_block();
            effects.cue(ctx.entity, AnimationCueKind::Block);
            effects.sound(ctx.entity, SoundClip::BlockStart);
            return;
        }

        if !input.block_held && self.state == PlayerCombatState::Blocking {
            self.state = PlayerCombatState::Idle;
            ledger.end_block();
            effects.cue(ctx.entity, AnimationCueKind::Idle);
            effects.sound(ctx.entity, SoundClip::BlockEnd);
            return;
        }

        match self.state {
            PlayerCombatState::Blocking => {}
            PlayerCombatState::Idle => {
                if attack_down && ledger.can_attack(ctx.now) {
                    self.state = PlayerCombatState::Charging;
                    ledger.consume_charge();
                    effects.cue(ctx.entity, AnimationCueKind::Charge);
                    effects.charge(ctx.entity, 0.0);
                }
            }
            PlayerCombatState::Charging => {
                if input.attack_held {
                    ledger.add_charge(self.charge_rate(ledger) * ctx.dt);
                    effects.charge(ctx.entity, ledger.charge_fraction());
                } else {
                    self.release(ctx, input, ledger, pending, opponent, effects);
                }
            }
        }
    }

    /// Charging → Idle: удар с параметрами по накопленному charge
    fn release(
        &mut self,
        ctx: &ControlContext,
        input: &PlayerInput,
        ledger: &mut CombatLedger,
        pending: &mut Continuations,
        opponent: Option<&OpponentView>,
        effects: &mut ActorEffects,
    ) {
        let strike = ReleasedStrike::from_power(&self.config, ledger.charge_fraction());
        ledger.consume_charge();
        ledger.mark_attack_used(ctx.now, strike.cooldown);
        self.state = PlayerCombatState::Idle;

        effects.charge(ctx.entity, 0.0);
        effects.cue(ctx.entity, AnimationCueKind::Punch);
        effects.sound(ctx.entity, SoundClip::Swing);

        let aim = if input.aim.length_squared() > f32::EPSILON {
            Some((StrikeTarget::FirstInLine, StrikeAim::Fixed(input.aim)))
        } else {
            opponent
                .filter(|view| !view.defeated)
                .map(|view| (StrikeTarget::Designated(view.entity), StrikeAim::TowardTarget))
        };

        let Some((target, aim)) = aim else {
            crate::log_warning(&format!(
                "⚠️ {:?}: release without aim or opponent, strike whiffs",
                ctx.entity
            ));
            return;
        };

        let due = ctx.now.after(self.config.release_latency);
        pending.schedule_strike(
            due,
            PendingStrike {
                target,
                damage: strike.damage,
                knockback_force: strike.knockback_force,
                reach: self.config.reach,
                aim,
                power: strike.power,
            },
        );
        effects.strikes.push(StrikeThrown {
            attacker: ctx.entity,
            damage: strike.damage,
            knockback_force: strike.knockback_force,
            due,
            recovery: strike.cooldown,
        });

        crate::log(&format!(
            "👊 Player {:?} released: power {:.2}, damage {}, cooldown {:.2}s",
            ctx.entity, strike.power, strike.damage, strike.cooldown
        ));
    }

    fn cancel_charge(
        &mut self,
        actor: Entity,
        ledger: &mut CombatLedger,
        pending: &mut Continuations,
        effects: &mut ActorEffects,
    ) {
        ledger.consume_charge();
        pending.cancel_strikes();
        self.state = PlayerCombatState::Idle;
        effects.charge(actor, 0.0);
    }
}

impl StunReceiver for PlayerCombat {
    fn on_stunned(
        &mut self,
        actor: Entity,
        duration: f32,
        ledger: &mut CombatLedger,
        pending: &mut Continuations,
        effects: &mut ActorEffects,
    ) {
        let cancelled = pending.cancel_strikes();
        if self.state == PlayerCombatState::Charging {
            self.cancel_charge(actor, ledger, pending, effects);
        }
        crate::log(&format!(
            "💫 Player {:?} stunned for {:.2}s (cancelled {} pending strike(s))",
            actor, duration, cancelled
        ));
    }

    fn on_defeated(&mut self, actor: Entity, effects: &mut ActorEffects) {
        // Ledger уже обнулил заряд, UI должен получить финальный 0
        if self.state == PlayerCombatState::Charging {
            effects.charge(actor, 0.0);
        }
        self.state = PlayerCombatState::Idle;
    }
}
