//! Enemy FSM step (phase transitions + combo strikes).
//!
//! Порядок решений внутри тика:
//! 1. Hit - только countdown, никаких решений
//! 2. Chase - цель дальше chase_threshold (перекрывает всё, кроме Hit)
//! 3. Combo - Probe/Approach + цель в attack_reach + ledger.can_attack
//! 4. Preempt - реакция на замах цели (Block/Dodge)
//! 5. Логика текущей фазы (таймеры, удары, движение)

use bevy::prelude::*;
use rand::Rng;

use crate::actor::{ControlContext, OpponentView};
use crate::ai::components::{EnemyBrain, EnemyPhase};
use crate::ai::systems::movement::{flat_distance, phase_movement};
use crate::ai::systems::reactions::{choose_post_combo_phase, observe_windup};
use crate::combat::{ActorEffects, AnimationCueKind, SoundClip, StrikeThrown};
use crate::components::{CombatLedger, MovementCommand};
use crate::shared::{tick_down, Continuations, PendingStrike, StrikeAim, StrikeTarget};

/// Случайное значение в [min, max] (min при вырожденном диапазоне)
pub fn roll_range(rng: &mut impl Rng, (min, max): (f32, f32)) -> f32 {
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min.max(0.0)
    }
}

/// Количество ударов серии в [combo_min, combo_max], минимум 1
pub fn roll_combo_length(brain: &EnemyBrain, rng: &mut impl Rng) -> u32 {
    let min = brain.config.combo_min.max(1);
    let max = brain.config.combo_max.max(min);
    if max > min {
        rng.gen_range(min..=max)
    } else {
        min
    }
}

impl EnemyBrain {
    /// Смена фазы + side effects входа/выхода (block flag, cues, PhaseChanged)
    pub(crate) fn transition(
        &mut self,
        actor: Entity,
        to: EnemyPhase,
        ledger: &mut CombatLedger,
        effects: &mut ActorEffects,
    ) {
        let from = self.phase;

        if matches!(from, EnemyPhase::Block { .. }) && !matches!(to, EnemyPhase::Block { .. }) {
            if ledger.end_block() {
                effects.sound(actor, SoundClip::BlockEnd);
            }
        }

        match to {
            EnemyPhase::Block { .. } => {
                if ledger.begin_block() {
                    effects.sound(actor, SoundClip::BlockStart);
                }
                effects.cue(actor, AnimationCueKind::Block);
            }
            EnemyPhase::Chase | EnemyPhase::Approach => effects.cue(actor, AnimationCueKind::Run),
            EnemyPhase::Evade { .. } => effects.cue(actor, AnimationCueKind::Retreat),
            EnemyPhase::Dodge { .. } => effects.cue(actor, AnimationCueKind::Dodge),
            EnemyPhase::Probe { .. } => effects.cue(actor, AnimationCueKind::Idle),
            // Hit cue шлёт pipeline, Combo - каждый Punch
            EnemyPhase::Hit { .. } | EnemyPhase::Combo { .. } => {}
        }

        self.phase = to;
        effects.phase(actor, from.kind(), to.kind());
        if from.kind() != to.kind() {
            crate::log(&format!(
                "🧠 Enemy {:?}: {:?} → {:?}",
                actor,
                from.kind(),
                to.kind()
            ));
        }
    }

    pub(crate) fn enter_probe(
        &mut self,
        actor: Entity,
        ledger: &mut CombatLedger,
        rng: &mut impl Rng,
        effects: &mut ActorEffects,
    ) {
        let remaining = roll_range(rng, self.config.probe_duration);
        self.transition(actor, EnemyPhase::Probe { remaining }, ledger, effects);
    }

    fn enter_combo(
        &mut self,
        actor: Entity,
        ledger: &mut CombatLedger,
        rng: &mut impl Rng,
        effects: &mut ActorEffects,
    ) {
        let remaining_strikes = roll_combo_length(self, rng);
        self.transition(actor, EnemyPhase::Combo { remaining_strikes }, ledger, effects);
    }
}

/// Один тик enemy controller'а
#[allow(clippy::too_many_arguments)]
pub fn step_enemy(
    brain: &mut EnemyBrain,
    ctx: &ControlContext,
    ledger: &mut CombatLedger,
    pending: &mut Continuations,
    movement: &mut MovementCommand,
    opponent: Option<&OpponentView>,
    rng: &mut impl Rng,
    effects: &mut ActorEffects,
) {
    if ledger.is_defeated() {
        return;
    }

    // 1. Hit: ждём конца stun reaction
    if let EnemyPhase::Hit { remaining } = brain.phase {
        let remaining = tick_down(remaining, ctx.dt);
        *movement = MovementCommand::Stop;
        if remaining > 0.0 {
            brain.phase = EnemyPhase::Hit { remaining };
        } else {
            brain.enter_probe(ctx.entity, ledger, rng, effects);
        }
        return;
    }

    let Some(target) = opponent.filter(|view| !view.defeated) else {
        // Цели нет - стоим, блок не держим
        if !matches!(brain.phase, EnemyPhase::Probe { .. }) {
            brain.transition(ctx.entity, EnemyPhase::Probe { remaining: 0.0 }, ledger, effects);
        }
        *movement = MovementCommand::Stop;
        return;
    };

    let distance = flat_distance(ctx.position, target.position);

    // 2. Chase
    if brain.config.chase_enabled && distance > brain.config.chase_threshold {
        if brain.phase != EnemyPhase::Chase {
            brain.transition(ctx.entity, EnemyPhase::Chase, ledger, effects);
        }
    } else if brain.phase == EnemyPhase::Chase {
        brain.transition(ctx.entity, EnemyPhase::Approach, ledger, effects);
    }

    // 3. Combo
    if brain.phase.is_neutral()
        && distance <= brain.config.attack_reach
        && ledger.can_attack(ctx.now)
    {
        brain.enter_combo(ctx.entity, ledger, rng, effects);
    }

    // 4. Preempt на замах цели
    observe_windup(brain, ctx, ledger, target, distance, rng, effects);

    // 5. Текущая фаза
    match brain.phase {
        EnemyPhase::Probe { remaining } => {
            let remaining = tick_down(remaining, ctx.dt);
            if remaining > 0.0 {
                brain.phase = EnemyPhase::Probe { remaining };
            } else if distance > brain.config.attack_reach {
                brain.transition(ctx.entity, EnemyPhase::Approach, ledger, effects);
            } else {
                brain.enter_combo(ctx.entity, ledger, rng, effects);
            }
        }
        EnemyPhase::Combo { remaining_strikes } => {
            run_combo(brain, ctx, ledger, pending, target, remaining_strikes, rng, effects);
        }
        EnemyPhase::Block {
            remaining,
            retreat_after,
        } => {
            let remaining = tick_down(remaining, ctx.dt);
            if remaining > 0.0 {
                brain.phase = EnemyPhase::Block {
                    remaining,
                    retreat_after,
                };
            } else if retreat_after && brain.config.evade_enabled {
                let remaining = brain.config.evade_duration;
                brain.transition(ctx.entity, EnemyPhase::Evade { remaining }, ledger, effects);
            } else {
                brain.enter_probe(ctx.entity, ledger, rng, effects);
            }
        }
        EnemyPhase::Evade { remaining } => {
            let remaining = tick_down(remaining, ctx.dt);
            if remaining > 0.0 {
                brain.phase = EnemyPhase::Evade { remaining };
            } else {
                brain.enter_probe(ctx.entity, ledger, rng, effects);
            }
        }
        EnemyPhase::Dodge { remaining, side } => {
            let remaining = tick_down(remaining, ctx.dt);
            if remaining > 0.0 {
                brain.phase = EnemyPhase::Dodge { remaining, side };
            } else {
                brain.enter_probe(ctx.entity, ledger, rng, effects);
            }
        }
        EnemyPhase::Chase | EnemyPhase::Approach | EnemyPhase::Hit { .. } => {}
    }

    *movement = phase_movement(
        &brain.phase,
        ctx.position,
        target.position,
        &brain.config,
        ctx.now,
    );
}

/// Combo: удар когда ledger готов; после последнего - recovery и post-combo фаза
#[allow(clippy::too_many_arguments)]
fn run_combo(
    brain: &mut EnemyBrain,
    ctx: &ControlContext,
    ledger: &mut CombatLedger,
    pending: &mut Continuations,
    target: &OpponentView,
    remaining_strikes: u32,
    rng: &mut impl Rng,
    effects: &mut ActorEffects,
) {
    if remaining_strikes > 0 {
        if !ledger.can_attack(ctx.now) {
            return;
        }

        let gap = roll_range(rng, brain.config.combo_gap);
        let due = ctx.now.after(brain.strike.release_latency);
        pending.schedule_strike(
            due,
            PendingStrike {
                target: StrikeTarget::Designated(target.entity),
                damage: brain.strike.damage,
                knockback_force: brain.strike.hit_force,
                reach: brain.strike.reach,
                aim: StrikeAim::TowardTarget,
                power: 0.0,
            },
        );
        ledger.mark_attack_used(ctx.now, gap);
        brain.phase = EnemyPhase::Combo {
            remaining_strikes: remaining_strikes - 1,
        };

        effects.cue(ctx.entity, AnimationCueKind::Punch);
        effects.sound(ctx.entity, SoundClip::Swing);
        effects.strikes.push(StrikeThrown {
            attacker: ctx.entity,
            damage: brain.strike.damage,
            knockback_force: brain.strike.hit_force,
            due,
            recovery: gap,
        });
        return;
    }

    // Серия закончена: ждём последний gap, затем полный recovery
    if !ledger.cooldown_elapsed(ctx.now) {
        return;
    }
    ledger.mark_attack_used(ctx.now, brain.strike.cooldown);
    let next = choose_post_combo_phase(brain, rng);
    match next {
        Some(phase) => brain.transition(ctx.entity, phase, ledger, effects),
        None => brain.enter_probe(ctx.entity, ledger, rng, effects),
    }
}
