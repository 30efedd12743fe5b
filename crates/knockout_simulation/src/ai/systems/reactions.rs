//! AI reactions (stun, wind-up read, post-combo choice).

use bevy::prelude::*;
use rand::Rng;

use crate::actor::{ControlContext, OpponentView};
use crate::ai::components::{EnemyBrain, EnemyPhase, PostComboPolicy};
use crate::combat::{ActorEffects, StunReceiver};
use crate::components::CombatLedger;
use crate::shared::Continuations;

/// Reaction на замах цели: Block или Dodge с вероятностью preempt_chance
///
/// Одна попытка на замах: как только цель начала charge в пределах
/// preempt_radius, бросаем кубик один раз. Новый замах → новая попытка.
#[allow(clippy::too_many_arguments)]
pub fn observe_windup(
    brain: &mut EnemyBrain,
    ctx: &ControlContext,
    ledger: &mut CombatLedger,
    target: &OpponentView,
    distance: f32,
    rng: &mut impl Rng,
    effects: &mut ActorEffects,
) {
    if !target.charging {
        brain.windup_seen = false;
        return;
    }
    if brain.windup_seen || distance > brain.config.preempt_radius {
        return;
    }
    brain.windup_seen = true;

    if !brain.phase.is_neutral() {
        return;
    }

    let config = &brain.config;
    let (can_block, can_dodge) = (config.block_enabled, config.dodge_enabled);
    if !can_block && !can_dodge {
        return;
    }
    if rng.gen::<f32>() >= config.preempt_chance {
        return;
    }

    let block = match (can_block, can_dodge) {
        (true, true) => rng.gen_bool(0.5),
        (block, _) => block,
    };

    let next = if block {
        EnemyPhase::Block {
            remaining: config.block_duration,
            retreat_after: false,
        }
    } else {
        let side = if rng.gen_bool(0.5) { 1.0 } else { -1.0 };
        EnemyPhase::Dodge {
            remaining: config.dodge_duration,
            side,
        }
    };

    crate::log(&format!(
        "👀 Enemy {:?} reads wind-up of {:?} → {:?}",
        ctx.entity,
        target.entity,
        next.kind()
    ));
    brain.transition(ctx.entity, next, ledger, effects);
}

/// Фаза после завершённой серии (None → Probe)
pub fn choose_post_combo_phase(brain: &EnemyBrain, rng: &mut impl Rng) -> Option<EnemyPhase> {
    let config = &brain.config;
    let evade = EnemyPhase::Evade {
        remaining: config.evade_duration,
    };
    let block_retreat = EnemyPhase::Block {
        remaining: config.block_duration,
        retreat_after: true,
    };

    match config.post_combo {
        PostComboPolicy::Probe => None,
        PostComboPolicy::Evade => config.evade_enabled.then_some(evade),
        PostComboPolicy::BlockRetreat => config.block_enabled.then_some(block_retreat),
        PostComboPolicy::Weighted => {
            let (probe, block, retreat) = config.post_combo_weights;
            let block = if config.block_enabled { block.max(0.0) } else { 0.0 };
            let retreat = if config.evade_enabled { retreat.max(0.0) } else { 0.0 };
            let total = probe.max(0.0) + block + retreat;
            if total <= 0.0 {
                return None;
            }
            let roll = rng.gen::<f32>() * total;
            if roll < probe.max(0.0) {
                None
            } else if roll < probe.max(0.0) + block {
                Some(block_retreat)
            } else {
                Some(evade)
            }
        }
    }
}

impl StunReceiver for EnemyBrain {
    fn on_stunned(
        &mut self,
        actor: Entity,
        duration: f32,
        ledger: &mut CombatLedger,
        pending: &mut Continuations,
        effects: &mut ActorEffects,
    ) {
        // Серия прервана: оставшиеся удары не выполняются
        let cancelled = pending.cancel_strikes();
        self.transition(actor, EnemyPhase::Hit { remaining: duration }, ledger, effects);
        crate::log(&format!(
            "💫 Enemy {:?} stunned for {:.2}s (cancelled {} pending strike(s))",
            actor, duration, cancelled
        ));
    }
}
