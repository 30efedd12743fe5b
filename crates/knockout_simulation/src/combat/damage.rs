//! Damage resolution pipeline
//!
//! Удар проходит путь:
//! 1. Контроллер делает замах → `PendingStrike` в Continuations (через release latency)
//! 2. `resolve_due_strikes` забирает созревшие удары всех акторов одним batch'ем
//! 3. `trace_strike` - probe: первым на линии должна быть цель, в пределах reach
//! 4. `land_strike` - урон через ledger, knockback, stun callback, defeat
//!
//! Ресурсы атакующего (cooldown, charge) уже потрачены при замахе:
//! промах ничего не возвращает.

use bevy::prelude::*;

use crate::actor::ActorRegistry;
use crate::ai::EnemyBrain;
use crate::combat::events::{
    ActorDefeated, ActorEffects, AnimationCueKind, CombatFeed, HealthChanged, KnockbackImpulse,
    SoundClip, StrikeOutcome, StrikeResolved,
};
use crate::combat::probe::{ColliderTag, GeometryProbe, HitProbe, ProbeMask, ProbeVolume};
use crate::components::{
    Actor, ActorRole, CombatLedger, Dead, DespawnAfter, HitVolume, MovementCommand, Obstacle,
};
use crate::player::PlayerCombat;
use crate::shared::{Continuation, Continuations, SimClock, SimTime, StrikeAim, StrikeTarget};

/// Задержка despawn после смерти (death animation)
pub const DEATH_DESPAWN_DELAY: f32 = 1.2;

/// Полностью описанная атака на момент резолва
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct AttackIntent {
    pub attacker: Entity,
    pub target: StrikeTarget,
    pub damage: u32,
    pub knockback_force: f32,
    pub origin: Vec3,
    pub direction: Vec3,
    pub reach: f32,
}

/// Результат probe-фазы
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrikeTrace {
    Reached { target: Entity, point: Vec3 },
    Obstructed { obstacle: Entity },
    Missed,
}

/// Реакция актора на пропущенный удар
///
/// Pipeline вызывает синхронно, в момент попадания. Реализуют контроллеры
/// (PlayerCombat, EnemyBrain): отмена charge, pending ударов, переход в Hit.
pub trait StunReceiver {
    fn on_stunned(
        &mut self,
        actor: Entity,
        duration: f32,
        ledger: &mut CombatLedger,
        pending: &mut Continuations,
        effects: &mut ActorEffects,
    );

    fn on_defeated(&mut self, _actor: Entity, _effects: &mut ActorEffects) {}
}

/// Mutable view цели на время резолва одного удара
pub struct StrikeVictim<'a> {
    pub entity: Entity,
    pub role: ActorRole,
    pub position: Vec3,
    pub ledger: &'a mut CombatLedger,
    pub pending: &'a mut Continuations,
    pub movement: &'a mut MovementCommand,
    pub receiver: Option<&'a mut dyn StunReceiver>,
}

/// Что произошло с целью (для событий)
#[derive(Debug, Clone, PartialEq)]
pub struct LandedStrike {
    pub outcome: StrikeOutcome,
    pub knockback: Option<KnockbackImpulse>,
    pub health: Option<HealthChanged>,
    pub defeated: Option<ActorDefeated>,
}

/// Probe: цель должна быть первым collider'ом на линии удара, в пределах reach
pub fn trace_strike(probe: &dyn GeometryProbe, intent: &AttackIntent) -> StrikeTrace {
    let Some(hit) = probe.cast_ray(intent.origin, intent.direction, intent.reach, ProbeMask::STRIKE)
    else {
        return StrikeTrace::Missed;
    };

    match hit.tag {
        ColliderTag::Obstacle => StrikeTrace::Obstructed { obstacle: hit.entity },
        ColliderTag::Actor if hit.entity == intent.attacker => StrikeTrace::Missed,
        ColliderTag::Actor => match intent.target {
            StrikeTarget::Designated(target) if target != hit.entity => StrikeTrace::Missed,
            _ => StrikeTrace::Reached {
                target: hit.entity,
                point: hit.point,
            },
        },
    }
}

/// Применить удар к цели (probe уже подтвердил попадание)
///
/// Порядок: damage → knockback → stun (если урон > 0 и цель жива) → defeat (если 0 HP).
pub fn land_strike(
    intent: &AttackIntent,
    victim: StrikeVictim<'_>,
    effects: &mut ActorEffects,
) -> LandedStrike {
    let StrikeVictim {
        entity,
        role,
        position,
        ledger,
        pending,
        movement,
        mut receiver,
    } = victim;

    if !ledger.is_alive() {
        return LandedStrike {
            outcome: StrikeOutcome::Absorbed,
            knockback: None,
            health: None,
            defeated: None,
        };
    }

    let blocked = ledger.is_blocking();
    let applied = ledger.apply_damage(intent.damage, intent.origin);

    let knockback = Some(KnockbackImpulse {
        target: entity,
        direction: knockback_direction(intent.origin, position, intent.direction),
        magnitude: intent.knockback_force.max(0.0),
    });

    if applied == 0 {
        return LandedStrike {
            outcome: StrikeOutcome::Absorbed,
            knockback,
            health: None,
            defeated: None,
        };
    }

    let health = Some(HealthChanged {
        actor: entity,
        current: ledger.health(),
        max: ledger.max_health(),
    });
    effects.sound(entity, SoundClip::Impact);

    let mut defeated = None;
    if ledger.is_alive() {
        ledger.begin_stun();
        let duration = ledger.config().stun_duration;
        if let Some(receiver) = receiver.as_deref_mut() {
            receiver.on_stunned(entity, duration, ledger, pending, effects);
        }
        effects.cue(entity, AnimationCueKind::Hit);
    } else if ledger.mark_defeated() {
        pending.clear();
        *movement = MovementCommand::Stop;
        if let Some(receiver) = receiver.as_deref_mut() {
            receiver.on_defeated(entity, effects);
        }
        effects.cue(entity, AnimationCueKind::Die);
        effects.sound(entity, SoundClip::Death);
        defeated = Some(ActorDefeated {
            actor: entity,
            role,
            killer: Some(intent.attacker),
        });
    }

    LandedStrike {
        outcome: StrikeOutcome::Landed { applied, blocked },
        knockback,
        health,
        defeated,
    }
}

/// Knockback: от атакующего к цели в горизонтальной плоскости
fn knockback_direction(origin: Vec3, target: Vec3, fallback: Vec3) -> Vec3 {
    let flat = Vec3::new(target.x - origin.x, 0.0, target.z - origin.z);
    let dir = flat.normalize_or_zero();
    if dir != Vec3::ZERO {
        return dir;
    }
    fallback.normalize_or_zero()
}

/// Созревший удар в batch'е тика
struct DueStrike {
    due: SimTime,
    order: u32,
    seq: u64,
    attacker: Entity,
    action: Continuation,
}

/// Система: резолв всех созревших ударов тика
///
/// Удары собираются ДО резолва первого из них: stun, полученный внутри batch'а,
/// не отменяет уже созревший удар (одновременный обмен - оба попадания проходят).
/// Порядок резолва: (due, actor order, seq) - детерминирован.
pub fn resolve_due_strikes(
    clock: Res<SimClock>,
    registry: Res<ActorRegistry>,
    mut probe: ResMut<HitProbe>,
    mut actors: Query<(
        &Actor,
        &Transform,
        &HitVolume,
        &mut CombatLedger,
        &mut Continuations,
        &mut MovementCommand,
        Option<&mut PlayerCombat>,
        Option<&mut EnemyBrain>,
    )>,
    obstacles: Query<(Entity, &Transform, &Obstacle)>,
    mut feed: CombatFeed,
    mut commands: Commands,
) {
    let now = clock.now();

    let mut batch = Vec::new();
    for &entity in registry.order() {
        let Ok((actor, _, _, _, mut pending, ..)) = actors.get_mut(entity) else {
            continue;
        };
        if pending.is_empty() {
            continue;
        }
        for scheduled in pending.take_due(now) {
            batch.push(DueStrike {
                due: scheduled.due,
                order: actor.order,
                seq: scheduled.id.0,
                attacker: entity,
                action: scheduled.action,
            });
        }
    }

    if batch.is_empty() {
        return;
    }

    batch.sort_by(|a, b| {
        a.due
            .0
            .total_cmp(&b.due.0)
            .then(a.order.cmp(&b.order))
            .then(a.seq.cmp(&b.seq))
    });

    let Some(backend) = probe.backend_mut() else {
        crate::log_warning(&format!(
            "HitProbe: no geometry backend, dropping {} due strike(s)",
            batch.len()
        ));
        return;
    };

    // Снимок volumes: живые акторы в порядке registry, затем препятствия по entity index
    let mut volumes: Vec<ProbeVolume> = registry
        .order()
        .iter()
        .filter_map(|&entity| {
            let (_, transform, volume, ledger, ..) = actors.get(entity).ok()?;
            (!ledger.is_defeated()).then_some(ProbeVolume {
                entity,
                center: transform.translation,
                radius: volume.radius,
                tag: ColliderTag::Actor,
            })
        })
        .collect();
    let mut walls: Vec<ProbeVolume> = obstacles
        .iter()
        .map(|(entity, transform, obstacle)| ProbeVolume {
            entity,
            center: transform.translation,
            radius: obstacle.radius,
            tag: ColliderTag::Obstacle,
        })
        .collect();
    walls.sort_by_key(|volume| volume.entity.index());
    volumes.extend(walls);
    backend.sync_volumes(&volumes);

    for due in batch {
        let Continuation::Strike(strike) = due.action;

        let Ok((_, attacker_transform, ..)) = actors.get(due.attacker) else {
            continue;
        };
        let origin = attacker_transform.translation;

        let direction = match (strike.aim, strike.target) {
            (StrikeAim::Fixed(direction), _) => direction,
            (StrikeAim::TowardTarget, StrikeTarget::Designated(target)) => {
                match actors.get(target) {
                    Ok((_, target_transform, ..)) => target_transform.translation - origin,
                    Err(_) => {
                        crate::log_warning(&format!(
                            "⚠️ Strike from {:?}: target {:?} no longer exists",
                            due.attacker, target
                        ));
                        feed.strikes_resolved.write(StrikeResolved {
                            attacker: due.attacker,
                            target: None,
                            outcome: StrikeOutcome::Missed,
                        });
                        continue;
                    }
                }
            }
            (StrikeAim::TowardTarget, StrikeTarget::FirstInLine) => Vec3::ZERO,
        };

        let intent = AttackIntent {
            attacker: due.attacker,
            target: strike.target,
            damage: strike.damage,
            knockback_force: strike.knockback_force,
            origin,
            direction,
            reach: strike.reach,
        };

        let (target, outcome) = match trace_strike(&*backend, &intent) {
            StrikeTrace::Missed => (None, StrikeOutcome::Missed),
            StrikeTrace::Obstructed { obstacle } => (Some(obstacle), StrikeOutcome::Obstructed),
            StrikeTrace::Reached { target, .. } => {
                let mut effects = ActorEffects::default();
                let Ok((actor, transform, _, mut ledger, mut pending, mut movement, mut player, mut brain)) =
                    actors.get_mut(target)
                else {
                    continue;
                };

                let receiver: Option<&mut dyn StunReceiver> =
                    match (player.as_deref_mut(), brain.as_deref_mut()) {
                        (Some(player), _) => Some(player as &mut dyn StunReceiver),
                        (None, Some(brain)) => Some(brain as &mut dyn StunReceiver),
                        (None, None) => None,
                    };

                let landed = land_strike(
                    &intent,
                    StrikeVictim {
                        entity: target,
                        role: actor.role,
                        position: transform.translation,
                        ledger: &mut *ledger,
                        pending: &mut *pending,
                        movement: &mut *movement,
                        receiver,
                    },
                    &mut effects,
                );

                if let Some(impulse) = landed.knockback {
                    feed.knockback.write(impulse);
                }
                if let Some(changed) = landed.health {
                    feed.health.write(changed);
                }
                if let Some(defeated) = landed.defeated {
                    crate::log_info(&format!(
                        "💀 {} {:?} defeated by {:?}",
                        defeated.role.as_str(),
                        defeated.actor,
                        due.attacker
                    ));
                    feed.defeated.write(defeated);
                    commands.entity(target).insert((
                        Dead,
                        DespawnAfter {
                            at: now.after(DEATH_DESPAWN_DELAY),
                        },
                    ));
                }
                feed.flush(effects);

                (Some(target), landed.outcome)
            }
        };

        match outcome {
            StrikeOutcome::Landed { applied, blocked } => crate::log(&format!(
                "⚔️ {:?} → {:?}: {} damage{}",
                due.attacker,
                target,
                applied,
                if blocked { " (blocked)" } else { "" }
            )),
            other => crate::log(&format!("⚔️ {:?} → {:?}: {:?}", due.attacker, target, other)),
        }

        feed.strikes_resolved.write(StrikeResolved {
            attacker: due.attacker,
            target,
            outcome,
        });
    }
}

/// Система: countdown stun/invulnerability окон
pub fn tick_combat_windows(
    clock: Res<SimClock>,
    mut ledgers: Query<(Entity, &mut CombatLedger), Without<Dead>>,
) {
    let dt = clock.dt();
    for (entity, mut ledger) in ledgers.iter_mut() {
        if !ledger.is_stunned() && !ledger.is_invulnerable() {
            continue;
        }
        let transitions = ledger.tick_windows(dt);
        if transitions.stun_ended {
            crate::log(&format!("💫 {:?} recovered from stun", entity));
        }
    }
}

/// Система: despawn акторов после DespawnAfter
///
/// Despawn уносит Continuations вместе с entity: ничего отложенного не остаётся.
pub fn despawn_after_timeout(
    clock: Res<SimClock>,
    mut registry: ResMut<ActorRegistry>,
    corpses: Query<(Entity, &DespawnAfter)>,
    mut commands: Commands,
) {
    let now = clock.now();
    for (entity, despawn) in corpses.iter() {
        if now.has_reached(despawn.at) {
            registry.remove(entity);
            commands.entity(entity).despawn();
            crate::log(&format!("🗑️ Despawned {:?}", entity));
        }
    }
}
