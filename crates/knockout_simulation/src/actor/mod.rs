//! Actor domain - facade над участниками боя
//!
//! Актор = entity с Actor + CombatLedger + Continuations + один контроллер
//! (PlayerCombat или EnemyBrain). Facade отвечает за:
//! - регистрацию (ActorRegistry задаёт детерминированный порядок внутри тика)
//! - dispatch: каждый тик контроллер получает ledger, очередь и view противника
//! - retarget: поверженный/исчезнувший противник заменяется следующим живым

use bevy::prelude::*;

pub mod spawn;

pub use spawn::{spawn_enemy, spawn_match, spawn_obstacle, spawn_player, MatchRoster};

use crate::ai::{step_enemy, EnemyBrain};
use crate::combat::{ActorEffects, CombatFeed};
use crate::components::{Actor, CombatLedger, Dead, MovementCommand, Opponent};
use crate::player::{PlayerCombat, PlayerCombatState, PlayerInput};
use crate::shared::{Continuations, SimClock, SimTime};
use crate::{DeterministicRng, TickSet};

/// Порядок регистрации акторов (порядок обработки внутри тика)
#[derive(Resource, Debug, Clone, Default)]
pub struct ActorRegistry {
    order: Vec<Entity>,
    next_order: u32,
}

impl ActorRegistry {
    pub fn order(&self) -> &[Entity] {
        &self.order
    }

    /// Зарезервировать следующий порядковый номер
    pub fn next_order(&mut self) -> u32 {
        let order = self.next_order;
        self.next_order += 1;
        order
    }

    pub fn push(&mut self, entity: Entity) {
        if !self.order.contains(&entity) {
            self.order.push(entity);
        }
    }

    pub fn remove(&mut self, entity: Entity) {
        self.order.retain(|&registered| registered != entity);
    }

    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }
}

/// Контекст тика для контроллера
#[derive(Debug, Clone, Copy)]
pub struct ControlContext {
    pub entity: Entity,
    pub now: SimTime,
    pub dt: f32,
    pub position: Vec3,
}

/// Read-only снимок противника, который видит контроллер
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct OpponentView {
    pub entity: Entity,
    pub position: Vec3,
    /// Противник заряжает удар (видимый замах)
    pub charging: bool,
    pub blocking: bool,
    pub defeated: bool,
}

/// Actor Plugin: dispatch контроллеров + retarget
pub struct ActorPlugin;

impl Plugin for ActorPlugin {
    fn build(&self, app: &mut App) {
        app.init_resource::<ActorRegistry>();

        app.add_systems(
            crate::CombatTick,
            (
                run_controllers.in_set(TickSet::Decide),
                retarget_opponents.in_set(TickSet::Cleanup),
            ),
        );
    }
}

/// Система: один тик всех контроллеров в порядке ActorRegistry
///
/// View противника снимается перед шагом актора, поэтому актор, обработанный
/// позже, видит изменения, сделанные ранее в этом же тике.
pub fn run_controllers(
    clock: Res<SimClock>,
    registry: Res<ActorRegistry>,
    mut rng: ResMut<DeterministicRng>,
    mut actors: Query<(
        &Transform,
        &mut CombatLedger,
        &mut Continuations,
        &mut MovementCommand,
        Option<&Opponent>,
        Option<&PlayerInput>,
        Option<&mut PlayerCombat>,
        Option<&mut EnemyBrain>,
    )>,
    mut feed: CombatFeed,
) {
    let now = clock.now();
    let dt = clock.dt();

    for &entity in registry.order() {
        let Ok((.., opponent, _, _, _)) = actors.get(entity) else {
            continue;
        };
        let opponent_entity = opponent.map(|opponent| opponent.0);

        let opponent = opponent_entity.and_then(|target| {
            let (transform, ledger, _, _, _, _, player, _) = actors.get(target).ok()?;
            Some(OpponentView {
                entity: target,
                position: transform.translation,
                charging: player.is_some_and(|player| player.state() == PlayerCombatState::Charging),
                blocking: ledger.is_blocking(),
                defeated: ledger.is_defeated(),
            })
        });

        if let (Some(target), None) = (opponent_entity, opponent) {
            crate::log_warning(&format!(
                "⚠️ {:?}: opponent {:?} is gone, acting without target",
                entity, target
            ));
        }

        let Ok((transform, mut ledger, mut pending, mut movement, _, input, player, brain)) =
            actors.get_mut(entity)
        else {
            continue;
        };
        if ledger.is_defeated() {
            continue;
        }

        let ctx = ControlContext {
            entity,
            now,
            dt,
            position: transform.translation,
        };
        let mut effects = ActorEffects::default();

        if let Some(mut player) = player {
            let input = input.copied().unwrap_or_default();
            player.step(
                &ctx,
                &input,
                &mut ledger,
                &mut pending,
                opponent.as_ref(),
                &mut effects,
            );
        } else if let Some(mut brain) = brain {
            step_enemy(
                &mut brain,
                &ctx,
                &mut ledger,
                &mut pending,
                &mut movement,
                opponent.as_ref(),
                &mut rng.rng,
                &mut effects,
            );
        }

        feed.flush(effects);
    }
}

/// Система: заменить поверженного/исчезнувшего противника следующим живым
pub fn retarget_opponents(
    registry: Res<ActorRegistry>,
    candidates: Query<(&Actor, &CombatLedger)>,
    seekers: Query<(&Actor, Option<&Opponent>), Without<Dead>>,
    mut commands: Commands,
) {
    let is_viable = |entity: Entity| {
        candidates
            .get(entity)
            .is_ok_and(|(_, ledger)| !ledger.is_defeated())
    };

    for &entity in registry.order() {
        let Ok((actor, opponent)) = seekers.get(entity) else {
            continue;
        };
        if opponent.is_some_and(|opponent| is_viable(opponent.0)) {
            continue;
        }

        let replacement = registry.order().iter().copied().find(|&candidate| {
            candidate != entity
                && candidates
                    .get(candidate)
                    .is_ok_and(|(other, ledger)| other.role != actor.role && !ledger.is_defeated())
        });

        match (replacement, opponent) {
            (Some(next), _) => {
                crate::log(&format!("🎯 {:?} now targets {:?}", entity, next));
                commands.entity(entity).insert(Opponent(next));
            }
            (None, Some(_)) => {
                crate::log(&format!("🎯 {:?} has no opponents left", entity));
                commands.entity(entity).remove::<Opponent>();
            }
            (None, None) => {}
        }
    }
}
