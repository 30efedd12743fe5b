//! Spawn helpers: player, enemies, obstacles, целый матч из MatchConfig

use bevy::prelude::*;

use crate::actor::ActorRegistry;
use crate::ai::{roll_range, EnemyBrain, EnemyPhase};
use crate::combat::HealthChanged;
use crate::components::{Actor, ActorRole, CombatLedger, HitVolume, Obstacle, Opponent};
use crate::config::{EnemySetup, MatchConfig, ObstacleSetup, PlayerSetup};
use crate::player::{PlayerCombat, PlayerInput};
use crate::DeterministicRng;

/// Entities матча после спавна
#[derive(Debug, Clone, PartialEq)]
pub struct MatchRoster {
    pub player: Entity,
    pub enemies: Vec<Entity>,
    pub obstacles: Vec<Entity>,
}

fn register(world: &mut World) -> u32 {
    world
        .get_resource_or_insert_with(ActorRegistry::default)
        .next_order()
}

fn announce_health(world: &mut World, entity: Entity, ledger: &CombatLedger) {
    if let Some(mut events) = world.get_resource_mut::<Events<HealthChanged>>() {
        events.send(HealthChanged {
            actor: entity,
            current: ledger.health(),
            max: ledger.max_health(),
        });
    }
}

pub fn spawn_player(world: &mut World, setup: &PlayerSetup) -> Entity {
    let order = register(world);
    let ledger = CombatLedger::new(setup.ledger);
    let entity = world
        .spawn((
            Actor {
                role: ActorRole::Player,
                order,
            },
            Transform::from_translation(Vec3::from_array(setup.position)),
            HitVolume {
                radius: setup.hit_radius,
            },
            ledger.clone(),
            PlayerCombat::new(setup.combat),
            PlayerInput::default(),
        ))
        .id();
    world.resource_mut::<ActorRegistry>().push(entity);
    announce_health(world, entity, &ledger);

    crate::log_info(&format!(
        "🥊 Player {:?} spawned at {:?} ({} HP)",
        entity,
        setup.position,
        ledger.max_health()
    ));
    entity
}

/// Враг стартует в Probe со случайной длительностью (через DeterministicRng)
pub fn spawn_enemy(world: &mut World, setup: &EnemySetup, opponent: Option<Entity>) -> Entity {
    let order = register(world);
    let ledger = CombatLedger::new(setup.ledger);
    let probe = world
        .get_resource_mut::<DeterministicRng>()
        .map(|mut rng| roll_range(&mut rng.rng, setup.ai.probe_duration))
        .unwrap_or(setup.ai.probe_duration.0);
    let brain = EnemyBrain::new(setup.ai.clone(), setup.strike)
        .with_phase(EnemyPhase::Probe { remaining: probe });

    let mut spawned = world.spawn((
        Actor {
            role: ActorRole::Enemy,
            order,
        },
        Transform::from_translation(Vec3::from_array(setup.position)),
        HitVolume {
            radius: setup.hit_radius,
        },
        ledger.clone(),
        brain,
    ));
    if let Some(opponent) = opponent {
        spawned.insert(Opponent(opponent));
    }
    let entity = spawned.id();
    world.resource_mut::<ActorRegistry>().push(entity);
    announce_health(world, entity, &ledger);

    crate::log_info(&format!(
        "👹 Enemy {:?} spawned at {:?} ({} HP)",
        entity,
        setup.position,
        ledger.max_health()
    ));
    entity
}

pub fn spawn_obstacle(world: &mut World, setup: &ObstacleSetup) -> Entity {
    world
        .spawn((
            Transform::from_translation(Vec3::from_array(setup.position)),
            Obstacle {
                radius: setup.radius,
            },
        ))
        .id()
}

/// Спавн всего матча: player → enemies (в порядке конфига) → obstacles
pub fn spawn_match(world: &mut World, config: &MatchConfig) -> MatchRoster {
    let player = spawn_player(world, &config.player);
    let enemies: Vec<Entity> = config
        .enemies
        .iter()
        .map(|setup| spawn_enemy(world, setup, Some(player)))
        .collect();
    if let Some(&first) = enemies.first() {
        world.entity_mut(player).insert(Opponent(first));
    }
    let obstacles = config
        .obstacles
        .iter()
        .map(|setup| spawn_obstacle(world, setup))
        .collect();

    MatchRoster {
        player,
        enemies,
        obstacles,
    }
}
