//! KNOCKOUT Simulation Core
//!
//! ECS-симуляция ближнего боя на Bevy 0.16 (strategic layer)
//!
//! HYBRID ARCHITECTURE:
//! - ECS = правила боя (ledger, damage pipeline, player/enemy контроллеры)
//! - Engine = всё остальное (physics, animation, audio, pathfinding, HUD)
//!
//! Core общается с движком только через компоненты (MovementCommand, PlayerInput,
//! Transform), события (cues, knockback, defeat, telemetry) и `GeometryProbe`.
//!
//! Один тик = `CombatTick` schedule:
//! Clock → Timers → Decide → Resolve → Locomotion → Cleanup

use bevy::ecs::schedule::ScheduleLabel;
use bevy::prelude::*;
use rand::SeedableRng;
use rand_chacha::ChaCha8Rng;

// Публичные модули
pub mod actor;
pub mod ai;
pub mod combat;
pub mod components;
pub mod config;
pub mod logger;
pub mod movement;
pub mod player;
pub mod shared;

// Re-export базовых типов для удобства
pub use actor::{spawn_enemy, spawn_match, spawn_obstacle, spawn_player, ActorPlugin, ActorRegistry, MatchRoster};
pub use ai::{AIConfig, EnemyBrain, EnemyPhase, EnemyStrikeConfig, PostComboPolicy};
pub use combat::{
    ActorDefeated, AnimationCue, AnimationCueKind, ChargeProgress, CombatPlugin, GeometryProbe,
    HealthChanged, HitProbe, KnockbackImpulse, PhaseChanged, PhaseKind, SoundClip, SoundCue,
    StrikeOutcome, StrikeResolved, StrikeThrown, VolumeProbe, DEATH_DESPAWN_DELAY,
};
pub use components::*;
pub use config::{ConfigError, EnemySetup, MatchConfig, ObstacleSetup, PlayerSetup};
pub use logger::{
    init_logger, log, log_error, log_info, log_warning, log_with_level, set_log_level, set_logger,
    LogLevel, LogPrinter,
};
pub use movement::HeadlessPlugin;
pub use player::{PlayerCombat, PlayerCombatConfig, PlayerCombatState, PlayerInput};
pub use shared::{SimClock, SimTime};

/// Schedule одного боевого тика (запускается из FixedUpdate или `step_world`)
#[derive(ScheduleLabel, Debug, Clone, PartialEq, Eq, Hash)]
pub struct CombatTick;

/// Фазы тика (выполняются строго последовательно)
#[derive(SystemSet, Debug, Clone, PartialEq, Eq, Hash)]
pub enum TickSet {
    /// SimClock += dt
    Clock,
    /// Stun / invulnerability countdown
    Timers,
    /// Player + enemy контроллеры (порядок ActorRegistry)
    Decide,
    /// Batch резолв созревших ударов
    Resolve,
    /// Исполнение MovementCommand / knockback (headless)
    Locomotion,
    /// Despawn, retarget
    Cleanup,
}

/// Длительность следующего тика (пишет `step_world` / FixedUpdate driver)
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct TickDelta(pub f32);

/// Главный plugin симуляции (объединяет все подсистемы)
pub struct SimulationPlugin;

impl Plugin for SimulationPlugin {
    fn build(&self, app: &mut App) {
        app.init_schedule(CombatTick)
            .init_resource::<SimClock>()
            .init_resource::<TickDelta>()
            .configure_sets(
                CombatTick,
                (
                    TickSet::Clock,
                    TickSet::Timers,
                    TickSet::Decide,
                    TickSet::Resolve,
                    TickSet::Locomotion,
                    TickSet::Cleanup,
                )
                    .chain(),
            )
            .add_systems(CombatTick, advance_clock.in_set(TickSet::Clock))
            // Fixed timestep 60Hz для simulation tick
            .insert_resource(Time::<Fixed>::from_hz(60.0))
            .add_systems(FixedUpdate, run_combat_tick);

        // Seed из create_headless_app не перетираем
        if !app.world().contains_resource::<DeterministicRng>() {
            app.insert_resource(DeterministicRng::new(42));
        }

        // Подсистемы (ECS strategic layer)
        app.add_plugins((CombatPlugin, ActorPlugin));
    }
}

/// Система: продвинуть SimClock на TickDelta
fn advance_clock(delta: Res<TickDelta>, mut clock: ResMut<SimClock>) {
    clock.advance(delta.0);
}

/// FixedUpdate driver: один CombatTick на fixed step
fn run_combat_tick(world: &mut World) {
    let dt = world.resource::<Time<Fixed>>().delta_secs();
    step_world(world, dt);
}

/// Один тик симуляции с явным dt (детерминированные тесты, headless runner)
pub fn step_world(world: &mut World, dt: f32) {
    world.insert_resource(TickDelta(dt));
    world.run_schedule(CombatTick);
}

/// Детерминистичный RNG resource (seeded)
#[derive(Resource)]
pub struct DeterministicRng {
    pub rng: ChaCha8Rng,
    pub seed: u64,
}

impl DeterministicRng {
    pub fn new(seed: u64) -> Self {
        Self {
            rng: ChaCha8Rng::seed_from_u64(seed),
            seed,
        }
    }
}

/// Создаёт minimal Bevy App для headless симуляции
pub fn create_headless_app(seed: u64) -> App {
    let mut app = App::new();
    init_logger();
    app.add_plugins(MinimalPlugins)
        .insert_resource(DeterministicRng::new(seed))
        .insert_resource(Time::<Fixed>::from_hz(60.0)); // 60Hz FixedUpdate

    app
}

/// Snapshot мира для сравнения детерминизма
pub fn world_snapshot<T: Component>(world: &mut World) -> Vec<u8>
where
    T: std::fmt::Debug,
{
    let mut snapshot = Vec::new();

    let mut query = world.query::<(Entity, &T)>();
    let mut entities: Vec<_> = query.iter(world).collect();

    // Сортируем по Entity ID для детерминизма
    entities.sort_by_key(|(entity, _)| entity.index());

    // Сериализуем в байты через Debug (простейший способ)
    for (entity, component) in entities {
        snapshot.extend_from_slice(&entity.index().to_le_bytes());
        snapshot.extend_from_slice(format!("{:?}", component).as_bytes());
    }

    snapshot
}
