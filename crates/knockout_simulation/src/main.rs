//! Headless симуляция KNOCKOUT
//!
//! Запускает матч из RON конфига без рендера: игроком управляет простой
//! autopilot (подходит, заряжает удар, отпускает), враги - EnemyBrain.

use std::path::PathBuf;
use std::process::ExitCode;

use bevy::prelude::*;
use clap::Parser;
use knockout_simulation::*;

#[derive(Parser, Debug)]
#[command(name = "knockout_simulation", about = "Headless KNOCKOUT combat match")]
struct Args {
    /// RON файл с MatchConfig (по умолчанию - встроенный баланс)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Переопределить seed из конфига
    #[arg(short, long)]
    seed: Option<u64>,

    /// debug / info / warning / error
    #[arg(long, default_value = "info")]
    log_level: String,

    /// Жёсткий лимит тиков (поверх max_duration)
    #[arg(long)]
    max_ticks: Option<u64>,

    /// Сколько секунд игрок держит attack перед release
    #[arg(long, default_value_t = 0.6)]
    charge_hold: f32,
}

/// Autopilot игрока: фазы ввода по таймеру
struct Autopilot {
    charge_hold: f32,
    held_for: f32,
}

impl Autopilot {
    fn drive(&mut self, world: &mut World, player: Entity, dt: f32) {
        let Some(opponent) = world.get::<Opponent>(player).map(|opponent| opponent.0) else {
            if let Some(mut input) = world.get_mut::<PlayerInput>(player) {
                *input = PlayerInput::default();
            }
            return;
        };
        let (Some(own), Some(target)) = (
            world.get::<Transform>(player).map(|t| t.translation),
            world.get::<Transform>(opponent).map(|t| t.translation),
        ) else {
            return;
        };
        let reach = world
            .get::<PlayerCombat>(player)
            .map(|combat| combat.config().reach)
            .unwrap_or(2.5);
        let can_attack = world
            .get::<CombatLedger>(player)
            .is_some_and(|ledger| ledger.cooldown_elapsed(world.resource::<SimClock>().now()));

        let distance = (target - own).with_y(0.0).length();
        let command = if distance > reach * 0.8 {
            MovementCommand::MoveToPosition {
                target,
                speed: 3.5,
            }
        } else {
            MovementCommand::Stop
        };
        if let Some(mut movement) = world.get_mut::<MovementCommand>(player) {
            *movement = command;
        }

        let attack_held = if self.held_for > 0.0 {
            self.held_for += dt;
            self.held_for < self.charge_hold
        } else {
            distance <= reach && can_attack
        };
        if attack_held && self.held_for == 0.0 {
            self.held_for = dt;
        } else if !attack_held {
            self.held_for = 0.0;
        }

        if let Some(mut input) = world.get_mut::<PlayerInput>(player) {
            input.attack_held = attack_held;
            input.block_held = false;
            input.aim = Vec3::ZERO;
        }
    }
}

fn main() -> ExitCode {
    let args = Args::parse();

    init_logger();
    match LogLevel::parse(&args.log_level) {
        Some(level) => set_log_level(level),
        None => log_warning(&format!("Unknown log level '{}', using debug", args.log_level)),
    }

    let mut config = match &args.config {
        Some(path) => match MatchConfig::load_from_file(path) {
            Ok(config) => config,
            Err(err) => {
                log_error(&format!("❌ {}", err));
                return ExitCode::FAILURE;
            }
        },
        None => MatchConfig::default(),
    };
    if let Some(seed) = args.seed {
        config.seed = seed;
    }

    log_info(&format!(
        "Starting KNOCKOUT headless match (seed: {}, {} enemies, {} Hz)",
        config.seed,
        config.enemies.len(),
        config.tick_rate
    ));

    let mut app = create_headless_app(config.seed);
    app.add_plugins((SimulationPlugin, HeadlessPlugin));
    let roster = spawn_match(app.world_mut(), &config);

    let dt = config.tick_dt();
    let duration_ticks = (config.max_duration / dt).ceil() as u64;
    let max_ticks = args.max_ticks.map_or(duration_ticks, |limit| limit.min(duration_ticks));

    let mut autopilot = Autopilot {
        charge_hold: args.charge_hold.max(0.0),
        held_for: 0.0,
    };
    let mut defeated = Vec::new();

    for tick in 0..max_ticks {
        let world = app.world_mut();
        autopilot.drive(world, roster.player, dt);
        step_world(world, dt);

        defeated.extend(world.resource_mut::<Events<ActorDefeated>>().drain());
        // Presentation события в headless режиме никто не читает
        world.resource_mut::<Events<AnimationCue>>().clear();
        world.resource_mut::<Events<SoundCue>>().clear();
        world.resource_mut::<Events<ChargeProgress>>().clear();
        world.resource_mut::<Events<HealthChanged>>().clear();
        world.resource_mut::<Events<StrikeThrown>>().clear();
        world.resource_mut::<Events<StrikeResolved>>().clear();
        world.resource_mut::<Events<PhaseChanged>>().clear();
        world.resource_mut::<Events<KnockbackImpulse>>().clear();

        if defeated.iter().any(|event| event.actor == roster.player) {
            log_info(&format!("Tick {}: player defeated", tick));
            break;
        }
        let enemies_down = roster
            .enemies
            .iter()
            .all(|enemy| defeated.iter().any(|event| event.actor == *enemy));
        if enemies_down {
            log_info(&format!("Tick {}: all enemies defeated", tick));
            break;
        }
    }

    let world = app.world();
    let health = |entity: Entity| {
        world
            .get::<CombatLedger>(entity)
            .map_or(0, |ledger| ledger.health())
    };
    println!(
        "Match over at t={:.2}s: player {} HP",
        world.resource::<SimClock>().now().seconds(),
        health(roster.player)
    );
    for enemy in &roster.enemies {
        println!("  enemy {:?}: {} HP", enemy, health(*enemy));
    }

    ExitCode::SUCCESS
}
