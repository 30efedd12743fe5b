//! Тесты детерминизма
//!
//! Один и тот же seed + один и тот же dt + один и тот же input → идентичный матч

use bevy::prelude::*;
use knockout_simulation::*;

const DT: f32 = 1.0 / 60.0;

/// Результат прогона: снапшоты компонентов + лог резолва ударов
#[derive(Debug, PartialEq)]
struct RunRecord {
    ledgers: Vec<u8>,
    transforms: Vec<u8>,
    phases: Vec<u8>,
    strikes: Vec<String>,
}

fn run_match(seed: u64, ticks: u32) -> RunRecord {
    let mut app = create_headless_app(seed);
    app.add_plugins((SimulationPlugin, HeadlessPlugin));

    let config = MatchConfig {
        seed,
        enemies: vec![
            EnemySetup {
                position: [4.0, 0.0, 0.0],
                ..default()
            },
            EnemySetup {
                position: [-5.0, 0.0, 2.0],
                ai: AIConfig {
                    post_combo: PostComboPolicy::Weighted,
                    preempt_chance: 0.5,
                    ..default()
                },
                ..default()
            },
        ],
        ..default()
    };

    let world = app.world_mut();
    let roster = spawn_match(world, &config);
    let mut strikes = Vec::new();

    for tick in 0..ticks {
        if let Some(mut input) = world.get_mut::<PlayerInput>(roster.player) {
            input.attack_held = tick % 50 < 25;
            input.block_held = tick % 200 > 170;
        }
        step_world(world, DT);

        let tick_now = world.resource::<SimClock>().tick();
        strikes.extend(
            world
                .resource_mut::<Events<StrikeResolved>>()
                .drain()
                .map(|resolved| format!("{}:{:?}", tick_now, resolved)),
        );
    }

    RunRecord {
        ledgers: world_snapshot::<CombatLedger>(world),
        transforms: world_snapshot::<Transform>(world),
        phases: world_snapshot::<EnemyBrain>(world),
        strikes,
    }
}

#[test]
fn test_determinism_same_seed() {
    const SEED: u64 = 12345;
    const TICK_COUNT: u32 = 1200;

    let first = run_match(SEED, TICK_COUNT);
    let second = run_match(SEED, TICK_COUNT);

    assert!(!first.strikes.is_empty(), "no strikes resolved in 20s");
    assert_eq!(
        first, second,
        "Симуляция с одинаковым seed ({}) дала разные результаты!",
        SEED
    );
}

#[test]
fn test_determinism_multiple_runs() {
    const SEED: u64 = 42;
    const TICK_COUNT: u32 = 600;

    // Запускаем 3 раза - все должны быть идентичны
    let runs: Vec<_> = (0..3).map(|_| run_match(SEED, TICK_COUNT)).collect();

    for (i, run) in runs.iter().enumerate().skip(1) {
        assert_eq!(runs[0], *run, "Прогон {} дал результат отличный от прогона 0", i);
    }
}

#[test]
fn test_different_seed_still_valid() {
    let run = run_match(777, 600);
    assert!(!run.ledgers.is_empty());
    assert!(run
        .strikes
        .iter()
        .all(|line| !line.contains("Landed { applied: 0")));
}

#[test]
fn test_step_world_advances_clock_exactly() {
    let mut app = create_headless_app(1);
    app.add_plugins(SimulationPlugin);
    let world = app.world_mut();

    for _ in 0..21 {
        step_world(world, DT);
    }

    let clock = world.resource::<SimClock>();
    assert_eq!(clock.tick(), 21);
    assert!((clock.now().seconds() - 21.0 * DT as f64).abs() < 1e-9);
}
