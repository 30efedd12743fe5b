//! AI movement: EnemyPhase → MovementCommand
//!
//! Все точки считаются в горизонтальной плоскости (y берётся от цели/себя).
//! Locomotion снаружи сам решает, как туда дойти.

use bevy::prelude::*;

use crate::ai::components::{AIConfig, EnemyPhase};
use crate::components::MovementCommand;
use crate::shared::SimTime;

/// Длина шага для retreat/sidestep точки (пересчитывается каждый тик)
pub const EVASION_STEP: f32 = 1.0;

/// Горизонтальная проекция вектора
pub fn flat(v: Vec3) -> Vec3 {
    Vec3::new(v.x, 0.0, v.z)
}

/// Горизонтальная дистанция между акторами
pub fn flat_distance(a: Vec3, b: Vec3) -> f32 {
    flat(b - a).length()
}

/// Направление "от цели ко мне" (fallback +X если стоим в одной точке)
fn away_from(own: Vec3, target: Vec3) -> Vec3 {
    flat(own - target).normalize_or(Vec3::X)
}

/// Probe: точка на орбите ideal_distance + тангенциальное покачивание
pub fn orbit_point(own: Vec3, target: Vec3, config: &AIConfig, now: SimTime) -> Vec3 {
    let away = away_from(own, target);
    let tangent = Vec3::Y.cross(away);
    let sway = (now.seconds() as f32 * config.orbit_frequency).sin();
    target + away * config.ideal_distance + tangent * sway
}

/// Approach: точка чуть ближе attack reach
pub fn approach_point(own: Vec3, target: Vec3, config: &AIConfig) -> Vec3 {
    let toward = -away_from(own, target);
    target - toward * (config.attack_reach * 0.8)
}

/// Evade: шаг назад от цели
pub fn retreat_point(own: Vec3, target: Vec3, step: f32) -> Vec3 {
    own + away_from(own, target) * step
}

/// Dodge: шаг вбок (side = ±1)
pub fn sidestep_point(own: Vec3, target: Vec3, side: f32, step: f32) -> Vec3 {
    let tangent = Vec3::Y.cross(away_from(own, target));
    own + tangent * side.signum() * step
}

/// Команда движения для текущей фазы
pub fn phase_movement(
    phase: &EnemyPhase,
    own: Vec3,
    target: Vec3,
    config: &AIConfig,
    now: SimTime,
) -> MovementCommand {
    match *phase {
        EnemyPhase::Probe { .. } => MovementCommand::MoveToPosition {
            target: orbit_point(own, target, config, now),
            speed: config.foot_speed,
        },
        EnemyPhase::Chase => MovementCommand::MoveToPosition {
            target,
            speed: config.chase_speed,
        },
        EnemyPhase::Approach => MovementCommand::MoveToPosition {
            target: approach_point(own, target, config),
            speed: config.foot_speed,
        },
        EnemyPhase::Evade { .. } => MovementCommand::MoveToPosition {
            target: retreat_point(own, target, EVASION_STEP),
            speed: config.foot_speed,
        },
        EnemyPhase::Dodge { side, .. } => MovementCommand::MoveToPosition {
            target: sidestep_point(own, target, side, EVASION_STEP),
            speed: config.dodge_speed,
        },
        EnemyPhase::Combo { .. } | EnemyPhase::Block { .. } | EnemyPhase::Hit { .. } => {
            MovementCommand::Stop
        }
    }
}
