//! Headless locomotion - замена движка для тестов и headless прогона
//!
//! В игре MovementCommand исполняет NavigationAgent/CharacterBody движка,
//! а KnockbackImpulse уходит в физику. Здесь - простейшая кинематика:
//! - MoveToPosition: прямая к цели со скоростью команды, без overshoot
//! - Knockback: velocity += impulse, экспоненциальное затухание
//!
//! Core не зависит от этого модуля: без HeadlessPlugin акторы просто стоят.

use bevy::prelude::*;

use crate::combat::KnockbackImpulse;
use crate::components::{Dead, Knockback, MovementCommand};
use crate::shared::SimClock;
use crate::TickSet;

/// Затухание knockback velocity (1/сек)
pub const KNOCKBACK_DAMPING: f32 = 8.0;

/// Ниже этой скорости knockback обнуляется
pub const KNOCKBACK_REST_SPEED: f32 = 0.01;

/// Headless Plugin: исполняет MovementCommand и knockback в TickSet::Locomotion
pub struct HeadlessPlugin;

impl Plugin for HeadlessPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(
            crate::CombatTick,
            (apply_knockback_impulses, follow_movement_commands)
                .chain()
                .in_set(TickSet::Locomotion),
        );
    }
}

/// Система: KnockbackImpulse → Knockback velocity (масса = 1)
pub fn apply_knockback_impulses(
    mut impulses: EventReader<KnockbackImpulse>,
    mut bodies: Query<&mut Knockback, Without<Dead>>,
) {
    for impulse in impulses.read() {
        let Ok(mut knockback) = bodies.get_mut(impulse.target) else {
            continue;
        };
        knockback.velocity += impulse.direction.normalize_or_zero() * impulse.magnitude;
    }
}

/// Система: шаг кинематики по MovementCommand + knockback drift
pub fn follow_movement_commands(
    clock: Res<SimClock>,
    mut bodies: Query<(&mut Transform, &MovementCommand, &mut Knockback)>,
) {
    let dt = clock.dt();
    for (mut transform, command, mut knockback) in bodies.iter_mut() {
        if let MovementCommand::MoveToPosition { target, speed } = *command {
            transform.translation = step_toward(transform.translation, target, speed * dt);
        }

        if knockback.velocity != Vec3::ZERO {
            transform.translation += knockback.velocity * dt;
            let decay = (1.0 - KNOCKBACK_DAMPING * dt).max(0.0);
            knockback.velocity *= decay;
            if knockback.velocity.length() < KNOCKBACK_REST_SPEED {
                knockback.velocity = Vec3::ZERO;
            }
        }
    }
}

/// Сдвиг к `target` не более чем на `max_step` (без overshoot)
pub fn step_toward(from: Vec3, target: Vec3, max_step: f32) -> Vec3 {
    let offset = target - from;
    let distance = offset.length();
    if distance <= max_step.max(0.0) || distance <= f32::EPSILON {
        target
    } else {
        from + offset / distance * max_step
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_step_toward_no_overshoot() {
        let next = step_toward(Vec3::ZERO, Vec3::new(1.0, 0.0, 0.0), 0.25);
        assert!((next.x - 0.25).abs() < 1e-6);

        let arrived = step_toward(Vec3::new(0.9, 0.0, 0.0), Vec3::new(1.0, 0.0, 0.0), 0.25);
        assert_eq!(arrived, Vec3::new(1.0, 0.0, 0.0));
    }

    #[test]
    fn test_step_toward_zero_speed_stays() {
        let from = Vec3::new(2.0, 0.0, 0.0);
        assert_eq!(step_toward(from, Vec3::ZERO, 0.0), from);
    }
}
