//! Movement компоненты: команды перемещения + knockback velocity

use bevy::prelude::*;

/// Команда движения для актора
///
/// Архитектура:
/// - AI пишет MovementCommand (high-level intent)
/// - Locomotion (движок или headless `movement` модуль) исполняет
/// - Core никогда не двигает Transform напрямую
#[derive(Component, Debug, Clone, Copy, PartialEq, Default, Reflect)]
#[reflect(Component)]
pub enum MovementCommand {
    /// Ничего не делать (locomotion сохраняет текущее состояние)
    #[default]
    Idle,
    /// Остановиться немедленно
    Stop,
    /// Двигаться к позиции (world coordinates) со скоростью `speed` м/с
    MoveToPosition { target: Vec3, speed: f32 },
}

/// Knockback velocity (накапливается из KnockbackImpulse, затухает в locomotion)
#[derive(Component, Debug, Clone, Copy, Default, Reflect)]
#[reflect(Component)]
pub struct Knockback {
    pub velocity: Vec3,
}
