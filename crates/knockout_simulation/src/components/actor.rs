//! Базовые компоненты акторов: Actor, Opponent, HitVolume, death markers

use bevy::prelude::*;

use crate::components::movement::{Knockback, MovementCommand};
use crate::shared::{Continuations, SimTime};

/// Роль актора в матче
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Reflect)]
pub enum ActorRole {
    Player,
    Enemy,
}

impl ActorRole {
    pub fn as_str(&self) -> &'static str {
        match self {
            ActorRole::Player => "player",
            ActorRole::Enemy => "enemy",
        }
    }
}

/// Актор (игрок или враг) - участник боя
///
/// `order` - позиция в `ActorRegistry`, определяет порядок обработки внутри тика.
/// Automatically добавляет Continuations, MovementCommand, HitVolume, Knockback.
#[derive(Component, Debug, Clone, Reflect)]
#[reflect(Component)]
#[require(Continuations, MovementCommand, HitVolume, Knockback)]
pub struct Actor {
    pub role: ActorRole,
    pub order: u32,
}

/// Текущий противник (цель AI / fallback aim игрока)
#[derive(Component, Debug, Clone, Copy, PartialEq, Reflect)]
#[reflect(Component)]
pub struct Opponent(pub Entity);

/// Hit volume актора (сфера вокруг Transform.translation)
///
/// Используется headless probe'ом; движок синхронизирует свой collider.
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct HitVolume {
    pub radius: f32,
}

impl Default for HitVolume {
    fn default() -> Self {
        Self { radius: 0.5 }
    }
}

/// Статичное препятствие (стена, колонна) - блокирует удары
#[derive(Component, Debug, Clone, Copy, Reflect)]
#[reflect(Component)]
pub struct Obstacle {
    pub radius: f32,
}

/// Компонент-маркер: актор повержен (health == 0)
///
/// Контроллеры и таймеры пропускают Dead акторов; despawn через DespawnAfter.
#[derive(Component, Debug)]
pub struct Dead;

/// Despawn после момента `at` (death animation успевает проиграться)
#[derive(Component, Debug, Clone, Copy)]
pub struct DespawnAfter {
    pub at: SimTime,
}
