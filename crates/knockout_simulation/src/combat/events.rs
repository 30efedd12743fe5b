//! Combat events - всё, что core сообщает наружу
//!
//! Presentation (анимации, звук, HUD) и locomotion (knockback) живут вне core
//! и подписываются на эти события. Core не ждёт ответа ни от одного из них.

use bevy::ecs::system::SystemParam;
use bevy::prelude::*;

use crate::components::ActorRole;
use crate::shared::SimTime;

/// Анимационные cues (имена соответствуют state'ам AnimationTree)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum AnimationCueKind {
    Idle,
    Charge,
    Punch,
    Block,
    Hit,
    Die,
    Run,
    Retreat,
    Dodge,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct AnimationCue {
    pub actor: Entity,
    pub cue: AnimationCueKind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum SoundClip {
    Swing,
    Impact,
    BlockStart,
    BlockEnd,
    Death,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct SoundCue {
    pub actor: Entity,
    pub clip: SoundClip,
}

/// Событие: knockback импульс (direction нормализован, magnitude ≥ 0)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct KnockbackImpulse {
    pub target: Entity,
    pub direction: Vec3,
    pub magnitude: f32,
}

/// Событие: актор повержен (отправляется ровно один раз на актора)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ActorDefeated {
    pub actor: Entity,
    pub role: ActorRole,
    pub killer: Option<Entity>,
}

/// Charge progress игрока в [0, 1] (для HUD)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct ChargeProgress {
    pub actor: Entity,
    pub progress: f32,
}

/// Событие: health изменился (после пропущенного удара)
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct HealthChanged {
    pub actor: Entity,
    pub current: u32,
    pub max: u32,
}

/// Событие: удар начат (замах), резолв в `due`
#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StrikeThrown {
    pub attacker: Entity,
    pub damage: u32,
    pub knockback_force: f32,
    pub due: SimTime,
    /// Пауза до следующего удара (cooldown или combo gap)
    pub recovery: f32,
}

/// Результат резолва удара
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StrikeOutcome {
    /// Урон прошёл (возможно уменьшенный блоком)
    Landed { applied: u32, blocked: bool },
    /// Попал, но цель invulnerable / уже повержена
    Absorbed,
    /// Цель вне досягаемости или не первая на линии удара
    Missed,
    /// Первым на линии оказалось препятствие
    Obstructed,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct StrikeResolved {
    pub attacker: Entity,
    pub target: Option<Entity>,
    pub outcome: StrikeOutcome,
}

/// Идентификатор фазы (для PhaseChanged и логов)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum PhaseKind {
    Probe,
    Chase,
    Approach,
    Combo,
    Block,
    Evade,
    Dodge,
    Hit,
}

#[derive(Event, Debug, Clone, Copy, PartialEq)]
pub struct PhaseChanged {
    pub actor: Entity,
    pub from: PhaseKind,
    pub to: PhaseKind,
}

/// Буфер side-effects одного актора за тик
///
/// Контроллеры и pipeline пишут сюда (без доступа к World), система
/// потом сливает буфер в EventWriter'ы через `CombatFeed::flush`.
#[derive(Debug, Default)]
pub struct ActorEffects {
    pub cues: Vec<AnimationCue>,
    pub sounds: Vec<SoundCue>,
    pub strikes: Vec<StrikeThrown>,
    pub charge: Vec<ChargeProgress>,
    pub phases: Vec<PhaseChanged>,
}

impl ActorEffects {
    pub fn cue(&mut self, actor: Entity, cue: AnimationCueKind) {
        self.cues.push(AnimationCue { actor, cue });
    }

    pub fn sound(&mut self, actor: Entity, clip: SoundClip) {
        self.sounds.push(SoundCue { actor, clip });
    }

    pub fn charge(&mut self, actor: Entity, progress: f32) {
        self.charge.push(ChargeProgress {
            actor,
            progress: progress.clamp(0.0, 1.0),
        });
    }

    pub fn phase(&mut self, actor: Entity, from: PhaseKind, to: PhaseKind) {
        if from != to {
            self.phases.push(PhaseChanged { actor, from, to });
        }
    }

    pub fn is_empty(&self) -> bool {
        self.cues.is_empty()
            && self.sounds.is_empty()
            && self.strikes.is_empty()
            && self.charge.is_empty()
            && self.phases.is_empty()
    }
}

/// SystemParam: все presentation/telemetry writers одним параметром
#[derive(SystemParam)]
pub struct CombatFeed<'w> {
    pub cues: EventWriter<'w, AnimationCue>,
    pub sounds: EventWriter<'w, SoundCue>,
    pub knockback: EventWriter<'w, KnockbackImpulse>,
    pub defeated: EventWriter<'w, ActorDefeated>,
    pub charge: EventWriter<'w, ChargeProgress>,
    pub health: EventWriter<'w, HealthChanged>,
    pub strikes_thrown: EventWriter<'w, StrikeThrown>,
    pub strikes_resolved: EventWriter<'w, StrikeResolved>,
    pub phases: EventWriter<'w, PhaseChanged>,
}

impl CombatFeed<'_> {
    pub fn flush(&mut self, effects: ActorEffects) {
        for cue in effects.cues {
            self.cues.write(cue);
        }
        for sound in effects.sounds {
            self.sounds.write(sound);
        }
        for strike in effects.strikes {
            self.strikes_thrown.write(strike);
        }
        for progress in effects.charge {
            self.charge.write(progress);
        }
        for phase in effects.phases {
            self.phases.write(phase);
        }
    }
}
