//! Combat system module
//!
//! ECS ответственность:
//! - Game state: CombatLedger (health, stun, block, cooldown, charge)
//! - Combat rules: damage resolution pipeline, stun/defeat
//! - Events: cues, knockback, defeat, telemetry
//!
//! Engine ответственность:
//! - GeometryProbe backend (raycast по collider'ам)
//! - Animation / sound / HUD по событиям
//! - Knockback физика по KnockbackImpulse

use bevy::prelude::*;

pub mod damage;
pub mod events;
pub mod probe;


// Re-export основных типов
pub use damage::{
    land_strike, trace_strike, AttackIntent, LandedStrike, StrikeTrace, StrikeVictim,
    StunReceiver, DEATH_DESPAWN_DELAY,
};
pub use events::*;
pub use probe::{ColliderTag, GeometryProbe, HitProbe, ProbeHit, ProbeMask, ProbeVolume, VolumeProbe};

use crate::TickSet;

/// Combat Plugin
///
/// Регистрирует combat события и системы в CombatTick schedule.
///
/// Порядок выполнения (внутри TickSet):
/// 1. Timers: tick_combat_windows - stun / invulnerability countdown
/// 2. Resolve: resolve_due_strikes - batch резолв созревших ударов
/// 3. Cleanup: despawn_after_timeout - despawn поверженных
pub struct CombatPlugin;

impl Plugin for CombatPlugin {
    fn build(&self, app: &mut App) {
        // Регистрация событий
        app.add_event::<AnimationCue>()
            .add_event::<SoundCue>()
            .add_event::<KnockbackImpulse>()
            .add_event::<ActorDefeated>()
            .add_event::<ChargeProgress>()
            .add_event::<HealthChanged>()
            .add_event::<StrikeThrown>()
            .add_event::<StrikeResolved>()
            .add_event::<PhaseChanged>();

        if !app.world().contains_resource::<HitProbe>() {
            app.insert_resource(HitProbe::headless());
        }

        app.add_systems(
            crate::CombatTick,
            (
                damage::tick_combat_windows.in_set(TickSet::Timers),
                damage::resolve_due_strikes.in_set(TickSet::Resolve),
                damage::despawn_after_timeout.in_set(TickSet::Cleanup),
            ),
        );
    }
}
