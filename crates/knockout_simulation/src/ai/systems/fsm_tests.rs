//! Tests for enemy FSM step.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;
    use rand::SeedableRng;
    use rand_chacha::ChaCha8Rng;

    use super::super::fsm::step_enemy;
    use super::super::reactions::choose_post_combo_phase;
    use crate::actor::{ControlContext, OpponentView};
    use crate::ai::components::{AIConfig, EnemyBrain, EnemyPhase, EnemyStrikeConfig, PostComboPolicy};
    use crate::combat::{ActorEffects, PhaseKind, StunReceiver};
    use crate::components::{CombatLedger, LedgerConfig, MovementCommand};
    use crate::shared::{Continuations, SimTime};

    const DT: f32 = 0.05;

    struct Rig {
        brain: EnemyBrain,
        ledger: CombatLedger,
        pending: Continuations,
        movement: MovementCommand,
        rng: ChaCha8Rng,
        now: f64,
        target: OpponentView,
    }

    impl Rig {
        fn new(config: AIConfig, phase: EnemyPhase, target_x: f32) -> Self {
            Self {
                brain: EnemyBrain::new(config, EnemyStrikeConfig::default()).with_phase(phase),
                ledger: CombatLedger::new(LedgerConfig::enemy()),
                pending: Continuations::default(),
                movement: MovementCommand::Idle,
                rng: ChaCha8Rng::seed_from_u64(7),
                now: 0.0,
                target: OpponentView {
                    entity: Entity::from_raw(1),
                    position: Vec3::new(target_x, 0.0, 0.0),
                    charging: false,
                    blocking: false,
                    defeated: false,
                },
            }
        }

        fn tick(&mut self) -> ActorEffects {
            self.tick_with(true)
        }

        fn tick_with(&mut self, has_target: bool) -> ActorEffects {
            self.now += DT as f64;
            let ctx = ControlContext {
                entity: Entity::from_raw(2),
                now: SimTime(self.now),
                dt: DT,
                position: Vec3::ZERO,
            };
            let mut effects = ActorEffects::default();
            let target = has_target.then_some(self.target);
            step_enemy(
                &mut self.brain,
                &ctx,
                &mut self.ledger,
                &mut self.pending,
                &mut self.movement,
                target.as_ref(),
                &mut self.rng,
                &mut effects,
            );
            effects
        }
    }

    fn idle_probe() -> EnemyPhase {
        EnemyPhase::Probe { remaining: 5.0 }
    }

    #[test]
    fn test_far_target_triggers_chase_then_approach() {
        let mut rig = Rig::new(AIConfig::default(), idle_probe(), 12.0);

        let effects = rig.tick();
        assert_eq!(rig.brain.phase(), EnemyPhase::Chase);
        assert!(effects
            .phases
            .iter()
            .any(|change| change.from == PhaseKind::Probe && change.to == PhaseKind::Chase));
        assert!(matches!(
            rig.movement,
            MovementCommand::MoveToPosition { speed, .. } if speed == 4.0
        ));

        rig.target.position = Vec3::new(6.0, 0.0, 0.0);
        rig.tick();
        assert_eq!(rig.brain.phase(), EnemyPhase::Approach);
    }

    #[test]
    fn test_chase_disabled_keeps_probing() {
        let config = AIConfig {
            chase_enabled: false,
            ..default()
        };
        let mut rig = Rig::new(config, idle_probe(), 12.0);
        rig.tick();
        assert_eq!(rig.brain.phase().kind(), PhaseKind::Probe);
    }

    #[test]
    fn test_combo_throws_rolled_number_of_strikes() {
        let mut rig = Rig::new(AIConfig::default(), idle_probe(), 1.5);

        let mut thrown = 0;
        let mut thrown_at = Vec::new();
        let mut ticks = 0;
        loop {
            let effects = rig.tick();
            thrown += effects.strikes.len();
            thrown_at.extend(effects.strikes.iter().map(|_| rig.now));
            ticks += 1;
            if thrown > 0 && rig.brain.phase().kind() != PhaseKind::Combo {
                break;
            }
            assert!(ticks < 200, "combo never finished");
        }

        assert!((3..=5).contains(&thrown), "thrown {thrown} strikes");
        // Каждая пауза внутри серии в combo_gap (+ один тик на дискретизацию)
        let (gap_min, gap_max) = AIConfig::default().combo_gap;
        for pair in thrown_at.windows(2) {
            let gap = (pair[1] - pair[0]) as f32;
            assert!(
                gap >= gap_min - 1e-4 && gap <= gap_max + DT + 1e-4,
                "gap {gap} outside combo_gap"
            );
        }
        assert_eq!(rig.pending.len(), thrown);
        assert_eq!(rig.brain.phase().kind(), PhaseKind::Probe);
        // После серии - полный recovery 1.2s
        let ready_in = SimTime(rig.now).until(rig.ledger.next_attack_ready_at());
        assert!((ready_in - 1.2).abs() < 1e-4);
        assert!(matches!(
            rig.movement,
            MovementCommand::MoveToPosition { speed, .. } if speed == 3.2
        ));
    }

    #[test]
    fn test_combo_strikes_respect_gap() {
        let mut rig = Rig::new(AIConfig::default(), idle_probe(), 1.5);

        let first = rig.tick();
        assert_eq!(first.strikes.len(), 1);
        let gap = first.strikes[0].recovery;
        assert!((0.2..=0.35).contains(&gap));
        assert_eq!(rig.movement, MovementCommand::Stop);

        // До истечения gap новых ударов нет
        let ticks_before_gap = (gap / DT).floor() as usize - 1;
        for _ in 0..ticks_before_gap {
            assert!(rig.tick().strikes.is_empty());
        }
    }

    #[test]
    fn test_stun_interrupts_combo() {
        let mut rig = Rig::new(AIConfig::default(), idle_probe(), 1.5);
        rig.tick();
        assert_eq!(rig.brain.phase().kind(), PhaseKind::Combo);
        assert!(rig.pending.has_pending_strike());

        let mut effects = ActorEffects::default();
        rig.ledger.begin_stun();
        rig.brain.on_stunned(
            Entity::from_raw(2),
            0.35,
            &mut rig.ledger,
            &mut rig.pending,
            &mut effects,
        );
        assert_eq!(rig.brain.phase(), EnemyPhase::Hit { remaining: 0.35 });
        assert!(!rig.pending.has_pending_strike());

        // 0.35s = 7 тиков по 0.05
        for _ in 0..6 {
            assert!(rig.tick().strikes.is_empty());
            assert_eq!(rig.brain.phase().kind(), PhaseKind::Hit);
            assert_eq!(rig.movement, MovementCommand::Stop);
        }
        rig.tick();
        assert_eq!(rig.brain.phase().kind(), PhaseKind::Probe);
    }

    #[test]
    fn test_windup_preempt_blocks_once() {
        let config = AIConfig {
            preempt_chance: 1.0,
            ..default()
        };
        let mut rig = Rig::new(config, idle_probe(), 3.0);
        rig.target.charging = true;

        rig.tick();
        assert!(matches!(
            rig.brain.phase(),
            EnemyPhase::Block {
                retreat_after: false,
                ..
            }
        ));
        assert!(rig.ledger.is_blocking());
        assert_eq!(rig.movement, MovementCommand::Stop);

        // 0.8s блока, затем Probe; тот же замах повторно не оценивается
        for _ in 0..16 {
            rig.tick();
        }
        assert_eq!(rig.brain.phase().kind(), PhaseKind::Probe);
        assert!(!rig.ledger.is_blocking());
        for _ in 0..5 {
            rig.tick();
            assert_eq!(rig.brain.phase().kind(), PhaseKind::Probe);
        }

        // Новый замах → новая попытка
        rig.target.charging = false;
        rig.tick();
        rig.target.charging = true;
        rig.tick();
        assert_eq!(rig.brain.phase().kind(), PhaseKind::Block);
    }

    #[test]
    fn test_windup_outside_radius_is_ignored() {
        let config = AIConfig {
            preempt_chance: 1.0,
            preempt_radius: 2.5,
            ..default()
        };
        let mut rig = Rig::new(config, idle_probe(), 3.0);
        rig.target.charging = true;
        rig.tick();
        assert_eq!(rig.brain.phase().kind(), PhaseKind::Probe);
    }

    #[test]
    fn test_windup_dodge_when_block_disabled() {
        let config = AIConfig {
            preempt_chance: 1.0,
            block_enabled: false,
            dodge_enabled: true,
            ..default()
        };
        let mut rig = Rig::new(config, idle_probe(), 3.0);
        rig.target.charging = true;
        rig.tick();
        assert!(matches!(
            rig.brain.phase(),
            EnemyPhase::Dodge { side, .. } if side.abs() == 1.0
        ));
        assert!(matches!(
            rig.movement,
            MovementCommand::MoveToPosition { speed, .. } if speed == 5.0
        ));
    }

    #[test]
    fn test_block_retreat_ends_in_evade() {
        let phase = EnemyPhase::Block {
            remaining: 0.1,
            retreat_after: true,
        };
        let mut rig = Rig::new(AIConfig::default(), phase, 3.0);
        rig.ledger.begin_block();

        rig.tick();
        rig.tick();
        assert!(matches!(rig.brain.phase(), EnemyPhase::Evade { .. }));
        assert!(!rig.ledger.is_blocking());
    }

    #[test]
    fn test_probe_expiry_moves_to_approach() {
        let mut rig = Rig::new(AIConfig::default(), EnemyPhase::Probe { remaining: 0.05 }, 5.0);
        rig.tick();
        assert_eq!(rig.brain.phase(), EnemyPhase::Approach);
    }

    #[test]
    fn test_no_target_stands_still() {
        let mut rig = Rig::new(AIConfig::default(), EnemyPhase::Approach, 5.0);
        rig.tick_with(false);
        assert_eq!(rig.brain.phase().kind(), PhaseKind::Probe);
        assert_eq!(rig.movement, MovementCommand::Stop);

        rig.target.defeated = true;
        rig.tick();
        assert_eq!(rig.movement, MovementCommand::Stop);
    }

    #[test]
    fn test_post_combo_policies() {
        let mut rng = ChaCha8Rng::seed_from_u64(1);
        let brain = |post_combo, evade_enabled| {
            EnemyBrain::new(
                AIConfig {
                    post_combo,
                    evade_enabled,
                    post_combo_weights: (0.0, 1.0, 0.0),
                    ..default()
                },
                EnemyStrikeConfig::default(),
            )
        };

        assert_eq!(choose_post_combo_phase(&brain(PostComboPolicy::Probe, true), &mut rng), None);
        assert!(matches!(
            choose_post_combo_phase(&brain(PostComboPolicy::Evade, true), &mut rng),
            Some(EnemyPhase::Evade { .. })
        ));
        assert_eq!(choose_post_combo_phase(&brain(PostComboPolicy::Evade, false), &mut rng), None);
        assert!(matches!(
            choose_post_combo_phase(&brain(PostComboPolicy::BlockRetreat, true), &mut rng),
            Some(EnemyPhase::Block {
                retreat_after: true,
                ..
            })
        ));
        assert!(matches!(
            choose_post_combo_phase(&brain(PostComboPolicy::Weighted, true), &mut rng),
            Some(EnemyPhase::Block { .. })
        ));
    }
}
