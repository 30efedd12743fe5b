//! Tests for FSM AI components.

#[cfg(test)]
mod tests {
    use super::super::fsm::{AIConfig, EnemyBrain, EnemyPhase, EnemyStrikeConfig, PostComboPolicy};
    use crate::combat::PhaseKind;

    #[test]
    fn test_enemy_phase_default() {
        let phase = EnemyPhase::default();
        assert!(matches!(phase, EnemyPhase::Probe { remaining } if remaining == 0.0));
        assert_eq!(phase.kind(), PhaseKind::Probe);
    }

    #[test]
    fn test_ai_config_default() {
        let config = AIConfig::default();
        assert_eq!(config.ideal_distance, 3.2);
        assert_eq!(config.attack_reach, 2.2);
        assert_eq!(config.chase_threshold, 8.0);
        assert_eq!(config.combo_min, 3);
        assert_eq!(config.combo_max, 5);
        assert_eq!(config.post_combo, PostComboPolicy::Probe);
        assert!(config.block_enabled);
        assert!(!config.dodge_enabled);
        assert_eq!(config.preempt_chance, 0.15);
    }

    #[test]
    fn test_strike_config_default() {
        let strike = EnemyStrikeConfig::default();
        assert_eq!(strike.damage, 12);
        assert_eq!(strike.hit_force, 6.0);
        assert_eq!(strike.cooldown, 1.2);
    }

    #[test]
    fn test_neutral_phases() {
        assert!(EnemyPhase::Probe { remaining: 0.3 }.is_neutral());
        assert!(EnemyPhase::Approach.is_neutral());
        assert!(!EnemyPhase::Chase.is_neutral());
        assert!(!EnemyPhase::Combo { remaining_strikes: 2 }.is_neutral());
        assert!(!EnemyPhase::Hit { remaining: 0.1 }.is_neutral());
        assert!(!EnemyPhase::Block {
            remaining: 0.8,
            retreat_after: false
        }
        .is_neutral());
    }

    #[test]
    fn test_brain_with_phase() {
        let brain = EnemyBrain::new(AIConfig::default(), EnemyStrikeConfig::default())
            .with_phase(EnemyPhase::Evade { remaining: 0.6 });
        assert_eq!(brain.phase().kind(), PhaseKind::Evade);
        assert_eq!(brain.strike_config().reach, 2.0);
    }
}
