//! Tests for CombatLedger.

#[cfg(test)]
mod tests {
    use bevy::prelude::*;

    use super::super::ledger::{blocked_damage, CombatLedger, LedgerConfig};
    use crate::shared::SimTime;

    fn fresh_player() -> CombatLedger {
        CombatLedger::new(LedgerConfig::player())
    }

    #[test]
    fn test_unblocked_damage_reduces_health() {
        let mut ledger = fresh_player();
        let applied = ledger.apply_damage(10, Vec3::ZERO);
        assert_eq!(applied, 10);
        assert_eq!(ledger.health(), 110);
        assert_eq!(ledger.last_hit_from(), Some(Vec3::ZERO));
    }

    #[test]
    fn test_blocked_damage_uses_ceil_of_rate() {
        let mut ledger = fresh_player();
        ledger.begin_block();

        // 12 × 0.15 = 1.8 → 2
        assert_eq!(ledger.apply_damage(12, Vec3::ZERO), 2);
        assert_eq!(ledger.health(), 118);

        assert_eq!(blocked_damage(20, 0.15), 3);
        assert_eq!(blocked_damage(25, 0.15), 4);
        assert_eq!(blocked_damage(1, 0.15), 1);
        assert_eq!(blocked_damage(10, 0.0), 0);
        assert_eq!(blocked_damage(0, 0.15), 0);

        // 20001 × 0.00005 = 1.00005 → 2, малая дробная часть не срезается
        assert_eq!(blocked_damage(20001, 0.00005), 2);
        assert_eq!(blocked_damage(u32::MAX, 1.0), u32::MAX);
    }

    #[test]
    fn test_invulnerable_rejects_damage_without_side_effects() {
        let mut ledger = fresh_player();
        ledger.apply_damage(10, Vec3::ZERO);
        ledger.begin_stun();
        assert!(ledger.is_invulnerable());

        let before = ledger.clone();
        assert_eq!(ledger.apply_damage(50, Vec3::X), 0);
        assert_eq!(ledger.health(), before.health());
        assert_eq!(ledger.last_hit_from(), before.last_hit_from());
    }

    #[test]
    fn test_health_never_underflows() {
        let mut ledger = CombatLedger::new(LedgerConfig::enemy());
        let applied = ledger.apply_damage(250, Vec3::ZERO);
        assert_eq!(applied, 100);
        assert_eq!(ledger.health(), 0);
        assert!(!ledger.is_alive());

        // Уже мёртв - no-op
        assert_eq!(ledger.apply_damage(10, Vec3::ZERO), 0);
    }

    #[test]
    fn test_stun_windows_and_invulnerability_tail() {
        let mut ledger = fresh_player();
        ledger.begin_stun();
        assert!(ledger.is_stunned());
        assert!(ledger.is_invulnerable());

        // 0.35s stun → 0.9s invulnerability (tail 0.55)
        let dt = 0.05;
        let mut stun_ended_at = None;
        let mut invul_ended_at = None;
        for tick in 1..=30 {
            let transitions = ledger.tick_windows(dt);
            if transitions.stun_ended {
                stun_ended_at = Some(tick);
            }
            if transitions.invulnerability_ended {
                invul_ended_at = Some(tick);
            }
        }
        assert_eq!(stun_ended_at, Some(7));
        assert_eq!(invul_ended_at, Some(18));
        assert!(!ledger.is_stunned());
        assert!(!ledger.is_invulnerable());
    }

    #[test]
    fn test_stun_does_not_stack() {
        let mut ledger = fresh_player();
        ledger.begin_stun();
        ledger.tick_windows(0.1);
        ledger.begin_stun();
        // Окно перезапущено до 0.35, не 0.6
        assert!((ledger.stun_remaining() - 0.35).abs() < 1e-6);
    }

    #[test]
    fn test_can_attack_gates() {
        let mut ledger = fresh_player();
        let now = SimTime(1.0);
        assert!(ledger.can_attack(now));

        ledger.mark_attack_used(now, 0.5);
        assert!(!ledger.can_attack(SimTime(1.2)));
        assert!(ledger.can_attack(SimTime(1.5)));

        ledger.begin_block();
        assert!(!ledger.can_attack(SimTime(2.0)));
        ledger.end_block();

        ledger.begin_stun();
        assert!(!ledger.can_attack(SimTime(2.0)));
    }

    #[test]
    fn test_block_toggle_reports_changes() {
        let mut ledger = fresh_player();
        assert!(ledger.begin_block());
        assert!(!ledger.begin_block());
        assert!(ledger.end_block());
        assert!(!ledger.end_block());
    }

    #[test]
    fn test_charge_clamps_and_consumes() {
        let mut ledger = fresh_player();
        ledger.add_charge(60.0);
        ledger.add_charge(60.0);
        assert_eq!(ledger.charge(), 100.0);
        assert_eq!(ledger.charge_fraction(), 1.0);

        ledger.add_charge(-500.0);
        assert_eq!(ledger.charge(), 0.0);

        ledger.add_charge(40.0);
        assert_eq!(ledger.consume_charge(), 40.0);
        assert_eq!(ledger.charge(), 0.0);
    }

    #[test]
    fn test_defeat_is_one_shot() {
        let mut ledger = CombatLedger::new(LedgerConfig::enemy());
        assert!(!ledger.mark_defeated(), "alive actor cannot be defeated");

        ledger.apply_damage(100, Vec3::ZERO);
        assert!(ledger.mark_defeated());
        assert!(!ledger.mark_defeated());
        assert!(ledger.is_defeated());
    }
}
