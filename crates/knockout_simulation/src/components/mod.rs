//! ECS Components для боевых entity
//!
//! Организация по доменам:
//! - actor: роль, противник, hit volume, death markers
//! - ledger: боевое состояние (health, stun, block, cooldown, charge)
//! - movement: команды перемещения (MovementCommand, Knockback)

pub mod actor;
pub mod ledger;
pub mod movement;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod ledger_tests;

// Re-exports для удобного импорта
pub use actor::*;
pub use ledger::*;
pub use movement::*;
