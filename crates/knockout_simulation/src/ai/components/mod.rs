//! Enemy brain components: EnemyPhase, EnemyBrain, AIConfig, strike tunables

pub mod fsm;

#[cfg(test)]
mod fsm_tests;

pub use fsm::{AIConfig, EnemyBrain, EnemyPhase, EnemyStrikeConfig, PostComboPolicy};
