//! AI decision-making module
//!
//! Enemy FSM: Probe / Chase / Approach / Combo / Block / Evade / Dodge / Hit.
//! Решения принимаются каждый тик в `TickSet::Decide` (через actor facade),
//! все случайные броски идут через DeterministicRng.

pub mod components;
pub mod systems;

// Re-export основных типов
pub use components::{AIConfig, EnemyBrain, EnemyPhase, EnemyStrikeConfig, PostComboPolicy};
pub use systems::{phase_movement, roll_range, step_enemy};
