//! AI systems (phase transitions, movement intent, reactions)

pub mod fsm;
pub mod movement;
pub mod reactions;

// Tests (separate files with _tests suffix)
#[cfg(test)]
mod fsm_tests;

// Re-export all systems
pub use fsm::*;
pub use movement::*;
pub use reactions::*;
