//! Player domain - combat controller игрока
//!
//! Movement игрока не в core (движок двигает CharacterBody по input).
//! Core получает только уровни кнопок attack / block + aim.

pub mod combat;


pub use combat::{PlayerCombat, PlayerCombatConfig, PlayerCombatState, PlayerInput, ReleasedStrike};
