//! Shared domain - cross-cutting утилиты
//!
//! Содержит:
//! - Timer utility (SimClock, SimTime, tick_down)
//! - Continuations (отложенные удары, привязанные к актору)

pub mod continuation;
pub mod timer;

pub use continuation::*;
pub use timer::*;
