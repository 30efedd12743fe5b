//! Timer utility - simulation clock + cooldown helpers
//!
//! Всё время в симуляции - монотонное `SimTime` (секунды с начала матча).
//! Никаких wall-clock чтений: clock продвигается только через `SimClock::advance`,
//! поэтому один и тот же seed + один и тот же dt дают идентичный прогон.
//!
//! Два вида таймеров:
//! - absolute deadline (`SimTime::after` / `SimTime::has_reached`) - cooldowns, continuations
//! - countdown (`tick_down`) - stun, invulnerability, phase timers

use bevy::prelude::*;

/// Допуск для сравнения deadline (float drift от суммирования dt)
pub const READY_EPSILON: f64 = 1e-6;

/// Остаток countdown'а меньше этого значения считается нулём
pub const COUNTDOWN_SNAP: f32 = 1e-5;

/// Момент симуляционного времени (секунды)
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Default, Reflect)]
pub struct SimTime(pub f64);

impl SimTime {
    pub const ZERO: SimTime = SimTime(0.0);

    pub fn seconds(self) -> f64 {
        self.0
    }

    /// Deadline через `duration` секунд (отрицательные/NaN → сейчас)
    pub fn after(self, duration: f32) -> SimTime {
        let duration = if duration.is_finite() && duration > 0.0 {
            duration as f64
        } else {
            0.0
        };
        SimTime(self.0 + duration)
    }

    /// true когда `self` достиг deadline `mark` (с допуском READY_EPSILON)
    pub fn has_reached(self, mark: SimTime) -> bool {
        self.0 + READY_EPSILON >= mark.0
    }

    /// Сколько секунд осталось до `mark` (0 если уже наступил)
    pub fn until(self, mark: SimTime) -> f32 {
        ((mark.0 - self.0).max(0.0)) as f32
    }
}

/// Resource: часы симуляции
///
/// Продвигается первой системой тика (`TickSet::Clock`).
/// `dt` - длительность текущего тика, доступна всем системам.
#[derive(Resource, Debug, Clone, Copy, Default)]
pub struct SimClock {
    now: SimTime,
    tick: u64,
    dt: f32,
}

impl SimClock {
    pub fn now(&self) -> SimTime {
        self.now
    }

    pub fn tick(&self) -> u64 {
        self.tick
    }

    pub fn dt(&self) -> f32 {
        self.dt
    }

    /// Продвинуть часы на `dt` (невалидный dt → тик нулевой длительности)
    pub fn advance(&mut self, dt: f32) {
        let dt = sanitize_dt(dt);
        self.dt = dt;
        self.now = SimTime(self.now.0 + dt as f64);
        self.tick += 1;
    }
}

/// Отрицательный или NaN dt не должен откатывать таймеры назад
pub fn sanitize_dt(dt: f32) -> f32 {
    if dt.is_finite() && dt > 0.0 {
        dt
    } else {
        0.0
    }
}

/// Countdown: `timer - dt`, clamp к 0
///
/// Остаток < COUNTDOWN_SNAP схлопывается в 0, чтобы 0.35s stun при 60Hz
/// не висел лишний тик из-за float погрешности.
pub fn tick_down(timer: f32, dt: f32) -> f32 {
    if !timer.is_finite() || timer <= 0.0 {
        return 0.0;
    }
    let remaining = timer - sanitize_dt(dt);
    if remaining < COUNTDOWN_SNAP {
        0.0
    } else {
        remaining
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_deadline_ready_exactly_at_mark() {
        let start = SimTime(1.0);
        let mark = start.after(0.5);
        assert!(!start.has_reached(mark));
        assert!(!SimTime(1.4999).has_reached(mark));
        assert!(SimTime(1.5).has_reached(mark));
        assert!(SimTime(2.0).has_reached(mark));
    }

    #[test]
    fn test_after_ignores_negative_and_nan() {
        let now = SimTime(3.0);
        assert_eq!(now.after(-1.0), now);
        assert_eq!(now.after(f32::NAN), now);
    }

    #[test]
    fn test_tick_down_clamps_and_snaps() {
        assert_eq!(tick_down(0.3, 0.5), 0.0);
        assert_eq!(tick_down(0.0, 0.016), 0.0);
        assert_eq!(tick_down(-2.0, 0.016), 0.0);
        assert_eq!(tick_down(f32::NAN, 0.016), 0.0);
        assert!((tick_down(1.0, 0.25) - 0.75).abs() < 1e-6);

        // 0.35s stun при 60Hz истекает ровно за 21 тик
        let mut stun = 0.35;
        let mut ticks = 0;
        while stun > 0.0 {
            stun = tick_down(stun, 1.0 / 60.0);
            ticks += 1;
        }
        assert_eq!(ticks, 21);
    }

    #[test]
    fn test_clock_advance_accumulates() {
        let mut clock = SimClock::default();
        for _ in 0..60 {
            clock.advance(1.0 / 60.0);
        }
        assert_eq!(clock.tick(), 60);
        assert!((clock.now().seconds() - 1.0).abs() < 1e-5);

        // Отрицательный dt - тик есть, время стоит
        let before = clock.now();
        clock.advance(-0.5);
        assert_eq!(clock.now(), before);
        assert_eq!(clock.tick(), 61);
        assert_eq!(clock.dt(), 0.0);
    }
}
