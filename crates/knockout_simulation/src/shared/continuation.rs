//! Continuations - отложенные действия актора
//!
//! Strike не резолвится в момент замаха: между анимацией удара и проверкой
//! попадания есть короткая задержка (release latency). Отложенный удар хранится
//! здесь как обычные данные, привязанные к актору:
//! - stun актора → `cancel_strikes()` (удар не долетает)
//! - despawn актора → компонент уходит вместе с entity, ничего не висит
//! - `TickSet::Resolve` забирает созревшие через `take_due(now)`

use bevy::prelude::*;

use crate::shared::timer::SimTime;

/// Handle отложенного действия (уникален в пределах актора)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ContinuationId(pub u64);

/// Кого бьём
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrikeTarget {
    /// Конкретный актор (враг бьёт игрока)
    Designated(Entity),
    /// Первый актор на линии удара (игрок бьёт по направлению aim)
    FirstInLine,
}

/// Куда направлен удар в момент резолва
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum StrikeAim {
    /// Направление зафиксировано при замахе
    Fixed(Vec3),
    /// Направление к текущей позиции цели на момент резолва
    TowardTarget,
}

/// Параметры удара, зафиксированные при замахе
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PendingStrike {
    pub target: StrikeTarget,
    pub damage: u32,
    pub knockback_force: f32,
    pub reach: f32,
    pub aim: StrikeAim,
    /// 0 = light, 1 = full heavy (для логов и событий)
    pub power: f32,
}

#[derive(Debug, Clone, PartialEq)]
pub enum Continuation {
    Strike(PendingStrike),
}

#[derive(Debug, Clone, PartialEq)]
pub struct Scheduled {
    pub id: ContinuationId,
    pub due: SimTime,
    pub action: Continuation,
}

/// Компонент: очередь отложенных действий актора
#[derive(Component, Debug, Clone, Default)]
pub struct Continuations {
    pending: Vec<Scheduled>,
    next_id: u64,
}

impl Continuations {
    pub fn schedule(&mut self, due: SimTime, action: Continuation) -> ContinuationId {
        let id = ContinuationId(self.next_id);
        self.next_id += 1;
        self.pending.push(Scheduled { id, due, action });
        id
    }

    pub fn schedule_strike(&mut self, due: SimTime, strike: PendingStrike) -> ContinuationId {
        self.schedule(due, Continuation::Strike(strike))
    }

    pub fn cancel(&mut self, id: ContinuationId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|scheduled| scheduled.id != id);
        before != self.pending.len()
    }

    /// Отменить все отложенные удары (stun, block). Возвращает количество отменённых.
    pub fn cancel_strikes(&mut self) -> usize {
        let before = self.pending.len();
        self.pending
            .retain(|scheduled| !matches!(scheduled.action, Continuation::Strike(_)));
        before - self.pending.len()
    }

    pub fn clear(&mut self) -> usize {
        let count = self.pending.len();
        self.pending.clear();
        count
    }

    /// Забрать все созревшие действия в порядке (due, id)
    pub fn take_due(&mut self, now: SimTime) -> Vec<Scheduled> {
        let (mut due, rest): (Vec<_>, Vec<_>) = self
            .pending
            .drain(..)
            .partition(|scheduled| now.has_reached(scheduled.due));
        self.pending = rest;
        due.sort_by(|a, b| a.due.0.total_cmp(&b.due.0).then(a.id.cmp(&b.id)));
        due
    }

    pub fn has_pending_strike(&self) -> bool {
        self.pending
            .iter()
            .any(|scheduled| matches!(scheduled.action, Continuation::Strike(_)))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
