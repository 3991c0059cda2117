//! Timed effects: отложенные revert-действия на тиковых часах агента.
//!
//! Вместо корутин "покраснеть → подождать → вернуть цвет" планируем
//! `(kind, fire_at)` и проверяем каждый тик. Новый эффект того же вида
//! вытесняет старый; уничтожение агента отменяет всё.

/// Виды эффектов (по одному активному на вид)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum EffectKind {
    /// Подсветка после удара
    DamageFlash,
    /// Временный множитель скорости
    SpeedBuff,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub struct EffectId(pub u64);

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ScheduledEffect {
    pub id: EffectId,
    pub kind: EffectKind,
    pub fire_at: f64,
}

#[derive(Debug, Clone, Default)]
pub struct EffectQueue {
    now: f64,
    next_id: u64,
    pending: Vec<ScheduledEffect>,
}

impl EffectQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Планирует revert через `delay` секунд; pending того же вида отменяется
    pub fn schedule(&mut self, kind: EffectKind, delay: f32) -> EffectId {
        self.cancel_kind(kind);

        let id = EffectId(self.next_id);
        self.next_id += 1;
        self.pending.push(ScheduledEffect {
            id,
            kind,
            fire_at: self.now + f64::from(delay.max(0.0)),
        });
        id
    }

    /// Двигает часы; возвращает сработавшие эффекты в порядке fire_at
    pub fn advance(&mut self, delta: f32) -> Vec<EffectKind> {
        self.now += f64::from(delta.max(0.0));

        let now = self.now;
        let mut due: Vec<ScheduledEffect> = Vec::new();
        self.pending.retain(|effect| {
            if effect.fire_at <= now {
                due.push(*effect);
                false
            } else {
                true
            }
        });

        due.sort_by(|a, b| a.fire_at.total_cmp(&b.fire_at).then(a.id.0.cmp(&b.id.0)));
        due.into_iter().map(|effect| effect.kind).collect()
    }

    pub fn cancel(&mut self, id: EffectId) -> bool {
        let before = self.pending.len();
        self.pending.retain(|effect| effect.id != id);
        self.pending.len() != before
    }

    pub fn cancel_kind(&mut self, kind: EffectKind) -> bool {
        let before = self.pending.len();
        self.pending.retain(|effect| effect.kind != kind);
        self.pending.len() != before
    }

    pub fn cancel_all(&mut self) {
        self.pending.clear();
    }

    pub fn is_pending(&self, kind: EffectKind) -> bool {
        self.pending.iter().any(|effect| effect.kind == kind)
    }

    pub fn pending(&self) -> &[ScheduledEffect] {
        &self.pending
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_effect_fires_after_delay() {
        let mut queue = EffectQueue::new();
        queue.schedule(EffectKind::DamageFlash, 0.1);

        assert!(queue.advance(0.05).is_empty());
        assert_eq!(queue.advance(0.06), vec![EffectKind::DamageFlash]);
        assert!(!queue.is_pending(EffectKind::DamageFlash));
    }

    #[test]
    fn test_same_kind_preempts_previous() {
        let mut queue = EffectQueue::new();
        let first = queue.schedule(EffectKind::DamageFlash, 0.1);
        queue.advance(0.08);

        // Новый удар перезапускает flash
        queue.schedule(EffectKind::DamageFlash, 0.1);
        assert!(!queue.cancel(first));
        assert_eq!(queue.pending().len(), 1);

        assert!(queue.advance(0.05).is_empty());
        assert_eq!(queue.advance(0.1), vec![EffectKind::DamageFlash]);
    }

    #[test]
    fn test_different_kinds_are_independent() {
        let mut queue = EffectQueue::new();
        queue.schedule(EffectKind::SpeedBuff, 2.0);
        queue.schedule(EffectKind::DamageFlash, 0.1);

        assert_eq!(queue.advance(0.1), vec![EffectKind::DamageFlash]);
        assert!(queue.is_pending(EffectKind::SpeedBuff));
        assert_eq!(queue.advance(2.0), vec![EffectKind::SpeedBuff]);
    }

    #[test]
    fn test_cancel_all_drops_pending_reverts() {
        let mut queue = EffectQueue::new();
        queue.schedule(EffectKind::SpeedBuff, 1.0);
        queue.schedule(EffectKind::DamageFlash, 0.1);

        queue.cancel_all();
        assert!(queue.advance(5.0).is_empty());
    }
}
