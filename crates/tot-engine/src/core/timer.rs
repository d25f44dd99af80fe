use crate::api::types::GameEvent;

/// One-shot timers keyed by token.
///
/// Games schedule a delay and watch for the matching `TimerFired` event;
/// there are no callbacks, so timer handling stays inside `update` like
/// every other reaction.
#[derive(Debug, Default)]
pub struct TimerQueue {
    timers: Vec<(u32, f64)>,
    next_token: u32,
}

impl TimerQueue {
    pub fn new() -> Self {
        Self::default()
    }

    /// Schedule a timer to fire `delay_ms` after `now_ms`. Returns its token.
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f64) -> u32 {
        let token = self.next_token;
        self.next_token = self.next_token.wrapping_add(1);
        self.timers.push((token, now_ms + delay_ms));
        token
    }

    /// Cancel a pending timer. Returns false if it already fired or never existed.
    pub fn cancel(&mut self, token: u32) -> bool {
        let before = self.timers.len();
        self.timers.retain(|(t, _)| *t != token);
        self.timers.len() != before
    }

    /// Fire every due timer into `events`, in schedule order.
    pub fn tick(&mut self, now_ms: f64, events: &mut Vec<GameEvent>, max_events: usize) {
        let mut i = 0;
        while i < self.timers.len() {
            let (token, due) = self.timers[i];
            if now_ms >= due {
                self.timers.remove(i);
                crate::api::game::push_event_capped(events, max_events, GameEvent::TimerFired { token });
            } else {
                i += 1;
            }
        }
    }

    pub fn len(&self) -> usize {
        self.timers.len()
    }

    pub fn is_empty(&self) -> bool {
        self.timers.is_empty()
    }

    pub fn clear(&mut self) {
        self.timers.clear();
    }
}
