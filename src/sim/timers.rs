//! One-shot delayed tasks
//!
//! Tasks live inside the session, so tearing the session down drops every
//! pending task. Tasks that name an entity resolve it through its pool
//! handle when they fire; if the entity is gone they do nothing.

use super::pool::Handle;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TimedTask {
    /// Ask the wave director for the next wave
    StartWave,
    /// Remove the hit tint from an enemy
    ClearEnemyTint(Handle),
}

#[derive(Debug, Clone)]
struct Scheduled {
    due_ms: f64,
    task: TimedTask,
}

/// Pending tasks, fired in due order (ties in scheduling order)
#[derive(Debug, Clone, Default)]
pub struct Timers {
    pending: Vec<Scheduled>,
}

impl Timers {
    /// Run `task` once, `delay_ms` after `now_ms`
    pub fn schedule(&mut self, now_ms: f64, delay_ms: f32, task: TimedTask) {
        let due_ms = now_ms + delay_ms as f64;
        // Insert after every task due at or before this one to keep FIFO ties
        let at = self.pending.partition_point(|s| s.due_ms <= due_ms);
        self.pending.insert(at, Scheduled { due_ms, task });
        log::debug!("Scheduled {:?} at {:.0}ms", task, due_ms);
    }

    /// Remove and return every task due at `now_ms`
    pub fn take_due(&mut self, now_ms: f64) -> Vec<TimedTask> {
        let split = self.pending.partition_point(|s| s.due_ms <= now_ms);
        self.pending.drain(..split).map(|s| s.task).collect()
    }

    pub fn is_pending(&self, pred: impl Fn(&TimedTask) -> bool) -> bool {
        self.pending.iter().any(|s| pred(&s.task))
    }

    pub fn len(&self) -> usize {
        self.pending.len()
    }

    pub fn is_empty(&self) -> bool {
        self.pending.is_empty()
    }
}
