//! Spawn scheduler
//!
//! A recurring spawn trigger modelled as an owned, cancellable task. At most
//! one task is active; starting a new one cancels the previous. The task is
//! polled from the frame loop, so cancelling takes effect immediately: a
//! cancelled task can never fire again.

use crate::consts::MAX_SPAWNS_PER_FRAME;

/// Identity of one started spawn task
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpawnTaskId(pub u64);

#[derive(Debug, Clone)]
struct SpawnTask {
    id: SpawnTaskId,
    period_ms: f64,
    next_due_ms: f64,
}

#[derive(Debug, Default)]
pub struct SpawnScheduler {
    active: Option<SpawnTask>,
    next_task_id: u64,
}

impl SpawnScheduler {
    pub fn new() -> Self {
        Self::default()
    }

    /// Start firing every `period_ms`, first fire one period after `now_ms`.
    /// Any active task is cancelled first.
    pub fn start(&mut self, now_ms: f64, period_ms: f64) -> SpawnTaskId {
        self.cancel();
        self.next_task_id += 1;
        let id = SpawnTaskId(self.next_task_id);
        self.active = Some(SpawnTask {
            id,
            period_ms,
            next_due_ms: now_ms + period_ms,
        });
        log::debug!("Spawn task {} started ({} ms period)", id.0, period_ms);
        id
    }

    /// Cancel the active task. Returns false if none was active.
    pub fn cancel(&mut self) -> bool {
        match self.active.take() {
            Some(task) => {
                log::debug!("Spawn task {} cancelled", task.id.0);
                true
            }
            None => false,
        }
    }

    pub fn is_active(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_task(&self) -> Option<SpawnTaskId> {
        self.active.as_ref().map(|t| t.id)
    }

    /// Restart the active task's period from `now_ms`.
    ///
    /// Used when the host clock's origin is only known at the first frame.
    pub fn rebase(&mut self, now_ms: f64) {
        if let Some(task) = self.active.as_mut() {
            task.next_due_ms = now_ms + task.period_ms;
        }
    }

    /// Number of spawns due at `now_ms`.
    ///
    /// After a long stall at most `MAX_SPAWNS_PER_FRAME` fire and the rest of
    /// the backlog is dropped.
    pub fn poll(&mut self, now_ms: f64) -> u32 {
        let Some(task) = self.active.as_mut() else {
            return 0;
        };
        let mut fired = 0;
        while now_ms >= task.next_due_ms && fired < MAX_SPAWNS_PER_FRAME {
            task.next_due_ms += task.period_ms;
            fired += 1;
        }
        if now_ms >= task.next_due_ms {
            task.next_due_ms = now_ms + task.period_ms;
        }
        fired
    }
}
