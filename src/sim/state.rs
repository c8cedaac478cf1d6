//! Game state machine
//!
//! Score, miss count and phase live here and nowhere else. Every legal
//! transition queues [`GameEvent`]s describing its side effects; the owner
//! drains them and routes them to the scheduler, the registry and the UI.
//! Illegal transitions are silent no-ops.

/// Top-level mode of a session
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GamePhase {
    /// Balloons spawn, move and can be popped
    Running,
    /// Everything is frozen until resumed
    Paused,
    /// Miss limit reached; only a reset leaves this phase
    GameOver,
}

/// Side effect of a state transition
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum GameEvent {
    ScoreChanged(u32),
    MissedChanged { missed: u32, limit: u32 },
    PausedChanged(bool),
    GameOver { final_score: u32 },
    /// A new session began (score and misses zeroed)
    Restarted,
    /// The recurring spawn task must be (re)started
    SpawningStarted,
    /// The recurring spawn task must be cancelled
    SpawningStopped,
    /// Every live balloon must be removed
    BalloonsCleared,
}

/// Score, misses and phase of the current session
#[derive(Debug, Clone)]
pub struct GameState {
    score: u32,
    missed: u32,
    miss_limit: u32,
    phase: GamePhase,
    events: Vec<GameEvent>,
}

impl GameState {
    /// Fresh state in `Running` with nothing queued. Call [`reset`](Self::reset)
    /// to actually start a session.
    pub fn new(miss_limit: u32) -> Self {
        Self {
            score: 0,
            missed: 0,
            miss_limit: miss_limit.max(1),
            phase: GamePhase::Running,
            events: Vec::new(),
        }
    }

    pub fn score(&self) -> u32 {
        self.score
    }

    pub fn missed(&self) -> u32 {
        self.missed
    }

    pub fn miss_limit(&self) -> u32 {
        self.miss_limit
    }

    pub fn phase(&self) -> GamePhase {
        self.phase
    }

    #[inline]
    pub fn is_running(&self) -> bool {
        self.phase == GamePhase::Running
    }

    /// Take all queued events, oldest first
    pub fn drain_events(&mut self) -> Vec<GameEvent> {
        std::mem::take(&mut self.events)
    }

    /// Start a new session from any phase
    pub fn reset(&mut self) {
        self.score = 0;
        self.missed = 0;
        self.phase = GamePhase::Running;
        self.events.extend([
            GameEvent::BalloonsCleared,
            GameEvent::SpawningStarted,
            GameEvent::Restarted,
            GameEvent::ScoreChanged(0),
            GameEvent::MissedChanged {
                missed: 0,
                limit: self.miss_limit,
            },
            GameEvent::PausedChanged(false),
        ]);
        log::info!("Game started (miss limit {})", self.miss_limit);
    }

    /// Running → Paused. Returns whether the transition happened.
    pub fn pause(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            log::debug!("Ignoring pause in {:?}", self.phase);
            return false;
        }
        self.phase = GamePhase::Paused;
        self.events.extend([
            GameEvent::SpawningStopped,
            GameEvent::BalloonsCleared,
            GameEvent::PausedChanged(true),
        ]);
        log::info!("Paused");
        true
    }

    /// Paused → Running. Returns whether the transition happened.
    pub fn resume(&mut self) -> bool {
        if self.phase != GamePhase::Paused {
            log::debug!("Ignoring resume in {:?}", self.phase);
            return false;
        }
        self.phase = GamePhase::Running;
        self.events.extend([
            GameEvent::BalloonsCleared,
            GameEvent::SpawningStarted,
            GameEvent::PausedChanged(false),
        ]);
        log::info!("Resumed");
        true
    }

    /// Pause when running, resume when paused, nothing when over
    pub fn toggle_pause(&mut self) -> bool {
        match self.phase {
            GamePhase::Running => self.pause(),
            GamePhase::Paused => self.resume(),
            GamePhase::GameOver => false,
        }
    }

    /// Count one missed balloon, ending the game at the limit
    pub fn report_miss(&mut self) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.missed += 1;
        self.events.push(GameEvent::MissedChanged {
            missed: self.missed,
            limit: self.miss_limit,
        });
        if self.missed >= self.miss_limit {
            self.phase = GamePhase::GameOver;
            self.events.extend([
                GameEvent::SpawningStopped,
                GameEvent::GameOver {
                    final_score: self.score,
                },
            ]);
            log::info!("Game over! Final score: {}", self.score);
        }
        true
    }

    /// Add `points` to the score
    pub fn report_score(&mut self, points: u32) -> bool {
        if self.phase != GamePhase::Running {
            return false;
        }
        self.score = self.score.saturating_add(points);
        self.events.push(GameEvent::ScoreChanged(self.score));
        true
    }
}
