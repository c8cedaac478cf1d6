//! UI collaborator seam
//!
//! The core pushes notifications out and never reads UI state back.

/// Receives game notifications. Every method defaults to doing nothing.
pub trait GameObserver {
    fn on_score_changed(&mut self, _score: u32) {}
    fn on_missed_changed(&mut self, _missed: u32, _limit: u32) {}
    fn on_game_over(&mut self, _final_score: u32) {}
    fn on_paused_changed(&mut self, _paused: bool) {}
    /// A new session started; hide any game-over display
    fn on_restarted(&mut self) {}
}

pub fn score_text(score: u32) -> String {
    format!("Score: {}", score)
}

pub fn missed_text(missed: u32, limit: u32) -> String {
    format!("Missed: {} / {}", missed, limit)
}

pub fn game_over_text(final_score: u32) -> String {
    format!("Game Over! Score: {}", final_score)
}

/// Label for the pause toggle button
pub fn pause_button_label(paused: bool) -> &'static str {
    if paused { "Resume" } else { "Pause" }
}

/// Writes HUD updates to the log (headless runs)
#[derive(Debug, Default)]
pub struct LogObserver;

impl GameObserver for LogObserver {
    fn on_score_changed(&mut self, score: u32) {
        log::info!("{}", score_text(score));
    }

    fn on_missed_changed(&mut self, missed: u32, limit: u32) {
        log::info!("{}", missed_text(missed, limit));
    }

    fn on_game_over(&mut self, final_score: u32) {
        log::info!("{}", game_over_text(final_score));
    }

    fn on_paused_changed(&mut self, paused: bool) {
        if paused {
            log::info!("Paused");
        }
    }
}
