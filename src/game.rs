//! Game orchestration
//!
//! `Game` owns the state machine, the balloon registry, the spawn scheduler
//! and the scene, and wires them together. Hosts call [`Game::frame`] once
//! per display frame, [`Game::pointer_down`] from input handlers, and the
//! control triggers from buttons. Every state transition's events are routed
//! before the triggering call returns.

use rand::SeedableRng;
use rand_pcg::Pcg32;

use crate::Viewport;
use crate::config::GameConfig;
use crate::consts::MAX_FRAME_DELTA_MS;
use crate::error::ConfigError;
use crate::scene::Scene;
use crate::sim::{
    BalloonId, BalloonRegistry, GameEvent, GamePhase, GameState, SpawnScheduler, resolve_click,
    tick,
};
use crate::ui::GameObserver;

/// A pointer press or tap in screen pixels
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PointerEvent {
    pub x: f32,
    pub y: f32,
    pub timestamp_ms: f64,
}

/// Game instance holding all session state
pub struct Game<S: Scene> {
    config: GameConfig,
    state: GameState,
    registry: BalloonRegistry,
    scheduler: SpawnScheduler,
    scene: S,
    rng: Pcg32,
    seed: u64,
    observers: Vec<Box<dyn GameObserver>>,
    viewport: Viewport,
    /// Latest frame timestamp (ms)
    clock_ms: f64,
    last_frame_ms: Option<f64>,
    accumulator_ms: f64,
}

impl<S: Scene> Game<S> {
    /// Validate `config` and start a session immediately
    pub fn new(config: GameConfig, scene: S, viewport: Viewport, seed: u64) -> Result<Self, ConfigError> {
        config.validate()?;
        let mut game = Self {
            state: GameState::new(config.miss_limit),
            config,
            registry: BalloonRegistry::new(),
            scheduler: SpawnScheduler::new(),
            scene,
            rng: Pcg32::seed_from_u64(seed),
            seed,
            observers: Vec::new(),
            viewport,
            clock_ms: 0.0,
            last_frame_ms: None,
            accumulator_ms: 0.0,
        };
        log::info!("Game initialized with seed: {}", seed);
        game.restart();
        Ok(game)
    }

    pub fn config(&self) -> &GameConfig {
        &self.config
    }

    pub fn state(&self) -> &GameState {
        &self.state
    }

    pub fn phase(&self) -> GamePhase {
        self.state.phase()
    }

    pub fn registry(&self) -> &BalloonRegistry {
        &self.registry
    }

    pub fn scheduler(&self) -> &SpawnScheduler {
        &self.scheduler
    }

    pub fn scene(&self) -> &S {
        &self.scene
    }

    pub fn scene_mut(&mut self) -> &mut S {
        &mut self.scene
    }

    pub fn viewport(&self) -> Viewport {
        self.viewport
    }

    pub fn seed(&self) -> u64 {
        self.seed
    }

    /// Subscribe to notifications. The observer is brought up to date at once.
    pub fn subscribe(&mut self, mut observer: Box<dyn GameObserver>) {
        observer.on_score_changed(self.state.score());
        observer.on_missed_changed(self.state.missed(), self.state.miss_limit());
        observer.on_paused_changed(self.state.phase() == GamePhase::Paused);
        if self.state.phase() == GamePhase::GameOver {
            observer.on_game_over(self.state.score());
        }
        self.observers.push(observer);
    }

    /// Display frame callback: spawn, advance, render
    pub fn frame(&mut self, now_ms: f64) {
        self.clock_ms = now_ms;
        if self.last_frame_ms.is_none() {
            // Host clocks don't start at zero; spawning runs from the first frame
            self.scheduler.rebase(now_ms);
        }

        for _ in 0..self.scheduler.poll(now_ms) {
            self.spawn_one();
        }

        let delta = match self.last_frame_ms {
            Some(last) => (now_ms - last).clamp(0.0, MAX_FRAME_DELTA_MS),
            None => 0.0,
        };
        self.last_frame_ms = Some(now_ms);

        if self.state.is_running() {
            let tick_ms = self.config.tick_ms();
            self.accumulator_ms += delta;
            let mut substeps = 0;
            while self.accumulator_ms >= tick_ms && substeps < self.config.max_substeps {
                self.tick();
                self.accumulator_ms -= tick_ms;
                substeps += 1;
            }
            // Drop whatever a slow frame could not catch up on
            self.accumulator_ms = self.accumulator_ms.min(tick_ms);
        } else {
            self.accumulator_ms = 0.0;
        }

        self.scene.render();
    }

    /// One kinematic step. Returns the misses it caused.
    pub fn tick(&mut self) -> u32 {
        let misses = tick(&mut self.state, &mut self.registry, &mut self.scene, &self.config);
        self.dispatch();
        misses
    }

    /// Spawn one balloon now (no-op unless running)
    pub fn spawn_one(&mut self) -> Option<BalloonId> {
        self.registry
            .spawn_one(&self.state, &self.config, &mut self.scene, &mut self.rng)
    }

    /// Pop whatever balloon is under the pointer
    pub fn pointer_down(&mut self, event: PointerEvent) -> Option<BalloonId> {
        let popped = resolve_click(
            &mut self.state,
            &mut self.registry,
            &mut self.scene,
            glam::Vec2::new(event.x, event.y),
            self.viewport,
        );
        if let Some(id) = popped {
            log::debug!("Pointer at {:.0} ms popped balloon {}", event.timestamp_ms, id.0);
        }
        self.dispatch();
        popped
    }

    pub fn pause(&mut self) -> bool {
        let changed = self.state.pause();
        self.dispatch();
        changed
    }

    pub fn resume(&mut self) -> bool {
        let changed = self.state.resume();
        self.dispatch();
        changed
    }

    /// Pause/resume button
    pub fn toggle_pause(&mut self) -> bool {
        let changed = self.state.toggle_pause();
        self.dispatch();
        changed
    }

    /// Restart button: new session from any phase
    pub fn restart(&mut self) {
        self.state.reset();
        self.dispatch();
    }

    /// Restart with a fresh RNG seed
    pub fn restart_with_seed(&mut self, seed: u64) {
        self.seed = seed;
        self.rng = Pcg32::seed_from_u64(seed);
        log::info!("Game restarted with seed: {}", seed);
        self.restart();
    }

    pub fn resize(&mut self, width: u32, height: u32) {
        if width == 0 || height == 0 {
            return;
        }
        self.viewport = Viewport::new(width as f32, height as f32);
        self.scene.resize(width, height);
    }

    /// Route queued state events to their collaborators
    fn dispatch(&mut self) {
        for event in self.state.drain_events() {
            match event {
                GameEvent::SpawningStarted => {
                    self.scheduler.start(self.clock_ms, self.config.spawn_period_ms);
                    self.accumulator_ms = 0.0;
                }
                GameEvent::SpawningStopped => {
                    self.scheduler.cancel();
                }
                GameEvent::BalloonsCleared => {
                    self.registry.remove_all(&mut self.scene);
                }
                GameEvent::ScoreChanged(score) => {
                    for o in &mut self.observers {
                        o.on_score_changed(score);
                    }
                }
                GameEvent::MissedChanged { missed, limit } => {
                    for o in &mut self.observers {
                        o.on_missed_changed(missed, limit);
                    }
                }
                GameEvent::PausedChanged(paused) => {
                    for o in &mut self.observers {
                        o.on_paused_changed(paused);
                    }
                }
                GameEvent::GameOver { final_score } => {
                    for o in &mut self.observers {
                        o.on_game_over(final_score);
                    }
                }
                GameEvent::Restarted => {
                    for o in &mut self.observers {
                        o.on_restarted();
                    }
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::DriftRange;
    use crate::scene::SceneGraph;
    use glam::Vec3;
    use proptest::prelude::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    const VIEWPORT: Viewport = Viewport {
        width: 1280.0,
        height: 720.0,
    };

    #[derive(Debug, Clone, PartialEq)]
    enum Note {
        Score(u32),
        Missed(u32, u32),
        Over(u32),
        Paused(bool),
        Restarted,
    }

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<Note>>>);

    impl Recorder {
        fn take(&self) -> Vec<Note> {
            std::mem::take(&mut *self.0.borrow_mut())
        }
    }

    impl GameObserver for Recorder {
        fn on_score_changed(&mut self, score: u32) {
            self.0.borrow_mut().push(Note::Score(score));
        }
        fn on_missed_changed(&mut self, missed: u32, limit: u32) {
            self.0.borrow_mut().push(Note::Missed(missed, limit));
        }
        fn on_game_over(&mut self, final_score: u32) {
            self.0.borrow_mut().push(Note::Over(final_score));
        }
        fn on_paused_changed(&mut self, paused: bool) {
            self.0.borrow_mut().push(Note::Paused(paused));
        }
        fn on_restarted(&mut self) {
            self.0.borrow_mut().push(Note::Restarted);
        }
    }

    fn still_config() -> GameConfig {
        GameConfig {
            drift_x: DriftRange { min: 0.0, max: 0.0 },
            drift_z: DriftRange { min: 0.0, max: 0.0 },
            ..Default::default()
        }
    }

    fn new_game(config: GameConfig) -> (Game<SceneGraph>, Recorder) {
        let mut game = Game::new(config, SceneGraph::new(VIEWPORT), VIEWPORT, 1234).expect("valid");
        let recorder = Recorder::default();
        game.subscribe(Box::new(recorder.clone()));
        recorder.take();
        (game, recorder)
    }

    /// Drive frames at 60 fps from `start` for `ms`
    fn run_frames(game: &mut Game<SceneGraph>, start: f64, ms: f64) -> f64 {
        let step = 1000.0 / 60.0;
        let mut t = start;
        while t < start + ms {
            t += step;
            game.frame(t);
        }
        t
    }

    fn screen_of(game: &Game<SceneGraph>, pos: Vec3) -> PointerEvent {
        let p = game
            .scene()
            .camera()
            .world_to_screen(pos, game.viewport())
            .expect("visible");
        PointerEvent {
            x: p.x,
            y: p.y,
            timestamp_ms: 0.0,
        }
    }

    #[test]
    fn test_new_game_starts_running_with_spawner() {
        let (game, _) = new_game(GameConfig::default());
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(game.scheduler().is_active());
        assert!(game.registry().is_empty());
    }

    #[test]
    fn test_invalid_config_fails_fast() {
        let config = GameConfig {
            miss_limit: 0,
            ..Default::default()
        };
        assert!(Game::new(config, SceneGraph::new(VIEWPORT), VIEWPORT, 1).is_err());
    }

    #[test]
    fn test_subscribe_brings_observer_up_to_date() {
        let mut game = Game::new(
            GameConfig::default(),
            SceneGraph::new(VIEWPORT),
            VIEWPORT,
            1,
        )
        .expect("valid");
        let recorder = Recorder::default();
        game.subscribe(Box::new(recorder.clone()));
        assert_eq!(
            recorder.take(),
            vec![Note::Score(0), Note::Missed(0, 5), Note::Paused(false)]
        );
    }

    #[test]
    fn test_frames_spawn_on_period_and_render_every_frame() {
        let (mut game, _) = new_game(GameConfig::default());
        game.frame(0.0);
        run_frames(&mut game, 0.0, 3050.0);
        assert_eq!(game.registry().len(), 3);
        assert!(game.scene().frames_rendered() >= 180);
    }

    #[test]
    fn test_first_frame_late_clock_spawns_one_per_period() {
        let (mut game, _) = new_game(GameConfig::default());
        game.frame(4500.0);
        assert!(game.registry().is_empty());

        // Due one period after the first frame, not in a catch-up burst
        let t = run_frames(&mut game, 4500.0, 950.0);
        assert!(t < 5500.0);
        assert!(game.registry().is_empty());
        run_frames(&mut game, t, 100.0);
        assert_eq!(game.registry().len(), 1);
    }

    #[test]
    fn test_scenario_a_balloon_escapes_as_miss() {
        let (mut game, recorder) = new_game(still_config());
        let id = game.spawn_one().expect("running");
        assert_eq!(game.registry().get(id).expect("live").pos.y, -6.0);

        for _ in 0..790 {
            game.tick();
        }
        assert!(game.registry().contains(id));

        for _ in 0..20 {
            game.tick();
        }
        assert_eq!(game.state().missed(), 1);
        assert!(!game.registry().contains(id));
        assert!(game.scene().is_empty());
        assert_eq!(recorder.take(), vec![Note::Missed(1, 5)]);
    }

    #[test]
    fn test_scenario_b_miss_limit_ends_game() {
        let (mut game, recorder) = new_game(GameConfig::default());
        for _ in 0..4 {
            game.state.report_miss();
            game.dispatch();
        }
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(game.scheduler().is_active());

        game.state.report_miss();
        game.dispatch();
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(!game.scheduler().is_active());
        assert!(recorder.take().contains(&Note::Over(0)));

        game.frame(0.0);
        run_frames(&mut game, 0.0, 5000.0);
        assert!(game.registry().is_empty());
        assert_eq!(game.state().missed(), 5);
        // Rendering continues while over
        assert!(game.scene().frames_rendered() > 0);
    }

    #[test]
    fn test_scenario_c_click_pops_then_misses() {
        let (mut game, recorder) = new_game(GameConfig::default());
        let id = game.spawn_one().expect("running");
        let pos = game.registry().get(id).expect("live").pos;
        let click = screen_of(&game, pos);

        assert_eq!(game.pointer_down(click), Some(id));
        assert_eq!(game.state().score(), 1);
        assert!(game.registry().is_empty());
        assert_eq!(recorder.take(), vec![Note::Score(1)]);

        assert_eq!(game.pointer_down(click), None);
        assert_eq!(game.state().score(), 1);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_scenario_d_pause_clears_balloons() {
        let (mut game, recorder) = new_game(GameConfig::default());
        for _ in 0..3 {
            game.spawn_one();
        }
        assert_eq!(game.registry().len(), 3);

        assert!(game.toggle_pause());
        assert_eq!(game.phase(), GamePhase::Paused);
        assert!(game.registry().is_empty());
        assert!(game.scene().is_empty());
        assert!(!game.scheduler().is_active());
        assert_eq!(recorder.take(), vec![Note::Paused(true)]);

        game.frame(0.0);
        let t = run_frames(&mut game, 0.0, 3000.0);
        assert!(game.registry().is_empty());

        assert!(game.toggle_pause());
        assert_eq!(game.phase(), GamePhase::Running);
        assert!(game.registry().is_empty());
        assert!(game.scheduler().is_active());
        assert_eq!(recorder.take(), vec![Note::Paused(false)]);

        run_frames(&mut game, t, 1100.0);
        assert_eq!(game.registry().len(), 1);
    }

    #[test]
    fn test_scenario_e_reset_from_game_over() {
        let config = GameConfig {
            miss_limit: 1,
            ..Default::default()
        };
        let (mut game, recorder) = new_game(config);
        game.spawn_one();
        game.state.report_score(3);
        game.state.report_miss();
        game.dispatch();
        assert_eq!(game.phase(), GamePhase::GameOver);
        recorder.take();

        game.restart();
        assert_eq!(game.phase(), GamePhase::Running);
        assert_eq!(game.state().score(), 0);
        assert_eq!(game.state().missed(), 0);
        assert!(game.registry().is_empty());
        assert!(game.scheduler().is_active());
        assert_eq!(
            recorder.take(),
            vec![
                Note::Restarted,
                Note::Score(0),
                Note::Missed(0, 1),
                Note::Paused(false)
            ]
        );
    }

    #[test]
    fn test_pause_ignored_when_game_over() {
        let config = GameConfig {
            miss_limit: 1,
            ..Default::default()
        };
        let (mut game, recorder) = new_game(config);
        game.state.report_miss();
        game.dispatch();
        recorder.take();

        assert!(!game.toggle_pause());
        assert!(!game.pause());
        assert!(!game.resume());
        assert_eq!(game.phase(), GamePhase::GameOver);
        assert!(recorder.take().is_empty());
    }

    #[test]
    fn test_frames_advance_at_fixed_rate() {
        let (mut game, _) = new_game(still_config());
        let id = game.spawn_one().expect("running");
        game.frame(0.0);
        // One second at 60 Hz = 60 ticks
        run_frames(&mut game, 0.0, 1000.0);
        let y = game.registry().get(id).expect("live").pos.y;
        assert!((y - (-6.0 + 60.0 * 0.02)).abs() < 0.05);
    }

    #[test]
    fn test_long_stall_is_clamped() {
        let (mut game, _) = new_game(still_config());
        let id = game.spawn_one().expect("running");
        game.frame(0.0);
        game.frame(5000.0);
        // 100 ms cap = 5 or 6 ticks depending on rounding
        let y = game.registry().get(id).expect("live").pos.y;
        assert!(y > -6.0 + 4.5 * 0.02 && y < -6.0 + 6.5 * 0.02);
    }

    #[test]
    fn test_paused_time_is_not_replayed() {
        let (mut game, _) = new_game(still_config());
        game.frame(0.0);
        game.pause();
        game.frame(90.0);
        game.resume();
        let id = game.spawn_one().expect("running");
        game.frame(100.0);
        let y = game.registry().get(id).expect("live").pos.y;
        assert!(y < -5.9);
    }

    #[test]
    fn test_restart_with_seed_is_deterministic() {
        let (mut a, _) = new_game(GameConfig::default());
        let (mut b, _) = new_game(GameConfig::default());
        a.restart_with_seed(99);
        b.restart_with_seed(99);
        for _ in 0..5 {
            a.spawn_one();
            b.spawn_one();
        }
        for (x, y) in a.registry().live_balloons().iter().zip(b.registry().live_balloons()) {
            assert_eq!(x.pos, y.pos);
            assert_eq!(x.drift, y.drift);
            assert_eq!(x.color, y.color);
        }
    }

    #[test]
    fn test_resize_updates_viewport() {
        let (mut game, _) = new_game(GameConfig::default());
        game.resize(640, 480);
        assert_eq!(game.viewport(), Viewport::new(640.0, 480.0));
        game.resize(0, 480);
        assert_eq!(game.viewport(), Viewport::new(640.0, 480.0));
    }

    #[derive(Debug, Clone)]
    enum Action {
        Frame(u16),
        Tick,
        Spawn,
        Click(u16, u16),
        TogglePause,
        Restart,
    }

    fn action() -> impl Strategy<Value = Action> {
        prop_oneof![
            (1u16..200).prop_map(Action::Frame),
            Just(Action::Tick),
            Just(Action::Spawn),
            (0u16..1280, 0u16..720).prop_map(|(x, y)| Action::Click(x, y)),
            Just(Action::TogglePause),
            Just(Action::Restart),
        ]
    }

    proptest! {
        #[test]
        fn prop_session_invariants(actions in prop::collection::vec(action(), 1..200)) {
            let config = GameConfig {
                miss_limit: 3,
                vertical_speed: 0.5,
                ..Default::default()
            };
            let (mut game, _) = new_game(config);
            let mut now = 0.0;
            let mut last = (0, 0);

            for action in actions {
                let restarted = matches!(action, Action::Restart);
                let before_phase = game.phase();
                let before_live = game.registry().len();
                match action {
                    Action::Frame(ms) => {
                        now += ms as f64;
                        game.frame(now);
                    }
                    Action::Tick => {
                        game.tick();
                    }
                    Action::Spawn => {
                        game.spawn_one();
                    }
                    Action::Click(x, y) => {
                        game.pointer_down(PointerEvent { x: x as f32, y: y as f32, timestamp_ms: now });
                    }
                    Action::TogglePause => {
                        game.toggle_pause();
                    }
                    Action::Restart => game.restart(),
                }

                let state = game.state();
                // Miss limit implies game over
                if state.missed() >= state.miss_limit() {
                    prop_assert_eq!(state.phase(), GamePhase::GameOver);
                }
                // Suspended phases admit no spawning and no motion
                if state.phase() != GamePhase::Running {
                    prop_assert!(!game.scheduler().is_active());
                }
                if before_phase != GamePhase::Running && state.phase() == before_phase {
                    prop_assert_eq!(game.registry().len(), before_live);
                }
                if state.phase() == GamePhase::Paused {
                    prop_assert!(game.registry().is_empty());
                }
                // Counters only move forward within a session
                if restarted {
                    prop_assert_eq!((state.score(), state.missed()), (0, 0));
                } else {
                    prop_assert!(state.score() >= last.0);
                    prop_assert!(state.missed() >= last.1);
                }
                last = (state.score(), state.missed());
                // No orphan renderables
                prop_assert_eq!(game.scene().len(), game.registry().len() * 2);
            }
        }
    }
}
