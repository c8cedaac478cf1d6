//! Balloon Pop entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;

    use glam::{Vec2, Vec3};
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, HtmlButtonElement, HtmlCanvasElement};

    use balloon_pop::renderer::SphereRenderer;
    use balloon_pop::scene::{RayHit, Renderable, RenderableId};
    use balloon_pop::ui::{game_over_text, missed_text, pause_button_label, score_text};
    use balloon_pop::{
        Game, GameConfig, GameObserver, PointerEvent, Scene, SceneGraph, StartupError, Viewport,
    };

    const CANVAS_ID: &str = "game-canvas";

    /// CPU scene graph mirrored to the GPU every frame
    struct WebScene {
        graph: SceneGraph,
        gpu: SphereRenderer,
    }

    impl Scene for WebScene {
        fn add_renderable(&mut self, renderable: Renderable) -> RenderableId {
            self.graph.add_renderable(renderable)
        }

        fn remove_renderable(&mut self, id: RenderableId) {
            self.graph.remove_renderable(id);
        }

        fn set_position(&mut self, id: RenderableId, position: Vec3) {
            self.graph.set_position(id, position);
        }

        fn cast_ray(&self, ndc: Vec2, candidates: &[RenderableId]) -> Vec<RayHit> {
            self.graph.cast_ray(ndc, candidates)
        }

        fn render(&mut self) {
            self.graph.render();
            match self.gpu.render(&self.graph) {
                Ok(()) => {}
                Err(wgpu::SurfaceError::Lost) => {
                    self.gpu.resize(self.gpu.size.0, self.gpu.size.1);
                }
                Err(wgpu::SurfaceError::OutOfMemory) => {
                    log::error!("Out of memory!");
                }
                Err(e) => log::warn!("Render error: {:?}", e),
            }
        }

        /// `width`/`height` are CSS pixels; the surface is sized in device pixels
        fn resize(&mut self, width: u32, height: u32) {
            self.graph.resize(width, height);
            let dpr = web_sys::window()
                .map(|w| w.device_pixel_ratio())
                .unwrap_or(1.0);
            self.gpu
                .resize((width as f64 * dpr) as u32, (height as f64 * dpr) as u32);
        }
    }

    /// Mirrors game notifications into the page's HUD elements
    struct DomObserver {
        document: Document,
    }

    impl DomObserver {
        fn set_text(&self, selector: &str, text: &str) {
            if let Some(el) = self.document.query_selector(selector).ok().flatten() {
                el.set_text_content(Some(text));
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let classes = el.class_list();
                let _ = if hidden {
                    classes.add_1("hidden")
                } else {
                    classes.remove_1("hidden")
                };
            }
        }

        fn pause_button(&self) -> Option<HtmlButtonElement> {
            self.document
                .get_element_by_id("pause-button")
                .and_then(|el| el.dyn_into().ok())
        }
    }

    impl GameObserver for DomObserver {
        fn on_score_changed(&mut self, score: u32) {
            self.set_text("#score", &score_text(score));
        }

        fn on_missed_changed(&mut self, missed: u32, limit: u32) {
            self.set_text("#missed", &missed_text(missed, limit));
        }

        fn on_game_over(&mut self, final_score: u32) {
            self.set_text("#game-over-message h2", &game_over_text(final_score));
            self.set_hidden("game-over-message", false);
            if let Some(btn) = self.pause_button() {
                btn.set_disabled(true);
            }
        }

        fn on_paused_changed(&mut self, paused: bool) {
            self.set_hidden("paused-message", !paused);
            if let Some(btn) = self.pause_button() {
                btn.set_text_content(Some(pause_button_label(paused)));
            }
        }

        fn on_restarted(&mut self) {
            self.set_hidden("game-over-message", true);
            if let Some(btn) = self.pause_button() {
                btn.set_disabled(false);
            }
        }
    }

    type SharedGame = Rc<RefCell<Game<WebScene>>>;

    pub async fn run() -> Result<(), StartupError> {
        log::info!("Balloon Pop starting...");

        let window = web_sys::window().ok_or(StartupError::NoWindow)?;
        let document = window.document().ok_or(StartupError::NoDocument)?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id(CANVAS_ID)
            .ok_or_else(|| StartupError::MissingElement(CANVAS_ID.to_string()))?
            .dyn_into()
            .map_err(|_| StartupError::NotACanvas(CANVAS_ID.to_string()))?;

        let config = match canvas.get_attribute("data-config") {
            Some(json) => GameConfig::from_json(&json)?,
            None => GameConfig::default(),
        };

        // Set canvas size
        let dpr = window.device_pixel_ratio();
        let client_w = canvas.client_width().max(1) as u32;
        let client_h = canvas.client_height().max(1) as u32;
        let width = (client_w as f64 * dpr) as u32;
        let height = (client_h as f64 * dpr) as u32;
        canvas.set_width(width);
        canvas.set_height(height);

        // Initialize WebGPU
        let instance = wgpu::Instance::new(&wgpu::InstanceDescriptor {
            backends: wgpu::Backends::BROWSER_WEBGPU | wgpu::Backends::GL,
            ..Default::default()
        });

        let surface = instance
            .create_surface(wgpu::SurfaceTarget::Canvas(canvas.clone()))
            .map_err(|e| StartupError::Surface(e.to_string()))?;

        let adapter = instance
            .request_adapter(&wgpu::RequestAdapterOptions {
                power_preference: wgpu::PowerPreference::HighPerformance,
                compatible_surface: Some(&surface),
                force_fallback_adapter: false,
            })
            .await
            .map_err(|e| StartupError::NoAdapter(e.to_string()))?;

        log::info!("Using adapter: {:?}", adapter.get_info().name);

        let gpu = SphereRenderer::new(surface, &adapter, width, height).await?;
        let viewport = Viewport::new(client_w as f32, client_h as f32);
        let scene = WebScene {
            graph: SceneGraph::new(viewport),
            gpu,
        };

        let seed = js_sys::Date::now() as u64;
        let mut game = Game::new(config, scene, viewport, seed)?;
        game.subscribe(Box::new(DomObserver {
            document: document.clone(),
        }));
        let game = Rc::new(RefCell::new(game));

        setup_pointer_handler(&canvas, game.clone());
        setup_buttons(&document, game.clone());
        setup_resize(&canvas, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Balloon Pop running!");
        Ok(())
    }

    fn setup_pointer_handler(canvas: &HtmlCanvasElement, game: SharedGame) {
        let closure = Closure::<dyn FnMut(_)>::new(move |event: web_sys::PointerEvent| {
            event.prevent_default();
            let pointer = PointerEvent {
                x: event.offset_x() as f32,
                y: event.offset_y() as f32,
                timestamp_ms: event.time_stamp(),
            };
            game.borrow_mut().pointer_down(pointer);
        });
        let _ = canvas
            .add_event_listener_with_callback("pointerdown", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn setup_buttons(document: &Document, game: SharedGame) {
        if let Some(btn) = document.get_element_by_id("restart-button") {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                let seed = js_sys::Date::now() as u64;
                game.borrow_mut().restart_with_seed(seed);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("No #restart-button on page");
        }

        if let Some(btn) = document.get_element_by_id("pause-button") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::MouseEvent| {
                game.borrow_mut().toggle_pause();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        } else {
            log::warn!("No #pause-button on page");
        }
    }

    fn setup_resize(canvas: &HtmlCanvasElement, game: SharedGame) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let canvas = canvas.clone();
        let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
            let dpr = web_sys::window()
                .map(|w| w.device_pixel_ratio())
                .unwrap_or(1.0);
            let client_w = canvas.client_width().max(0) as u32;
            let client_h = canvas.client_height().max(0) as u32;
            canvas.set_width((client_w as f64 * dpr) as u32);
            canvas.set_height((client_h as f64 * dpr) as u32);
            game.borrow_mut().resize(client_w, client_h);
        });
        let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn request_animation_frame(game: SharedGame) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: SharedGame, time: f64) {
        game.borrow_mut().frame(time);
        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub async fn wasm_main() {
    console_error_panic_hook::set_once();
    if console_log::init_with_level(log::Level::Info).is_err() {
        web_sys::console::warn_1(&"Logger already initialized".into());
    }

    if let Err(e) = wasm_game::run().await {
        log::error!("Startup failed: {}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    env_logger::init();
    log::info!("Balloon Pop (native) starting...");
    log::info!("Native mode runs a headless autopilot session - use `trunk serve` for the web version");

    if let Err(e) = headless::run(std::env::args().skip(1)) {
        log::error!("{}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Headless session on a virtual 60 fps clock
///
/// Usage: `balloon-pop [config.json] [seed]`
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use thiserror::Error;

    use balloon_pop::sim::GamePhase;
    use balloon_pop::ui::LogObserver;
    use balloon_pop::{ConfigError, Game, GameConfig, PointerEvent, SceneGraph, Viewport};

    const FRAME_MS: f64 = 1000.0 / 60.0;
    /// Autopilot reaction time, slow enough that balloons eventually escape
    const CLICK_EVERY_FRAMES: u64 = 75;
    const MAX_FRAMES: u64 = 60 * 180;
    const DEFAULT_SEED: u64 = 42;

    #[derive(Debug, Error)]
    pub enum DemoError {
        #[error("failed to read config file: {0}")]
        Io(#[from] std::io::Error),
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error("invalid seed: {0}")]
        Seed(#[from] std::num::ParseIntError),
    }

    pub fn run(mut args: impl Iterator<Item = String>) -> Result<(), DemoError> {
        let config = match args.next() {
            Some(path) => {
                log::info!("Loading config from {}", path);
                GameConfig::from_json(&std::fs::read_to_string(path)?)?
            }
            None => GameConfig::default(),
        };
        let seed = match args.next() {
            Some(s) => s.parse()?,
            None => DEFAULT_SEED,
        };

        let viewport = Viewport::new(800.0, 600.0);
        let mut game = Game::new(config, SceneGraph::new(viewport), viewport, seed)?;
        game.subscribe(Box::new(LogObserver));

        let mut frames = 0;
        while frames < MAX_FRAMES && game.phase() != GamePhase::GameOver {
            let now = frames as f64 * FRAME_MS;
            game.frame(now);

            if frames % CLICK_EVERY_FRAMES == 0 {
                if let Some(target) = highest_balloon_on_screen(&game) {
                    game.pointer_down(PointerEvent {
                        x: target.x,
                        y: target.y,
                        timestamp_ms: now,
                    });
                }
            }
            frames += 1;
        }

        log::info!(
            "Session ended after {:.1}s ({} frames rendered): score {}, missed {} / {}",
            frames as f64 * FRAME_MS / 1000.0,
            game.scene().frames_rendered(),
            game.state().score(),
            game.state().missed(),
            game.state().miss_limit()
        );
        Ok(())
    }

    /// Screen position of the balloon closest to escaping
    fn highest_balloon_on_screen(game: &Game<SceneGraph>) -> Option<glam::Vec2> {
        let balloon = game
            .registry()
            .live_balloons()
            .iter()
            .max_by(|a, b| a.pos.y.total_cmp(&b.pos.y))?;
        game.scene()
            .camera()
            .world_to_screen(balloon.pos, game.viewport())
    }
}
