//! Hanoi 3D entry point
//!
//! Handles platform-specific initialization and runs the game loop.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, KeyboardEvent, MouseEvent, PointerEvent};

    use hanoi_3d::consts::MAX_FRAME_DT;
    use hanoi_3d::sim::{Cursor, GameEvent, GameResult};
    use hanoi_3d::{GameConfig, Session, Viewport};

    // Bridge to the page's three.js renderer
    #[wasm_bindgen(inline_js = "
        export function present_frame(json) {
            const renderer = window.hanoiRenderer;
            if (renderer && typeof renderer.draw === 'function') {
                renderer.draw(JSON.parse(json));
            }
        }

        export function label_font_ready() {
            const renderer = window.hanoiRenderer;
            if (!renderer || typeof renderer.fontReady !== 'function') {
                return false;
            }
            return !!renderer.fontReady();
        }
    ")]
    extern "C" {
        fn present_frame(json: &str);
        fn label_font_ready() -> bool;
    }

    /// Game instance holding the session and DOM handles
    struct Game {
        session: Session,
        canvas: HtmlCanvasElement,
        last_time: f64,
        /// The typeface loads after startup; polled each frame until it does
        font_pending: bool,
    }

    impl Game {
        fn new(config: GameConfig, canvas: HtmlCanvasElement) -> Self {
            let viewport = viewport_of(&canvas);
            let mut session = Session::new(config, viewport, js_sys::Date::now());
            let font_ready = label_font_ready();
            session.set_font_available(font_ready);
            Self {
                session,
                canvas,
                last_time: 0.0,
                font_pending: !font_ready,
            }
        }

        /// Advance animations and forward events to the page
        fn update(&mut self, dt: f32) {
            if self.font_pending && label_font_ready() {
                log::info!("Label font loaded");
                self.session.set_font_available(true);
                self.font_pending = false;
            }
            self.session.update(dt, js_sys::Date::now());
            for event in self.session.drain_events() {
                match event {
                    GameEvent::CursorChanged(cursor) => self.set_cursor(cursor),
                    GameEvent::Won(result) => show_result(&result),
                    GameEvent::MoveCompleted { moves, .. } => log::debug!("Moves: {}", moves),
                    GameEvent::LevelStarted { disc_count } => {
                        log::info!("Level started with {} plates", disc_count)
                    }
                }
            }
        }

        fn render(&self) {
            match self.session.snapshot().to_json() {
                Ok(json) => present_frame(&json),
                Err(e) => log::error!("Frame snapshot failed: {}", e),
            }
        }

        fn set_cursor(&self, cursor: Cursor) {
            let _ = self.canvas.style().set_property("cursor", cursor.css());
        }

        fn resize(&mut self) {
            let viewport = viewport_of(&self.canvas);
            self.session.resize(viewport);
        }
    }

    /// Canvas rectangle in client coordinates
    fn viewport_of(canvas: &HtmlCanvasElement) -> Viewport {
        let rect = canvas.get_bounding_client_rect();
        Viewport::new(rect.width() as f32, rect.height() as f32)
            .with_origin(rect.left() as f32, rect.top() as f32)
    }

    fn document() -> Option<Document> {
        web_sys::window()?.document()
    }

    /// Embedded `<script id="hanoi-config" type="application/json">`, or defaults
    fn load_config(document: &Document) -> GameConfig {
        let Some(json) = document
            .get_element_by_id("hanoi-config")
            .and_then(|el| el.text_content())
        else {
            return GameConfig::default();
        };
        match GameConfig::from_json(&json) {
            Ok(config) => {
                log::info!("Loaded page config");
                config
            }
            Err(e) => {
                log::error!("Bad page config ({}), using defaults", e);
                GameConfig::default()
            }
        }
    }

    fn result_box(document: &Document) -> Option<Element> {
        document.query_selector(".result-box").ok().flatten()
    }

    fn toggle_result_box(visible: bool) {
        let Some(document) = document() else {
            return;
        };
        let Some(dialog) = result_box(&document) else {
            return;
        };
        if let Some(backdrop) = dialog
            .parent_element()
            .and_then(|p| p.dyn_into::<HtmlElement>().ok())
        {
            let visibility = if visible { "visible" } else { "hidden" };
            let _ = backdrop.style().set_property("visibility", visibility);
        }
        if visible {
            let _ = dialog.set_attribute("open", "");
        } else {
            let _ = dialog.remove_attribute("open");
        }
    }

    fn show_result(result: &GameResult) {
        let Some(document) = document() else {
            return;
        };
        let Some(dialog) = result_box(&document) else {
            log::info!("{}", result.message());
            return;
        };

        if let Some(info) = dialog.query_selector(".result-info").ok().flatten() {
            info.set_inner_html(&format!(
                "<dt>Plates</dt><dd>{}</dd><dt>Time</dt><dd>{:.1} s</dd><dt>Moves</dt><dd>{}</dd>",
                result.disc_count, result.elapsed_secs, result.moves
            ));
        }

        // Either offer the next level or announce that every level is done
        let (next, complete) = if result.final_level {
            ("none", "")
        } else {
            ("", "none")
        };
        for (selector, display) in [(".js-next-level", next), (".js-all-complete", complete)] {
            if let Some(el) = dialog
                .query_selector(selector)
                .ok()
                .flatten()
                .and_then(|el| el.dyn_into::<HtmlElement>().ok())
            {
                let _ = el.style().set_property("display", display);
            }
        }

        toggle_result_box(true);
    }

    pub fn run() {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"Logger already initialized".into());
        }

        log::info!("Hanoi 3D starting...");

        let Some(document) = document() else {
            log::error!("No document");
            return;
        };

        // Hide loading indicator
        if let Some(loading) = document.get_element_by_id("loading") {
            let _ = loading.set_attribute("class", "hidden");
        }

        let Some(canvas) = document
            .get_element_by_id("canvas")
            .and_then(|el| el.dyn_into::<HtmlCanvasElement>().ok())
        else {
            log::error!("No #canvas element");
            return;
        };

        let config = load_config(&document);
        let game = Rc::new(RefCell::new(Game::new(config, canvas.clone())));
        toggle_result_box(false);

        setup_input_handlers(&canvas, game.clone());
        setup_result_box(&document, game.clone());

        // Start game loop
        request_animation_frame(game);

        log::info!("Hanoi 3D running!");
    }

    fn setup_input_handlers(canvas: &HtmlCanvasElement, game: Rc<RefCell<Game>>) {
        // Pointer move: hover and placement preview
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: PointerEvent| {
                game.borrow_mut()
                    .session
                    .pointer_move_at(event.client_x() as f32, event.client_y() as f32);
            });
            let _ = canvas
                .add_event_listener_with_callback("pointermove", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Click: pick up or put down
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: MouseEvent| {
                game.borrow_mut()
                    .session
                    .click_at(event.client_x() as f32, event.client_y() as f32);
            });
            let _ = canvas.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        let Some(window) = web_sys::window() else {
            return;
        };

        // Canvas moves or changes size with the window
        {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                game.borrow_mut().resize();
            });
            let _ = window.add_event_listener_with_callback("resize", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Keyboard
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                let mut g = game.borrow_mut();
                match event.key().as_str() {
                    "d" | "D" => {
                        let on = !g.session.autoplay();
                        g.session.set_autoplay(on);
                    }
                    "r" | "R" => g.session.replay(js_sys::Date::now()),
                    _ => {}
                }
            });
            let _ = window.add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_result_box(document: &Document, game: Rc<RefCell<Game>>) {
        let Some(dialog) = result_box(document) else {
            log::warn!("No .result-box in page, results only logged");
            return;
        };

        // Next level button
        if let Some(btn) = dialog.query_selector(".js-next-level").ok().flatten() {
            let game = game.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                toggle_result_box(false);
                game.borrow_mut().session.next_level(js_sys::Date::now());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Close button replays the same level
        if let Some(btn) = dialog.query_selector(".btn-close").ok().flatten() {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                toggle_result_box(false);
                game.borrow_mut().session.replay(js_sys::Date::now());
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn request_animation_frame(game: Rc<RefCell<Game>>) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            game_loop(game, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    fn game_loop(game: Rc<RefCell<Game>>, time: f64) {
        {
            let mut g = game.borrow_mut();

            // Calculate delta time
            let dt = if g.last_time > 0.0 {
                ((time - g.last_time) / 1000.0) as f32
            } else {
                0.0
            };
            g.last_time = time;

            g.update(dt.min(MAX_FRAME_DT));
            g.render();
        }

        request_animation_frame(game);
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    wasm_game::run();
}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use hanoi_3d::GameConfig;

    env_logger::init();
    log::info!("Hanoi 3D (native) starting...");
    log::info!("Interactive play needs the browser build - run with `trunk serve`");

    let config = match std::env::args().nth(1) {
        Some(path) => match std::fs::read_to_string(&path)
            .map_err(|e| e.to_string())
            .and_then(|json| GameConfig::from_json(&json).map_err(|e| e.to_string()))
        {
            Ok(config) => config,
            Err(e) => {
                log::error!("Could not load {} ({}), using defaults", path, e);
                GameConfig::default()
            }
        },
        None => GameConfig::default(),
    };

    println!("\nSolving with simulated pointer input...");
    match headless::solve(config) {
        Some(result) => println!("✓ {}", result.message()),
        None => {
            println!("✗ Puzzle not solved");
            std::process::exit(1);
        }
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}

/// Drive a session through the real picking path with projected coordinates
#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use hanoi_3d::scene::EntityRef;
    use hanoi_3d::sim::{GameEvent, GameResult, InteractionState, next_move};
    use hanoi_3d::{GameConfig, Session, Viewport};

    const FRAME: f32 = 1.0 / 60.0;

    struct Clock {
        now_ms: f64,
    }

    impl Clock {
        /// Tick until the session stops animating
        fn settle(&mut self, session: &mut Session) {
            for _ in 0..((10.0 / FRAME) as usize) {
                if !session.is_animating() {
                    return;
                }
                self.now_ms += FRAME as f64 * 1000.0;
                session.update(FRAME, self.now_ms);
            }
            log::warn!("Animations still running after 10 s of frames");
        }
    }

    /// Hover then click `target` at its projected screen position
    fn point_and_click(session: &mut Session, target: EntityRef) -> bool {
        let Some(at) = session.client_point(target) else {
            log::error!("{:?} is not on screen", target);
            return false;
        };
        session.pointer_move_at(at.x, at.y);
        session.click_at(at.x, at.y);
        true
    }

    pub fn solve(config: GameConfig) -> Option<GameResult> {
        let goal = config.goal_pillar;
        let mut session = Session::new(config, Viewport::new(1280.0, 720.0), 0.0);
        let mut clock = Clock { now_ms: 0.0 };
        let limit = (1u64 << session.disc_count()) as usize;

        for _ in 0..limit {
            let Some(next) = next_move(session.stacks(), goal) else {
                break;
            };
            let top = session.stacks().top_disc(next.from)?.id;

            if !point_and_click(&mut session, EntityRef::Disc(top)) {
                return None;
            }
            clock.settle(&mut session);
            if !matches!(session.state(), InteractionState::Holding { disc, .. } if disc == top) {
                log::error!("Pick of disc {} missed (state {:?})", top, session.state());
                return None;
            }

            if !point_and_click(&mut session, EntityRef::Pillar(next.to)) {
                return None;
            }
            clock.settle(&mut session);
            log::info!("{} -> {} ({} moves)", next.from, next.to, session.move_count());
        }

        session.drain_events().into_iter().find_map(|event| match event {
            GameEvent::Won(result) => Some(result),
            _ => None,
        })
    }
}
