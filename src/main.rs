//! Avoid Boxes entry point
//!
//! On the web this wires the simulation to a 2D canvas, the keyboard and the
//! page's HUD elements. Natively it runs a headless session driven by the
//! autopilot and prints a JSON summary.

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::prelude::*;

#[cfg(target_arch = "wasm32")]
mod wasm_game {
    use std::cell::RefCell;
    use std::rc::Rc;
    use wasm_bindgen::prelude::*;
    use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, KeyboardEvent, MouseEvent};

    use avoid_boxes::render::{DrawCmd, DrawList, colors};
    use avoid_boxes::sim::{Game, InputState, ModeKind, RunToken};
    use avoid_boxes::{GameConfig, UiHooks};

    /// HUD elements updated through the hooks
    struct DomHooks {
        document: Document,
    }

    impl DomHooks {
        fn set_text(&self, id: &str, text: &str) {
            if let Some(el) = self.document.get_element_by_id(id) {
                el.set_text_content(Some(text));
            }
        }

        fn set_hidden(&self, id: &str, hidden: bool) {
            if let Some(el) = self.document.get_element_by_id(id) {
                let _ = el.class_list().toggle_with_force("hidden", hidden);
            }
        }
    }

    impl UiHooks for DomHooks {
        fn report_time(&mut self, display: &str) {
            self.set_text("ui-time", display);
        }

        fn report_score(&mut self, value: u64) {
            self.set_text("ui-score", &value.to_string());
        }

        fn report_invincible(&mut self, ms_left: f64) {
            if ms_left > 0.0 {
                self.set_text("ui-inv", &format!("{:.1}s", ms_left / 1000.0));
                self.set_hidden("pill-inv", false);
            } else {
                self.set_hidden("pill-inv", true);
            }
        }

        fn report_game_over(&mut self, survival_secs: f64) {
            self.set_text("final-time", &avoid_boxes::format_seconds(survival_secs));
            self.set_hidden("game-over", false);
        }

        fn start_clock(&mut self) {
            self.set_hidden("game-over", true);
        }
    }

    struct App {
        game: Game<DomHooks>,
        ctx: CanvasRenderingContext2d,
        input: InputState,
    }

    impl App {
        fn paint(&self) {
            paint(&self.ctx, self.game.draw_list());
        }
    }

    /// Replay a frame's draw commands onto the canvas
    fn paint(ctx: &CanvasRenderingContext2d, list: &DrawList) {
        for cmd in list.commands() {
            match cmd {
                DrawCmd::Background { size, color } => {
                    ctx.set_fill_style_str(&color.css());
                    ctx.fill_rect(0.0, 0.0, size.x as f64, size.y as f64);
                }
                DrawCmd::Border { size, color } => {
                    ctx.set_stroke_style_str(&color.css());
                    ctx.set_line_width(1.0);
                    ctx.stroke_rect(0.5, 0.5, size.x as f64 - 1.0, size.y as f64 - 1.0);
                }
                DrawCmd::Rect { rect, color } => {
                    ctx.set_fill_style_str(&color.css());
                    ctx.fill_rect(
                        rect.pos.x as f64,
                        rect.pos.y as f64,
                        rect.size.x as f64,
                        rect.size.y as f64,
                    );
                }
                DrawCmd::RotatedRect {
                    center,
                    size,
                    angle,
                    color,
                } => {
                    ctx.save();
                    let _ = ctx.translate(center.x as f64, center.y as f64);
                    let _ = ctx.rotate(*angle as f64);
                    ctx.set_fill_style_str(&color.css());
                    ctx.fill_rect(
                        -size.x as f64 / 2.0,
                        -size.y as f64 / 2.0,
                        size.x as f64,
                        size.y as f64,
                    );
                    ctx.restore();
                }
                DrawCmd::Beam {
                    x,
                    width,
                    bottom,
                    height,
                    alpha,
                } => {
                    let (x, w) = (*x as f64, *width as f64);
                    let (bottom, h) = (*bottom as f64, *height as f64);
                    let top = bottom - h;
                    let gradient = ctx.create_linear_gradient(0.0, bottom, 0.0, top);
                    let _ = gradient.add_color_stop(0.0, &colors::BEAM.fade(*alpha).css());
                    let _ = gradient.add_color_stop(1.0, &colors::BEAM.fade(0.0).css());
                    ctx.set_fill_style_canvas_gradient(&gradient);
                    ctx.fill_rect(x, top, w, h);
                    let core = (w * 0.3).max(2.0);
                    ctx.set_fill_style_str(&colors::BEAM_CORE.fade(*alpha).css());
                    ctx.fill_rect(x + (w - core) / 2.0, top, core, h);
                }
                DrawCmd::Lane {
                    x,
                    width,
                    height,
                    fill,
                } => {
                    let (x, w, h) = (*x as f64, *width as f64, *height as f64);
                    ctx.set_fill_style_str(&colors::LANE.css());
                    ctx.fill_rect(x, 0.0, w, h);
                    let core = w * *fill as f64;
                    ctx.set_fill_style_str(&colors::LANE_CORE.css());
                    ctx.fill_rect(x + (w - core) / 2.0, 0.0, core, h);
                }
                DrawCmd::Coin { center, radius } => {
                    ctx.begin_path();
                    let _ = ctx.arc(
                        center.x as f64,
                        center.y as f64,
                        *radius as f64,
                        0.0,
                        std::f64::consts::TAU,
                    );
                    ctx.set_fill_style_str(&colors::COIN.css());
                    ctx.fill();
                    ctx.set_stroke_style_str(&colors::COIN_RIM.css());
                    ctx.set_line_width(2.0);
                    ctx.stroke();
                }
                DrawCmd::Text { text, pos, alpha } => {
                    ctx.save();
                    ctx.set_global_alpha(*alpha as f64);
                    ctx.set_font("bold 18px system-ui, sans-serif");
                    ctx.set_text_align("center");
                    ctx.set_line_width(3.0);
                    ctx.set_stroke_style_str(&colors::FLOATER_OUTLINE.css());
                    let _ = ctx.stroke_text(text, pos.x as f64, pos.y as f64);
                    ctx.set_fill_style_str(&colors::FLOATER.css());
                    let _ = ctx.fill_text(text, pos.x as f64, pos.y as f64);
                    ctx.restore();
                }
            }
        }
    }

    fn now_ms() -> f64 {
        web_sys::window()
            .and_then(|w| w.performance())
            .map(|p| p.now())
            .unwrap_or_else(js_sys::Date::now)
    }

    /// Mode requested with `?mode=`, defaulting to "default"
    fn mode_from_url() -> ModeKind {
        let search = web_sys::window()
            .and_then(|w| w.location().search().ok())
            .unwrap_or_default();
        let requested = web_sys::UrlSearchParams::new_with_str(&search)
            .ok()
            .and_then(|params| params.get("mode"));
        match requested {
            Some(name) => ModeKind::from_name(&name).unwrap_or_else(|| {
                log::warn!("Unknown mode '{}', falling back to default", name);
                ModeKind::Default
            }),
            None => ModeKind::Default,
        }
    }

    pub fn run() -> Result<(), JsValue> {
        console_error_panic_hook::set_once();
        if console_log::init_with_level(log::Level::Info).is_err() {
            web_sys::console::warn_1(&"logger already initialised".into());
        }

        let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
        let document = window
            .document()
            .ok_or_else(|| JsValue::from_str("no document"))?;

        let canvas: HtmlCanvasElement = document
            .get_element_by_id("canvas")
            .ok_or_else(|| JsValue::from_str("no canvas"))?
            .dyn_into()?;
        let ctx: CanvasRenderingContext2d = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("no 2d context"))?
            .dyn_into()?;

        let config = GameConfig::default();
        let dpr = window.device_pixel_ratio();
        canvas.set_width((config.surface_width as f64 * dpr) as u32);
        canvas.set_height((config.surface_height as f64 * dpr) as u32);
        ctx.set_transform(dpr, 0.0, 0.0, dpr, 0.0, 0.0)?;

        let game = Game::new(
            config,
            DomHooks {
                document: document.clone(),
            },
        )
        .map_err(|e| JsValue::from_str(&e.to_string()))?;

        let app = Rc::new(RefCell::new(App {
            game,
            ctx,
            input: InputState::IDLE,
        }));
        app.borrow().paint();

        setup_keyboard(app.clone());
        setup_buttons(app.clone(), &document);

        start(&app, mode_from_url());
        log::info!("Avoid Boxes running");
        Ok(())
    }

    fn start(app: &Rc<RefCell<App>>, kind: ModeKind) {
        let token = {
            let mut a = app.borrow_mut();
            let token = a.game.start(kind, now_ms());
            a.paint();
            token
        };
        request_frame(app.clone(), token);
    }

    fn restart(app: &Rc<RefCell<App>>) {
        let kind = app.borrow().game.current_mode();
        start(app, kind);
    }

    fn request_frame(app: Rc<RefCell<App>>, token: RunToken) {
        let Some(window) = web_sys::window() else {
            return;
        };
        let closure = Closure::once(move |time: f64| {
            frame_loop(app, token, time);
        });
        let _ = window.request_animation_frame(closure.as_ref().unchecked_ref());
        closure.forget();
    }

    /// One refresh; a callback from a replaced run sees a stale token and ends its chain
    fn frame_loop(app: Rc<RefCell<App>>, token: RunToken, time: f64) {
        let status = {
            let mut a = app.borrow_mut();
            let input = a.input;
            let status = a.game.frame(token, time, input);
            a.paint();
            status
        };
        if status.should_continue() {
            request_frame(app, token);
        }
    }

    fn setup_keyboard(app: Rc<RefCell<App>>) {
        let Some(window) = web_sys::window() else {
            return;
        };

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => app.borrow_mut().input.move_left = true,
                    "ArrowRight" | "d" | "D" => app.borrow_mut().input.move_right = true,
                    "r" | "R" => restart(&app),
                    _ => return,
                }
                event.prevent_default();
            });
            let _ = window
                .add_event_listener_with_callback("keydown", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |event: KeyboardEvent| {
                match event.key().as_str() {
                    "ArrowLeft" | "a" | "A" => app.borrow_mut().input.move_left = false,
                    "ArrowRight" | "d" | "D" => app.borrow_mut().input.move_right = false,
                    _ => {}
                }
            });
            let _ = window
                .add_event_listener_with_callback("keyup", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        // Releasing focus must not leave the actor drifting
        {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: web_sys::Event| {
                app.borrow_mut().input = InputState::IDLE;
            });
            let _ = window.add_event_listener_with_callback("blur", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }

    fn setup_buttons(app: Rc<RefCell<App>>, document: &Document) {
        let modes = [
            ("btn-default", ModeKind::Default),
            ("btn-up", ModeKind::Up),
            ("btn-meteor", ModeKind::Meteor),
            ("btn-leaf", ModeKind::Leaf),
            ("btn-chaos", ModeKind::Chaos),
        ];
        for (id, kind) in modes {
            if let Some(btn) = document.get_element_by_id(id) {
                let app = app.clone();
                let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                    start(&app, kind);
                });
                let _ =
                    btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
                closure.forget();
            }
        }

        if let Some(btn) = document.get_element_by_id("btn-restart") {
            let app = app.clone();
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                restart(&app);
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }

        if let Some(btn) = document.get_element_by_id("btn-reset") {
            let closure = Closure::<dyn FnMut(_)>::new(move |_event: MouseEvent| {
                let mut a = app.borrow_mut();
                a.game.reset_all();
                a.paint();
            });
            let _ = btn.add_event_listener_with_callback("click", closure.as_ref().unchecked_ref());
            closure.forget();
        }
    }
}

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen(start)]
pub fn wasm_main() {
    if let Err(e) = wasm_game::run() {
        log::error!("Failed to start: {:?}", e);
    }
}

#[cfg(not(target_arch = "wasm32"))]
mod headless {
    use std::path::PathBuf;

    use avoid_boxes::consts::FRAME_MS;
    use avoid_boxes::hooks::RecordingHooks;
    use avoid_boxes::sim::{Autopilot, Game, ModeKind};
    use avoid_boxes::{ConfigError, GameConfig};
    use clap::Parser;
    use thiserror::Error;

    #[derive(Debug, Error)]
    pub enum RunError {
        #[error(transparent)]
        Config(#[from] ConfigError),
        #[error("failed to encode summary: {0}")]
        Summary(#[from] serde_json::Error),
    }

    /// Play one run with the autopilot and print its summary as JSON
    #[derive(Parser, Debug)]
    #[command(name = "avoid-boxes")]
    pub struct Args {
        /// default, up, meteor, leaf or chaos
        #[arg(default_value = "default", value_parser = parse_mode)]
        mode: ModeKind,
        /// Seconds of simulated play
        #[arg(default_value_t = 30.0, value_parser = parse_seconds)]
        seconds: f64,
        /// JSON config file
        #[arg(long)]
        config: Option<PathBuf>,
        /// RNG seed, overrides the config file
        #[arg(long)]
        seed: Option<u64>,
    }

    fn parse_mode(value: &str) -> Result<ModeKind, String> {
        ModeKind::from_name(value).ok_or_else(|| format!("unknown mode '{value}'"))
    }

    fn parse_seconds(value: &str) -> Result<f64, String> {
        match value.parse::<f64>() {
            Ok(secs) if secs.is_finite() && secs > 0.0 => Ok(secs),
            _ => Err(format!("'{value}' is not a positive number of seconds")),
        }
    }

    pub fn run(args: Args) -> Result<(), RunError> {
        let mut config = match &args.config {
            Some(path) => GameConfig::load(path)?,
            None => GameConfig::default(),
        };
        if args.seed.is_some() {
            config.seed = args.seed;
        }

        let mut game = Game::new(config, RecordingHooks::default())?;
        let pilot = Autopilot::default();

        let mut now = 0.0;
        let token = game.start(args.mode, now);
        let frames = (args.seconds * 1000.0 / FRAME_MS).ceil() as u64;
        for _ in 0..frames {
            now += FRAME_MS;
            let input = pilot.steer_game(&game);
            if !game.frame(token, now, input).should_continue() {
                break;
            }
        }
        if game.is_running() {
            game.stop(now, false);
        }

        let summary = game.summary(now);
        log::info!(
            "{} mode: survived {}s, score {}",
            summary.mode,
            summary.survival_display,
            summary.totals.score
        );
        println!("{}", serde_json::to_string_pretty(&summary)?);
        Ok(())
    }

}

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    use clap::Parser;

    env_logger::init();
    if let Err(e) = headless::run(headless::Args::parse()) {
        log::error!("{}", e);
        eprintln!("error: {}", e);
        std::process::exit(1);
    }
}

#[cfg(target_arch = "wasm32")]
fn main() {
    // WASM entry point is wasm_main, this is just to satisfy the compiler
}
