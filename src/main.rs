/// Entry point and game loop.

mod config;
mod domain;
mod sim;
mod ui;

use std::path::PathBuf;
use std::time::{Duration, Instant};

use crossterm::event::KeyCode;
use log::{info, warn};

use config::GameConfig;
use sim::event::GameEvent;
use sim::save;
use sim::step;
use sim::world::World;
use ui::gamepad::GamepadState;
use ui::input::{self as keys, Controls, InputState};
use ui::renderer::{Renderer, Screen};
use ui::sound::{cues, SoundEngine};

const FRAME_SLEEP: Duration = Duration::from_millis(5);
const LOG_FILE: &str = "corridor-descent.log";

/// Everything the loop owns besides the terminal.
struct App {
    config: GameConfig,
    world: World,
    screen: Screen,
    /// Persisted best depth, updated as soon as a run beats it.
    best: u32,
    save_path: PathBuf,
}

impl App {
    fn new(config: GameConfig) -> Self {
        let save_path = save::save_path(&config.save_file);
        let best = match save::load_best(&save_path) {
            Ok(b) => b,
            Err(e) => {
                warn!("ignoring save file {}: {e}", save_path.display());
                0
            }
        };
        info!("best depth so far: {best}");
        let world = World::new(config.clone(), best);
        App { config, world, screen: Screen::Title, best, save_path }
    }

    fn restart(&mut self) {
        self.world = World::new(self.config.clone(), self.best);
        self.screen = Screen::Playing;
    }

    /// React to a tick's events outside the simulation: persistence and
    /// the run-over screen.
    fn absorb(&mut self, events: &[GameEvent]) {
        for ev in events {
            match ev {
                GameEvent::NewRecord { depth } if *depth as u32 > self.best => {
                    self.best = *depth as u32;
                    if let Err(e) = save::save_best(&self.save_path, self.best) {
                        warn!("could not save best depth: {e}");
                    }
                }
                GameEvent::PlayerDied { best_depth } => {
                    info!("run over at depth {best_depth}");
                    self.screen = Screen::RunOver;
                }
                _ => {}
            }
        }
    }
}

fn main() {
    init_logging();
    let config = GameConfig::load();
    let mut app = App::new(config);

    let mut renderer = Renderer::new();
    if let Err(e) = renderer.init() {
        eprintln!("Terminal init failed: {e}");
        return;
    }

    let sound = SoundEngine::new();
    let result = game_loop(&mut app, &mut renderer, sound.as_ref());

    if let Err(e) = renderer.cleanup() {
        eprintln!("Terminal cleanup failed: {e}");
    }
    if let Err(e) = result {
        eprintln!("Game error: {e}");
    }

    println!();
    println!("Thanks for playing Corridor Descent!");
    println!("Deepest run: {}", app.best);
}

/// The terminal is in raw mode, so logs go to a file. Logging stays off
/// if the file cannot be opened.
fn init_logging() {
    let path = std::env::var("CORRIDOR_DESCENT_LOG").unwrap_or_else(|_| LOG_FILE.to_string());
    let Ok(file) = std::fs::OpenOptions::new().create(true).append(true).open(&path) else { return };
    let _ = env_logger::Builder::from_env(env_logger::Env::default().default_filter_or("info"))
        .target(env_logger::Target::Pipe(Box::new(file)))
        .try_init();
}

fn game_loop(
    app: &mut App,
    renderer: &mut Renderer,
    sound: Option<&SoundEngine>,
) -> Result<(), Box<dyn std::error::Error>> {
    let mut kb = InputState::new();
    kb.honor_release = renderer.key_release;
    let mut gp = GamepadState::new(&app.config.gamepad);
    info!("gamepad connected: {}", gp.connected);
    let tick_rate = Duration::from_millis(app.config.input.tick_rate_ms.max(1));
    let dt = tick_rate.as_secs_f32();
    let mode = app.config.input.mode;

    let mut last_tick = Instant::now();
    // Presses seen between ticks, so none is lost to the frame rate.
    let mut pending = Controls::default();

    loop {
        kb.drain_events();
        gp.update();

        if kb.ctrl_c_pressed() || handle_meta(app, &kb, &gp) {
            break;
        }

        if app.screen == Screen::Playing {
            pending = pending.or(kb.pressed_controls()).or(gp.pressed_controls());
        }

        if last_tick.elapsed() >= tick_rate {
            if app.screen == Screen::Playing {
                let held = kb.held_controls().or(gp.held_controls());
                let input = keys::compose(mode, held, std::mem::take(&mut pending));
                let events = step::step(&mut app.world, &input, dt);
                if let Some(sfx) = sound {
                    for cue in cues(&events, app.world.player) {
                        sfx.play(cue);
                    }
                }
                app.absorb(&events);
            }
            last_tick = Instant::now();
        }

        renderer.render(&app.world, app.screen)?;
        std::thread::sleep(FRAME_SLEEP);
    }

    Ok(())
}

/// Screen changes. Returns true to quit.
fn handle_meta(app: &mut App, kb: &InputState, gp: &GamepadState) -> bool {
    let confirm = kb.was_pressed(KeyCode::Enter) || gp.confirm_pressed();
    let quit = kb.was_pressed(KeyCode::Esc) || gp.cancel_pressed();
    let pause = kb.was_pressed(KeyCode::F(1)) || gp.confirm_pressed();

    if quit {
        return true;
    }
    match app.screen {
        Screen::Title if confirm => app.screen = Screen::Playing,
        Screen::Playing if pause => app.screen = Screen::Paused,
        Screen::Paused if pause => app.screen = Screen::Playing,
        Screen::RunOver if confirm => app.restart(),
        _ => {}
    }
    false
}
