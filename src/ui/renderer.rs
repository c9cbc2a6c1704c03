/// Presentation layer: double-buffered, diff-based terminal renderer.
///
///   1. Compose the next frame into `front`
///   2. Compare each cell with `back` (the previous frame)
///   3. Emit terminal commands only for changed cells, batched with `queue!`
///   4. Swap front/back
///
/// The camera follows the player's animated world position vertically, so
/// descents scroll smoothly. One corridor takes three rows: ceiling, the
/// actor row, floor.

use std::io::{self, BufWriter, Write};

use crossterm::{
    cursor::{self, MoveTo},
    event::{KeyboardEnhancementFlags, PopKeyboardEnhancementFlags, PushKeyboardEnhancementFlags},
    execute, queue,
    style::{Color, Print, ResetColor, SetBackgroundColor, SetForegroundColor},
    terminal::{self, Clear, ClearType},
};
use glam::Vec2;

use crate::domain::action::ActionState;
use crate::domain::actor::{Actor, ActorLabel, Facing, Pose};
use crate::domain::grid::{Corridor, WallState};
use crate::sim::world::World;

/// Which screen main is showing.
#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Screen {
    Title,
    Playing,
    Paused,
    RunOver,
}

// ── Cell: the unit of the back-buffer ──

#[derive(Clone, Copy, PartialEq, Eq)]
struct Cell {
    ch: char,
    fg: Color,
    bg: Color,
}

impl Cell {
    /// Explicit background for every cell, never the terminal default, so
    /// the gap pixels between rows match the cells.
    const BASE_BG: Color = Color::Rgb { r: 18, g: 16, b: 24 };

    const BLANK: Cell = Cell { ch: ' ', fg: Color::White, bg: Cell::BASE_BG };

    /// Never equal to a real cell; filling `back` with it forces a repaint.
    const INVALID: Cell = Cell { ch: '?', fg: Color::Magenta, bg: Color::Magenta };

    fn new(ch: char, fg: Color, bg: Color) -> Self {
        let bg = if bg == Color::Reset { Self::BASE_BG } else { bg };
        Cell { ch, fg, bg }
    }
}

// ── FrameBuffer: a 2D grid of Cells ──

struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
}

impl FrameBuffer {
    fn new(w: usize, h: usize) -> Self {
        FrameBuffer { width: w, height: h, cells: vec![Cell::BLANK; w * h] }
    }

    fn resize(&mut self, w: usize, h: usize) {
        if self.width != w || self.height != h {
            *self = FrameBuffer::new(w, h);
        }
    }

    fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
    }

    /// Signed coordinates so callers can project off-screen freely.
    fn set(&mut self, x: i32, y: i32, cell: Cell) {
        if x >= 0 && y >= 0 && (x as usize) < self.width && (y as usize) < self.height {
            self.cells[y as usize * self.width + x as usize] = cell;
        }
    }

    fn get(&self, x: usize, y: usize) -> Cell {
        if x < self.width && y < self.height {
            self.cells[y * self.width + x]
        } else {
            Cell::BLANK
        }
    }

    fn put_str(&mut self, x: i32, y: i32, s: &str, fg: Color, bg: Color) {
        for (i, ch) in s.chars().enumerate() {
            self.set(x + i as i32, y, Cell::new(ch, fg, bg));
        }
    }

    fn fill_row(&mut self, y: i32, bg: Color) {
        for x in 0..self.width as i32 {
            self.set(x, y, Cell::new(' ', Color::White, bg));
        }
    }

    /// Centred on the buffer width.
    fn put_centered(&mut self, y: i32, s: &str, fg: Color) {
        let x = (self.width as i32 - s.chars().count() as i32) / 2;
        self.put_str(x.max(0), y, s, fg, Color::Reset);
    }
}

// ── Layout ──

/// Terminal columns per corridor cell.
const CELL_W: i32 = 4;
/// Terminal rows per corridor (ceiling, actors, floor).
const ROWS_PER_DEPTH: f32 = 3.0;
const HUD_ROW: i32 = 0;
const TIMER_ROW: i32 = 1;
const MAP_ROW: i32 = 3;

const HUD_BG: Color = Color::Rgb { r: 30, g: 24, b: 52 };
const WALL_BG: Color = Color::Rgb { r: 34, g: 30, b: 44 };
const DOOR_BG: Color = Color::Rgb { r: 90, g: 40, b: 30 };
const FLOOR_FG: Color = Color::Rgb { r: 120, g: 110, b: 140 };
const PLAYER_FG: Color = Color::Rgb { r: 90, g: 230, b: 255 };
const ENEMY_FG: Color = Color::Rgb { r: 255, g: 90, b: 80 };
const SHOT_FG: Color = Color::Rgb { r: 255, g: 230, b: 120 };
const ACCENT: Color = Color::Rgb { r: 255, g: 200, b: 60 };

/// World space to terminal cells. `x0` is the column of cell 0's left edge;
/// `mid_row`/`cam_y` pin the camera's world y to a terminal row.
#[derive(Clone, Copy, Debug)]
struct Projection {
    x0: i32,
    mid_row: i32,
    cam_y: f32,
    rows_per_unit: f32,
}

impl Projection {
    fn column(&self, x: f32) -> i32 {
        self.x0 + ((x + 0.5) * CELL_W as f32).floor() as i32
    }

    fn row(&self, y: f32) -> i32 {
        self.mid_row + ((self.cam_y - y) * self.rows_per_unit).round() as i32
    }

    fn point(&self, p: Vec2) -> (i32, i32) {
        (self.column(p.x), self.row(p.y))
    }
}

/// `width` columns of a draining bar.
pub fn timer_bar(fraction: f32, width: usize) -> String {
    let filled = ((fraction.clamp(0.0, 1.0) * width as f32).ceil() as usize).min(width);
    let mut s = "█".repeat(filled);
    s.push_str(&"░".repeat(width - filled));
    s
}

/// The facing an actor shows, flipping halfway through a turn.
fn shown_facing(a: &Actor) -> Facing {
    if a.action_state() == ActionState::Turning && a.turn >= 0.5 {
        Facing::from_dx(-a.facing.sign())
    } else {
        a.facing
    }
}

/// Body and gun glyphs. The gun is `None` while falling or dead.
fn actor_glyphs(a: &Actor) -> (char, Option<char>) {
    let body = match (a.label(), a.pose) {
        (_, Pose::Dead) => 'x',
        (_, Pose::Dying) => '*',
        (ActorLabel::Player, _) => '@',
        (ActorLabel::Enemy, _) => '&',
    };
    let gun = match a.pose {
        Pose::Aim => Some(if shown_facing(a).is_right() { '>' } else { '<' }),
        Pose::Recoil => Some('='),
        Pose::Fall | Pose::Dying | Pose::Dead => None,
    };
    (body, gun)
}

fn faded(c: Color, alpha: f32) -> Color {
    match c {
        Color::Rgb { r, g, b } => {
            let a = alpha.clamp(0.15, 1.0);
            let mix = |v: u8| (v as f32 * a) as u8;
            Color::Rgb { r: mix(r), g: mix(g), b: mix(b) }
        }
        other => other,
    }
}

pub struct Renderer {
    writer: BufWriter<io::Stdout>,
    front: FrameBuffer,
    back: FrameBuffer,
    term_w: usize,
    term_h: usize,
    last_screen: Option<Screen>,
    frame: u64,
    /// The terminal reports key releases, so held keys end exactly.
    pub key_release: bool,
}

impl Renderer {
    pub fn new() -> Self {
        Renderer {
            writer: BufWriter::with_capacity(16384, io::stdout()),
            front: FrameBuffer::new(0, 0),
            back: FrameBuffer::new(0, 0),
            term_w: 0,
            term_h: 0,
            last_screen: None,
            frame: 0,
            key_release: false,
        }
    }

    pub fn init(&mut self) -> io::Result<()> {
        terminal::enable_raw_mode()?;
        execute!(
            self.writer,
            terminal::EnterAlternateScreen,
            cursor::Hide,
            SetBackgroundColor(Cell::BASE_BG),
            Clear(ClearType::All)
        )?;
        if terminal::supports_keyboard_enhancement().unwrap_or(false) {
            execute!(
                self.writer,
                PushKeyboardEnhancementFlags(KeyboardEnhancementFlags::REPORT_EVENT_TYPES)
            )?;
            self.key_release = true;
        }
        log::info!("key release events: {}", self.key_release);
        self.fit_terminal()?;
        Ok(())
    }

    pub fn cleanup(&mut self) -> io::Result<()> {
        if self.key_release {
            execute!(self.writer, PopKeyboardEnhancementFlags)?;
        }
        execute!(self.writer, ResetColor, cursor::Show, terminal::LeaveAlternateScreen)?;
        terminal::disable_raw_mode()
    }

    /// Track the terminal size; a change forces a full repaint.
    fn fit_terminal(&mut self) -> io::Result<()> {
        let (tw, th) = terminal::size().unwrap_or((80, 24));
        if tw as usize != self.term_w || th as usize != self.term_h {
            self.term_w = tw as usize;
            self.term_h = th as usize;
            self.front.resize(self.term_w, self.term_h);
            self.back.resize(self.term_w, self.term_h);
            self.invalidate()?;
        }
        Ok(())
    }

    fn invalidate(&mut self) -> io::Result<()> {
        self.back.cells.fill(Cell::INVALID);
        queue!(self.writer, SetBackgroundColor(Cell::BASE_BG), Clear(ClearType::All))
    }

    pub fn render(&mut self, world: &World, screen: Screen) -> io::Result<()> {
        self.fit_terminal()?;
        if self.last_screen != Some(screen) {
            self.invalidate()?;
            self.last_screen = Some(screen);
        }
        self.frame = self.frame.wrapping_add(1);

        self.front.clear();
        match screen {
            Screen::Title => self.compose_title(world),
            Screen::Playing => self.compose_game(world),
            Screen::Paused => {
                self.compose_game(world);
                self.compose_pause_overlay();
            }
            Screen::RunOver => {
                self.compose_game(world);
                self.compose_run_over(world);
            }
        }

        self.flush_diff()?;
        std::mem::swap(&mut self.front, &mut self.back);
        Ok(())
    }

    // ── Diff flush: only write changed cells ──

    fn flush_diff(&mut self) -> io::Result<()> {
        let mut last_fg = Color::White;
        let mut last_bg = Cell::BASE_BG;
        let mut cursor_at: Option<(usize, usize)> = None;

        queue!(self.writer, SetForegroundColor(last_fg), SetBackgroundColor(last_bg))?;

        for y in 0..self.front.height {
            for x in 0..self.front.width {
                let cell = self.front.get(x, y);
                if cell == self.back.get(x, y) {
                    continue;
                }
                if cursor_at != Some((x, y)) {
                    queue!(self.writer, MoveTo(x as u16, y as u16))?;
                }
                if cell.fg != last_fg {
                    queue!(self.writer, SetForegroundColor(cell.fg))?;
                    last_fg = cell.fg;
                }
                if cell.bg != last_bg {
                    queue!(self.writer, SetBackgroundColor(cell.bg))?;
                    last_bg = cell.bg;
                }
                queue!(self.writer, Print(cell.ch))?;
                cursor_at = Some((x + 1, y));
            }
        }

        self.writer.flush()
    }

    // ── Compose ──

    fn projection(&self, w: &World) -> Projection {
        let player = w.player_actor();
        let cam_y = w.to_world(player.depth(), player.offset).y;
        let len = w.config.corridor.length as i32;
        let map_h = self.front.height as i32 - MAP_ROW - 1;
        Projection {
            x0: (self.front.width as i32 - len * CELL_W) / 2,
            mid_row: MAP_ROW + map_h / 2,
            cam_y,
            rows_per_unit: ROWS_PER_DEPTH / (1.0 + w.config.corridor.padding),
        }
    }

    fn compose_game(&mut self, w: &World) {
        self.compose_hud(w);
        let proj = self.projection(w);
        for c in w.corridors() {
            self.compose_corridor(c, &proj);
        }
        for (_, p) in w.projectiles.iter() {
            let head = w.to_world(p.depth(), p.position());
            let tail = w.to_world(p.depth(), p.tail());
            self.compose_trail(tail, head, &proj);
        }
        for (_, a) in w.actors.iter() {
            self.compose_actor(w, a, &proj);
        }

        let help_row = self.front.height as i32 - 1;
        self.front.put_str(
            1,
            help_row,
            "←→ Walk  ↓ Descend  ↑ Climb  Space Fire  F1 Pause  Esc Quit",
            Color::DarkGrey,
            Color::Reset,
        );
    }

    fn compose_hud(&mut self, w: &World) {
        let depth = w.player_actor().depth();
        let record = (w.run.best_of_all_runs as i32).max(w.run.best_depth);
        let hud = format!(
            " DEPTH {:<4}  BEST {:<4}  RECORD {:<4} {}",
            depth,
            w.run.best_depth,
            record,
            if w.run.record_broken { " NEW RECORD!" } else { "" },
        );
        self.front.fill_row(HUD_ROW, HUD_BG);
        self.front.put_str(0, HUD_ROW, &hud, Color::White, HUD_BG);

        let frac = w.player_controller().health_fraction();
        let bar_w = (self.front.width.saturating_sub(8)).min(40);
        let fg = if frac < 0.25 { ENEMY_FG } else { ACCENT };
        self.front.put_str(1, TIMER_ROW, "TIME", Color::DarkGrey, Color::Reset);
        self.front.put_str(6, TIMER_ROW, &timer_bar(frac, bar_w), fg, Color::Reset);
    }

    fn compose_corridor(&mut self, c: &Corridor, proj: &Projection) {
        let mid = proj.row(c.origin().y);
        if mid < MAP_ROW - 1 || mid > self.front.height as i32 {
            return;
        }
        let (ceiling, floor) = (mid - 1, mid + 1);
        let left = proj.column(c.origin().x - 0.5);
        let right = proj.column(c.origin().x + c.len() as f32 - 0.5);

        for (i, cell) in c.cells().iter().enumerate() {
            let x = proj.column(c.origin().x + i as f32 - 0.5);
            let bg = match cell.wall_state() {
                WallState::Normal => WALL_BG,
                WallState::Door => DOOR_BG,
            };
            for dx in 0..CELL_W {
                if ceiling >= MAP_ROW {
                    self.front.set(x + dx, ceiling, Cell::new('▄', WALL_BG, Color::Reset));
                }
                self.front.set(x + dx, mid, Cell::new(' ', Color::White, bg));
                let ground = if cell.has_hole() { Cell::BLANK } else { Cell::new('▀', FLOOR_FG, Color::Reset) };
                self.front.set(x + dx, floor, ground);
            }
            if cell.wall_state() == WallState::Door {
                self.front.set(x + CELL_W / 2 - 1, mid, Cell::new('▐', ACCENT, DOOR_BG));
                self.front.set(x + CELL_W / 2, mid, Cell::new('▌', ACCENT, DOOR_BG));
            }
        }
        for row in [ceiling, mid, floor] {
            if row >= MAP_ROW {
                self.front.set(left - 1, row, Cell::new('█', FLOOR_FG, Color::Reset));
                self.front.set(right, row, Cell::new('█', FLOOR_FG, Color::Reset));
            }
        }
        let label = format!("{:>3}", c.depth());
        self.front.put_str(left - 5, mid, &label, Color::DarkGrey, Color::Reset);
    }

    fn compose_trail(&mut self, tail: Vec2, head: Vec2, proj: &Projection) {
        let span = head - tail;
        let vertical = span.y.abs() > span.x.abs();
        let ch = if vertical { '│' } else { '─' };
        let steps = (span.length() * CELL_W as f32).ceil().max(1.0) as usize;
        for i in 0..=steps {
            let (x, y) = proj.point(tail + span * (i as f32 / steps as f32));
            if y >= MAP_ROW {
                self.front.set(x, y, Cell::new(ch, SHOT_FG, Color::Reset));
            }
        }
        let (x, y) = proj.point(head);
        if y >= MAP_ROW {
            self.front.set(x, y, Cell::new('•', SHOT_FG, Color::Reset));
        }
    }

    fn compose_actor(&mut self, w: &World, a: &Actor, proj: &Projection) {
        let pos = w.to_world(a.depth(), Corridor::cell_position(a.cell()) + a.offset);
        let (x, y) = proj.point(pos);
        if y < MAP_ROW {
            return;
        }
        let base = match a.label() {
            ActorLabel::Player => PLAYER_FG,
            ActorLabel::Enemy => ENEMY_FG,
        };
        let fg = faded(base, a.alpha);
        let bg = match w.corridor(a.depth()) {
            Some(c) if a.offset.y.abs() < 0.25 => match c.cell(a.cell()).wall_state() {
                WallState::Normal => WALL_BG,
                WallState::Door => DOOR_BG,
            },
            _ => Color::Reset,
        };
        let (body, gun) = actor_glyphs(a);
        self.front.set(x, y, Cell::new(body, fg, bg));
        if let Some(g) = gun {
            let gx = if shown_facing(a).is_right() { x + 1 } else { x - 1 };
            self.front.set(gx, y, Cell::new(g, fg, bg));
        }
    }

    fn compose_title(&mut self, w: &World) {
        let title = [
            r"   ___              _    _            ",
            r"  / __|___ _ _ _ _ (_)__| |___ _ _    ",
            r" | (__/ _ \ '_| '_|| / _` / _ \ '_|   ",
            r"  \___\___/_| |_|  |_\__,_\___/_|     ",
            r"        D  E  S  C  E  N  T           ",
        ];
        for (i, line) in title.iter().enumerate() {
            self.front.put_centered(2 + i as i32, line, ACCENT);
        }
        let record = format!("Deepest run so far: {}", w.run.best_of_all_runs);
        self.front.put_centered(9, &record, Color::White);

        let blink = (self.frame / 20) % 2 == 0;
        if blink {
            self.front.put_centered(12, "ENTER / START  to begin", PLAYER_FG);
        }
        let help = [
            "←→ / A D       walk, or turn first",
            "↓  / S         drop through a hole, or shoot one open",
            "↑  / W         climb through the hole above",
            "Space / Z      fire",
            "F1 pause       Esc quit",
        ];
        for (i, line) in help.iter().enumerate() {
            self.front.put_centered(15 + i as i32, line, Color::DarkGrey);
        }
    }

    fn compose_run_over(&mut self, w: &World) {
        let mid = self.front.height as i32 / 2;
        for y in mid - 3..=mid + 3 {
            self.front.fill_row(y, HUD_BG);
        }
        let mut put = |dy: i32, s: &str, fg: Color| {
            let x = (self.front.width as i32 - s.chars().count() as i32) / 2;
            self.front.put_str(x.max(0), mid + dy, s, fg, HUD_BG);
        };
        put(-2, "RUN OVER", ENEMY_FG);
        put(0, &format!("Reached depth {}", w.run.best_depth), Color::White);
        if w.run.record_broken {
            put(1, "A new record!", ACCENT);
        } else {
            put(1, &format!("Record: {}", w.run.best_of_all_runs), Color::DarkGrey);
        }
        put(2, "ENTER retry   Esc quit", PLAYER_FG);
    }

    fn compose_pause_overlay(&mut self) {
        let mid = self.front.height as i32 / 2;
        for y in mid - 1..=mid + 1 {
            self.front.fill_row(y, HUD_BG);
        }
        let label = if (self.frame / 20) % 2 == 0 { "▶  PAUSED  ◀" } else { "   PAUSED   " };
        let x = (self.front.width as i32 - label.chars().count() as i32) / 2;
        self.front.put_str(x, mid, label, ACCENT, HUD_BG);
        self.front.put_str(x - 2, mid + 1, "F1 resume  Esc quit", Color::DarkGrey, HUD_BG);
    }
}
