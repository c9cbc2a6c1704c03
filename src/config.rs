/// External configuration loader.
///
/// Reads `config.toml` from the executable's directory, the CWD or the
/// per-user data directory. Missing files and missing keys fall back to
/// defaults; every value the simulation reads lives in `GameConfig`.

use std::path::PathBuf;

use log::warn;
use serde::Deserialize;

// ── Public Config Struct ──

#[derive(Clone, Debug)]
pub struct GameConfig {
    pub corridor: CorridorConfig,
    pub actor: ActorConfig,
    pub projectile: ProjectileConfig,
    pub enemy: EnemyConfig,
    pub generator: GeneratorConfig,
    pub player: PlayerConfig,
    pub input: InputConfig,
    pub gamepad: GamepadConfig,
    /// Fixed RNG seed; `None` seeds from entropy.
    pub seed: Option<u64>,
    pub save_file: String,
}

#[derive(Deserialize, Clone, Debug)]
pub struct CorridorConfig {
    #[serde(default = "default_length")]
    pub length: usize,
    /// Vertical gap between corridors, in cells.
    #[serde(default = "default_padding")]
    pub padding: f32,
    /// Depths kept alive above the player.
    #[serde(default = "default_retire_above")]
    pub retire_above: i32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ActorConfig {
    #[serde(default = "default_face_direction")]
    pub face_direction_duration: f32,
    #[serde(default = "default_move")]
    pub move_duration: f32,
    #[serde(default = "default_descend")]
    pub descend_duration: f32,
    #[serde(default = "default_fade_in")]
    pub fade_in_duration: f32,
    /// Full random spread, degrees.
    #[serde(default = "default_spread")]
    pub projectile_spread: f32,
    #[serde(default = "default_gun_x")]
    pub gun_x: f32,
    #[serde(default = "default_gun_y")]
    pub gun_y: f32,
    #[serde(default)]
    pub y_offset: f32,
    #[serde(default = "default_gun_fire")]
    pub gun_fire_duration: f32,
    #[serde(default = "default_gun_cooldown")]
    pub gun_cooldown_duration: f32,
    #[serde(default = "default_floor_break_shots")]
    pub floor_break_shots: u32,
    #[serde(default = "default_floor_break_interval")]
    pub floor_break_interval: f32,
    #[serde(default = "default_dying")]
    pub dying_duration: f32,
    #[serde(default = "default_death_fade")]
    pub death_fade_duration: f32,
    #[serde(default = "default_death_offset")]
    pub death_offset_strength: f32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct ProjectileConfig {
    /// Cells per second.
    #[serde(default = "default_projectile_speed")]
    pub speed: f32,
    #[serde(default = "default_trail_length")]
    pub trail_length: f32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct EnemyConfig {
    #[serde(default = "default_reaction_speed")]
    pub reaction_speed: f32,
    #[serde(default = "default_max_enemies")]
    pub max_enemies: usize,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GeneratorConfig {
    #[serde(default = "default_max_doors")]
    pub max_doors: usize,
    #[serde(default = "default_door_depth_divisor")]
    pub door_depth_divisor: i32,
    #[serde(default = "default_ambush_min")]
    pub ambush_min: f32,
    #[serde(default = "default_ambush_max")]
    pub ambush_max: f32,
    #[serde(default = "default_drop_chain_min_depth")]
    pub drop_chain_min_depth: i32,
    #[serde(default = "default_drop_chain_chance")]
    pub drop_chain_chance: f64,
    #[serde(default = "default_drop_chain_max")]
    pub drop_chain_max: u32,
}

#[derive(Deserialize, Clone, Debug)]
pub struct PlayerConfig {
    /// Seconds allowed per new depth; 0 disables the timer.
    #[serde(default = "default_time_for_each_depth")]
    pub time_for_each_depth: f32,
}

/// When keyboard/gamepad input turns into actor operations.
#[derive(Deserialize, Clone, Copy, PartialEq, Eq, Debug, Default)]
#[serde(rename_all = "lowercase")]
pub enum InputMode {
    /// Held keys re-issue their operation every tick.
    #[default]
    Held,
    /// Only a fresh press issues the operation.
    Pressed,
}

#[derive(Deserialize, Clone, Debug)]
pub struct InputConfig {
    #[serde(default)]
    pub mode: InputMode,
    #[serde(default = "default_tick_rate")]
    pub tick_rate_ms: u64,
}

#[derive(Deserialize, Clone, Debug)]
pub struct GamepadConfig {
    #[serde(default = "default_fire")]
    pub fire: Vec<String>,
    #[serde(default = "default_descend_buttons")]
    pub descend: Vec<String>,
    #[serde(default = "default_ascend_buttons")]
    pub ascend: Vec<String>,
    #[serde(default = "default_confirm")]
    pub confirm: Vec<String>,
    #[serde(default = "default_cancel")]
    pub cancel: Vec<String>,
}

// ── TOML Schema ──

#[derive(Deserialize, Debug, Default)]
struct TomlConfig {
    #[serde(default)]
    corridor: CorridorConfig,
    #[serde(default)]
    actor: ActorConfig,
    #[serde(default)]
    projectile: ProjectileConfig,
    #[serde(default)]
    enemy: EnemyConfig,
    #[serde(default)]
    generator: GeneratorConfig,
    #[serde(default)]
    player: PlayerConfig,
    #[serde(default)]
    input: InputConfig,
    #[serde(default)]
    gamepad: GamepadConfig,
    #[serde(default)]
    general: TomlGeneral,
}

#[derive(Deserialize, Debug)]
struct TomlGeneral {
    #[serde(default)]
    seed: Option<u64>,
    #[serde(default = "default_save_file")]
    save_file: String,
}

// ── Defaults ──

fn default_length() -> usize { 9 }
fn default_padding() -> f32 { 0.5 }
fn default_retire_above() -> i32 { 3 }

fn default_face_direction() -> f32 { 0.1 }
fn default_move() -> f32 { 0.12 }
fn default_descend() -> f32 { 0.35 }
fn default_fade_in() -> f32 { 0.3 }
fn default_spread() -> f32 { 6.0 }
fn default_gun_x() -> f32 { 0.45 }
fn default_gun_y() -> f32 { 0.05 }
fn default_gun_fire() -> f32 { 0.08 }
fn default_gun_cooldown() -> f32 { 0.25 }
fn default_floor_break_shots() -> u32 { 3 }
fn default_floor_break_interval() -> f32 { 0.08 }
fn default_dying() -> f32 { 0.4 }
fn default_death_fade() -> f32 { 0.4 }
fn default_death_offset() -> f32 { 2.0 }

fn default_projectile_speed() -> f32 { 30.0 }
fn default_trail_length() -> f32 { 3.0 }

fn default_reaction_speed() -> f32 { 0.35 }
fn default_max_enemies() -> usize { 4 }

fn default_max_doors() -> usize { 3 }
fn default_door_depth_divisor() -> i32 { 3 }
fn default_ambush_min() -> f32 { 2.0 }
fn default_ambush_max() -> f32 { 6.0 }
fn default_drop_chain_min_depth() -> i32 { 4 }
fn default_drop_chain_chance() -> f64 { 0.15 }
fn default_drop_chain_max() -> u32 { 3 }

fn default_time_for_each_depth() -> f32 { 12.0 }

fn default_tick_rate() -> u64 { 16 }

fn default_fire() -> Vec<String> { vec!["A".into(), "X".into(), "R1".into()] }
fn default_descend_buttons() -> Vec<String> { vec!["B".into(), "L1".into()] }
fn default_ascend_buttons() -> Vec<String> { vec!["Y".into()] }
fn default_confirm() -> Vec<String> { vec!["Start".into()] }
fn default_cancel() -> Vec<String> { vec!["Select".into()] }
fn default_save_file() -> String { "best_depth.toml".into() }

impl Default for CorridorConfig {
    fn default() -> Self {
        CorridorConfig {
            length: default_length(),
            padding: default_padding(),
            retire_above: default_retire_above(),
        }
    }
}

impl Default for ActorConfig {
    fn default() -> Self {
        ActorConfig {
            face_direction_duration: default_face_direction(),
            move_duration: default_move(),
            descend_duration: default_descend(),
            fade_in_duration: default_fade_in(),
            projectile_spread: default_spread(),
            gun_x: default_gun_x(),
            gun_y: default_gun_y(),
            y_offset: 0.0,
            gun_fire_duration: default_gun_fire(),
            gun_cooldown_duration: default_gun_cooldown(),
            floor_break_shots: default_floor_break_shots(),
            floor_break_interval: default_floor_break_interval(),
            dying_duration: default_dying(),
            death_fade_duration: default_death_fade(),
            death_offset_strength: default_death_offset(),
        }
    }
}

impl Default for ProjectileConfig {
    fn default() -> Self {
        ProjectileConfig { speed: default_projectile_speed(), trail_length: default_trail_length() }
    }
}

impl Default for EnemyConfig {
    fn default() -> Self {
        EnemyConfig { reaction_speed: default_reaction_speed(), max_enemies: default_max_enemies() }
    }
}

impl Default for GeneratorConfig {
    fn default() -> Self {
        GeneratorConfig {
            max_doors: default_max_doors(),
            door_depth_divisor: default_door_depth_divisor(),
            ambush_min: default_ambush_min(),
            ambush_max: default_ambush_max(),
            drop_chain_min_depth: default_drop_chain_min_depth(),
            drop_chain_chance: default_drop_chain_chance(),
            drop_chain_max: default_drop_chain_max(),
        }
    }
}

impl Default for PlayerConfig {
    fn default() -> Self {
        PlayerConfig { time_for_each_depth: default_time_for_each_depth() }
    }
}

impl Default for InputConfig {
    fn default() -> Self {
        InputConfig { mode: InputMode::default(), tick_rate_ms: default_tick_rate() }
    }
}

impl Default for GamepadConfig {
    fn default() -> Self {
        GamepadConfig {
            fire: default_fire(),
            descend: default_descend_buttons(),
            ascend: default_ascend_buttons(),
            confirm: default_confirm(),
            cancel: default_cancel(),
        }
    }
}

impl Default for TomlGeneral {
    fn default() -> Self {
        TomlGeneral { seed: None, save_file: default_save_file() }
    }
}

impl From<TomlConfig> for GameConfig {
    fn from(t: TomlConfig) -> Self {
        GameConfig {
            corridor: t.corridor,
            actor: t.actor,
            projectile: t.projectile,
            enemy: t.enemy,
            generator: t.generator,
            player: t.player,
            input: t.input,
            gamepad: t.gamepad,
            seed: t.general.seed,
            save_file: t.general.save_file,
        }
    }
}

/// All defaults, identical to an empty `config.toml`.
impl Default for GameConfig {
    fn default() -> Self {
        TomlConfig::default().into()
    }
}

impl GameConfig {
    /// Load config from `config.toml`.
    /// Search order: (1) exe directory, (2) CWD, (3) per-user data dir.
    pub fn load() -> Self {
        load_toml(&candidate_dirs()).into()
    }

    /// Parse a TOML document; missing keys take their defaults.
    pub fn from_toml(text: &str) -> Result<Self, toml::de::Error> {
        toml::from_str::<TomlConfig>(text).map(Into::into)
    }
}

/// Candidate directories to search: exe dir + CWD + data dir (deduplicated).
fn candidate_dirs() -> Vec<PathBuf> {
    let mut dirs = vec![];

    if let Ok(exe) = std::env::current_exe() {
        let resolved = exe.canonicalize().unwrap_or(exe);
        if let Some(parent) = resolved.parent() {
            dirs.push(parent.to_path_buf());
        }
    }

    if let Ok(cwd) = std::env::current_dir() {
        if !dirs.iter().any(|d| d == &cwd) {
            dirs.push(cwd);
        }
    }

    if let Ok(home) = std::env::var("HOME") {
        let xdg = PathBuf::from(&home).join(".local/share/corridor-descent");
        if xdg.is_dir() && !dirs.iter().any(|d| d == &xdg) {
            dirs.push(xdg);
        }
    }

    if dirs.is_empty() {
        dirs.push(PathBuf::from("."));
    }

    dirs
}

fn load_toml(search_dirs: &[PathBuf]) -> TomlConfig {
    for dir in search_dirs {
        let path = dir.join("config.toml");
        if !path.exists() {
            continue;
        }
        match std::fs::read_to_string(&path) {
            Ok(text) => match toml::from_str::<TomlConfig>(&text) {
                Ok(cfg) => return cfg,
                Err(e) => {
                    warn!("{}: parse error, using defaults: {e}", path.display());
                    return TomlConfig::default();
                }
            },
            Err(e) => warn!("could not read {}: {e}", path.display()),
        }
    }
    TomlConfig::default()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn empty_toml_matches_defaults() {
        let cfg = GameConfig::from_toml("").unwrap();
        let d = GameConfig::default();
        assert_eq!(cfg.corridor.length, 9);
        assert_eq!(cfg.corridor.length, d.corridor.length);
        assert_eq!(cfg.actor.floor_break_shots, d.actor.floor_break_shots);
        assert_eq!(cfg.input.mode, InputMode::Held);
        assert_eq!(cfg.save_file, "best_depth.toml");
        assert_eq!(cfg.seed, None);
        assert_eq!(cfg.gamepad.fire, d.gamepad.fire);
    }

    #[test]
    fn partial_section_keeps_other_defaults() {
        let cfg = GameConfig::from_toml(
            r#"
            [corridor]
            length = 12

            [input]
            mode = "pressed"

            [general]
            seed = 42
            "#,
        )
        .unwrap();
        assert_eq!(cfg.corridor.length, 12);
        assert_eq!(cfg.corridor.retire_above, 3);
        assert_eq!(cfg.input.mode, InputMode::Pressed);
        assert_eq!(cfg.input.tick_rate_ms, 16);
        assert_eq!(cfg.seed, Some(42));
        assert_eq!(cfg.actor.move_duration, 0.12);
    }

    #[test]
    fn bad_input_mode_is_an_error() {
        assert!(GameConfig::from_toml("[input]\nmode = \"sometimes\"").is_err());
    }
}
