//! Configuration
//!
//! [`DemoConfig`] is read from a TOML file; every section and field is optional
//! and falls back to the demo defaults. Command line flags ([`WindowArgs`],
//! [`DemoArgs`]) are applied on top of the file.

use std::path::{Path, PathBuf};

use clap::{Args, Parser};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::physics::{PhysicsSettings, PunchSettings};
use crate::scene::description::ModelSource;
use crate::timestep::TimestepError;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("Invalid config: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("Invalid physics settings: {0}")]
    Physics(#[from] TimestepError),
}

pub type ConfigResult<T> = Result<T, ConfigError>;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct WindowConfig {
    pub title: String,
    pub width: u32,
    pub height: u32,
    pub vsync: bool,
    /// Exit after this many rendered frames
    pub max_frames: Option<u64>,
}

impl Default for WindowConfig {
    fn default() -> Self {
        Self {
            title: "Mechanics".to_string(),
            width: 1920,
            height: 1080,
            vsync: true,
            max_frames: None,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CameraConfig {
    /// Units per second
    pub move_speed: f32,
    /// Degrees per pixel
    pub mouse_sensitivity: f32,
    pub sprint_multiplier: f32,
}

impl Default for CameraConfig {
    fn default() -> Self {
        Self {
            move_speed: 15.0,
            mouse_sensitivity: 0.1,
            sprint_multiplier: 2.0,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct AssetConfig {
    /// Directory holding the six skybox faces
    pub skybox_dir: PathBuf,
    /// OBJ drawn for the ball instead of the generated sphere
    pub ball_model: Option<PathBuf>,
    /// OBJ drawn for floor and walls instead of the generated cube
    pub plank_model: Option<PathBuf>,
}

impl Default for AssetConfig {
    fn default() -> Self {
        Self {
            skybox_dir: PathBuf::from("assets/skybox"),
            ball_model: None,
            plank_model: None,
        }
    }
}

impl AssetConfig {
    /// Swap generated sphere and cube meshes for the configured OBJ files.
    pub fn resolve_model(&self, source: &ModelSource) -> ModelSource {
        let replacement = match source {
            ModelSource::Sphere => self.ball_model.as_ref(),
            ModelSource::Cube => self.plank_model.as_ref(),
            _ => None,
        };
        replacement.map_or_else(|| source.clone(), |path| ModelSource::Obj(path.clone()))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DemoConfig {
    pub window: WindowConfig,
    pub physics: PhysicsSettings,
    pub punch: PunchSettings,
    pub camera: CameraConfig,
    pub assets: AssetConfig,
}

impl DemoConfig {
    pub fn from_toml(text: &str) -> ConfigResult<Self> {
        let config: Self = toml::from_str(text)?;
        config.physics.validate()?;
        Ok(config)
    }

    pub fn load(path: impl AsRef<Path>) -> ConfigResult<Self> {
        let path = path.as_ref();
        let text = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
            path: path.to_path_buf(),
            source,
        })?;
        let config = Self::from_toml(&text)?;
        log::info!("Loaded config from {}", path.display());
        Ok(config)
    }

    /// Like [`load`](Self::load), but any failure yields the defaults.
    pub fn load_or_default(path: impl AsRef<Path>) -> Self {
        let path = path.as_ref();
        match Self::load(path) {
            Ok(config) => config,
            Err(ConfigError::Io { source, .. })
                if source.kind() == std::io::ErrorKind::NotFound =>
            {
                log::info!("No config at {}, using defaults", path.display());
                Self::default()
            }
            Err(err) => {
                log::warn!("{err}; using defaults");
                Self::default()
            }
        }
    }
}

/// Config file read when `--config` is not given
pub const DEFAULT_CONFIG_PATH: &str = "mechanics.toml";

/// Window flags shared by both binaries
#[derive(Args, Debug, Clone, Default)]
pub struct WindowArgs {
    /// Config file. Without this flag `mechanics.toml` is read if present.
    #[arg(long)]
    pub config: Option<PathBuf>,

    /// Initial window width in pixels.
    #[arg(long)]
    pub width: Option<u32>,

    /// Initial window height in pixels.
    #[arg(long)]
    pub height: Option<u32>,

    /// Disable vertical sync.
    #[arg(long)]
    pub no_vsync: bool,

    /// Exit after rendering N frames.
    #[arg(long)]
    pub max_frames: Option<u64>,
}

impl WindowArgs {
    /// Load the config file and apply these flags on top.
    ///
    /// A file named with `--config` must exist and parse; the default file
    /// falls back to built-in values.
    pub fn load_config(&self) -> ConfigResult<DemoConfig> {
        let mut config = match &self.config {
            Some(path) => DemoConfig::load(path)?,
            None => DemoConfig::load_or_default(DEFAULT_CONFIG_PATH),
        };
        self.apply(&mut config);
        Ok(config)
    }

    pub fn apply(&self, config: &mut DemoConfig) {
        if let Some(width) = self.width {
            config.window.width = width;
        }
        if let Some(height) = self.height {
            config.window.height = height;
        }
        if self.no_vsync {
            config.window.vsync = false;
        }
        if self.max_frames.is_some() {
            config.window.max_frames = self.max_frames;
        }
    }
}

/// Ball-in-a-box rigid-body demo.
#[derive(Parser, Debug, Clone)]
#[command(
    name = "mechanics",
    about = "Fixed-timestep rigid-body demo",
    long_about = "Drops a ball into a walled arena and lets you punch it around.\n\n\
        CONTROLS:\n\
          WASD / Q E     move, Shift sprints\n\
          right mouse    hold to look around\n\
          Space          punch\n\
          P / R          pause / reset\n\
          F1 / F2        physics debug lines / overlay\n\
          Escape         quit",
    version
)]
pub struct DemoArgs {
    #[command(flatten)]
    pub window: WindowArgs,

    /// Scene file to load instead of the built-in arena.
    #[arg(long)]
    pub scene: Option<PathBuf>,

    /// Start with physics debug lines on.
    #[arg(long)]
    pub debug_physics: bool,

    /// Simulate N frames at the fixed rate without a window, then exit.
    #[arg(long, value_name = "FRAMES")]
    pub headless: Option<u32>,

    /// Write the scene being played to PATH (default `scene1.ron`) before starting.
    #[arg(
        long,
        value_name = "PATH",
        num_args = 0..=1,
        default_missing_value = "scene1.ron"
    )]
    pub write_scene: Option<PathBuf>,
}

#[cfg(test)]
mod tests {
    use super::*;
    use rstest::rstest;

    #[test]
    fn defaults_match_demo() {
        let config = DemoConfig::default();
        assert_eq!(config.window.title, "Mechanics");
        assert_eq!((config.window.width, config.window.height), (1920, 1080));
        assert_eq!(config.physics.solver_iterations, 15);
        assert_eq!(config.physics.max_frame_time, 0.25);
        assert_eq!(config.punch.reach, 25.0);
        assert_eq!(config.assets.skybox_dir, PathBuf::from("assets/skybox"));
    }

    #[test]
    fn partial_file_fills_the_rest() {
        let config = DemoConfig::from_toml(
            r#"
            [window]
            width = 800

            [physics]
            gravity = [0.0, -1.62, 0.0]
            "#,
        )
        .unwrap();
        assert_eq!(config.window.width, 800);
        assert_eq!(config.window.height, 1080);
        assert_eq!(config.physics.gravity, [0.0, -1.62, 0.0]);
        assert_eq!(config.physics.timestep, PhysicsSettings::default().timestep);
        assert_eq!(config.camera, CameraConfig::default());
    }

    #[rstest]
    #[case::wrong_type("[window]\nwidth = \"wide\"")]
    #[case::broken_syntax("[window")]
    fn bad_files_are_parse_errors(#[case] text: &str) {
        assert!(matches!(
            DemoConfig::from_toml(text),
            Err(ConfigError::Parse(_))
        ));
    }

    #[test]
    fn asset_overrides_replace_generated_meshes() {
        let assets = AssetConfig {
            ball_model: Some(PathBuf::from("models/ball.obj")),
            ..Default::default()
        };
        assert_eq!(
            assets.resolve_model(&ModelSource::Sphere),
            ModelSource::Obj(PathBuf::from("models/ball.obj"))
        );
        assert_eq!(assets.resolve_model(&ModelSource::Cube), ModelSource::Cube);
    }

    #[test]
    fn shipped_config_parses() {
        let text = include_str!("../mechanics.toml");
        let config = DemoConfig::from_toml(text).unwrap();
        assert_eq!(config.window, WindowConfig::default());
        assert_eq!(config.punch, PunchSettings::default());
        assert_eq!(config.assets, AssetConfig::default());
    }

    #[test]
    fn missing_file_gives_defaults() {
        let config = DemoConfig::load_or_default("no/such/mechanics.toml");
        assert_eq!(config, DemoConfig::default());
    }

    #[test]
    fn cli_overrides_file() {
        let args = DemoArgs::parse_from([
            "mechanics",
            "--width",
            "640",
            "--no-vsync",
            "--max-frames",
            "10",
            "--headless",
            "120",
        ]);
        let mut config = DemoConfig::default();
        args.window.apply(&mut config);
        assert_eq!(config.window.width, 640);
        assert_eq!(config.window.height, 1080);
        assert!(!config.window.vsync);
        assert_eq!(config.window.max_frames, Some(10));
        assert_eq!(args.headless, Some(120));
        assert!(args.scene.is_none());
        assert!(args.write_scene.is_none());
    }

    #[rstest]
    #[case::bare_flag(&["mechanics", "--write-scene"], "scene1.ron")]
    #[case::explicit(&["mechanics", "--write-scene", "out.ron"], "out.ron")]
    fn write_scene_path(#[case] argv: &[&str], #[case] expected: &str) {
        let args = DemoArgs::parse_from(argv);
        assert_eq!(args.write_scene, Some(PathBuf::from(expected)));
    }

    #[rstest]
    #[case::zero("[physics]\ntimestep = 0.0")]
    #[case::negative("[physics]\ntimestep = -0.016")]
    #[case::nan("[physics]\ntimestep = nan")]
    fn unusable_timestep_is_rejected(#[case] text: &str) {
        assert!(matches!(
            DemoConfig::from_toml(text),
            Err(ConfigError::Physics(TimestepError::InvalidTimestep(_)))
        ));
    }

    #[test]
    fn named_config_with_zero_timestep_fails_to_load() {
        let dir = std::env::temp_dir().join("mechanics_config_test_zero_timestep");
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("mechanics.toml");
        std::fs::write(&path, "[physics]\ntimestep = 0.0\n").unwrap();

        let path_arg = path.to_string_lossy().into_owned();
        let args = DemoArgs::parse_from(["mechanics", "--config", path_arg.as_str()]);
        let loaded = args.window.load_config();
        std::fs::remove_dir_all(&dir).unwrap();

        assert!(matches!(loaded, Err(ConfigError::Physics(_))));
    }

    #[test]
    fn named_config_must_exist() {
        let args = DemoArgs::parse_from(["mechanics", "--config", "no/such/file.toml"]);
        assert!(matches!(
            args.window.load_config(),
            Err(ConfigError::Io { .. })
        ));
    }
}
