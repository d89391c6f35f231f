// Config Module - Configuration file management and command-line argument parsing
use anyhow::{Context, Result};
use clap::Parser;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;

use crate::clock::{MAX_BPM, MIN_BPM};
use crate::settings::{self, ColorMode, DisplayMode, FirePalette, Settings};

#[derive(Parser, Debug, Default)]
#[command(
    author,
    version,
    about = "Beat-synchronized light animation for vertical LED beams",
    long_about = "Drives a row of vertical LED beams in time with a beat.\n\
                  Each beat picks which beams light up and with which color slot; between beats the\n\
                  active shape (wipe, pulse, strobe, ...) animates towards the next beat.\n\
                  Settings live in a TOML config file that can be edited while the program runs."
)]
pub struct Args {
    /// Config file path or name (e.g., --cfg /full/path or --cfg myconf for ~/.config/beamlights/myconf.conf)
    #[arg(long)]
    pub cfg: Option<String>,

    /// Tempo in beats per minute
    #[arg(long)]
    pub bpm: Option<f64>,

    /// Target framerate (frames per second)
    #[arg(long)]
    pub fps: Option<f64>,

    /// Number of beams
    #[arg(short = 'n', long)]
    pub beams: Option<usize>,

    /// Pixels per beam
    #[arg(short = 'H', long)]
    pub height: Option<usize>,

    /// Display mode (normal, solid, fire)
    #[arg(short, long)]
    pub mode: Option<String>,

    /// Color mode (hue, random, white, black)
    #[arg(long)]
    pub color_mode: Option<String>,

    /// Fixed color: preset name (red, green, gold, blue, pink, cyan) or hue 0-255
    #[arg(short, long)]
    pub color: Option<String>,

    /// Force every slot to one shape (0 = random per slot, 1-7 = shape number)
    #[arg(short, long)]
    pub pattern: Option<u8>,

    /// Fire palette (heat, rainbow, ocean, forest, party)
    #[arg(long)]
    pub palette: Option<String>,

    /// Random seed (0 = seed from entropy)
    #[arg(long)]
    pub seed: Option<u64>,

    /// Run without the terminal preview
    #[arg(long)]
    pub headless: bool,

    /// Stop after this many frames (headless mode)
    #[arg(long)]
    pub frames: Option<u64>,

    /// Quiet mode
    #[arg(short, long)]
    pub quiet: bool,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(default)]
pub struct LightConfig {
    #[serde(skip)]
    pub config_path: Option<PathBuf>, // Stores the config file path (not serialized)

    pub beam_count: usize,
    pub beam_height: usize,
    pub bpm: f64,
    pub fps: f64,
    pub display_mode: String, // normal, solid, fire
    pub color_mode: String,   // hue, random, white, black
    pub color: String,        // preset name or hue 0-255, used by color_mode = "hue"
    pub forced_pattern: u8,   // 0 = random per slot
    pub fire_palette: String,
    pub seed: u64, // 0 = entropy
}

impl Default for LightConfig {
    fn default() -> Self {
        Self {
            config_path: None,
            beam_count: 2,
            beam_height: 47,
            bpm: 120.0,
            fps: 50.0,
            display_mode: "normal".to_string(),
            color_mode: "random".to_string(),
            color: "red".to_string(),
            forced_pattern: 0,
            fire_palette: "heat".to_string(),
            seed: 0,
        }
    }
}

impl LightConfig {
    pub fn merge_with_args(&mut self, args: &Args) -> bool {
        // Track if any args were actually provided
        let mut args_provided = false;

        if let Some(bpm) = args.bpm {
            self.bpm = bpm;
            args_provided = true;
        }

        if let Some(fps) = args.fps {
            self.fps = fps;
            args_provided = true;
        }

        if let Some(beams) = args.beams {
            self.beam_count = beams;
            args_provided = true;
        }

        if let Some(height) = args.height {
            self.beam_height = height;
            args_provided = true;
        }

        if let Some(ref mode) = args.mode {
            self.display_mode = mode.clone();
            args_provided = true;
        }

        if let Some(ref color_mode) = args.color_mode {
            self.color_mode = color_mode.clone();
            args_provided = true;
        }

        // Picking a color implies the fixed-hue mode unless a color mode was given too
        if let Some(ref color) = args.color {
            self.color = color.clone();
            if args.color_mode.is_none() {
                self.color_mode = "hue".to_string();
            }
            args_provided = true;
        }

        if let Some(pattern) = args.pattern {
            self.forced_pattern = pattern;
            args_provided = true;
        }

        if let Some(ref palette) = args.palette {
            self.fire_palette = palette.clone();
            args_provided = true;
        }

        if let Some(seed) = args.seed {
            self.seed = seed;
            args_provided = true;
        }

        self.sanitize();
        args_provided
    }

    pub fn config_path(cfg_arg: Option<&str>) -> Result<PathBuf> {
        if let Some(cfg) = cfg_arg {
            // Check if it's an absolute path
            let path = PathBuf::from(cfg);
            if path.is_absolute() {
                return Ok(path);
            }

            // Check if it contains path separators (relative path)
            if cfg.contains('/') || cfg.contains('\\') {
                return Ok(path);
            }

            // Otherwise treat as config name in config directory
            let config_dir = Self::config_dir()?;

            // Add .conf extension if not present
            let filename = if cfg.ends_with(".conf") {
                cfg.to_string()
            } else {
                format!("{}.conf", cfg)
            };

            Ok(config_dir.join(filename))
        } else {
            Ok(Self::config_dir()?.join("config.conf"))
        }
    }

    fn config_dir() -> Result<PathBuf> {
        let home = std::env::var("HOME").context("HOME is not set; pass --cfg with a full path")?;
        let config_dir = PathBuf::from(home).join(".config").join("beamlights");
        std::fs::create_dir_all(&config_dir)?;
        Ok(config_dir)
    }

    pub fn parse(contents: &str) -> Result<Self> {
        let mut parsed: Self = toml::from_str(contents)?;
        parsed.sanitize();
        Ok(parsed)
    }

    pub fn load_from(path: PathBuf) -> Result<Self> {
        let contents = std::fs::read_to_string(&path)
            .with_context(|| format!("reading {}", path.display()))?;
        let mut parsed = Self::parse(&contents)
            .with_context(|| format!("parsing {}", path.display()))?;
        parsed.config_path = Some(path);
        Ok(parsed)
    }

    /// Sanitize config values to handle common formatting issues
    pub fn sanitize(&mut self) {
        // Sanitize string values (trim whitespace)
        self.display_mode = self.display_mode.trim().to_lowercase();
        self.color_mode = self.color_mode.trim().to_lowercase();
        self.color = self.color.trim().to_lowercase();
        self.fire_palette = self.fire_palette.trim().to_lowercase();

        // Clamp numeric values to reasonable ranges
        self.beam_count = self.beam_count.clamp(1, 4);
        self.beam_height = self.beam_height.clamp(1, 1000);
        self.bpm = if self.bpm.is_finite() { self.bpm.clamp(MIN_BPM, MAX_BPM) } else { 120.0 };
        self.fps = if self.fps.is_finite() { self.fps.clamp(1.0, 200.0) } else { 50.0 };
    }

    /// Core settings for the engine. Unknown names fall back to defaults.
    pub fn to_settings(&self) -> Settings {
        let display_mode = DisplayMode::parse(&self.display_mode).unwrap_or_else(|| {
            log::warn!("unknown display_mode '{}', using normal", self.display_mode);
            DisplayMode::default()
        });
        let color_mode = ColorMode::parse(&self.color_mode).unwrap_or_else(|| {
            log::warn!("unknown color_mode '{}', using random", self.color_mode);
            ColorMode::default()
        });
        let hue = settings::parse_hue(&self.color).unwrap_or_else(|| {
            log::warn!("unknown color '{}', using red", self.color);
            0
        });
        let fire_palette = FirePalette::parse(&self.fire_palette).unwrap_or_else(|| {
            log::warn!("unknown fire_palette '{}', using heat", self.fire_palette);
            FirePalette::default()
        });

        Settings {
            display_mode,
            color_mode,
            hue,
            forced_pattern: self.forced_pattern,
            fire_palette,
        }
    }

    /// Store live changes (made from the preview keys) back into the config
    pub fn apply_settings(&mut self, settings: &Settings, bpm: f64) {
        self.display_mode = settings.display_mode.name().to_string();
        self.color_mode = settings.color_mode.name().to_string();
        self.forced_pattern = settings.forced_pattern;
        self.fire_palette = settings.fire_palette.name().to_string();
        self.bpm = bpm;
    }

    pub fn save(&self) -> Result<()> {
        let path = match self.config_path.clone() {
            Some(path) => path,
            None => Self::config_path(None)?,
        };

        // Sanitize values before saving
        let mut sanitized = self.clone();
        sanitized.sanitize();

        // Build TOML with comments manually for better documentation
        let contents = format!(
            r#"# Beamlights Configuration File
# Edit this file while the program is running to change settings in real-time

# Number of beams (1-4) and pixels per beam
beam_count = {}
beam_height = {}

# Tempo in beats per minute ({}-{})
bpm = {:?}

# Frames rendered per second
fps = {:?}

# Display mode
# Options: "normal" (beat patterns), "solid" (every beam lit), "fire"
display_mode = "{}"

# Color mode
# Options: "hue" (uses 'color'), "random", "white", "black"
color_mode = "{}"

# Fixed color for color_mode = "hue"
# Preset name (red, green, gold, blue, pink, cyan) or a hue number 0-255
color = "{}"

# Force every color slot to one shape (0 = random per slot)
# 1 = wipe up, 2 = wipe down, 3 = wipe out, 4 = wipe in, 5 = strobe, 6 = pulse up, 7 = pulse down
forced_pattern = {}

# Palette for display_mode = "fire"
# Options: "heat", "rainbow", "ocean", "forest", "party"
fire_palette = "{}"

# Random seed (0 = different every run)
seed = {}
"#,
            sanitized.beam_count,
            sanitized.beam_height,
            MIN_BPM,
            MAX_BPM,
            sanitized.bpm,
            sanitized.fps,
            sanitized.display_mode,
            sanitized.color_mode,
            sanitized.color,
            sanitized.forced_pattern,
            sanitized.fire_palette,
            sanitized.seed,
        );

        std::fs::write(&path, contents).with_context(|| format!("writing {}", path.display()))?;
        Ok(())
    }
}
