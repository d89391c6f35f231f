// Beamlights - driver for the beat-synchronized beam animation
// Owns the pixel buffer, the beat clock and frame pacing; shows frames in a terminal preview
use anyhow::Result;
use clap::Parser;
use crossterm::event::{poll, read, Event};
use notify::{Config, Event as NotifyEvent, RecommendedWatcher, RecursiveMode, Watcher};
use rand::rngs::StdRng;
use rand::SeedableRng;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{mpsc, Arc};
use std::thread;
use std::time::{Duration, Instant};

use beamlights::clock::BeatClock;
use beamlights::config::{Args, LightConfig};
use beamlights::{AnimationEngine, BeamLayout, Rgb, Settings, Shape};

mod preview;

use preview::{KeyAction, Preview, Status};

const BPM_STEP: f64 = 1.0;

fn make_rng(seed: u64) -> StdRng {
    if seed == 0 {
        StdRng::from_entropy()
    } else {
        StdRng::seed_from_u64(seed)
    }
}

/// Everything a running show needs between frames
struct Show {
    config: LightConfig,
    settings: Settings,
    engine: AnimationEngine<StdRng>,
    clock: BeatClock,
    frame: Vec<Rgb>,
}

impl Show {
    fn new(config: LightConfig, now: Instant) -> Self {
        let settings = config.to_settings();
        let layout = BeamLayout::new(config.beam_count, config.beam_height);
        let engine = AnimationEngine::new(layout, &settings, make_rng(config.seed));
        let clock = BeatClock::new(config.bpm, now);
        Self {
            frame: layout.new_buffer(),
            config,
            settings,
            engine,
            clock,
        }
    }

    fn frame_duration(&self) -> Duration {
        Duration::from_secs_f64(1.0 / self.config.fps)
    }

    /// Apply a reloaded config; the engine is rebuilt only when the beam geometry changed
    fn reload(&mut self, new_config: LightConfig, now: Instant) {
        if new_config == self.config {
            return;
        }
        let layout = BeamLayout::new(new_config.beam_count, new_config.beam_height);
        self.settings = new_config.to_settings();
        if layout != *self.engine.layout() {
            log::info!("Beam layout changed to {}x{}, restarting engine", layout.beam_count(), layout.beam_height());
            self.engine = AnimationEngine::new(layout, &self.settings, make_rng(new_config.seed));
            self.frame = layout.new_buffer();
        }
        if new_config.bpm != self.clock.bpm() {
            self.clock.set_bpm(new_config.bpm, now);
        }
        self.config = new_config;
    }

    /// Render the frame due at `now`; returns the beat index if a beat landed
    fn advance(&mut self, now: Instant) -> Option<u64> {
        let tick = self.clock.poll(now);
        match tick.beat {
            Some(beat) => self.engine.on_beat(beat, &self.settings, &mut self.frame),
            None => self.engine.on_tick(tick.phase_permil, &self.settings, &mut self.frame),
        }
        tick.beat
    }

    /// Apply a key press; returns false when the show should stop
    fn handle_key(&mut self, action: KeyAction, now: Instant) -> Result<bool> {
        match action {
            KeyAction::Quit => return Ok(false),
            KeyAction::CycleDisplayMode => {
                self.settings.display_mode = self.settings.display_mode.next();
            }
            KeyAction::CycleColorMode => {
                self.settings.color_mode = self.settings.color_mode.next();
            }
            KeyAction::CyclePattern => {
                let next = (self.settings.forced_pattern as usize + 1) % Shape::ALL.len();
                self.settings.forced_pattern = next as u8;
            }
            KeyAction::CycleFirePalette => {
                self.settings.fire_palette = self.settings.fire_palette.next();
            }
            KeyAction::Tap => self.clock.tap(now),
            KeyAction::BpmUp => self.clock.set_bpm(self.clock.bpm() + BPM_STEP, now),
            KeyAction::BpmDown => self.clock.set_bpm(self.clock.bpm() - BPM_STEP, now),
        }
        // Persist so the change survives a restart; the watcher reload sees identical values
        self.config.apply_settings(&self.settings, self.clock.bpm());
        self.config.save()?;
        Ok(true)
    }
}

fn spawn_config_watcher(config_path: PathBuf, config_change_tx: mpsc::Sender<()>) -> Result<()> {
    thread::spawn(move || -> Result<()> {
        let (tx, rx) = mpsc::channel();
        let mut watcher = match RecommendedWatcher::new(tx, Config::default()) {
            Ok(w) => w,
            Err(e) => {
                log::warn!("Config watcher unavailable: {}", e);
                return Ok(());
            }
        };

        if let Err(e) = watcher.watch(&config_path, RecursiveMode::NonRecursive) {
            log::warn!("Cannot watch {}: {}", config_path.display(), e);
            return Ok(());
        }

        loop {
            match rx.recv() {
                Ok(Ok(NotifyEvent { kind, .. })) => {
                    if matches!(kind, notify::EventKind::Modify(_)) && config_change_tx.send(()).is_err() {
                        break;
                    }
                }
                Err(_) => break,
                _ => {}
            }
        }
        Ok(())
    });

    Ok(())
}

/// Pick up edits to the config file, if any arrived since the last frame
fn check_config_changes(show: &mut Show, config_change_rx: &mpsc::Receiver<()>, now: Instant) {
    let mut changed = false;
    while config_change_rx.try_recv().is_ok() {
        changed = true;
    }
    if !changed {
        return;
    }
    let Some(path) = show.config.config_path.clone() else {
        return;
    };
    match LightConfig::load_from(path) {
        Ok(new_config) => show.reload(new_config, now),
        Err(e) => log::warn!("Ignoring config change: {:#}", e),
    }
}

fn run_preview(mut show: Show, config_change_rx: mpsc::Receiver<()>) -> Result<()> {
    let mut preview = Preview::new()?;
    let mut last_frame = Instant::now()
        .checked_sub(show.frame_duration())
        .unwrap_or_else(Instant::now);

    loop {
        let loop_start = Instant::now();

        check_config_changes(&mut show, &config_change_rx, loop_start);

        // Check for keyboard input
        if poll(Duration::from_millis(0))? {
            if let Event::Key(key) = read()? {
                if let Some(action) = preview::key_action(key) {
                    if !show.handle_key(action, loop_start)? {
                        return Ok(());
                    }
                }
            }
        }

        // Render frame if it's time
        let frame_duration = show.frame_duration();
        if loop_start.duration_since(last_frame) >= frame_duration {
            last_frame = loop_start;
            show.advance(loop_start);

            let brightness = show.settings.display_mode.brightness();
            let status = Status {
                settings: &show.settings,
                state: show.engine.state(),
                bpm: show.clock.bpm(),
                beat: show.clock.current_beat(),
            };
            preview.draw(show.engine.layout(), &show.frame, brightness, &status)?;
        }

        // Sleep to maintain target FPS
        let elapsed = loop_start.elapsed();
        if elapsed < frame_duration {
            thread::sleep((frame_duration - elapsed).min(Duration::from_millis(5)));
        }
    }
}

fn run_headless(mut show: Show, config_change_rx: mpsc::Receiver<()>, max_frames: Option<u64>) -> Result<()> {
    let shutdown = Arc::new(AtomicBool::new(false));
    let handler_flag = shutdown.clone();
    ctrlc::set_handler(move || handler_flag.store(true, Ordering::SeqCst))?;

    let mut frames = 0u64;
    let mut beats = 0u64;
    let started = Instant::now();

    while !shutdown.load(Ordering::SeqCst) {
        if max_frames.is_some_and(|max| frames >= max) {
            break;
        }
        let loop_start = Instant::now();

        check_config_changes(&mut show, &config_change_rx, loop_start);

        if let Some(beat) = show.advance(loop_start) {
            beats += 1;
            let state = show.engine.state();
            log::info!(
                "beat {} | pattern row {} | beams {:04b} | slot {} | shape {}",
                beat,
                state.active_beat_pattern,
                state.active_beam_mask,
                state.active_color_slot,
                state.active_shape(&show.settings).name()
            );
        }
        frames += 1;

        // Sleep to maintain target FPS
        let frame_duration = show.frame_duration();
        let elapsed = loop_start.elapsed();
        if elapsed < frame_duration {
            thread::sleep(frame_duration - elapsed);
        }
    }

    println!(
        "Rendered {} frames and {} beats in {:.1}s",
        frames,
        beats,
        started.elapsed().as_secs_f64()
    );
    Ok(())
}

fn main() -> Result<()> {
    let args = Args::parse();

    // The preview owns the terminal, so logging stays off there unless RUST_LOG asks for it
    let default_filter = if args.headless && !args.quiet { "info" } else { "off" };
    env_logger::Builder::from_env(env_logger::Env::default().default_filter_or(default_filter)).init();

    // Get config file path (custom or default)
    let config_path = LightConfig::config_path(args.cfg.as_deref())?;
    let config_file_exists = config_path.exists();

    let mut config = if config_file_exists {
        // Config file exists - load it or fail with error message
        match LightConfig::load_from(config_path.clone()) {
            Ok(c) => c,
            Err(e) => {
                eprintln!("\nFailed to load config file: {:#}", e);
                eprintln!("Config file: {}", config_path.display());
                eprintln!("\nPlease fix the config file or delete it to regenerate with defaults.");
                return Err(e);
            }
        }
    } else {
        LightConfig {
            config_path: Some(config_path.clone()),
            ..LightConfig::default()
        }
    };

    let args_provided = config.merge_with_args(&args);

    // Save config only when it is new or the command line changed it
    if !config_file_exists || args_provided {
        config.save()?;
    }

    if !args.quiet {
        println!("Using config file: {}", config_path.display());
        println!(
            "{} beams x {} pixels, {} BPM, {} FPS",
            config.beam_count, config.beam_height, config.bpm, config.fps
        );
    }

    let (config_change_tx, config_change_rx) = mpsc::channel();
    spawn_config_watcher(config_path, config_change_tx)?;

    let show = Show::new(config, Instant::now());

    if args.headless {
        run_headless(show, config_change_rx, args.frames)
    } else {
        run_preview(show, config_change_rx)
    }
}
