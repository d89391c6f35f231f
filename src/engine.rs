// Animation Engine - beat-driven pattern selection and per-tick rendering into the pixel buffer
use rand::Rng;

use crate::beat_patterns::{self, NUM_BEAT_PATTERNS, NUM_COLOR_SLOTS};
use crate::color::pick_color;
use crate::fire::FireSimulation;
use crate::layout::BeamLayout;
use crate::settings::{ColorMode, DisplayMode, Settings};
use crate::types::Rgb;

/// Ticks between strobe flashes
pub const STROBE_PERIOD: u8 = 5;
/// Beams addressable through a beat step's mask
const MASKED_BEAMS: usize = 4;


/// Fill shapes, numbered as the `forced_pattern` setting addresses them
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Shape {
    On = 0,
    WipeUp = 1,
    WipeDown = 2,
    WipeOut = 3,
    WipeIn = 4,
    Strobe = 5,
    PulseUp = 6,
    PulseDown = 7,
}

impl Shape {
    pub const ALL: [Shape; 8] = [
        Shape::On,
        Shape::WipeUp,
        Shape::WipeDown,
        Shape::WipeOut,
        Shape::WipeIn,
        Shape::Strobe,
        Shape::PulseUp,
        Shape::PulseDown,
    ];

    pub fn from_index(index: u8) -> Option<Shape> {
        Self::ALL.get(index as usize).copied()
    }

    pub fn name(&self) -> &'static str {
        match self {
            Shape::On => "on",
            Shape::WipeUp => "wipe-up",
            Shape::WipeDown => "wipe-down",
            Shape::WipeOut => "wipe-out",
            Shape::WipeIn => "wipe-in",
            Shape::Strobe => "strobe",
            Shape::PulseUp => "pulse-up",
            Shape::PulseDown => "pulse-down",
        }
    }
}

/// Ease the beat phase into a fill length in pixels.
///
/// Cubic ease-out: the fill shoots up right after the beat and settles into
/// full height before the next one. Scaling by one extra pixel keeps the
/// last pixel from stalling until the very end of the beat.
pub fn eased_extent(phase_permil: u32, beam_height: usize) -> usize {
    let phase = phase_permil.min(1000) as u64;
    let remaining = 1000 - phase;
    let remaining = remaining * remaining * remaining / 1_000_000;
    let eased = 1000 - remaining;
    let extent = (beam_height as u64 + 1) * eased / 1000;
    extent.min(beam_height as u64) as usize
}

/// Everything the engine remembers between calls
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AnimationState {
    pub active_beat_pattern: usize,
    pub active_beam_mask: u8,
    pub active_color_slot: usize,
    pub slot_shapes: [Shape; NUM_COLOR_SLOTS],
    pub slot_colors: [Rgb; NUM_COLOR_SLOTS],
    pub strobe_counter: u8,
    /// Number of re-rolls so far, including the one at construction
    pub rolls: u64,
}

impl AnimationState {
    pub fn active_shape(&self, settings: &Settings) -> Shape {
        settings
            .forced_shape()
            .unwrap_or(self.slot_shapes[self.active_color_slot])
    }

    pub fn active_color(&self) -> Rgb {
        self.slot_colors[self.active_color_slot]
    }
}

pub struct AnimationEngine<R: Rng> {
    layout: BeamLayout,
    state: AnimationState,
    fire: FireSimulation,
    rng: R,
}

impl<R: Rng> AnimationEngine<R> {
    /// Build an engine with an initial roll, equivalent to having seen beat 0
    pub fn new(layout: BeamLayout, settings: &Settings, rng: R) -> Self {
        let mut engine = Self {
            layout,
            state: AnimationState {
                active_beat_pattern: 0,
                active_beam_mask: 0,
                active_color_slot: 0,
                slot_shapes: [Shape::On; NUM_COLOR_SLOTS],
                slot_colors: [Rgb::BLACK; NUM_COLOR_SLOTS],
                strobe_counter: 1,
                rolls: 0,
            },
            fire: FireSimulation::new(layout.beam_height()),
            rng,
        };
        engine.reroll(settings);
        engine.apply_step(0);
        engine
    }

    pub fn layout(&self) -> &BeamLayout {
        &self.layout
    }

    pub fn state(&self) -> &AnimationState {
        &self.state
    }

    /// Advance beat-level state, then render the fresh step at zero phase
    pub fn on_beat(&mut self, beat_index: u64, settings: &Settings, frame: &mut [Rgb]) {
        if beat_patterns::step_of(beat_index) == 0 {
            self.reroll(settings);
        }
        self.apply_step(beat_index);
        log::trace!(
            "beat {}: mask {:04b} slot {} shape {}",
            beat_index,
            self.state.active_beam_mask,
            self.state.active_color_slot,
            self.state.active_shape(settings).name()
        );
        self.on_tick(0, settings, frame);
    }

    /// Render one frame; `fill_phase_permil` is progress through the current beat (0-1000)
    pub fn on_tick(&mut self, fill_phase_permil: u32, settings: &Settings, frame: &mut [Rgb]) {
        frame.fill(Rgb::BLACK);

        match settings.display_mode {
            DisplayMode::Solid => {
                self.render_solid(settings, frame);
                return;
            }
            DisplayMode::Fire => {
                self.fire.step(&mut self.rng);
                self.fire.render(&self.layout, settings.fire_palette, frame);
                return;
            }
            DisplayMode::Normal => {}
        }

        let shape = self.state.active_shape(settings);
        let color = self.fill_color(settings);
        let height = self.layout.beam_height() as i64;
        let extent = eased_extent(fill_phase_permil, self.layout.beam_height()) as i64;

        match shape {
            Shape::On => self.fill_active_beams(frame, 0, height, color),
            Shape::WipeUp => self.fill_active_beams(frame, height - extent, height, color),
            Shape::WipeDown => self.fill_active_beams(frame, 0, extent, color),
            Shape::WipeIn => {
                let half = extent / 2;
                self.fill_active_beams(frame, 0, half, color);
                self.fill_active_beams(frame, height - half, height, color);
            }
            Shape::WipeOut => {
                let edge = (height - extent) / 2;
                self.fill_active_beams(frame, edge, height - edge, color);
            }
            Shape::PulseUp => {
                let start = extent * 3 / 4;
                self.fill_active_beams(frame, start, start + height / 4, color);
            }
            Shape::PulseDown => {
                let start = (height - extent) * 3 / 4;
                self.fill_active_beams(frame, start, start + height / 4, color);
            }
            Shape::Strobe => self.render_strobe(settings, frame, color),
        }
    }

    /// New beat pattern row plus a fresh (shape, color) for every slot
    fn reroll(&mut self, settings: &Settings) {
        self.state.active_beat_pattern = self.rng.gen_range(0..NUM_BEAT_PATTERNS);
        for slot in 0..NUM_COLOR_SLOTS {
            self.state.slot_shapes[slot] = Shape::ALL[self.rng.gen_range(0..Shape::ALL.len())];
            self.state.slot_colors[slot] = pick_color(settings.color_mode, settings.hue, &mut self.rng);
        }
        self.state.rolls += 1;
        log::debug!(
            "re-rolled beat pattern {} with shapes {:?}",
            self.state.active_beat_pattern,
            self.state.slot_shapes.map(|s| s.name())
        );
    }

    fn apply_step(&mut self, beat_index: u64) {
        let step = beat_patterns::lookup(self.state.active_beat_pattern, beat_index);
        self.state.active_beam_mask = step.beam_mask;
        self.state.active_color_slot = step.color_slot as usize % NUM_COLOR_SLOTS;
    }

    /// White mode overrides whatever color the slot rolled
    fn fill_color(&self, settings: &Settings) -> Rgb {
        if settings.color_mode == ColorMode::White {
            Rgb::WHITE
        } else {
            self.state.active_color()
        }
    }

    fn render_solid(&mut self, settings: &Settings, frame: &mut [Rgb]) {
        let height = self.layout.beam_height() as i64;
        for beam in 0..self.layout.beam_count() {
            let color = pick_color(settings.color_mode, settings.hue, &mut self.rng);
            self.layout.fill_beam(frame, beam as i64, 0, height, color);
        }
    }

    fn render_strobe(&mut self, settings: &Settings, frame: &mut [Rgb], color: Rgb) {
        self.state.strobe_counter = self.state.strobe_counter.saturating_sub(1);
        if self.state.strobe_counter > 0 {
            return;
        }
        self.state.strobe_counter = STROBE_PERIOD;

        let height = self.layout.beam_height() as i64;
        if settings.color_mode == ColorMode::White {
            for beam in 0..self.layout.beam_count() {
                self.layout.fill_beam(frame, beam as i64, 0, height, Rgb::WHITE);
            }
        } else {
            self.fill_active_beams(frame, 0, height, color);
        }
    }

    fn fill_active_beams(&self, frame: &mut [Rgb], start: i64, finish: i64, color: Rgb) {
        let beams = self.layout.beam_count().min(MASKED_BEAMS);
        for beam in 0..beams {
            if self.state.active_beam_mask & (1 << beam) != 0 {
                self.layout.fill_beam(frame, beam as i64, start, finish, color);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::beat_patterns::BEAT_PATTERN_SIZE;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    fn engine(settings: &Settings) -> AnimationEngine<StdRng> {
        AnimationEngine::new(BeamLayout::new(2, 47), settings, StdRng::seed_from_u64(42))
    }

    fn lit(frame: &[Rgb]) -> usize {
        frame.iter().filter(|p| !p.is_black()).count()
    }

    fn forced(shape: Shape) -> Settings {
        Settings {
            color_mode: ColorMode::Hue,
            hue: 96,
            forced_pattern: shape as u8,
            ..Settings::default()
        }
    }

    /// Point the engine at a step that lights both beams
    fn light_both_beams(engine: &mut AnimationEngine<StdRng>) {
        engine.state.active_beam_mask = 0b0011;
    }

    /// Shape 0 cannot be forced, so pin every slot instead
    fn pin_shape(engine: &mut AnimationEngine<StdRng>, shape: Shape) {
        engine.state.slot_shapes = [shape; NUM_COLOR_SLOTS];
    }

    #[test]
    fn extent_endpoints_and_monotonic() {
        assert_eq!(eased_extent(0, 47), 0);
        assert_eq!(eased_extent(1000, 47), 47);
        assert_eq!(eased_extent(5000, 47), 47);
        assert_eq!(eased_extent(500, 47), 42);
        let mut last = 0;
        for phase in 0..=1000 {
            let e = eased_extent(phase, 47);
            assert!(e >= last, "extent fell at phase {}", phase);
            assert!(e <= 47);
            last = e;
        }
    }

    #[test]
    fn extent_does_not_reach_full_height_early() {
        assert!(eased_extent(700, 47) < 47);
        assert_eq!(eased_extent(999, 47), 47);
        assert_eq!(eased_extent(0, 1), 0);
        assert_eq!(eased_extent(1000, 1), 1);
    }

    #[test]
    fn construction_rolls_once() {
        let e = engine(&Settings::default());
        assert_eq!(e.state().rolls, 1);
        assert!(e.state().active_beat_pattern < NUM_BEAT_PATTERNS);
        assert_eq!(e.state().strobe_counter, 1);
    }

    #[test]
    fn reroll_only_on_cycle_start() {
        let settings = Settings::default();
        let mut e = engine(&settings);
        let mut frame = e.layout().new_buffer();
        for beat in 1..=40u64 {
            let before = e.state().rolls;
            e.on_beat(beat, &settings, &mut frame);
            let expected = if beat % BEAT_PATTERN_SIZE as u64 == 0 { before + 1 } else { before };
            assert_eq!(e.state().rolls, expected, "beat {}", beat);
        }
    }

    #[test]
    fn cycle_starts_redraw_and_other_beats_keep_slots() {
        let settings = Settings::default();
        let mut e = AnimationEngine::new(BeamLayout::new(2, 47), &settings, StdRng::seed_from_u64(1));
        let mut frame = e.layout().new_buffer();
        let mut cycles = 0;
        let mut shapes_changed = 0;
        let mut row_changed = 0;
        for beat in 0..800u64 {
            let before = e.state().clone();
            e.on_beat(beat, &settings, &mut frame);
            let after = e.state();
            if beat % BEAT_PATTERN_SIZE as u64 == 0 {
                if beat == 0 {
                    continue;
                }
                cycles += 1;
                if after.slot_shapes != before.slot_shapes {
                    shapes_changed += 1;
                }
                if after.active_beat_pattern != before.active_beat_pattern {
                    row_changed += 1;
                }
            } else {
                assert_eq!(after.active_beat_pattern, before.active_beat_pattern, "beat {}", beat);
                assert_eq!(after.slot_shapes, before.slot_shapes, "beat {}", beat);
                assert_eq!(after.slot_colors, before.slot_colors, "beat {}", beat);
            }
        }
        assert_eq!(cycles, 99);
        // four uniform shapes repeat with odds 8^-4, a row repeats one time in six
        assert!(shapes_changed >= 95, "shapes changed {} times", shapes_changed);
        assert!(row_changed >= 60, "pattern row changed {} times", row_changed);
    }

    #[test]
    fn every_beat_follows_the_table() {
        let settings = Settings::default();
        let mut e = engine(&settings);
        let mut frame = e.layout().new_buffer();
        for beat in 0..32u64 {
            e.on_beat(beat, &settings, &mut frame);
            let step = beat_patterns::lookup(e.state().active_beat_pattern, beat);
            assert_eq!(e.state().active_beam_mask, step.beam_mask);
            assert_eq!(e.state().active_color_slot, step.color_slot as usize);
        }
    }

    #[test]
    fn ticks_do_not_touch_beat_state() {
        let settings = Settings::default();
        let mut e = engine(&settings);
        let mut frame = e.layout().new_buffer();
        e.on_beat(3, &settings, &mut frame);
        let before = e.state().clone();
        for phase in (0..=1000).step_by(50) {
            e.on_tick(phase, &settings, &mut frame);
        }
        let after = e.state();
        assert_eq!(after.active_beat_pattern, before.active_beat_pattern);
        assert_eq!(after.active_beam_mask, before.active_beam_mask);
        assert_eq!(after.slot_shapes, before.slot_shapes);
        assert_eq!(after.slot_colors, before.slot_colors);
        assert_eq!(after.rolls, before.rolls);
    }

    #[test]
    fn tick_clears_previous_frame() {
        let settings = forced(Shape::WipeDown);
        let mut e = engine(&settings);
        light_both_beams(&mut e);
        let mut frame = vec![Rgb::WHITE; 94];
        e.on_tick(0, &settings, &mut frame);
        assert_eq!(lit(&frame), 0);
    }

    #[test]
    fn wipe_down_fills_from_the_top_offset() {
        let settings = forced(Shape::WipeDown);
        let mut e = engine(&settings);
        light_both_beams(&mut e);
        let mut frame = e.layout().new_buffer();
        e.on_tick(500, &settings, &mut frame);
        let layout = *e.layout();
        for beam in 0..2 {
            for offset in 0..47 {
                assert_eq!(!layout.pixel(&frame, beam, offset).is_black(), offset < 42);
            }
        }
    }

    #[test]
    fn wipe_in_and_out_are_symmetric() {
        let mut frame = vec![Rgb::BLACK; 94];

        let settings = forced(Shape::WipeIn);
        let mut e = engine(&settings);
        light_both_beams(&mut e);
        e.on_tick(500, &settings, &mut frame);
        let layout = *e.layout();
        // extent 42 -> 21 pixels at each end
        for offset in 0..47 {
            let expect = offset < 21 || offset >= 26;
            assert_eq!(!layout.pixel(&frame, 0, offset).is_black(), expect, "wipe in {}", offset);
        }

        let settings = forced(Shape::WipeOut);
        let mut e = engine(&settings);
        light_both_beams(&mut e);
        e.on_tick(500, &settings, &mut frame);
        // (47 - 42) / 2 = 2 -> [2, 45)
        for offset in 0..47 {
            let expect = (2..45).contains(&offset);
            assert_eq!(!layout.pixel(&frame, 0, offset).is_black(), expect, "wipe out {}", offset);
        }
    }

    #[test]
    fn pulse_down_band_stays_in_bounds() {
        let settings = forced(Shape::PulseDown);
        let mut e = engine(&settings);
        light_both_beams(&mut e);
        let mut frame = e.layout().new_buffer();
        for phase in (0..=1000).step_by(10) {
            e.on_tick(phase, &settings, &mut frame);
            let band = lit(&frame);
            assert!(band <= 2 * 11, "phase {} lit {}", phase, band);
        }
        e.on_tick(0, &settings, &mut frame);
        // extent 0 -> start 35, band [35, 46)
        let layout = *e.layout();
        assert!(!layout.pixel(&frame, 0, 35).is_black());
        assert!(layout.pixel(&frame, 0, 34).is_black());
        assert!(layout.pixel(&frame, 0, 46).is_black());
    }

    #[test]
    fn only_masked_beams_are_drawn() {
        let settings = forced(Shape::On);
        let mut e = engine(&settings);
        pin_shape(&mut e, Shape::On);
        e.state.active_beam_mask = 0b0010;
        let mut frame = e.layout().new_buffer();
        e.on_tick(700, &settings, &mut frame);
        assert!(frame[..47].iter().all(|p| p.is_black()));
        assert!(frame[47..].iter().all(|p| !p.is_black()));
    }

    #[test]
    fn strobe_flashes_once_every_five_ticks() {
        let settings = forced(Shape::Strobe);
        for start in 1..=STROBE_PERIOD {
            let mut e = engine(&settings);
            light_both_beams(&mut e);
            e.state.strobe_counter = start;
            let mut frame = e.layout().new_buffer();
            let mut flashes = 0;
            for _ in 0..STROBE_PERIOD {
                e.on_tick(300, &settings, &mut frame);
                match lit(&frame) {
                    0 => {}
                    94 => flashes += 1,
                    n => panic!("partial strobe frame with {} pixels", n),
                }
            }
            assert_eq!(flashes, 1, "starting counter {}", start);
        }
    }

    #[test]
    fn white_strobe_ignores_the_mask() {
        let settings = Settings {
            color_mode: ColorMode::White,
            ..forced(Shape::Strobe)
        };
        let mut e = engine(&settings);
        e.state.active_beam_mask = 0b0001;
        e.state.strobe_counter = 1;
        let mut frame = e.layout().new_buffer();
        e.on_tick(0, &settings, &mut frame);
        assert!(frame.iter().all(|p| *p == Rgb::WHITE));
    }

    #[test]
    fn white_mode_overrides_rolled_colors() {
        let settings = forced(Shape::On);
        let mut e = engine(&settings);
        pin_shape(&mut e, Shape::On);
        light_both_beams(&mut e);
        let white = Settings { color_mode: ColorMode::White, ..settings };
        let mut frame = e.layout().new_buffer();
        e.on_tick(0, &white, &mut frame);
        assert!(frame.iter().all(|p| *p == Rgb::WHITE));
    }

    #[test]
    fn out_of_range_override_falls_back_to_slot_shape() {
        let mut settings = forced(Shape::On);
        settings.forced_pattern = 42;
        let e = engine(&settings);
        let slot_shape = e.state().slot_shapes[e.state().active_color_slot];
        assert_eq!(e.state().active_shape(&settings), slot_shape);
    }

    #[test]
    fn fire_mode_lights_every_beam_alike() {
        let settings = Settings {
            display_mode: DisplayMode::Fire,
            ..Settings::default()
        };
        let mut e = engine(&settings);
        let mut frame = e.layout().new_buffer();
        for _ in 0..30 {
            e.on_tick(0, &settings, &mut frame);
        }
        let layout = *e.layout();
        for offset in 0..47 {
            assert_eq!(layout.pixel(&frame, 0, offset), layout.pixel(&frame, 1, offset));
        }
        assert!(lit(&frame) > 0);
    }

    #[test]
    fn more_than_four_beams_never_panics() {
        let settings = forced(Shape::On);
        let mut e = AnimationEngine::new(BeamLayout::new(6, 10), &settings, StdRng::seed_from_u64(9));
        let mut frame = e.layout().new_buffer();
        for beat in 0..16 {
            e.on_beat(beat, &settings, &mut frame);
        }
        // beams past the mask width are never targeted by patterns
        assert!(frame[40..].iter().all(|p| p.is_black()));
    }
}
