// Beat Clock - turns a tempo into beat indices and phase-through-beat for the driver loop
use std::time::{Duration, Instant};

pub const MIN_BPM: f64 = 20.0;
pub const MAX_BPM: f64 = 300.0;

/// Taps further apart than this start a new tap-tempo series
const TAP_TIMEOUT: Duration = Duration::from_secs(2);
const MAX_TAPS: usize = 8;

/// What the driver should do this frame
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ClockTick {
    /// Set when a new beat started since the last poll
    pub beat: Option<u64>,
    /// Progress through the current beat, 0-1000
    pub phase_permil: u32,
}

pub struct BeatClock {
    bpm: f64,
    interval: Duration,
    anchor: Instant,
    anchor_beat: u64,
    last_reported: Option<u64>,
    taps: Vec<Instant>,
}

fn interval_for(bpm: f64) -> Duration {
    Duration::from_secs_f64(60.0 / bpm)
}

impl BeatClock {
    pub fn new(bpm: f64, now: Instant) -> Self {
        let bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        Self {
            bpm,
            interval: interval_for(bpm),
            anchor: now,
            anchor_beat: 0,
            last_reported: None,
            taps: Vec::new(),
        }
    }

    pub fn bpm(&self) -> f64 {
        self.bpm
    }

    /// Most recent beat handed out by `poll`
    pub fn current_beat(&self) -> Option<u64> {
        self.last_reported
    }

    fn position(&self, now: Instant) -> (u64, u32) {
        let elapsed = now.saturating_duration_since(self.anchor).as_nanos();
        let interval = self.interval.as_nanos().max(1);
        let beats = (elapsed / interval) as u64;
        let phase = ((elapsed % interval) * 1000 / interval) as u32;
        (self.anchor_beat + beats, phase)
    }

    pub fn poll(&mut self, now: Instant) -> ClockTick {
        let (beat, phase_permil) = self.position(now);
        let fresh = match self.last_reported {
            Some(last) => beat > last,
            None => true,
        };
        if fresh {
            self.last_reported = Some(beat);
        }
        ClockTick {
            beat: fresh.then_some(beat),
            phase_permil,
        }
    }

    /// Change tempo without losing the current beat count or phase
    pub fn set_bpm(&mut self, bpm: f64, now: Instant) {
        let bpm = bpm.clamp(MIN_BPM, MAX_BPM);
        let (beat, phase) = self.position(now);
        self.bpm = bpm;
        self.interval = interval_for(bpm);
        let into_beat = self.interval.mul_f64(phase as f64 / 1000.0);
        self.anchor = now.checked_sub(into_beat).unwrap_or(now);
        self.anchor_beat = beat;
    }

    /// Register a tap. Two or more taps in a series set the tempo and land a beat on the tap.
    pub fn tap(&mut self, now: Instant) {
        if let Some(&last) = self.taps.last() {
            if now.saturating_duration_since(last) > TAP_TIMEOUT {
                self.taps.clear();
            }
        }
        self.taps.push(now);
        if self.taps.len() > MAX_TAPS {
            self.taps.remove(0);
        }

        let n = self.taps.len();
        if n < 2 {
            return;
        }
        let span = self.taps[n - 1].saturating_duration_since(self.taps[0]);
        let mean = span.as_secs_f64() / (n - 1) as f64;
        if mean <= 0.0 {
            return;
        }
        self.bpm = (60.0 / mean).clamp(MIN_BPM, MAX_BPM);
        self.interval = interval_for(self.bpm);
        self.anchor = now;
        self.anchor_beat = self.last_reported.map_or(0, |b| b + 1);
        log::info!("Calculated bpm={:.1} from {} taps", self.bpm, n);
    }
}
