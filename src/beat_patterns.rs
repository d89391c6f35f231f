// Beat Pattern Table - which beams light up, and with which color slot, on each step of a beat cycle

/// Number of rows in the table
pub const NUM_BEAT_PATTERNS: usize = 6;
/// Beats per pattern cycle; the engine re-rolls at the start of every cycle
pub const BEAT_PATTERN_SIZE: usize = 8;
/// Color slots addressable by a step
pub const NUM_COLOR_SLOTS: usize = 4;

/// One step of a beat pattern
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeatStep {
    /// Bit n set = beam n lit (beams 0-3)
    pub beam_mask: u8,
    /// Color slot (0-3) used this step
    pub color_slot: u8,
}

const fn step(beam_mask: u8, color_slot: u8) -> BeatStep {
    BeatStep { beam_mask, color_slot }
}

pub static BEAT_PATTERNS: [[BeatStep; BEAT_PATTERN_SIZE]; NUM_BEAT_PATTERNS] = [
    // chase, one slot
    [
        step(0b0001, 0), step(0b0010, 0), step(0b0100, 0), step(0b1000, 0),
        step(0b0001, 0), step(0b0010, 0), step(0b0100, 0), step(0b1000, 0),
    ],
    // single beams answered by pairs
    [
        step(0b0001, 0), step(0b1010, 1), step(0b0010, 0), step(0b0101, 1),
        step(0b0100, 0), step(0b1010, 1), step(0b1000, 0), step(0b0101, 1),
    ],
    // build up, then build up again in the second slot
    [
        step(0b0001, 0), step(0b0011, 0), step(0b0111, 0), step(0b1111, 0),
        step(0b1000, 1), step(0b1100, 1), step(0b1110, 1), step(0b1111, 1),
    ],
    // alternating halves
    [
        step(0b0011, 0), step(0b1100, 0), step(0b0011, 0), step(0b1100, 0),
        step(0b0110, 1), step(0b1001, 1), step(0b0110, 1), step(0b1001, 1),
    ],
    // everything, walking through all four slots
    [
        step(0b1111, 0), step(0b1111, 0), step(0b1111, 1), step(0b1111, 1),
        step(0b1111, 2), step(0b1111, 2), step(0b1111, 3), step(0b1111, 3),
    ],
    // chase with a new slot per beam
    [
        step(0b0001, 0), step(0b0010, 1), step(0b0100, 2), step(0b1000, 3),
        step(0b0001, 0), step(0b0010, 1), step(0b0100, 2), step(0b1000, 3),
    ],
];

/// Look up the step for a beat. Any beat index wraps onto the cycle and any
/// pattern index wraps onto the table, so this never panics.
pub fn lookup(pattern_index: usize, beat_index: u64) -> BeatStep {
    let row = &BEAT_PATTERNS[pattern_index % NUM_BEAT_PATTERNS];
    row[step_of(beat_index)]
}

/// Position of a beat inside the pattern cycle
pub fn step_of(beat_index: u64) -> usize {
    (beat_index % BEAT_PATTERN_SIZE as u64) as usize
}
