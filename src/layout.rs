// Layout Module - maps (beam, height offset) onto the shared pixel buffer
//
// Beams are laid out one after another. Odd beams are wired in the opposite
// direction, so their offsets are mirrored inside the beam.
use crate::types::Rgb;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BeamLayout {
    beam_count: usize,
    beam_height: usize,
}

impl BeamLayout {
    pub fn new(beam_count: usize, beam_height: usize) -> Self {
        Self { beam_count, beam_height }
    }

    pub fn beam_count(&self) -> usize {
        self.beam_count
    }

    pub fn beam_height(&self) -> usize {
        self.beam_height
    }

    /// Length of the pixel buffer this layout addresses
    pub fn pixel_count(&self) -> usize {
        self.beam_count * self.beam_height
    }

    /// A zeroed buffer sized for this layout
    pub fn new_buffer(&self) -> Vec<Rgb> {
        vec![Rgb::BLACK; self.pixel_count()]
    }

    /// Buffer index of a pixel, or `None` when the beam or offset is outside the layout
    pub fn pixel_index(&self, beam: usize, offset: usize) -> Option<usize> {
        if beam >= self.beam_count || offset >= self.beam_height {
            return None;
        }
        let base = beam * self.beam_height;
        if beam % 2 == 0 {
            Some(base + offset)
        } else {
            Some(base + (self.beam_height - 1 - offset))
        }
    }

    /// Fill `[start, finish)` on one beam. All inputs are clamped to the layout first,
    /// so nothing is ever written outside the buffer.
    pub fn fill_beam(&self, frame: &mut [Rgb], beam: i64, start: i64, finish: i64, color: Rgb) {
        if self.beam_count == 0 || self.beam_height == 0 {
            return;
        }
        let beam = beam.clamp(0, self.beam_count as i64 - 1) as usize;
        let start = start.clamp(0, self.beam_height as i64) as usize;
        let finish = finish.clamp(0, self.beam_height as i64) as usize;

        for offset in start..finish {
            if let Some(pixel) = self
                .pixel_index(beam, offset)
                .and_then(|idx| frame.get_mut(idx))
            {
                *pixel = color;
            }
        }
    }

    /// Read a pixel back in logical (unmirrored) order
    pub fn pixel(&self, frame: &[Rgb], beam: usize, offset: usize) -> Rgb {
        self.pixel_index(beam, offset)
            .and_then(|idx| frame.get(idx).copied())
            .unwrap_or(Rgb::BLACK)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn even_beams_run_forward_odd_beams_mirror() {
        let layout = BeamLayout::new(3, 10);
        assert_eq!(layout.pixel_index(0, 0), Some(0));
        assert_eq!(layout.pixel_index(0, 9), Some(9));
        assert_eq!(layout.pixel_index(1, 0), Some(19));
        assert_eq!(layout.pixel_index(1, 9), Some(10));
        assert_eq!(layout.pixel_index(2, 3), Some(23));
        assert_eq!(layout.pixel_index(3, 0), None);
        assert_eq!(layout.pixel_index(0, 10), None);
    }

    #[test]
    fn fill_clamps_wild_inputs() {
        let layout = BeamLayout::new(2, 47);
        let inputs = [i64::MIN, -1000, -1, 0, 1, 23, 46, 47, 48, 1000, i64::MAX];
        for &beam in &inputs {
            for &start in &inputs {
                for &finish in &inputs {
                    let mut frame = layout.new_buffer();
                    layout.fill_beam(&mut frame, beam, start, finish, Rgb::WHITE);
                    assert_eq!(frame.len(), 94);
                }
            }
        }
    }

    #[test]
    fn fill_full_beam_lights_every_pixel_of_that_beam_only() {
        let layout = BeamLayout::new(2, 47);
        let mut frame = layout.new_buffer();
        layout.fill_beam(&mut frame, 1, -5, 100, Rgb::WHITE);
        assert!(frame[..47].iter().all(|p| p.is_black()));
        assert!(frame[47..].iter().all(|p| *p == Rgb::WHITE));
    }

    #[test]
    fn short_buffer_is_not_overrun() {
        let layout = BeamLayout::new(2, 10);
        let mut frame = vec![Rgb::BLACK; 5];
        layout.fill_beam(&mut frame, 1, 0, 10, Rgb::WHITE);
        layout.fill_beam(&mut frame, 0, 0, 10, Rgb::WHITE);
        assert!(frame.iter().all(|p| *p == Rgb::WHITE));
    }

    #[test]
    fn empty_layout_is_a_no_op() {
        let layout = BeamLayout::new(0, 10);
        let mut frame = Vec::new();
        layout.fill_beam(&mut frame, 0, 0, 10, Rgb::WHITE);
        assert!(frame.is_empty());
    }
}
