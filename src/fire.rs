// Fire Simulation - one-dimensional heat diffusion shared by every beam
use rand::Rng;

use crate::layout::BeamLayout;
use crate::settings::FirePalette;
use crate::types::Rgb;

/// How much the air cools as it rises. Less cooling = taller flames.
pub const COOLING: usize = 55;
/// Chance out of 256 that a new spark ignites each step. Higher = more roaring fire.
pub const SPARKING: u8 = 120;
/// Sparks land in the lowest cells only
const SPARK_ZONE: usize = 7;

pub struct FireSimulation {
    heat: Vec<u8>,
}

impl FireSimulation {
    pub fn new(beam_height: usize) -> Self {
        Self {
            heat: vec![0; beam_height],
        }
    }

    pub fn heat(&self) -> &[u8] {
        &self.heat
    }

    /// Advance the simulation one frame: cool, drift upwards, maybe spark
    pub fn step<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if self.heat.is_empty() {
            return;
        }
        self.cool(rng);
        self.diffuse();
        self.spark(rng);
    }

    fn cool<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        let max_cooling = ((COOLING * 10) / self.heat.len() + 2).min(256) as u16;
        for cell in self.heat.iter_mut() {
            let cooling = rng.gen_range(0..max_cooling).min(255) as u8;
            *cell = cell.saturating_sub(cooling);
        }
    }

    fn diffuse(&mut self) {
        for k in (2..self.heat.len()).rev() {
            let below = self.heat[k - 1] as u16;
            let below2 = self.heat[k - 2] as u16;
            self.heat[k] = ((below + below2 * 2) / 3) as u8;
        }
    }

    fn spark<R: Rng + ?Sized>(&mut self, rng: &mut R) {
        if rng.gen::<u8>() < SPARKING {
            let y = rng.gen_range(0..SPARK_ZONE.min(self.heat.len()));
            let spark = rng.gen_range(160..255u16) as u8;
            self.heat[y] = self.heat[y].saturating_add(spark);
        }
    }

    /// Map heat to colors and write the same column into every beam
    pub fn render(&self, layout: &BeamLayout, palette: FirePalette, frame: &mut [Rgb]) {
        for beam in 0..layout.beam_count() {
            for (offset, &heat) in self.heat.iter().enumerate().take(layout.beam_height()) {
                if let Some(pixel) = layout
                    .pixel_index(beam, offset)
                    .and_then(|idx| frame.get_mut(idx))
                {
                    *pixel = palette.color_at(heat);
                }
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;

    #[test]
    fn cooling_floors_at_zero() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut fire = FireSimulation::new(47);
        fire.heat.iter_mut().for_each(|h| *h = 5);
        for _ in 0..50 {
            fire.cool(&mut rng);
            assert!(fire.heat().iter().all(|&h| h <= 5));
        }
        assert!(fire.heat().iter().all(|&h| h == 0));
    }

    #[test]
    fn sparks_saturate_instead_of_wrapping() {
        let mut rng = StdRng::seed_from_u64(2);
        let mut fire = FireSimulation::new(47);
        for _ in 0..200 {
            fire.heat.iter_mut().for_each(|h| *h = 250);
            fire.spark(&mut rng);
            assert!(fire.heat().iter().all(|&h| h == 250 || h == 255));
            assert!(fire.heat()[SPARK_ZONE..].iter().all(|&h| h == 250));
        }
    }

    #[test]
    fn sparks_eventually_heat_the_bottom() {
        let mut rng = StdRng::seed_from_u64(3);
        let mut fire = FireSimulation::new(47);
        for _ in 0..20 {
            fire.step(&mut rng);
        }
        assert!(fire.heat().iter().take(SPARK_ZONE).any(|&h| h > 0));
    }

    #[test]
    fn diffusion_moves_heat_up() {
        let mut fire = FireSimulation::new(10);
        fire.heat[0] = 255;
        fire.heat[1] = 255;
        fire.diffuse();
        assert_eq!(fire.heat()[..4], [255, 255, 255, 170]);
        assert!(fire.heat()[4..].iter().all(|&h| h == 0));
    }

    #[test]
    fn tiny_beams_still_spark_in_range() {
        let mut rng = StdRng::seed_from_u64(4);
        let mut fire = FireSimulation::new(3);
        for _ in 0..200 {
            fire.step(&mut rng);
        }
        assert_eq!(fire.heat().len(), 3);
    }

    #[test]
    fn render_writes_every_beam_with_mirroring() {
        let layout = BeamLayout::new(2, 4);
        let mut fire = FireSimulation::new(4);
        fire.heat.copy_from_slice(&[240, 0, 0, 0]);
        let mut frame = layout.new_buffer();
        fire.render(&layout, FirePalette::Heat, &mut frame);
        assert_eq!(frame[0], Rgb::WHITE);
        assert_eq!(frame[7], Rgb::WHITE);
        assert_eq!(layout.pixel(&frame, 1, 0), Rgb::WHITE);
        assert!(frame[1].is_black());
    }
}
