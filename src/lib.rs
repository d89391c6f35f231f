// Beamlights - beat-synchronized light animation for vertical LED beams
// The engine owns pattern state and renders into a caller-owned pixel buffer;
// timing, beat detection and pushing pixels to hardware stay with the driver.
pub mod beat_patterns;
pub mod clock;
pub mod color;
pub mod config;
pub mod engine;
pub mod fire;
pub mod layout;
pub mod palettes;
pub mod settings;
pub mod types;

pub use engine::{AnimationEngine, AnimationState, Shape};
pub use layout::BeamLayout;
pub use settings::{ColorMode, DisplayMode, FirePalette, Settings};
pub use types::Rgb;
