use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;
use std::f32::consts::TAU;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;

/// Ocean wave generator.
/// Low-passed brown noise under a slow swell envelope; each wave builds up
/// and washes out over a period of about twelve seconds.
pub struct OceanWaves {
    rng: StdRng,
    brown: f32,
    low_state: f32,
    swell_phase: f32,
}

impl OceanWaves {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            brown: 0.0,
            low_state: 0.0,
            swell_phase: 0.0,
        }
    }
}

impl Iterator for OceanWaves {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let white: f32 = self.rng.gen_range(-1.0..1.0);

        // Brown noise with a gentle leak to keep the DC offset from building.
        self.brown = (self.brown + white * 0.015).clamp(-1.0, 1.0) * 0.9995;

        // Deep rumble only.
        self.low_state += 0.05 * (self.brown - self.low_state);

        // One wave roughly every twelve seconds; squaring sharpens the crest.
        self.swell_phase += TAU * 0.08 / SAMPLE_RATE as f32;
        if self.swell_phase > TAU {
            self.swell_phase -= TAU;
        }
        let crest = 0.5 + 0.5 * self.swell_phase.sin();
        let swell = 0.25 + 0.75 * crest * crest;

        Some(self.low_state * swell * 0.9)
    }
}

impl Source for OceanWaves {
    fn current_frame_len(&self) -> Option<usize> {
        None
    }

    fn channels(&self) -> u16 {
        1
    }

    fn sample_rate(&self) -> u32 {
        SAMPLE_RATE
    }

    fn total_duration(&self) -> Option<Duration> {
        None
    }
}
