use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use rodio::Source;
use std::f32::consts::TAU;
use std::time::Duration;

const SAMPLE_RATE: u32 = 44100;

/// Soft rain generator.
/// High-band hiss from split white noise, with sparse decaying droplet
/// bursts and a slow swell so the rain breathes.
pub struct SoftRain {
    rng: StdRng,
    // One-pole lowpass state; the residual above it is the hiss band.
    low_state: f32,
    droplet_energy: f32,
    swell_phase: f32,
}

impl SoftRain {
    pub fn new() -> Self {
        Self {
            rng: StdRng::from_entropy(),
            low_state: 0.0,
            droplet_energy: 0.0,
            swell_phase: 0.0,
        }
    }
}

impl Iterator for SoftRain {
    type Item = f32;

    fn next(&mut self) -> Option<Self::Item> {
        let white: f32 = self.rng.gen_range(-1.0..1.0);

        // Split the spectrum: keep what the lowpass rejects.
        self.low_state += 0.12 * (white - self.low_state);
        let hiss = white - self.low_state;

        // Roughly twenty droplets per second, each dying out quickly.
        if self.rng.gen_ratio(1, 2205) {
            self.droplet_energy = self.rng.gen_range(0.4..1.0);
        }
        self.droplet_energy *= 0.995;
        let droplet = self.droplet_energy * self.rng.gen_range(-1.0..1.0);

        // ~0.1 Hz swell.
        self.swell_phase += TAU * 0.1 / SAMPLE_RATE as f32;
        if self.swell_phase > TAU {
            self.swell_phase -= TAU;
        }
        let swell = 0.85 + 0.15 * self.swell_phase.sin();

        Some((hiss * 0.6 + droplet * 0.5) * swell * 0.35)
    }
}

impl Source for SoftRain {
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
