pub mod oscillators;
pub mod systems;

pub const PI: f32 = std::f32::consts::PI;
pub const TWO_PI: f32 = 2.0 * PI;

// Basic trait for audio generators that produce a single sample output
pub trait AudioGenerator {
    fn next_sample(&mut self) -> f32;
    fn set_sample_rate(&mut self, sample_rate: f32);
}

/// A complete instrument driven one audio block at a time
pub trait AudioSystem: Send {
    /// Render one block into an interleaved buffer with `channels` samples per frame
    fn generate(&mut self, data: &mut [f32], channels: usize);

    /// Set the sample rate for the entire system
    fn set_sample_rate(&mut self, sample_rate: f32);
}
