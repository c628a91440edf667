use crate::audio::systems::DroneSystem;
use crate::audio::AudioSystem;
use cpal::{traits::*, Sample};
use std::sync::{Arc, Mutex};
use thiserror::Error;
use tracing::{debug, error};

#[derive(Debug, Error)]
pub enum AudioOutputError {
    #[error("no output device available")]
    NoDevice,

    #[error("unsupported sample format {0:?}")]
    UnsupportedFormat(cpal::SampleFormat),

    #[error(transparent)]
    DefaultConfig(#[from] cpal::DefaultStreamConfigError),

    #[error(transparent)]
    Build(#[from] cpal::BuildStreamError),

    #[error(transparent)]
    Play(#[from] cpal::PlayStreamError),
}

/// Plays a drone system through the default output device until dropped
pub struct AudioOutput {
    _stream: cpal::Stream,
}

impl AudioOutput {
    pub fn new(system: Arc<Mutex<DroneSystem>>) -> Result<Self, AudioOutputError> {
        let host = cpal::default_host();
        let device = host.default_output_device().ok_or(AudioOutputError::NoDevice)?;

        let config = device.default_output_config()?;
        let sample_rate = config.sample_rate().0 as f32;
        if let Ok(mut system) = system.lock() {
            system.set_sample_rate(sample_rate);
        }
        debug!(sample_rate, channels = config.channels(), "opening audio output");

        let stream = match config.sample_format() {
            cpal::SampleFormat::F32 => Self::run::<f32>(&device, &config.into(), system)?,
            cpal::SampleFormat::I16 => Self::run::<i16>(&device, &config.into(), system)?,
            cpal::SampleFormat::U16 => Self::run::<u16>(&device, &config.into(), system)?,
            format => return Err(AudioOutputError::UnsupportedFormat(format)),
        };

        stream.play()?;

        Ok(AudioOutput { _stream: stream })
    }

    fn run<T>(
        device: &cpal::Device,
        config: &cpal::StreamConfig,
        system: Arc<Mutex<DroneSystem>>,
    ) -> Result<cpal::Stream, cpal::BuildStreamError>
    where
        T: Sample + cpal::SizedSample + cpal::FromSample<f32>,
    {
        let channels = config.channels as usize;
        let mut scratch: Vec<f32> = Vec::new();

        let stream = device.build_output_stream(
            config,
            move |data: &mut [T], _: &cpal::OutputCallbackInfo| {
                // Grows once to the device's buffer size, then reused
                scratch.resize(data.len(), 0.0);

                if let Ok(mut system) = system.try_lock() {
                    system.generate(&mut scratch, channels);
                } else {
                    scratch.fill(0.0);
                }

                for (out, sample) in data.iter_mut().zip(scratch.iter()) {
                    // Limiting and NaN protection
                    let sample = if sample.is_finite() {
                        sample.clamp(-0.95, 0.95)
                    } else {
                        0.0
                    };
                    *out = T::from_sample(sample);
                }
            },
            |err| error!("audio stream error: {}", err),
            None,
        )?;

        Ok(stream)
    }
}
