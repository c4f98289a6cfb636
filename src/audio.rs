use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{FromSample, Sample, SizedSample};
use crossbeam_channel::{Receiver, Sender};
use ringbuf::{HeapProducer, HeapRb};
use tracing::warn;

use crate::processing::{spawn_processing_thread, ProcessingConfig};
use crate::types::{FrameUpdate, SessionCommand, SessionSummary};

pub(crate) struct AudioFrontend {
    pub(crate) update_rx: Receiver<FrameUpdate>,
    pub(crate) summary_rx: Receiver<SessionSummary>,
    pub(crate) cmd_tx: Sender<SessionCommand>,
    pub(crate) device_name: String,
    pub(crate) sample_rate: u32,
    pub(crate) stream: cpal::Stream,
}

/// Open the default input device, wire capture → ring buffer → processing
/// thread, and hand the result channels to the caller. The stream handle
/// must stay alive for capture to continue.
pub(crate) fn setup_audio() -> anyhow::Result<AudioFrontend> {
    let host = cpal::default_host();
    let device = host
        .default_input_device()
        .ok_or_else(|| anyhow::anyhow!("no input device available"))?;
    let device_name = device.name().unwrap_or_else(|_| "unknown".to_string());
    let config = choose_input_config(&device, 48_000)?;
    let sample_rate = config.sample_rate().0;
    let channels = config.channels() as usize;

    // two seconds of headroom between the capture callback and processing
    let rb = HeapRb::<f32>::new((sample_rate as usize).saturating_mul(2));
    let (producer, consumer) = rb.split();

    let (update_tx, update_rx) = crossbeam_channel::unbounded();
    let (summary_tx, summary_rx) = crossbeam_channel::unbounded();
    let (cmd_tx, cmd_rx) = crossbeam_channel::unbounded();

    let stream_config: cpal::StreamConfig = config.clone().into();
    let stream = match config.sample_format() {
        cpal::SampleFormat::F32 => build_stream::<f32>(&device, &stream_config, channels, producer),
        cpal::SampleFormat::I16 => build_stream::<i16>(&device, &stream_config, channels, producer),
        cpal::SampleFormat::U16 => build_stream::<u16>(&device, &stream_config, channels, producer),
        format => Err(anyhow::anyhow!("unsupported sample format {format}")),
    }?;

    spawn_processing_thread(
        consumer,
        cmd_rx,
        update_tx,
        summary_tx,
        ProcessingConfig::new(sample_rate),
    );

    stream.play()?;
    Ok(AudioFrontend {
        update_rx,
        summary_rx,
        cmd_tx,
        device_name,
        sample_rate,
        stream,
    })
}

/// Pick the input config closest to `target_rate`, preferring f32 samples.
fn choose_input_config(
    device: &cpal::Device,
    target_rate: u32,
) -> anyhow::Result<cpal::SupportedStreamConfig> {
    device
        .supported_input_configs()?
        .map(|range| {
            let rate = target_rate.clamp(range.min_sample_rate().0, range.max_sample_rate().0);
            range.with_sample_rate(cpal::SampleRate(rate))
        })
        .max_by_key(|cfg| {
            let mut score = 0;
            if cfg.sample_rate().0 == target_rate {
                score += 2;
            }
            if cfg.sample_format() == cpal::SampleFormat::F32 {
                score += 1;
            }
            score
        })
        .ok_or_else(|| anyhow::anyhow!("no supported input config"))
}

fn build_stream<T>(
    device: &cpal::Device,
    config: &cpal::StreamConfig,
    channels: usize,
    mut producer: HeapProducer<f32>,
) -> anyhow::Result<cpal::Stream>
where
    T: Sample + SizedSample,
    f32: FromSample<T>,
{
    let stream = device.build_input_stream(
        config,
        move |data: &[T], _| {
            // average all channels down to mono
            for frame in data.chunks(channels) {
                let sum: f32 = frame.iter().map(|s| s.to_sample::<f32>()).sum();
                let _ = producer.push(sum / frame.len() as f32);
            }
        },
        |err| warn!("input stream error: {err}"),
        None,
    )?;
    Ok(stream)
}
