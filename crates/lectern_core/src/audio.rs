//! crates/lectern_core/src/audio.rs
//!
//! Waveform assembly and WAV framing.
//!
//! Every synthesis adapter produces mono 16-bit waveforms at the fixed
//! [`SAMPLE_RATE`]; assembly concatenates them strictly in chunk order with
//! no resampling and no gain normalization. An audible seam between chunks
//! is a known property of this scheme and is intentionally not hidden here.

use std::io::Cursor;

use hound::{SampleFormat, WavReader, WavSpec, WavWriter};

use crate::ports::{PortError, PortResult};

/// The fixed output sample rate shared by every synthesis adapter.
pub const SAMPLE_RATE: u32 = 24_000;

/// A mono 16-bit waveform at [`SAMPLE_RATE`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Waveform {
    pub samples: Vec<i16>,
}

impl Waveform {
    pub fn new(samples: Vec<i16>) -> Self {
        Self { samples }
    }

    pub fn len(&self) -> usize {
        self.samples.len()
    }

    pub fn is_empty(&self) -> bool {
        self.samples.is_empty()
    }
}

/// Concatenates waveforms along the time axis, preserving input order.
///
/// The output sample count is exactly the sum of the input sample counts.
pub fn concat(waveforms: &[Waveform]) -> Waveform {
    let total: usize = waveforms.iter().map(Waveform::len).sum();
    let mut samples = Vec::with_capacity(total);
    for waveform in waveforms {
        samples.extend_from_slice(&waveform.samples);
    }
    Waveform { samples }
}

/// Encodes a waveform into a WAV byte stream at [`SAMPLE_RATE`].
pub fn encode_wav(waveform: &Waveform) -> PortResult<Vec<u8>> {
    let mut cursor = Cursor::new(Vec::new());

    let spec = WavSpec {
        channels: 1,
        sample_rate: SAMPLE_RATE,
        bits_per_sample: 16,
        sample_format: SampleFormat::Int,
    };

    let mut writer = WavWriter::new(&mut cursor, spec)
        .map_err(|e| PortError::Processing(format!("failed to open WAV writer: {e}")))?;
    for &sample in &waveform.samples {
        writer
            .write_sample(sample)
            .map_err(|e| PortError::Processing(format!("failed to write WAV sample: {e}")))?;
    }
    writer
        .finalize()
        .map_err(|e| PortError::Processing(format!("failed to finalize WAV: {e}")))?;

    Ok(cursor.into_inner())
}

/// Decodes a WAV byte stream into a mono waveform.
///
/// Multi-channel input is reduced by taking the first channel. The stream
/// must carry audio at [`SAMPLE_RATE`]; a mismatch is a processing error
/// because the pipeline never resamples.
pub fn decode_wav(bytes: &[u8]) -> PortResult<Waveform> {
    let mut reader = WavReader::new(Cursor::new(bytes))
        .map_err(|e| PortError::Processing(format!("failed to parse WAV stream: {e}")))?;
    let spec = reader.spec();

    if spec.sample_rate != SAMPLE_RATE {
        return Err(PortError::Processing(format!(
            "unexpected sample rate {} (engine contract is {})",
            spec.sample_rate, SAMPLE_RATE
        )));
    }

    let channels = spec.channels.max(1) as usize;
    let samples: Vec<i16> = match (spec.sample_format, spec.bits_per_sample) {
        (SampleFormat::Int, 16) => reader
            .samples::<i16>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PortError::Processing(format!("failed to read WAV samples: {e}")))?,
        (SampleFormat::Float, 32) => reader
            .samples::<f32>()
            .collect::<Result<Vec<_>, _>>()
            .map_err(|e| PortError::Processing(format!("failed to read WAV samples: {e}")))?
            .into_iter()
            .map(|s| (s.clamp(-1.0, 1.0) * i16::MAX as f32) as i16)
            .collect(),
        (format, bits) => {
            return Err(PortError::Processing(format!(
                "unsupported WAV encoding: {format:?} at {bits} bits"
            )))
        }
    };

    let mono = samples.into_iter().step_by(channels).collect();
    Ok(Waveform { samples: mono })
}
