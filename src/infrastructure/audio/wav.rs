use super::AssemblyError;
use crate::domain::narration::AudioFragment;
use hound::{SampleFormat, WavReader, WavSpec, WavWriter};
use std::io::Cursor;
use std::path::Path;

pub const CHANNELS: u16 = 1;
pub const BITS_PER_SAMPLE: u16 = 16;

pub fn wav_spec(sample_rate_hz: u32) -> WavSpec {
    WavSpec {
        channels: CHANNELS,
        sample_rate: sample_rate_hz,
        bits_per_sample: BITS_PER_SAMPLE,
        sample_format: SampleFormat::Int,
    }
}

/// Raw little-endian samples of one fragment.
///
/// Some providers wrap LINEAR16 output in a RIFF header; it is dropped so
/// that only sample data reaches the concatenated buffer.
pub fn fragment_samples(fragment: &AudioFragment) -> Result<Vec<i16>, AssemblyError> {
    if fragment.bytes.starts_with(b"RIFF") {
        return wrapped_samples(fragment);
    }

    if fragment.bytes.len() % 2 != 0 {
        return Err(AssemblyError::PartialSample {
            chunk: fragment.chunk_index + 1,
            len: fragment.bytes.len(),
        });
    }

    Ok(fragment
        .bytes
        .chunks_exact(2)
        .map(|pair| i16::from_le_bytes([pair[0], pair[1]]))
        .collect())
}

fn wrapped_samples(fragment: &AudioFragment) -> Result<Vec<i16>, AssemblyError> {
    let reader = WavReader::new(Cursor::new(&fragment.bytes))?;
    let spec = reader.spec();
    if spec.channels != CHANNELS
        || spec.bits_per_sample != BITS_PER_SAMPLE
        || spec.sample_format != SampleFormat::Int
        || spec.sample_rate != fragment.sample_rate_hz
    {
        return Err(AssemblyError::UnexpectedWavFormat {
            chunk: fragment.chunk_index + 1,
            channels: spec.channels,
            bits_per_sample: spec.bits_per_sample,
            sample_rate: spec.sample_rate,
        });
    }

    reader
        .into_samples::<i16>()
        .collect::<Result<Vec<_>, _>>()
        .map_err(AssemblyError::from)
}

/// Write mono 16-bit samples to a WAV file, returning the frame count
pub fn write_wav(path: &Path, samples: &[i16], sample_rate_hz: u32) -> Result<u64, AssemblyError> {
    let mut writer = WavWriter::create(path, wav_spec(sample_rate_hz))?;
    {
        let mut sample_writer = writer.get_i16_writer(samples.len() as u32);
        for &sample in samples {
            sample_writer.write_sample(sample);
        }
        sample_writer.flush()?;
    }
    writer.finalize()?;

    Ok(samples.len() as u64 / CHANNELS as u64)
}
