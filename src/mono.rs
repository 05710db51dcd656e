//! Downmixing to a single channel and writing mono 16 bit files.

use crate::frame::Frame;
use crate::header::Header;
use alloc::vec::Vec;

#[cfg(feature = "io")]
use crate::error::IoError;

/// Average every frame down to one value.
///
/// Mono input is passed through unchanged. For more channels the mean of all
/// channel values is taken, which for stereo is `(L + R) / 2`.
pub fn downmix(frames: &[Frame], num_channels: u16) -> Vec<f64> {
    frames
        .iter()
        .map(|frame| match (num_channels, frame.as_slice()) {
            (1, [value, ..]) => *value as f64,
            (_, []) => 0.0,
            (_, values) => {
                let sum: i64 = values.iter().map(|&v| v as i64).sum();
                sum as f64 / values.len() as f64
            }
        })
        .collect()
}

/// Most samples a single mono 16 bit file can hold, the RIFF size field is 32 bits
pub const MAX_MONO_SAMPLES: usize = (u32::MAX as usize - 36) / 2;

/// Build a complete mono 16 bit PCM file from `samples`.
///
/// Each sample is truncated toward zero and its low 16 bits are written, so
/// values outside the `i16` range wrap around. Samples past
/// [`MAX_MONO_SAMPLES`] are dropped.
///
/// ```
/// use wavdec::{mono, Wav};
///
/// let bytes = mono::encode_mono(&[100.7, -100.7], 44_100);
/// let wav = Wav::from_bytes(&bytes).unwrap();
///
/// assert_eq!(bytes.len(), 48);
/// assert_eq!(wav.frames(), &[vec![100], vec![-100]]);
/// ```
pub fn encode_mono(samples: &[f64], sample_rate: u32) -> Vec<u8> {
    let samples = &samples[..samples.len().min(MAX_MONO_SAMPLES)];
    let chunk_size = (samples.len() * 2) as u32;
    let mut bytes = Header::pcm(sample_rate, 1, 16, chunk_size).to_bytes();

    for &sample in samples {
        bytes.extend_from_slice(&((sample as i64) as u16).to_le_bytes());
    }

    bytes
}

/// Write a mono 16 bit PCM file holding `samples` to `sink`
#[cfg(feature = "io")]
pub fn write_mono<W: embedded_io::Write>(
    sink: &mut W,
    samples: &[f64],
    sample_rate: u32,
) -> Result<(), IoError<W::Error>> {
    let bytes = encode_mono(samples, sample_rate);

    log::debug!(
        "writing mono wav: {} sample(s), {} Hz, {} bytes",
        samples.len(),
        sample_rate,
        bytes.len()
    );

    sink.write_all(&bytes).map_err(IoError::Stream)?;
    sink.flush().map_err(IoError::Stream)
}

/// Create the file at `path` and write a mono 16 bit PCM file holding `samples` to it
#[cfg(feature = "std")]
pub fn write_mono_file(
    path: impl AsRef<std::path::Path>,
    samples: &[f64],
    sample_rate: u32,
) -> Result<(), IoError<std::io::Error>> {
    use std::io::Write;

    let mut file = std::fs::File::create(path).map_err(IoError::Stream)?;
    file.write_all(&encode_mono(samples, sample_rate))
        .map_err(IoError::Stream)?;
    file.flush().map_err(IoError::Stream)
}
