use crate::codec::le_i16;
use crate::error::Error;
use crate::header::Header;
use alloc::vec;
use alloc::vec::Vec;

/// One time slice of audio, one value per channel: `[ch0, ch1, ...]`
pub type Frame = Vec<i32>;

/// Decode the frame at `index` from an interleaved sample payload.
///
/// 8 bit samples are read as unsigned bytes, 16 bit samples as signed little
/// endian words. Any other bit depth leaves every channel at zero.
pub fn decode_frame(payload: &[u8], index: usize, header: &Header) -> Result<Frame, Error> {
    let channels = header.num_channels as usize;
    let mut frame = vec![0; channels];

    for (channel, value) in frame.iter_mut().enumerate() {
        let sample = index * channels + channel;

        *value = match header.bits_per_sample {
            8 => payload
                .get(sample)
                .map(|&b| b as i32)
                .ok_or(Error::Truncated {
                    needed: sample + 1,
                    available: payload.len(),
                })?,
            16 => le_i16(payload, 2 * sample)? as i32,
            _ => 0,
        };
    }

    Ok(frame)
}

/// Decode the first `count` frames of `payload`
pub fn decode_frames(payload: &[u8], count: usize, header: &Header) -> Result<Vec<Frame>, Error> {
    (0..count)
        .map(|index| decode_frame(payload, index, header))
        .collect()
}

/// Sample data kept at the bit depth it was stored with, indexed by frame then channel
#[derive(Debug, Clone, PartialEq)]
pub enum Samples {
    /// 8 bit unsigned samples
    BitDepth8(Vec<Vec<u8>>),
    /// 16 bit signed samples
    BitDepth16(Vec<Vec<i16>>),
}

impl Samples {
    /// Narrow decoded frames to their native width.
    ///
    /// Returns `None` for bit depths that have no native representation.
    pub(crate) fn from_frames(frames: &[Frame], bits_per_sample: u16) -> Option<Self> {
        match bits_per_sample {
            8 => Some(Samples::BitDepth8(
                frames
                    .iter()
                    .map(|f| f.iter().map(|&v| v as u8).collect())
                    .collect(),
            )),
            16 => Some(Samples::BitDepth16(
                frames
                    .iter()
                    .map(|f| f.iter().map(|&v| v as i16).collect())
                    .collect(),
            )),
            _ => None,
        }
    }

    /// Number of frames
    pub fn len(&self) -> usize {
        match self {
            Samples::BitDepth8(frames) => frames.len(),
            Samples::BitDepth16(frames) => frames.len(),
        }
    }

    /// Returns `true` when there are no frames
    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Bit depth of the representation
    pub fn bit_depth(&self) -> u16 {
        match self {
            Samples::BitDepth8(_) => 8,
            Samples::BitDepth16(_) => 16,
        }
    }
}
