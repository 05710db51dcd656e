use crate::codec::{le_u16, le_u32};
use crate::error::Error;
use alloc::vec::Vec;
use core::fmt;

/// Byte offsets of the fixed header fields, relative to the start of the buffer.
///
/// for more information see [`here`]
///
/// [`here`]: http://soundfile.sapp.org/doc/WaveFormat/
pub mod offset {
    /// `RIFF` marker
    pub const RIFF_MARKER: usize = 0;
    /// RIFF chunk size
    pub const RIFF_SIZE: usize = 4;
    /// `WAVE` marker
    pub const WAVE_MARKER: usize = 8;
    /// `fmt ` marker
    pub const FMT_MARKER: usize = 12;
    /// fmt chunk size
    pub const FMT_SIZE: usize = 16;
    /// audio format tag
    pub const AUDIO_FORMAT: usize = 20;
    /// number of channels
    pub const NUM_CHANNELS: usize = 22;
    /// sample rate
    pub const SAMPLE_RATE: usize = 24;
    /// byte rate
    pub const BYTE_RATE: usize = 28;
    /// block alignment
    pub const BLOCK_ALIGN: usize = 32;
    /// bits per sample
    pub const BITS_PER_SAMPLE: usize = 34;
    /// `data` marker in a canonical file with no chunks between `fmt ` and `data`
    pub const CANONICAL_DATA_MARKER: usize = 36;
}

/// Length of the canonical header written by [`Header::to_bytes`]
pub const CANONICAL_HEADER_LEN: usize = offset::CANONICAL_DATA_MARKER + 8;

/// Audio format tag for uncompressed PCM
pub const FORMAT_PCM: u16 = 1;

/// The four markers a container must carry
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Marker {
    /// `RIFF`, start of the file
    Riff,
    /// `WAVE`, RIFF form type
    Wave,
    /// `fmt `, format sub-chunk
    Fmt,
    /// `data`, sample sub-chunk
    Data,
}

impl Marker {
    /// The four ASCII bytes of the marker
    pub const fn tag(self) -> &'static [u8; 4] {
        match self {
            Marker::Riff => b"RIFF",
            Marker::Wave => b"WAVE",
            Marker::Fmt => b"fmt ",
            Marker::Data => b"data",
        }
    }
}

impl fmt::Display for Marker {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        // Every tag is ASCII
        let tag = self.tag();
        for &b in tag {
            write!(f, "{}", b as char)?;
        }
        Ok(())
    }
}

/// Format metadata of a WAV file plus the layout of its sample payload
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Header {
    /// audio format tag, `1` for PCM
    pub audio_format: u16,
    /// number of audio channels in the sample data, channels are interleaved
    pub num_channels: u16,
    /// sample rate, typical values are `44_100` or `48_000`
    pub sample_rate: u32,
    /// bytes per second of audio
    pub byte_rate: u32,
    /// bytes per frame, `num_channels * bits_per_sample / 8`
    pub block_align: u16,
    /// bit depth of each sample, only `8` and `16` are decoded
    pub bits_per_sample: u16,
    /// size of the `data` sub-chunk in bytes
    pub chunk_size: u32,
    /// number of whole frames in the `data` sub-chunk
    pub num_frames: usize,
    /// offset of the `data` marker in the buffer the header was parsed from
    pub data_marker_offset: usize,
}

fn expect_marker(bytes: &[u8], at: usize, marker: Marker) -> Result<(), Error> {
    match bytes.get(at..at.saturating_add(4)) {
        Some(tag) if tag == marker.tag() => Ok(()),
        Some(_) => Err(Error::MissingMarker(marker)),
        None => Err(Error::Truncated {
            needed: at.saturating_add(4),
            available: bytes.len(),
        }),
    }
}

impl Header {
    /// Check the four mandatory markers, with `data` expected at `data_marker_offset`.
    pub fn validate(bytes: &[u8], data_marker_offset: usize) -> Result<(), Error> {
        expect_marker(bytes, offset::RIFF_MARKER, Marker::Riff)?;
        expect_marker(bytes, offset::WAVE_MARKER, Marker::Wave)?;
        expect_marker(bytes, offset::FMT_MARKER, Marker::Fmt)?;
        expect_marker(bytes, data_marker_offset, Marker::Data)
    }

    /// Validate `bytes` and decode the header fields.
    ///
    /// The fmt fields are read at their fixed offsets, the `data` chunk size from
    /// the four bytes following the marker at `data_marker_offset`.
    ///
    /// ```
    /// use wavdec::Header;
    ///
    /// let bytes = [
    ///     0x52, 0x49, 0x46, 0x46, 0x28, 0x00, 0x00, 0x00, // RIFF + size
    ///     0x57, 0x41, 0x56, 0x45, 0x66, 0x6d, 0x74, 0x20, // WAVE fmt_
    ///     0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, // fmt size, PCM, mono
    ///     0x44, 0xac, 0x00, 0x00, 0x88, 0x58, 0x01, 0x00, // 44.1kHz, byte rate
    ///     0x02, 0x00, 0x10, 0x00, // block align, bits per sample
    ///     0x64, 0x61, 0x74, 0x61, 0x04, 0x00, 0x00, 0x00, // data + size
    /// ];
    ///
    /// let header = Header::parse(&bytes, 36).unwrap();
    ///
    /// assert_eq!(header.sample_rate, 44_100);
    /// assert_eq!(header.num_frames, 2);
    /// ```
    pub fn parse(bytes: &[u8], data_marker_offset: usize) -> Result<Self, Error> {
        Self::validate(bytes, data_marker_offset)?;

        let audio_format = le_u16(bytes, offset::AUDIO_FORMAT)?;
        let num_channels = le_u16(bytes, offset::NUM_CHANNELS)?;
        let sample_rate = le_u32(bytes, offset::SAMPLE_RATE)?;
        let byte_rate = le_u32(bytes, offset::BYTE_RATE)?;
        let block_align = le_u16(bytes, offset::BLOCK_ALIGN)?;
        let bits_per_sample = le_u16(bytes, offset::BITS_PER_SAMPLE)?;
        let chunk_size = le_u32(bytes, data_marker_offset + 4)?;

        if block_align == 0 {
            return Err(Error::ZeroBlockAlign);
        }

        // Floor division, a trailing partial frame is ignored
        let num_frames = chunk_size as usize / block_align as usize;

        Ok(Header {
            audio_format,
            num_channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            chunk_size,
            num_frames,
            data_marker_offset,
        })
    }

    /// Header for uncompressed PCM audio holding `chunk_size` bytes of samples.
    ///
    /// Byte rate and block alignment are derived from the other fields and the
    /// `data` marker is placed right after the fmt chunk.
    pub fn pcm(sample_rate: u32, num_channels: u16, bits_per_sample: u16, chunk_size: u32) -> Self {
        let block_align = (num_channels as u32 * bits_per_sample as u32 / 8) as u16;
        let byte_rate = sample_rate.saturating_mul(block_align as u32);
        let num_frames = match block_align {
            0 => 0,
            ba => chunk_size as usize / ba as usize,
        };

        Header {
            audio_format: FORMAT_PCM,
            num_channels,
            sample_rate,
            byte_rate,
            block_align,
            bits_per_sample,
            chunk_size,
            num_frames,
            data_marker_offset: offset::CANONICAL_DATA_MARKER,
        }
    }

    /// Bytes used by one channel's sample value
    pub fn bytes_per_sample(&self) -> usize {
        self.bits_per_sample as usize / 8
    }

    /// Serialize as a canonical 44 byte header: RIFF, fmt and the `data` chunk
    /// header, ready to be followed by `chunk_size` bytes of samples.
    pub fn to_bytes(&self) -> Vec<u8> {
        let mut bytes = Vec::with_capacity(CANONICAL_HEADER_LEN);

        // Subtract 8 for the initial two words
        let riff_size = (CANONICAL_HEADER_LEN as u32 - 8).saturating_add(self.chunk_size);

        bytes.extend_from_slice(Marker::Riff.tag());
        bytes.extend_from_slice(&riff_size.to_le_bytes());
        bytes.extend_from_slice(Marker::Wave.tag());
        bytes.extend_from_slice(Marker::Fmt.tag());
        bytes.extend_from_slice(&16u32.to_le_bytes()); // fmt chunk size
        bytes.extend_from_slice(&self.audio_format.to_le_bytes());
        bytes.extend_from_slice(&self.num_channels.to_le_bytes());
        bytes.extend_from_slice(&self.sample_rate.to_le_bytes());
        bytes.extend_from_slice(&self.byte_rate.to_le_bytes());
        bytes.extend_from_slice(&self.block_align.to_le_bytes());
        bytes.extend_from_slice(&self.bits_per_sample.to_le_bytes());
        bytes.extend_from_slice(Marker::Data.tag());
        bytes.extend_from_slice(&self.chunk_size.to_le_bytes());

        bytes
    }
}
