use crate::error::Error;
use crate::frame::{decode_frames, Frame, Samples};
use crate::header::Header;
use crate::locate::find_data_marker;
use crate::mono::downmix;
use alloc::vec::Vec;

#[cfg(feature = "io")]
use crate::error::IoError;

/// Fully decoded WAV file
///
/// Samples are available as `i32` values for every bit depth, and additionally
/// at their native width for 8 and 16 bit files. Both views are built once from
/// the same decode and never change afterwards.
#[derive(Debug, Clone, PartialEq)]
pub struct Wav {
    header: Header,
    frames: Vec<Frame>,
    native: Option<Samples>,
}

impl Wav {
    /// Create new [`Wav`] instance from the bytes of a complete file
    ///
    /// ```
    /// use wavdec::Wav;
    ///
    /// let bytes = [
    ///     0x52, 0x49, 0x46, 0x46, 0x2c, 0x00, 0x00, 0x00, // RIFF + size
    ///     0x57, 0x41, 0x56, 0x45, 0x66, 0x6d, 0x74, 0x20, // WAVE fmt_
    ///     0x10, 0x00, 0x00, 0x00, 0x01, 0x00, 0x01, 0x00, // fmt size, PCM, mono
    ///     0x44, 0xac, 0x00, 0x00, 0x88, 0x58, 0x01, 0x00, // 44.1kHz, byte rate
    ///     0x02, 0x00, 0x10, 0x00, // block align, bits per sample
    ///     0x64, 0x61, 0x74, 0x61, 0x04, 0x00, 0x00, 0x00, // data + size
    ///     0x64, 0x00, 0x9c, 0xff, // 100, -100
    /// ];
    ///
    /// let wav = Wav::from_bytes(&bytes).unwrap();
    ///
    /// assert_eq!(wav.header().num_channels, 1);
    /// assert_eq!(wav.header().num_frames, 2);
    /// assert_eq!(wav.frames(), &[vec![100], vec![-100]]);
    /// ```
    pub fn from_bytes(bytes: &[u8]) -> Result<Self, Error> {
        let marker = find_data_marker(bytes).ok_or(Error::NoDataMarker)?;
        let header = Header::parse(bytes, marker)?;

        log::debug!(
            "wav header: {} channel(s), {} Hz, {} bit, {} frame(s), data at {}",
            header.num_channels,
            header.sample_rate,
            header.bits_per_sample,
            header.num_frames,
            marker
        );

        // Skip the marker and the chunk size
        let truncated = Error::Truncated {
            needed: usize::MAX,
            available: bytes.len(),
        };
        let start = marker.checked_add(8).ok_or(truncated)?;
        let end = start
            .checked_add(header.chunk_size as usize)
            .ok_or(truncated)?;
        let payload = bytes.get(start..end).ok_or(Error::Truncated {
            needed: end,
            available: bytes.len(),
        })?;

        let frames = decode_frames(payload, header.num_frames, &header)?;
        let native = Samples::from_frames(&frames, header.bits_per_sample);

        if native.is_none() {
            log::warn!(
                "unsupported bit depth {}, samples are zero-filled",
                header.bits_per_sample
            );
        }

        Ok(Wav {
            header,
            frames,
            native,
        })
    }

    /// Create a [`Wav`] instance by reading `reader` to the end
    #[cfg(feature = "io")]
    pub fn from_reader<R: embedded_io::Read>(reader: &mut R) -> Result<Self, IoError<R::Error>> {
        let mut bytes = Vec::new();
        loop {
            let mut tmp = [0; 512];
            match reader.read(&mut tmp) {
                Ok(0) => break,
                Ok(n) => bytes.extend_from_slice(&tmp[..n]),
                Err(e) => return Err(IoError::Stream(e)),
            }
        }

        Ok(Self::from_bytes(&bytes)?)
    }

    /// Create a [`Wav`] instance from a file on disk
    #[cfg(feature = "std")]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, IoError<std::io::Error>> {
        let bytes = std::fs::read(path).map_err(IoError::Stream)?;
        Ok(Self::from_bytes(&bytes)?)
    }

    /// Header of the file
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Decoded frames, `[frame][channel]`
    pub fn frames(&self) -> &[Frame] {
        &self.frames
    }

    /// Samples at their native width, `None` for bit depths other than 8 and 16
    pub fn samples(&self) -> Option<&Samples> {
        self.native.as_ref()
    }

    /// 8 bit samples, `[frame][channel]`, if the file is 8 bit
    pub fn samples_u8(&self) -> Option<&[Vec<u8>]> {
        match &self.native {
            Some(Samples::BitDepth8(frames)) => Some(frames),
            _ => None,
        }
    }

    /// 16 bit samples, `[frame][channel]`, if the file is 16 bit
    pub fn samples_i16(&self) -> Option<&[Vec<i16>]> {
        match &self.native {
            Some(Samples::BitDepth16(frames)) => Some(frames),
            _ => None,
        }
    }

    /// Mix all channels down to a single one, one value per frame
    ///
    /// ```
    /// use wavdec::{mono, Wav};
    ///
    /// let wav = Wav::from_bytes(&mono::encode_mono(&[1.0, -3.0], 8_000)).unwrap();
    ///
    /// assert_eq!(wav.to_mono(), vec![1.0, -3.0]);
    /// ```
    pub fn to_mono(&self) -> Vec<f64> {
        downmix(&self.frames, self.header.num_channels)
    }
}
