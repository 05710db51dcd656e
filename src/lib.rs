//! Basic `no_std` library for decoding RIFF/WAVE files.
//!
//! 8 bit unsigned and 16 bit signed PCM samples are decoded into frames, one
//! `i32` value per channel. A file can be decoded as a whole from memory with
//! [`Wav`], or pulled from a reader in batches of frames with [`StreamingWav`].
//!
//! Decoding a whole file:
//! ```
//! use wavdec::{mono, Wav};
//!
//! let bytes = mono::encode_mono(&[100.0, -100.0], 44_100);
//! let wav = Wav::from_bytes(&bytes).unwrap();
//!
//! assert_eq!(wav.header().num_channels, 1);
//! assert_eq!(wav.header().bits_per_sample, 16);
//! assert_eq!(wav.header().sample_rate, 44_100);
//! assert_eq!(wav.frames(), &[vec![100], vec![-100]]);
//! assert_eq!(wav.samples_i16(), Some(&[vec![100], vec![-100]][..]));
//! ```
//!
//! Pulling frames from a reader (requires the "io" feature):
//! ```
//! # #[cfg(feature = "io")]
//! # fn main() {
//! use wavdec::{Header, StreamingWav};
//!
//! let bytes = wavdec::mono::encode_mono(&[1.0, 2.0, 3.0], 8_000);
//! let header = Header::parse(&bytes, 36).unwrap();
//! let mut wav = StreamingWav::from_header(header, &bytes[44..]);
//!
//! assert_eq!(wav.read_frames(2).unwrap(), vec![vec![1], vec![2]]);
//! assert_eq!(wav.read_frames(2).unwrap(), vec![vec![3]]);
//! # }
//! # #[cfg(not(feature = "io"))]
//! # fn main() {}
//! ```
//!
//! Writing a mono file:
//! ```
//! # #[cfg(feature = "std")]
//! # fn main() {
//! let path = std::env::temp_dir().join("wavdec_doc_mono.wav");
//! wavdec::mono::write_mono_file(&path, &[0.0; 480], 48_000).unwrap();
//! # }
//! # #[cfg(not(feature = "std"))]
//! # fn main() {}
//! ```

#![cfg_attr(all(not(test), not(feature = "std")), no_std)]
#![warn(missing_docs)]

extern crate alloc;

pub mod codec;
mod error;
mod frame;
mod header;
pub mod locate;
pub mod mono;
mod wav;

pub use error::Error;
pub use frame::{decode_frame, decode_frames, Frame, Samples};
pub use header::{offset, Header, Marker, CANONICAL_HEADER_LEN, FORMAT_PCM};
pub use wav::Wav;

#[cfg(feature = "io")]
mod stream;
#[cfg(feature = "io")]
pub use error::IoError;
#[cfg(feature = "io")]
pub use stream::{asynch, StreamingWav, MAX_BATCH_BYTES};
#[cfg(feature = "std")]
pub use stream::File;
