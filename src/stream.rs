use crate::error::{Error, IoError};
use crate::frame::{decode_frames, Frame};
use crate::header::Header;
use crate::locate::scan_reader;
use alloc::vec;
use alloc::vec::Vec;

/// Fill `buf` from `reader` until it is full or the stream ends.
fn fill<R: embedded_io::Read>(reader: &mut R, buf: &mut [u8]) -> Result<usize, R::Error> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..])? {
            0 => break,
            n => filled += n,
        }
    }
    Ok(filled)
}

/// Largest buffer a single batch read allocates
pub const MAX_BATCH_BYTES: usize = 1 << 20;

/// Bytes to request for `count` frames, at most [`MAX_BATCH_BYTES`] rounded
/// down to whole frames but never less than one frame
fn batch_len(header: &Header, count: usize) -> usize {
    let block_align = header.block_align as usize;
    let max_frames = (MAX_BATCH_BYTES / block_align.max(1)).max(1);
    count.min(max_frames) * block_align
}

/// Decode the frames contained in the `read` bytes at the start of `buf`
fn decode_batch(header: &Header, buf: &[u8], read: usize) -> Result<Vec<Frame>, Error> {
    let block_align = header.block_align;
    if block_align == 0 {
        return Err(Error::ZeroBlockAlign);
    }
    if read % block_align as usize != 0 {
        return Err(Error::MisalignedRead { read, block_align });
    }

    let count = read / block_align as usize;
    log::trace!("decoding {} frame(s) from {} bytes", count, read);

    decode_frames(&buf[..read.min(buf.len())], count, header)
}

/// WAV decoder that pulls frames from a reader in batches
///
/// Only the header is kept, samples are decoded straight from the stream on
/// every call to [`StreamingWav::read_frames`]. The position in the audio is the
/// position of the reader, so a decoder must not be used again after a read
/// error.
pub struct StreamingWav<R> {
    header: Header,
    reader: R,
    bytes_scanned: usize,
}

impl<R> StreamingWav<R>
where
    R: embedded_io::Read,
{
    /// Acquire the header from `reader`.
    ///
    /// The reader is consumed one byte at a time up to and including the first
    /// `data` marker. Then a second block, as long as the scanned prefix plus
    /// eight bytes, is read from the position right after the marker and
    /// validated with the `data` marker expected at its very start.
    ///
    /// The scanned prefix is not kept. A file laid out the usual way, `RIFF`
    /// first and samples after `data`, therefore fails here with
    /// [`Error::MissingMarker`]. When the header is known by other means use
    /// [`StreamingWav::from_header`].
    pub fn from_reader(mut reader: R) -> Result<Self, IoError<R::Error>> {
        let bytes_scanned = scan_reader(&mut reader)
            .map_err(IoError::Stream)?
            .ok_or(Error::NoDataMarker)?;

        let mut block = vec![0; bytes_scanned + 8];
        let read = fill(&mut reader, &mut block).map_err(IoError::Stream)?;
        let header = Header::parse(&block[..read], 0)?;

        log::debug!(
            "stream header: {} channel(s), {} Hz, {} bit, marker ends at {}",
            header.num_channels,
            header.sample_rate,
            header.bits_per_sample,
            bytes_scanned
        );

        Ok(Self {
            header,
            reader,
            bytes_scanned,
        })
    }

    /// Decode frames described by `header` from `reader`, which must be
    /// positioned at the first byte of the sample payload.
    pub fn from_header(header: Header, reader: R) -> Self {
        Self {
            header,
            reader,
            bytes_scanned: 0,
        }
    }

    /// Decode up to `count` frames.
    ///
    /// A single read of `count * block_align` bytes is issued, capped at
    /// [`MAX_BATCH_BYTES`] so a large `count` behaves like a short read. Fewer
    /// frames are returned when the reader delivers less, and none at the end
    /// of the stream. A read that ends inside a frame fails with
    /// [`Error::MisalignedRead`].
    ///
    /// ```
    /// use wavdec::{Header, StreamingWav};
    ///
    /// let header = Header::pcm(44_100, 2, 16, 8);
    /// let payload = [0x01u8, 0x00, 0x02, 0x00, 0x03, 0x00, 0x04, 0x00];
    /// let mut wav = StreamingWav::from_header(header, &payload[..]);
    ///
    /// assert_eq!(wav.read_frames(1).unwrap(), vec![vec![1, 2]]);
    /// assert_eq!(wav.read_frames(8).unwrap(), vec![vec![3, 4]]);
    /// assert!(wav.read_frames(8).unwrap().is_empty());
    /// ```
    pub fn read_frames(&mut self, count: usize) -> Result<Vec<Frame>, IoError<R::Error>> {
        let mut buf = vec![0; batch_len(&self.header, count)];
        let read = self.reader.read(&mut buf).map_err(IoError::Stream)?;

        Ok(decode_batch(&self.header, &buf, read)?)
    }

    /// Header of the stream
    pub fn header(&self) -> &Header {
        &self.header
    }

    /// Bytes consumed while scanning for the `data` marker, zero when built
    /// from a known header
    pub fn bytes_scanned(&self) -> usize {
        self.bytes_scanned
    }

    /// Give the reader back
    pub fn into_inner(self) -> R {
        self.reader
    }
}

#[cfg(feature = "std")]
impl StreamingWav<File> {
    /// Open the file at `path` and acquire its header, see [`StreamingWav::from_reader`]
    pub fn from_file(path: impl AsRef<std::path::Path>) -> Result<Self, IoError<std::io::Error>> {
        let file = File::open(path).map_err(IoError::Stream)?;
        Self::from_reader(file)
    }
}

#[cfg(feature = "std")]
mod file_wrapper {
    use std::fs;
    use std::io::{BufReader, Read};
    use std::path::Path;

    /// Buffered [`std::fs::File`] usable as an [`embedded_io::Read`] source
    pub struct File(pub BufReader<fs::File>);

    impl File {
        /// Open the file at `path` for reading
        pub fn open(path: impl AsRef<Path>) -> std::io::Result<Self> {
            fs::File::open(path).map(|f| File(BufReader::new(f)))
        }
    }

    impl embedded_io::ErrorType for File {
        type Error = std::io::Error;
    }

    impl embedded_io::Read for File {
        fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            self.0.read(buf)
        }
    }
}

#[cfg(feature = "std")]
pub use file_wrapper::File;

//-----------------------------------
// MARK: Async

/// Async version of [`StreamingWav`]
pub mod asynch {
    use super::*;
    use crate::locate::{MarkerScanner, ScanState};

    async fn scan_reader<R: embedded_io_async::Read>(
        reader: &mut R,
    ) -> Result<Option<usize>, R::Error> {
        let mut scanner = MarkerScanner::new();
        let mut byte = [0u8; 1];

        loop {
            match reader.read(&mut byte).await? {
                0 => return Ok(None),
                _ => {
                    if let ScanState::Found(consumed) = scanner.push(byte[0]) {
                        return Ok(Some(consumed));
                    }
                }
            }
        }
    }

    async fn fill<R: embedded_io_async::Read>(
        reader: &mut R,
        buf: &mut [u8],
    ) -> Result<usize, R::Error> {
        let mut filled = 0;
        while filled < buf.len() {
            match reader.read(&mut buf[filled..]).await? {
                0 => break,
                n => filled += n,
            }
        }
        Ok(filled)
    }

    /// Async version of [`StreamingWav`](super::StreamingWav), with the same
    /// acquisition sequence and batch semantics
    pub struct StreamingWav<R> {
        header: Header,
        reader: R,
        bytes_scanned: usize,
    }

    impl<R> StreamingWav<R>
    where
        R: embedded_io_async::Read,
    {
        /// Acquire the header from `reader`, see
        /// [`StreamingWav::from_reader`](super::StreamingWav::from_reader)
        pub async fn from_reader(mut reader: R) -> Result<Self, IoError<R::Error>> {
            let bytes_scanned = scan_reader(&mut reader)
                .await
                .map_err(IoError::Stream)?
                .ok_or(Error::NoDataMarker)?;

            let mut block = vec![0; bytes_scanned + 8];
            let read = fill(&mut reader, &mut block)
                .await
                .map_err(IoError::Stream)?;
            let header = Header::parse(&block[..read], 0)?;

            log::debug!(
                "async stream header: {} channel(s), {} Hz, {} bit, marker ends at {}",
                header.num_channels,
                header.sample_rate,
                header.bits_per_sample,
                bytes_scanned
            );

            Ok(Self {
                header,
                reader,
                bytes_scanned,
            })
        }

        /// Decode frames described by `header` from `reader`, which must be
        /// positioned at the first byte of the sample payload.
        pub fn from_header(header: Header, reader: R) -> Self {
            Self {
                header,
                reader,
                bytes_scanned: 0,
            }
        }

        /// Decode up to `count` frames from a single read, capped at
        /// [`MAX_BATCH_BYTES`]
        pub async fn read_frames(&mut self, count: usize) -> Result<Vec<Frame>, IoError<R::Error>> {
            let mut buf = vec![0; batch_len(&self.header, count)];
            let read = self
                .reader
                .read(&mut buf)
                .await
                .map_err(IoError::Stream)?;

            Ok(decode_batch(&self.header, &buf, read)?)
        }

        /// Header of the stream
        pub fn header(&self) -> &Header {
            &self.header
        }

        /// Bytes consumed while scanning for the `data` marker
        pub fn bytes_scanned(&self) -> usize {
            self.bytes_scanned
        }

        /// Give the reader back
        pub fn into_inner(self) -> R {
            self.reader
        }
    }

    #[cfg(feature = "std")]
    impl StreamingWav<TokioFile> {
        /// Open the file at `path` and acquire its header
        pub async fn from_file(
            path: impl AsRef<std::path::Path>,
        ) -> Result<Self, IoError<std::io::Error>> {
            let file = TokioFile::open(path).await.map_err(IoError::Stream)?;
            Self::from_reader(file).await
        }
    }

    /// Buffered [`tokio::fs::File`] usable as an [`embedded_io_async::Read`] source
    #[cfg(feature = "std")]
    pub struct TokioFile(pub tokio::io::BufReader<tokio::fs::File>);

    #[cfg(feature = "std")]
    impl TokioFile {
        /// Open the file at `path` for reading
        pub async fn open(path: impl AsRef<std::path::Path>) -> std::io::Result<Self> {
            let file = tokio::fs::File::open(path).await?;
            Ok(TokioFile(tokio::io::BufReader::new(file)))
        }
    }

    #[cfg(feature = "std")]
    impl embedded_io_async::ErrorType for TokioFile {
        type Error = std::io::Error;
    }

    #[cfg(feature = "std")]
    impl embedded_io_async::Read for TokioFile {
        async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
            tokio::io::AsyncReadExt::read(&mut self.0, buf).await
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::header::Marker;
    use crate::mono::encode_mono;

    struct FailingReader;

    impl embedded_io::ErrorType for FailingReader {
        type Error = embedded_io::ErrorKind;
    }

    impl embedded_io::Read for FailingReader {
        fn read(&mut self, _buf: &mut [u8]) -> Result<usize, Self::Error> {
            Err(embedded_io::ErrorKind::Other)
        }
    }

    #[test]
    fn acquisition_rereads_after_marker() {
        let bytes = encode_mono(&[100.0, -100.0], 44_100);
        let mut reader = &bytes[..];

        let result = StreamingWav::from_reader(&mut reader);

        // 40 bytes scanned, then the 8 remaining bytes are read as the header block
        assert!(matches!(
            result,
            Err(IoError::Decode(Error::MissingMarker(Marker::Riff)))
        ));
        assert!(reader.is_empty());
    }

    #[test]
    fn acquisition_expects_data_at_block_start() {
        let file = encode_mono(&[1.0, 2.0], 44_100);
        let mut bytes = vec![0u8; 36];
        bytes.extend_from_slice(b"data");
        bytes.extend_from_slice(&file);
        let mut reader = &bytes[..];

        let result = StreamingWav::from_reader(&mut reader);

        assert!(matches!(
            result,
            Err(IoError::Decode(Error::MissingMarker(Marker::Data)))
        ));
        assert!(reader.is_empty());
    }

    #[test]
    fn acquisition_without_marker() {
        let bytes = b"RIFF\x00\x00\x00\x00WAVEfmt ";

        assert!(matches!(
            StreamingWav::from_reader(&bytes[..]),
            Err(IoError::Decode(Error::NoDataMarker))
        ));
    }

    #[test]
    fn acquisition_propagates_reader_errors() {
        assert!(matches!(
            StreamingWav::from_reader(FailingReader),
            Err(IoError::Stream(embedded_io::ErrorKind::Other))
        ));
    }

    #[test]
    fn read_frames_in_batches() {
        let header = Header::pcm(44_100, 2, 16, 12);
        let payload: [u8; 12] = [
            0x01, 0x00, 0xff, 0xff, // frame 1 L+R
            0x02, 0x00, 0xfe, 0xff, // frame 2 L+R
            0x03, 0x00, 0xfd, 0xff, // frame 3 L+R
        ];
        let mut wav = StreamingWav::from_header(header, &payload[..]);

        assert_eq!(wav.read_frames(2).unwrap(), vec![vec![1, -1], vec![2, -2]]);
        assert_eq!(wav.read_frames(2).unwrap(), vec![vec![3, -3]]);
        assert_eq!(wav.read_frames(2).unwrap(), Vec::<Frame>::new());
        assert_eq!(wav.header().num_frames, 3);
        assert_eq!(wav.bytes_scanned(), 0);
    }

    #[test]
    fn read_frames_huge_count_is_capped() {
        let header = Header::pcm(44_100, 2, 16, 12);
        let payload: [u8; 12] = [
            0x01, 0x00, 0xff, 0xff, // frame 1 L+R
            0x02, 0x00, 0xfe, 0xff, // frame 2 L+R
            0x03, 0x00, 0xfd, 0xff, // frame 3 L+R
        ];
        let mut wav = StreamingWav::from_header(header, &payload[..]);

        assert_eq!(batch_len(&header, usize::MAX), MAX_BATCH_BYTES);
        assert_eq!(
            wav.read_frames(usize::MAX).unwrap(),
            vec![vec![1, -1], vec![2, -2], vec![3, -3]]
        );
        assert!(wav.read_frames(usize::MAX).unwrap().is_empty());
    }

    #[test]
    fn batch_len_keeps_whole_frames() {
        let header = Header::pcm(44_100, 3, 16, 0);

        assert_eq!(batch_len(&header, 4), 24);
        assert_eq!(batch_len(&header, usize::MAX) % 6, 0);
        assert!(batch_len(&header, usize::MAX) <= MAX_BATCH_BYTES);
    }

    #[test]
    fn read_frames_8_bit() {
        let header = Header::pcm(8_000, 1, 8, 3);
        let payload: [u8; 3] = [0x00, 0x80, 0xff];
        let mut wav = StreamingWav::from_header(header, &payload[..]);

        assert_eq!(
            wav.read_frames(3).unwrap(),
            vec![vec![0], vec![128], vec![255]]
        );
    }

    #[test]
    fn read_frames_zero_count() {
        let header = Header::pcm(8_000, 1, 8, 3);
        let mut wav = StreamingWav::from_header(header, &[0x01u8][..]);

        assert!(wav.read_frames(0).unwrap().is_empty());
        assert_eq!(wav.into_inner(), &[0x01]);
    }

    #[test]
    fn read_frames_misaligned() {
        let header = Header::pcm(44_100, 2, 16, 6);
        let payload: [u8; 6] = [0x01, 0x00, 0x02, 0x00, 0x03, 0x00];
        let mut wav = StreamingWav::from_header(header, &payload[..]);

        assert_eq!(
            wav.read_frames(2),
            Err(IoError::Decode(Error::MisalignedRead {
                read: 6,
                block_align: 4
            }))
        );
    }

    #[test]
    fn read_frames_propagates_reader_errors() {
        let mut wav = StreamingWav::from_header(Header::pcm(8_000, 1, 16, 0), FailingReader);

        assert_eq!(
            wav.read_frames(1),
            Err(IoError::Stream(embedded_io::ErrorKind::Other))
        );
    }

    #[test]
    fn read_frames_zero_block_align() {
        let mut header = Header::pcm(8_000, 1, 16, 0);
        header.block_align = 0;
        let mut wav = StreamingWav::from_header(header, &[0u8; 0][..]);

        assert_eq!(wav.read_frames(1), Err(IoError::Decode(Error::ZeroBlockAlign)));
    }

    #[cfg(feature = "std")]
    #[test]
    fn file_source() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("stream.wav");
        crate::mono::write_mono_file(&path, &[5.0, -5.0, 6.0], 16_000).unwrap();

        assert!(matches!(
            StreamingWav::from_file(&path),
            Err(IoError::Decode(Error::MissingMarker(Marker::Riff)))
        ));

        let mut file = File::open(&path).unwrap();
        let mut prefix = [0u8; 44];
        assert_eq!(fill(&mut file, &mut prefix).unwrap(), 44);
        let header = Header::parse(&prefix, 36).unwrap();

        let mut wav = StreamingWav::from_header(header, file);

        assert_eq!(wav.read_frames(2).unwrap(), vec![vec![5], vec![-5]]);
        assert_eq!(wav.read_frames(2).unwrap(), vec![vec![6]]);
        assert!(wav.read_frames(2).unwrap().is_empty());
    }

    #[cfg(feature = "std")]
    #[test]
    fn missing_file() {
        assert!(matches!(
            StreamingWav::from_file("/nonexistent/stream.wav"),
            Err(IoError::Stream(_))
        ));
    }

    #[cfg(feature = "std")]
    mod async_tests {
        use super::*;

        // Simple async reader wrapper for testing
        struct AsyncSliceReader<'a> {
            data: &'a [u8],
            pos: usize,
        }

        impl<'a> AsyncSliceReader<'a> {
            fn new(data: &'a [u8]) -> Self {
                Self { data, pos: 0 }
            }
        }

        impl embedded_io_async::ErrorType for AsyncSliceReader<'_> {
            type Error = std::io::Error;
        }

        impl embedded_io_async::Read for AsyncSliceReader<'_> {
            async fn read(&mut self, buf: &mut [u8]) -> Result<usize, Self::Error> {
                if self.pos >= self.data.len() {
                    return Ok(0);
                }
                let remaining = self.data.len() - self.pos;
                let to_read = remaining.min(buf.len());
                buf[..to_read].copy_from_slice(&self.data[self.pos..self.pos + to_read]);
                self.pos += to_read;
                Ok(to_read)
            }
        }

        #[tokio::test]
        async fn test_async_acquisition_rereads_after_marker() {
            let bytes = encode_mono(&[100.0, -100.0], 44_100);
            let reader = AsyncSliceReader::new(&bytes);

            let result = asynch::StreamingWav::from_reader(reader).await;

            assert!(matches!(
                result,
                Err(IoError::Decode(Error::MissingMarker(Marker::Riff)))
            ));
        }

        #[tokio::test]
        async fn test_async_acquisition_without_marker() {
            let reader = AsyncSliceReader::new(b"RIFF\x00\x00\x00\x00WAVE");

            assert!(matches!(
                asynch::StreamingWav::from_reader(reader).await,
                Err(IoError::Decode(Error::NoDataMarker))
            ));
        }

        #[tokio::test]
        async fn test_async_read_frames() {
            let header = Header::pcm(44_100, 1, 16, 6);
            let payload = [0x64, 0x00, 0x9c, 0xff, 0x00, 0x00];
            let mut wav =
                asynch::StreamingWav::from_header(header, AsyncSliceReader::new(&payload));

            assert_eq!(
                wav.read_frames(2).await.unwrap(),
                vec![vec![100], vec![-100]]
            );
            assert_eq!(wav.read_frames(2).await.unwrap(), vec![vec![0]]);
            assert!(wav.read_frames(2).await.unwrap().is_empty());
        }

        #[tokio::test]
        async fn test_async_read_frames_misaligned() {
            let header = Header::pcm(44_100, 2, 8, 3);
            let payload = [0x01, 0x02, 0x03];
            let mut wav =
                asynch::StreamingWav::from_header(header, AsyncSliceReader::new(&payload));

            assert!(matches!(
                wav.read_frames(4).await,
                Err(IoError::Decode(Error::MisalignedRead {
                    read: 3,
                    block_align: 2
                }))
            ));
        }

        #[tokio::test]
        async fn test_async_tokio_file() {
            let dir = tempfile::tempdir().unwrap();
            let path = dir.path().join("stream.wav");
            crate::mono::write_mono_file(&path, &[7.0, -7.0], 16_000).unwrap();

            assert!(matches!(
                asynch::StreamingWav::from_file(&path).await,
                Err(IoError::Decode(Error::MissingMarker(Marker::Riff)))
            ));

            let mut file = asynch::TokioFile::open(&path).await.unwrap();
            let mut prefix = [0u8; 44];
            embedded_io_async::Read::read_exact(&mut file, &mut prefix)
                .await
                .unwrap();
            let header = Header::parse(&prefix, 36).unwrap();
            let mut wav = asynch::StreamingWav::from_header(header, file);

            assert_eq!(
                wav.read_frames(4).await.unwrap(),
                vec![vec![7], vec![-7]]
            );
        }
    }
}
