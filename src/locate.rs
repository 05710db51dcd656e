//! Finding the `data` marker, whose position depends on the length of the
//! sub-chunks in front of it.
//!
//! Both searches are plain content scans for the four marker bytes. They do not
//! walk chunks by their declared sizes, so a `data` sequence that occurs earlier
//! in the file (inside metadata for instance) is reported first.

use crate::header::Marker;

const DATA: &[u8; 4] = Marker::Data.tag();

/// Offset of the first `data` sequence in `bytes`
pub fn find_data_marker(bytes: &[u8]) -> Option<usize> {
    bytes.windows(DATA.len()).position(|w| w == DATA)
}

/// Progress of a [`MarkerScanner`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    /// Marker not yet seen
    Scanning,
    /// Marker complete, carries the number of bytes consumed including the marker
    Found(usize),
}

/// Byte at a time search for the `data` marker in a stream that cannot rewind.
///
/// Only the last four bytes are kept. Consumed bytes are counted and dropped.
#[derive(Debug, Clone)]
pub struct MarkerScanner {
    window: [u8; 4],
    consumed: usize,
    state: ScanState,
}

impl MarkerScanner {
    /// New scanner that has not consumed anything
    pub fn new() -> Self {
        Self {
            window: [0; 4],
            consumed: 0,
            state: ScanState::Scanning,
        }
    }

    /// Feed the next byte of the stream. Once the marker has been found further
    /// bytes are ignored.
    pub fn push(&mut self, byte: u8) -> ScanState {
        if let ScanState::Scanning = self.state {
            self.window.rotate_left(1);
            self.window[3] = byte;
            self.consumed += 1;

            if self.consumed >= DATA.len() && &self.window == DATA {
                self.state = ScanState::Found(self.consumed);
            }
        }

        self.state
    }

    /// Number of bytes consumed so far
    pub fn consumed(&self) -> usize {
        self.consumed
    }

    /// Current state
    pub fn state(&self) -> ScanState {
        self.state
    }
}

impl Default for MarkerScanner {
    fn default() -> Self {
        Self::new()
    }
}

/// Consume `reader` one byte at a time until the `data` marker has been read.
///
/// Returns the number of bytes consumed, or `None` if the stream ends first.
#[cfg(feature = "io")]
pub(crate) fn scan_reader<R: embedded_io::Read>(reader: &mut R) -> Result<Option<usize>, R::Error> {
    let mut scanner = MarkerScanner::new();
    let mut byte = [0u8; 1];

    loop {
        match reader.read(&mut byte)? {
            0 => return Ok(None),
            _ => {
                if let ScanState::Found(consumed) = scanner.push(byte[0]) {
                    return Ok(Some(consumed));
                }
            }
        }
    }
}
