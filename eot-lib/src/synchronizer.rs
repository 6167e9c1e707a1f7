use tracing::trace;

use crate::window::{BitWindow, DEFAULT_WINDOW};
use crate::{Error, Result};

/// EOT frame sync: the tail of the bit-sync run followed by the 11-bit Barker code.
pub const FRAME_SYNC: [bool; 17] = [
    true, false, true, false, true, false, true, true, true, false, false, false, true, false,
    false, true, false,
];

/// Number of bit-sync symbols following [FRAME_SYNC] that carry no data.
pub const PREAMBLE_LEN: usize = 6;

/// Parse a string of `'0'` and `'1'` characters into symbols.
///
/// # Errors
/// [Error::InvalidConfig] if `s` contains any other character.
pub fn parse_bits(s: &str) -> Result<Vec<bool>> {
    s.chars()
        .map(|c| match c {
            '0' => Ok(false),
            '1' => Ok(true),
            _ => Err(Error::InvalidConfig(format!(
                "invalid symbol {c:?} in bit string {s:?}"
            ))),
        })
        .collect()
}

/// Options used for synchronization.
#[derive(Clone, Debug)]
pub struct SyncOpts {
    pub pattern: Vec<bool>,
    pub preamble: usize,
    pub window: usize,
}

impl Default for SyncOpts {
    fn default() -> Self {
        Self::new()
    }
}

impl SyncOpts {
    /// Create options for the EOT protocol, i.e., [FRAME_SYNC] followed by a
    /// [PREAMBLE_LEN] symbol preamble in a [DEFAULT_WINDOW] symbol window.
    pub fn new() -> Self {
        SyncOpts {
            pattern: FRAME_SYNC.to_vec(),
            preamble: PREAMBLE_LEN,
            window: DEFAULT_WINDOW,
        }
    }

    /// Sync pattern marking the start of a frame.
    pub fn with_pattern(mut self, pattern: &[bool]) -> Self {
        self.pattern = pattern.to_vec();
        self
    }

    /// Number of symbols after the sync pattern to skip.
    pub fn with_preamble(mut self, preamble: usize) -> Self {
        self.preamble = preamble;
        self
    }

    /// Number of symbols retained in the sliding window.
    pub fn with_window(mut self, window: usize) -> Self {
        self.window = window;
        self
    }
}

/// Bits following a matched sync pattern and preamble, handed off for decoding.
#[derive(Debug, Clone, PartialEq)]
pub struct Candidate {
    /// Zero-based offset in the symbol stream of the first sync pattern symbol.
    pub offset: u64,
    /// Everything in the window after the pattern and preamble. May be longer than
    /// a packet; the decoder decides how much of it to use.
    pub bits: Vec<bool>,
}

/// Synchronizer locates frames in a symbol stream fed to it one symbol at a time.
///
/// After every symbol the window is checked for the sync pattern at position 0 only.
/// Once the window is full it shifts by exactly one symbol per push, so any pattern
/// occurrence anywhere in the window will reach position 0 on some later push and a
/// general search is never needed.
///
/// A match requires at least one symbol after the pattern and preamble. While the
/// window is still filling its front does not move, so an occurrence at position 0 is
/// reported again on every push, with a longer candidate each time, until it is
/// [confirmed](Synchronizer::confirm).
#[derive(Debug, Clone)]
pub struct Synchronizer {
    window: BitWindow,
    pattern: Vec<bool>,
    preamble: usize,
    // Stream offset of the last occurrence that decoded
    confirmed: Option<u64>,
}

impl Synchronizer {
    /// Creates a new `Synchronizer`.
    ///
    /// # Errors
    /// [Error::InvalidConfig] if the pattern is empty, or if the window cannot hold the
    /// pattern, preamble, and at least one more symbol.
    pub fn new(opts: &SyncOpts) -> Result<Self> {
        if opts.pattern.is_empty() {
            return Err(Error::InvalidConfig("sync pattern is empty".to_string()));
        }
        let min = opts.pattern.len() + opts.preamble + 1;
        if opts.window < min {
            return Err(Error::InvalidConfig(format!(
                "window of {} symbols cannot hold a frame, need at least {min}",
                opts.window
            )));
        }
        Ok(Synchronizer {
            window: BitWindow::new(opts.window)?,
            pattern: opts.pattern.clone(),
            preamble: opts.preamble,
            confirmed: None,
        })
    }

    /// Push a single symbol, returning a [Candidate] if the window now starts with
    /// the sync pattern.
    pub fn push(&mut self, bit: bool) -> Option<Candidate> {
        self.window.push(bit);

        let skip = self.pattern.len() + self.preamble;
        if self.window.len() <= skip || !self.window.starts_with(&self.pattern) {
            return None;
        }
        let offset = self.window.front_offset();
        if self.confirmed == Some(offset) {
            return None;
        }

        let bits = self.window.snapshot().split_off(skip);
        trace!(offset, len = bits.len(), "frame sync");
        Some(Candidate { offset, bits })
    }

    /// Mark the occurrence at stream `offset` as decoded so it is not reported again.
    pub fn confirm(&mut self, offset: u64) {
        self.confirmed = Some(offset);
    }

    pub fn window(&self) -> &BitWindow {
        &self.window
    }
}
