use std::collections::VecDeque;

use crate::{Error, Result};

/// Default number of symbols held by a [BitWindow].
pub const DEFAULT_WINDOW: usize = 256;

/// A fixed-capacity, insertion-ordered buffer of the most recently received symbols.
///
/// Pushing onto a full window evicts the oldest symbol, so the window always holds the
/// last `min(capacity, pushed)` symbols in arrival order. The window is never cleared;
/// it only changes as symbols arrive.
#[derive(Debug, Clone)]
pub struct BitWindow {
    bits: VecDeque<bool>,
    capacity: usize,
    // Number of symbols evicted so far, i.e., the stream offset of the front symbol
    evicted: u64,
}

impl BitWindow {
    /// Create a new, empty window.
    ///
    /// # Errors
    /// [Error::InvalidConfig] if `capacity` is zero.
    pub fn new(capacity: usize) -> Result<Self> {
        if capacity == 0 {
            return Err(Error::InvalidConfig(
                "window capacity must be greater than 0".to_string(),
            ));
        }
        Ok(BitWindow {
            bits: VecDeque::with_capacity(capacity),
            capacity,
            evicted: 0,
        })
    }

    /// Append a symbol, returning the evicted symbol if the window was full.
    pub fn push(&mut self, bit: bool) -> Option<bool> {
        let evicted = if self.bits.len() == self.capacity {
            self.evicted += 1;
            self.bits.pop_front()
        } else {
            None
        };
        self.bits.push_back(bit);
        evicted
    }

    /// The current contents, oldest first.
    #[must_use]
    pub fn snapshot(&self) -> Vec<bool> {
        self.bits.iter().copied().collect()
    }

    /// Returns true if the window begins with `pattern`. A window shorter than the
    /// pattern never matches.
    #[must_use]
    pub fn starts_with(&self, pattern: &[bool]) -> bool {
        self.bits.len() >= pattern.len() && self.bits.iter().zip(pattern).all(|(a, b)| a == b)
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    #[must_use]
    pub fn is_full(&self) -> bool {
        self.bits.len() == self.capacity
    }

    #[must_use]
    pub fn capacity(&self) -> usize {
        self.capacity
    }

    /// Zero-based offset in the overall symbol stream of the symbol at the front of
    /// the window.
    #[must_use]
    pub fn front_offset(&self) -> u64 {
        self.evicted
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn zero_capacity_is_rejected() {
        let zult = BitWindow::new(0);
        assert!(matches!(zult, Err(Error::InvalidConfig(_))));
    }

    #[test]
    fn holds_last_symbols_in_arrival_order() {
        let mut window = BitWindow::new(4).unwrap();
        let input = [true, false, false, true, true, false];

        for (i, bit) in input.iter().enumerate() {
            window.push(*bit);
            let expected_len = (i + 1).min(4);
            assert_eq!(window.len(), expected_len);
            assert_eq!(window.snapshot(), input[i + 1 - expected_len..=i]);
        }
        assert!(window.is_full());
        assert_eq!(window.front_offset(), 2);
    }

    #[test]
    fn push_returns_evicted_symbol() {
        let mut window = BitWindow::new(2).unwrap();
        assert_eq!(window.push(true), None);
        assert_eq!(window.push(false), None);
        assert_eq!(window.push(false), Some(true));
        assert_eq!(window.push(true), Some(false));
    }

    #[test]
    fn starts_with_tolerates_short_window() {
        let mut window = BitWindow::new(8).unwrap();
        window.push(true);
        assert!(!window.starts_with(&[true, false]));
        window.push(false);
        assert!(window.starts_with(&[true, false]));
        assert!(window.starts_with(&[]));
    }

    #[test]
    fn never_exceeds_capacity() {
        let mut window = BitWindow::new(DEFAULT_WINDOW).unwrap();
        for i in 0..(DEFAULT_WINDOW * 3 + 7) {
            window.push(i % 3 == 0);
            assert!(window.len() <= DEFAULT_WINDOW);
        }
        assert_eq!(window.len(), DEFAULT_WINDOW);
        assert_eq!(window.front_offset(), (DEFAULT_WINDOW * 2 + 7) as u64);
    }
}
