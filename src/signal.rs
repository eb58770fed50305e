//! Per-entity binary signal history
//!
//! A [`Signal`] is the on/off history of one tracked light source, one bit per
//! processed frame. Frames before the source was first seen are stored as `0`,
//! so every entity in a collection carries a signal of the same length.

/// Binary on/off history, one bit per frame.
#[derive(Debug, Clone, Default, PartialEq, Eq, Hash)]
pub struct Signal {
    bits: Vec<u8>,
}

impl Signal {
    /// Signal of a source that was absent for `prior_frames` frames and is lit
    /// in the current one: `prior_frames` zeros followed by a single `1`.
    pub fn emerging(prior_frames: usize) -> Self {
        let mut bits = vec![0; prior_frames + 1];
        bits[prior_frames] = 1;
        Self { bits }
    }

    /// Build a signal from arbitrary values; anything non-zero counts as on.
    pub fn from_bits<I>(bits: I) -> Self
    where
        I: IntoIterator<Item = u8>,
    {
        Self {
            bits: bits.into_iter().map(|b| u8::from(b != 0)).collect(),
        }
    }

    /// Number of frames recorded
    #[inline]
    pub fn len(&self) -> usize {
        self.bits.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.bits.is_empty()
    }

    /// Raw bits (each `0` or `1`)
    #[inline]
    pub fn bits(&self) -> &[u8] {
        &self.bits
    }

    /// Append the state observed in the newest frame
    #[inline]
    pub fn push(&mut self, on: bool) {
        self.bits.push(u8::from(on));
    }

    /// Index of the first `1` bit, if any
    pub fn first_active(&self) -> Option<usize> {
        self.bits.iter().position(|&b| b == 1)
    }

    /// Index of the most recent `1` bit, if any
    pub fn last_active(&self) -> Option<usize> {
        self.bits.iter().rposition(|&b| b == 1)
    }

    /// Total number of frames the source was on
    pub fn activity(&self) -> usize {
        self.bits.iter().map(|&b| b as usize).sum()
    }

    /// Bits from `start` to the newest frame.
    ///
    /// Returns an empty slice when `start` is past the end.
    pub fn suffix(&self, start: usize) -> &[u8] {
        self.bits.get(start..).unwrap_or(&[])
    }

    /// Overwrite the bits from `start` onward with `bits`.
    ///
    /// Values are normalised to `0`/`1`; writes past the end are ignored.
    pub fn overwrite_suffix(&mut self, start: usize, bits: &[u8]) {
        if let Some(tail) = self.bits.get_mut(start..) {
            for (dst, &src) in tail.iter_mut().zip(bits) {
                *dst = u8::from(src != 0);
            }
        }
    }

    /// Fraction of frames from `start` onward that were on.
    ///
    /// Returns `0.0` for an empty window.
    pub fn duty_cycle_from(&self, start: usize) -> f64 {
        let window = self.suffix(start);
        if window.is_empty() {
            return 0.0;
        }
        window.iter().map(|&b| b as f64).sum::<f64>() / window.len() as f64
    }

    /// Map `{0, 1}` to the bipolar `{-1, +1}` domain expected by demodulators.
    pub fn to_bipolar(&self) -> Vec<i8> {
        self.bits.iter().map(|&b| 2 * b as i8 - 1).collect()
    }
}

impl From<Vec<bool>> for Signal {
    fn from(bits: Vec<bool>) -> Self {
        Self {
            bits: bits.into_iter().map(u8::from).collect(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_emerging_signal() {
        let signal = Signal::emerging(3);
        assert_eq!(signal.bits(), &[0, 0, 0, 1]);
        assert_eq!(signal.first_active(), Some(3));
        assert_eq!(signal.last_active(), Some(3));

        let fresh = Signal::emerging(0);
        assert_eq!(fresh.bits(), &[1]);
    }

    #[test]
    fn test_from_bits_normalises() {
        let signal = Signal::from_bits([0, 2, 1, 0, 7]);
        assert_eq!(signal.bits(), &[0, 1, 1, 0, 1]);
        assert_eq!(signal.activity(), 3);
    }

    #[test]
    fn test_active_indices() {
        let signal = Signal::from_bits([0, 0, 1, 0, 1, 0, 0]);
        assert_eq!(signal.first_active(), Some(2));
        assert_eq!(signal.last_active(), Some(4));

        let dark = Signal::from_bits([0, 0, 0]);
        assert_eq!(dark.first_active(), None);
        assert_eq!(dark.last_active(), None);
    }

    #[test]
    fn test_suffix_and_overwrite() {
        let mut signal = Signal::from_bits([1, 0, 1, 0, 1]);
        assert_eq!(signal.suffix(2), &[1, 0, 1]);
        assert!(signal.suffix(10).is_empty());

        signal.overwrite_suffix(2, &[0, 1, 1]);
        assert_eq!(signal.bits(), &[1, 0, 0, 1, 1]);

        // Longer input than the tail is truncated
        signal.overwrite_suffix(4, &[0, 1, 1]);
        assert_eq!(signal.bits(), &[1, 0, 0, 1, 0]);
    }

    #[test]
    fn test_duty_cycle() {
        let signal = Signal::from_bits([0, 0, 1, 0, 1, 0]);
        assert!((signal.duty_cycle_from(2) - 0.5).abs() < 1e-12);
        assert_eq!(signal.duty_cycle_from(6), 0.0);
    }

    #[test]
    fn test_bipolar() {
        let signal = Signal::from(vec![true, false, true]);
        assert_eq!(signal.to_bipolar(), vec![1, -1, 1]);
    }
}
