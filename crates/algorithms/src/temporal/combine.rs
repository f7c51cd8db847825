//! Per-pixel combine functions shared by the temporal reducers
//!
//! Both reducers are order independent over their samples: a histogram
//! merges by adding counts and a median sorts before selecting, so partial
//! results over any partition of the timesteps combine to the same answer.

/// Occurrence counts of each class code at one pixel
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClassHistogram {
    counts: [u32; 256],
}

impl Default for ClassHistogram {
    fn default() -> Self {
        Self { counts: [0; 256] }
    }
}

impl ClassHistogram {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, code: u8) {
        self.counts[code as usize] += 1;
    }

    pub fn count(&self, code: u8) -> u32 {
        self.counts[code as usize]
    }

    pub fn total(&self) -> u32 {
        self.counts.iter().sum()
    }

    /// Add another partial histogram into this one
    pub fn merge(&mut self, other: &ClassHistogram) {
        for (a, b) in self.counts.iter_mut().zip(other.counts.iter()) {
            *a += b;
        }
    }

    /// Most frequent code; ties go to the lowest code. `None` when empty.
    pub fn mode(&self) -> Option<u8> {
        let mut best: Option<(u8, u32)> = None;
        for (code, &n) in self.counts.iter().enumerate() {
            if n == 0 {
                continue;
            }
            match best {
                Some((_, best_n)) if n <= best_n => {}
                _ => best = Some((code as u8, n)),
            }
        }
        best.map(|(code, _)| code)
    }
}

impl FromIterator<u8> for ClassHistogram {
    fn from_iter<I: IntoIterator<Item = u8>>(iter: I) -> Self {
        let mut hist = ClassHistogram::new();
        for code in iter {
            hist.add(code);
        }
        hist
    }
}

/// Most frequent code in `codes`, lowest code winning ties
pub fn mode_of(codes: &[u8]) -> Option<u8> {
    codes.iter().copied().collect::<ClassHistogram>().mode()
}

/// Median of the non-NaN samples; the mean of the two middle values for an
/// even count. `None` when no sample is valid.
pub fn median_of(samples: &[f64]) -> Option<f64> {
    let mut valid: Vec<f64> = samples.iter().copied().filter(|v| !v.is_nan()).collect();
    if valid.is_empty() {
        return None;
    }
    valid.sort_by(|a, b| a.total_cmp(b));
    let n = valid.len();
    if n % 2 == 1 {
        Some(valid[n / 2])
    } else {
        Some((valid[n / 2 - 1] + valid[n / 2]) / 2.0)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_mode_majority() {
        assert_eq!(mode_of(&[1, 1, 2]), Some(1));
        assert_eq!(mode_of(&[6, 2, 6, 6, 2]), Some(6));
    }

    #[test]
    fn test_mode_tie_lowest_code_wins() {
        assert_eq!(mode_of(&[1, 2]), Some(1));
        assert_eq!(mode_of(&[6, 2, 2, 6]), Some(2));
    }

    #[test]
    fn test_mode_empty() {
        assert_eq!(mode_of(&[]), None);
    }

    #[test]
    fn test_histogram_merge_matches_single_pass() {
        let codes = [0u8, 6, 6, 1, 2, 6, 1, 1, 0, 4];
        let whole: ClassHistogram = codes.iter().copied().collect();

        let mut left: ClassHistogram = codes[..3].iter().copied().collect();
        let right: ClassHistogram = codes[3..].iter().copied().collect();
        left.merge(&right);

        assert_eq!(left, whole);
        assert_eq!(left.mode(), whole.mode());
        assert_eq!(whole.total(), codes.len() as u32);
        assert_eq!(whole.count(6), 3);
    }

    #[test]
    fn test_median_odd_and_even() {
        assert_eq!(median_of(&[3.0, 1.0, 2.0]), Some(2.0));
        assert_eq!(median_of(&[4.0, 1.0, 3.0, 2.0]), Some(2.5));
    }

    #[test]
    fn test_median_skips_nan() {
        assert_eq!(median_of(&[f64::NAN, 5.0, f64::NAN]), Some(5.0));
        assert_eq!(median_of(&[f64::NAN]), None);
        assert_eq!(median_of(&[]), None);
    }
}
