//! Band score arithmetic.
//!
//! Two independent conversions live here: averaging several bands into one
//! (used for the overall result and for rubric criteria) and mapping a
//! correct-answer count onto the stepped listening/reading table.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::error::GradingError;

/// A band from 0.0 to 9.0 in half steps.
///
/// Stored as a count of half bands so values compare exactly; serialized as
/// a plain JSON number.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Default, Serialize, Deserialize)]
#[serde(try_from = "f64", into = "f64")]
pub struct BandScore(u8);

impl BandScore {
    pub const MIN: BandScore = BandScore(0);
    pub const MAX: BandScore = BandScore(18);

    /// Build from a count of half bands (`13` is 6.5).
    pub const fn from_half_steps(half_steps: u8) -> Option<BandScore> {
        if half_steps <= 18 {
            Some(BandScore(half_steps))
        } else {
            None
        }
    }

    pub fn half_steps(self) -> u8 {
        self.0
    }

    pub fn value(self) -> f64 {
        f64::from(self.0) / 2.0
    }

    /// Snap any finite number to the nearest half band inside 0.0..=9.0.
    fn clamped(value: f64) -> BandScore {
        BandScore((value.clamp(0.0, 9.0) * 2.0).round() as u8)
    }
}

impl TryFrom<f64> for BandScore {
    type Error = GradingError;

    fn try_from(value: f64) -> Result<Self, Self::Error> {
        let doubled = value * 2.0;
        if !(0.0..=18.0).contains(&doubled) || doubled.fract() != 0.0 {
            return Err(GradingError::InvalidBand(value));
        }
        Ok(BandScore(doubled as u8))
    }
}

impl From<BandScore> for f64 {
    fn from(band: BandScore) -> f64 {
        band.value()
    }
}

impl fmt::Display for BandScore {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.1}", self.value())
    }
}

/// Average several scores and round to the nearest half band.
///
/// The fractional part of the mean decides the rounding: below 0.25 rounds
/// down, below 0.75 goes to the half, anything else rounds up. An empty
/// input yields 0.0. Non-finite inputs are ignored.
pub fn average_band(scores: &[f64]) -> BandScore {
    let finite: Vec<f64> = scores.iter().copied().filter(|s| s.is_finite()).collect();
    if finite.is_empty() {
        return BandScore::MIN;
    }

    let mean = finite.iter().sum::<f64>() / finite.len() as f64;
    let whole = mean.floor();
    let fraction = mean - whole;

    let rounded = if fraction < 0.25 {
        whole
    } else if fraction < 0.75 {
        whole + 0.5
    } else {
        whole + 1.0
    };

    BandScore::clamped(rounded)
}

/// [`average_band`] over values that are already bands.
pub fn average_of(bands: &[BandScore]) -> BandScore {
    let values: Vec<f64> = bands.iter().map(|b| b.value()).collect();
    average_band(&values)
}

/// Lower percentage bound of each band, highest first.
const COUNT_TABLE: [(f64, BandScore); 13] = [
    (97.5, BandScore(18)),
    (92.5, BandScore(17)),
    (87.5, BandScore(16)),
    (82.5, BandScore(15)),
    (75.0, BandScore(14)),
    (67.5, BandScore(13)),
    (60.0, BandScore(12)),
    (52.5, BandScore(11)),
    (45.0, BandScore(10)),
    (37.5, BandScore(9)),
    (30.0, BandScore(8)),
    (22.5, BandScore(7)),
    (15.0, BandScore(6)),
];

/// Band for anything under 15%.
pub const COUNT_TABLE_FLOOR: BandScore = BandScore(5);

/// Percentage of correct answers, 0 when there is nothing to count.
pub fn percentage(correct: u32, total: u32) -> f64 {
    if total == 0 {
        0.0
    } else {
        f64::from(correct) * 100.0 / f64::from(total)
    }
}

/// Map a correct-answer count onto the listening/reading conversion table.
pub fn convert_count_to_band(correct: u32, total: u32) -> BandScore {
    let pct = percentage(correct, total);
    COUNT_TABLE
        .iter()
        .find(|(threshold, _)| pct >= *threshold)
        .map(|(_, band)| *band)
        .unwrap_or(COUNT_TABLE_FLOOR)
}
