//! Genotype dosage from Phred-scaled likelihoods
//!
//! A biallelic diploid site carries three likelihoods (hom-ref, het,
//! hom-alt) encoded as `-10 * log10(L)`. Converting them back to linear
//! scale and taking the expected alternate allele count gives
//!
//! ```text
//! DS = (p1 + 2 * p2) / (p0 + p1 + p2)
//! ```
//!
//! which always lies in `[0, 2]`.

use crate::core::config::DegeneratePolicy;
use crate::core::error::{LikelihoodError, LikelihoodResult};
use std::fmt;

/// VCF missing value
pub const MISSING_VALUE: &str = ".";

/// Convert a Phred-scaled value to linear scale
#[inline]
pub fn phred_to_linear(phred: f64) -> f64 {
    10f64.powf(phred / -10.0)
}

/// Linear-scale likelihoods of the three diploid genotypes
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GenotypeLikelihoods {
    pub hom_ref: f64,
    pub het: f64,
    pub hom_alt: f64,
}

impl GenotypeLikelihoods {
    /// Build from three Phred-scaled values
    pub fn from_phred(hom_ref: f64, het: f64, hom_alt: f64) -> Self {
        Self {
            hom_ref: phred_to_linear(hom_ref),
            het: phred_to_linear(het),
            hom_alt: phred_to_linear(hom_alt),
        }
    }

    /// Parse a `PL` value such as `0,30,300`
    ///
    /// Returns `Ok(None)` when any of the values is the missing value `.`.
    pub fn parse(value: &[u8], separator: u8) -> LikelihoodResult<Option<Self>> {
        let mut phred = [0f64; 3];
        let mut found = 0;
        let mut missing = false;

        for token in value.split(|&b| b == separator) {
            if found < phred.len() {
                if token == MISSING_VALUE.as_bytes() {
                    missing = true;
                } else {
                    phred[found] = parse_phred(token)?;
                }
            }
            found += 1;
        }

        if found != 3 {
            return Err(LikelihoodError::WrongCount { found });
        }
        if missing {
            return Ok(None);
        }
        Ok(Some(Self::from_phred(phred[0], phred[1], phred[2])))
    }

    /// Expected alternate allele count, or None when the likelihoods
    /// cannot be normalised
    pub fn dosage(&self) -> Option<f64> {
        let total = self.hom_ref + self.het + self.hom_alt;
        if total == 0.0 || !total.is_finite() {
            return None;
        }
        Some((self.het + 2.0 * self.hom_alt) / total)
    }
}

fn parse_phred(token: &[u8]) -> LikelihoodResult<f64> {
    let value = std::str::from_utf8(token)
        .ok()
        .and_then(|text| text.trim().parse::<f64>().ok());
    match value {
        Some(value) if value.is_finite() => Ok(value),
        _ => Err(LikelihoodError::InvalidNumber(
            String::from_utf8_lossy(token).into_owned(),
        )),
    }
}

/// Dosage written for one sample
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum Dosage {
    Value(f64),
    Missing,
}

impl Dosage {
    pub fn is_missing(&self) -> bool {
        matches!(self, Dosage::Missing)
    }
}

impl fmt::Display for Dosage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Dosage::Value(value) => write!(f, "{:.2}", value),
            Dosage::Missing => f.write_str(MISSING_VALUE),
        }
    }
}

/// Compute the dosage of one sample entry
///
/// `likelihood_index` is the position of the `PL` key in the FORMAT list.
/// An entry truncated before that position, or a missing `PL` value, yields
/// [`Dosage::Missing`]. Malformed values are errors.
pub fn sample_dosage(
    entry: &[u8],
    likelihood_index: usize,
    key_separator: u8,
    value_separator: u8,
    degenerate: DegeneratePolicy,
) -> LikelihoodResult<Dosage> {
    let value = match entry.split(|&b| b == key_separator).nth(likelihood_index) {
        Some(value) if value != MISSING_VALUE.as_bytes() => value,
        _ => return Ok(Dosage::Missing),
    };

    let likelihoods = match GenotypeLikelihoods::parse(value, value_separator)? {
        Some(likelihoods) => likelihoods,
        None => return Ok(Dosage::Missing),
    };

    match (likelihoods.dosage(), degenerate) {
        (Some(dosage), _) => Ok(Dosage::Value(dosage)),
        (None, DegeneratePolicy::Missing) => Ok(Dosage::Missing),
        (None, DegeneratePolicy::Fail) => Err(LikelihoodError::Degenerate(
            String::from_utf8_lossy(value).into_owned(),
        )),
    }
}
