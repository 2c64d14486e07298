//! Version parsing and optional bound comparison.
//!
//! Versions are dot-separated numeric components, tolerating a trailing
//! non-numeric suffix on a component ("24.0.7-ce" parses as 24.0.7).
//! Comparison treats missing components as zero, so "24.0" == "24.0.0".

use std::cmp::Ordering;
use std::fmt;
use thiserror::Error;

use crate::config;

/// Version parse errors.
#[derive(Debug, Error)]
#[error("unparseable version string {0:?}")]
pub struct VersionParseError(String);

/// A parsed version string.
#[derive(Debug, Clone)]
pub struct Version {
    components: Vec<u64>,
    raw: String,
}

impl Version {
    /// Parse a dot-separated version string.
    ///
    /// Each component must start with at least one digit; anything after
    /// the digits (release suffixes such as "-ce") is ignored.
    pub fn parse(raw: &str) -> Result<Self, VersionParseError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(VersionParseError(raw.to_string()));
        }
        let mut components = Vec::new();
        for part in trimmed.split('.') {
            let digits: String = part.chars().take_while(char::is_ascii_digit).collect();
            let component = digits
                .parse::<u64>()
                .map_err(|_| VersionParseError(raw.to_string()))?;
            components.push(component);
        }
        Ok(Self {
            components,
            raw: trimmed.to_string(),
        })
    }
}

impl fmt::Display for Version {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.raw)
    }
}

impl PartialEq for Version {
    fn eq(&self, other: &Self) -> bool {
        self.cmp(other) == Ordering::Equal
    }
}

impl Eq for Version {}

impl PartialOrd for Version {
    fn partial_cmp(&self, other: &Self) -> Option<Ordering> {
        Some(self.cmp(other))
    }
}

impl Ord for Version {
    fn cmp(&self, other: &Self) -> Ordering {
        let len = self.components.len().max(other.components.len());
        for i in 0..len {
            let a = self.components.get(i).copied().unwrap_or(0);
            let b = other.components.get(i).copied().unwrap_or(0);
            match a.cmp(&b) {
                Ordering::Equal => continue,
                unequal => return unequal,
            }
        }
        Ordering::Equal
    }
}

/// A version bound violation, carrying expected and observed values.
#[derive(Debug, Error)]
pub enum BoundsViolation {
    #[error("version {observed} is below the minimum {minimum}")]
    BelowMinimum { observed: String, minimum: String },

    #[error("version {observed} is not below the maximum {maximum}")]
    AtOrAboveMaximum { observed: String, maximum: String },
}

/// Optional inclusive-minimum / exclusive-maximum version bounds.
#[derive(Debug, Clone, Default)]
pub struct VersionBounds {
    pub min: Option<Version>,
    pub max: Option<Version>,
}

impl VersionBounds {
    /// Build bounds from a pair of optional environment variables.
    ///
    /// An unset variable imposes no constraint on that side.
    pub fn from_env(min_var: &str, max_var: &str) -> Result<Self, VersionParseError> {
        let min = config::optional(min_var)
            .map(|raw| Version::parse(&raw))
            .transpose()?;
        let max = config::optional(max_var)
            .map(|raw| Version::parse(&raw))
            .transpose()?;
        Ok(Self { min, max })
    }

    /// Check a version against the bounds.
    ///
    /// The minimum is inclusive, the maximum exclusive; an absent bound
    /// skips that half of the comparison.
    pub fn check(&self, observed: &Version) -> Result<(), BoundsViolation> {
        if let Some(min) = &self.min {
            if observed < min {
                return Err(BoundsViolation::BelowMinimum {
                    observed: observed.to_string(),
                    minimum: min.to_string(),
                });
            }
        }
        if let Some(max) = &self.max {
            if observed >= max {
                return Err(BoundsViolation::AtOrAboveMaximum {
                    observed: observed.to_string(),
                    maximum: max.to_string(),
                });
            }
        }
        Ok(())
    }
}
