//! Core time and ratio types.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::ops::{Add, Sub};

/// Resolution of the global (stream-independent) seek timestamp: microseconds.
pub const GLOBAL_TIME_BASE: i64 = 1_000_000;

/// Time code in seconds (f64 precision).
#[derive(Copy, Clone, Debug, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct TimeCode(pub f64);

impl TimeCode {
    pub const ZERO: Self = Self(0.0);

    pub fn from_secs(secs: f64) -> Self {
        Self(secs)
    }

    /// Convert a global timestamp (see [`GLOBAL_TIME_BASE`]) to seconds.
    pub fn from_global(timestamp: i64) -> Self {
        Self(timestamp as f64 / GLOBAL_TIME_BASE as f64)
    }

    pub fn as_secs(self) -> f64 {
        self.0
    }

    pub fn as_millis(self) -> f64 {
        self.0 * 1000.0
    }
}

impl Add for TimeCode {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        Self(self.0 + rhs.0)
    }
}

impl Sub for TimeCode {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        Self(self.0 - rhs.0)
    }
}

impl fmt::Display for TimeCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{:.3}s", self.0)
    }
}

/// Rational number, used for track time bases (seconds per unit = num/den).
#[derive(Copy, Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct Rational {
    pub num: u32,
    pub den: u32,
}

impl Rational {
    pub const fn new(num: u32, den: u32) -> Self {
        Self { num, den }
    }

    /// Value as f64. A zero denominator yields infinity or NaN; callers
    /// validate time bases with [`Rational::is_valid_time_base`] first.
    pub fn as_f64(self) -> f64 {
        self.num as f64 / self.den as f64
    }

    pub fn is_valid_time_base(self) -> bool {
        self.den != 0
    }

    /// Reduce `num/den` to lowest terms, approximating with continued
    /// fractions when a term would exceed `max`.
    ///
    /// Returns `None` for a zero denominator.
    pub fn reduce(num: u64, den: u64, max: u32) -> Option<Self> {
        if den == 0 {
            return None;
        }
        let max = max as u64;
        let g = gcd(num, den);
        let (mut num, mut den) = (num / g, den / g);

        // Convergents h/k: a0 is the one before a1.
        let (mut a0n, mut a0d) = (0u64, 1u64);
        let (mut a1n, mut a1d) = (1u64, 0u64);

        if num <= max && den <= max {
            a1n = num;
            a1d = den;
            den = 0;
        }

        while den != 0 {
            let mut x = num / den;
            let next_den = num - den * x;
            let a2n = x.saturating_mul(a1n).saturating_add(a0n);
            let a2d = x.saturating_mul(a1d).saturating_add(a0d);
            if a2n > max || a2d > max {
                if a1n != 0 {
                    x = (max - a0n) / a1n;
                }
                if a1d != 0 {
                    x = x.min((max - a0d) / a1d);
                }
                let lhs = den as u128 * (2 * x as u128 * a1d as u128 + a0d as u128);
                let rhs = num as u128 * a1d as u128;
                if lhs > rhs {
                    a1n = x * a1n + a0n;
                    a1d = x * a1d + a0d;
                }
                break;
            }
            a0n = a1n;
            a0d = a1d;
            a1n = a2n;
            a1d = a2d;
            num = den;
            den = next_den;
        }

        Some(Self {
            num: a1n as u32,
            den: a1d as u32,
        })
    }
}

fn gcd(mut a: u64, mut b: u64) -> u64 {
    while b != 0 {
        let t = a % b;
        a = b;
        b = t;
    }
    a.max(1)
}

impl fmt::Display for Rational {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if self.den == 1 {
            write!(f, "{}", self.num)
        } else {
            write!(f, "{}/{}", self.num, self.den)
        }
    }
}
