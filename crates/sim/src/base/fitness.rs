use std::fmt;
use std::ops::{Add, Mul};

use serde::{Deserialize, Serialize};

/// A relative fitness value, constrained to be non-negative.
///
/// Beneficial alleles push fitness above 1.0, so there is no upper bound.
/// Zero fitness means the individual can never be chosen as a parent.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct FitnessValue(f64);

impl FitnessValue {
    pub const NEUTRAL: Self = Self(1.0);
    pub const LETHAL: Self = Self(0.0);

    /// Creates a new FitnessValue, clamping negative input to 0.0.
    pub fn new(value: f64) -> Self {
        Self(value.max(0.0))
    }

    /// Returns the inner f64 value.
    pub fn get(self) -> f64 {
        self.0
    }

    /// Converts to the log-scale fitness value.
    pub fn ln(self) -> LogFitnessValue {
        LogFitnessValue::from(self)
    }

    pub fn is_lethal(self) -> bool {
        self.0 == 0.0
    }
}

impl From<FitnessValue> for f64 {
    fn from(fitness: FitnessValue) -> Self {
        fitness.0
    }
}

impl From<f64> for FitnessValue {
    fn from(value: f64) -> Self {
        Self::new(value)
    }
}

impl Default for FitnessValue {
    fn default() -> Self {
        Self::NEUTRAL
    }
}

impl fmt::Display for FitnessValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Mul for FitnessValue {
    type Output = Self;

    fn mul(self, rhs: Self) -> Self::Output {
        Self::new(self.0 * rhs.0)
    }
}

/// A log-scale fitness value (natural logarithm of fitness).
///
/// Summing effects in log space avoids underflow when many sites act on one
/// individual. `-∞` represents zero fitness.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd, Serialize, Deserialize)]
pub struct LogFitnessValue(f64);

impl LogFitnessValue {
    pub fn new(log_value: f64) -> Self {
        Self(log_value)
    }

    pub fn get(self) -> f64 {
        self.0
    }

    /// Converts to the linear-scale fitness value.
    pub fn exp(self) -> FitnessValue {
        FitnessValue::new(self.0.exp())
    }

    /// Returns true if this represents zero fitness (log = -∞).
    pub fn is_zero_fitness(self) -> bool {
        self.0.is_infinite() && self.0.is_sign_negative()
    }
}

impl From<FitnessValue> for LogFitnessValue {
    fn from(fitness: FitnessValue) -> Self {
        Self(fitness.get().ln())
    }
}

impl From<LogFitnessValue> for FitnessValue {
    fn from(log_fitness: LogFitnessValue) -> Self {
        log_fitness.exp()
    }
}

impl Default for LogFitnessValue {
    fn default() -> Self {
        Self(0.0)
    }
}

impl fmt::Display for LogFitnessValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl Add for LogFitnessValue {
    type Output = Self;

    /// In log space: ln(a × b) = ln(a) + ln(b).
    fn add(self, other: Self) -> Self::Output {
        Self(self.0 + other.0)
    }
}
