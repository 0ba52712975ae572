//! Force unit conversion.
//!
//! Values are normalized through kilograms-force.

use crate::sensors::types::ForceUnit;

/// Pounds-force per kilogram-force.
pub const LBF_PER_KGF: f64 = 2.20462;

/// Newtons per kilogram-force (standard gravity).
pub const N_PER_KGF: f64 = 9.80665;

fn to_kgf(value: f64, from: ForceUnit) -> f64 {
    match from {
        ForceUnit::Kg => value,
        ForceUnit::N => value / N_PER_KGF,
        ForceUnit::Lbf => value / LBF_PER_KGF,
    }
}

fn from_kgf(value: f64, to: ForceUnit) -> f64 {
    match to {
        ForceUnit::Kg => value,
        ForceUnit::N => value * N_PER_KGF,
        ForceUnit::Lbf => value * LBF_PER_KGF,
    }
}

/// Convert a force value between units.
pub fn convert(value: f64, from: ForceUnit, to: ForceUnit) -> f64 {
    if from == to {
        return value;
    }
    from_kgf(to_kgf(value, from), to)
}
