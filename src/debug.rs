use crate::state::VoltageState;

use itertools::Itertools;
use num_complex::Complex64;

pub fn format_f64_vec(v: &[f64]) -> String {
    format!("[{}]", v.iter().map(|x| format!("{:.6e}", x)).join(", "))
}

pub fn format_rect_vec(v: &[Complex64]) -> String {
    format!(
        "[{}]",
        v.iter()
            .map(|s| format!("{:.6}{:+.6}j", s.re, s.im))
            .join(", ")
    )
}

/// Magnitude and angle (degrees) per bus.
pub fn format_polar(v: &VoltageState) -> String {
    format!(
        "[{}]",
        v.vm.iter()
            .zip(v.va_degrees())
            .map(|(vm, va)| format!("{:.6}∠{:.4}°", vm, va))
            .join(", ")
    )
}
