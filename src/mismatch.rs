use crate::network::BusIndex;
use crate::state::VoltageState;
use crate::ybus::YBus;

use num_complex::Complex64;

/// Power mismatch at one voltage state.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Mismatch {
    /// Calculated injection `V·conj(Y·V)` at every bus.
    pub s_calc: Vec<Complex64>,
    /// `[ΔP(pvpq); ΔQ(pq)]` with `Δ = specified − calculated`. Row order
    /// matches the Jacobian.
    pub f: Vec<f64>,
}

impl Mismatch {
    pub fn norm_inf(&self) -> f64 {
        norm_inf(&self.f)
    }

    pub fn is_finite(&self) -> bool {
        self.f.iter().all(|f| f.is_finite())
    }

    pub fn dp(&self, idx: &BusIndex) -> &[f64] {
        &self.f[..idx.pvpq.len()]
    }

    pub fn dq(&self, idx: &BusIndex) -> &[f64] {
        &self.f[idx.pvpq.len()..]
    }
}

/// Evaluates the mismatch vector.
///
/// ΔP is produced for every non-slack bus and ΔQ for PQ buses only, both
/// in bus order.
pub fn power_mismatch(
    y_bus: &YBus,
    v: &VoltageState,
    s_spec: &[Complex64],
    idx: &BusIndex,
) -> Mismatch {
    let s_calc = y_bus.injections(&v.to_complex());

    let f = idx
        .pvpq
        .iter()
        .map(|&i| s_spec[i].re - s_calc[i].re)
        .chain(idx.pq.iter().map(|&i| s_spec[i].im - s_calc[i].im))
        .collect();

    Mismatch { s_calc, f }
}

/// Computes the infinity norm: `max(abs(a))`. Zero for an empty slice.
pub fn norm_inf(a: &[f64]) -> f64 {
    a.iter().fold(0.0, |max, v| f64::max(max, v.abs()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::sbus::make_sbus;
    use crate::test_utils::three_bus;
    use crate::ybus::make_ybus;

    #[test]
    fn layout_is_dp_then_dq() {
        let net = three_bus();
        let idx = BusIndex::new(&net).unwrap();
        let y_bus = make_ybus(&net).unwrap();
        let s_spec = make_sbus(&net).unwrap();
        let v = VoltageState::initial(&net, &idx, true);

        let mis = power_mismatch(&y_bus, &v, &s_spec, &idx);
        assert_eq!(mis.f.len(), 3);
        assert_eq!(mis.dp(&idx).len(), 2);
        assert_eq!(mis.dq(&idx).len(), 1);

        let s = y_bus.injections(&v.to_complex());
        assert_eq!(mis.f[0], s_spec[1].re - s[1].re);
        assert_eq!(mis.f[1], s_spec[2].re - s[2].re);
        assert_eq!(mis.f[2], s_spec[2].im - s[2].im);
    }

    #[test]
    fn zero_at_consistent_injection() {
        let net = three_bus();
        let idx = BusIndex::new(&net).unwrap();
        let y_bus = make_ybus(&net).unwrap();
        let v = VoltageState::new(vec![1.02, 1.0, 0.97], vec![0.0, -0.05, -0.1]);
        // Specify exactly what this state produces.
        let s_spec = y_bus.injections(&v.to_complex());
        let mis = power_mismatch(&y_bus, &v, &s_spec, &idx);
        assert_eq!(mis.norm_inf(), 0.0);
    }

    #[test]
    fn norm_inf_of_empty_is_zero() {
        assert_eq!(norm_inf(&[]), 0.0);
        assert_eq!(norm_inf(&[1.0, -3.0, 2.0]), 3.0);
    }
}
