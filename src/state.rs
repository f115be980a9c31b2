use crate::network::{BusIndex, Network};

use num_complex::Complex64;
use std::f64::consts::PI;

/// Polar bus voltages, indexed in bus order. Angles are in radians.
#[derive(Debug, Clone, PartialEq)]
pub struct VoltageState {
    pub vm: Vec<f64>,
    pub va: Vec<f64>,
}

impl VoltageState {
    pub fn new(vm: Vec<f64>, va: Vec<f64>) -> Self {
        debug_assert_eq!(vm.len(), va.len());
        Self { vm, va }
    }

    /// 1.0∠0 at every bus.
    pub fn flat(nb: usize) -> Self {
        Self::new(vec![1.0; nb], vec![0.0; nb])
    }

    /// Initial state for a solve.
    ///
    /// With `flat` set, PQ buses start at 1.0∠0 and PV buses at their
    /// setpoint with zero angle; otherwise the bus `vm`/`va` values are
    /// used as given. The slack angle and the PV/slack magnitudes always
    /// come from the bus data.
    pub fn initial(network: &Network, idx: &BusIndex, flat: bool) -> Self {
        let mut state = if flat {
            Self::flat(network.nb())
        } else {
            Self::new(
                network.buses.iter().map(|b| b.vm).collect(),
                network.buses.iter().map(|b| b.va * PI / 180.0).collect(),
            )
        };
        state.impose_setpoints(network, idx);
        state
    }

    /// Forces the quantities that are not unknowns back to their setpoints.
    pub fn impose_setpoints(&mut self, network: &Network, idx: &BusIndex) {
        let slack = &network.buses[idx.slack];
        self.vm[idx.slack] = slack.vm;
        self.va[idx.slack] = slack.va * PI / 180.0;
        for &i in &idx.pv {
            self.vm[i] = network.buses[i].vm;
        }
    }

    pub fn to_complex(&self) -> Vec<Complex64> {
        self.vm
            .iter()
            .zip(&self.va)
            .map(|(&vm, &va)| Complex64::from_polar(vm, va))
            .collect()
    }

    pub fn len(&self) -> usize {
        self.vm.len()
    }

    pub fn is_empty(&self) -> bool {
        self.vm.is_empty()
    }

    pub fn va_degrees(&self) -> Vec<f64> {
        self.va.iter().map(|va| va * 180.0 / PI).collect()
    }
}
