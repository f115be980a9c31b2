use crate::error::NetworkError;
use crate::network::{BusIndex, BusType, Network};
use crate::pfopt::GenQLimits;

use num_complex::Complex64;

/// Which reactive bound a generator bus ran into.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum QLimit {
    Min,
    Max,
}

/// A PV bus whose generators cannot supply the reactive power needed to
/// hold its voltage setpoint.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Violation {
    /// Bus index (not id).
    pub bus: usize,
    pub limit: QLimit,
    /// Total generator reactive output required at the converged state.
    pub qg: f64,
    /// The violated aggregate bound.
    pub bound: f64,
}

impl Violation {
    pub fn excess(&self) -> f64 {
        (self.qg - self.bound).abs()
    }
}

/// Aggregate reactive limits of the in-service generators at each bus.
/// Buses without generators get `(0, 0)`.
pub fn bus_q_limits(network: &Network) -> Result<Vec<(f64, f64)>, NetworkError> {
    let lookup = network.bus_lookup()?;
    let mut limits = vec![(0.0, 0.0); network.nb()];
    for g in network.generators.iter().filter(|g| g.is_on()) {
        if let Some(&i) = lookup.get(&g.bus) {
            limits[i].0 += g.qmin;
            limits[i].1 += g.qmax;
        }
    }
    Ok(limits)
}

/// Total generator reactive output at bus `i`: calculated injection plus
/// local reactive load.
pub fn gen_q(network: &Network, s_calc: &[Complex64], i: usize) -> f64 {
    s_calc[i].im + network.buses[i].qd
}

/// Finds PV buses whose generator reactive output lies outside the
/// aggregate `[Qmin, Qmax]` of their generators.
///
/// With `GenQLimits::OneAtATime` only the largest violation is returned.
pub fn find_violations(
    network: &Network,
    idx: &BusIndex,
    s_calc: &[Complex64],
    mode: GenQLimits,
) -> Result<Vec<Violation>, NetworkError> {
    if mode == GenQLimits::IgnoreLimits {
        return Ok(Vec::new());
    }
    let limits = bus_q_limits(network)?;

    let mut violations: Vec<Violation> = idx
        .pv
        .iter()
        .filter_map(|&i| {
            let qg = gen_q(network, s_calc, i);
            let (qmin, qmax) = limits[i];
            if qg > qmax {
                Some(Violation {
                    bus: i,
                    limit: QLimit::Max,
                    qg,
                    bound: qmax,
                })
            } else if qg < qmin {
                Some(Violation {
                    bus: i,
                    limit: QLimit::Min,
                    qg,
                    bound: qmin,
                })
            } else {
                None
            }
        })
        .collect();

    if mode == GenQLimits::OneAtATime {
        if let Some(worst) = violations
            .iter()
            .copied()
            .max_by(|a, b| a.excess().total_cmp(&b.excess()))
        {
            violations = vec![worst];
        }
    }
    Ok(violations)
}

/// Produces the next network snapshot: each violating bus becomes PQ and
/// every in-service generator on it is fixed at its own violated bound, so
/// that the bus total equals the aggregate bound.
pub fn reclassify(network: &Network, violations: &[Violation]) -> Network {
    let mut kinds = network.bus_types();
    let mut snapshot = network.clone();

    for v in violations {
        let id = network.buses[v.bus].id;
        kinds[v.bus] = BusType::PQ;
        for g in snapshot
            .generators
            .iter_mut()
            .filter(|g| g.is_on() && g.bus == id)
        {
            g.qg = match v.limit {
                QLimit::Max => g.qmax,
                QLimit::Min => g.qmin,
            };
        }
        log::info!(
            "Gen at bus {} hit Q{} limit: Qg = {:.6} p.u., fixed at {:.6} p.u., converted to PQ",
            id,
            match v.limit {
                QLimit::Max => "max",
                QLimit::Min => "min",
            },
            v.qg,
            v.bound
        );
    }

    snapshot.with_bus_types(&kinds)
}
