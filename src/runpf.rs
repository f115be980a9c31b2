use crate::debug::format_polar;
use crate::error::NetworkError;
use crate::linsolve::DenseLU;
use crate::network::{BusIndex, Network};
use crate::newton::{newtonpf, LogProgress, NewtonResult, NewtonState};
use crate::pfopt::{GenQLimits, PFOpt};
use crate::pfsoln::{branch_flows, gen_dispatch};
use crate::qlim::{find_violations, reclassify};
use crate::sbus::make_sbus;
use crate::solution::{PfStatus, PowerFlowSolution, Reclassification};
use crate::state::VoltageState;
use crate::ybus::make_ybus;

use anyhow::Result;
use std::time::Instant;

/// Runs an AC power flow, enforcing generator reactive limits according
/// to `opt.enforce_q_limits`.
///
/// Only a malformed network is returned as an error (a `NetworkError`).
/// Divergence and exhausted reclassification rounds are reported through
/// the solution status.
pub fn runpf(network: &Network, opt: &PFOpt) -> Result<PowerFlowSolution> {
    network.validate()?;
    let idx = BusIndex::new(network)?;
    let v0 = VoltageState::initial(network, &idx, opt.flat_start);
    solve(network, opt, v0)
}

/// Like `runpf`, but starts from the given voltages. Setpoints of PV and
/// slack buses still override the supplied values.
pub fn runpf_from(network: &Network, opt: &PFOpt, v0: &VoltageState) -> Result<PowerFlowSolution> {
    network.validate()?;
    let nb = network.nb();
    if let Some(actual) = [v0.vm.len(), v0.va.len()].into_iter().find(|&n| n != nb) {
        return Err(NetworkError::StateLength {
            expected: nb,
            actual,
        }
        .into());
    }
    let idx = BusIndex::new(network)?;
    let mut v = v0.clone();
    v.impose_setpoints(network, &idx);
    solve(network, opt, v)
}

fn solve(network: &Network, opt: &PFOpt, mut v: VoltageState) -> Result<PowerFlowSolution> {
    let t0 = Instant::now();
    let qlim = opt.enforce_q_limits != GenQLimits::IgnoreLimits;

    // Bus types never change the admittances, so one Ybus serves every round.
    let y_bus = make_ybus(network)?;

    let solver = DenseLU::default();
    let progress = LogProgress {};

    let mut snapshot = network.clone();
    let mut its = 0; // total iterations
    let mut rounds = 0;
    let mut reclassified = Vec::new();

    loop {
        let idx = BusIndex::new(&snapshot)?;
        let s_spec = make_sbus(&snapshot)?;
        v.impose_setpoints(&snapshot, &idx);

        let NewtonResult {
            state,
            v: v_new,
            iterations,
            mismatch,
        } = newtonpf(&y_bus, &s_spec, &v, &idx, &solver, opt, Some(&progress));
        its += iterations;
        v = v_new;

        let (status, divergence) = match state {
            NewtonState::Diverged(reason) => (PfStatus::Diverged, Some(reason)),
            _ => {
                let violations =
                    find_violations(&snapshot, &idx, &mismatch.s_calc, opt.enforce_q_limits)?;
                if violations.is_empty() {
                    (PfStatus::Converged, None)
                } else if rounds >= opt.max_reclassification_rounds {
                    log::warn!(
                        "{} generator bus(es) still outside reactive limits after {} rounds",
                        violations.len(),
                        rounds
                    );
                    (PfStatus::MaxRoundsExceeded, None)
                } else {
                    rounds += 1;
                    reclassified.extend(violations.iter().map(|vi| Reclassification {
                        bus_id: snapshot.buses[vi.bus].id,
                        limit: vi.limit,
                        qg: vi.bound,
                        round: rounds,
                    }));
                    snapshot = reclassify(&snapshot, &violations);
                    continue;
                }
            }
        };

        log::debug!("V: {}", format_polar(&v));
        let vc = v.to_complex();
        let solution = PowerFlowSolution {
            status,
            divergence,
            base_mva: snapshot.base_mva,
            bus_ids: snapshot.buses.iter().map(|b| b.id).collect(),
            bus_types: idx.effective_types(snapshot.nb()),
            branch_flows: branch_flows(&snapshot, &y_bus, &vc),
            gen_dispatch: gen_dispatch(&snapshot, &idx, &mismatch.s_calc),
            s_bus: mismatch.s_calc,
            last_mismatch: divergence.map(|_| mismatch.f),
            v,
            iterations: its,
            rounds,
            reclassified,
        };

        match status {
            PfStatus::Converged => log::info!(
                "Power flow converged in {} iterations ({} reclassification rounds{}) in {:?}.",
                its,
                rounds,
                if qlim { "" } else { ", limits ignored" },
                t0.elapsed()
            ),
            _ => log::info!("Power flow did not converge: {:?} after {} iterations.", status, its),
        }
        return Ok(solution);
    }
}
