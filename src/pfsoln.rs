use crate::network::{BusIndex, Network};
use crate::solution::{BranchFlow, GenDispatch};
use crate::ybus::YBus;

use itertools::izip;
use num_complex::Complex64;
use std::collections::HashMap;

/// Complex power entering each branch at both ends, in branch order.
/// Out-of-service branches carry zero flow.
pub fn branch_flows(network: &Network, y_bus: &YBus, v: &[Complex64]) -> Vec<BranchFlow> {
    izip!(&network.branches, &y_bus.branches)
        .map(|(br, ya)| {
            let (s_from, s_to) = if br.is_on() {
                ya.flows(v)
            } else {
                (Complex64::default(), Complex64::default())
            };
            BranchFlow {
                from: br.from,
                to: br.to,
                s_from,
                s_to,
            }
        })
        .collect()
}

/// Generator outputs implied by the solved injections.
///
/// Generators at buses solved as PQ keep their specified output. At PV
/// and slack buses the reactive output is the bus injection plus local
/// load, shared between the bus's generators in proportion to their
/// reactive range. The slack generator takes up the active power balance.
pub fn gen_dispatch(network: &Network, idx: &BusIndex, s_calc: &[Complex64]) -> Vec<GenDispatch> {
    let kinds = idx.effective_types(network.nb());
    let lookup: HashMap<usize, usize> = network
        .buses
        .iter()
        .enumerate()
        .map(|(i, b)| (b.id, i))
        .collect();

    let mut dispatch: Vec<GenDispatch> = network
        .generators
        .iter()
        .map(|g| {
            if g.is_on() {
                GenDispatch { pg: g.pg, qg: g.qg }
            } else {
                GenDispatch::default()
            }
        })
        .collect();

    // Online generators at voltage-controlled buses, grouped by bus index.
    let mut cg: HashMap<usize, Vec<usize>> = HashMap::new();
    for (k, g) in network.generators.iter().enumerate() {
        if !g.is_on() {
            continue;
        }
        if let Some(&i) = lookup.get(&g.bus) {
            if kinds[i] != crate::network::BusType::PQ {
                cg.entry(i).or_default().push(k);
            }
        }
    }

    for (&i, l) in cg.iter() {
        let qg_tot = s_calc[i].im + network.buses[i].qd;
        share_reactive(network, l, qg_tot, &mut dispatch);

        if i == idx.slack {
            // inj P + local Pd, minus what the other gens at this bus produce
            let pg_tot = s_calc[i].re + network.buses[i].pd;
            let others: f64 = l[1..].iter().map(|&k| dispatch[k].pg).sum();
            dispatch[l[0]].pg = pg_tot - others;
        }
    }

    dispatch
}

/// Splits a bus total reactive output between the generators in `l`.
///
/// The split is in proportion to each generator's reactive range, with
/// infinite limits replaced by a proxy large enough to cover every finite
/// quantity at the bus. A bus with zero total range has all generators
/// violate their limits by the same amount.
fn share_reactive(network: &Network, l: &[usize], qg_tot: f64, dispatch: &mut [GenDispatch]) {
    if l.len() == 1 {
        dispatch[l[0]].qg = qg_tot;
        return;
    }
    let n = l.len() as f64;

    // The sum of absolute Qg, Qmax and Qmin for all generators at the bus
    // (where finite). Used as the limit when Qmax/Qmin is infinite.
    let m: f64 = l
        .iter()
        .map(|&k| {
            let g = &network.generators[k];
            let mut mg = (qg_tot / n).abs();
            if g.qmax.is_finite() {
                mg += g.qmax.abs();
            }
            if g.qmin.is_finite() {
                mg += g.qmin.abs();
            }
            mg
        })
        .sum();
    let proxy = |q: f64| {
        if q.is_infinite() {
            m.copysign(q)
        } else {
            q
        }
    };

    let qmin: Vec<f64> = l.iter().map(|&k| proxy(network.generators[k].qmin)).collect();
    let qmax: Vec<f64> = l.iter().map(|&k| proxy(network.generators[k].qmax)).collect();
    let qg_min: f64 = qmin.iter().sum();
    let qg_max: f64 = qmax.iter().sum();

    if (qg_min - qg_max).abs() > 1e-13 {
        let q = (qg_tot - qg_min) / (qg_max - qg_min);
        for (&k, qmin, qmax) in izip!(l, &qmin, &qmax) {
            dispatch[k].qg = qmin + q * (qmax - qmin);
        }
    } else {
        let mis = (qg_tot - qg_min) / n;
        for (&k, qmin) in izip!(l, &qmin) {
            dispatch[k].qg = qmin + mis;
        }
    }
}
