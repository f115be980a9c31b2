use crate::error::NetworkError;
use crate::network::Network;

use num_complex::Complex64;

/// Builds the vector of specified complex bus injections.
///
/// Returns generation minus load per bus, in per unit. Every in-service
/// generator contributes `pg + j·qg`; the reactive part only matters at
/// buses solved as PQ, which is how a generator clamped at a reactive
/// limit keeps its fixed output.
pub fn make_sbus(network: &Network) -> Result<Vec<Complex64>, NetworkError> {
    let lookup = network.bus_lookup()?;

    let mut s_bus: Vec<Complex64> = network
        .buses
        .iter()
        .map(|b| -Complex64::new(b.pd, b.qd))
        .collect();

    for (i, g) in network.generators.iter().enumerate() {
        if !g.is_on() {
            continue;
        }
        let bus = lookup.get(&g.bus).ok_or(NetworkError::UnknownBus {
            element: "generator",
            index: i,
            bus: g.bus,
        })?;
        s_bus[*bus] += Complex64::new(g.pg, g.qg);
    }

    Ok(s_bus)
}
