use crate::network::Network;
use crate::pfopt::PFOpt;
use crate::runpf::runpf;
use crate::solution::PowerFlowSolution;

use anyhow::{Context, Result};
use rayon::prelude::*;
use rayon::ThreadPoolBuilder;

/// Solves independent cases in parallel on the global rayon pool.
///
/// Results come back in input order. A malformed case fails on its own
/// without affecting the others.
pub fn runpf_batch(networks: &[Network], opt: &PFOpt) -> Vec<Result<PowerFlowSolution>> {
    networks.par_iter().map(|net| runpf(net, opt)).collect()
}

/// Like `runpf_batch`, but on a dedicated pool of `threads` workers
/// (`0` picks rayon's default).
pub fn runpf_batch_with_threads(
    networks: &[Network],
    opt: &PFOpt,
    threads: usize,
) -> Result<Vec<Result<PowerFlowSolution>>> {
    let pool = ThreadPoolBuilder::new()
        .num_threads(threads)
        .build()
        .context("building thread pool for batch power flow")?;
    let results = pool.install(|| runpf_batch(networks, opt));

    let failed = results
        .iter()
        .filter(|r| !matches!(r, Ok(sol) if sol.converged()))
        .count();
    log::info!("Batch of {} cases: {} did not converge.", results.len(), failed);
    Ok(results)
}
