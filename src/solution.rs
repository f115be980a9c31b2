use crate::error::Divergence;
use crate::network::BusType;
use crate::qlim::QLimit;
use crate::state::VoltageState;

use num_complex::Complex64;

/// Overall outcome of a power flow solve.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PfStatus {
    Converged,
    /// A Newton run failed; see `PowerFlowSolution::divergence`.
    Diverged,
    /// Reactive limits were still violated after the last allowed round.
    MaxRoundsExceeded,
}

/// Complex power entering a branch at each end, in p.u.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchFlow {
    pub from: usize,
    pub to: usize,
    pub s_from: Complex64,
    pub s_to: Complex64,
}

impl BranchFlow {
    /// Series and charging losses.
    pub fn loss(&self) -> Complex64 {
        self.s_from + self.s_to
    }
}

/// Solved generator output, p.u.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct GenDispatch {
    pub pg: f64,
    pub qg: f64,
}

/// A PV bus switched to PQ by the reactive limit controller.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Reclassification {
    pub bus_id: usize,
    pub limit: QLimit,
    /// Aggregate reactive output the bus is held at.
    pub qg: f64,
    /// 1-based controller round in which the switch happened.
    pub round: usize,
}

/// Everything handed back to a reporting collaborator.
///
/// The result is only physically meaningful when `status` is
/// `PfStatus::Converged`; callers must check it.
#[derive(Debug, Clone, PartialEq)]
pub struct PowerFlowSolution {
    pub status: PfStatus,
    pub divergence: Option<Divergence>,

    pub base_mva: f64,
    pub bus_ids: Vec<usize>,
    /// Bus types as finally solved, including PV to PQ switches.
    pub bus_types: Vec<BusType>,
    pub v: VoltageState,

    /// Calculated bus injections at the final voltages.
    pub s_bus: Vec<Complex64>,
    pub branch_flows: Vec<BranchFlow>,
    pub gen_dispatch: Vec<GenDispatch>,

    /// Newton iterations summed over all runs.
    pub iterations: usize,
    /// Reclassification rounds performed.
    pub rounds: usize,
    pub reclassified: Vec<Reclassification>,

    /// Mismatch vector at the final state of a diverged run.
    pub last_mismatch: Option<Vec<f64>>,
}

impl PowerFlowSolution {
    pub fn converged(&self) -> bool {
        self.status == PfStatus::Converged
    }

    /// Position of `id` in bus order.
    pub fn bus_index(&self, id: usize) -> Option<usize> {
        self.bus_ids.iter().position(|&b| b == id)
    }

    /// Total branch losses.
    pub fn losses(&self) -> Complex64 {
        self.branch_flows.iter().map(|f| f.loss()).sum()
    }
}
