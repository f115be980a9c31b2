use crate::debug::{format_f64_vec, format_polar, format_rect_vec};
use crate::error::Divergence;
use crate::jac::make_jac;
use crate::linsolve::LinearSolver;
use crate::mismatch::{power_mismatch, Mismatch};
use crate::network::BusIndex;
use crate::newton::ProgressMonitor;
use crate::pfopt::PFOpt;
use crate::state::VoltageState;
use crate::ybus::YBus;

use num_complex::Complex64;
use std::f64::consts::PI;

/// States of a Newton-Raphson run.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum NewtonState {
    /// Voltage state loaded, mismatch not yet checked.
    Init,
    /// Mismatch evaluated; either terminate or take a Newton step.
    Iterate,
    Converged,
    Diverged(Divergence),
}

/// Outcome of one Newton-Raphson run.
#[derive(Debug, Clone, PartialEq)]
pub struct NewtonResult {
    /// Terminal state: `Converged` or `Diverged`.
    pub state: NewtonState,
    /// Final voltages. Meaningless as a solution unless converged.
    pub v: VoltageState,
    /// Number of Newton updates applied.
    pub iterations: usize,
    /// Mismatch at the final voltages.
    pub mismatch: Mismatch,
}

impl NewtonResult {
    pub fn converged(&self) -> bool {
        self.state == NewtonState::Converged
    }

    pub fn divergence(&self) -> Option<Divergence> {
        match self.state {
            NewtonState::Diverged(reason) => Some(reason),
            _ => None,
        }
    }
}

/// Solves power flow using full Newton's method (power/polar).
///
/// Solves for bus voltages using a full Newton-Raphson method, using nodal
/// power balance equations and polar coordinate representation of
/// voltages. The unknowns are the angles of all non-slack buses and the
/// magnitudes of PQ buses; everything else in `v0` is held fixed.
///
/// Numerical trouble never escapes as an error: a singular Jacobian or a
/// non-finite mismatch ends the run in `NewtonState::Diverged`.
pub fn newtonpf(
    y_bus: &YBus,
    s_spec: &[Complex64],
    v0: &VoltageState,
    idx: &BusIndex,
    solver: &dyn LinearSolver,
    opt: &PFOpt,
    progress: Option<&dyn ProgressMonitor>,
) -> NewtonResult {
    let mut nr = NewtonRaphson::new(y_bus, s_spec, v0, idx, solver, opt, progress);
    let mut state = NewtonState::Init;
    let state = loop {
        state = match state {
            NewtonState::Init => nr.init(),
            NewtonState::Iterate => nr.iterate(),
            terminal => break terminal,
        };
    };

    match state {
        NewtonState::Converged => log::info!(
            "Newton's method power flow (power balance, polar) converged in {} iterations.",
            nr.i
        ),
        NewtonState::Diverged(reason) => log::info!(
            "Newton's method power flow (power balance, polar) did not converge in {} iterations: {}.",
            nr.i,
            reason
        ),
        _ => {}
    }

    NewtonResult {
        state,
        v: nr.v,
        iterations: nr.i,
        mismatch: nr.mis,
    }
}

struct NewtonRaphson<'a> {
    y_bus: &'a YBus,
    s_spec: &'a [Complex64],
    idx: &'a BusIndex,
    solver: &'a dyn LinearSolver,
    opt: &'a PFOpt,
    progress: Option<&'a dyn ProgressMonitor>,

    v: VoltageState,
    mis: Mismatch,
    i: usize,
}

impl<'a> NewtonRaphson<'a> {
    fn new(
        y_bus: &'a YBus,
        s_spec: &'a [Complex64],
        v0: &VoltageState,
        idx: &'a BusIndex,
        solver: &'a dyn LinearSolver,
        opt: &'a PFOpt,
        progress: Option<&'a dyn ProgressMonitor>,
    ) -> Self {
        Self {
            y_bus,
            s_spec,
            idx,
            solver,
            opt,
            progress,
            v: v0.clone(),
            mis: Mismatch::default(),
            i: 0,
        }
    }

    /// Evaluates the mismatch at the starting voltages.
    fn init(&mut self) -> NewtonState {
        log::debug!("V0: {}", format_polar(&self.v));
        log::trace!("Sbus: {}", format_rect_vec(self.s_spec));

        // evaluate F(x0)
        self.mis = power_mismatch(self.y_bus, &self.v, self.s_spec, self.idx);
        NewtonState::Iterate
    }

    /// Checks the current mismatch and, unless the run is over, applies
    /// one Newton update.
    fn iterate(&mut self) -> NewtonState {
        if !self.mis.is_finite() {
            log::warn!("non-finite mismatch at iteration {}", self.i);
            return NewtonState::Diverged(Divergence::NonFinite);
        }

        // check tolerance
        let norm_f = self.mis.norm_inf();
        if let Some(pm) = self.progress {
            pm.update(self.i, norm_f);
        }
        log::debug!("norm_f{}: {}", self.i, norm_f);
        if norm_f < self.opt.tolerance {
            return NewtonState::Converged;
        }
        if self.i >= self.opt.max_iterations {
            return NewtonState::Diverged(Divergence::MaxIterations);
        }

        // evaluate Jacobian
        let jac = make_jac(self.y_bus, &self.v, self.idx);
        if !jac.is_finite() {
            log::warn!("non-finite Jacobian at iteration {}", self.i);
            return NewtonState::Diverged(Divergence::NonFinite);
        }

        // compute update step
        let mut dx = self.mis.f.clone();
        if let Err(err) = self.solver.solve(jac.to_matrix(), &mut dx) {
            log::warn!("linear solve failed at iteration {}: {}", self.i, err);
            return NewtonState::Diverged(Divergence::SingularJacobian);
        }
        log::trace!("dx: {}", format_f64_vec(&dx));

        // update voltage
        let np = self.idx.pvpq.len();
        for (&b, dva) in self.idx.pvpq.iter().zip(&dx[..np]) {
            self.v.va[b] += dva;
        }
        for (&b, dvm) in self.idx.pq.iter().zip(&dx[np..]) {
            self.v.vm[b] += dvm;
            // fold a negative magnitude back into the angle
            if self.v.vm[b] < 0.0 {
                self.v.vm[b] = -self.v.vm[b];
                self.v.va[b] += PI;
            }
        }
        self.i += 1;
        log::debug!("V_{}: {}", self.i, format_polar(&self.v));

        // evalute F(x)
        self.mis = power_mismatch(self.y_bus, &self.v, self.s_spec, self.idx);
        NewtonState::Iterate
    }
}
