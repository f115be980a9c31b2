use crate::error::NetworkError;
use crate::network::Network;

use nalgebra::DMatrix;
use num_complex::Complex64;
use std::f64::consts::PI;

/// The 2x2 admittance stamp of one branch, relating its terminal currents
/// to its terminal voltages:
///
/// ```text
///      | If |   | Yff  Yft |   | Vf |
///      |    | = |          | * |    |
///      | It |   | Ytf  Ytt |   | Vt |
/// ```
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BranchAdmittance {
    /// Bus index (not id) of the from end.
    pub f: usize,
    /// Bus index (not id) of the to end.
    pub t: usize,
    pub y_ff: Complex64,
    pub y_ft: Complex64,
    pub y_tf: Complex64,
    pub y_tt: Complex64,
}

impl BranchAdmittance {
    /// Complex power entering the branch at the from and to ends.
    pub fn flows(&self, v: &[Complex64]) -> (Complex64, Complex64) {
        let (vf, vt) = (v[self.f], v[self.t]);
        let i_f = self.y_ff * vf + self.y_ft * vt;
        let i_t = self.y_tf * vf + self.y_tt * vt;
        (vf * i_f.conj(), vt * i_t.conj())
    }
}

/// Bus admittance matrix together with the per-branch stamps it was
/// summed from. Out-of-service branches keep a zero stamp so that branch
/// positions line up with `Network::branches`.
#[derive(Debug, Clone, PartialEq)]
pub struct YBus {
    pub y_bus: DMatrix<Complex64>,
    pub branches: Vec<BranchAdmittance>,
}

impl YBus {
    pub fn nb(&self) -> usize {
        self.y_bus.nrows()
    }

    /// Bus current injections `I = Y·V`.
    pub fn currents(&self, v: &[Complex64]) -> Vec<Complex64> {
        let nb = self.nb();
        (0..nb)
            .map(|i| {
                (0..nb)
                    .map(|j| self.y_bus[(i, j)] * v[j])
                    .fold(Complex64::default(), |acc, x| acc + x)
            })
            .collect()
    }

    /// Calculated bus injections `S = V·conj(Y·V)`.
    pub fn injections(&self, v: &[Complex64]) -> Vec<Complex64> {
        self.currents(v)
            .iter()
            .zip(v)
            .map(|(i, v)| v * i.conj())
            .collect()
    }
}

/// Builds the bus admittance matrix.
///
/// Each in-service branch with series admittance `ys = 1/(r + jx)`,
/// charging `b` and complex tap `t = tap·e^(j·shift)` on the from side
/// contributes
///
/// ```text
///   Ytt = ys + j·b/2
///   Yff = Ytt / (t·conj(t))
///   Yft = -ys / conj(t)
///   Ytf = -ys / t
/// ```
///
/// so both the series and charging terms on the tapped side are scaled by
/// `1/|t|²`. Bus shunts `gs + j·bs` are added to the diagonal. The matrix
/// is symmetric unless some branch has a non-zero phase shift.
pub fn make_ybus(network: &Network) -> Result<YBus, NetworkError> {
    let lookup = network.bus_lookup()?;
    let nb = network.nb();

    let mut y_bus = DMatrix::<Complex64>::zeros(nb, nb);
    let mut branches = Vec::with_capacity(network.branches.len());

    for (i, br) in network.branches.iter().enumerate() {
        let index = |bus: usize| {
            lookup.get(&bus).copied().ok_or(NetworkError::UnknownBus {
                element: "branch",
                index: i,
                bus,
            })
        };
        let (f, t) = (index(br.from)?, index(br.to)?);

        if !br.is_on() {
            let zero = Complex64::default();
            branches.push(BranchAdmittance {
                f,
                t,
                y_ff: zero,
                y_ft: zero,
                y_tf: zero,
                y_tt: zero,
            });
            continue;
        }

        let y_s = Complex64::new(1.0, 0.0) / Complex64::new(br.r, br.x); // series admittance
        let tap = Complex64::from_polar(br.ratio(), br.shift * PI / 180.0); // add phase shifters

        let y_tt = y_s + Complex64::new(0.0, br.b / 2.0);
        let y_ff = y_tt / (tap * tap.conj());
        let y_ft = -y_s / tap.conj();
        let y_tf = -y_s / tap;

        y_bus[(f, f)] += y_ff;
        y_bus[(f, t)] += y_ft;
        y_bus[(t, f)] += y_tf;
        y_bus[(t, t)] += y_tt;

        branches.push(BranchAdmittance {
            f,
            t,
            y_ff,
            y_ft,
            y_tf,
            y_tt,
        });
    }

    for (i, b) in network.buses.iter().enumerate() {
        y_bus[(i, i)] += Complex64::new(b.gs, b.bs);
    }
    log::trace!("Ybus:\n{}", y_bus);

    Ok(YBus { y_bus, branches })
}
