use crate::network::BusIndex;
use crate::state::VoltageState;
use crate::ybus::YBus;

use nalgebra::DMatrix;
use num_complex::Complex64;

const J: Complex64 = Complex64 { re: 0.0, im: 1.0 };

/// Computes partial derivatives of the calculated bus injections with
/// respect to voltage angle and magnitude, for all buses.
///
/// ```text
/// dSbus/dVa = 1j * diagV * conj(diagIbus - Ybus * diagV)
/// dSbus/dVm = diagV * conj(Ybus * diagVnorm) + conj(diagIbus) * diagVnorm
/// ```
pub fn d_sbus_d_v(
    y_bus: &YBus,
    v: &[Complex64],
) -> (DMatrix<Complex64>, DMatrix<Complex64>) {
    let nb = v.len();
    let i_bus = y_bus.currents(v);
    let v_norm: Vec<Complex64> = v.iter().map(|v| *v / v.norm()).collect();
    let y = &y_bus.y_bus;

    let d_sbus_d_va = DMatrix::from_fn(nb, nb, |i, k| {
        let diag = if i == k { i_bus[i] } else { Complex64::default() };
        J * v[i] * (diag - y[(i, k)] * v[k]).conj()
    });
    let d_sbus_d_vm = DMatrix::from_fn(nb, nb, |i, k| {
        let off = v[i] * (y[(i, k)] * v_norm[k]).conj();
        if i == k {
            off + i_bus[i].conj() * v_norm[i]
        } else {
            off
        }
    });

    (d_sbus_d_va, d_sbus_d_vm)
}

/// Power flow Jacobian partitioned into the classical blocks
///
/// ```text
///   | H  N |   | dP/dθ  dP/d|V| |
///   |      | = |                |
///   | M  L |   | dQ/dθ  dQ/d|V| |
/// ```
///
/// Rows follow the mismatch layout `[P(pvpq); Q(pq)]` and columns the
/// unknowns `[θ(pvpq); |V|(pq)]`. `N` and `L` are taken with respect to
/// `|V|` itself, so a solve against the mismatch gives an additive
/// magnitude correction.
#[derive(Debug, Clone, PartialEq)]
pub struct Jacobian {
    pub h: DMatrix<f64>,
    pub n: DMatrix<f64>,
    pub m: DMatrix<f64>,
    pub l: DMatrix<f64>,
}

impl Jacobian {
    pub fn dim(&self) -> usize {
        self.h.nrows() + self.m.nrows()
    }

    /// Composes the blocks into one square matrix.
    pub fn to_matrix(&self) -> DMatrix<f64> {
        let (np, nq) = (self.h.nrows(), self.m.nrows());
        let mut jac = DMatrix::zeros(np + nq, np + nq);
        jac.view_mut((0, 0), (np, np)).copy_from(&self.h);
        jac.view_mut((0, np), (np, nq)).copy_from(&self.n);
        jac.view_mut((np, 0), (nq, np)).copy_from(&self.m);
        jac.view_mut((np, np), (nq, nq)).copy_from(&self.l);
        jac
    }

    pub fn is_finite(&self) -> bool {
        [&self.h, &self.n, &self.m, &self.l]
            .iter()
            .all(|b| b.iter().all(|x| x.is_finite()))
    }
}

/// Forms the reduced Jacobian used in the Newton update.
///
/// The slack bus has no row or column at all, and PV buses have no
/// reactive row and no magnitude column.
pub fn make_jac(y_bus: &YBus, v: &VoltageState, idx: &BusIndex) -> Jacobian {
    let (d_sbus_d_va, d_sbus_d_vm) = d_sbus_d_v(y_bus, &v.to_complex());

    let jac = Jacobian {
        h: select(&d_sbus_d_va, &idx.pvpq, &idx.pvpq, |s| s.re),
        n: select(&d_sbus_d_vm, &idx.pvpq, &idx.pq, |s| s.re),
        m: select(&d_sbus_d_va, &idx.pq, &idx.pvpq, |s| s.im),
        l: select(&d_sbus_d_vm, &idx.pq, &idx.pq, |s| s.im),
    };
    log::trace!("J:\n{}", jac.to_matrix());
    jac
}

fn select(
    d: &DMatrix<Complex64>,
    rows: &[usize],
    cols: &[usize],
    part: fn(&Complex64) -> f64,
) -> DMatrix<f64> {
    DMatrix::from_fn(rows.len(), cols.len(), |r, c| part(&d[(rows[r], cols[c])]))
}
