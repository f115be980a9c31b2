mod common;

use common::{two_bus, two_bus_exact};
use powerflow_nr::{runpf, runpf_from, Divergence, PFOpt, PfStatus};

#[test]
fn matches_closed_form() {
    for &(r, x, p, q) in &[
        (0.01, 0.1, 0.5, 0.2),
        (0.0, 0.1, 1.0, 0.0),
        (0.05, 0.2, 0.3, -0.1),
        (0.02, 0.08, 0.0, 0.0),
    ] {
        let sol = runpf(&two_bus(r, x, p, q), &PFOpt::default()).unwrap();
        assert!(sol.converged(), "r={} x={} p={} q={}", r, x, p, q);
        let (vm, va) = two_bus_exact(r, x, p, q);
        assert!((sol.v.vm[1] - vm).abs() < 1e-8, "|V2| {} vs {}", sol.v.vm[1], vm);
        assert!((sol.v.va[1] - va).abs() < 1e-8, "angle {} vs {}", sol.v.va[1], va);
    }
}

#[test]
fn lossless_line_angle() {
    // unity power factor over a pure reactance: sin(2δ) = 2xP, V2 = cos δ
    let (x, p) = (0.1, 1.0);
    let sol = runpf(&two_bus(0.0, x, p, 0.0), &PFOpt::default()).unwrap();
    let delta = (2.0 * x * p).asin() / 2.0;
    assert!((sol.v.va[1] + delta).abs() < 1e-8);
    assert!((sol.v.vm[1] - delta.cos()).abs() < 1e-8);
    assert!(sol.losses().re.abs() < 1e-9);
}

#[test]
fn resolve_is_idempotent() {
    let net = two_bus(0.01, 0.1, 0.5, 0.2);
    let opt = PFOpt::default();
    let first = runpf(&net, &opt).unwrap();
    let again = runpf_from(&net, &opt, &first.v).unwrap();
    assert!(again.converged());
    assert!(again.iterations <= 1);
    assert!((again.v.vm[1] - first.v.vm[1]).abs() < 1e-10);
}

#[test]
fn load_beyond_transfer_capability_diverges() {
    // maximum unity power factor transfer over x = 0.1 is 5 p.u.
    let net = two_bus(0.0, 0.1, 10.0, 0.0);
    let opt = PFOpt::default();
    let sol = runpf(&net, &opt).unwrap();
    assert_eq!(sol.status, PfStatus::Diverged);
    assert_eq!(sol.divergence, Some(Divergence::MaxIterations));
    assert_eq!(sol.iterations, opt.max_iterations);
    let f = sol.last_mismatch.unwrap();
    assert_eq!(f.len(), 2);
}

#[test]
fn iteration_ceiling_is_respected() {
    let net = two_bus(0.01, 0.1, 0.5, 0.2);
    for max in 0..3 {
        let sol = runpf(&net, &PFOpt::default().with_max_iterations(max)).unwrap();
        assert_eq!(sol.status, PfStatus::Diverged);
        assert_eq!(sol.divergence, Some(Divergence::MaxIterations));
        assert_eq!(sol.iterations, max);
    }
}
