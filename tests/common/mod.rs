#![allow(dead_code)]

use powerflow_nr::{Branch, Bus, Generator, Network};

/// IEEE 14-bus test system on a 100 MVA base.
pub fn ieee14() -> Network {
    let base_mva = 100.0;

    // id, kind, Pd, Qd (MW, MVAr), Bs (MVAr), Vm
    let bus_data: [(usize, char, f64, f64, f64, f64); 14] = [
        (1, 'S', 0.0, 0.0, 0.0, 1.06),
        (2, 'V', 21.7, 12.7, 0.0, 1.045),
        (3, 'V', 94.2, 19.0, 0.0, 1.01),
        (4, 'Q', 47.8, -3.9, 0.0, 1.0),
        (5, 'Q', 7.6, 1.6, 0.0, 1.0),
        (6, 'V', 11.2, 7.5, 0.0, 1.07),
        (7, 'Q', 0.0, 0.0, 0.0, 1.0),
        (8, 'V', 0.0, 0.0, 0.0, 1.09),
        (9, 'Q', 29.5, 16.6, 19.0, 1.0),
        (10, 'Q', 9.0, 5.8, 0.0, 1.0),
        (11, 'Q', 3.5, 1.8, 0.0, 1.0),
        (12, 'Q', 6.1, 1.6, 0.0, 1.0),
        (13, 'Q', 13.5, 5.8, 0.0, 1.0),
        (14, 'Q', 14.9, 5.0, 0.0, 1.0),
    ];
    let buses = bus_data
        .iter()
        .map(|&(id, kind, pd, qd, bs, vm)| {
            let bus = match kind {
                'S' => Bus::slack(id, vm),
                'V' => Bus::pv(id, vm),
                _ => Bus::pq(id),
            };
            bus.with_load(pd / base_mva, qd / base_mva)
                .with_shunt(0.0, bs / base_mva)
        })
        .collect();

    // from, to, r, x, b, tap
    let branch_data: [(usize, usize, f64, f64, f64, f64); 20] = [
        (1, 2, 0.01938, 0.05917, 0.0528, 0.0),
        (1, 5, 0.05403, 0.22304, 0.0492, 0.0),
        (2, 3, 0.04699, 0.19797, 0.0438, 0.0),
        (2, 4, 0.05811, 0.17632, 0.034, 0.0),
        (2, 5, 0.05695, 0.17388, 0.0346, 0.0),
        (3, 4, 0.06701, 0.17103, 0.0128, 0.0),
        (4, 5, 0.01335, 0.04211, 0.0, 0.0),
        (4, 7, 0.0, 0.20912, 0.0, 0.978),
        (4, 9, 0.0, 0.55618, 0.0, 0.969),
        (5, 6, 0.0, 0.25202, 0.0, 0.932),
        (6, 11, 0.09498, 0.1989, 0.0, 0.0),
        (6, 12, 0.12291, 0.25581, 0.0, 0.0),
        (6, 13, 0.06615, 0.13027, 0.0, 0.0),
        (7, 8, 0.0, 0.17615, 0.0, 0.0),
        (7, 9, 0.0, 0.11001, 0.0, 0.0),
        (9, 10, 0.03181, 0.0845, 0.0, 0.0),
        (9, 14, 0.12711, 0.27038, 0.0, 0.0),
        (10, 11, 0.08205, 0.19207, 0.0, 0.0),
        (12, 13, 0.22092, 0.19988, 0.0, 0.0),
        (13, 14, 0.17093, 0.34802, 0.0, 0.0),
    ];
    let branches = branch_data
        .iter()
        .map(|&(f, t, r, x, b, tap)| Branch::new(f, t, r, x).with_charging(b).with_tap(tap, 0.0))
        .collect();

    // bus, Pg (MW), Qmax, Qmin (MVAr)
    let gen_data: [(usize, f64, f64, f64); 5] = [
        (1, 232.4, 10.0, 0.0),
        (2, 40.0, 50.0, -40.0),
        (3, 0.0, 40.0, 0.0),
        (6, 0.0, 24.0, -6.0),
        (8, 0.0, 24.0, -6.0),
    ];
    let generators = gen_data
        .iter()
        .map(|&(bus, pg, qmax, qmin)| {
            Generator::new(bus, pg / base_mva).with_q_limits(qmin / base_mva, qmax / base_mva)
        })
        .collect();

    Network::new(base_mva, buses, branches, generators)
}

/// Published solution of the IEEE 14-bus case: (|V| p.u., angle degrees).
pub const IEEE14_SOLUTION: [(f64, f64); 14] = [
    (1.060, 0.0),
    (1.045, -4.983),
    (1.010, -12.725),
    (1.018, -10.313),
    (1.020, -8.774),
    (1.070, -14.221),
    (1.062, -13.360),
    (1.090, -13.360),
    (1.056, -14.939),
    (1.051, -15.097),
    (1.057, -14.791),
    (1.055, -15.076),
    (1.050, -15.156),
    (1.036, -16.034),
];

/// Slack at 1.0 p.u. feeding a PQ load `pd + j·qd` through `r + j·x`.
pub fn two_bus(r: f64, x: f64, pd: f64, qd: f64) -> Network {
    Network::new(
        100.0,
        vec![Bus::slack(1, 1.0), Bus::pq(2).with_load(pd, qd)],
        vec![Branch::new(1, 2, r, x)],
        vec![Generator::new(1, 0.0)],
    )
}

/// Receiving-end voltage of `two_bus` in closed form, as (|V|, angle rad).
pub fn two_bus_exact(r: f64, x: f64, p: f64, q: f64) -> (f64, f64) {
    let a = 1.0 - 2.0 * (p * r + q * x);
    let c = (p * p + q * q) * (r * r + x * x);
    let v2 = ((a + (a * a - 4.0 * c).sqrt()) / 2.0).sqrt();
    // V1 = V2 + Z·conj(S/V2) with V2 on the real axis
    let re = v2 + (p * r + q * x) / v2;
    let im = (p * x - q * r) / v2;
    (v2, -im.atan2(re))
}
