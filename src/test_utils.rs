//! Small networks shared by the unit tests.

use crate::network::{Branch, Bus, Generator, Network};

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Slack (1) – PV (2) – PQ (3) in a chain.
pub(crate) fn three_bus() -> Network {
    Network::new(
        100.0,
        vec![
            Bus::slack(1, 1.02),
            Bus::pv(2, 1.01).with_load(0.2, 0.1),
            Bus::pq(3).with_load(0.6, 0.25).with_shunt(0.0, 0.05),
        ],
        vec![
            Branch::new(1, 2, 0.01, 0.08).with_charging(0.04),
            Branch::new(2, 3, 0.02, 0.12).with_charging(0.03),
        ],
        vec![
            Generator::new(1, 0.0),
            Generator::new(2, 0.5).with_q_limits(-0.5, 0.8),
        ],
    )
}

/// Slack feeding a single PQ load through one branch.
pub(crate) fn two_bus(r: f64, x: f64, pd: f64, qd: f64) -> Network {
    Network::new(
        100.0,
        vec![Bus::slack(1, 1.0), Bus::pq(2).with_load(pd, qd)],
        vec![Branch::new(1, 2, r, x)],
        vec![Generator::new(1, 0.0)],
    )
}

/// A connected meshed network with taps, phase shifters, shunts and a mix
/// of bus types. Bus ids are sparse to exercise the id lookup.
pub(crate) fn random_network(seed: u64, nb: usize) -> Network {
    let mut rng = StdRng::seed_from_u64(seed);
    let id = |i: usize| 10 * i + 3;

    let mut buses = vec![Bus::slack(id(0), rng.gen_range(0.98..1.06))];
    let mut generators = vec![Generator::new(id(0), 0.0)];
    for i in 1..nb {
        let bus = if rng.gen_bool(0.3) {
            generators.push(Generator::new(id(i), rng.gen_range(0.1..0.6)));
            Bus::pv(id(i), rng.gen_range(0.98..1.05))
        } else {
            Bus::pq(id(i)).with_voltage(rng.gen_range(0.95..1.05), rng.gen_range(-8.0..2.0))
        };
        let bus = bus
            .with_load(rng.gen_range(0.0..0.5), rng.gen_range(-0.1..0.3))
            .with_shunt(rng.gen_range(0.0..0.02), rng.gen_range(-0.05..0.1));
        buses.push(bus);
    }

    // A spanning chain keeps the network connected; extra branches add meshes.
    let mut branches = Vec::new();
    for i in 1..nb {
        let from = rng.gen_range(0..i);
        branches.push(random_branch(&mut rng, id(from), id(i)));
    }
    for _ in 0..nb {
        let from = rng.gen_range(0..nb);
        let to = rng.gen_range(0..nb);
        if from != to {
            branches.push(random_branch(&mut rng, id(from), id(to)));
        }
    }

    Network::new(100.0, buses, branches, generators)
}

fn random_branch(rng: &mut StdRng, from: usize, to: usize) -> Branch {
    let branch = Branch::new(from, to, rng.gen_range(0.0..0.05), rng.gen_range(0.05..0.3))
        .with_charging(rng.gen_range(0.0..0.1));
    if rng.gen_bool(0.3) {
        branch.with_tap(rng.gen_range(0.9..1.1), rng.gen_range(-10.0..10.0))
    } else {
        branch
    }
}
