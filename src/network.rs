use crate::error::NetworkError;

use std::collections::{HashMap, HashSet, VecDeque};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum BusType {
    /// Reference bus: fixed voltage magnitude and angle.
    Slack,
    /// Fixed active power and voltage magnitude.
    PV,
    /// Fixed active and reactive power.
    PQ,
}

/// A network node. Loads and shunts are in per-unit on the system base.
#[derive(Debug, Clone, PartialEq)]
pub struct Bus {
    pub id: usize,
    pub kind: BusType,
    /// Active load demand.
    pub pd: f64,
    /// Reactive load demand.
    pub qd: f64,
    /// Shunt conductance (demand at 1.0 p.u. voltage).
    pub gs: f64,
    /// Shunt susceptance (injection at 1.0 p.u. voltage).
    pub bs: f64,
    /// Voltage magnitude setpoint for PV/slack buses, initial guess otherwise.
    pub vm: f64,
    /// Voltage angle in degrees. Reference for the slack bus.
    pub va: f64,
}

impl Bus {
    pub fn new(id: usize, kind: BusType) -> Self {
        Self {
            id,
            kind,
            pd: 0.0,
            qd: 0.0,
            gs: 0.0,
            bs: 0.0,
            vm: 1.0,
            va: 0.0,
        }
    }

    pub fn slack(id: usize, vm: f64) -> Self {
        Self::new(id, BusType::Slack).with_voltage(vm, 0.0)
    }

    pub fn pv(id: usize, vm: f64) -> Self {
        Self::new(id, BusType::PV).with_voltage(vm, 0.0)
    }

    pub fn pq(id: usize) -> Self {
        Self::new(id, BusType::PQ)
    }

    pub fn with_load(mut self, pd: f64, qd: f64) -> Self {
        self.pd = pd;
        self.qd = qd;
        self
    }

    pub fn with_shunt(mut self, gs: f64, bs: f64) -> Self {
        self.gs = gs;
        self.bs = bs;
        self
    }

    pub fn with_voltage(mut self, vm: f64, va: f64) -> Self {
        self.vm = vm;
        self.va = va;
        self
    }

    pub fn is_slack(&self) -> bool {
        self.kind == BusType::Slack
    }
}

/// A line or transformer modelled as a π-equivalent.
///
/// The tap and phase shift sit on the `from` side.
#[derive(Debug, Clone, PartialEq)]
pub struct Branch {
    pub from: usize,
    pub to: usize,
    pub r: f64,
    pub x: f64,
    /// Total line charging susceptance, split between both ends.
    pub b: f64,
    /// Off-nominal turns ratio. Zero is read as 1.0.
    pub tap: f64,
    /// Phase shift in degrees.
    pub shift: f64,
    pub in_service: bool,
}

impl Branch {
    pub fn new(from: usize, to: usize, r: f64, x: f64) -> Self {
        Self {
            from,
            to,
            r,
            x,
            b: 0.0,
            tap: 1.0,
            shift: 0.0,
            in_service: true,
        }
    }

    pub fn with_charging(mut self, b: f64) -> Self {
        self.b = b;
        self
    }

    pub fn with_tap(mut self, tap: f64, shift: f64) -> Self {
        self.tap = tap;
        self.shift = shift;
        self
    }

    pub fn with_status(mut self, in_service: bool) -> Self {
        self.in_service = in_service;
        self
    }

    pub fn is_on(&self) -> bool {
        self.in_service
    }

    /// Tap ratio with the zero-means-nominal convention resolved.
    pub fn ratio(&self) -> f64 {
        if self.tap == 0.0 {
            1.0
        } else {
            self.tap
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Generator {
    pub bus: usize,
    pub pg: f64,
    /// Reactive output. Only used as a fixed injection when the bus is PQ.
    pub qg: f64,
    pub qmin: f64,
    pub qmax: f64,
    pub in_service: bool,
}

impl Generator {
    pub fn new(bus: usize, pg: f64) -> Self {
        Self {
            bus,
            pg,
            qg: 0.0,
            qmin: f64::NEG_INFINITY,
            qmax: f64::INFINITY,
            in_service: true,
        }
    }

    pub fn with_q_limits(mut self, qmin: f64, qmax: f64) -> Self {
        self.qmin = qmin;
        self.qmax = qmax;
        self
    }

    pub fn with_qg(mut self, qg: f64) -> Self {
        self.qg = qg;
        self
    }

    pub fn with_status(mut self, in_service: bool) -> Self {
        self.in_service = in_service;
        self
    }

    pub fn is_on(&self) -> bool {
        self.in_service
    }
}

/// Network snapshot in per-unit on `base_mva`.
///
/// Bus order is the order of `buses`; every matrix and voltage vector in
/// the crate is indexed by position in that vector.
#[derive(Debug, Clone, PartialEq)]
pub struct Network {
    pub base_mva: f64,
    pub buses: Vec<Bus>,
    pub branches: Vec<Branch>,
    pub generators: Vec<Generator>,
}

impl Network {
    pub fn new(
        base_mva: f64,
        buses: Vec<Bus>,
        branches: Vec<Branch>,
        generators: Vec<Generator>,
    ) -> Self {
        Self {
            base_mva,
            buses,
            branches,
            generators,
        }
    }

    pub fn nb(&self) -> usize {
        self.buses.len()
    }

    /// Maps bus ids to positions in `buses`.
    pub fn bus_lookup(&self) -> Result<HashMap<usize, usize>, NetworkError> {
        let mut lookup = HashMap::with_capacity(self.buses.len());
        for (i, b) in self.buses.iter().enumerate() {
            if lookup.insert(b.id, i).is_some() {
                return Err(NetworkError::DuplicateBusId(b.id));
            }
        }
        Ok(lookup)
    }

    /// Returns a copy with the bus types replaced, in bus order.
    pub fn with_bus_types(&self, kinds: &[BusType]) -> Self {
        let mut snapshot = self.clone();
        for (b, &kind) in snapshot.buses.iter_mut().zip(kinds) {
            b.kind = kind;
        }
        snapshot
    }

    pub fn bus_types(&self) -> Vec<BusType> {
        self.buses.iter().map(|b| b.kind).collect()
    }

    /// Checks the network is solvable as described.
    pub fn validate(&self) -> Result<(), NetworkError> {
        if self.buses.is_empty() {
            return Err(NetworkError::Empty);
        }
        if !(self.base_mva.is_finite() && self.base_mva > 0.0) {
            return Err(NetworkError::InvalidBaseMva(self.base_mva));
        }
        let lookup = self.bus_lookup()?;

        let slack: Vec<usize> = self
            .buses
            .iter()
            .filter(|b| b.is_slack())
            .map(|b| b.id)
            .collect();
        match slack.len() {
            0 => return Err(NetworkError::NoSlack),
            1 => {}
            _ => return Err(NetworkError::MultipleSlack(slack)),
        }

        for (i, b) in self.buses.iter().enumerate() {
            let fields = [
                ("pd", b.pd),
                ("qd", b.qd),
                ("gs", b.gs),
                ("bs", b.bs),
                ("vm", b.vm),
                ("va", b.va),
            ];
            check_finite("bus", i, &fields)?;
        }

        for (i, br) in self.branches.iter().enumerate() {
            for bus in [br.from, br.to] {
                if !lookup.contains_key(&bus) {
                    return Err(NetworkError::UnknownBus {
                        element: "branch",
                        index: i,
                        bus,
                    });
                }
            }
            if br.from == br.to {
                return Err(NetworkError::SelfLoop(i, br.from));
            }
            let fields = [
                ("r", br.r),
                ("x", br.x),
                ("b", br.b),
                ("tap", br.tap),
                ("shift", br.shift),
            ];
            check_finite("branch", i, &fields)?;
            if br.is_on() && br.r == 0.0 && br.x == 0.0 {
                return Err(NetworkError::ZeroImpedance(i));
            }
        }

        for (i, g) in self.generators.iter().enumerate() {
            if !lookup.contains_key(&g.bus) {
                return Err(NetworkError::UnknownBus {
                    element: "generator",
                    index: i,
                    bus: g.bus,
                });
            }
            // Limits may be infinite but never NaN.
            check_finite("generator", i, &[("pg", g.pg), ("qg", g.qg)])?;
            if g.qmin.is_nan() || g.qmax.is_nan() {
                return Err(NetworkError::NonFinite {
                    element: "generator",
                    index: i,
                    field: "q limits",
                });
            }
        }

        self.check_connected(&lookup)
    }

    /// Every bus must reach the slack bus through in-service branches.
    fn check_connected(&self, lookup: &HashMap<usize, usize>) -> Result<(), NetworkError> {
        let nb = self.nb();
        let mut adjacent: Vec<Vec<usize>> = vec![Vec::new(); nb];
        for br in self.branches.iter().filter(|br| br.is_on()) {
            let (f, t) = (lookup[&br.from], lookup[&br.to]);
            adjacent[f].push(t);
            adjacent[t].push(f);
        }

        let Some(slack) = self.buses.iter().position(|b| b.is_slack()) else {
            return Err(NetworkError::NoSlack);
        };
        let mut seen = HashSet::from([slack]);
        let mut queue = VecDeque::from([slack]);
        while let Some(i) = queue.pop_front() {
            for &j in &adjacent[i] {
                if seen.insert(j) {
                    queue.push_back(j);
                }
            }
        }

        match self.buses.iter().enumerate().find(|(i, _)| !seen.contains(i)) {
            Some((_, b)) => Err(NetworkError::Islanded(b.id)),
            None => Ok(()),
        }
    }
}

fn check_finite(
    element: &'static str,
    index: usize,
    fields: &[(&'static str, f64)],
) -> Result<(), NetworkError> {
    match fields.iter().find(|(_, v)| !v.is_finite()) {
        Some(&(field, _)) => Err(NetworkError::NonFinite {
            element,
            index,
            field,
        }),
        None => Ok(()),
    }
}

/// Index lists for each class of bus equation, all in bus order.
///
/// PV buses without an in-service generator are treated as PQ, the same
/// way out-of-service generators are treated as absent.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BusIndex {
    pub slack: usize,
    pub pv: Vec<usize>,
    pub pq: Vec<usize>,
    /// Every bus except the slack: the rows of ΔP and the angle unknowns.
    pub pvpq: Vec<usize>,
}

impl BusIndex {
    pub fn new(network: &Network) -> Result<Self, NetworkError> {
        let lookup = network.bus_lookup()?;
        let gen_on: HashSet<usize> = network
            .generators
            .iter()
            .filter(|g| g.is_on())
            .filter_map(|g| lookup.get(&g.bus).copied())
            .collect();

        let mut slack = None;
        let mut pv = Vec::new();
        let mut pq = Vec::new();
        for (i, b) in network.buses.iter().enumerate() {
            match b.kind {
                BusType::Slack => {
                    if slack.replace(i).is_some() {
                        return Err(NetworkError::MultipleSlack(
                            network
                                .buses
                                .iter()
                                .filter(|b| b.is_slack())
                                .map(|b| b.id)
                                .collect(),
                        ));
                    }
                }
                BusType::PV if gen_on.contains(&i) => pv.push(i),
                BusType::PV | BusType::PQ => pq.push(i),
            }
        }
        let slack = slack.ok_or(NetworkError::NoSlack)?;
        let pvpq = (0..network.nb()).filter(|&i| i != slack).collect();

        Ok(Self { slack, pv, pq, pvpq })
    }

    /// Length of the unknown vector: angles of `pvpq`, magnitudes of `pq`.
    pub fn dim(&self) -> usize {
        self.pvpq.len() + self.pq.len()
    }

    /// The bus type each bus is solved as.
    pub fn effective_types(&self, nb: usize) -> Vec<BusType> {
        let mut kinds = vec![BusType::PQ; nb];
        kinds[self.slack] = BusType::Slack;
        for &i in &self.pv {
            kinds[i] = BusType::PV;
        }
        kinds
    }
}
