use clap::ValueEnum;

/// Generator reactive limit enforcement.
#[derive(Debug, PartialEq, Eq, Copy, Clone, Default, ValueEnum)]
pub enum GenQLimits {
    /// Solve once and report whatever reactive output results.
    IgnoreLimits = 0,
    /// Switch every violating PV bus to PQ in the same round.
    #[default]
    Simultaneous = 1,
    /// Switch only the largest violation per round.
    OneAtATime = 2,
}

/// Power flow options.
#[derive(Debug, Clone, PartialEq)]
pub struct PFOpt {
    /// Termination tolerance on the infinity norm of the per unit P & Q
    /// mismatch. Default value is 1e-8.
    pub tolerance: f64,

    /// Maximum number of Newton iterations per run. Default value is 20.
    pub max_iterations: usize,

    /// Maximum number of PV to PQ reclassification rounds. Default value is 10.
    pub max_reclassification_rounds: usize,

    /// Start PQ buses from 1.0∠0 instead of the bus voltage data.
    /// Default value is true.
    pub flat_start: bool,

    /// Enforce gen reactive power limits at expense of |V|.
    pub enforce_q_limits: GenQLimits,
}

impl Default for PFOpt {
    fn default() -> Self {
        Self {
            tolerance: 1e-8,
            max_iterations: 20,
            max_reclassification_rounds: 10,
            flat_start: true,
            enforce_q_limits: GenQLimits::Simultaneous,
        }
    }
}

impl PFOpt {
    pub fn with_tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    pub fn with_max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    pub fn with_max_reclassification_rounds(mut self, rounds: usize) -> Self {
        self.max_reclassification_rounds = rounds;
        self
    }

    pub fn with_flat_start(mut self, flat_start: bool) -> Self {
        self.flat_start = flat_start;
        self
    }

    pub fn with_q_limits(mut self, enforce: GenQLimits) -> Self {
        self.enforce_q_limits = enforce;
        self
    }
}
