use thiserror::Error;

/// A malformed network description.
///
/// These are fatal and reported before any numerical work starts.
#[derive(Debug, Clone, PartialEq, Error)]
pub enum NetworkError {
    #[error("network contains no buses")]
    Empty,
    #[error("network has no slack bus")]
    NoSlack,
    #[error("network has more than one slack bus: {0:?}")]
    MultipleSlack(Vec<usize>),
    #[error("duplicate bus id {0}")]
    DuplicateBusId(usize),
    #[error("{element} {index} references unknown bus {bus}")]
    UnknownBus {
        element: &'static str,
        index: usize,
        bus: usize,
    },
    #[error("branch {0} connects bus {1} to itself")]
    SelfLoop(usize, usize),
    #[error("in-service branch {0} has zero series impedance")]
    ZeroImpedance(usize),
    #[error("base MVA must be positive, got {0}")]
    InvalidBaseMva(f64),
    #[error("non-finite {field} on {element} {index}")]
    NonFinite {
        element: &'static str,
        index: usize,
        field: &'static str,
    },
    #[error("bus {0} is not connected to the slack bus")]
    Islanded(usize),
    #[error("initial voltage state has {actual} entries for {expected} buses")]
    StateLength { expected: usize, actual: usize },
}

/// Reason a Newton run stopped without converging.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum Divergence {
    /// The iteration ceiling was reached.
    #[error("maximum iterations reached")]
    MaxIterations,
    /// The Jacobian could not be factorised.
    #[error("singular Jacobian")]
    SingularJacobian,
    /// A mismatch, Jacobian entry or correction became NaN or infinite.
    #[error("non-finite mismatch or update")]
    NonFinite,
}
