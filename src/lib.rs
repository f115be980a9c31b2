mod batch;
pub mod debug;
mod error;
pub mod jac;
pub mod linsolve;
pub mod mismatch;
mod network;
pub mod newton;
mod pfopt;
pub mod pfsoln;
pub mod qlim;
mod runpf;
pub mod sbus;
mod solution;
mod state;
pub mod ybus;

#[cfg(test)]
mod test_utils;

pub use batch::*;
pub use error::*;
pub use network::*;
pub use pfopt::*;
pub use runpf::*;
pub use solution::*;
pub use state::*;
