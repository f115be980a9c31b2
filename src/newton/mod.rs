mod power;

pub use power::*;

/// Receives the mismatch norm after every Newton iteration.
pub trait ProgressMonitor {
    fn update(&self, i: usize, norm_f: f64);
}

/// Reports progress through the `log` facade.
pub struct LogProgress {}

impl ProgressMonitor for LogProgress {
    fn update(&self, i: usize, norm_f: f64) {
        if i == 0 {
            log::info!(" it    max P & Q mismatch (p.u.)");
            log::info!("----  ---------------------------");
        }
        log::info!("{:3}        {:10.3e}", i, norm_f);
    }
}
