pub use log::{info, warn};

pub use matrix_util::traits::MatWithNames;

pub type Mat = nalgebra::DMatrix<f32>;
pub type DVec = nalgebra::DVector<f32>;

/// A labeled activity matrix (samples x regulators)
pub type Named<T> = MatWithNames<nalgebra::DMatrix<T>>;

pub const DEFAULT_MIN_N: usize = 5;
pub const DEFAULT_TIMES: usize = 100;
pub const DEFAULT_SEED: u64 = 42;
pub const DEFAULT_TREES: usize = 10;
pub const DEFAULT_MIN_LEAF: usize = 5;

/// Floating point types the estimators work with (`f32`, `f64`).
///
/// Both `nalgebra` and `num_traits::Float` define `abs`, `sqrt`, ...
/// so call sites spell out `Float::abs(x)` to stay unambiguous.
pub trait ActScalar:
    nalgebra::RealField
    + num_traits::Float
    + num_traits::FromPrimitive
    + Copy
    + Send
    + Sync
    + std::fmt::Display
{
}

impl<T> ActScalar for T where
    T: nalgebra::RealField
        + num_traits::Float
        + num_traits::FromPrimitive
        + Copy
        + Send
        + Sync
        + std::fmt::Display
{
}

/// A hidden progress bar unless `info` logging is on
pub fn new_progress_bar(len: usize) -> indicatif::ProgressBar {
    let pb = indicatif::ProgressBar::new(len as u64);
    if !log::log_enabled!(log::Level::Info) {
        pb.set_draw_target(indicatif::ProgressDrawTarget::hidden());
    }
    pb
}

/// Make sure labels don't repeat
pub(crate) fn check_unique(names: &[Box<str>], what: &str) -> crate::error::ActResult<()> {
    let mut seen = fnv::FnvHashSet::default();
    for x in names {
        if !seen.insert(x.as_ref()) {
            return Err(crate::error::ActivityError::validation(format!(
                "duplicate {} label: {}",
                what, x
            )));
        }
    }
    Ok(())
}
