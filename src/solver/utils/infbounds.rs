use crate::solver::utils::atomic::{AtomicF64, Ordering};
use crate::solver::_INFINITY_DEFAULT;
use lazy_static::lazy_static;

// process-wide, read once per workspace setup
lazy_static! {
    static ref INFINITY: AtomicF64 = AtomicF64::new(_INFINITY_DEFAULT);
}

/// Bound magnitude at or beyond which a bound counts as absent.
///
/// Bounds this large are clamped to ±`get_infinity()` during setup
/// and are skipped by the infeasibility checks.  Defaults to
/// [`QPALM_INFTY`](crate::solver::QPALM_INFTY).
pub fn get_infinity() -> f64 {
    INFINITY.load(Ordering::Relaxed)
}

/// Change the magnitude reported by [`get_infinity`].  Workspaces
/// already set up keep the value they were created with.
pub fn set_infinity(v: f64) {
    INFINITY.store(v, Ordering::Relaxed);
}

/// Restore [`get_infinity`] to [`QPALM_INFTY`](crate::solver::QPALM_INFTY).
pub fn default_infinity() {
    set_infinity(_INFINITY_DEFAULT);
}

#[test]
fn test_set_infinity() {
    set_infinity(1e10);
    assert_eq!(get_infinity(), 1e10);
    default_infinity();
    assert_eq!(get_infinity(), crate::solver::QPALM_INFTY);
}
