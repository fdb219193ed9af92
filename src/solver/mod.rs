//! QPALM solver main module.
//!
//! A problem is described by a [`ProblemSetup`], validated and scaled
//! by [`Workspace::setup`], and solved by [`Workspace::solve`].  The
//! solver is a proximal augmented Lagrangian method: each outer
//! iteration approximately minimizes the augmented Lagrangian with a
//! semismooth Newton method, then updates the multipliers, the
//! penalties and the proximal weight.

pub(crate) const _INFINITY_DEFAULT: f64 = 1e20;

/// Default magnitude beyond which bounds are treated as infinite.
/// See [`set_infinity`] to change it.
pub const QPALM_INFTY: f64 = _INFINITY_DEFAULT;

// internal module structure
pub(crate) mod equilibration;
pub(crate) mod inner;
pub(crate) mod iterates;
pub(crate) mod linesearch;
pub(crate) mod nonconvex;
pub(crate) mod residuals;
pub(crate) mod utils;

mod data_updating;
mod info;
mod info_print;
#[cfg(feature = "serde")]
mod json;
mod problem;
mod problemdata;
mod results;
mod settings;
mod status;
mod workspace;

pub mod linsys;
pub mod penalty;

pub use crate::solver::utils::infbounds::*;

pub use data_updating::DataUpdateError;
pub use equilibration::EquilibrationData;
pub use info::QPALMInfo;
pub use problem::{MatrixData, ProblemSetup, SetupError};
pub use problemdata::ProblemData;
pub use results::QPALMResults;
pub use settings::{QPALMSettings, QPALMSettingsBuilder, SettingsError};
pub use status::{SolverStatus, UnknownStatusCode};
pub use workspace::{SolveError, Workspace};
