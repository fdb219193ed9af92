use crate::algebra::*;
use derive_builder::Builder;
use thiserror::Error;

#[cfg(feature = "serde")]
use serde::{de::DeserializeOwned, Deserialize, Serialize};

#[derive(Error, Debug, Clone, PartialEq, Eq)]
/// Error type returned by settings validation
pub enum SettingsError {
    /// A field has a value outside of its allowed range
    #[error("Bad value for field \"{0}\"")]
    BadFieldValue(&'static str),
    /// A field that is fixed at setup was changed by an update
    #[error("Field \"{0}\" cannot be changed after setup")]
    ImmutableSetting(&'static str),
}

/// Solver settings
///
/// Defaults follow the published QPALM solver.  Construct with
/// [`QPALMSettingsBuilder`] to have the values checked on build,
/// or with struct update syntax over [`Default`] and check them
/// with [`validate`](QPALMSettings::validate).

#[derive(Builder, Debug, Clone, PartialEq)]
#[builder(build_fn(validate = "Self::validate"))]
#[cfg_attr(feature = "serde", derive(Serialize, Deserialize))]
#[cfg_attr(feature = "serde", serde(bound = "T: Serialize + DeserializeOwned"))]
#[cfg_attr(feature = "serde", serde(default))]
pub struct QPALMSettings<T: FloatT> {
    ///maximum number of Newton iterations, over all subproblems
    #[builder(default = "10000")]
    pub max_iter: u32,

    ///maximum number of Newton iterations per subproblem
    #[builder(default = "100")]
    pub inner_max_iter: u32,

    ///maximum number of outer (multiplier update) iterations
    #[builder(default = "1000")]
    pub max_outer_iter: u32,

    ///maximum solve time (seconds)
    #[builder(default = "f64::INFINITY")]
    pub time_limit: f64,

    ///absolute termination tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub eps_abs: T,

    ///relative termination tolerance
    #[builder(default = "(1e-4).as_T()")]
    pub eps_rel: T,

    ///initial absolute tolerance of the subproblems
    #[builder(default = "T::one()")]
    pub eps_abs_in: T,

    ///initial relative tolerance of the subproblems
    #[builder(default = "T::one()")]
    pub eps_rel_in: T,

    ///factor by which the subproblem tolerances shrink per outer iteration
    #[builder(default = "(0.1).as_T()")]
    pub tolerance_shrink: T,

    ///primal infeasibility tolerance
    #[builder(default = "(1e-5).as_T()")]
    pub eps_prim_inf: T,

    ///dual infeasibility tolerance
    #[builder(default = "(1e-5).as_T()")]
    pub eps_dual_inf: T,

    ///reduced absolute tolerance, checked when an iteration or time limit is hit
    #[builder(default = "(1e-2).as_T()")]
    pub reduced_eps_abs: T,

    ///reduced relative tolerance
    #[builder(default = "(1e-2).as_T()")]
    pub reduced_eps_rel: T,

    ///reduced primal infeasibility tolerance
    #[builder(default = "(1e-3).as_T()")]
    pub reduced_eps_prim_inf: T,

    ///reduced dual infeasibility tolerance
    #[builder(default = "(1e-3).as_T()")]
    pub reduced_eps_dual_inf: T,

    ///initial penalty parameter of every constraint
    #[builder(default = "(20.).as_T()")]
    pub initial_penalty: T,

    ///penalty growth factor
    #[builder(default = "(100.).as_T()")]
    pub penalty_growth: T,

    ///penalties grow on rows whose violation shrank by less than this ratio
    #[builder(default = "(0.25).as_T()")]
    pub penalty_progress_ratio: T,

    ///maximum penalty parameter
    #[builder(default = "(1e9).as_T()")]
    pub max_penalty: T,

    ///enable the proximal term
    #[builder(default = "true")]
    pub proximal_enable: bool,

    ///initial proximal weight
    #[builder(default = "(0.1).as_T()")]
    pub initial_proximal: T,

    ///proximal weight reduction factor
    #[builder(default = "(0.1).as_T()")]
    pub proximal_shrink: T,

    ///minimum proximal weight
    #[builder(default = "(1e-7).as_T()")]
    pub min_proximal: T,

    ///estimate the minimum eigenvalue of Q and keep the proximal weight above it
    #[builder(default = "false")]
    pub nonconvex: bool,

    ///regularization attempts per failed factorization
    #[builder(default = "2")]
    pub max_factorization_retries: u32,

    ///proximal weight growth on each regularization attempt
    #[builder(default = "(10.).as_T()")]
    pub proximal_regularization_factor: T,

    ///enable Ruiz equilibration of the problem data
    #[builder(default = "true")]
    pub scaling_enable: bool,

    ///number of equilibration iterations
    #[builder(default = "10")]
    pub scaling_iter: u32,

    ///minimum equilibration scaling
    #[builder(default = "(1e-4).as_T()")]
    pub scaling_min: T,

    ///maximum equilibration scaling
    #[builder(default = "(1e+4).as_T()")]
    pub scaling_max: T,

    ///Newton system factorization ("kkt", "schur" or "auto")
    #[builder(default = r#""auto".to_string()"#)]
    pub factorization_method: String,

    ///maximum number of rows changed by low rank factor updates
    #[builder(default = "160")]
    pub max_rank_update: u32,

    ///maximum rows changed by low rank updates, as a fraction of n+m
    #[builder(default = "(0.1).as_T()")]
    pub max_rank_update_fraction: T,

    ///number of low rank updates after which the factors are recomputed
    #[builder(default = "10000")]
    pub reset_newton_iter: u32,

    ///line search sufficient decrease parameter
    #[builder(default = "(1e-4).as_T()")]
    pub linesearch_armijo: T,

    ///line search backtracking factor
    #[builder(default = "(0.5).as_T()")]
    pub linesearch_backtrack_step: T,

    ///maximum number of line search backtracking steps
    #[builder(default = "30")]
    pub linesearch_max_backtrack: u32,

    ///verbose printing
    #[builder(default = "true")]
    pub verbose: bool,

    ///print a progress line every this many outer iterations
    #[builder(default = "1")]
    pub print_interval: u32,
}

impl<T> Default for QPALMSettings<T>
where
    T: FloatT,
{
    fn default() -> QPALMSettings<T> {
        QPALMSettingsBuilder::<T>::default().build().unwrap()
    }
}

macro_rules! check_immutable_setting {
    ($self:expr, $prev:expr, $field:ident) => {
        if $self.$field != $prev.$field {
            return Err(SettingsError::ImmutableSetting(stringify!($field)));
        }
    };
}

// applies a field check to a builder field only if it was set
macro_rules! check_builder_field {
    ($self:expr, $field:ident, $check:expr) => {
        if let Some(ref v) = $self.$field {
            $check(stringify!($field), v)?;
        }
    };
}

macro_rules! check_field {
    ($self:expr, $field:ident, $check:expr) => {
        $check(stringify!($field), &$self.$field)?;
    };
}

impl<T> QPALMSettings<T>
where
    T: FloatT,
{
    /// Checks that every field holds a legal value.
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_field!(self, max_iter, positive_int);
        check_field!(self, inner_max_iter, positive_int);
        check_field!(self, max_outer_iter, positive_int);
        check_field!(self, time_limit, positive_time);
        check_field!(self, eps_abs, nonnegative);
        check_field!(self, eps_rel, nonnegative);
        check_field!(self, eps_abs_in, nonnegative);
        check_field!(self, eps_rel_in, nonnegative);
        check_field!(self, tolerance_shrink, unit_open_closed);
        check_field!(self, eps_prim_inf, nonnegative);
        check_field!(self, eps_dual_inf, nonnegative);
        check_field!(self, reduced_eps_abs, nonnegative);
        check_field!(self, reduced_eps_rel, nonnegative);
        check_field!(self, reduced_eps_prim_inf, nonnegative);
        check_field!(self, reduced_eps_dual_inf, nonnegative);
        check_field!(self, initial_penalty, positive);
        check_field!(self, penalty_growth, greater_than_one);
        check_field!(self, penalty_progress_ratio, unit_open_closed);
        check_field!(self, max_penalty, positive);
        check_field!(self, initial_proximal, positive);
        check_field!(self, proximal_shrink, unit_open_closed);
        check_field!(self, min_proximal, positive);
        check_field!(self, proximal_regularization_factor, greater_than_one);
        check_field!(self, scaling_min, positive);
        check_field!(self, scaling_max, positive);
        check_field!(self, factorization_method, factorization_method);
        check_field!(self, max_rank_update_fraction, nonnegative);
        check_field!(self, linesearch_armijo, unit_open);
        check_field!(self, linesearch_backtrack_step, unit_open);
        check_field!(self, print_interval, positive_int);

        // joint conditions
        if self.eps_abs == T::zero() && self.eps_rel == T::zero() {
            return Err(SettingsError::BadFieldValue("eps_abs"));
        }
        if self.scaling_min > self.scaling_max {
            return Err(SettingsError::BadFieldValue("scaling_min"));
        }
        if self.initial_penalty > self.max_penalty {
            return Err(SettingsError::BadFieldValue("initial_penalty"));
        }

        Ok(())
    }

    /// Checks that the settings are valid as a replacement for `prev`
    /// in a workspace that has already been set up.  Fields that
    /// are consumed during setup may not change.
    pub fn validate_as_update(&self, prev: &Self) -> Result<(), SettingsError> {
        self.validate()?;

        check_immutable_setting!(self, prev, scaling_enable);
        check_immutable_setting!(self, prev, scaling_iter);
        check_immutable_setting!(self, prev, scaling_min);
        check_immutable_setting!(self, prev, scaling_max);
        check_immutable_setting!(self, prev, factorization_method);
        check_immutable_setting!(self, prev, nonconvex);

        Ok(())
    }
}

// pre build checker (for auto-validation when using the builder)

impl From<SettingsError> for QPALMSettingsBuilderError {
    fn from(e: SettingsError) -> Self {
        QPALMSettingsBuilderError::ValidationError(e.to_string())
    }
}

/// Automatic pre-build settings validation
impl<T> QPALMSettingsBuilder<T>
where
    T: FloatT,
{
    /// check the fields that have been set explicitly.  Joint
    /// conditions are checked by [`QPALMSettings::validate`].
    pub fn validate(&self) -> Result<(), SettingsError> {
        check_builder_field!(self, max_iter, positive_int);
        check_builder_field!(self, inner_max_iter, positive_int);
        check_builder_field!(self, max_outer_iter, positive_int);
        check_builder_field!(self, time_limit, positive_time);
        check_builder_field!(self, eps_abs, nonnegative);
        check_builder_field!(self, eps_rel, nonnegative);
        check_builder_field!(self, tolerance_shrink, unit_open_closed);
        check_builder_field!(self, initial_penalty, positive);
        check_builder_field!(self, penalty_growth, greater_than_one);
        check_builder_field!(self, penalty_progress_ratio, unit_open_closed);
        check_builder_field!(self, max_penalty, positive);
        check_builder_field!(self, initial_proximal, positive);
        check_builder_field!(self, proximal_shrink, unit_open_closed);
        check_builder_field!(self, min_proximal, positive);
        check_builder_field!(self, proximal_regularization_factor, greater_than_one);
        check_builder_field!(self, scaling_min, positive);
        check_builder_field!(self, scaling_max, positive);
        check_builder_field!(self, factorization_method, factorization_method);
        check_builder_field!(self, linesearch_armijo, unit_open);
        check_builder_field!(self, linesearch_backtrack_step, unit_open);
        check_builder_field!(self, print_interval, positive_int);
        Ok(())
    }
}

// ---------------------------------------------------------
// individual validation functions go here
// ---------------------------------------------------------

fn factorization_method(field: &'static str, method: &str) -> Result<(), SettingsError> {
    match method {
        "auto" | "kkt" | "schur" => Ok(()),
        _ => Err(SettingsError::BadFieldValue(field)),
    }
}

fn positive_int(field: &'static str, v: &u32) -> Result<(), SettingsError> {
    if *v > 0 {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn positive_time(field: &'static str, v: &f64) -> Result<(), SettingsError> {
    // NaN fails
    if *v > 0.0 {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn nonnegative<T: FloatT>(field: &'static str, v: &T) -> Result<(), SettingsError> {
    if *v >= T::zero() && v.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn positive<T: FloatT>(field: &'static str, v: &T) -> Result<(), SettingsError> {
    if *v > T::zero() && v.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

fn greater_than_one<T: FloatT>(field: &'static str, v: &T) -> Result<(), SettingsError> {
    if *v > T::one() && v.is_finite() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

// (0,1]
fn unit_open_closed<T: FloatT>(field: &'static str, v: &T) -> Result<(), SettingsError> {
    if *v > T::zero() && *v <= T::one() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

// (0,1)
fn unit_open<T: FloatT>(field: &'static str, v: &T) -> Result<(), SettingsError> {
    if *v > T::zero() && *v < T::one() {
        Ok(())
    } else {
        Err(SettingsError::BadFieldValue(field))
    }
}

#[test]
fn test_settings_validate() {
    // all standard settings
    let defaults = QPALMSettingsBuilder::<f64>::default().build().unwrap();
    assert_eq!(defaults, QPALMSettings::default());
    assert_eq!(defaults.max_iter, 10000);
    assert_eq!(defaults.initial_penalty, 20.);
    assert_eq!(defaults.factorization_method, "auto");

    // fail on unknown factorization method
    assert!(QPALMSettingsBuilder::<f64>::default()
        .factorization_method("cholmod".to_string())
        .build()
        .is_err());

    // fail on out of range values
    assert!(QPALMSettingsBuilder::<f64>::default()
        .tolerance_shrink(1.5)
        .build()
        .is_err());
    assert!(QPALMSettingsBuilder::<f64>::default()
        .max_iter(0)
        .build()
        .is_err());
    assert!(QPALMSettingsBuilder::<f64>::default()
        .time_limit(f64::NAN)
        .build()
        .is_err());

    // directly construct bad settings and manually check
    let settings = QPALMSettings::<f64> {
        eps_abs: 0.,
        eps_rel: 0.,
        ..QPALMSettings::default()
    };
    assert_eq!(
        settings.validate(),
        Err(SettingsError::BadFieldValue("eps_abs"))
    );

    let settings = QPALMSettings::<f64> {
        scaling_min: 10.,
        scaling_max: 1.,
        ..QPALMSettings::default()
    };
    assert!(settings.validate().is_err());
}

#[test]
fn test_settings_validate_as_update() {
    // try to overlay prohibited update values
    let oldsettings = QPALMSettings::<f64>::default();
    let newsettings = QPALMSettings::<f64> {
        factorization_method: "kkt".to_string(),
        ..QPALMSettings::default()
    };
    assert_eq!(
        newsettings.validate_as_update(&oldsettings),
        Err(SettingsError::ImmutableSetting("factorization_method"))
    );

    let newsettings = QPALMSettings::<f64> {
        scaling_iter: 3,
        ..QPALMSettings::default()
    };
    assert!(newsettings.validate_as_update(&oldsettings).is_err());

    // try to overlay allowed update values
    let newsettings = QPALMSettings::<f64> {
        max_iter: 11,
        eps_abs: 1e-6,
        verbose: false,
        ..QPALMSettings::default()
    };
    assert!(newsettings.validate_as_update(&oldsettings).is_ok());
}
