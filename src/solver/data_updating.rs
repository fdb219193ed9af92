#![allow(non_snake_case)]
use super::settings::{QPALMSettings, SettingsError};
use super::workspace::{SolverCore, Workspace};
use crate::algebra::*;
use thiserror::Error;

/// Error type returned by the data and settings update functions
/// of [`Workspace`]
#[derive(Error, Debug, Clone, PartialEq)]
pub enum DataUpdateError {
    #[error("Workspace has been released")]
    Released,
    #[error("Dimension mismatch in {what}: expected {expected}, found {found}")]
    DimensionMismatch {
        what: &'static str,
        expected: usize,
        found: usize,
    },
    #[error("Inconsistent bounds for constraint {0}")]
    InconsistentBounds(usize),
    #[error("Data formatting error")]
    BadFormat(#[from] SparseFormatError),
    #[error("Bad settings: {0}")]
    BadSettings(#[from] SettingsError),
}

impl<T> Workspace<T>
where
    T: FloatT,
{
    /// Starting point for subsequent solves.  An omitted `x` or `y`
    /// restarts that variable from zero.
    pub fn warm_start(&mut self, x: Option<&[T]>, y: Option<&[T]>) -> Result<(), DataUpdateError> {
        let core = self.core_mut()?;
        let equil = &core.data.equilibration;

        match x {
            Some(x) => {
                check_dimension("x", core.data.n, x.len())?;
                check_finite(x)?;
                core.x_init.copy_from(x).hadamard(&equil.dinv);
            }
            None => {
                core.x_init.set(T::zero());
            }
        }

        match y {
            Some(y) => {
                check_dimension("y", core.data.m, y.len())?;
                check_finite(y)?;
                core.y_init
                    .copy_from(y)
                    .hadamard(&equil.einv)
                    .scale(equil.c);
            }
            None => {
                core.y_init.set(T::zero());
            }
        }
        Ok(())
    }

    /// Overwrites the linear cost `q`
    pub fn update_q(&mut self, q: &[T]) -> Result<(), DataUpdateError> {
        let core = self.core_mut()?;
        check_dimension("q", core.data.n, q.len())?;
        check_finite(q)?;
        core.data.set_q_unscaled(q);
        Ok(())
    }

    /// Overwrites the constraint bounds.  An omitted bound keeps its
    /// current value.  Values beyond ±[`get_infinity`](crate::solver::get_infinity)
    /// are treated as infinite.
    pub fn update_bounds(
        &mut self,
        bmin: Option<&[T]>,
        bmax: Option<&[T]>,
    ) -> Result<(), DataUpdateError> {
        let core = self.core_mut()?;
        let m = core.data.m;
        if let Some(bmin) = bmin {
            check_dimension("bmin", m, bmin.len())?;
        }
        if let Some(bmax) = bmax {
            check_dimension("bmax", m, bmax.len())?;
        }

        let (cur_min, cur_max) = unscaled_bounds(core);
        let bmin = bmin.unwrap_or(cur_min.as_slice());
        let bmax = bmax.unwrap_or(cur_max.as_slice());

        if let Some(i) = std::iter::zip(bmin, bmax).position(|(l, u)| !(l <= u)) {
            return Err(DataUpdateError::InconsistentBounds(i));
        }
        core.data.set_bounds_unscaled(bmin, bmax);
        Ok(())
    }

    /// Replace the solver settings.  Settings that fix the scaling,
    /// the linear solver or the proximal floor of a nonconvex problem
    /// cannot be changed after setup.
    pub fn update_settings(&mut self, settings: QPALMSettings<T>) -> Result<(), DataUpdateError> {
        let core = self.core_mut()?;
        settings.validate_as_update(&core.settings)?;
        core.settings = settings;
        core.inner.invalidate();
        Ok(())
    }

    fn core_mut(&mut self) -> Result<&mut SolverCore<T>, DataUpdateError> {
        self.core.as_mut().ok_or(DataUpdateError::Released)
    }
}

fn unscaled_bounds<T: FloatT>(core: &SolverCore<T>) -> (Vec<T>, Vec<T>) {
    let data = &core.data;
    let einv = &data.equilibration.einv;
    let inf = data.infbound;

    let unscale = |b: &[T], finite: &[bool], default: T| -> Vec<T> {
        (0..data.m)
            .map(|i| if finite[i] { b[i] * einv[i] } else { default })
            .collect()
    };
    (
        unscale(&data.bmin, &data.lower_finite, -inf),
        unscale(&data.bmax, &data.upper_finite, inf),
    )
}

fn check_dimension(what: &'static str, expected: usize, found: usize) -> Result<(), DataUpdateError> {
    if expected != found {
        Err(DataUpdateError::DimensionMismatch {
            what,
            expected,
            found,
        })
    } else {
        Ok(())
    }
}

fn check_finite<T: FloatT>(v: &[T]) -> Result<(), DataUpdateError> {
    if v.is_finite() {
        Ok(())
    } else {
        Err(SparseFormatError::NonFiniteValue.into())
    }
}
