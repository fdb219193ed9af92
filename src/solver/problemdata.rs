#![allow(non_snake_case)]
use super::equilibration::*;
use super::problem::NormalizedProblem;
use super::settings::QPALMSettings;
use crate::algebra::*;

// ---------------
// Data type for the normalized (and scaled) problem
// ---------------

/// Problem data in the form used by the solver iterations.
///
/// Q holds the upper triangle only.  Once [`equilibrate`](ProblemData::equilibrate)
/// has run, every field except `infbound` is in scaled space.  Bounds
/// at ±`infbound` are infinite and are never scaled.
#[derive(Debug, Clone)]
pub struct ProblemData<T> {
    pub Q: CscMatrix<T>,
    pub q: Vec<T>,
    pub A: CscMatrix<T>,
    pub bmin: Vec<T>,
    pub bmax: Vec<T>,
    pub n: usize,
    pub m: usize,
    /// bmin\[i\] is finite
    pub lower_finite: Vec<bool>,
    /// bmax\[i\] is finite
    pub upper_finite: Vec<bool>,
    /// magnitude treated as an infinite bound
    pub infbound: T,
    pub equilibration: EquilibrationData<T>,
}

impl<T> ProblemData<T>
where
    T: FloatT,
{
    pub(crate) fn new(data: NormalizedProblem<T>) -> Self {
        // dimension checks will have already been
        // performed during problem setup, so skip here

        let NormalizedProblem {
            Q,
            q,
            A,
            bmin,
            bmax,
            infbound,
        } = data;

        let (m, n) = A.size();
        let lower_finite = bmin.iter().map(|&l| l > -infbound).collect();
        let upper_finite = bmax.iter().map(|&u| u < infbound).collect();
        let equilibration = EquilibrationData::<T>::new(n, m);

        Self {
            Q,
            q,
            A,
            bmin,
            bmax,
            n,
            m,
            lower_finite,
            upper_finite,
            infbound,
            equilibration,
        }
    }

    /// Ruiz equilibration of Q and A followed by cost scaling.  Leaves
    /// the identity scaling in place when scaling is disabled.
    pub(crate) fn equilibrate(&mut self, settings: &QPALMSettings<T>) {
        if !settings.scaling_enable {
            return;
        }
        ruiz_equilibrate(
            &mut self.Q,
            &mut self.A,
            &mut self.q,
            &mut self.equilibration,
            settings,
        );

        // bounds were stored unscaled
        let (bmin, bmax) = (self.bmin.clone(), self.bmax.clone());
        self.set_bounds_unscaled(&bmin, &bmax);
    }

    /// Replace the linear cost with (unscaled) `q`.
    pub(crate) fn set_q_unscaled(&mut self, q: &[T]) {
        let equil = &self.equilibration;
        self.q.copy_from(q).hadamard(&equil.d).scale(equil.c);
    }

    /// Replace the bounds with (unscaled) values.  Inputs are clamped
    /// to ±infbound and the finiteness flags are recomputed.
    pub(crate) fn set_bounds_unscaled(&mut self, bmin: &[T], bmax: &[T]) {
        let inf = self.infbound;
        let e = &self.equilibration.e;

        for (i, (&l, &u)) in std::iter::zip(bmin, bmax).enumerate() {
            let l = l.project(-inf, inf);
            let u = u.project(-inf, inf);
            self.lower_finite[i] = l > -inf;
            self.upper_finite[i] = u < inf;
            self.bmin[i] = if self.lower_finite[i] { l * e[i] } else { -inf };
            self.bmax[i] = if self.upper_finite[i] { u * e[i] } else { inf };
        }
    }

    /// Unscaled copy of the problem data
    pub(crate) fn unscaled(&self) -> NormalizedProblem<T> {
        let equil = &self.equilibration;
        let cinv = T::recip(equil.c);

        let mut Q = self.Q.clone();
        Q.lrscale(&equil.dinv, &equil.dinv);
        Q.scale(cinv);

        let mut A = self.A.clone();
        A.lrscale(&equil.einv, &equil.dinv);

        let mut q = self.q.clone();
        q.hadamard(&equil.dinv).scale(cinv);

        let mut bmin = self.bmin.clone();
        let mut bmax = self.bmax.clone();
        for i in 0..self.m {
            if self.lower_finite[i] {
                bmin[i] *= equil.einv[i];
            }
            if self.upper_finite[i] {
                bmax[i] *= equil.einv[i];
            }
        }

        NormalizedProblem {
            Q,
            q,
            A,
            bmin,
            bmax,
            infbound: self.infbound,
        }
    }

    /// ½x'Qx + q'x in the space of the stored data
    pub(crate) fn objective(&self, x: &[T], Qx: &[T]) -> T {
        x.dot(Qx) * (0.5).as_T() + self.q.dot(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn test_problem() -> NormalizedProblem<f64> {
        let Q = CscMatrix::from(&[[40., 2.], [2., 0.5]]).to_triu();
        let A = CscMatrix::from(&[[10., 0.], [1., 0.01]]);
        NormalizedProblem {
            Q,
            q: vec![3., -200.],
            A,
            bmin: vec![-1e20, 1.],
            bmax: vec![5., 1e20],
            infbound: 1e20,
        }
    }

    #[test]
    fn test_equilibrate_roundtrip() {
        let raw = test_problem();
        let mut data = ProblemData::new(test_problem());
        assert_eq!(data.lower_finite, vec![false, true]);
        assert_eq!(data.upper_finite, vec![true, false]);

        let settings = QPALMSettings::<f64>::default();
        data.equilibrate(&settings);

        // infinite bounds stay infinite
        assert_eq!(data.bmin[0], -1e20);
        assert_eq!(data.bmax[1], 1e20);

        // cost scaling brings q near unit size
        assert!(data.equilibration.c < 1.0);
        assert!(data.q.norm_inf() <= 1.0 + 1e-12);

        // unscaling recovers the original data
        let back = data.unscaled();
        assert!(back.q.norm_inf_diff(&raw.q) < 1e-10);
        assert!(back.Q.nzval.norm_inf_diff(&raw.Q.nzval) < 1e-10);
        assert!(back.A.nzval.norm_inf_diff(&raw.A.nzval) < 1e-10);
        assert!(back.bmin.norm_inf_diff(&raw.bmin) < 1e-10);
        assert!(back.bmax.norm_inf_diff(&raw.bmax) < 1e-10);
    }

    #[test]
    fn test_equilibrate_disabled() {
        let mut data = ProblemData::new(test_problem());
        let settings = QPALMSettings::<f64> {
            scaling_enable: false,
            ..QPALMSettings::default()
        };
        data.equilibrate(&settings);
        assert_eq!(data.equilibration.c, 1.0);
        assert_eq!(data.equilibration.d, vec![1.0; 2]);
        assert_eq!(data.q, vec![3., -200.]);
    }

    #[test]
    fn test_scaled_updates() {
        let mut data = ProblemData::new(test_problem());
        data.equilibrate(&QPALMSettings::default());

        data.set_q_unscaled(&[1.0, 1.0]);
        let back = data.unscaled();
        assert!(back.q.norm_inf_diff(&[1.0, 1.0]) < 1e-12);

        data.set_bounds_unscaled(&[0.0, f64::NEG_INFINITY], &[f64::INFINITY, 2.0]);
        assert_eq!(data.lower_finite, vec![true, false]);
        assert_eq!(data.upper_finite, vec![false, true]);
        let back = data.unscaled();
        assert_eq!(back.bmin[1], -1e20);
        assert!((back.bmax[1] - 2.0).abs() < 1e-12);
    }
}
