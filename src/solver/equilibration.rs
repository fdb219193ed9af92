#![allow(non_snake_case)]
use super::settings::QPALMSettings;
use crate::algebra::*;

/// Scaling applied to a problem before it is solved.
///
/// The solver works with Q̄ = cDQD, q̄ = cDq and Ā = EAD, with the
/// finite bounds scaled by E.  Iterates map back to the original
/// problem through x = Dx̄ and y = Eȳ/c.
#[derive(Debug, Clone)]
pub struct EquilibrationData<T> {
    /// variable scaling D
    pub d: Vec<T>,
    /// D⁻¹
    pub dinv: Vec<T>,
    /// constraint scaling E
    pub e: Vec<T>,
    /// E⁻¹
    pub einv: Vec<T>,
    /// cost scaling
    pub c: T,
}

impl<T> EquilibrationData<T>
where
    T: FloatT,
{
    /// Identity scaling for `n` variables and `m` constraints
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            d: vec![T::one(); n],
            dinv: vec![T::one(); n],
            e: vec![T::one(); m],
            einv: vec![T::one(); m],
            c: T::one(),
        }
    }

    /// x = Dx̄
    pub fn unscale_primal(&self, x: &mut [T], xbar: &[T]) {
        x.copy_from(xbar).hadamard(&self.d);
    }

    /// y = Eȳ/c
    pub fn unscale_dual(&self, y: &mut [T], ybar: &[T]) {
        y.copy_from(ybar).hadamard(&self.e).scale(T::recip(self.c));
    }
}

/// Modified Ruiz equilibration of the matrix [Q A'; A 0], followed by
/// a scaling of the cost by c = 1/max(1, ‖q̄‖∞) within the scaling
/// limits.  `Q` is triu.
pub(crate) fn ruiz_equilibrate<T: FloatT>(
    Q: &mut CscMatrix<T>,
    A: &mut CscMatrix<T>,
    q: &mut [T],
    equil: &mut EquilibrationData<T>,
    settings: &QPALMSettings<T>,
) {
    let (smin, smax) = (settings.scaling_min, settings.scaling_max);

    // the inverse scalings are work vectors until the end
    let EquilibrationData {
        d,
        dinv: dwork,
        e,
        einv: ework,
        ..
    } = equil;

    for _ in 0..settings.scaling_iter {
        kkt_col_norms(Q, A, dwork, ework);

        for s in dwork.iter_mut().chain(ework.iter_mut()) {
            *s = T::recip(T::sqrt(limit_scaling(*s, smin, smax)));
        }

        Q.lrscale(dwork, dwork);
        A.lrscale(ework, dwork);
        q.hadamard(dwork);
        d.hadamard(dwork);
        e.hadamard(ework);
    }

    let c = T::recip(limit_scaling(T::max(T::one(), q.norm_inf()), smin, smax));
    Q.scale(c);
    q.scale(c);

    equil.c = c;
    equil.dinv.scalarop_from(T::recip, &equil.d);
    equil.einv.scalarop_from(T::recip, &equil.e);
}

// ∞-norms of the columns of [Q A'; A 0]: variables first, then constraints
fn kkt_col_norms<T: FloatT>(Q: &CscMatrix<T>, A: &CscMatrix<T>, nvar: &mut [T], ncon: &mut [T]) {
    Q.col_norms_sym(nvar);
    A.col_norms_fold(nvar);
    A.row_norms(ncon);
}

// tiny norms come from empty rows or columns and are left unscaled
pub(crate) fn limit_scaling<T: FloatT>(s: T, minval: T, maxval: T) -> T {
    if s < minval {
        T::one()
    } else if s > maxval {
        maxval
    } else {
        s
    }
}
