#![allow(non_snake_case)]
use super::problemdata::ProblemData;
use crate::algebra::*;
use itertools::izip;

/// Solver iterates and the quantities derived from them, all in
/// scaled space.
///
/// With multiplier estimate y, penalties σ and proximal center x₀:
/// ```text
/// z  = proj_[l,u](Ax + y/σ)
/// ŷ  = y + σ(Ax - z)
/// ∇φ = Qx + q + A'ŷ + ρ(x - x₀)
/// ```
#[derive(Debug, Clone)]
pub(crate) struct Iterates<T> {
    pub x: Vec<T>,
    pub x0: Vec<T>,
    pub y: Vec<T>,
    pub yh: Vec<T>,
    pub z: Vec<T>,

    pub Ax: Vec<T>,
    pub Qx: Vec<T>,
    pub Atyh: Vec<T>,

    /// Ax - z
    pub pri: Vec<T>,
    /// pri at the previous outer iteration
    pub pri_prev: Vec<T>,
    /// Qx + q + A'ŷ
    pub dua: Vec<T>,
    /// gradient of the subproblem objective
    pub dphi: Vec<T>,
    /// ŷ - y
    pub dy: Vec<T>,

    /// rows with Ax + y/σ outside of the bounds
    pub active: Vec<bool>,

    // Newton direction and its products
    pub d: Vec<T>,
    pub Ad: Vec<T>,
    pub Qd: Vec<T>,
    pub rhs: Vec<T>,

    // last accepted step
    pub dx: Vec<T>,
    pub Adx: Vec<T>,
    pub Qdx: Vec<T>,
}

impl<T> Iterates<T>
where
    T: FloatT,
{
    pub fn new(n: usize, m: usize) -> Self {
        Self {
            x: vec![T::zero(); n],
            x0: vec![T::zero(); n],
            y: vec![T::zero(); m],
            yh: vec![T::zero(); m],
            z: vec![T::zero(); m],
            Ax: vec![T::zero(); m],
            Qx: vec![T::zero(); n],
            Atyh: vec![T::zero(); n],
            pri: vec![T::zero(); m],
            pri_prev: vec![T::zero(); m],
            dua: vec![T::zero(); n],
            dphi: vec![T::zero(); n],
            dy: vec![T::zero(); m],
            active: vec![false; m],
            d: vec![T::zero(); n],
            Ad: vec![T::zero(); m],
            Qd: vec![T::zero(); n],
            rhs: vec![T::zero(); n],
            dx: vec![T::zero(); n],
            Adx: vec![T::zero(); m],
            Qdx: vec![T::zero(); n],
        }
    }

    /// Start from the given scaled primal and dual points
    pub fn reset(&mut self, data: &ProblemData<T>, x: &[T], y: &[T]) {
        self.x.copy_from(x);
        self.x0.copy_from(x);
        self.y.copy_from(y);
        self.dx.set(T::zero());
        self.Adx.set(T::zero());
        self.Qdx.set(T::zero());
        self.pri_prev.set(T::infinity());

        data.A.gemv(&mut self.Ax, &self.x, T::one(), T::zero());
        data.Q.sym().symv(&mut self.Qx, &self.x, T::one(), T::zero());
    }

    /// Recompute z, ŷ, the active set, the residual vectors and the
    /// subproblem gradient at the current x.
    pub fn update_residuals(&mut self, data: &ProblemData<T>, sigma: &[T], rho: T) {
        for i in 0..data.m {
            let w = self.Ax[i] + self.y[i] / sigma[i];
            let z = w.project(data.bmin[i], data.bmax[i]);
            self.z[i] = z;
            self.active[i] = w < data.bmin[i] || w > data.bmax[i];
            self.pri[i] = self.Ax[i] - z;
            self.yh[i] = self.y[i] + sigma[i] * self.pri[i];
            self.dy[i] = self.yh[i] - self.y[i];
        }

        data.A.t().gemv(&mut self.Atyh, &self.yh, T::one(), T::zero());

        for (dua, &qx, &q, &aty) in izip!(&mut self.dua, &self.Qx, &data.q, &self.Atyh) {
            *dua = qx + q + aty;
        }
        self.update_dphi(rho);
    }

    /// ∇φ = dua + ρ(x - x₀)
    pub fn update_dphi(&mut self, rho: T) {
        for (dphi, &dua, &x, &x0) in izip!(&mut self.dphi, &self.dua, &self.x, &self.x0) {
            *dphi = dua + rho * (x - x0);
        }
    }

    /// Take the step τd, where Ad and Qd have been computed
    pub fn take_step(&mut self, tau: T) {
        self.dx.waxpby(tau, &self.d, T::zero(), &self.d);
        self.Adx.waxpby(tau, &self.Ad, T::zero(), &self.Ad);
        self.Qdx.waxpby(tau, &self.Qd, T::zero(), &self.Qd);

        self.x.axpby(T::one(), &self.dx, T::one());
        self.Ax.axpby(T::one(), &self.Adx, T::one());
        self.Qx.axpby(T::one(), &self.Qdx, T::one());
    }

    /// Multiplier update at the end of an outer iteration
    pub fn outer_update(&mut self) {
        self.x0.copy_from(&self.x);
        self.pri_prev.copy_from(&self.pri);
        self.y.copy_from(&self.yh);
    }
}
