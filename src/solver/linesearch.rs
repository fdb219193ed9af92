#![allow(non_snake_case)]
use super::settings::QPALMSettings;
use crate::algebra::*;

/// Data of the one dimensional function minimized along a Newton
/// direction d.  With τ the step length,
/// ```text
/// ψ(τ) = ½ητ² + βτ + Σ ½ max(0, δ_i τ - α_i)²
/// ```
/// where the sum has one piece per finite bound.
pub(crate) struct LineSearchInput<'a, T> {
    /// d'Qd + ρ‖d‖²
    pub eta: T,
    /// d'(Qx + q) + ρ(x - x₀)'d
    pub beta: T,
    pub Ax: &'a [T],
    pub Ad: &'a [T],
    pub y: &'a [T],
    pub sigma: &'a [T],
    pub bmin: &'a [T],
    pub bmax: &'a [T],
    pub lower_finite: &'a [bool],
    pub upper_finite: &'a [bool],
}

#[derive(Debug, Clone, Copy)]
struct Piece<T> {
    delta: T,
    alpha: T,
}

impl<T: FloatT> Piece<T> {
    // value of ½max(0, δτ - α)²
    fn value(&self, tau: T) -> T {
        let v = T::max(T::zero(), self.delta * tau - self.alpha);
        v * v * (0.5).as_T()
    }
}

/// Exact line search on the piecewise quadratic augmented Lagrangian
#[derive(Debug, Clone)]
pub(crate) struct LineSearch<T> {
    pieces: Vec<Piece<T>>,
    // (breakpoint, piece index) for breakpoints beyond zero
    breakpoints: Vec<(T, usize)>,
}

impl<T> LineSearch<T>
where
    T: FloatT,
{
    pub fn new(m: usize) -> Self {
        Self {
            pieces: Vec::with_capacity(2 * m),
            breakpoints: Vec::with_capacity(2 * m),
        }
    }

    /// Step length minimizing ψ, safeguarded by backtracking on the
    /// sufficient decrease condition.  Returns zero if no acceptable
    /// step is found.
    pub fn search(&mut self, input: &LineSearchInput<T>, settings: &QPALMSettings<T>) -> T {
        self.build_pieces(input);

        // slope of ψ' = aτ + b on the current segment
        let mut a = input.eta;
        let mut b = input.beta;
        for p in self.pieces.iter() {
            if p.alpha < T::zero() || (p.alpha == T::zero() && p.delta > T::zero()) {
                a += p.delta * p.delta;
                b -= p.delta * p.alpha;
            }
        }
        let slope0 = b;
        if !(slope0 < T::zero()) {
            return T::zero();
        }

        self.breakpoints.clear();
        for (k, p) in self.pieces.iter().enumerate() {
            if p.delta != T::zero() {
                let s = p.alpha / p.delta;
                if s > T::zero() {
                    self.breakpoints.push((s, k));
                }
            }
        }
        self.breakpoints
            .sort_by(|x, y| x.0.partial_cmp(&y.0).unwrap_or(std::cmp::Ordering::Equal));

        let mut tau = None;
        for &(s, k) in self.breakpoints.iter() {
            if a * s + b >= T::zero() {
                tau = Some(if a > T::zero() { -b / a } else { s });
                break;
            }
            let p = &self.pieces[k];
            let dd = p.delta * p.delta;
            let da = p.delta * p.alpha;
            if p.delta > T::zero() {
                // piece becomes active
                a += dd;
                b -= da;
            } else {
                a -= dd;
                b += da;
            }
        }
        let mut tau = tau.unwrap_or(if a > T::zero() { -b / a } else { T::one() });

        // sufficient decrease safeguard
        let c1 = settings.linesearch_armijo;
        for _ in 0..settings.linesearch_max_backtrack {
            if self.decrease(input, tau) <= c1 * tau * slope0 {
                return tau;
            }
            tau *= settings.linesearch_backtrack_step;
        }
        log::debug!("line search found no step with sufficient decrease");
        T::zero()
    }

    fn build_pieces(&mut self, input: &LineSearchInput<T>) {
        self.pieces.clear();
        for i in 0..input.Ax.len() {
            let sqrt_sigma = T::sqrt(input.sigma[i]);
            let (ax, ad, y, sigma) = (input.Ax[i], input.Ad[i], input.y[i], input.sigma[i]);

            if input.lower_finite[i] {
                self.pieces.push(Piece {
                    delta: -sqrt_sigma * ad,
                    alpha: (y + sigma * (ax - input.bmin[i])) / sqrt_sigma,
                });
            }
            if input.upper_finite[i] {
                self.pieces.push(Piece {
                    delta: sqrt_sigma * ad,
                    alpha: (sigma * (input.bmax[i] - ax) - y) / sqrt_sigma,
                });
            }
        }
    }

    // ψ(τ) - ψ(0)
    fn decrease(&self, input: &LineSearchInput<T>, tau: T) -> T {
        let half: T = (0.5).as_T();
        let mut f = half * input.eta * tau * tau + input.beta * tau;
        for p in self.pieces.iter() {
            f += p.value(tau) - p.value(T::zero());
        }
        f
    }
}
