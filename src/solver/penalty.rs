use super::settings::QPALMSettings;
use crate::algebra::*;

/// Per-constraint penalties σ and the proximal weight ρ.
///
/// ρ never drops below `rho_floor`.  The floor starts at
/// `min_proximal` (or above |λ_min(Q)| for nonconvex problems) and is
/// raised whenever a factorization only succeeded after regularization.
#[derive(Debug, Clone)]
pub struct PenaltyManager<T> {
    pub sigma: Vec<T>,
    pub rho: T,
    pub rho_floor: T,
    // indices changed by the last penalty update
    changed: Vec<usize>,
}

impl<T> PenaltyManager<T>
where
    T: FloatT,
{
    pub fn new(m: usize) -> Self {
        Self {
            sigma: vec![T::zero(); m],
            rho: T::zero(),
            rho_floor: T::zero(),
            changed: Vec::with_capacity(m),
        }
    }

    /// Reset σ and ρ to their initial values.  `rho_floor` is the
    /// smallest proximal weight allowed for the problem.
    pub fn initialize(&mut self, settings: &QPALMSettings<T>, rho_floor: T) {
        self.sigma.set(settings.initial_penalty);
        self.rho_floor = rho_floor;
        self.rho = if settings.proximal_enable {
            T::max(settings.initial_proximal, rho_floor)
        } else {
            rho_floor
        };
        self.changed.clear();
    }

    /// Grow the penalty of every constraint whose violation did not
    /// shrink enough since the previous outer iteration.  Returns the
    /// indices of the penalties that changed.
    pub fn update_penalty(
        &mut self,
        violation: &[T],
        prev_violation: &[T],
        settings: &QPALMSettings<T>,
    ) -> &[usize] {
        let theta = settings.penalty_progress_ratio;
        let delta = settings.penalty_growth;
        let sigma_max = settings.max_penalty;
        let scale = violation.norm_inf() + (1e-6).as_T();

        self.changed.clear();
        for (i, (&v, &vp)) in std::iter::zip(violation, prev_violation).enumerate() {
            if v.abs() <= theta * vp.abs() {
                continue;
            }
            let factor = T::max(T::one(), delta * v.abs() / scale);
            let sigma_new = T::min(sigma_max, factor * self.sigma[i]);
            if sigma_new != self.sigma[i] {
                self.sigma[i] = sigma_new;
                self.changed.push(i);
            }
        }
        &self.changed
    }

    /// Shrink ρ after a converged subproblem.  Returns true if ρ changed.
    pub fn update_proximal(&mut self, inner_converged: bool, settings: &QPALMSettings<T>) -> bool {
        if !inner_converged || !settings.proximal_enable {
            return false;
        }
        let rho_new = T::max(self.rho * settings.proximal_shrink, self.rho_floor);
        let changed = rho_new != self.rho;
        self.rho = rho_new;
        changed
    }

    /// Raise ρ after a failed factorization
    pub fn regularize(&mut self, settings: &QPALMSettings<T>) {
        self.rho = T::max(
            self.rho * settings.proximal_regularization_factor,
            settings.min_proximal,
        );
    }

    /// Keep ρ at or above its current value from now on
    pub fn commit_regularization(&mut self) {
        self.rho_floor = T::max(self.rho_floor, self.rho);
    }
}
