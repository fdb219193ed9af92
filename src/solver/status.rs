use thiserror::Error;

/// Status of the solver at termination

#[derive(PartialEq, Eq, Clone, Debug, Copy, Hash, Default)]
pub enum SolverStatus {
    /// Problem is not solved (solver hasn't run, or was interrupted
    /// by a failure that left no meaningful iterate).
    #[default]
    Unsolved,
    /// Solver terminated with a solution.
    Solved,
    /// Solver terminated with a solution at the reduced tolerances.
    SolvedInaccurate,
    /// Problem is primal infeasible.  A certificate is returned.
    PrimalInfeasible,
    /// Problem is primal infeasible at the reduced tolerances.
    PrimalInfeasibleInaccurate,
    /// Problem is dual infeasible.  A certificate is returned.
    DualInfeasible,
    /// Problem is dual infeasible at the reduced tolerances.
    DualInfeasibleInaccurate,
    /// Iteration limit reached.  The last iterate is returned.
    MaxIterReached,
    /// Time limit reached.  The last iterate is returned.
    TimeLimitReached,
    /// The Newton system could not be made positive definite
    /// within the allowed regularization attempts.
    NonConvex,
}

/// Error returned when converting an unknown integer status code
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
#[error("unknown solver status code {0}")]
pub struct UnknownStatusCode(pub i32);

impl SolverStatus {
    /// Every status, in order of declaration
    pub const ALL: [SolverStatus; 10] = [
        SolverStatus::Unsolved,
        SolverStatus::Solved,
        SolverStatus::SolvedInaccurate,
        SolverStatus::PrimalInfeasible,
        SolverStatus::PrimalInfeasibleInaccurate,
        SolverStatus::DualInfeasible,
        SolverStatus::DualInfeasibleInaccurate,
        SolverStatus::MaxIterReached,
        SolverStatus::TimeLimitReached,
        SolverStatus::NonConvex,
    ];

    /// Integer code of the status
    pub fn code(&self) -> i32 {
        match self {
            SolverStatus::Solved => 1,
            SolverStatus::SolvedInaccurate => 3,
            SolverStatus::MaxIterReached => -2,
            SolverStatus::PrimalInfeasible => -3,
            SolverStatus::DualInfeasible => -4,
            SolverStatus::TimeLimitReached => -5,
            SolverStatus::NonConvex => -7,
            SolverStatus::PrimalInfeasibleInaccurate => -8,
            SolverStatus::DualInfeasibleInaccurate => -9,
            SolverStatus::Unsolved => -10,
        }
    }

    /// Status symbol, e.g. `Primal_infeasible`
    pub fn as_str(&self) -> &'static str {
        match self {
            SolverStatus::Solved => "Solved",
            SolverStatus::SolvedInaccurate => "Solved_inaccurate",
            SolverStatus::MaxIterReached => "Max_iter_reached",
            SolverStatus::PrimalInfeasible => "Primal_infeasible",
            SolverStatus::DualInfeasible => "Dual_infeasible",
            SolverStatus::TimeLimitReached => "Time_limit_reached",
            SolverStatus::NonConvex => "Non_convex",
            SolverStatus::PrimalInfeasibleInaccurate => "Primal_infeasible_inaccurate",
            SolverStatus::DualInfeasibleInaccurate => "Dual_infeasible_inaccurate",
            SolverStatus::Unsolved => "Unsolved",
        }
    }

    /// Solved, at full or reduced accuracy
    pub fn is_solved(&self) -> bool {
        matches!(self, SolverStatus::Solved | SolverStatus::SolvedInaccurate)
    }

    pub fn is_primal_infeasible(&self) -> bool {
        matches!(
            self,
            SolverStatus::PrimalInfeasible | SolverStatus::PrimalInfeasibleInaccurate
        )
    }

    pub fn is_dual_infeasible(&self) -> bool {
        matches!(
            self,
            SolverStatus::DualInfeasible | SolverStatus::DualInfeasibleInaccurate
        )
    }

    /// Any status other than `Unsolved`
    pub fn is_terminal(&self) -> bool {
        !matches!(self, SolverStatus::Unsolved)
    }

    // statuses that report the final iterate as x and y
    pub(crate) fn has_solution(&self) -> bool {
        self.is_solved()
            || matches!(
                self,
                SolverStatus::MaxIterReached | SolverStatus::TimeLimitReached
            )
    }
}

impl std::fmt::Display for SolverStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl TryFrom<i32> for SolverStatus {
    type Error = UnknownStatusCode;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        SolverStatus::ALL
            .into_iter()
            .find(|status| status.code() == code)
            .ok_or(UnknownStatusCode(code))
    }
}

impl std::str::FromStr for SolverStatus {
    type Err = UnknownStatusCode;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        SolverStatus::ALL
            .into_iter()
            .find(|status| status.as_str() == s)
            .ok_or(UnknownStatusCode(i32::MIN))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_codes_roundtrip() {
        for status in SolverStatus::ALL {
            assert_eq!(SolverStatus::try_from(status.code()), Ok(status));
            assert_eq!(status.as_str().parse::<SolverStatus>(), Ok(status));
            assert_eq!(status.to_string(), status.as_str());
        }

        let mut codes: Vec<_> = SolverStatus::ALL.iter().map(|s| s.code()).collect();
        codes.sort_unstable();
        codes.dedup();
        assert_eq!(codes.len(), SolverStatus::ALL.len());

        assert_eq!(SolverStatus::Solved.code(), 1);
        assert_eq!(SolverStatus::NonConvex.code(), -7);
        assert_eq!(SolverStatus::Unsolved.code(), -10);
        assert_eq!(SolverStatus::try_from(0), Err(UnknownStatusCode(0)));
        assert!("solved".parse::<SolverStatus>().is_err());
    }

    #[test]
    fn test_status_classes() {
        assert!(SolverStatus::SolvedInaccurate.is_solved());
        assert!(SolverStatus::PrimalInfeasibleInaccurate.is_primal_infeasible());
        assert!(!SolverStatus::PrimalInfeasible.is_dual_infeasible());
        assert!(SolverStatus::DualInfeasible.is_dual_infeasible());
        assert!(!SolverStatus::Unsolved.is_terminal());
        assert!(SolverStatus::NonConvex.is_terminal());
        assert!(SolverStatus::MaxIterReached.has_solution());
        assert!(!SolverStatus::NonConvex.has_solution());
        assert_eq!(SolverStatus::default(), SolverStatus::Unsolved);
    }
}
