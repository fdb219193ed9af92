use super::info::QPALMInfo;
use super::problemdata::ProblemData;
use super::settings::QPALMSettings;
use crate::algebra::*;
use crate::io::PrintTarget;
use std::io::{Result, Write};
use std::time::Duration;

const RULE: &str = "-----------------------------------------------------------------------";

// iteration table: (heading, width)
const COLUMNS: [(&str, usize); 7] = [
    ("iter", 4),
    ("outer", 5),
    ("objective", 11),
    ("pres", 8),
    ("dres", 8),
    ("max σ", 8),
    ("ρ", 8),
];

impl<T> QPALMInfo<T>
where
    T: FloatT,
{
    pub(crate) fn print_configuration(
        &self,
        out: &mut PrintTarget,
        settings: &QPALMSettings<T>,
        data: &ProblemData<T>,
        linsys_name: &str,
    ) -> Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        writeln!(out, "{RULE}")?;
        writeln!(out, "           QPALM.rs v{}  -  Proximal ALM for QPs", crate::VERSION)?;
        writeln!(out, "{RULE}\n")?;

        writeln!(out, "problem:")?;
        writeln!(out, "  variables   = {}, nnz(Q) = {}", data.n, data.Q.nnz())?;
        writeln!(out, "  constraints = {}, nnz(A) = {}\n", data.m, data.A.nnz())?;

        write_settings(out, settings, linsys_name)
    }

    pub(crate) fn print_status_header(
        &self,
        out: &mut PrintTarget,
        settings: &QPALMSettings<T>,
    ) -> Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        for (name, width) in COLUMNS {
            write!(out, "{name:<width$}  ")?;
        }
        writeln!(out, "\n{RULE}")?;
        out.flush()
    }

    /// One table row every `print_interval` outer iterations
    pub(crate) fn print_status(
        &self,
        out: &mut PrintTarget,
        settings: &QPALMSettings<T>,
        sigma_max: T,
        rho: T,
    ) -> Result<()> {
        if !settings.verbose || self.iter_out % settings.print_interval.max(1) != 0 {
            return Ok(());
        }
        write!(out, "{:>4}  {:>5}  ", self.iter, self.iter_out)?;
        write!(out, "{}  ", sci(self.objective, 4, true))?;
        for v in [self.pri_res_norm, self.dua_res_norm, sigma_max, rho] {
            write!(out, "{}  ", sci(v, 2, false))?;
        }
        writeln!(out)
    }

    pub(crate) fn print_footer(&self, out: &mut PrintTarget, settings: &QPALMSettings<T>) -> Result<()> {
        if !settings.verbose {
            return Ok(());
        }
        writeln!(out, "{RULE}")?;
        writeln!(out, "Terminated with status = {}", self.status)?;
        writeln!(
            out,
            "iterations = {} ({} outer), inner nonconvergence = {}",
            self.iter, self.iter_out, self.inner_nonconvergence
        )?;
        if self.objective.is_finite() {
            writeln!(out, "objective = {}", sci(self.objective, 6, true))?;
        }
        writeln!(
            out,
            "setup time = {:?}, solve time = {:?}",
            Duration::from_secs_f64(self.setup_time),
            Duration::from_secs_f64(self.solve_time)
        )?;
        out.flush()
    }
}

fn write_settings<T: FloatT>(out: &mut PrintTarget, s: &QPALMSettings<T>, linsys_name: &str) -> Result<()> {
    let onoff = |b: bool| if b { "on" } else { "off" };
    let bits = 8 * std::mem::size_of::<T>();

    writeln!(out, "settings:")?;
    writeln!(out, "  linear solver: {linsys_name}, precision: {bits} bit")?;
    writeln!(
        out,
        "  max iter = {}, inner max iter = {}, outer max iter = {}, time limit = {}",
        s.max_iter,
        s.inner_max_iter,
        s.max_outer_iter,
        if s.time_limit.is_finite() {
            format!("{:.1e} s", s.time_limit)
        } else {
            "none".to_string()
        }
    )?;
    writeln!(
        out,
        "  eps_abs = {:.1e}, eps_rel = {:.1e}, eps_prim_inf = {:.1e}, eps_dual_inf = {:.1e}",
        s.eps_abs, s.eps_rel, s.eps_prim_inf, s.eps_dual_inf
    )?;
    writeln!(
        out,
        "  penalty: σ₀ = {:.1e}, Δ = {:.1e}, θ = {:.2}, max = {:.1e}",
        s.initial_penalty, s.penalty_growth, s.penalty_progress_ratio, s.max_penalty
    )?;
    writeln!(
        out,
        "  proximal: {}, ρ₀ = {:.1e}, min = {:.1e}, nonconvex: {}",
        onoff(s.proximal_enable),
        s.initial_proximal,
        s.min_proximal,
        onoff(s.nonconvex)
    )?;
    writeln!(
        out,
        "  scaling: {} ({} iter), limits = [{:.1e}, {:.1e}]\n",
        onoff(s.scaling_enable),
        s.scaling_iter,
        s.scaling_min,
        s.scaling_max
    )
}

// scientific notation with a signed, two digit exponent: 1.50e-03
fn sci<T: FloatT>(v: T, digits: usize, signed: bool) -> String {
    let s = if signed {
        format!("{v:+.digits$e}")
    } else {
        format!("{v:.digits$e}")
    };
    match s.split_once('e') {
        Some((mantissa, exp)) => {
            let (sign, mag) = match exp.strip_prefix('-') {
                Some(mag) => ('-', mag),
                None => ('+', exp),
            };
            format!("{mantissa}e{sign}{mag:0>2}")
        }
        // inf and NaN
        None => s,
    }
}

#[test]
fn test_sci_format() {
    assert_eq!(sci(1000.0, 2, false), "1.00e+03");
    assert_eq!(sci(1e-3, 2, false), "1.00e-03");
    assert_eq!(sci(-1e-12, 2, true), "-1.00e-12");
    assert_eq!(sci(1.5e12, 1, true), "+1.5e+12");
    assert_eq!(sci(f64::INFINITY, 2, false), "inf");
}
