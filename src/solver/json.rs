#![allow(non_snake_case)]
use super::problem::ProblemSetup;
use super::settings::QPALMSettings;
use super::workspace::Workspace;
use crate::algebra::*;

use serde::{de::DeserializeOwned, Deserialize, Serialize};
use std::io::Write;
use std::{fs::File, io, io::Read};

// The problem as provided by the user, i.e. unscaled
// and without any solver internals.

#[derive(Serialize, Deserialize)]
#[serde(bound = "T: Serialize + DeserializeOwned")]
struct JsonProblemData<T: FloatT> {
    pub Q: CscMatrix<T>,
    pub q: Vec<T>,
    pub A: CscMatrix<T>,
    pub bmin: Vec<T>,
    pub bmax: Vec<T>,
    pub settings: QPALMSettings<T>,
}

impl<T> Workspace<T>
where
    T: FloatT + DeserializeOwned + Serialize,
{
    /// Write the (unscaled) problem and settings to a JSON file
    pub fn write_to_file(&self, file: &mut File) -> Result<(), io::Error> {
        let core = self
            .core
            .as_ref()
            .ok_or_else(|| io::Error::new(io::ErrorKind::Other, "Workspace has been released"))?;

        let problem = core.data.unscaled();
        let mut json_data = JsonProblemData {
            Q: problem.Q,
            q: problem.q,
            A: problem.A,
            bmin: problem.bmin,
            bmax: problem.bmax,
            settings: core.settings.clone(),
        };

        // sanitize values that can't be serialized, i.e. infs
        sanitize_bounds(&mut json_data.bmin);
        sanitize_bounds(&mut json_data.bmax);
        sanitize_settings(&mut json_data.settings);

        let json = serde_json::to_string(&json_data)?;
        file.write_all(json.as_bytes())?;

        Ok(())
    }

    /// Read a problem written by [`write_to_file`](Workspace::write_to_file)
    /// and set up a new workspace for it
    pub fn read_from_file(file: &mut File) -> Result<Self, io::Error> {
        let mut buffer = String::new();
        file.read_to_string(&mut buffer)?;
        let mut json_data: JsonProblemData<T> = serde_json::from_str(&buffer)?;

        // restore sanitized values to their (likely) original values
        desanitize_bounds(&mut json_data.bmin);
        desanitize_bounds(&mut json_data.bmax);
        desanitize_settings(&mut json_data.settings);

        let problem = ProblemSetup::new()
            .Q(&json_data.Q)
            .q(&json_data.q)
            .A(&json_data.A)
            .bmin(&json_data.bmin)
            .bmax(&json_data.bmax);

        Self::setup(&problem, json_data.settings.clone())
            .map_err(|e| io::Error::new(io::ErrorKind::InvalidData, e))
    }
}

fn sanitize_bounds<T: FloatT>(b: &mut [T]) {
    b.scalarop(|v| {
        if v == T::infinity() {
            T::max_value()
        } else if v == T::neg_infinity() {
            T::min_value()
        } else {
            v
        }
    });
}

fn desanitize_bounds<T: FloatT>(b: &mut [T]) {
    b.scalarop(|v| {
        if v == T::max_value() {
            T::infinity()
        } else if v == T::min_value() {
            T::neg_infinity()
        } else {
            v
        }
    });
}

fn sanitize_settings<T: FloatT>(settings: &mut QPALMSettings<T>) {
    if settings.time_limit == f64::INFINITY {
        settings.time_limit = f64::MAX;
    }
}

fn desanitize_settings<T: FloatT>(settings: &mut QPALMSettings<T>) {
    if settings.time_limit == f64::MAX {
        settings.time_limit = f64::INFINITY;
    }
}

#[test]
fn test_json_io() {
    use std::io::{Seek, SeekFrom};

    let Q = CscMatrix::from(&[[2.0]]);
    let q = [1.0];
    let A = CscMatrix::from(&[[-1.0]]);
    let bmin = [f64::NEG_INFINITY];
    let bmax = [-2.0];

    let settings = crate::solver::QPALMSettingsBuilder::default()
        .verbose(false)
        .build()
        .unwrap();

    let problem = ProblemSetup::new()
        .Q(&Q)
        .q(&q)
        .A(&A)
        .bmin(&bmin)
        .bmax(&bmax);
    let mut solver = Workspace::<f64>::setup(&problem, settings).unwrap();
    let results = solver.solve().unwrap();

    // write the problem to a file
    let mut file = tempfile::tempfile().unwrap();
    solver.write_to_file(&mut file).unwrap();

    // read the problem from the file
    file.seek(SeekFrom::Start(0)).unwrap();
    let mut solver2 = Workspace::<f64>::read_from_file(&mut file).unwrap();
    let results2 = solver2.solve().unwrap();
    assert_eq!(results.info.status, results2.info.status);
    assert!((results.x[0] - results2.x[0]).abs() < 1e-3);
    assert!(solver2.settings().unwrap().time_limit.is_infinite());
}
