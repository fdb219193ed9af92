#![allow(non_snake_case)]

use qpalm::{algebra::*, io::ConfigurablePrintTarget, solver::*};

fn test_print_solver() -> Workspace<f64> {
    let Q = CscMatrix::identity(1);
    let q = [0.];
    let A = CscMatrix::identity(1);
    let bmin = [1.];
    let bmax = [f64::INFINITY];
    let settings = QPALMSettings::default();
    let problem = ProblemSetup::new().Q(&Q).q(&q).A(&A).bmin(&bmin).bmax(&bmax);
    Workspace::setup(&problem, settings).unwrap()
}

#[test]
fn test_print_to_stdout() {
    let mut solver = test_print_solver();
    solver.print_to_stdout();
    solver.solve().unwrap();
}

#[test]
fn test_print_to_buffer() {
    let mut solver = test_print_solver();
    solver.print_to_buffer();
    solver.solve().unwrap();
    let result = solver.get_print_buffer().unwrap();
    assert!(result.contains("QPALM.rs"));
    assert!(result.contains("Terminated with status = Solved"));
}

#[test]
fn test_print_silent() {
    let mut solver = test_print_solver();
    solver.print_to_buffer();
    let settings = QPALMSettings {
        verbose: false,
        ..QPALMSettings::default()
    };
    solver.update_settings(settings).unwrap();
    solver.solve().unwrap();
    let result = solver.get_print_buffer().unwrap();
    assert!(result.is_empty());
}

#[test]
fn test_print_to_file() {
    use std::io::{Read, Seek};

    let mut solver = test_print_solver();
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    solver.print_to_file(file.into_file());
    solver.solve().unwrap();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("QPALM.rs"));
}

#[test]
fn test_print_to_stream() {
    use std::io::{Read, Seek};

    let mut solver = test_print_solver();
    let file = tempfile::NamedTempFile::new().unwrap();
    let mut file2 = file.reopen().unwrap();
    let stream = Box::new(file.into_file());

    solver.print_to_stream(stream);
    solver.solve().unwrap();

    file2.seek(std::io::SeekFrom::Start(0)).unwrap();
    let mut result = String::new();
    file2.read_to_string(&mut result).unwrap();
    assert!(result.contains("QPALM.rs"));
}
