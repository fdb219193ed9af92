#![allow(non_snake_case)]

mod arithmetic;
mod core;
mod matrix_math;

pub use self::core::*;
