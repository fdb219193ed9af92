#![allow(non_snake_case)]
use num_traits::{Float, FromPrimitive, NumAssign};
use std::fmt::{Debug, Display, LowerExp};

/// Numeric bounds shared by every floating point type the solver
/// accepts, independent of serialization support.
pub trait CoreFloatT:
    'static + Send + Sync + Float + NumAssign + FromPrimitive + Default + Display + LowerExp + Debug
{
}

impl<T> CoreFloatT for T where
    T: 'static + Send + Sync + Float + NumAssign + FromPrimitive + Default + Display + LowerExp + Debug
{
}

cfg_if::cfg_if! {
    if #[cfg(feature="serde")] {
        use serde::{de::DeserializeOwned, Serialize};

        /// Floating point type of all problem data and iterates.
        ///
        /// Blanket implemented for anything satisfying [`CoreFloatT`],
        /// so f32 and f64 in practice.  With the `serde` feature the
        /// type must also be serializable.
        pub trait FloatT: CoreFloatT + Serialize + DeserializeOwned {}
        impl<T> FloatT for T where T: CoreFloatT + Serialize + DeserializeOwned {}
    } else {
        /// Floating point type of all problem data and iterates.
        ///
        /// Blanket implemented for anything satisfying [`CoreFloatT`],
        /// so f32 and f64 in practice.
        pub trait FloatT: CoreFloatT {}
        impl<T> FloatT for T where T: CoreFloatT {}
    }
}

/// Conversion of primitive constants into a [`FloatT`], so that
/// constants read `(0.5).as_T()` rather than `T::from_f64(0.5).unwrap()`.
///
/// Used by the [settings](crate::solver::QPALMSettings) defaults and
/// internally for algorithm constants.
pub trait AsFloatT<T>: 'static {
    fn as_T(&self) -> T;
}

macro_rules! impl_as_float {
    ($($ty:ty => $conv:ident),*) => {$(
        impl<T: FromPrimitive + 'static> AsFloatT<T> for $ty {
            #[inline]
            fn as_T(&self) -> T {
                // every primitive listed converts to f32 and f64
                T::$conv(*self).unwrap()
            }
        }
    )*};
}
impl_as_float!(u32 => from_u32, u64 => from_u64, usize => from_usize, f32 => from_f32, f64 => from_f64);
