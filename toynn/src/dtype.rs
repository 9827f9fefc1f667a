use num_traits::{Float, NumAssignOps};
use rand::distributions::uniform::SampleUniform;
use serde::Serialize;
use serde::de::DeserializeOwned;
use std::fmt::{Debug, Display};

/// Element type of every matrix and network in the crate.
pub trait DType:
    'static
    + Sized
    + Copy
    + Send
    + Sync
    + Debug
    + Display
    + Float
    + NumAssignOps
    + SampleUniform
    + Serialize
    + DeserializeOwned
{
    const ZERO: Self;
    const ONE: Self;
    fn from_f64(val: f64) -> Self;
    fn from_usize(val: usize) -> Self;
    /// Lossless widening, used by the persisted format.
    fn as_f64(self) -> f64;
}

macro_rules! impl_dtype {
    ($ty:ty) => {
        impl DType for $ty {
            const ZERO: Self = 0.0;
            const ONE: Self = 1.0;
            #[inline]
            fn from_f64(val: f64) -> Self {
                val as $ty
            }
            #[inline]
            fn from_usize(val: usize) -> Self {
                val as $ty
            }
            #[inline]
            fn as_f64(self) -> f64 {
                self as f64
            }
        }
    };
}

impl_dtype!(f32);
impl_dtype!(f64);
