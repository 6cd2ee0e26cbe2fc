//! Typed confidence values and the algebra over them.
//!
//! A confidence is never a bare `f64` in this system. Every claim boundary
//! requires a [`ConfidenceValue`], and the serde representation is internally
//! tagged so a raw JSON number can never deserialize into one.

mod algebra;
mod value;

pub use value::{
    ensure_typed_confidence, BoundsBasis, CalibrationStatus, ConfidenceClass, ConfidenceValue,
};
