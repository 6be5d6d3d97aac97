//! # symtensor
//!
//! Tensors over reference-counted shared buffers, and a reverse-mode automatic
//! differentiation engine that builds derivatives as new graph nodes.
//!
//! ## Features
//!
//! - 1-based N-dimensional [`Tensor`] in row- or column-major layout.
//! - Explicit aliasing: `share_reshape`, sub-tensors and external spaces view
//!   the same storage, while `clone`/`copy_to` always copy.
//! - Aligned storage suitable for AVX2/NEON loads.
//! - Graph operators (`sin`, `cos`, `exp`, `multiply`, `sum`) whose derivatives
//!   are themselves graph nodes, so derivatives of any order come from
//!   differentiating again.
//!
//! ## Errors
//!
//! Recoverable failures return [`TensorError`]. Broken preconditions (shape
//! mismatch, out-of-range index, division by near zero, non-finite results)
//! panic with the source location and the failing expression. Index checks
//! run in debug builds, or in release with the `checked-index` feature.
//!
//! ## Example
//!
//! ```
//! use symtensor::prelude::*;
//!
//! let mut data = VariableMap::new();
//! let x = data.create_input(Tensor::from_vec(2, vec![2.0, 1.5]).unwrap(), "x");
//! let y = Function::Sin.f(&Set::from([x]), &mut data);
//!
//! let mut d = Derivative::new(&mut data);
//! let dx = *d.cds(&Set::from([x]), y).get(&x).unwrap();
//! d.fv(&Set::from([x]), dx);
//!
//! assert!((data.value(dx).at(1) - 2.0f64.cos()).abs() < 1e-6);
//! ```

#![warn(
    clippy::perf,
    clippy::correctness,
    clippy::complexity,
    clippy::style,
    clippy::suspicious,
    // clippy::pedantic
)]
#![deny(clippy::undocumented_unsafe_blocks, clippy::cast_possible_truncation)]
#![allow(clippy::float_cmp)]

#[macro_use]
mod macros;

pub mod ad;
pub mod algebra;
mod error;
pub mod memory;
pub mod ops;
#[cfg(feature = "serde")]
mod serialize;
pub mod shape;
pub mod shared;
mod storage;
mod tensor;
mod tensorizable;

pub use error::{Result, TensorError};
pub use tensor::{Element, Tensor};
pub use tensorizable::Tensorizable;

pub mod prelude {
    pub use crate::{
        Element, Result, Tensor, TensorError, Tensorizable,
        ad::{Derivative, Function, GraphConfig, VarId, Variable, VariableMap, VariableType},
        algebra::{Map, Set},
        ops::Scalar,
        shape::{Layout, Shape},
        shared::Space,
    };
}
