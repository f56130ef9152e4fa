#![allow(dead_code, non_snake_case)]

//! Provides functions to compute transmission probabilities for a single
//! particle on a one-dimensional, multi-channel tight-binding lattice using
//! Bardeen's tunneling theory, along with an exact wave-function-matching
//! solver to benchmark against.
//!
//! The calculation is split into the following stages:
//! - [Lattice Hamiltonians][hamiltonian] for a chain partitioned into five
//!   regions
//! - [Bound states][bound] of the isolated left and right wells
//! - [Matrix elements][coupling] of the tunneling perturbation
//! - [Averaging][average] over degenerate final states
//!
//! which are tied together in [`kernel`]. Exact results for the same central
//! region are computed by [`wfm`] through the adapter in [`benchmark`].
//!
//! See [`docs`] for theoretical background.

pub mod error;
pub mod utils;
pub mod hamiltonian;
pub mod bound;
pub mod coupling;
pub mod average;
pub mod kernel;
pub mod wfm;
pub mod benchmark;

pub mod docs;

/// Default upper bound on `E + 2t` for retained bound states.
pub const DEF_CUTOFF: f64 = 0.1;
/// Default full width of the window within which initial and final energies
/// are considered equal.
pub const DEF_WINDOW: f64 = 1e-9;
/// Default tolerance for structural (Hermiticity, channel conservation) checks.
pub const DEF_TOL: f64 = 1e-9;

pub type Arr1<S> = ndarray::ArrayBase<S, ndarray::Ix1>;
pub type Arr2<S> = ndarray::ArrayBase<S, ndarray::Ix2>;
pub type Arr3<S> = ndarray::ArrayBase<S, ndarray::Ix3>;
pub type Arr4<S> = ndarray::ArrayBase<S, ndarray::Ix4>;

pub use kernel::{ compute_bardeen_transmission, Config, Path, Transmission };
