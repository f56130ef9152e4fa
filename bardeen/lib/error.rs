//! Collection of all error types.
//!
//! All errors derive [`thiserror::Error`], making them composable when allowed
//! and compatible with application code using [`anyhow`][anyhow].
//!
//! [anyhow]: https://crates.io/crates/anyhow

use ndarray as nd;
use ndarray_linalg::error::LinalgError;
use thiserror::Error;

/// Returned when a per-channel matrix does not have the shape `(n, n)` for `n`
/// local degrees of freedom.
#[derive(Debug, Error)]
#[error("{0}: expected a {1}×{1} channel matrix; got {2}×{3}")]
pub struct ShapeError(pub &'static str, pub usize, pub usize, pub usize);

impl ShapeError {
    pub(crate) fn check<S, A>(
        name: &'static str,
        a: &nd::ArrayBase<S, nd::Ix2>,
        n_loc: usize,
    ) -> Result<(), Self>
    where S: nd::Data<Elem = A>
    {
        let (r, c) = a.dim();
        (r == n_loc && c == n_loc).then_some(()).ok_or(Self(name, n_loc, r, c))
    }
}

/// Returned when a region is given zero sites.
#[derive(Debug, Error)]
#[error("{0}: site counts must be greater than 0")]
pub struct SitesError(pub &'static str);

impl SitesError {
    pub(crate) fn check(name: &'static str, n: usize) -> Result<(), Self> {
        (n > 0).then_some(()).ok_or(Self(name))
    }
}

/// Returned from Hamiltonian construction and the Bardeen kernel.
#[derive(Debug, Error)]
pub enum BardeenError {
    /// [`ShapeError`]
    #[error("shape error: {0}")]
    Shape(#[from] ShapeError),

    /// [`SitesError`]
    #[error("site count error: {0}")]
    Sites(#[from] SitesError),

    /// Returned when the central region has an even number of sites.
    #[error("central region must have an odd number of sites; got {0}")]
    EvenCentral(usize),

    /// Returned when a central block is not square in its spatial or local
    /// indices.
    #[error("central block must have shape (n, n, l, l); got {0:?}")]
    CentralShape(Vec<usize>),

    /// Returned when the true and reference central blocks differ in shape.
    #[error("central block shapes differ: {0:?} and {1:?}")]
    CentralMismatch(Vec<usize>, Vec<usize>),

    /// Returned when an input matrix is not Hermitian.
    #[error("{0}: matrix must be Hermitian")]
    NotHermitian(&'static str),

    /// Returned when a lead matrix must be diagonal in channel space but isn't.
    #[error("{0}: matrix must be diagonal in channel space")]
    NotDiagonal(&'static str),

    /// Returned when a lead matrix must be proportional to the identity in
    /// channel space but isn't.
    #[error("{0}: matrix must be channel-independent")]
    NotUniform(&'static str),

    /// Returned when a reference Hamiltonian couples different channels.
    #[error("{0}: reference Hamiltonian mixes channels")]
    ChannelMixing(&'static str),

    /// Returned when a non-positive matching window is encountered.
    #[error("matching window must be greater than 0; got {0}")]
    BadWindow(f64),

    /// [`LinalgError`].
    #[error("linalg error: {0}")]
    Linalg(#[from] LinalgError),
}

impl BardeenError {
    pub(crate) fn check_window(window: f64) -> Result<(), Self> {
        (window > 0.0).then_some(()).ok_or(Self::BadWindow(window))
    }

    pub(crate) fn check_odd(n: usize) -> Result<(), Self> {
        (n % 2 == 1).then_some(()).ok_or(Self::EvenCentral(n))
    }
}

/// Returned from the wave-function-matching solver and the benchmark adapter.
#[derive(Debug, Error)]
pub enum WfmError {
    /// Returned when block arrays have inconsistent lengths.
    #[error("block arrays must have lengths (n + 2, n + 1, n); got {0}, {1}, {2}")]
    BlockCount(usize, usize, usize),

    /// Returned when fewer than three sites (two lead sites plus one scattering
    /// site) are given.
    #[error("at least 3 on-site blocks are required; got {0}")]
    TooShort(usize),

    /// Returned when a source vector doesn't match the number of channels.
    #[error("source must have length {0}; got {1}")]
    SourceLength(usize, usize),

    /// Returned when a source vector is identically zero on open channels.
    #[error("source carries no incident flux")]
    NoFlux,

    /// Returned when a lead boundary block is not diagonal in channel space.
    #[error("lead blocks must be diagonal in channel space")]
    LeadNotDiagonal,

    /// Returned when the source excites a channel that doesn't propagate in the
    /// left lead at the requested energy.
    #[error("channel {0} is closed in the left lead at energy {1}")]
    Closed(usize, f64),

    /// Returned when a central block couples sites more than two apart.
    #[error("central block couples sites {0} and {1}; only up to next-nearest neighbors are allowed")]
    LongRange(usize, usize),

    /// Returned when energy and central block channel counts disagree.
    #[error("energies have {0} channel rows but the central block has {1} channels")]
    ChannelCount(usize, usize),

    /// [`BardeenError`]
    #[error("{0}")]
    Bardeen(#[from] BardeenError),

    /// [`LinalgError`].
    #[error("linalg error: {0}")]
    Linalg(#[from] LinalgError),
}
