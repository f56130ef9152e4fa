//! Flattening, reshaping, and structural checks for site⊗channel arrays.
//!
//! Four-index Hamiltonians are indexed as `H[[i, j, α, β]]` for site indices
//! `i`, `j` and channel (local degree of freedom) indices `α`, `β`. The
//! flattened two-index form uses the composite index `i * n_loc + α`, so that
//! the channel index varies fastest.

use ndarray as nd;
use ndarray_linalg::Scalar;
use num_traits::Zero;
use crate::{ Arr1, Arr2, Arr4 };

/// Flatten a four-index `(site, site, channel, channel)` array into a two-index
/// `(site⊗channel, site⊗channel)` matrix.
///
/// ```
/// use ndarray as nd;
/// use bardeen::utils::mat_4d_to_2d;
///
/// let mut h: nd::Array4<f64> = nd::Array4::zeros((2, 2, 2, 2));
/// h[[0, 1, 1, 0]] = 3.0;
/// let flat = mat_4d_to_2d(&h);
/// assert_eq!(flat.dim(), (4, 4));
/// assert_eq!(flat[[1, 2]], 3.0);
/// ```
pub fn mat_4d_to_2d<S, A>(h: &Arr4<S>) -> nd::Array2<A>
where
    S: nd::Data<Elem = A>,
    A: Clone + Zero,
{
    let (ni, nj, na, nb) = h.dim();
    let mut flat: nd::Array2<A> = nd::Array2::zeros((ni * na, nj * nb));
    for ((i, j, a, b), hijab) in h.indexed_iter() {
        flat[[i * na + a, j * nb + b]] = hijab.clone();
    }
    flat
}

/// Inverse of [`mat_4d_to_2d`] for `n_loc` channels per site.
///
/// *Panics if either dimension of `flat` is not a multiple of `n_loc`*.
pub fn mat_2d_to_4d<S, A>(flat: &Arr2<S>, n_loc: usize) -> nd::Array4<A>
where
    S: nd::Data<Elem = A>,
    A: Clone + Zero,
{
    let (nr, nc) = flat.dim();
    assert!(nr % n_loc == 0 && nc % n_loc == 0);
    let mut h: nd::Array4<A>
        = nd::Array4::zeros((nr / n_loc, nc / n_loc, n_loc, n_loc));
    for ((r, c), frc) in flat.indexed_iter() {
        h[[r / n_loc, c / n_loc, r % n_loc, c % n_loc]] = frc.clone();
    }
    h
}

/// Flatten a `(site, channel)` state array into a single site⊗channel vector.
pub fn vec_2d_to_1d<S, A>(psi: &Arr2<S>) -> nd::Array1<A>
where
    S: nd::Data<Elem = A>,
    A: Clone,
{
    psi.iter().cloned().collect()
}

/// Replicate a per-channel scalar `n` times, returning an `(n_loc, n)` array
/// whose rows are constant.
pub fn scal_to_vec<S, A>(x: &Arr1<S>, n: usize) -> nd::Array2<A>
where
    S: nd::Data<Elem = A>,
    A: Clone,
{
    nd::Array2::from_shape_fn((x.len(), n), |(a, _)| x[a].clone())
}

/// Embed a purely spatial state into the full site⊗channel space, placing it
/// entirely in `channel` and leaving every other channel at zero.
pub fn embed_channel<S, A>(psi: &Arr1<S>, channel: usize, n_loc: usize)
    -> nd::Array1<A>
where
    S: nd::Data<Elem = A>,
    A: Clone + Zero,
{
    let mut flat: nd::Array1<A> = nd::Array1::zeros(psi.len() * n_loc);
    flat.iter_mut().skip(channel).step_by(n_loc)
        .zip(psi)
        .for_each(|(fk, pk)| { *fk = pk.clone(); });
    flat
}

/// Return `true` if a flattened matrix has no element larger than `tol`
/// coupling two different channels.
pub fn is_channel_conserving_mat<S, A>(op: &Arr2<S>, n_loc: usize, tol: f64)
    -> bool
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    op.indexed_iter()
        .all(|((r, c), x)| r % n_loc == c % n_loc || x.abs() <= A::real(tol))
}

/// Return `true` if a flattened vector has elements larger than `tol` in at
/// most one channel.
pub fn is_channel_conserving_vec<S, A>(psi: &Arr1<S>, n_loc: usize, tol: f64)
    -> bool
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    (0..n_loc)
        .filter(|a| {
            psi.iter().skip(*a).step_by(n_loc)
                .any(|x| x.abs() > A::real(tol))
        })
        .count() <= 1
}

/// Return `true` if a four-index array satisfies
/// `H[[i, j, α, β]] == conj(H[[j, i, β, α]])` to within `tol`.
pub fn is_hermitian<S, A>(h: &Arr4<S>, tol: f64) -> bool
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    let (ni, nj, na, nb) = h.dim();
    if ni != nj || na != nb { return false; }
    h.indexed_iter()
        .all(|((i, j, a, b), x)| {
            (*x - h[[j, i, b, a]].conj()).abs() <= A::real(tol)
        })
}

/// Return `true` if a square matrix is Hermitian to within `tol`.
pub fn is_hermitian_mat<S, A>(m: &Arr2<S>, tol: f64) -> bool
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    let (nr, nc) = m.dim();
    nr == nc
        && m.indexed_iter()
            .all(|((r, c), x)| {
                (*x - m[[c, r]].conj()).abs() <= A::real(tol)
            })
}

/// Return `true` if all off-diagonal elements of `m` are no larger than `tol`.
pub fn is_diagonal<S, A>(m: &Arr2<S>, tol: f64) -> bool
where
    S: nd::Data<Elem = A>,
    A: Scalar,
{
    m.indexed_iter()
        .all(|((r, c), x)| {
            r == c || x.abs() <= A::real(tol)
        })
}

/// Calculate the inner product `⟨a|b⟩`, conjugating the left argument.
///
/// *Panics if the arrays have unequal lengths*.
pub fn vdot<S, T, A>(a: &Arr1<S>, b: &Arr1<T>) -> A
where
    S: nd::Data<Elem = A>,
    T: nd::Data<Elem = A>,
    A: Scalar,
{
    assert_eq!(a.len(), b.len());
    a.iter().zip(b)
        .fold(A::zero(), |acc, (ak, bk)| acc + ak.conj() * *bk)
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64 as C64;

    #[test]
    fn flatten_places_channel_fastest() {
        let h: nd::Array4<f64>
            = nd::Array4::from_shape_fn((3, 3, 2, 2), |(i, j, a, b)| {
                (1000 * i + 100 * j + 10 * a + b) as f64
            });
        let flat = mat_4d_to_2d(&h);
        assert_eq!(flat[[5, 2]], 2110.0);
        assert_eq!(mat_2d_to_4d(&flat, 2), h);
    }

    #[test]
    fn embedding_zeros_other_channels() {
        let psi = nd::array![C64::new(1.0, 0.0), C64::new(0.0, 2.0)];
        let flat: nd::Array1<C64> = embed_channel(&psi, 1, 3);
        assert_eq!(flat.len(), 6);
        assert_eq!(flat[1], psi[0]);
        assert_eq!(flat[4], psi[1]);
        assert!(is_channel_conserving_vec(&flat, 3, 1e-12));
        assert!(!is_channel_conserving_vec(&(&flat + &embed_channel(&psi, 0, 3)), 3, 1e-12));
    }

    #[test]
    fn channel_mixing_detected() {
        let mut op: nd::Array2<f64> = nd::Array2::eye(4);
        op[[0, 2]] = 0.5;
        assert!(is_channel_conserving_mat(&op, 2, 1e-12));
        op[[0, 3]] = 0.5;
        assert!(!is_channel_conserving_mat(&op, 2, 1e-12));
    }

    #[test]
    fn hermiticity_checks_channel_transpose() {
        let mut h: nd::Array4<C64> = nd::Array4::zeros((2, 2, 2, 2));
        h[[0, 1, 0, 1]] = C64::new(0.0, 1.0);
        assert!(!is_hermitian(&h, 1e-12));
        h[[1, 0, 1, 0]] = C64::new(0.0, -1.0);
        assert!(is_hermitian(&h, 1e-12));
    }

    #[test]
    fn flattened_state_matches_embedding() {
        let psi = nd::array![[1.0, 0.0], [2.0, 0.0], [3.0, 0.0]];
        let flat: nd::Array1<f64> = vec_2d_to_1d(&psi);
        assert_eq!(flat, embed_channel(&nd::array![1.0, 2.0, 3.0], 0, 2));
    }

    #[test]
    fn replicated_scalars() {
        let x = nd::array![1.0, 2.0];
        let v = scal_to_vec(&x, 3);
        assert_eq!(v, nd::array![[1.0, 1.0, 1.0], [2.0, 2.0, 2.0]]);
    }
}
