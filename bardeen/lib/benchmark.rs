//! Exact transmission at the energies found by the Bardeen kernel, for
//! comparison.
//!
//! The central block is converted to per-site [`Blocks`] with one lead site
//! prepended and appended, and the [wave-function-matching
//! solver][crate::wfm] is called once per initial state with a source confined
//! to that state's channel.

use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    Arr2,
    Arr4,
    error::WfmError,
    hamiltonian::Region,
    kernel::{ Path, Setup, Transmission },
    utils::is_diagonal,
    wfm::{ self, Blocks, WResult },
};

/// Convert a central block `hc[[i, j, α, β]]` into [`Blocks`], using the
/// parameters of `left` and `right` for the added lead sites.
///
/// Fails if `hc` couples sites more than two apart or if either lead is not
/// diagonal in channel space.
pub fn to_blocks<S>(left: &Region, right: &Region, hc: &Arr4<S>) -> WResult<Blocks>
where S: nd::Data<Elem = C64>
{
    let (n, _, n_loc, _) = hc.dim();
    for lead in [left, right] {
        if lead.n_loc() != n_loc {
            return Err(WfmError::ChannelCount(lead.n_loc(), n_loc));
        }
        if !is_diagonal(&lead.t, 0.0) || !is_diagonal(&lead.v, 0.0) {
            return Err(WfmError::LeadNotDiagonal);
        }
    }
    if let Some(((i, j, _, _), _))
        = hc.indexed_iter()
        .find(|((i, j, _, _), h)| i.abs_diff(*j) > 2 && h.norm() > 0.0)
    {
        return Err(WfmError::LongRange(i, j));
    }

    let mut onsite: nd::Array3<C64> = nd::Array3::zeros((n + 2, n_loc, n_loc));
    let mut nn: nd::Array3<C64> = nd::Array3::zeros((n + 1, n_loc, n_loc));
    let mut nnn: nd::Array3<C64> = nd::Array3::zeros((n, n_loc, n_loc));
    onsite.slice_mut(nd::s![0, .., ..]).assign(&left.v);
    onsite.slice_mut(nd::s![n + 1, .., ..]).assign(&right.v);
    nn.slice_mut(nd::s![0, .., ..]).assign(&left.t.mapv(|x| -x));
    nn.slice_mut(nd::s![n, .., ..]).assign(&right.t.mapv(|x| -x));
    for i in 0..n {
        onsite.slice_mut(nd::s![i + 1, .., ..])
            .assign(&hc.slice(nd::s![i, i, .., ..]));
        if i + 1 < n {
            nn.slice_mut(nd::s![i + 1, .., ..])
                .assign(&hc.slice(nd::s![i, i + 1, .., ..]));
        }
        if i + 2 < n {
            nnn.slice_mut(nd::s![i + 1, .., ..])
                .assign(&hc.slice(nd::s![i, i + 2, .., ..]));
        }
    }
    Blocks::new(onsite, nn, nnn)
}

/// Compute exact transmission probabilities at the per-channel energies
/// `energies[[α, m]]`, for incidence in channel `α` summed over all outgoing
/// channels. Non-finite energies give `NaN`.
pub fn benchmark<S, T>(
    left: &Region,
    right: &Region,
    hc: &Arr4<S>,
    energies: &Arr2<T>,
) -> WResult<nd::Array2<f64>>
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = f64>,
{
    let resolved = benchmark_resolved(left, right, hc, energies)?;
    Ok(resolved.sum_axis(nd::Axis(2)))
}

/// Like [`benchmark`], but resolved by outgoing channel as `[[α, m, β]]`.
///
/// An energy at which the incident channel is closed in the left lead carries
/// no flux and gives zero transmission into every channel.
pub fn benchmark_resolved<S, T>(
    left: &Region,
    right: &Region,
    hc: &Arr4<S>,
    energies: &Arr2<T>,
) -> WResult<nd::Array3<f64>>
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = f64>,
{
    let n_loc = hc.dim().2;
    if energies.nrows() != n_loc {
        return Err(WfmError::ChannelCount(energies.nrows(), n_loc));
    }
    let blocks = to_blocks(left, right, hc)?;
    let mut trans: nd::Array3<f64>
        = nd::Array3::from_elem((n_loc, energies.ncols(), n_loc), f64::NAN);
    for ((a, m), e) in energies.indexed_iter() {
        if !e.is_finite() { continue; }
        let mut source: nd::Array1<f64> = nd::Array1::zeros(n_loc);
        source[a] = 1.0;
        match wfm::kernel(&blocks, *e, &source) {
            Ok((_, t_out)) => {
                trans.slice_mut(nd::s![a, m, ..]).assign(&t_out);
            },
            Err(WfmError::Closed(..)) => {
                debug!("channel {a} closed at E = {e:.6e}");
                trans.slice_mut(nd::s![a, m, ..]).fill(0.0);
            },
            Err(err) => { return Err(err); },
        }
    }
    Ok(trans)
}

/// Compute exact transmission probabilities at energies that are not tied to
/// a channel, averaging the total transmission over incident channels. Non-
/// finite energies give `NaN`.
///
/// Incident channels that are closed in the left lead at a given energy are
/// left out of the average.
pub fn benchmark_mixed<S, T>(
    left: &Region,
    right: &Region,
    hc: &Arr4<S>,
    energies: &Arr2<T>,
) -> WResult<nd::Array2<f64>>
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = f64>,
{
    let n_loc = hc.dim().2;
    let blocks = to_blocks(left, right, hc)?;
    let mut trans: nd::Array2<f64> = nd::Array2::from_elem(energies.dim(), f64::NAN);
    for (idx, e) in energies.indexed_iter() {
        if !e.is_finite() { continue; }
        let mut total: f64 = 0.0;
        let mut open: usize = 0;
        for a in 0..n_loc {
            let mut source: nd::Array1<f64> = nd::Array1::zeros(n_loc);
            source[a] = 1.0;
            match wfm::kernel(&blocks, *e, &source) {
                Ok((_, t_out)) => {
                    total += t_out.sum();
                    open += 1;
                },
                Err(WfmError::Closed(..)) => {
                    debug!("channel {a} closed at E = {e:.6e}");
                },
                Err(err) => { return Err(err); },
            }
        }
        trans[idx] = if open > 0 { total / open as f64 } else { 0.0 };
    }
    Ok(trans)
}

/// Compute exact transmission probabilities for every slot of a kernel result,
/// matching its shape.
pub fn benchmark_transmission(setup: &Setup, trans: &Transmission)
    -> WResult<nd::Array2<f64>>
{
    match trans.path {
        Path::Resolved => {
            benchmark(&setup.left, &setup.right, &setup.hc, &trans.energies)
        },
        Path::Mixed => {
            benchmark_mixed(&setup.left, &setup.right, &setup.hc, &trans.energies)
        },
    }
}
