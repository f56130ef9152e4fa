//! Extraction of bound states from the isolated left- and right-well reference
//! Hamiltonians.
//!
//! States are retained when their energy measured from the bottom of the lead
//! band, `E + 2t`, falls strictly below a cutoff. Two representations are
//! provided:
//! - [`ChannelStates`] diagonalizes each channel's spatial block separately.
//!   Different channels generally retain different numbers of states, so the
//!   energies and wavefunctions are stored in rectangular arrays sized to the
//!   largest count, with per-channel [valid counts][ChannelStates::counts].
//!   Padded energies hold `NaN` and padded wavefunctions are zero; neither is
//!   ever returned by [`Spectrum::embedded`].
//! - [`MixedStates`] diagonalizes the full site⊗channel Hamiltonian once, which
//!   requires leads that are diagonal and identical across channels.

use ndarray as nd;
use ndarray_linalg::{ EighInto, UPLO };
use num_complex::Complex64 as C64;
use tracing::debug;
use crate::{
    Arr1,
    Arr4,
    error::BardeenError,
    hamiltonian::BResult,
    utils::{ embed_channel, is_channel_conserving_mat, is_channel_conserving_vec, mat_4d_to_2d },
    DEF_TOL,
};

/// Wavenumber of a lead plane wave at energy `e`, from the dispersion relation
/// `E = V - 2t cos(k)`.
///
/// Returns `None` unless `e` lies strictly inside the band
/// `(V - 2|t|, V + 2|t|)`; at either edge the group velocity vanishes.
pub fn wavenumber(e: f64, v: f64, t: f64) -> Option<f64> {
    let x = (e - v) / (-2.0 * t);
    (x > -1.0 && x < 1.0).then(|| x.acos())
}

/// Bound states of a channel-conserving Hamiltonian, computed channel by
/// channel.
#[derive(Clone, Debug)]
pub struct ChannelStates {
    // energies[[α, m]]; `NaN` for m >= counts[α]
    energies: nd::Array2<f64>,
    // states[[α, m, j]] over spatial sites j; zero for m >= counts[α]
    states: nd::Array3<C64>,
    counts: Vec<usize>,
}

impl ChannelStates {
    /// Get the per-channel energy array, with `NaN` in padded slots.
    pub fn energies(&self) -> &nd::Array2<f64> { &self.energies }

    /// Get the per-channel spatial wavefunction array, zero in padded slots.
    pub fn states(&self) -> &nd::Array3<C64> { &self.states }

    /// Get the number of valid states in each channel.
    pub fn counts(&self) -> &[usize] { &self.counts }

    /// Get the size of the padded state axis, equal to the largest count.
    pub fn capacity(&self) -> usize { self.energies.ncols() }

    /// Get the number of channels.
    pub fn n_loc(&self) -> usize { self.counts.len() }

    /// Return `true` if slot `m` of channel `a` holds a genuine state rather
    /// than padding.
    pub fn is_valid(&self, a: usize, m: usize) -> bool { m < self.counts[a] }
}

/// Bound states of a Hamiltonian computed over the full site⊗channel space.
#[derive(Clone, Debug)]
pub struct MixedStates {
    energies: nd::Array1<f64>,
    // states[[m, i * n_loc + α]]
    states: nd::Array2<C64>,
    n_loc: usize,
}

impl MixedStates {
    /// Get the energy array.
    pub fn energies(&self) -> &nd::Array1<f64> { &self.energies }

    /// Get the flattened wavefunction array, one state per row.
    pub fn states(&self) -> &nd::Array2<C64> { &self.states }

    /// Get the number of states.
    #[allow(clippy::len_without_is_empty)]
    pub fn len(&self) -> usize { self.energies.len() }

    /// Get the number of channels.
    pub fn n_loc(&self) -> usize { self.n_loc }
}

/// A single bound state embedded in the full site⊗channel space.
#[derive(Clone, Debug)]
pub struct BoundState {
    /// Channel that the state lives in, if it is confined to one.
    pub channel: Option<usize>,
    /// Index of the state within its channel (or within the full list).
    pub index: usize,
    /// Energy
    pub energy: f64,
    /// Flattened wavefunction.
    pub psi: nd::Array1<C64>,
}

/// Bound states of a single well, in either representation.
#[derive(Clone, Debug)]
pub enum Spectrum {
    /// Channel-resolved states; see [`ChannelStates`].
    Resolved(ChannelStates),
    /// Full-space states; see [`MixedStates`].
    Mixed(MixedStates),
}

impl Spectrum {
    /// Get the number of channels.
    pub fn n_loc(&self) -> usize {
        match self {
            Self::Resolved(states) => states.n_loc(),
            Self::Mixed(states) => states.n_loc(),
        }
    }

    /// Return all valid states as full-space vectors.
    ///
    /// Channel-resolved states are placed entirely in their own channel with
    /// all other channels zeroed.
    ///
    /// *Panics if an embedded state is found to occupy more than one channel*.
    pub fn embedded(&self) -> Vec<BoundState> {
        match self {
            Self::Resolved(states) => {
                let n_loc = states.n_loc();
                (0..n_loc)
                    .flat_map(|a| (0..states.counts[a]).map(move |m| (a, m)))
                    .map(|(a, m)| {
                        let psi: nd::Array1<C64>
                            = embed_channel(
                                &states.states.slice(nd::s![a, m, ..]), a, n_loc);
                        assert!(
                            is_channel_conserving_vec(&psi, n_loc, DEF_TOL),
                            "bound::Spectrum::embedded: FATAL: embedded state \
                            ({a}, {m}) occupies more than one channel"
                        );
                        BoundState {
                            channel: Some(a),
                            index: m,
                            energy: states.energies[[a, m]],
                            psi,
                        }
                    })
                    .collect()
            },
            Self::Mixed(states) => {
                states.energies.iter().zip(states.states.outer_iter())
                    .enumerate()
                    .map(|(m, (e, psi))| {
                        BoundState {
                            channel: None,
                            index: m,
                            energy: *e,
                            psi: psi.to_owned(),
                        }
                    })
                    .collect()
            },
        }
    }
}

/// Compute channel-resolved bound states of a reference Hamiltonian.
///
/// A state of channel `α` is retained if `E + 2 t[α] < e_cutoff`. Fails with
/// [`BardeenError::ChannelMixing`] if `H` couples different channels.
pub fn extract_resolved<S, T>(
    name: &'static str,
    H: &Arr4<S>,
    t: &Arr1<T>,
    e_cutoff: f64,
) -> BResult<ChannelStates>
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = f64>,
{
    let (n_sites, _, n_loc, _) = H.dim();
    if !is_channel_conserving_mat(&mat_4d_to_2d(H), n_loc, DEF_TOL) {
        return Err(BardeenError::ChannelMixing(name));
    }

    let mut ragged: Vec<(nd::Array1<f64>, Vec<nd::Array1<C64>>)>
        = Vec::with_capacity(n_loc);
    for a in 0..n_loc {
        let block: nd::Array2<C64> = H.slice(nd::s![.., .., a, a]).to_owned();
        let (evals, evecs): (nd::Array1<f64>, nd::Array2<C64>)
            = block.eigh_into(UPLO::Lower)?;
        let (e, psi): (Vec<f64>, Vec<nd::Array1<C64>>)
            = evals.iter().zip(evecs.columns())
            .filter(|(e, _)| **e + 2.0 * t[a] < e_cutoff)
            .map(|(e, v)| (*e, v.to_owned()))
            .unzip();
        debug!("{name}: channel {a}: retained {} bound states", e.len());
        ragged.push((nd::Array1::from(e), psi));
    }

    let counts: Vec<usize> = ragged.iter().map(|(e, _)| e.len()).collect();
    let capacity = counts.iter().copied().max().unwrap_or(0);
    let mut energies: nd::Array2<f64>
        = nd::Array2::from_elem((n_loc, capacity), f64::NAN);
    let mut states: nd::Array3<C64>
        = nd::Array3::zeros((n_loc, capacity, n_sites));
    for (a, (e, psi)) in ragged.into_iter().enumerate() {
        energies.slice_mut(nd::s![a, ..e.len()]).assign(&e);
        for (m, v) in psi.into_iter().enumerate() {
            states.slice_mut(nd::s![a, m, ..]).assign(&v);
        }
    }
    Ok(ChannelStates { energies, states, counts })
}

/// Compute bound states of a reference Hamiltonian over the full site⊗channel
/// space, retaining states with `E + 2t < e_cutoff`.
pub fn extract_mixed<S>(name: &'static str, H: &Arr4<S>, t: f64, e_cutoff: f64)
    -> BResult<MixedStates>
where S: nd::Data<Elem = C64>
{
    let n_loc = H.dim().2;
    let flat: nd::Array2<C64> = mat_4d_to_2d(H);
    let (evals, evecs): (nd::Array1<f64>, nd::Array2<C64>)
        = flat.eigh_into(UPLO::Lower)?;
    let keep: Vec<usize>
        = evals.iter().enumerate()
        .filter(|(_, e)| **e + 2.0 * t < e_cutoff)
        .map(|(m, _)| m)
        .collect();
    debug!("{name}: retained {} bound states", keep.len());
    let energies: nd::Array1<f64> = keep.iter().map(|m| evals[*m]).collect();
    let states: nd::Array2<C64> = evecs.select(nd::Axis(1), &keep).reversed_axes();
    Ok(MixedStates { energies, states, n_loc })
}
