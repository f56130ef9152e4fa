//! Exact transmission through a finite scattering region connected to two
//! semi-infinite leads, by wave-function matching.
//!
//! The region is described by per-site blocks over channels: `n + 2` on-site
//! blocks, `n + 1` nearest-neighbor blocks and `n` next-nearest-neighbor
//! blocks, where the first and last sites belong to the left and right leads.
//! Each lead continues its boundary site's on-site and hopping blocks out to
//! infinity, which is accounted for exactly by a per-channel self-energy on
//! the boundary site. Reflection and transmission amplitudes then follow from
//! the retarded Green's function of the finite region.

use ndarray as nd;
use ndarray_linalg::Solve;
use num_complex::Complex64 as C64;
use tracing::trace;
use crate::{
    Arr1,
    error::WfmError,
    utils::is_diagonal,
    DEF_TOL,
};

pub type WResult<T> = Result<T, WfmError>;

/// Hamiltonian blocks of a finite region with one lead site on either end.
#[derive(Clone, Debug)]
pub struct Blocks {
    // onsite[[k, α, β]] for k in 0..n + 2
    onsite: nd::Array3<C64>,
    // nn[[k, α, β]] couples site k to site k + 1
    nn: nd::Array3<C64>,
    // nnn[[k, α, β]] couples site k to site k + 2
    nnn: nd::Array3<C64>,
}

impl Blocks {
    /// Create a new `Blocks`.
    ///
    /// Fails if the arrays don't have lengths `n + 2`, `n + 1`, `n` for some
    /// `n >= 1`, if the blocks aren't all `n_loc × n_loc`, or if the lead blocks
    /// aren't diagonal in channel space.
    pub fn new(
        onsite: nd::Array3<C64>,
        nn: nd::Array3<C64>,
        nnn: nd::Array3<C64>,
    ) -> WResult<Self>
    {
        let n_sites = onsite.dim().0;
        if n_sites < 3 { return Err(WfmError::TooShort(n_sites)); }
        if nn.dim().0 + 1 != n_sites || nnn.dim().0 + 2 != n_sites {
            return Err(WfmError::BlockCount(n_sites, nn.dim().0, nnn.dim().0));
        }
        let n_loc = onsite.dim().1;
        for blocks in [&onsite, &nn, &nnn] {
            let (_, r, c) = blocks.dim();
            if r != n_loc { return Err(WfmError::ChannelCount(r, n_loc)); }
            if c != n_loc { return Err(WfmError::ChannelCount(c, n_loc)); }
        }
        let leads_diagonal
            = [
                onsite.index_axis(nd::Axis(0), 0),
                nn.index_axis(nd::Axis(0), 0),
                onsite.index_axis(nd::Axis(0), n_sites - 1),
                nn.index_axis(nd::Axis(0), n_sites - 2),
            ]
            .iter()
            .all(|b| is_diagonal(b, DEF_TOL));
        if !leads_diagonal { return Err(WfmError::LeadNotDiagonal); }
        Ok(Self { onsite, nn, nnn })
    }

    /// Get the number of channels.
    pub fn n_loc(&self) -> usize { self.onsite.dim().1 }

    /// Get the total number of sites, including the two lead sites.
    pub fn n_sites(&self) -> usize { self.onsite.dim().0 }

    /// Get the on-site blocks.
    pub fn onsite(&self) -> &nd::Array3<C64> { &self.onsite }

    /// Get the nearest-neighbor blocks.
    pub fn nn(&self) -> &nd::Array3<C64> { &self.nn }

    /// Get the next-nearest-neighbor blocks.
    pub fn nnn(&self) -> &nd::Array3<C64> { &self.nnn }

    /// Assemble the flattened Hamiltonian of the finite region, with composite
    /// index `k * n_loc + α`.
    pub fn hamiltonian(&self) -> nd::Array2<C64> {
        let n_loc = self.n_loc();
        let n = self.n_sites() * n_loc;
        let mut H: nd::Array2<C64> = nd::Array2::zeros((n, n));
        let mut place = |k: usize, l: usize, block: nd::ArrayView2<C64>| {
            let (k0, l0) = (k * n_loc, l * n_loc);
            H.slice_mut(nd::s![k0..k0 + n_loc, l0..l0 + n_loc]).assign(&block);
            if k != l {
                H.slice_mut(nd::s![l0..l0 + n_loc, k0..k0 + n_loc])
                    .assign(&block.t().mapv(|x| x.conj()));
            }
        };
        for (k, block) in self.onsite.outer_iter().enumerate() {
            place(k, k, block);
        }
        for (k, block) in self.nn.outer_iter().enumerate() {
            place(k, k + 1, block);
        }
        for (k, block) in self.nnn.outer_iter().enumerate() {
            place(k, k + 2, block);
        }
        H
    }

    // per-channel (on-site, hopping) of the left (`false`) or right (`true`)
    // lead
    fn lead(&self, right: bool) -> (nd::Array1<f64>, nd::Array1<C64>) {
        let (ks, kb)
            = if right {
                (self.n_sites() - 1, self.n_sites() - 2)
            } else {
                (0, 0)
            };
        let v: nd::Array1<f64>
            = self.onsite.slice(nd::s![ks, .., ..]).diag().mapv(|x| x.re);
        let h: nd::Array1<C64>
            = self.nn.slice(nd::s![kb, .., ..]).diag().to_owned();
        (v, h)
    }
}

/// Retarded self-energy of a semi-infinite single-channel lead with on-site
/// energy `v` and hopping `h`, evaluated at energy `e`.
///
/// Inside the band `|e - v| < 2|h|` this has a negative imaginary part;
/// outside it is real and chosen so that lead states decay away from the
/// scattering region.
pub fn self_energy(e: f64, v: f64, h: C64) -> C64 {
    let de = e - v;
    let h2 = h.norm_sqr();
    if de.abs() < 2.0 * h.norm() {
        C64::new(de, -(4.0 * h2 - de.powi(2)).sqrt()) / 2.0
    } else {
        C64::from(de - de.signum() * (de.powi(2) - 4.0 * h2).sqrt()) / 2.0
    }
}

/// Compute per-channel reflection and transmission probabilities at energy
/// `energy` for incident amplitudes `source` over left-lead channels.
///
/// The source is normalized to unit total incident flux. Outgoing channels
/// that are closed in their lead carry zero probability.
pub fn kernel<S>(blocks: &Blocks, energy: f64, source: &Arr1<S>)
    -> WResult<(nd::Array1<f64>, nd::Array1<f64>)>
where S: nd::Data<Elem = f64>
{
    let n_loc = blocks.n_loc();
    let n_sites = blocks.n_sites();
    if source.len() != n_loc {
        return Err(WfmError::SourceLength(n_loc, source.len()));
    }

    let (v_l, h_l) = blocks.lead(false);
    let (v_r, h_r) = blocks.lead(true);
    let sigma_l: nd::Array1<C64>
        = v_l.iter().zip(&h_l).map(|(v, h)| self_energy(energy, *v, *h)).collect();
    let sigma_r: nd::Array1<C64>
        = v_r.iter().zip(&h_r).map(|(v, h)| self_energy(energy, *v, *h)).collect();
    let vel_l: nd::Array1<f64> = sigma_l.mapv(|s| -2.0 * s.im);
    let vel_r: nd::Array1<f64> = sigma_r.mapv(|s| -2.0 * s.im);

    if let Some((a, _))
        = source.iter().zip(&vel_l).enumerate()
        .find(|(_, (s, v))| **s != 0.0 && **v <= 0.0)
    {
        return Err(WfmError::Closed(a, energy));
    }
    let norm: f64 = source.iter().map(|s| s.powi(2)).sum::<f64>().sqrt();
    if norm == 0.0 { return Err(WfmError::NoFlux); }

    let n = n_sites * n_loc;
    let last = (n_sites - 1) * n_loc;
    let mut A: nd::Array2<C64> = blocks.hamiltonian().mapv(|h| -h);
    A.diag_mut().iter_mut().for_each(|a| { *a += energy; });
    for a in 0..n_loc {
        A[[a, a]] -= sigma_l[a];
        A[[last + a, last + a]] -= sigma_r[a];
    }

    // b = Σ_α s_α √v_α |0, α⟩, so that x = G b
    let mut b: nd::Array1<C64> = nd::Array1::zeros(n);
    b.iter_mut().zip(source.iter().zip(&vel_l))
        .for_each(|(bk, (s, v))| { *bk = C64::from(s / norm * v.max(0.0).sqrt()); });
    let x: nd::Array1<C64> = A.solve_into(b)?;

    let R: nd::Array1<f64>
        = (0..n_loc)
        .map(|b| {
            let r = -source[b] / norm
                + C64::i() * vel_l[b].max(0.0).sqrt() * x[b];
            r.norm_sqr()
        })
        .collect();
    let T: nd::Array1<f64>
        = (0..n_loc)
        .map(|b| {
            let t = C64::i() * vel_r[b].max(0.0).sqrt() * x[last + b];
            t.norm_sqr()
        })
        .collect();
    trace!("E = {energy:.6e}: R = {R}, T = {T}");
    Ok((R, T))
}
