//! Construction of tight-binding Hamiltonians for a one-dimensional chain
//! divided into five contiguous regions:
//! ```text
//!   far-left asymptotic | left lead | central | right lead | far-right asymptotic
//!         n_inf              n_l         n_c        n_r            n_inf
//! ```
//! Site indices are counted from the middle of the (odd-length) central
//! region, so that the central region occupies sites `-c..=c` for `n_c = 2c + 1`.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    Arr2,
    Arr4,
    error::{ BardeenError, ShapeError, SitesError },
    utils::{ is_diagonal, is_hermitian, is_hermitian_mat },
    DEF_TOL,
};

pub type BResult<T> = Result<T, BardeenError>;

/// A uniform region of the chain, described by a hopping matrix and an on-site
/// potential matrix over channels, and a number of sites.
///
/// Both matrices are complex Hermitian, so that couplings between channels
/// (e.g. spin-orbit terms) can carry a phase.
#[derive(Clone, Debug)]
pub struct Region {
    /// Hopping `t`; bonds in the region carry `-t`.
    pub t: nd::Array2<C64>,
    /// On-site potential.
    pub v: nd::Array2<C64>,
    /// Number of sites.
    pub n: usize,
}

impl Region {
    /// Create a new `Region` from real or complex matrices.
    pub fn new<A>(t: nd::Array2<A>, v: nd::Array2<A>, n: usize) -> Self
    where A: Copy + Into<C64>
    {
        Self { t: t.mapv(Into::into), v: v.mapv(Into::into), n }
    }

    /// Create a new `Region` whose hopping and potential are the same for all
    /// `n_loc` channels.
    pub fn uniform(t: f64, v: f64, n: usize, n_loc: usize) -> Self {
        Self {
            t: nd::Array2::from_diag_elem(n_loc, C64::from(t)),
            v: nd::Array2::from_diag_elem(n_loc, C64::from(v)),
            n,
        }
    }

    /// Return a copy of `self` with the hopping and potential of `other`, but
    /// the site count of `self`.
    pub fn with_params_of(&self, other: &Self) -> Self {
        Self { t: other.t.clone(), v: other.v.clone(), n: self.n }
    }

    /// Get the number of channels, assuming the matrices are square.
    pub fn n_loc(&self) -> usize { self.t.nrows() }

    pub(crate) fn check(&self, name: &'static str, n_loc: usize)
        -> BResult<()>
    {
        ShapeError::check(name, &self.t, n_loc)?;
        ShapeError::check(name, &self.v, n_loc)?;
        SitesError::check(name, self.n)?;
        (is_hermitian_mat(&self.t, DEF_TOL) && is_hermitian_mat(&self.v, DEF_TOL))
            .then_some(())
            .ok_or(BardeenError::NotHermitian(name))
    }

    /// Return the (real) diagonal elements of the hopping and potential
    /// matrices, failing if either has off-diagonal elements.
    pub fn channel_diagonal(&self, name: &'static str)
        -> BResult<(nd::Array1<f64>, nd::Array1<f64>)>
    {
        (is_diagonal(&self.t, 0.0) && is_diagonal(&self.v, 0.0))
            .then(|| (self.t.diag().mapv(|x| x.re), self.v.diag().mapv(|x| x.re)))
            .ok_or(BardeenError::NotDiagonal(name))
    }

    /// Return the single hopping and potential values shared by all channels,
    /// failing if either matrix is not proportional to the identity.
    pub fn channel_uniform(&self, name: &'static str) -> BResult<(f64, f64)> {
        let (t, v) = self.channel_diagonal(name)?;
        let same = |x: &nd::Array1<f64>| x.iter().all(|xa| *xa == x[0]);
        (same(&t) && same(&v))
            .then(|| (t[0], v[0]))
            .ok_or(BardeenError::NotUniform(name))
    }
}

// which region a site falls in, relative to the central region
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
enum Zone { FarLeft, Left, Central, Right, FarRight }

/// Build the Hamiltonian for the full chain, returning the four-index array
/// `H[[i, j, α, β]]` along with the site index of its first row.
///
/// The asymptotic region `infty` is placed on both ends of the chain with
/// `infty.n` sites each. Bonds belong to the region of their outermost site,
/// so the bonds connecting the leads to the central region carry the lead
/// hopping. The central block `hc` is copied verbatim over sites `-c..=c`.
pub fn system<S>(infty: &Region, left: &Region, right: &Region, hc: &Arr4<S>)
    -> BResult<(nd::Array4<C64>, isize)>
where S: nd::Data<Elem = C64>
{
    let (nc, nc2, nl1, nl2) = hc.dim();
    if nc != nc2 || nl1 != nl2 {
        return Err(BardeenError::CentralShape(hc.shape().to_vec()));
    }
    BardeenError::check_odd(nc)?;
    let n_loc = nl1;
    infty.check("infty", n_loc)?;
    left.check("left", n_loc)?;
    right.check("right", n_loc)?;
    if !is_hermitian(hc, DEF_TOL) {
        return Err(BardeenError::NotHermitian("central"));
    }

    let c = (nc / 2) as isize;
    let nl = left.n as isize;
    let nr = right.n as isize;
    let ninf = infty.n as isize;
    let minus = -c - nl - ninf;
    let plus = c + nr + ninf;
    let nsites = (plus - minus + 1) as usize;

    let zone = |j: isize| -> Zone {
        if j < -nl - c {
            Zone::FarLeft
        } else if j < -c {
            Zone::Left
        } else if j <= c {
            Zone::Central
        } else if j <= c + nr {
            Zone::Right
        } else {
            Zone::FarRight
        }
    };

    let mut H: nd::Array4<C64>
        = nd::Array4::zeros((nsites, nsites, n_loc, n_loc));
    for j in minus..=plus {
        let k = (j - minus) as usize;
        let (v, t, nbr): (&nd::Array2<C64>, &nd::Array2<C64>, usize)
            = match zone(j) {
                Zone::FarLeft => (&infty.v, &infty.t, k + 1),
                Zone::Left => (&left.v, &left.t, k + 1),
                Zone::Right => (&right.v, &right.t, k - 1),
                Zone::FarRight => (&infty.v, &infty.t, k - 1),
                Zone::Central => continue,
            };
        let mut onsite = H.slice_mut(nd::s![k, k, .., ..]);
        onsite += v;
        let mut fwd = H.slice_mut(nd::s![k, nbr, .., ..]);
        fwd -= t;
        let mut bwd = H.slice_mut(nd::s![nbr, k, .., ..]);
        bwd -= t;
    }
    let c0 = (-c - minus) as usize;
    H.slice_mut(nd::s![c0..c0 + nc, c0..c0 + nc, .., ..]).assign(hc);
    Ok((H, minus))
}

/// Build a uniform central block of `n_c` sites with on-site matrix `v_c` and
/// nearest-neighbor bonds carrying `-t_c`.
pub fn central_block<S, T>(n_c: usize, t_c: &Arr2<S>, v_c: &Arr2<T>)
    -> BResult<nd::Array4<C64>>
where
    S: nd::Data<Elem = f64>,
    T: nd::Data<Elem = f64>,
{
    BardeenError::check_odd(n_c)?;
    let n_loc = v_c.nrows();
    ShapeError::check("central", t_c, n_loc)?;
    ShapeError::check("central", v_c, n_loc)?;
    let mut hc: nd::Array4<C64>
        = nd::Array4::zeros((n_c, n_c, n_loc, n_loc));
    for j in 0..n_c {
        hc.slice_mut(nd::s![j, j, .., ..]).assign(&v_c.mapv(C64::from));
        if j + 1 < n_c {
            let hop = t_c.mapv(|t| C64::from(-t));
            hc.slice_mut(nd::s![j, j + 1, .., ..]).assign(&hop);
            hc.slice_mut(nd::s![j + 1, j, .., ..]).assign(&hop);
        }
    }
    Ok(hc)
}

/// Build the single-channel Hamiltonian of a chain with a uniform central well
/// of `n_c` sites, returning it along with the site index of its first row.
#[allow(clippy::too_many_arguments)]
pub fn well(
    t_inf: f64,
    t_l: f64,
    t_c: f64,
    t_r: f64,
    v_inf: f64,
    v_l: f64,
    v_c: f64,
    v_r: f64,
    n_inf: usize,
    n_l: usize,
    n_c: usize,
    n_r: usize,
) -> BResult<(nd::Array2<f64>, isize)>
{
    let hc = central_block(n_c, &nd::array![[t_c]], &nd::array![[v_c]])?;
    let (H, offset) = system(
        &Region::uniform(t_inf, v_inf, n_inf, 1),
        &Region::uniform(t_l, v_l, n_l, 1),
        &Region::uniform(t_r, v_r, n_r, 1),
        &hc,
    )?;
    Ok((H.slice(nd::s![.., .., 0, 0]).mapv(|h| h.re), offset))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn barrier(n_loc: usize) -> nd::Array4<C64> {
        let t = nd::Array2::eye(n_loc);
        let v = nd::Array2::from_diag_elem(n_loc, 0.5);
        central_block(3, &t, &v).unwrap()
    }

    #[test]
    fn offset_centers_the_central_region() {
        let (H, offset) = system(
            &Region::uniform(1.0, 0.5, 4, 1),
            &Region::uniform(1.0, 0.0, 6, 1),
            &Region::uniform(1.0, 0.0, 5, 1),
            &barrier(1),
        ).unwrap();
        assert_eq!(offset, -1 - 6 - 4);
        assert_eq!(H.dim().0, 4 + 6 + 3 + 5 + 4);
        let at = |j: isize| H[[(j - offset) as usize, (j - offset) as usize, 0, 0]].re;
        assert_eq!(at(0), 0.5);
        assert_eq!(at(-2), 0.0);
        assert_eq!(at(-7), 0.0);
        assert_eq!(at(-8), 0.5);
        assert_eq!(at(6), 0.0);
        assert_eq!(at(7), 0.5);
    }

    #[test]
    fn bonds_take_outer_region_hopping() {
        let (H, offset) = system(
            &Region::uniform(3.0, 0.0, 2, 1),
            &Region::uniform(2.0, 0.0, 2, 1),
            &Region::uniform(5.0, 0.0, 2, 1),
            &barrier(1),
        ).unwrap();
        let bond = |j: isize| {
            let k = (j - offset) as usize;
            H[[k, k + 1, 0, 0]].re
        };
        assert_eq!(bond(-5), -3.0);
        assert_eq!(bond(-4), -3.0);
        assert_eq!(bond(-3), -2.0);
        assert_eq!(bond(-2), -2.0);
        assert_eq!(bond(-1), -1.0);
        assert_eq!(bond(1), -5.0);
        assert_eq!(bond(3), -3.0);
    }

    #[test]
    fn system_is_hermitian() {
        let mut hc = barrier(2);
        hc[[1, 1, 0, 1]] = C64::new(0.2, 0.1);
        hc[[1, 1, 1, 0]] = C64::new(0.2, -0.1);
        let (H, _) = system(
            &Region::uniform(1.0, 0.5, 3, 2),
            &Region::uniform(1.0, 0.0, 4, 2),
            &Region::uniform(1.0, 0.0, 4, 2),
            &hc,
        ).unwrap();
        assert!(is_hermitian(&H, 0.0));
    }

    #[test]
    fn invalid_inputs_are_rejected() {
        let good = Region::uniform(1.0, 0.0, 3, 1);
        let even: nd::Array4<C64> = nd::Array4::zeros((2, 2, 1, 1));
        assert!(matches!(
            system(&good, &good, &good, &even),
            Err(BardeenError::EvenCentral(2)),
        ));
        let empty = Region::uniform(1.0, 0.0, 0, 1);
        assert!(matches!(
            system(&good, &empty, &good, &barrier(1)),
            Err(BardeenError::Sites(_)),
        ));
        let wide = Region::uniform(1.0, 0.0, 3, 2);
        assert!(matches!(
            system(&good, &good, &wide, &barrier(1)),
            Err(BardeenError::Shape(_)),
        ));
        let mut lopsided = barrier(1);
        lopsided[[0, 1, 0, 0]] = C64::from(-2.0);
        assert!(matches!(
            system(&good, &good, &good, &lopsided),
            Err(BardeenError::NotHermitian("central")),
        ));
    }

    #[test]
    fn well_matches_uniform_system() {
        let (H, offset) = well(1.0, 1.0, 0.5, 1.0, 2.0, 0.0, 0.1, 0.0, 2, 3, 3, 3)
            .unwrap();
        assert_eq!(offset, -1 - 3 - 2);
        assert_eq!(H[[(-offset) as usize, (-offset) as usize]], 0.1);
        assert_eq!(H[[(-offset) as usize, (-offset) as usize + 1]], -0.5);
        assert_eq!(H[[0, 0]], 2.0);
    }

    #[test]
    fn lead_classification() {
        let mut r = Region::uniform(1.0, 0.2, 3, 2);
        assert_eq!(r.channel_uniform("r").unwrap(), (1.0, 0.2));
        r.v[[1, 1]] = C64::from(0.3);
        assert!(matches!(r.channel_uniform("r"), Err(BardeenError::NotUniform("r"))));
        assert_eq!(r.channel_diagonal("r").unwrap().1, nd::array![0.2, 0.3]);
        r.t[[0, 1]] = C64::from(0.1);
        assert!(matches!(r.channel_diagonal("r"), Err(BardeenError::NotDiagonal("r"))));
    }

    #[test]
    fn complex_lead_couplings_are_kept() {
        let soc = C64::new(0.0, 0.1);
        let lead = Region::new(
            nd::array![[C64::from(1.0), soc], [soc.conj(), C64::from(1.0)]],
            nd::Array2::zeros((2, 2)),
            3,
        );
        let (H, offset) = system(
            &Region::uniform(1.0, 0.5, 2, 2),
            &lead,
            &Region::uniform(1.0, 0.0, 3, 2),
            &barrier(2),
        ).unwrap();
        assert!(is_hermitian(&H, 0.0));
        let k = (-3 - offset) as usize;
        assert_eq!(H[[k, k + 1, 0, 1]], -soc);
        assert_eq!(H[[k + 1, k, 1, 0]], -soc.conj());
        assert!(matches!(lead.channel_diagonal("left"), Err(BardeenError::NotDiagonal("left"))));

        let skewed = Region::new(
            nd::array![[C64::from(1.0), soc], [soc, C64::from(1.0)]],
            nd::Array2::zeros((2, 2)),
            3,
        );
        assert!(matches!(
            system(&skewed, &lead, &lead, &barrier(2)),
            Err(BardeenError::NotHermitian("infty")),
        ));
    }
}
