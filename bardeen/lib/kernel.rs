//! The Bardeen transmission kernel.
//!
//! For a chain described by a [`Setup`], the kernel builds the full system
//! Hamiltonian `Hsys` along with two references, `HL` and `HR`, in which the
//! right and left halves respectively are replaced by their "reference"
//! parameters and the central block by its reference version. Bound states of
//! `HL` are taken as initial states and those of `HR` as final states; the
//! squared matrix elements of `Hsys - HL` between them are averaged over
//! energy-matched final states and rescaled by the lead densities of states to
//! give a transmission probability for each initial state.

use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing::{ debug, info };
use crate::{
    Arr2,
    Arr4,
    average::{ average, prefactor },
    bound::{ extract_mixed, extract_resolved, wavenumber, BoundState, Spectrum },
    coupling::{ perturbation, squared_elements },
    error::BardeenError,
    hamiltonian::{ system, BResult, Region },
    DEF_CUTOFF,
    DEF_WINDOW,
};

/// Selects how bound states are computed.
#[derive(Copy, Clone, Debug, PartialEq, Eq, Default)]
pub enum Path {
    /// Diagonalize each channel separately. Requires channel-conserving
    /// reference Hamiltonians and channel-diagonal leads.
    #[default]
    Resolved,
    /// Diagonalize over the full site⊗channel space once. Requires leads that
    /// are diagonal and identical across channels.
    Mixed,
}

/// Kernel parameters.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Config {
    /// Bound states are retained if `E + 2t < e_cutoff`.
    ///
    /// The Bardeen approximation holds only for weak tunneling near the bottom
    /// of the lead band. For thin or low barriers, states far above the band
    /// bottom can be assigned `T > 1`; a single site of height `0.5` between
    /// unit-hopping leads already does so above `E + 2t ≈ 0.15`.
    pub e_cutoff: f64,
    /// Full width of the energy-matching window.
    pub window: f64,
    /// Bound-state representation.
    pub path: Path,
}

impl Default for Config {
    fn default() -> Self {
        Self { e_cutoff: DEF_CUTOFF, window: DEF_WINDOW, path: Path::Resolved }
    }
}

impl Config {
    /// Create a new `Config` with the given cutoff and default window and path.
    pub fn new(e_cutoff: f64) -> Self { Self { e_cutoff, ..Self::default() } }

    /// Set the matching window.
    pub fn with_window(mut self, window: f64) -> Self {
        self.window = window;
        self
    }

    /// Set the bound-state path.
    pub fn with_path(mut self, path: Path) -> Self {
        self.path = path;
        self
    }
}

/// Full description of a tunneling problem.
///
/// The reference leads keep the site counts of the true leads; only their
/// hopping and potential matrices are used.
#[derive(Clone, Debug)]
pub struct Setup {
    pub infty: Region,
    pub left: Region,
    pub left_ref: Region,
    pub right: Region,
    pub right_ref: Region,
    pub hc: nd::Array4<C64>,
    pub hc_ref: nd::Array4<C64>,
}

impl Setup {
    /// Create a new `Setup` whose reference leads take the parameters of the
    /// asymptotic region and whose reference central block equals `hc`.
    pub fn new(infty: Region, left: Region, right: Region, hc: nd::Array4<C64>)
        -> Self
    {
        Self {
            left_ref: left.with_params_of(&infty),
            right_ref: right.with_params_of(&infty),
            hc_ref: hc.clone(),
            infty,
            left,
            right,
            hc,
        }
    }

    /// Set the reference parameters of the left lead.
    pub fn with_left_ref<A>(mut self, t: nd::Array2<A>, v: nd::Array2<A>) -> Self
    where A: Copy + Into<C64>
    {
        self.left_ref = Region::new(t, v, self.left.n);
        self
    }

    /// Set the reference parameters of the right lead.
    pub fn with_right_ref<A>(mut self, t: nd::Array2<A>, v: nd::Array2<A>) -> Self
    where A: Copy + Into<C64>
    {
        self.right_ref = Region::new(t, v, self.right.n);
        self
    }

    /// Set the reference central block.
    pub fn with_hc_ref(mut self, hc_ref: nd::Array4<C64>) -> Self {
        self.hc_ref = hc_ref;
        self
    }

    /// Get the number of channels.
    pub fn n_loc(&self) -> usize { self.hc.dim().2 }

    /// Build the full system Hamiltonian, returning it along with the site
    /// index of its first row.
    pub fn system(&self) -> BResult<(nd::Array4<C64>, isize)> {
        system(&self.infty, &self.left, &self.right, &self.hc)
    }

    /// Build the left-well reference Hamiltonian.
    pub fn reference_left(&self) -> BResult<(nd::Array4<C64>, isize)> {
        self.check_hc_ref()?;
        let right = self.right.with_params_of(&self.right_ref);
        system(&self.infty, &self.left, &right, &self.hc_ref)
    }

    /// Build the right-well reference Hamiltonian.
    pub fn reference_right(&self) -> BResult<(nd::Array4<C64>, isize)> {
        self.check_hc_ref()?;
        let left = self.left.with_params_of(&self.left_ref);
        system(&self.infty, &left, &self.right, &self.hc_ref)
    }

    fn check_hc_ref(&self) -> BResult<()> {
        (self.hc.shape() == self.hc_ref.shape())
            .then_some(())
            .ok_or_else(|| {
                BardeenError::CentralMismatch(
                    self.hc.shape().to_vec(), self.hc_ref.shape().to_vec())
            })
    }
}

/// Output of the kernel.
///
/// Rows of [`energies`][Self::energies] and
/// [`probabilities`][Self::probabilities] correspond to initial channels for
/// [`Path::Resolved`] and to a single row for [`Path::Mixed`], with columns
/// indexing bound states. Slots beyond each row's valid
/// [count][Self::counts] hold `NaN`.
#[derive(Clone, Debug)]
pub struct Transmission {
    pub path: Path,
    pub energies: nd::Array2<f64>,
    pub probabilities: nd::Array2<f64>,
    /// Transmission from initial state `(α, m)` into final channel `β`, as
    /// `[[α, m, β]]`; present only for [`Path::Resolved`].
    pub resolved: Option<nd::Array3<f64>>,
    pub counts: Vec<usize>,
}

impl Transmission {
    /// Iterate over `(row, index, energy, probability)` for all valid slots.
    pub fn iter(&self) -> impl Iterator<Item = (usize, usize, f64, f64)> + '_ {
        self.counts.iter().enumerate()
            .flat_map(|(a, n)| (0..*n).map(move |m| (a, m)))
            .map(|(a, m)| {
                (a, m, self.energies[[a, m]], self.probabilities[[a, m]])
            })
    }

    /// Get the total number of valid slots.
    pub fn len(&self) -> usize { self.counts.iter().sum() }

    /// Return `true` if no bound states were retained.
    pub fn is_empty(&self) -> bool { self.len() == 0 }
}

/// Compute Bardeen transmission probabilities for every retained bound state
/// of the left well.
#[tracing::instrument(level = "debug", skip_all, fields(path = ?config.path))]
pub fn kernel(setup: &Setup, config: &Config) -> BResult<Transmission> {
    BardeenError::check_window(config.window)?;
    let n_loc = setup.n_loc();
    let (Hsys, _) = setup.system()?;
    let (HL, _) = setup.reference_left()?;
    let (HR, _) = setup.reference_right()?;

    // per-channel lead parameters; uniform across channels on the mixed path
    let (t_l, v_l, t_r, spec_l, spec_r)
        = match config.path {
            Path::Resolved => {
                let (t_l, v_l) = setup.left.channel_diagonal("left")?;
                let (t_r, _) = setup.right.channel_diagonal("right")?;
                let spec_l = extract_resolved("HL", &HL, &t_l, config.e_cutoff)?;
                let spec_r = extract_resolved("HR", &HR, &t_r, config.e_cutoff)?;
                (t_l, v_l, t_r, Spectrum::Resolved(spec_l), Spectrum::Resolved(spec_r))
            },
            Path::Mixed => {
                let (t_l, v_l) = setup.left.channel_uniform("left")?;
                let (t_r, _) = setup.right.channel_uniform("right")?;
                let spec_l = extract_mixed("HL", &HL, t_l, config.e_cutoff)?;
                let spec_r = extract_mixed("HR", &HR, t_r, config.e_cutoff)?;
                (
                    nd::Array1::from_elem(n_loc, t_l),
                    nd::Array1::from_elem(n_loc, v_l),
                    nd::Array1::from_elem(n_loc, t_r),
                    Spectrum::Mixed(spec_l),
                    Spectrum::Mixed(spec_r),
                )
            },
        };
    let initial: Vec<BoundState> = spec_l.embedded();
    let fin: Vec<BoundState> = spec_r.embedded();
    info!(
        "{} initial and {} final bound states",
        initial.len(), fin.len(),
    );

    let hdiff: nd::Array2<C64> = perturbation(&Hsys, &HL);
    let m2 = squared_elements(&hdiff, &initial, &fin);
    let groups = (config.path == Path::Resolved).then_some(n_loc);
    let averaged = average(&initial, &fin, &m2, config.window, groups);

    let (n_rows, counts): (usize, Vec<usize>)
        = match &spec_l {
            Spectrum::Resolved(states) => (n_loc, states.counts().to_vec()),
            Spectrum::Mixed(states) => (1, vec![states.len()]),
        };
    let capacity = counts.iter().copied().max().unwrap_or(0);
    let mut energies: nd::Array2<f64>
        = nd::Array2::from_elem((n_rows, capacity), f64::NAN);
    let mut probabilities: nd::Array2<f64>
        = nd::Array2::from_elem((n_rows, capacity), f64::NAN);
    let mut resolved: Option<nd::Array3<f64>>
        = (config.path == Path::Resolved)
        .then(|| nd::Array3::from_elem((n_loc, capacity, n_loc), f64::NAN));

    for (state, avg) in initial.iter().zip(&averaged) {
        let a = state.channel.unwrap_or(0);
        let row = if config.path == Path::Resolved { a } else { 0 };
        let m = state.index;
        energies[[row, m]] = state.energy;
        let scale: f64
            = match wavenumber(state.energy, v_l[a], t_l[a]) {
                Some(k) if avg.matches > 0 => {
                    prefactor(setup.left.n, setup.right.n, k, t_l[a], t_r[a])
                },
                Some(_) => {
                    debug!(
                        "no final states within window of initial state \
                        ({row}, {m}) at E = {:.6e}",
                        state.energy,
                    );
                    0.0
                },
                None => {
                    debug!(
                        "initial state ({row}, {m}) at E = {:.6e} lies outside \
                        the left lead band",
                        state.energy,
                    );
                    0.0
                },
            };
        probabilities[[row, m]] = scale * avg.total;
        if let Some(res) = resolved.as_mut() {
            res.slice_mut(nd::s![a, m, ..])
                .assign(&(&avg.by_channel * scale));
        }
    }

    Ok(Transmission { path: config.path, energies, probabilities, resolved, counts })
}

/// Compute channel-resolved Bardeen transmission probabilities from the full
/// set of region parameters, returning per-channel bound-state energies and
/// transmission probabilities, both of shape `(n_loc, n_bound)`.
///
/// Reference matrices `*_ref` replace the corresponding true lead parameters in
/// the opposite well's reference Hamiltonian. Slots beyond a channel's number
/// of retained states hold `NaN`.
#[allow(clippy::too_many_arguments)]
pub fn compute_bardeen_transmission<S, T, A>(
    t_inf: &Arr2<S>,
    t_l: &Arr2<S>,
    t_l_ref: &Arr2<S>,
    t_r: &Arr2<S>,
    t_r_ref: &Arr2<S>,
    v_inf: &Arr2<S>,
    v_l: &Arr2<S>,
    v_l_ref: &Arr2<S>,
    v_r: &Arr2<S>,
    v_r_ref: &Arr2<S>,
    n_inf: usize,
    n_l: usize,
    n_r: usize,
    hc: &Arr4<T>,
    hc_ref: &Arr4<T>,
    e_cutoff: f64,
) -> BResult<(nd::Array2<f64>, nd::Array2<f64>)>
where
    S: nd::Data<Elem = A>,
    T: nd::Data<Elem = C64>,
    A: Copy + Into<C64>,
{
    let setup = Setup {
        infty: Region::new(t_inf.to_owned(), v_inf.to_owned(), n_inf),
        left: Region::new(t_l.to_owned(), v_l.to_owned(), n_l),
        left_ref: Region::new(t_l_ref.to_owned(), v_l_ref.to_owned(), n_l),
        right: Region::new(t_r.to_owned(), v_r.to_owned(), n_r),
        right_ref: Region::new(t_r_ref.to_owned(), v_r_ref.to_owned(), n_r),
        hc: hc.to_owned(),
        hc_ref: hc_ref.to_owned(),
    };
    let Transmission { energies, probabilities, .. }
        = kernel(&setup, &Config::new(e_cutoff))?;
    Ok((energies, probabilities))
}
