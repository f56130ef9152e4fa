//! Shared setup and output helpers for the driver binaries.

use std::io::IsTerminal;
use ndarray as nd;
use num_complex::Complex64 as C64;
use tracing_subscriber::{
    layer::SubscriberExt,
    util::SubscriberInitExt,
    EnvFilter,
    Registry,
};
use bardeen::{
    hamiltonian::{ central_block, Region },
    kernel::{ Setup, Transmission },
};

/// Install a global `fmt` subscriber writing to stderr, filtered by `RUST_LOG`
/// (default `info`).
pub fn init_tracing() -> anyhow::Result<()> {
    let filter
        = EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| EnvFilter::new("info"));
    let fmt_layer
        = tracing_subscriber::fmt::layer()
        .with_target(true)
        .with_ansi(std::io::stderr().is_terminal())
        .with_writer(std::io::stderr);
    Registry::default().with(filter).with(fmt_layer).try_init()?;
    Ok(())
}

/// Lattice parameters shared by every driver: unit hopping everywhere, leads
/// at zero potential, and asymptotic regions at `v_inf`.
#[derive(Copy, Clone, Debug)]
pub struct Lattice {
    pub n_loc: usize,
    pub n_inf: usize,
    pub v_inf: f64,
    pub n_lead: usize,
}

impl Lattice {
    /// Build a [`Setup`] for a rectangular barrier of `n_c` sites and height
    /// `v0` in every channel.
    pub fn barrier(&self, n_c: usize, v0: f64) -> anyhow::Result<Setup> {
        let hc = central_block(
            n_c,
            &nd::Array2::eye(self.n_loc),
            &nd::Array2::from_diag_elem(self.n_loc, v0),
        )?;
        Ok(Setup::new(
            Region::uniform(1.0, self.v_inf, self.n_inf, self.n_loc),
            Region::uniform(1.0, 0.0, self.n_lead, self.n_loc),
            Region::uniform(1.0, 0.0, self.n_lead, self.n_loc),
            hc,
        ))
    }

    /// Build a [`Setup`] for a two-channel rectangular barrier with an
    /// exchange coupling `j` between the channels on its middle site.
    ///
    /// If `flip_in_ref` is `false`, the reference central block omits the
    /// coupling, as required for channel-resolved bound states.
    pub fn spin_flip(&self, n_c: usize, v0: f64, j: f64, flip_in_ref: bool)
        -> anyhow::Result<Setup>
    {
        let lattice = Self { n_loc: 2, ..*self };
        let setup = lattice.barrier(n_c, v0)?;
        let mid = n_c / 2;
        let mut hc = setup.hc.clone();
        hc[[mid, mid, 0, 1]] = C64::from(j);
        hc[[mid, mid, 1, 0]] = C64::from(j);
        let hc_ref = if flip_in_ref { hc.clone() } else { setup.hc.clone() };
        Ok(Setup { hc, ..setup }.with_hc_ref(hc_ref))
    }
}

/// Mean absolute relative error of a kernel result against exact values over
/// all valid slots.
pub fn mean_rel_err(trans: &Transmission, exact: &nd::Array2<f64>) -> f64 {
    let (sum, n)
        = trans.iter()
        .map(|(a, m, _, p)| ((p - exact[[a, m]]) / exact[[a, m]]).abs())
        .fold((0.0, 0_usize), |(s, n), e| (s + e, n + 1));
    if n > 0 { sum / n as f64 } else { f64::NAN }
}

/// Print one row per valid slot of a kernel result, comparing against exact
/// values. Energies are given relative to the lead band bottom `-2`.
pub fn print_comparison(trans: &Transmission, exact: &nd::Array2<f64>) {
    println!(
        "{:>4} {:>4} {:>12} {:>14} {:>14} {:>10}",
        "row", "m", "E + 2", "T (Bardeen)", "T (exact)", "rel err",
    );
    for (a, m, e, p) in trans.iter() {
        let ex = exact[[a, m]];
        println!(
            "{:>4} {:>4} {:>12.6e} {:>14.6e} {:>14.6e} {:>10.4}",
            a, m, e + 2.0, p, ex, (p - ex) / ex,
        );
    }
}
