use bardeen::{
    benchmark::{ benchmark_resolved, benchmark_transmission },
    kernel::{ kernel, Config, Path },
};
use lib::{ init_tracing, print_comparison, Lattice };
use tracing::info;

const V0: f64 = 0.5; // barrier height
const N_C: usize = 5;
const V_INF: f64 = 0.5; // asymptotic potential
const N_INF: usize = 5;
const N_LEAD: usize = 40;
const E_CUTOFF: f64 = 0.1;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let lattice = Lattice { n_loc: 2, n_inf: N_INF, v_inf: V_INF, n_lead: N_LEAD };
    let config = Config::new(E_CUTOFF);

    for j in [0.0, 0.1, -0.1, 0.2] {
        info!("spin flip J = {j}");
        let setup = lattice.spin_flip(N_C, V0, j, false)?;
        let trans = kernel(&setup, &config)?;
        let exact = benchmark_resolved(&setup.left, &setup.right, &setup.hc, &trans.energies)?;
        println!("J = {j}, channel-resolved");
        println!(
            "{:>4} {:>4} {:>12} {:>14} {:>14} {:>14} {:>14}",
            "α", "m", "E + 2", "T α→α", "T α→ᾱ", "exact α→α", "exact α→ᾱ",
        );
        if let Some(res) = trans.resolved.as_ref() {
            for (a, m, e, _) in trans.iter() {
                println!(
                    "{:>4} {:>4} {:>12.6e} {:>14.6e} {:>14.6e} {:>14.6e} {:>14.6e}",
                    a, m, e + 2.0,
                    res[[a, m, a]], res[[a, m, 1 - a]],
                    exact[[a, m, a]], exact[[a, m, 1 - a]],
                );
            }
        }

        let setup = lattice.spin_flip(N_C, V0, j, true)?;
        let trans = kernel(&setup, &config.with_path(Path::Mixed))?;
        let exact = benchmark_transmission(&setup, &trans)?;
        println!("J = {j}, mixed");
        print_comparison(&trans, &exact);
        println!();
    }
    Ok(())
}
