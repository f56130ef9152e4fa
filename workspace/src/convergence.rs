use bardeen::{ benchmark::benchmark_transmission, kernel::{ kernel, Config } };
use lib::{ init_tracing, mean_rel_err, Lattice };
use tracing::info;

const V0: f64 = 0.5; // barrier height
const N_C: usize = 5;
const V_INF: f64 = 0.5; // asymptotic potential
const N_INF: usize = 5;
const E_CUTOFF: f64 = 0.1;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let config = Config::new(E_CUTOFF);

    println!("{:>8} {:>8} {:>14}", "N_L", "states", "mean |rel err|");
    for n_lead in [10, 20, 40, 80, 160] {
        info!("lead length {n_lead}");
        let lattice = Lattice { n_loc: 1, n_inf: N_INF, v_inf: V_INF, n_lead };
        let setup = lattice.barrier(N_C, V0)?;
        let trans = kernel(&setup, &config)?;
        let exact = benchmark_transmission(&setup, &trans)?;
        println!(
            "{:>8} {:>8} {:>14.6e}",
            n_lead, trans.len(), mean_rel_err(&trans, &exact),
        );
    }
    Ok(())
}
