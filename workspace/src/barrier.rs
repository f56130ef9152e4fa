use bardeen::{ benchmark::benchmark_transmission, kernel::{ kernel, Config } };
use lib::{ init_tracing, print_comparison, Lattice };
use tracing::info;

const V0: f64 = 0.5; // barrier height
const V_INF: f64 = 0.5; // asymptotic potential
const N_INF: usize = 5;
const N_LEAD: usize = 40;
const E_CUTOFF: f64 = 0.1;

fn main() -> anyhow::Result<()> {
    init_tracing()?;
    let lattice = Lattice { n_loc: 1, n_inf: N_INF, v_inf: V_INF, n_lead: N_LEAD };
    let config = Config::new(E_CUTOFF);

    for n_c in [1, 3, 5, 7] {
        info!("barrier of {n_c} sites");
        let setup = lattice.barrier(n_c, V0)?;
        let trans = kernel(&setup, &config)?;
        let exact = benchmark_transmission(&setup, &trans)?;
        println!("N_C = {n_c}");
        print_comparison(&trans, &exact);
        if n_c == 1 {
            println!("single-site formula:");
            for (_, _, e, _) in trans.iter() {
                let sin2 = (e / -2.0_f64).acos().sin().powi(2);
                println!("{:>12.6e} {:>14.6e}", e + 2.0, 4.0 * sin2 / (4.0 * sin2 + V0 * V0));
            }
        }
        println!();
    }
    Ok(())
}
