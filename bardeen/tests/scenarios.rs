use approx::{ assert_abs_diff_eq, assert_relative_eq };
use ndarray as nd;
use num_complex::Complex64 as C64;
use bardeen::{
    benchmark::{ benchmark, benchmark_transmission },
    error::BardeenError,
    hamiltonian::{ central_block, Region },
    kernel::{ kernel, Config, Path, Setup, Transmission },
    utils::{ is_channel_conserving_mat, is_hermitian, mat_4d_to_2d },
    compute_bardeen_transmission,
};

const V_INF: f64 = 0.5;
const N_INF: usize = 5;
const CUTOFF: f64 = 0.1;

// rectangular barrier of `n_c` sites and height `v0` between two leads of
// `n_lead` sites at zero potential, walled in at `V_INF`
fn barrier(n_loc: usize, n_c: usize, v0: f64, n_lead: usize) -> Setup {
    let hc = central_block(
        n_c, &nd::Array2::eye(n_loc), &nd::Array2::from_diag_elem(n_loc, v0),
    ).unwrap();
    Setup::new(
        Region::uniform(1.0, V_INF, N_INF, n_loc),
        Region::uniform(1.0, 0.0, n_lead, n_loc),
        Region::uniform(1.0, 0.0, n_lead, n_loc),
        hc,
    )
}

// two-channel barrier with a spin flip of strength `j` on the middle site; the
// reference central block has no flip
fn spin_flip(j: f64) -> Setup {
    let setup = barrier(2, 5, 0.5, 40);
    let hc_ref = setup.hc.clone();
    let mut hc = setup.hc.clone();
    hc[[2, 2, 0, 1]] = C64::from(j);
    hc[[2, 2, 1, 0]] = C64::from(j);
    Setup { hc, ..setup }.with_hc_ref(hc_ref)
}

// lattice transmission through `n_c` sites at height `v0`, for energies below
// the barrier band
fn barrier_transmission(n_c: usize, v0: f64, e: f64) -> f64 {
    let k = (e / -2.0).acos();
    let q = ((v0 - e) / 2.0).acosh();
    let ratio = (n_c as f64 * q).sinh() / q.sinh();
    1.0 / (1.0 + (v0 * ratio).powi(2) / (4.0 * k.sin().powi(2)))
}

fn relative_errors(trans: &Transmission, exact: &nd::Array2<f64>) -> Vec<f64> {
    trans.iter()
        .map(|(a, m, _, p)| (p - exact[[a, m]]) / exact[[a, m]])
        .collect()
}

#[test]
fn constructed_hamiltonians_are_hermitian() {
    let setup = spin_flip(0.2)
        .with_left_ref(nd::Array2::<f64>::eye(2), nd::Array2::from_diag_elem(2, 0.3));
    let (hsys, _) = setup.system().unwrap();
    let (hl, _) = setup.reference_left().unwrap();
    let (hr, _) = setup.reference_right().unwrap();
    assert!(is_hermitian(&hsys, 0.0));
    assert!(is_hermitian(&hl, 0.0));
    assert!(is_hermitian(&hr, 0.0));
}

#[test]
fn references_from_diagonal_leads_conserve_channels() {
    let setup = spin_flip(0.2);
    for (h, _) in [setup.reference_left().unwrap(), setup.reference_right().unwrap()] {
        assert!(is_channel_conserving_mat(&mat_4d_to_2d(&h), 2, 0.0));
    }
    let (hsys, _) = setup.system().unwrap();
    assert!(!is_channel_conserving_mat(&mat_4d_to_2d(&hsys), 2, 0.0));
}

#[test]
fn channel_mixing_reference_aborts_resolved_path() {
    let setup = spin_flip(0.2);
    let mixing = Setup { hc_ref: setup.hc.clone(), ..setup };
    assert!(matches!(
        kernel(&mixing, &Config::new(CUTOFF)),
        Err(BardeenError::ChannelMixing("HL")),
    ));
    assert!(kernel(&mixing, &Config::new(CUTOFF).with_path(Path::Mixed)).is_ok());
}

#[test]
fn exact_solver_matches_single_barrier_formula() {
    let setup = barrier(1, 1, 0.5, 40);
    let energies = nd::array![[-1.99, -1.9, -1.5, -1.0, 0.0]];
    let exact = benchmark(&setup.left, &setup.right, &setup.hc, &energies).unwrap();
    for (e, t) in energies.iter().zip(&exact) {
        let sin2 = (e / -2.0_f64).acos().sin().powi(2);
        assert_abs_diff_eq!(*t, 4.0 * sin2 / (4.0 * sin2 + 0.25), epsilon = 1e-9);
    }
}

#[test]
fn bardeen_underestimates_exact_for_thick_barrier() {
    let setup = barrier(1, 5, 0.5, 40);
    let trans = kernel(&setup, &Config::new(CUTOFF)).unwrap();
    assert!(trans.len() >= 3);
    let exact = benchmark_transmission(&setup, &trans).unwrap();
    for (rel, (_, _, _, p)) in relative_errors(&trans, &exact).iter().zip(trans.iter()) {
        assert!((0.0..=1.0).contains(&p));
        assert!(*rel < -0.1 && *rel > -0.2, "relative error {rel}");
    }
}

#[test]
fn long_leads_agree_with_analytic_barrier() {
    let setup = barrier(1, 5, 0.5, 200);
    let trans = kernel(&setup, &Config::new(0.02)).unwrap();
    assert!(trans.len() >= 5);
    let exact = benchmark_transmission(&setup, &trans).unwrap();
    for (_, m, e, p) in trans.iter() {
        let analytic = barrier_transmission(5, 0.5, e);
        assert_relative_eq!(exact[[0, m]], analytic, max_relative = 1e-8);
        let rel = (p - analytic) / analytic;
        assert!(rel.abs() < 0.05, "relative error {rel} at E + 2 = {}", e + 2.0);
    }
}

#[test]
fn sub_band_states_transmit_nothing() {
    let well = central_block(1, &nd::array![[1.0]], &nd::array![[-1.0]]).unwrap();
    let setup = Setup::new(
        Region::uniform(1.0, V_INF, N_INF, 1),
        Region::uniform(1.0, 0.0, 40, 1),
        Region::uniform(1.0, 0.0, 40, 1),
        well,
    );
    let trans = kernel(&setup, &Config::new(CUTOFF)).unwrap();
    let exact = benchmark_transmission(&setup, &trans).unwrap();
    let (_, _, e0, p0) = trans.iter().next().unwrap();
    assert!(e0 + 2.0 < 0.0);
    assert_eq!(p0, 0.0);
    assert_eq!(exact[[0, 0]], 0.0);
    for (_, m, _, p) in trans.iter().skip(1) {
        assert!(p > 0.0);
        assert!(exact[[0, m]] > 0.0);
    }
}

#[test]
fn longer_leads_converge_to_exact() {
    // scenario C
    let mean_err = |n_lead: usize| -> f64 {
        let setup = barrier(1, 5, 0.5, n_lead);
        let trans = kernel(&setup, &Config::new(CUTOFF)).unwrap();
        let exact = benchmark_transmission(&setup, &trans).unwrap();
        let errs = relative_errors(&trans, &exact);
        errs.iter().map(|e| e.abs()).sum::<f64>() / errs.len() as f64
    };
    let short = mean_err(40);
    let long = mean_err(80);
    assert!(long < short, "{long} !< {short}");
}

#[test]
fn single_site_barrier_is_monotone() {
    // scenario A
    let setup = barrier(1, 1, 0.5, 40);
    let trans = kernel(&setup, &Config::new(CUTOFF)).unwrap();
    let points: Vec<(f64, f64)>
        = trans.iter().map(|(_, _, e, p)| (e, p)).collect();
    assert!(points.len() >= 3);
    for w in points.windows(2) {
        assert!(w[1].0 > w[0].0);
        assert!(w[1].1 > w[0].1);
    }
    // the ratio to the analytic curve climbs toward 1 with energy
    let ratios: Vec<f64>
        = points.iter()
        .map(|(e, p)| p / barrier_transmission(1, 0.5, *e))
        .collect();
    for (r, (_, p)) in ratios.iter().zip(&points) {
        assert!((0.0..=1.0).contains(p));
        assert!(*r > 0.5 && *r < 1.01, "ratio {r}");
    }
    assert!(ratios.windows(2).all(|w| w[1] > w[0]));
}

#[test]
fn spin_flip_is_symmetric_in_coupling_sign() {
    // scenario B
    let config = Config::new(CUTOFF);
    let plus = kernel(&spin_flip(0.2), &config).unwrap();
    let minus = kernel(&spin_flip(-0.2), &config).unwrap();
    assert_eq!(plus.counts, minus.counts);
    for ((_, _, ep, tp), (_, _, em, tm)) in plus.iter().zip(minus.iter()) {
        assert_eq!(ep, em);
        assert_relative_eq!(tp, tm, max_relative = 1e-10);
    }
    let (rp, rm) = (plus.resolved.unwrap(), minus.resolved.unwrap());
    for (a, b) in rp.iter().zip(&rm).filter(|(a, _)| a.is_finite()) {
        assert_relative_eq!(*a, *b, max_relative = 1e-10, epsilon = 1e-300);
    }
}

#[test]
fn spin_flip_opens_the_other_channel() {
    let trans = kernel(&spin_flip(0.2), &Config::new(CUTOFF)).unwrap();
    let res = trans.resolved.as_ref().unwrap();
    for (a, m, _, p) in trans.iter() {
        let flip = res[[a, m, 1 - a]];
        assert!(flip > 0.0);
        assert_relative_eq!(res[[a, m, a]] + flip, p, max_relative = 1e-12);
    }
}

#[test]
fn no_coupling_reduces_to_single_channel() {
    let config = Config::new(CUTOFF);
    let single = kernel(&barrier(1, 5, 0.5, 40), &config).unwrap();
    let resolved = kernel(&spin_flip(0.0), &config).unwrap();
    let res = resolved.resolved.as_ref().unwrap();
    for a in 0..2 {
        assert_eq!(resolved.counts[a], single.counts[0]);
        for (_, m, e, p) in single.iter() {
            assert_relative_eq!(resolved.energies[[a, m]], e, max_relative = 1e-10);
            assert_relative_eq!(res[[a, m, a]], p, max_relative = 1e-10);
            assert_eq!(res[[a, m, 1 - a]], 0.0);
        }
    }

    let mixed = kernel(&spin_flip(0.0), &config.with_path(Path::Mixed)).unwrap();
    assert_eq!(mixed.counts, vec![2 * single.counts[0]]);
    for (_, m, e, p) in single.iter() {
        for k in [2 * m, 2 * m + 1] {
            assert_relative_eq!(mixed.energies[[0, k]], e, max_relative = 1e-10);
            assert_relative_eq!(mixed.probabilities[[0, k]], p, max_relative = 1e-8);
        }
    }
}

#[test]
fn mixed_benchmark_matches_kernel_shape() {
    let setup = spin_flip(0.0);
    let trans = kernel(&setup, &Config::new(CUTOFF).with_path(Path::Mixed)).unwrap();
    let exact = benchmark_transmission(&setup, &trans).unwrap();
    assert_eq!(exact.dim(), trans.probabilities.dim());
    for (_, m, _, p) in trans.iter() {
        let rel = (p - exact[[0, m]]) / exact[[0, m]];
        assert!(rel < -0.1 && rel > -0.2, "relative error {rel}");
    }
}

#[test]
fn lowering_cutoff_never_adds_states() {
    let setup = barrier(2, 5, 0.5, 30);
    let mut last: Option<Vec<usize>> = None;
    for cutoff in [0.3, 0.2, 0.1, 0.05] {
        let counts = kernel(&setup, &Config::new(cutoff)).unwrap().counts;
        if let Some(prev) = last.as_ref() {
            assert!(counts.iter().zip(prev).all(|(now, before)| now <= before));
        }
        last = Some(counts);
    }
}

#[test]
fn positional_entry_point_agrees_with_kernel() {
    let setup = barrier(1, 5, 0.5, 40);
    let t = nd::array![[1.0]];
    let v_inf = nd::array![[V_INF]];
    let zero = nd::array![[0.0]];
    let (energies, probabilities) = compute_bardeen_transmission(
        &t, &t, &t, &t, &t,
        &v_inf, &zero, &v_inf, &zero, &v_inf,
        N_INF, 40, 40,
        &setup.hc, &setup.hc,
        CUTOFF,
    ).unwrap();
    let trans = kernel(&setup, &Config::new(CUTOFF)).unwrap();
    assert_eq!(energies, trans.energies);
    assert_eq!(probabilities, trans.probabilities);

    let short: nd::Array4<C64> = nd::Array4::zeros((3, 3, 1, 1));
    assert!(matches!(
        compute_bardeen_transmission(
            &t, &t, &t, &t, &t,
            &v_inf, &zero, &v_inf, &zero, &v_inf,
            N_INF, 40, 40,
            &setup.hc, &short,
            CUTOFF,
        ),
        Err(BardeenError::CentralMismatch(..)),
    ));
}
