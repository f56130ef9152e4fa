//! Energy matching and averaging of squared matrix elements over final states.
//!
//! A final state contributes to the transmission out of an initial state only
//! if their energies agree to within half the matching window. Final states
//! confined to a single channel are grouped by that channel: the squared
//! matrix elements are averaged within each group and the group averages are
//! summed, giving a total over final channels that reduces to a plain average
//! when there is only one channel. Final states that are not confined to any
//! channel each count once, so their contributions are summed directly.

use ndarray as nd;
use crate::bound::BoundState;

/// Energy-averaged squared matrix elements for a single initial state.
#[derive(Clone, Debug, PartialEq)]
pub struct Averaged {
    /// Sum over final-channel groups of the mean squared matrix element.
    pub total: f64,
    /// Mean squared matrix element into each final channel; empty if final
    /// states are not channel-resolved.
    pub by_channel: nd::Array1<f64>,
    /// Number of final states found within the window.
    pub matches: usize,
}

/// Average squared matrix elements `m2[[f, i]]` over final states whose
/// energies lie strictly within `window / 2` of each initial energy.
///
/// Final states with non-finite energies are skipped. If `groups` is
/// `Some(n_loc)`, final states confined to a channel are grouped by it and
/// [`Averaged::by_channel`] has length `n_loc`; otherwise every matched final
/// state is summed individually.
///
/// *Panics if `m2` does not have shape `(fin.len(), initial.len())`*.
pub fn average(
    initial: &[BoundState],
    fin: &[BoundState],
    m2: &nd::Array2<f64>,
    window: f64,
    groups: Option<usize>,
) -> Vec<Averaged>
{
    assert_eq!(m2.dim(), (fin.len(), initial.len()));
    let n_groups = groups.unwrap_or(0);
    initial.iter().enumerate()
        .map(|(i, state_i)| {
            let mut total: f64 = 0.0;
            let mut matches: usize = 0;
            let mut sums: nd::Array1<f64> = nd::Array1::zeros(n_groups);
            let mut counts: Vec<usize> = vec![0; n_groups];
            for (f, state_f) in fin.iter().enumerate() {
                if !state_f.energy.is_finite()
                    || (state_i.energy - state_f.energy).abs() >= window / 2.0
                {
                    continue;
                }
                matches += 1;
                match state_f.channel.filter(|b| *b < n_groups) {
                    Some(b) => {
                        sums[b] += m2[[f, i]];
                        counts[b] += 1;
                    },
                    None => { total += m2[[f, i]]; },
                }
            }
            let by_channel: nd::Array1<f64>
                = sums.iter().zip(&counts)
                .map(|(s, n)| if *n > 0 { *s / *n as f64 } else { 0.0 })
                .collect();
            total += by_channel.sum();
            Averaged { total, by_channel, matches }
        })
        .collect()
}

/// Density-of-states prefactor `n_l / (k t_l) * n_r / (k t_r)` for lead
/// lengths `n_l`, `n_r` and hoppings `t_l`, `t_r`, at wavenumber `k`.
pub fn prefactor(n_l: usize, n_r: usize, k: f64, t_l: f64, t_r: f64) -> f64 {
    (n_l as f64 / (k * t_l)) * (n_r as f64 / (k * t_r))
}

#[cfg(test)]
mod tests {
    use super::*;
    use num_complex::Complex64 as C64;

    fn state(channel: Option<usize>, energy: f64) -> BoundState {
        BoundState {
            channel,
            index: 0,
            energy,
            psi: nd::Array1::<C64>::zeros(1),
        }
    }

    #[test]
    fn no_match_gives_zero() {
        let initial = vec![state(Some(0), -1.9)];
        let fin = vec![state(Some(0), -1.8), state(Some(1), -1.7)];
        let m2 = nd::array![[4.0], [5.0]];
        let avg = average(&initial, &fin, &m2, 1e-3, Some(2));
        assert_eq!(avg[0].matches, 0);
        assert_eq!(avg[0].total, 0.0);
        assert_eq!(avg[0].by_channel, nd::array![0.0, 0.0]);
    }

    #[test]
    fn mean_within_channel_sum_across() {
        let e = -1.9;
        let initial = vec![state(Some(0), e)];
        let fin = vec![
            state(Some(0), e + 1e-12),
            state(Some(0), e - 1e-12),
            state(Some(1), e),
            state(Some(1), e + 0.1),
        ];
        let m2 = nd::array![[1.0], [3.0], [10.0], [100.0]];
        let avg = average(&initial, &fin, &m2, 1e-9, Some(2));
        assert_eq!(avg[0].matches, 3);
        assert_eq!(avg[0].by_channel, nd::array![2.0, 10.0]);
        assert_eq!(avg[0].total, 12.0);
    }

    #[test]
    fn window_edge_is_exclusive() {
        let initial = vec![state(Some(0), 0.0)];
        let fin = vec![state(Some(0), 0.5)];
        let avg = average(&initial, &fin, &nd::array![[1.0]], 1.0, Some(1));
        assert_eq!(avg[0].matches, 0);
    }

    #[test]
    fn padded_final_states_are_skipped() {
        let initial = vec![state(Some(0), -1.9)];
        let fin = vec![state(Some(0), f64::NAN), state(Some(0), -1.9)];
        let m2 = nd::array![[7.0], [2.0]];
        let avg = average(&initial, &fin, &m2, f64::INFINITY, Some(1));
        assert_eq!(avg[0].matches, 1);
        assert_eq!(avg[0].total, 2.0);
    }

    #[test]
    fn unresolved_final_states_are_summed() {
        let initial = vec![state(None, -1.9)];
        let fin = vec![state(None, -1.9), state(None, -1.9), state(None, -1.0)];
        let m2 = nd::array![[1.0], [2.0], [50.0]];
        let avg = average(&initial, &fin, &m2, 1e-9, None);
        assert_eq!(avg[0].matches, 2);
        assert_eq!(avg[0].total, 3.0);
        assert!(avg[0].by_channel.is_empty());
    }

    #[test]
    fn prefactor_scales_with_lead_lengths() {
        let p = prefactor(10, 20, 0.5, 1.0, 2.0);
        assert!((p - (10.0 / 0.5) * (20.0 / 1.0)).abs() < 1e-12);
    }
}
