//! Matrix elements of the tunneling perturbation between bound states of the
//! two isolated wells.
//!
//! The perturbation is the difference `Hsys - HL` between the full system
//! Hamiltonian and the left-well reference, taken in flattened site⊗channel
//! form. Its matrix element between an initial left-well state `|m⟩` and a
//! final right-well state `|n⟩` is `⟨n| (Hsys - HL) |m⟩`.

use ndarray as nd;
use num_complex::Complex64 as C64;
use crate::{
    Arr1,
    Arr2,
    Arr4,
    bound::BoundState,
    utils::{ mat_4d_to_2d, vdot },
};

/// Compute the flattened difference `hsys - href`.
///
/// *Panics if the arrays have different shapes*.
pub fn perturbation<S, T>(hsys: &Arr4<S>, href: &Arr4<T>) -> nd::Array2<C64>
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = C64>,
{
    assert_eq!(hsys.shape(), href.shape());
    mat_4d_to_2d(&(hsys - href))
}

/// Calculate `⟨psi_f| op |psi_i⟩` for flattened state vectors.
///
/// *Panics if the dimensions are inconsistent*.
pub fn matrix_element<S, T, U>(psi_f: &Arr1<S>, op: &Arr2<T>, psi_i: &Arr1<U>)
    -> C64
where
    S: nd::Data<Elem = C64>,
    T: nd::Data<Elem = C64>,
    U: nd::Data<Elem = C64>,
{
    vdot(psi_f, &op.dot(psi_i))
}

/// Compute `|⟨f| op |i⟩|²` for every pair of final and initial states,
/// returning an array indexed as `[[f, i]]`.
///
/// *Panics if the dimensions are inconsistent*.
pub fn squared_elements<S>(
    op: &Arr2<S>,
    initial: &[BoundState],
    fin: &[BoundState],
) -> nd::Array2<f64>
where S: nd::Data<Elem = C64>
{
    let mut m2: nd::Array2<f64> = nd::Array2::zeros((fin.len(), initial.len()));
    for (i, state_i) in initial.iter().enumerate() {
        let op_psi: nd::Array1<C64> = op.dot(&state_i.psi);
        m2.column_mut(i).iter_mut().zip(fin)
            .for_each(|(m2fi, state_f)| {
                *m2fi = vdot(&state_f.psi, &op_psi).norm_sqr();
            });
    }
    m2
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::embed_channel;

    fn state(channel: usize, psi: nd::Array1<C64>, n_loc: usize) -> BoundState {
        BoundState {
            channel: Some(channel),
            index: 0,
            energy: 0.0,
            psi: embed_channel(&psi, channel, n_loc),
        }
    }

    #[test]
    fn channel_diagonal_operator_has_no_cross_elements() {
        let op: nd::Array2<C64>
            = nd::Array2::from_diag(&nd::array![1.0, 1.0, 2.0, 2.0].mapv(C64::from));
        let psi = nd::array![C64::from(0.6), C64::from(0.8)];
        let initial = vec![state(0, psi.clone(), 2)];
        let fin = vec![state(0, psi.clone(), 2), state(1, psi, 2)];
        let m2 = squared_elements(&op, &initial, &fin);
        // ⟨ψ|op|ψ⟩ = 0.36 * 1 + 0.64 * 2
        assert!((m2[[0, 0]] - 1.64_f64.powi(2)).abs() < 1e-12);
        assert_eq!(m2[[1, 0]], 0.0);
    }

    #[test]
    fn spin_flip_couples_channels() {
        // single site, off-diagonal coupling J between the two channels
        let j = C64::from(0.3);
        let op = nd::array![[C64::from(0.0), j], [j, C64::from(0.0)]];
        let up = state(0, nd::array![C64::from(1.0)], 2);
        let dn = state(1, nd::array![C64::from(1.0)], 2);
        assert!((matrix_element(&dn.psi, &op, &up.psi) - j).norm() < 1e-15);
        let m2 = squared_elements(&op, &[up.clone()], &[up, dn]);
        assert_eq!(m2[[0, 0]], 0.0);
        assert!((m2[[1, 0]] - 0.09).abs() < 1e-15);
    }

    #[test]
    fn perturbation_is_flattened_difference() {
        let mut a: nd::Array4<C64> = nd::Array4::zeros((2, 2, 2, 2));
        let b: nd::Array4<C64> = nd::Array4::zeros((2, 2, 2, 2));
        a[[1, 0, 0, 1]] = C64::from(-0.5);
        let d = perturbation(&a, &b);
        assert_eq!(d[[2, 1]], C64::from(-0.5));
        assert_eq!(d.iter().filter(|x| x.norm() > 0.0).count(), 1);
    }
}
