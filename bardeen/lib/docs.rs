//! Theoretical background.
//!
//! # Contents
//! - [Background](#background)
//! - [Lattice model](#lattice-model)
//! - [Bardeen's approximation](#bardeens-approximation)
//! - [Wave-function matching](#wave-function-matching)
//!
//! # Background
//! Transmission through a barrier separating two conducting regions can be
//! computed exactly by solving a scattering problem: one fixes an incident
//! plane wave in one lead and asks for the amplitudes of the outgoing waves in
//! both leads. When the barrier is thick or high, though, the transmission is
//! small and well described by perturbation theory in the coupling between two
//! otherwise isolated wells. This is Bardeen's tunneling theory[^1], which
//! treats the states of the left and right wells as separate, nearly-orthogonal
//! bases and evaluates a Fermi's-golden-rule rate between them.
//!
//! The advantage of the perturbative picture is that it only requires bound
//! states of finite Hamiltonians (found by ordinary diagonalization) and
//! matrix elements between them, which extends naturally to barriers carrying
//! internal degrees of freedom that scatter between channels, e.g. a localized
//! spin coupled to a conduction electron.
//!
//! # Lattice model
//! The system is a one-dimensional tight-binding chain on which every site
//! carries `n_loc` channels. The Hamiltonian is block-tridiagonal (or
//! pentadiagonal in the central region):
//! ```text
//! H = Σ_j V_j |j⟩⟨j| - Σ_j t_j (|j⟩⟨j + 1| + |j + 1⟩⟨j|) + H_C
//! ```
//! where each *V*<sub>*j*</sub> and *t*<sub>*j*</sub> is an `n_loc × n_loc`
//! matrix and *H*<sub>*C*</sub> is an arbitrary Hermitian block over an
//! odd-length central region centered on site 0. Outside the central region the
//! chain is divided into four uniform regions,
//! ```text
//!   far-left | left lead | central | right lead | far-right
//!   (V∞, t∞)   (V_L, t_L)    H_C     (V_R, t_R)    (V∞, t∞)
//! ```
//! and each bond takes the hopping of the region containing its site farther
//! from the center. A uniform region with channel-diagonal *V* and *t* has
//! plane-wave solutions in channel *α* with dispersion
//! ```text
//! E = V_α - 2 t_α cos(k)
//! ```
//! so that the band bottom sits at *V*<sub>*α*</sub> - 2 *t*<sub>*α*</sub>.
//!
//! # Bardeen's approximation
//! Two reference Hamiltonians are defined from the full one, *H*<sub>sys</sub>.
//! In *H*<sub>*L*</sub>, the right lead is replaced by a region with
//! "reference" parameters (typically those of the asymptotic region, so that
//! it acts as a wall), confining low-energy states to the left lead; in
//! *H*<sub>*R*</sub> the left lead is replaced in the same way. The central
//! block in both is replaced by a reference version *H*<sub>*C*</sub>′.
//!
//! Eigenstates |*m*, *α*⟩ of *H*<sub>*L*</sub> and |*n*, *β*⟩ of
//! *H*<sub>*R*</sub> with energies near the band bottom of their lead
//! resemble standing waves in a box of length *N*<sub>*L*</sub> or
//! *N*<sub>*R*</sub>. The tunneling matrix element is
//! ```text
//! M_{nβ, mα} = ⟨n, β| (H_sys - H_L) |m, α⟩
//! ```
//! and the golden rule, converted from a rate to a transmission probability
//! using the lead densities of states and group velocities, gives
//! ```text
//!              N_L        N_R
//! T_{mα} = ---------- ---------- ⟨|M_{nβ, mα}|²⟩
//!          k t_{L, α} k t_{R, α}
//! ```
//! where *k* is the wavenumber of |*m*, *α*⟩ in the left lead and the average
//! runs over final states with the same energy. For finite leads, "same energy"
//! must be relaxed to agreement within a small window; with identical left and
//! right leads, the two spectra coincide and the window only needs to absorb
//! numerical noise. Degenerate final states within a single channel are
//! averaged, and the per-channel averages are summed over final channels.
//!
//! When the leads are diagonal and identical across channels, the reference
//! Hamiltonians can instead be diagonalized over the full site⊗channel space
//! at once. This allows the reference central block to mix channels, at the
//! cost of losing the channel label on each state; each energy-matched final
//! state then contributes once to the sum.
//!
//! The approximation is good when the barrier is weakly transmitting and the
//! leads are long enough that bound states sample the continuum finely. It
//! improves with *N*<sub>*L*</sub> = *N*<sub>*R*</sub> and systematically
//! underestimates the exact result for short leads.
//!
//! # Wave-function matching
//! The exact result is found by attaching semi-infinite leads to a finite
//! region of *N* sites whose first and last sites belong to the leads. Each
//! lead enters only through a self-energy on its boundary site[^2]; for channel
//! *α* with on-site energy *V* and hopping *h*,
//! ```text
//!      (E - V) - i √(4|h|² - (E - V)²)
//! Σ = --------------------------------    for |E - V| < 2|h|
//!                    2
//! ```
//! and the real, decaying root of *Σ*² - (*E* - *V*) *Σ* + |*h*|² = 0
//! otherwise. With the retarded Green's function
//! ```text
//! G = (E - H - Σ_L - Σ_R)⁻¹
//! ```
//! and lead velocities *v* = -2 Im *Σ*, the Fisher-Lee relations[^3] give the
//! transmission and reflection amplitudes for incidence in channel *α*,
//! ```text
//! t_{βα} = i √(v_{R, β} v_{L, α}) G[N - 1, β; 0, α]
//! r_{βα} = -δ_{βα} + i √(v_{L, β} v_{L, α}) G[0, β; 0, α]
//! ```
//! Channels that are closed in a lead (*v* = 0) carry no flux and contribute
//! nothing to either probability, and unitarity guarantees
//! Σ<sub>*β*</sub> (|*r*<sub>*βα*</sub>|² + |*t*<sub>*βα*</sub>|²) = 1.
//!
//! [^1]: J. Bardeen, "Tunnelling from a many-particle point of view." Physical
//! Review Letters **6** 2 57-59 (1961).
//!
//! [^2]: S. Datta, *Electronic Transport in Mesoscopic Systems*. Cambridge
//! University Press (1995).
//!
//! [^3]: D. S. Fisher and P. A. Lee, "Relation between conductivity and
//! transmission matrix." Physical Review B **23** 12 6851-6854 (1981).
