use super::{GAIN_EPSILON, require_connected};
use crate::algorithms::error::AlgorithmError;
use crate::algorithms::labels;
use crate::core::models::network::ContactNetwork;
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};
use tracing::debug;

pub const SPINS: usize = 25;
pub const GAMMA: f64 = 1.0;
pub const START_TEMPERATURE: f64 = 1.0;
pub const STOP_TEMPERATURE: f64 = 0.01;
pub const COOLING_FACTOR: f64 = 0.99;

const MAX_QUENCH_SWEEPS: usize = 1000;

struct SpinState<'a> {
    network: &'a ContactNetwork,
    spins: Vec<usize>,
    totals: Vec<f64>,
    two_m: f64,
}

impl<'a> SpinState<'a> {
    fn new(network: &'a ContactNetwork, spins: Vec<usize>) -> Self {
        let mut totals = vec![0.0; SPINS];
        for (v, &s) in spins.iter().enumerate() {
            totals[s] += network.strength(v);
        }
        Self {
            network,
            spins,
            totals,
            two_m: 2.0 * network.total_weight(),
        }
    }

    /// Energy of `v` in each spin state with `v` itself removed from the totals.
    fn local_energies(&self, v: usize) -> Vec<f64> {
        let k = self.network.strength(v);
        let own = self.spins[v];
        let mut links = vec![0.0; SPINS];
        for &(u, w) in self.network.neighbors(v) {
            links[self.spins[u]] += w;
        }
        (0..SPINS)
            .map(|s| {
                let total = if s == own { self.totals[s] - k } else { self.totals[s] };
                -(links[s] - GAMMA * k * total / self.two_m)
            })
            .collect()
    }

    fn flip(&mut self, v: usize, to: usize) {
        let k = self.network.strength(v);
        self.totals[self.spins[v]] -= k;
        self.totals[to] += k;
        self.spins[v] = to;
    }

    /// One heat-bath sweep at `temperature`.
    fn heat_bath(&mut self, temperature: f64, rng: &mut StdRng) {
        for v in 0..self.spins.len() {
            let energies = self.local_energies(v);
            let lowest = energies.iter().copied().fold(f64::INFINITY, f64::min);
            let weights: Vec<f64> = energies
                .iter()
                .map(|e| (-(e - lowest) / temperature).exp())
                .collect();
            let total: f64 = weights.iter().sum();
            let mut draw = rng.gen_range(0.0..total);
            let mut chosen = SPINS - 1;
            for (s, w) in weights.iter().enumerate() {
                if draw < *w {
                    chosen = s;
                    break;
                }
                draw -= w;
            }
            self.flip(v, chosen);
        }
    }

    /// Zero-temperature sweep; returns whether any spin changed.
    fn quench(&mut self) -> bool {
        let mut changed = false;
        for v in 0..self.spins.len() {
            let energies = self.local_energies(v);
            let own = self.spins[v];
            let mut best = own;
            for (s, &e) in energies.iter().enumerate() {
                if e < energies[best] - GAIN_EPSILON {
                    best = s;
                }
            }
            if best != own {
                self.flip(v, best);
                changed = true;
            }
        }
        changed
    }
}

/// Spin-glass community detection (Reichardt & Bornholdt).
///
/// A `q`-state Potts model with the modularity Hamiltonian is annealed by heat-bath
/// sweeps from [`START_TEMPERATURE`] down to [`STOP_TEMPERATURE`], then quenched until
/// no single spin flip lowers the energy. Occupied spin states become communities.
pub fn spinglass(network: &ContactNetwork, seed: u64) -> Result<Vec<usize>, AlgorithmError> {
    require_connected(network, "spinglass")?;
    if network.total_weight() == 0.0 {
        return Ok(vec![0; network.len()]);
    }

    let mut rng = StdRng::seed_from_u64(seed);
    let initial: Vec<usize> = (0..network.len()).map(|_| rng.gen_range(0..SPINS)).collect();
    let mut state = SpinState::new(network, initial);

    let mut temperature = START_TEMPERATURE;
    let mut sweeps = 0;
    while temperature > STOP_TEMPERATURE {
        state.heat_bath(temperature, &mut rng);
        temperature *= COOLING_FACTOR;
        sweeps += 1;
    }
    for _ in 0..MAX_QUENCH_SWEEPS {
        if !state.quench() {
            break;
        }
    }
    debug!(sweeps, "Spin glass annealing finished.");
    Ok(labels::compact(&state.spins))
}
