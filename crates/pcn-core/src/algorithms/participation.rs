use crate::core::models::network::ContactNetwork;
use std::collections::HashMap;

/// Per-node participation coefficients and within-community z-scores.
#[derive(Debug, Clone, PartialEq)]
pub struct ParticipationProfile {
    /// `1 − Σ_c (k_ic / k_i)²`, in `[0, 1]`.
    pub participation: Vec<f64>,
    /// Standardized count of contacts inside the node's own community.
    pub z_intraconnectivity: Vec<f64>,
}

/// Scores how a node's contacts are spread across the communities of `labels`.
///
/// Contacts are counted, not weighted. A node without contacts has participation 0; a
/// community of one node, or one whose members all have the same internal degree, yields
/// z-scores of 0.
pub fn score(network: &ContactNetwork, labels: &[usize]) -> ParticipationProfile {
    let n = network.len();
    let mut participation = vec![0.0; n];
    let mut own = vec![0.0; n];

    for i in 0..n {
        let degree = network.degree(i);
        let mut per_community: HashMap<usize, usize> = HashMap::new();
        for &(j, _) in network.neighbors(i) {
            *per_community.entry(labels[j]).or_default() += 1;
        }
        own[i] = per_community.get(&labels[i]).copied().unwrap_or(0) as f64;
        if degree > 0 {
            let k = degree as f64;
            let concentration: f64 = per_community
                .values()
                .map(|&c| (c as f64 / k).powi(2))
                .sum();
            participation[i] = (1.0 - concentration).clamp(0.0, 1.0);
        }
    }

    let mut members: HashMap<usize, Vec<usize>> = HashMap::new();
    for (i, &label) in labels.iter().enumerate() {
        members.entry(label).or_default().push(i);
    }

    let mut z_intraconnectivity = vec![0.0; n];
    for nodes in members.values() {
        if nodes.len() < 2 {
            continue;
        }
        let count = nodes.len() as f64;
        let mean = nodes.iter().map(|&i| own[i]).sum::<f64>() / count;
        let variance = nodes.iter().map(|&i| (own[i] - mean).powi(2)).sum::<f64>() / count;
        let std = variance.sqrt();
        if std > 0.0 {
            for &i in nodes {
                z_intraconnectivity[i] = (own[i] - mean) / std;
            }
        }
    }

    ParticipationProfile {
        participation,
        z_intraconnectivity,
    }
}
