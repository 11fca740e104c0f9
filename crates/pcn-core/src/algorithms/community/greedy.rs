use crate::algorithms::labels;
use crate::core::models::network::ContactNetwork;
use std::collections::BTreeMap;

/// Clauset–Newman–Moore greedy modularity agglomeration.
///
/// Starting from singletons, the adjacent pair with the largest modularity gain is merged
/// until no merge increases modularity. Ties go to the lexicographically smallest pair.
pub fn greedy_modularity(network: &ContactNetwork) -> Vec<usize> {
    let n = network.len();
    let m = network.total_weight();
    if m == 0.0 {
        return (0..n).collect();
    }

    let mut a: Vec<f64> = (0..n).map(|i| network.strength(i) / (2.0 * m)).collect();
    let mut dq: Vec<BTreeMap<usize, f64>> = (0..n)
        .map(|i| {
            network
                .neighbors(i)
                .iter()
                .map(|&(j, w)| (j, 2.0 * (w / (2.0 * m) - a[i] * a[j])))
                .collect()
        })
        .collect();
    let mut members: Vec<Vec<usize>> = (0..n).map(|i| vec![i]).collect();

    loop {
        let mut best: Option<(usize, usize, f64)> = None;
        for (i, row) in dq.iter().enumerate() {
            for (&j, &gain) in row.range(i + 1..) {
                if best.is_none_or(|(_, _, g)| gain > g) {
                    best = Some((i, j, gain));
                }
            }
        }
        let Some((keep, drop, gain)) = best else {
            break;
        };
        if gain <= 0.0 {
            break;
        }

        let row_keep = std::mem::take(&mut dq[keep]);
        let row_drop = std::mem::take(&mut dq[drop]);
        let mut merged = BTreeMap::new();
        for (&k, &value) in row_keep.iter() {
            if k == drop {
                continue;
            }
            let updated = match row_drop.get(&k) {
                Some(&other) => value + other,
                None => value - 2.0 * a[drop] * a[k],
            };
            merged.insert(k, updated);
        }
        for (&k, &value) in row_drop.iter() {
            if k == keep || row_keep.contains_key(&k) {
                continue;
            }
            merged.insert(k, value - 2.0 * a[keep] * a[k]);
        }
        for (&k, &value) in &merged {
            dq[k].remove(&drop);
            dq[k].insert(keep, value);
        }
        dq[keep] = merged;

        a[keep] += a[drop];
        a[drop] = 0.0;
        let moved = std::mem::take(&mut members[drop]);
        members[keep].extend(moved);
    }

    let mut assignment = vec![0; n];
    for (id, group) in members.iter().enumerate() {
        for &v in group {
            assignment[v] = id;
        }
    }
    labels::compact(&assignment)
}

#[cfg(test)]
mod tests {
    use super::super::fixtures::*;
    use super::super::modularity;
    use super::*;

    #[test]
    fn finds_disconnected_components() {
        assert_eq!(greedy_modularity(&two_cliques(4)), halves(4));
    }

    #[test]
    fn splits_a_barbell_at_the_bridge() {
        assert_eq!(greedy_modularity(&barbell(5)), halves(5));
    }

    #[test]
    fn result_improves_on_singletons() {
        let net = barbell(4);
        let labels = greedy_modularity(&net);
        let singletons: Vec<usize> = (0..8).collect();
        assert!(modularity(&net, &labels) > modularity(&net, &singletons));
    }
}
