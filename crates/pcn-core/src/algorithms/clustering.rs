//! Partitional clustering of row vectors: k-means and fuzzy c-means.

use super::error::AlgorithmError;
use super::labels;
use nalgebra::{DMatrix, RowDVector};
use rand::distributions::{Distribution, WeightedIndex};
use rand::rngs::StdRng;
use rand::Rng;

const KMEANS_RESTARTS: usize = 10;
const KMEANS_MAX_ITER: usize = 300;
const KMEANS_TOLERANCE: f64 = 1e-4;

const FCM_FUZZIFIER: f64 = 2.0;
const FCM_ERROR: f64 = 0.005;
const FCM_MAX_ITER: usize = 1000;

fn check_cluster_count(points: usize, k: usize) -> Result<(), AlgorithmError> {
    if k == 0 || k > points {
        return Err(AlgorithmError::InvalidParameter(format!(
            "cluster count {} must be between 1 and the number of points ({})",
            k, points
        )));
    }
    Ok(())
}

fn squared_distance(data: &DMatrix<f64>, row: usize, center: &RowDVector<f64>) -> f64 {
    data.row(row)
        .iter()
        .zip(center.iter())
        .map(|(a, b)| (a - b) * (a - b))
        .sum()
}

/// k-means++ seeding.
fn initial_centers(data: &DMatrix<f64>, k: usize, rng: &mut StdRng) -> Vec<RowDVector<f64>> {
    let n = data.nrows();
    let mut centers = vec![data.row(rng.gen_range(0..n)).into_owned()];
    let mut closest: Vec<f64> = (0..n)
        .map(|i| squared_distance(data, i, &centers[0]))
        .collect();

    while centers.len() < k {
        let next = match WeightedIndex::new(&closest) {
            Ok(dist) => dist.sample(rng),
            // Every point coincides with a center already.
            Err(_) => rng.gen_range(0..n),
        };
        let center = data.row(next).into_owned();
        for (i, d) in closest.iter_mut().enumerate() {
            *d = d.min(squared_distance(data, i, &center));
        }
        centers.push(center);
    }
    centers
}

struct KMeansRun {
    labels: Vec<usize>,
    inertia: f64,
}

fn lloyd(data: &DMatrix<f64>, k: usize, tolerance: f64, rng: &mut StdRng) -> KMeansRun {
    let n = data.nrows();
    let mut centers = initial_centers(data, k, rng);
    let mut labels = vec![0usize; n];
    let mut inertia = f64::INFINITY;

    for _ in 0..KMEANS_MAX_ITER {
        inertia = 0.0;
        let mut distances = vec![0.0; n];
        for i in 0..n {
            let (best, best_d) = centers
                .iter()
                .enumerate()
                .map(|(c, center)| (c, squared_distance(data, i, center)))
                .fold((0, f64::INFINITY), |acc, x| if x.1 < acc.1 { x } else { acc });
            labels[i] = best;
            distances[i] = best_d;
            inertia += best_d;
        }

        let mut sums = vec![RowDVector::zeros(data.ncols()); k];
        let mut counts = vec![0usize; k];
        for (i, &label) in labels.iter().enumerate() {
            sums[label] += data.row(i);
            counts[label] += 1;
        }

        let mut shift = 0.0;
        for c in 0..k {
            let updated = if counts[c] > 0 {
                &sums[c] / counts[c] as f64
            } else {
                // Empty cluster: reseed at the point farthest from its center.
                let far = (0..n)
                    .max_by(|&a, &b| distances[a].total_cmp(&distances[b]))
                    .unwrap_or(0);
                distances[far] = 0.0;
                data.row(far).into_owned()
            };
            shift += (&updated - &centers[c]).norm_squared();
            centers[c] = updated;
        }

        if shift <= tolerance {
            break;
        }
    }

    KMeansRun { labels, inertia }
}

/// k-means with k-means++ seeding; the best of several restarts by inertia wins.
///
/// `data` holds one point per row. Labels are compacted.
pub fn kmeans(data: &DMatrix<f64>, k: usize, rng: &mut StdRng) -> Result<Vec<usize>, AlgorithmError> {
    check_cluster_count(data.nrows(), k)?;

    let n = data.nrows() as f64;
    let mean_variance = data
        .column_iter()
        .map(|col| {
            let mean = col.sum() / n;
            col.iter().map(|v| (v - mean) * (v - mean)).sum::<f64>() / n
        })
        .sum::<f64>()
        / data.ncols().max(1) as f64;
    let tolerance = KMEANS_TOLERANCE * mean_variance;

    let mut best: Option<KMeansRun> = None;
    for _ in 0..KMEANS_RESTARTS {
        let run = lloyd(data, k, tolerance, rng);
        if best.as_ref().is_none_or(|b| run.inertia < b.inertia) {
            best = Some(run);
        }
    }
    Ok(best.map(|run| labels::compact(&run.labels)).unwrap_or_default())
}

/// Fuzzy c-means; each point's hard label is its highest-membership cluster.
///
/// Soft assignments can leave clusters without any point, so the number of distinct
/// labels may be smaller than `c`.
pub fn fuzzy_cmeans(
    data: &DMatrix<f64>,
    c: usize,
    rng: &mut StdRng,
) -> Result<Vec<usize>, AlgorithmError> {
    check_cluster_count(data.nrows(), c)?;
    let n = data.nrows();
    let exponent = 2.0 / (FCM_FUZZIFIER - 1.0);

    let mut membership = DMatrix::from_fn(c, n, |_, _| rng.gen_range(0.0..1.0));
    normalize_columns(&mut membership);

    for _ in 0..FCM_MAX_ITER {
        let weights = membership.map(|u| u.powf(FCM_FUZZIFIER));
        let mut centers = &weights * data;
        for (row, total) in weights.row_iter().map(|r| r.sum()).enumerate() {
            if total > 0.0 {
                centers.row_mut(row).unscale_mut(total);
            }
        }

        let mut updated = DMatrix::zeros(c, n);
        for j in 0..n {
            for i in 0..c {
                let d = squared_distance(data, j, &centers.row(i).into_owned())
                    .sqrt()
                    .max(f64::EPSILON);
                updated[(i, j)] = d.powf(-exponent);
            }
        }
        normalize_columns(&mut updated);

        let change = (&updated - &membership).norm();
        membership = updated;
        if change < FCM_ERROR {
            break;
        }
    }

    let hard: Vec<usize> = membership
        .column_iter()
        .map(|col| col.argmax().0)
        .collect();
    Ok(labels::compact(&hard))
}

fn normalize_columns(matrix: &mut DMatrix<f64>) {
    for mut col in matrix.column_iter_mut() {
        let total = col.sum();
        if total > 0.0 {
            col.unscale_mut(total);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::SeedableRng;

    fn blobs() -> DMatrix<f64> {
        DMatrix::from_row_slice(
            6,
            2,
            &[
                0.0, 0.0, 0.1, 0.0, 0.0, 0.1, //
                10.0, 10.0, 10.1, 10.0, 10.0, 10.1,
            ],
        )
    }

    #[test]
    fn kmeans_separates_two_blobs() {
        let mut rng = StdRng::seed_from_u64(42);
        let labels = kmeans(&blobs(), 2, &mut rng).unwrap();
        assert_eq!(labels, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn kmeans_rejects_invalid_cluster_counts() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(kmeans(&blobs(), 0, &mut rng).is_err());
        assert!(kmeans(&blobs(), 7, &mut rng).is_err());
    }

    #[test]
    fn kmeans_is_deterministic_for_a_seed() {
        let data = DMatrix::from_fn(20, 3, |i, j| ((i * 7 + j * 3) % 11) as f64);
        let a = kmeans(&data, 4, &mut StdRng::seed_from_u64(9)).unwrap();
        let b = kmeans(&data, 4, &mut StdRng::seed_from_u64(9)).unwrap();
        assert_eq!(a, b);
    }

    #[test]
    fn fuzzy_cmeans_separates_two_blobs() {
        let mut rng = StdRng::seed_from_u64(42);
        let labels = fuzzy_cmeans(&blobs(), 2, &mut rng).unwrap();
        assert_eq!(labels, vec![0, 0, 0, 1, 1, 1]);
    }

    #[test]
    fn fuzzy_cmeans_may_return_fewer_clusters_than_requested() {
        let data = DMatrix::from_row_slice(4, 1, &[1.0, 1.0, 1.0, 1.0]);
        let labels = fuzzy_cmeans(&data, 3, &mut StdRng::seed_from_u64(3)).unwrap();
        assert!(labels::cluster_count(&labels) <= 3);
        assert!(labels.iter().all(|&l| l == labels[0]));
    }
}
