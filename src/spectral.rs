//! Spectral invariants of a fragment graph.
//!
//! The spectrum of the normalized Laplacian depends only on graph structure
//! and edge weights, not on node numbering, which makes it a cheap
//! (though not collision-free) fingerprint for isomorphism classes.

use ndarray::Array2;

use crate::fragment::FragmentGraph;

const MAX_SWEEPS: usize = 64;
const OFF_DIAGONAL_TOLERANCE: f64 = 1e-22;

/// Eigenvalues are rounded to this many units per 1.0 before serialization.
pub const QUANTIZATION: f64 = 1e8;

/// Dense normalized Laplacian `I - D^-1/2 W D^-1/2`, rows in node insertion
/// order. Isolated nodes get a zero row.
pub fn normalized_laplacian(graph: &FragmentGraph) -> Array2<f64> {
    let g = graph.graph();
    let n = g.node_count();
    let mut weights = Array2::<f64>::zeros((n, n));
    for edge in g.edge_indices() {
        if let Some((a, b)) = g.edge_endpoints(edge) {
            let w = g[edge].valency;
            weights[[a.index(), b.index()]] += w;
            if a != b {
                weights[[b.index(), a.index()]] += w;
            }
        }
    }

    let inv_sqrt_degree: Vec<f64> = weights
        .rows()
        .into_iter()
        .map(|row| {
            let d = row.sum();
            if d > 0.0 {
                1.0 / d.sqrt()
            } else {
                0.0
            }
        })
        .collect();

    Array2::from_shape_fn((n, n), |(i, j)| {
        let scaled = inv_sqrt_degree[i] * weights[[i, j]] * inv_sqrt_degree[j];
        if i != j {
            -scaled
        } else if inv_sqrt_degree[i] > 0.0 {
            1.0 - scaled
        } else {
            0.0
        }
    })
}

fn off_diagonal_norm(a: &Array2<f64>) -> f64 {
    let n = a.nrows();
    (0..n)
        .flat_map(|p| ((p + 1)..n).map(move |q| (p, q)))
        .map(|(p, q)| a[[p, q]] * a[[p, q]])
        .sum()
}

/// Eigenvalues of a real symmetric matrix by cyclic Jacobi rotations, in
/// ascending order.
pub fn symmetric_eigenvalues(mut a: Array2<f64>) -> Vec<f64> {
    let n = a.nrows();
    for _ in 0..MAX_SWEEPS {
        if off_diagonal_norm(&a) < OFF_DIAGONAL_TOLERANCE {
            break;
        }
        for p in 0..n {
            for q in (p + 1)..n {
                let apq = a[[p, q]];
                if apq.abs() < f64::MIN_POSITIVE {
                    continue;
                }
                let theta = (a[[q, q]] - a[[p, p]]) / (2.0 * apq);
                let sign = if theta >= 0.0 { 1.0 } else { -1.0 };
                let t = sign / (theta.abs() + (theta * theta + 1.0).sqrt());
                let c = 1.0 / (t * t + 1.0).sqrt();
                let s = t * c;
                for k in 0..n {
                    let (akp, akq) = (a[[k, p]], a[[k, q]]);
                    a[[k, p]] = c * akp - s * akq;
                    a[[k, q]] = s * akp + c * akq;
                }
                for k in 0..n {
                    let (apk, aqk) = (a[[p, k]], a[[q, k]]);
                    a[[p, k]] = c * apk - s * aqk;
                    a[[q, k]] = s * apk + c * aqk;
                }
            }
        }
    }
    let mut eigenvalues = a.diag().to_vec();
    eigenvalues.sort_by(f64::total_cmp);
    eigenvalues
}

/// Sorted spectrum of the fragment's normalized Laplacian.
pub fn laplacian_spectrum(graph: &FragmentGraph) -> Vec<f64> {
    symmetric_eigenvalues(normalized_laplacian(graph))
}

/// Spectrum rounded to fixed precision so that values equal up to
/// floating-point noise compare equal. Sorted after rounding.
pub fn quantized_spectrum(graph: &FragmentGraph) -> Vec<i64> {
    let mut q: Vec<i64> = laplacian_spectrum(graph)
        .into_iter()
        .map(|x| (x * QUANTIZATION).round() as i64)
        .collect();
    q.sort_unstable();
    q
}
