//! Rankine part of the Green function, G = -1/(4π r)
//!
//! For a receiver close to a source panel (distance below
//! `near_field_ratio` panel radii) the integrals over the planar polygon are
//! evaluated exactly:
//!
//! ```text
//! ∫ 1/r dS   = Σ_k d_k Q_k − Z Ω
//! ∇ ∫ 1/r dS = −Σ_k m_k Q_k − Ω n
//!
//! Q_k = ln((r_a + r_b + s_k) / (r_a + r_b − s_k))
//! ```
//!
//! with `m_k` the outward in-plane normal of edge k, `d_k` the signed
//! distance from the projected receiver to that edge, `Z` the height of the
//! receiver above the panel plane and `Ω` the signed solid angle of the
//! panel. Far panels use the one-point rule.

use crate::geometry::{Collocation, Panels, Vec3, cross, dot, norm, scale, sub};
use crate::parallel::assemble_rows;
use ndarray::Array2;
use std::f64::consts::PI;

/// Receivers farther than this many panel radii use the one-point rule
pub const DEFAULT_NEAR_FIELD_RATIO: f64 = 7.0;

/// Below this height (relative to the panel radius) the receiver is taken
/// to lie in the panel plane and the principal value Ω = 0 is used.
const IN_PLANE_TOLERANCE: f64 = 1e-10;

/// Signed solid angle of triangle (a, b, c) seen from `point`
/// (Van Oosterom–Strackee), positive when the point lies on the side the
/// triangle's right-handed normal points to.
fn triangle_solid_angle(point: Vec3, a: Vec3, b: Vec3, c: Vec3) -> f64 {
    let ra = sub(a, point);
    let rb = sub(b, point);
    let rc = sub(c, point);
    let (la, lb, lc) = (norm(ra), norm(rb), norm(rc));
    let numerator = dot(ra, cross(rb, rc));
    let denominator = la * lb * lc + dot(ra, rb) * lc + dot(ra, rc) * lb + dot(rb, rc) * la;
    -2.0 * numerator.atan2(denominator)
}

/// Exact integral of 1/r over a planar polygon and its gradient with
/// respect to the receiver position.
pub fn polygon_integrals(
    point: Vec3,
    polygon: &[Vec3],
    center: Vec3,
    normal: Vec3,
    radius: f64,
) -> (f64, Vec3) {
    let height = dot(sub(point, center), normal);
    let mut projected = [[0.0; 3]; 4];
    for (p, v) in projected.iter_mut().zip(polygon) {
        *p = sub(*v, scale(normal, dot(sub(*v, center), normal)));
    }
    let corners = &projected[..polygon.len()];

    let mut integral = 0.0;
    let mut gradient = [0.0; 3];
    for k in 0..corners.len() {
        let a = corners[k];
        let b = corners[(k + 1) % corners.len()];
        let edge = sub(b, a);
        let length = norm(edge);
        if length <= 1e-14 * radius {
            continue;
        }
        let outward = scale(cross(edge, normal), 1.0 / length);
        let distance = dot(sub(a, point), outward);
        let ra = norm(sub(point, a));
        let rb = norm(sub(point, b));
        let denominator = ra + rb - length;
        let q = if denominator > 1e-14 * (ra + rb) {
            ((ra + rb + length) / denominator).ln()
        } else {
            0.0
        };
        integral += distance * q;
        for c in 0..3 {
            gradient[c] -= outward[c] * q;
        }
    }

    let omega = if height.abs() < IN_PLANE_TOLERANCE * radius {
        0.0
    } else {
        (1..corners.len() - 1)
            .map(|k| triangle_solid_angle(point, corners[0], corners[k], corners[k + 1]))
            .sum()
    };
    integral -= height * omega;
    for c in 0..3 {
        gradient[c] -= omega * normal[c];
    }

    (integral, gradient)
}

/// Influence of the source panels on the receivers:
/// `S_ij = −1/(4π) ∫_j 1/r`, `V_ij = −1/(4π) n_i·∇∫_j 1/r`.
pub fn rankine_matrices(
    receivers: &Collocation<'_>,
    sources: &Panels<'_>,
    near_field_ratio: f64,
) -> (Array2<f64>, Array2<f64>) {
    assemble_rows(receivers.len(), sources.nb_faces(), |i, s_row, v_row| {
        let point = receivers.point(i);
        let receiver_normal = receivers.normal(i);
        for j in 0..sources.nb_faces() {
            let center = sources.center(j);
            let radius = sources.radiuses[j];
            let offset = sub(point, center);
            let distance = norm(offset);

            if distance > near_field_ratio * radius {
                let area = sources.areas[j];
                s_row[j] = -area / (4.0 * PI * distance);
                v_row[j] = area * dot(receiver_normal, offset) / (4.0 * PI * distance.powi(3));
            } else {
                let (polygon, count) = sources.polygon(j);
                let (integral, gradient) = polygon_integrals(
                    point,
                    &polygon[..count],
                    center,
                    sources.normal(j),
                    radius,
                );
                s_row[j] = -integral / (4.0 * PI);
                v_row[j] = -dot(receiver_normal, gradient) / (4.0 * PI);
            }
        }
    })
}
