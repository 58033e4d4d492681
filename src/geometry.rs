//! Planar geometry helpers for contour work

/// Squared distance from point `p` to segment `a`-`b` on the xz-plane
///
/// Degenerate segments (`a == b`) measure the distance to `a`.
pub fn point_segment_distance_sq(px: i32, pz: i32, ax: i32, az: i32, bx: i32, bz: i32) -> f32 {
    let ab_x = (bx - ax) as f32;
    let ab_z = (bz - az) as f32;
    let ap_x = (px - ax) as f32;
    let ap_z = (pz - az) as f32;

    let length_sq = ab_x * ab_x + ab_z * ab_z;
    if length_sq == 0.0 {
        return ap_x * ap_x + ap_z * ap_z;
    }

    // Parametric position of the projection, clamped onto the segment.
    let u = ((ap_x * ab_x + ap_z * ab_z) / length_sq).clamp(0.0, 1.0);
    let dx = ap_x - u * ab_x;
    let dz = ap_z - u * ab_z;
    dx * dx + dz * dz
}
