// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Screen <-> world conversions and ray/plane intersection.

use glam::{DVec2, DVec3, DVec4};

use super::{Camera, Viewport};

const PARALLEL_EPSILON: f64 = 1e-10;

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Ray {
    pub origin: DVec3,
    /// Unit length.
    pub direction: DVec3,
}

/// Screen position (pixels, origin top-left) to normalized device coordinates.
pub fn screen_to_ndc(viewport: Viewport, screen: DVec2) -> DVec2 {
    DVec2::new(
        screen.x / viewport.width * 2.0 - 1.0,
        1.0 - screen.y / viewport.height * 2.0,
    )
}

/// Casts a ray from the camera through `screen`.
///
/// Perspective cameras shoot from the eye; orthographic cameras shoot along `forward` from the
/// unprojected near point. Returns `None` for an empty viewport or a singular projection.
pub fn screen_ray(camera: &Camera, viewport: Viewport, screen: DVec2) -> Option<Ray> {
    if viewport.is_empty() {
        return None;
    }
    if camera.view_projection.determinant().abs() < f64::EPSILON {
        return None;
    }

    let ndc = screen_to_ndc(viewport, screen);
    let inverse = camera.view_projection.inverse();
    let unproject = |z: f64| {
        let p = inverse * DVec4::new(ndc.x, ndc.y, z, 1.0);
        (p.w.abs() > f64::EPSILON).then(|| p.truncate() / p.w)
    };

    let (origin, direction) = if camera.orthographic {
        (unproject(-1.0)?, camera.forward.normalize_or_zero())
    } else {
        let far = unproject(1.0)?;
        (camera.eye, (far - camera.eye).normalize_or_zero())
    };

    if direction == DVec3::ZERO || !origin.is_finite() || !direction.is_finite() {
        return None;
    }
    Some(Ray { origin, direction })
}

/// Intersects `ray` with the plane through `plane_point` with normal `plane_normal`.
///
/// Returns `None` when the ray is parallel to the plane or the plane lies behind the origin.
pub fn ray_plane_intersect(ray: &Ray, plane_normal: DVec3, plane_point: DVec3) -> Option<DVec3> {
    let denom = ray.direction.dot(plane_normal);
    if denom.abs() < PARALLEL_EPSILON {
        return None;
    }
    let t = (plane_point - ray.origin).dot(plane_normal) / denom;
    if t < 0.0 || !t.is_finite() {
        return None;
    }
    Some(ray.origin + ray.direction * t)
}

/// World position to screen pixels. `None` when the point is behind the camera.
pub fn world_to_screen(camera: &Camera, viewport: Viewport, point: DVec3) -> Option<DVec2> {
    let clip = camera.view_projection * point.extend(1.0);
    if clip.w <= f64::EPSILON {
        return None;
    }
    let ndc = clip.truncate() / clip.w;
    let screen = DVec2::new(
        (ndc.x + 1.0) * 0.5 * viewport.width,
        (1.0 - ndc.y) * 0.5 * viewport.height,
    );
    screen.is_finite().then_some(screen)
}
