// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Screen to world resolution.

use glam::{DVec2, DVec3};

use super::geometry::{ray_plane_intersect, screen_ray, world_to_screen};
use super::{ElementFilter, ElementId, SceneHit, SceneQuery};
use crate::model::{Location, ModelError};

/// Where a pointer landed in the model.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ViewerHit {
    /// An element, at the exact hit point or the element's center.
    Element { id: ElementId, point: DVec3 },
    /// Empty space projected onto the model's ground plane.
    Spatial { point: DVec3 },
}

impl ViewerHit {
    pub fn element(&self) -> Option<ElementId> {
        match self {
            Self::Element { id, .. } => Some(*id),
            Self::Spatial { .. } => None,
        }
    }

    pub fn point(&self) -> DVec3 {
        match self {
            Self::Element { point, .. } | Self::Spatial { point } => *point,
        }
    }

    pub fn is_spatial(&self) -> bool {
        matches!(self, Self::Spatial { .. })
    }

    /// The issue location this hit would register.
    pub fn to_location(&self) -> Result<Location, ModelError> {
        match self {
            Self::Element { id, .. } => Location::element(id.to_string()),
            Self::Spatial { point } => Location::world_position(point.x, point.y, point.z),
        }
    }
}

/// Resolves screen positions against a scene, honoring an optional element filter.
#[derive(Clone, Copy)]
pub struct SpatialResolver<'a> {
    scene: &'a dyn SceneQuery,
    filter: Option<&'a dyn ElementFilter>,
}

impl<'a> SpatialResolver<'a> {
    pub fn new(scene: &'a dyn SceneQuery) -> Self {
        Self {
            scene,
            filter: None,
        }
    }

    pub fn with_filter(mut self, filter: &'a dyn ElementFilter) -> Self {
        self.filter = Some(filter);
        self
    }

    pub fn accepts(&self, element: ElementId) -> bool {
        self.filter.map_or(true, |filter| filter.accepts(element))
    }

    /// Resolves `screen` to an accepted element or, failing that, a spatial point.
    ///
    /// Positions outside the viewport resolve to nothing. An element hit without an exact point
    /// uses the element's center.
    pub fn resolve_hit(&self, screen: DVec2) -> Option<ViewerHit> {
        if !self.scene.viewport().contains(screen) {
            return None;
        }
        if let Some(hit) = self.hit_element(screen) {
            if self.accepts(hit.element) {
                let point = hit
                    .point
                    .or_else(|| self.resolve_element_center(hit.element));
                if let Some(point) = point {
                    return Some(ViewerHit::Element {
                        id: hit.element,
                        point,
                    });
                }
            }
        }
        self.resolve_spatial(screen)
            .map(|point| ViewerHit::Spatial { point })
    }

    /// Projects `screen` onto the plane through the model's center, perpendicular to world up.
    ///
    /// Falls back to the camera pivot, then to the model's center. `None` only without a model.
    pub fn resolve_spatial(&self, screen: DVec2) -> Option<DVec3> {
        let bounds = self.scene.model_bounds()?;
        let center = bounds.center();
        let fallback = self.scene.pivot().unwrap_or(center);

        let up = self.scene.world_up();
        if !up.is_finite() || up.length_squared() == 0.0 {
            return Some(fallback);
        }
        let normal = up.normalize();

        let intersection = self
            .scene
            .camera()
            .and_then(|camera| screen_ray(&camera, self.scene.viewport(), screen))
            .and_then(|ray| ray_plane_intersect(&ray, normal, center));
        Some(intersection.unwrap_or(fallback))
    }

    /// Center of the union of the element's fragment bounds.
    pub fn resolve_element_center(&self, element: ElementId) -> Option<DVec3> {
        self.scene
            .element_fragments(element)
            .iter()
            .filter_map(|fragment| self.scene.fragment_bounds(*fragment))
            .filter(|bounds| bounds.is_valid())
            .reduce(|acc, bounds| acc.union(&bounds))
            .map(|bounds| bounds.center())
    }

    pub fn project_to_screen(&self, point: DVec3) -> Option<DVec2> {
        let camera = self.scene.camera()?;
        world_to_screen(&camera, self.scene.viewport(), point)
    }

    fn hit_element(&self, screen: DVec2) -> Option<SceneHit> {
        match self.scene.hit_test(screen) {
            Ok(hit) => hit,
            Err(err) => {
                tracing::warn!(x = screen.x, y = screen.y, error = %err, "hit test failed");
                None
            }
        }
    }
}
