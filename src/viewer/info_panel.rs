// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

use glam::{DVec2, DVec3};

use super::SpatialResolver;

/// Desktop info panel geometry in CSS pixels.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PanelLayout {
    pub width: f64,
    pub margin: f64,
}

impl Default for PanelLayout {
    fn default() -> Self {
        Self {
            width: 320.0,
            margin: 16.0,
        }
    }
}

impl PanelLayout {
    /// Keeps a panel centered on `screen` inside a container `container_width` wide.
    pub fn clamp(&self, screen: DVec2, container_width: f64) -> DVec2 {
        let min_x = self.margin + self.width / 2.0;
        let max_x = min_x.max(container_width - self.margin - self.width / 2.0);
        DVec2::new(screen.x.clamp(min_x, max_x), screen.y.max(self.margin))
    }
}

/// Screen anchor of the info panel for a selected world `point`, or `None` when the point does
/// not project (behind the camera, no camera).
pub fn panel_anchor(
    resolver: &SpatialResolver<'_>,
    layout: &PanelLayout,
    point: DVec3,
    container_width: f64,
) -> Option<DVec2> {
    resolver
        .project_to_screen(point)
        .map(|screen| layout.clamp(screen, container_width))
}
