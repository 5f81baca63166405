// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! 3D viewer interaction core.
//!
//! The rendering engine itself is external. This module describes the narrow slice of it the
//! tracker needs ([`SceneQuery`], [`ModelMetadata`], [`FloorIsolation`]) and builds the
//! interaction logic on top: screen/world resolution, the per-floor element index, and the
//! gesture controller that turns pointer input into selection and quick-register intents.

use std::collections::HashMap;
use std::fmt;

use async_trait::async_trait;
use glam::{DMat4, DVec2, DVec3};
use smallvec::SmallVec;

pub mod floor_map;
pub mod geometry;
pub mod info_panel;
pub mod interaction;
pub mod runtime;
pub mod spatial;
pub mod testing;
pub mod token;

pub use floor_map::{
    BuildOutcome, FloorElementIndex, FloorElementMapper, FloorFilter, FloorLevel, IsolationPlan,
    MappingReport, MappingState,
};
pub use info_panel::{panel_anchor, PanelLayout};
pub use interaction::{
    GestureConfig, InteractionController, InteractionEffect, InteractionEvent, PointerButton,
};
pub use spatial::{SpatialResolver, ViewerHit};
pub use token::{CachedTokenProvider, StaticTokenSource, TokenError, TokenSource, ViewerToken};

/// Engine-assigned id of a model element (a node of the structure tree).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct ElementId(pub u32);

impl fmt::Display for ElementId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Engine-assigned id of a renderable fragment. An element owns zero or more fragments.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct FragmentId(pub u32);

/// Axis-aligned bounding box in world space.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Aabb {
    pub min: DVec3,
    pub max: DVec3,
}

impl Aabb {
    pub fn new(min: DVec3, max: DVec3) -> Self {
        Self { min, max }
    }

    pub fn center(&self) -> DVec3 {
        (self.min + self.max) * 0.5
    }

    pub fn union(&self, other: &Aabb) -> Aabb {
        Aabb {
            min: self.min.min(other.min),
            max: self.max.max(other.max),
        }
    }

    pub fn is_valid(&self) -> bool {
        self.min.is_finite() && self.max.is_finite() && self.min.cmple(self.max).all()
    }
}

/// Size of the viewer canvas in CSS pixels. Screen positions are relative to its top-left.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Viewport {
    pub width: f64,
    pub height: f64,
}

impl Viewport {
    pub fn new(width: f64, height: f64) -> Self {
        Self { width, height }
    }

    pub fn contains(&self, screen: DVec2) -> bool {
        screen.x >= 0.0 && screen.y >= 0.0 && screen.x <= self.width && screen.y <= self.height
    }

    pub fn is_empty(&self) -> bool {
        !(self.width > 0.0 && self.height > 0.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Camera {
    pub eye: DVec3,
    /// Viewing direction; only used for orthographic cameras.
    pub forward: DVec3,
    pub view_projection: DMat4,
    pub orthographic: bool,
}

/// Raw engine hit-test result.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct SceneHit {
    pub element: ElementId,
    /// Exact intersection point, when the engine reports one.
    pub point: Option<DVec3>,
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum SceneError {
    #[error("no model is loaded")]
    NoModel,
    #[error("viewer engine error: {0}")]
    Engine(String),
}

/// Synchronous scene queries against the loaded model and current camera.
pub trait SceneQuery {
    fn viewport(&self) -> Viewport;

    fn hit_test(&self, screen: DVec2) -> Result<Option<SceneHit>, SceneError>;

    fn element_fragments(&self, element: ElementId) -> SmallVec<[FragmentId; 4]>;

    fn fragment_bounds(&self, fragment: FragmentId) -> Option<Aabb>;

    /// `None` when no model is loaded.
    fn model_bounds(&self) -> Option<Aabb>;

    fn camera(&self) -> Option<Camera>;

    fn world_up(&self) -> DVec3 {
        DVec3::Y
    }

    fn pivot(&self) -> Option<DVec3>;
}

/// Accepts or rejects elements for selection.
pub trait ElementFilter {
    fn accepts(&self, element: ElementId) -> bool;
}

impl<F> ElementFilter for F
where
    F: Fn(ElementId) -> bool,
{
    fn accepts(&self, element: ElementId) -> bool {
        self(element)
    }
}

/// Parent -> children relation of the model's elements.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StructureTree {
    root: ElementId,
    children: HashMap<ElementId, SmallVec<[ElementId; 4]>>,
}

impl StructureTree {
    pub fn new(root: ElementId) -> Self {
        Self {
            root,
            children: HashMap::new(),
        }
    }

    pub fn add_child(&mut self, parent: ElementId, child: ElementId) {
        self.children.entry(parent).or_default().push(child);
    }

    pub fn root(&self) -> ElementId {
        self.root
    }

    pub fn children(&self, element: ElementId) -> &[ElementId] {
        self.children.get(&element).map(|c| c.as_slice()).unwrap_or(&[])
    }

    /// Elements with no children, depth-first from the root (the root included).
    pub fn leaves(&self) -> Vec<ElementId> {
        let mut leaves = Vec::new();
        let mut stack = vec![self.root];
        while let Some(element) = stack.pop() {
            let children = self.children(element);
            if children.is_empty() {
                leaves.push(element);
            } else {
                stack.extend(children.iter().rev());
            }
        }
        leaves
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum PropertyValue {
    Number(f64),
    Text(String),
    Bool(bool),
}

impl fmt::Display for PropertyValue {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Number(n) => write!(f, "{n}"),
            Self::Text(s) => f.write_str(s),
            Self::Bool(b) => write!(f, "{b}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Property {
    pub name: String,
    pub value: PropertyValue,
}

#[derive(Debug, Clone, PartialEq)]
pub struct PropertyResult {
    pub element: ElementId,
    pub properties: Vec<Property>,
}

/// Asynchronous metadata access.
#[async_trait]
pub trait ModelMetadata: Send + Sync {
    async fn structure_tree(&self) -> Result<StructureTree, SceneError>;

    /// Properties of `elements`, restricted to `names` (matched case-insensitively).
    async fn bulk_properties(
        &self,
        elements: &[ElementId],
        names: &[&str],
    ) -> Result<Vec<PropertyResult>, SceneError>;
}

/// Visibility control used for floor isolation.
pub trait FloorIsolation {
    fn isolate(&mut self, elements: &[ElementId]) -> Result<(), SceneError>;

    fn show_all(&mut self) -> Result<(), SceneError>;

    fn set_ghosting(&mut self, enabled: bool) -> Result<(), SceneError>;
}
