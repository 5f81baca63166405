// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! In-memory stand-ins for the viewer engine.
//!
//! Used by the crate's own tests and by embedders that want to exercise the interaction logic
//! without a renderer.

use std::collections::HashMap;
use std::sync::{Arc, Mutex, PoisonError};

use async_trait::async_trait;
use glam::{DMat4, DVec2, DVec3};
use smallvec::SmallVec;
use tokio::sync::Semaphore;

use super::{
    Aabb, Camera, ElementId, FloorIsolation, FragmentId, ModelMetadata, Property, PropertyResult,
    PropertyValue, SceneError, SceneHit, SceneQuery, StructureTree, Viewport,
};

#[derive(Debug, Clone, Copy, PartialEq)]
struct HitRegion {
    min: DVec2,
    max: DVec2,
    hit: SceneHit,
}

/// A scripted scene: rectangular screen regions map to element hits.
#[derive(Debug, Clone)]
pub struct FakeScene {
    viewport: Viewport,
    camera: Option<Camera>,
    world_up: DVec3,
    pivot: Option<DVec3>,
    model_bounds: Option<Aabb>,
    regions: Vec<HitRegion>,
    fragments: HashMap<ElementId, SmallVec<[FragmentId; 4]>>,
    fragment_bounds: HashMap<FragmentId, Aabb>,
    next_fragment: u32,
    hit_test_error: Option<String>,
}

impl FakeScene {
    /// An 800x600 viewport with a perspective camera at (0, 20, 20) looking at the origin, and a
    /// model spanning (-10, -1, -10)..(10, 1, 10).
    pub fn new() -> Self {
        let viewport = Viewport::new(800.0, 600.0);
        let eye = DVec3::new(0.0, 20.0, 20.0);
        Self {
            viewport,
            camera: Some(perspective_camera(eye, DVec3::ZERO, viewport)),
            world_up: DVec3::Y,
            pivot: None,
            model_bounds: Some(Aabb::new(
                DVec3::new(-10.0, -1.0, -10.0),
                DVec3::new(10.0, 1.0, 10.0),
            )),
            regions: Vec::new(),
            fragments: HashMap::new(),
            fragment_bounds: HashMap::new(),
            next_fragment: 1,
            hit_test_error: None,
        }
    }

    pub fn with_camera(mut self, camera: Option<Camera>) -> Self {
        self.camera = camera;
        self
    }

    pub fn with_world_up(mut self, up: DVec3) -> Self {
        self.world_up = up;
        self
    }

    pub fn with_pivot(mut self, pivot: Option<DVec3>) -> Self {
        self.pivot = pivot;
        self
    }

    pub fn with_model_bounds(mut self, bounds: Option<Aabb>) -> Self {
        self.model_bounds = bounds;
        self
    }

    /// Screen rectangle `min..=max` hits `element`, optionally at an exact world `point`.
    pub fn with_hit_region(
        mut self,
        min: DVec2,
        max: DVec2,
        element: ElementId,
        point: Option<DVec3>,
    ) -> Self {
        self.regions.push(HitRegion {
            min,
            max,
            hit: SceneHit { element, point },
        });
        self
    }

    /// Gives `element` one fragment per box.
    pub fn with_element_bounds(mut self, element: ElementId, boxes: &[Aabb]) -> Self {
        for bounds in boxes {
            let fragment = FragmentId(self.next_fragment);
            self.next_fragment += 1;
            self.fragments.entry(element).or_default().push(fragment);
            self.fragment_bounds.insert(fragment, *bounds);
        }
        self
    }

    pub fn with_failing_hit_test(mut self, message: &str) -> Self {
        self.hit_test_error = Some(message.to_owned());
        self
    }
}

impl Default for FakeScene {
    fn default() -> Self {
        Self::new()
    }
}

impl SceneQuery for FakeScene {
    fn viewport(&self) -> Viewport {
        self.viewport
    }

    fn hit_test(&self, screen: DVec2) -> Result<Option<SceneHit>, SceneError> {
        if let Some(message) = &self.hit_test_error {
            return Err(SceneError::Engine(message.clone()));
        }
        if self.model_bounds.is_none() {
            return Ok(None);
        }
        Ok(self
            .regions
            .iter()
            .find(|region| screen.cmpge(region.min).all() && screen.cmple(region.max).all())
            .map(|region| region.hit))
    }

    fn element_fragments(&self, element: ElementId) -> SmallVec<[FragmentId; 4]> {
        self.fragments.get(&element).cloned().unwrap_or_default()
    }

    fn fragment_bounds(&self, fragment: FragmentId) -> Option<Aabb> {
        self.fragment_bounds.get(&fragment).copied()
    }

    fn model_bounds(&self) -> Option<Aabb> {
        self.model_bounds
    }

    fn camera(&self) -> Option<Camera> {
        self.camera
    }

    fn world_up(&self) -> DVec3 {
        self.world_up
    }

    fn pivot(&self) -> Option<DVec3> {
        self.pivot
    }
}

/// A right-handed perspective camera (60 degree vertical field of view) looking at `target`.
pub fn perspective_camera(eye: DVec3, target: DVec3, viewport: Viewport) -> Camera {
    let view = DMat4::look_at_rh(eye, target, DVec3::Y);
    let aspect = viewport.width / viewport.height;
    let projection = DMat4::perspective_rh_gl(60f64.to_radians(), aspect, 0.1, 1000.0);
    Camera {
        eye,
        forward: (target - eye).normalize_or_zero(),
        view_projection: projection * view,
        orthographic: false,
    }
}

/// Visibility call recorded by [`FakeIsolation`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsolationCall {
    Isolate(Vec<ElementId>),
    ShowAll,
    Ghosting(bool),
}

/// Records visibility calls; optionally fails all of them.
#[derive(Debug, Clone, Default)]
pub struct FakeIsolation {
    pub calls: Vec<IsolationCall>,
    pub fail: bool,
}

impl FakeIsolation {
    fn record(&mut self, call: IsolationCall) -> Result<(), SceneError> {
        if self.fail {
            return Err(SceneError::Engine("isolation rejected".to_owned()));
        }
        self.calls.push(call);
        Ok(())
    }
}

impl FloorIsolation for FakeIsolation {
    fn isolate(&mut self, elements: &[ElementId]) -> Result<(), SceneError> {
        self.record(IsolationCall::Isolate(elements.to_vec()))
    }

    fn show_all(&mut self) -> Result<(), SceneError> {
        self.record(IsolationCall::ShowAll)
    }

    fn set_ghosting(&mut self, enabled: bool) -> Result<(), SceneError> {
        self.record(IsolationCall::Ghosting(enabled))
    }
}

/// Scripted model metadata.
///
/// Elements are children of root `ElementId(0)`. A gate, when set, makes every bulk request wait
/// for one semaphore permit.
#[derive(Debug, Default)]
pub struct FakeModel {
    tree: Option<StructureTree>,
    properties: HashMap<ElementId, Vec<Property>>,
    bulk_error: Option<String>,
    gate: Option<Arc<Semaphore>>,
    batch_sizes: Mutex<Vec<usize>>,
}

impl FakeModel {
    /// A model whose root has no children yet.
    pub fn new() -> Self {
        Self {
            tree: Some(StructureTree::new(ElementId(0))),
            ..Self::default()
        }
    }

    /// A model whose structure tree cannot be read.
    pub fn without_tree() -> Self {
        Self::default()
    }

    /// Adds a leaf under the root with the given properties.
    pub fn with_leaf(mut self, element: ElementId, properties: &[(&str, PropertyValue)]) -> Self {
        if let Some(tree) = self.tree.as_mut() {
            tree.add_child(tree.root(), element);
        }
        self.properties.insert(
            element,
            properties
                .iter()
                .map(|(name, value)| Property {
                    name: (*name).to_owned(),
                    value: value.clone(),
                })
                .collect(),
        );
        self
    }

    pub fn with_bulk_error(mut self, message: &str) -> Self {
        self.bulk_error = Some(message.to_owned());
        self
    }

    pub fn with_gate(mut self, gate: Arc<Semaphore>) -> Self {
        self.gate = Some(gate);
        self
    }

    /// Element counts of every bulk request seen so far.
    pub fn batch_sizes(&self) -> Vec<usize> {
        self.batch_sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }
}

#[async_trait]
impl ModelMetadata for FakeModel {
    async fn structure_tree(&self) -> Result<StructureTree, SceneError> {
        self.tree.clone().ok_or(SceneError::NoModel)
    }

    async fn bulk_properties(
        &self,
        elements: &[ElementId],
        names: &[&str],
    ) -> Result<Vec<PropertyResult>, SceneError> {
        if let Some(gate) = &self.gate {
            let permit = gate
                .acquire()
                .await
                .map_err(|err| SceneError::Engine(err.to_string()))?;
            permit.forget();
        }
        self.batch_sizes
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .push(elements.len());
        if let Some(message) = &self.bulk_error {
            return Err(SceneError::Engine(message.clone()));
        }

        Ok(elements
            .iter()
            .filter_map(|element| {
                let properties = self
                    .properties
                    .get(element)?
                    .iter()
                    .filter(|property| names.iter().any(|n| n.eq_ignore_ascii_case(&property.name)))
                    .cloned()
                    .collect::<Vec<_>>();
                (!properties.is_empty()).then_some(PropertyResult {
                    element: *element,
                    properties,
                })
            })
            .collect())
    }
}
