// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Floor element mapping.
//!
//! Classifies every leaf element of the loaded model into the floor it belongs to, using
//! whatever "level"-like property the model exposes. Builds are asynchronous and may be
//! superseded: each build takes a generation number and only the newest generation commits.
//! Readers never wait on a build; while no index is ready every membership query fails open.

use std::collections::{BTreeMap, BTreeSet, HashMap, HashSet};
use std::sync::{Arc, Mutex, MutexGuard, OnceLock, PoisonError};

use regex::Regex;
use smol_str::SmolStr;

use super::{ElementFilter, ElementId, FloorIsolation, ModelMetadata, PropertyResult, PropertyValue};
use crate::model::Floor;

/// Leaves per bulk metadata request.
pub const BULK_BATCH_SIZE: usize = 500;

/// Property names treated as an element's level, matched case-insensitively.
pub const LEVEL_PROPERTY_NAMES: [&str; 3] = ["Level", "Building Storey", "Base Constraint"];

/// A floor as seen by the matcher.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FloorLevel {
    number: i32,
    name_key: SmolStr,
}

impl FloorLevel {
    pub fn new(name: &str, number: i32) -> Self {
        Self {
            number,
            name_key: SmolStr::new(name.trim().to_lowercase()),
        }
    }

    pub fn number(&self) -> i32 {
        self.number
    }
}

impl From<&Floor> for FloorLevel {
    fn from(floor: &Floor) -> Self {
        Self::new(floor.name(), floor.floor_number())
    }
}

fn first_integer_pattern() -> &'static Regex {
    static PATTERN: OnceLock<Regex> = OnceLock::new();
    PATTERN.get_or_init(|| Regex::new(r"-?\d+").expect("valid integer pattern"))
}

/// Maps a level value to a floor number.
///
/// Rules, first match wins:
/// 1. a numeric value equal to a floor number;
/// 2. a text value equal (trimmed, case-insensitive) to a floor name;
/// 3. the first integer inside a text value equal to a floor number.
///
/// Booleans never match.
pub fn match_level_value(value: &PropertyValue, floors: &[FloorLevel]) -> Option<i32> {
    match value {
        PropertyValue::Number(n) => floors
            .iter()
            .find(|floor| f64::from(floor.number) == *n)
            .map(FloorLevel::number),
        PropertyValue::Bool(_) => None,
        PropertyValue::Text(text) => {
            let key = text.trim().to_lowercase();
            if let Some(floor) = floors.iter().find(|floor| floor.name_key == key) {
                return Some(floor.number);
            }
            let number = first_integer_pattern()
                .find(text)
                .and_then(|m| m.as_str().parse::<i32>().ok())?;
            floors
                .iter()
                .find(|floor| floor.number == number)
                .map(FloorLevel::number)
        }
    }
}

/// Floor number -> elements, plus the reverse lookup.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FloorElementIndex {
    by_floor: BTreeMap<i32, HashSet<ElementId>>,
    by_element: HashMap<ElementId, i32>,
}

impl FloorElementIndex {
    pub fn insert(&mut self, floor: i32, element: ElementId) {
        if let Some(previous) = self.by_element.insert(element, floor) {
            if let Some(set) = self.by_floor.get_mut(&previous) {
                set.remove(&element);
            }
        }
        self.by_floor.entry(floor).or_default().insert(element);
    }

    pub fn elements_on(&self, floor: i32) -> Option<&HashSet<ElementId>> {
        self.by_floor.get(&floor).filter(|set| !set.is_empty())
    }

    pub fn floor_of(&self, element: ElementId) -> Option<i32> {
        self.by_element.get(&element).copied()
    }

    /// Floors with at least one mapped element.
    pub fn floors(&self) -> BTreeSet<i32> {
        self.by_floor
            .iter()
            .filter(|(_, set)| !set.is_empty())
            .map(|(floor, _)| *floor)
            .collect()
    }

    pub fn len(&self) -> usize {
        self.by_element.len()
    }

    pub fn is_empty(&self) -> bool {
        self.by_element.is_empty()
    }
}

/// Diagnostics of one build.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct MappingReport {
    pub leaf_count: usize,
    pub matched: usize,
    pub without_level: usize,
    pub unmatched: usize,
    /// Raw level values that matched no floor, with their element counts.
    pub unmatched_values: BTreeMap<String, usize>,
    pub per_floor: BTreeMap<i32, usize>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum MappingState {
    /// No build has started, or the last one was cancelled.
    Idle,
    Building,
    Ready,
    /// Metadata could not be read; the index is empty and every query fails open.
    Unavailable { reason: String },
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BuildOutcome {
    Committed(MappingReport),
    Unavailable(String),
    /// A newer build started (or the mapper was cancelled) before this one finished.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum IsolationPlan {
    ShowAll,
    /// Sorted element ids of the selected floor.
    Isolate(Vec<ElementId>),
}

#[derive(Debug)]
struct MapperState {
    generation: u64,
    state: MappingState,
    index: Arc<FloorElementIndex>,
    report: Option<MappingReport>,
}

/// Builds and serves the per-floor element index for one viewing session.
#[derive(Debug, Clone)]
pub struct FloorElementMapper {
    inner: Arc<Mutex<MapperState>>,
}

impl Default for FloorElementMapper {
    fn default() -> Self {
        Self::new()
    }
}

impl FloorElementMapper {
    pub fn new() -> Self {
        Self {
            inner: Arc::new(Mutex::new(MapperState {
                generation: 0,
                state: MappingState::Idle,
                index: Arc::new(FloorElementIndex::default()),
                report: None,
            })),
        }
    }

    fn lock(&self) -> MutexGuard<'_, MapperState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Builds the index from `model` against `floors`.
    ///
    /// Starting a build supersedes any build still in flight. Batches are requested one after
    /// another; the generation is re-checked after every await.
    pub async fn build(&self, model: &dyn ModelMetadata, floors: &[Floor]) -> BuildOutcome {
        let generation = self.begin();
        let levels = floors.iter().map(FloorLevel::from).collect::<Vec<_>>();

        let tree = match model.structure_tree().await {
            Ok(tree) => tree,
            Err(err) => return self.fail(generation, err.to_string()),
        };
        if self.is_stale(generation) {
            return BuildOutcome::Superseded;
        }

        let leaves = tree.leaves();
        let mut index = FloorElementIndex::default();
        let mut report = MappingReport {
            leaf_count: leaves.len(),
            ..MappingReport::default()
        };

        for batch in leaves.chunks(BULK_BATCH_SIZE) {
            let results = match model.bulk_properties(batch, &LEVEL_PROPERTY_NAMES).await {
                Ok(results) => results,
                Err(err) => return self.fail(generation, err.to_string()),
            };
            if self.is_stale(generation) {
                return BuildOutcome::Superseded;
            }
            classify_batch(batch, &results, &levels, &mut index, &mut report);
        }

        self.commit(generation, index, report)
    }

    /// Invalidates any build in flight and drops the index.
    pub fn cancel(&self) {
        let mut state = self.lock();
        state.generation += 1;
        state.state = MappingState::Idle;
        state.index = Arc::new(FloorElementIndex::default());
        state.report = None;
    }

    pub fn state(&self) -> MappingState {
        self.lock().state.clone()
    }

    pub fn is_ready(&self) -> bool {
        self.lock().state == MappingState::Ready
    }

    pub fn report(&self) -> Option<MappingReport> {
        self.lock().report.clone()
    }

    /// Whether `element` should be treated as part of `selected_floor`.
    ///
    /// Fails open: true with no floor selected, with no ready index, or when the selected floor
    /// has no mapped elements.
    pub fn is_on_floor(&self, selected_floor: Option<i32>, element: ElementId) -> bool {
        let Some(floor) = selected_floor else {
            return true;
        };
        let state = self.lock();
        if state.state != MappingState::Ready {
            return true;
        }
        match state.index.elements_on(floor) {
            Some(elements) => elements.contains(&element),
            None => true,
        }
    }

    pub fn floor_for_element(&self, element: ElementId) -> Option<i32> {
        let state = self.lock();
        if state.state != MappingState::Ready {
            return None;
        }
        state.index.floor_of(element)
    }

    pub fn floors_with_elements(&self) -> BTreeSet<i32> {
        let state = self.lock();
        if state.state != MappingState::Ready {
            return BTreeSet::new();
        }
        state.index.floors()
    }

    pub fn isolation_plan(&self, selected_floor: Option<i32>) -> IsolationPlan {
        let Some(floor) = selected_floor else {
            return IsolationPlan::ShowAll;
        };
        let state = self.lock();
        if state.state != MappingState::Ready {
            return IsolationPlan::ShowAll;
        }
        match state.index.elements_on(floor) {
            Some(elements) => {
                let mut ids = elements.iter().copied().collect::<Vec<_>>();
                ids.sort_unstable();
                IsolationPlan::Isolate(ids)
            }
            None => IsolationPlan::ShowAll,
        }
    }

    /// Isolates the selected floor with ghosting, or shows everything without ghosting.
    /// Engine failures are logged and do not propagate.
    pub fn apply_isolation(
        &self,
        engine: &mut dyn FloorIsolation,
        selected_floor: Option<i32>,
    ) -> IsolationPlan {
        let plan = self.isolation_plan(selected_floor);
        let result = match &plan {
            IsolationPlan::Isolate(ids) => engine
                .isolate(ids)
                .and_then(|()| engine.set_ghosting(true)),
            IsolationPlan::ShowAll => engine.show_all().and_then(|()| engine.set_ghosting(false)),
        };
        if let Err(err) = result {
            tracing::warn!(floor = ?selected_floor, error = %err, "floor isolation failed");
        }
        plan
    }

    /// An [`ElementFilter`] accepting elements on `selected_floor`, evaluated live.
    pub fn filter_for(&self, selected_floor: Option<i32>) -> FloorFilter {
        FloorFilter {
            mapper: self.clone(),
            selected_floor,
        }
    }

    fn begin(&self) -> u64 {
        let mut state = self.lock();
        state.generation += 1;
        state.state = MappingState::Building;
        state.index = Arc::new(FloorElementIndex::default());
        state.report = None;
        state.generation
    }

    fn is_stale(&self, generation: u64) -> bool {
        self.lock().generation != generation
    }

    fn fail(&self, generation: u64, reason: String) -> BuildOutcome {
        let mut state = self.lock();
        if state.generation != generation {
            return BuildOutcome::Superseded;
        }
        tracing::warn!(%reason, "floor element mapping unavailable");
        state.state = MappingState::Unavailable {
            reason: reason.clone(),
        };
        state.index = Arc::new(FloorElementIndex::default());
        BuildOutcome::Unavailable(reason)
    }

    fn commit(
        &self,
        generation: u64,
        index: FloorElementIndex,
        report: MappingReport,
    ) -> BuildOutcome {
        let mut state = self.lock();
        if state.generation != generation {
            return BuildOutcome::Superseded;
        }
        tracing::info!(
            leaves = report.leaf_count,
            matched = report.matched,
            without_level = report.without_level,
            unmatched = report.unmatched,
            floors = index.floors().len(),
            "floor element mapping ready"
        );
        if !report.unmatched_values.is_empty() {
            tracing::debug!(values = ?report.unmatched_values, "unmatched level values");
        }
        state.state = MappingState::Ready;
        state.index = Arc::new(index);
        state.report = Some(report.clone());
        BuildOutcome::Committed(report)
    }
}

fn classify_batch(
    batch: &[ElementId],
    results: &[PropertyResult],
    levels: &[FloorLevel],
    index: &mut FloorElementIndex,
    report: &mut MappingReport,
) {
    let by_element = results
        .iter()
        .map(|result| (result.element, result))
        .collect::<HashMap<_, _>>();

    for element in batch {
        let level = by_element.get(element).and_then(|result| {
            result.properties.iter().find(|property| {
                LEVEL_PROPERTY_NAMES
                    .iter()
                    .any(|name| name.eq_ignore_ascii_case(property.name.trim()))
            })
        });
        let Some(level) = level else {
            report.without_level += 1;
            continue;
        };

        match match_level_value(&level.value, levels) {
            Some(floor) => {
                index.insert(floor, *element);
                report.matched += 1;
                *report.per_floor.entry(floor).or_default() += 1;
            }
            None => {
                report.unmatched += 1;
                *report
                    .unmatched_values
                    .entry(level.value.to_string())
                    .or_default() += 1;
            }
        }
    }
}

/// Selection filter bound to a floor.
#[derive(Debug, Clone)]
pub struct FloorFilter {
    mapper: FloorElementMapper,
    selected_floor: Option<i32>,
}

impl ElementFilter for FloorFilter {
    fn accepts(&self, element: ElementId) -> bool {
        self.mapper.is_on_floor(self.selected_floor, element)
    }
}
