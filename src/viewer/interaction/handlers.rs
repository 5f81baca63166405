// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

impl InteractionController {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            ..Self::default()
        }
    }

    pub fn with_panel_layout(mut self, panel: PanelLayout) -> Self {
        self.panel = panel;
        self
    }

    pub fn config(&self) -> &GestureConfig {
        &self.config
    }

    pub fn selected(&self) -> Option<ViewerHit> {
        self.selected
    }

    /// Earliest pending timer, if any.
    pub fn next_deadline(&self) -> Option<Instant> {
        let pending = self.pending_selection.map(|pending| pending.deadline);
        match (pending, self.long_press_deadline) {
            (Some(a), Some(b)) => Some(a.min(b)),
            (a, b) => a.or(b),
        }
    }

    /// Applies one input event. Timers already due at `now` fire first, so a late event never
    /// overtakes an expired long press or debounce.
    pub fn handle(
        &mut self,
        resolver: &SpatialResolver<'_>,
        event: InteractionEvent,
        now: Instant,
    ) -> Vec<InteractionEffect> {
        let mut effects = self.poll_timers(resolver, now);
        match event {
            InteractionEvent::SelectionChanged { element } => {
                self.on_selection_changed(resolver, element, now, &mut effects);
            }
            InteractionEvent::PointerDown {
                position,
                button,
                on_marker,
            } => {
                if button == PointerButton::Primary && !on_marker {
                    self.on_pointer_down(resolver, position, now, &mut effects);
                }
            }
            InteractionEvent::PointerMove {
                position,
                on_marker,
            } => {
                if !on_marker {
                    self.on_pointer_move(position);
                }
            }
            InteractionEvent::PointerUp {
                position,
                on_marker,
            } => self.on_pointer_up(resolver, position, on_marker, &mut effects),
            InteractionEvent::PointerCancel => {
                self.down = None;
                self.long_press_deadline = None;
            }
            InteractionEvent::DoubleClick {
                position,
                on_marker,
            } => {
                if !on_marker {
                    self.on_double_click(resolver, position, &mut effects);
                }
            }
            InteractionEvent::ContextMenu => effects.push(InteractionEffect::SuppressDefault),
            InteractionEvent::CameraChanged { container_width } => {
                if let Some(selected) = self.selected {
                    let anchor =
                        panel_anchor(resolver, &self.panel, selected.point(), container_width);
                    effects.push(InteractionEffect::PanelAnchor(anchor));
                }
            }
        }
        effects
    }

    /// Fires every timer due at `now`.
    pub fn poll_timers(
        &mut self,
        resolver: &SpatialResolver<'_>,
        now: Instant,
    ) -> Vec<InteractionEffect> {
        let mut effects = Vec::new();

        if let Some(pending) = self.pending_selection {
            if pending.deadline <= now {
                self.pending_selection = None;
                self.commit_selection(resolver, pending.element, &mut effects);
            }
        }

        if let Some(deadline) = self.long_press_deadline {
            if deadline <= now {
                self.long_press_deadline = None;
                if let Some(down) = self.down.take() {
                    tracing::debug!(x = down.x, y = down.y, "long press");
                    if let Some(hit) = resolver.resolve_hit(down) {
                        self.quick_register(hit, &mut effects);
                    }
                }
            }
        }

        effects
    }

    /// Clears the selection and its pending debounce.
    pub fn clear_selection(&mut self) -> Vec<InteractionEffect> {
        let mut effects = Vec::new();
        self.pending_selection = None;
        self.select(None, &mut effects);
        effects
    }

    /// Drops every timer and held position. The selection is kept.
    pub fn teardown(&mut self) {
        self.pending_selection = None;
        self.long_press_deadline = None;
        self.down = None;
        self.latest_pointer = None;
        self.last_tap = None;
    }

    fn on_selection_changed(
        &mut self,
        resolver: &SpatialResolver<'_>,
        element: Option<ElementId>,
        now: Instant,
        effects: &mut Vec<InteractionEffect>,
    ) {
        self.pending_selection = None;

        match element {
            Some(element) if resolver.accepts(element) => {
                self.pending_selection = Some(PendingSelection {
                    element,
                    deadline: now + self.config.selection_debounce,
                });
            }
            _ => {
                let spatial = self
                    .latest_pointer
                    .and_then(|pointer| resolver.resolve_hit(pointer))
                    .filter(ViewerHit::is_spatial);
                tracing::debug!(?element, spatial = spatial.is_some(), "selection fell through");
                self.select(spatial, effects);
            }
        }
    }

    fn commit_selection(
        &mut self,
        resolver: &SpatialResolver<'_>,
        element: ElementId,
        effects: &mut Vec<InteractionEffect>,
    ) {
        let at_pointer = self
            .latest_pointer
            .and_then(|pointer| resolver.resolve_hit(pointer))
            .filter(|hit| hit.element() == Some(element));
        let hit = at_pointer.or_else(|| {
            resolver
                .resolve_element_center(element)
                .map(|point| ViewerHit::Element { id: element, point })
        });
        tracing::debug!(%element, resolved = hit.is_some(), "selection committed");
        self.select(hit, effects);
    }

    fn on_pointer_down(
        &mut self,
        resolver: &SpatialResolver<'_>,
        position: DVec2,
        now: Instant,
        effects: &mut Vec<InteractionEffect>,
    ) {
        let is_double_tap = self.last_tap.is_some_and(|(at, tapped)| {
            now.duration_since(at) < self.config.double_tap_window
                && !moved_beyond(tapped, position, self.config.double_tap_distance)
        });
        self.last_tap = Some((now, position));
        self.latest_pointer = Some(position);
        self.long_press_deadline = None;

        if is_double_tap {
            if let Some(hit) = resolver.resolve_hit(position) {
                tracing::debug!(x = position.x, y = position.y, "double tap");
                self.quick_register(hit, effects);
                self.down = None;
                self.last_tap = None;
                return;
            }
        }

        self.down = Some(position);
        self.long_press_deadline = Some(now + self.config.long_press);
    }

    fn on_pointer_move(&mut self, position: DVec2) {
        self.latest_pointer = Some(position);
        if let Some(down) = self.down {
            if self.long_press_deadline.is_some()
                && moved_beyond(down, position, self.config.move_tolerance)
            {
                tracing::debug!("long press cancelled by movement");
                self.long_press_deadline = None;
            }
        }
    }

    fn on_pointer_up(
        &mut self,
        resolver: &SpatialResolver<'_>,
        position: DVec2,
        on_marker: bool,
        effects: &mut Vec<InteractionEffect>,
    ) {
        let down = self.down.take();
        self.long_press_deadline = None;
        if on_marker {
            return;
        }
        let Some(down) = down else {
            return;
        };
        if moved_beyond(down, position, self.config.move_tolerance) {
            return;
        }
        if let Some(hit) = resolver.resolve_hit(position).filter(ViewerHit::is_spatial) {
            self.select(Some(hit), effects);
        }
    }

    fn on_double_click(
        &mut self,
        resolver: &SpatialResolver<'_>,
        position: DVec2,
        effects: &mut Vec<InteractionEffect>,
    ) {
        self.pending_selection = None;
        self.latest_pointer = Some(position);
        if let Some(hit) = resolver.resolve_hit(position) {
            tracing::debug!(x = position.x, y = position.y, "double click");
            self.quick_register(hit, effects);
        }
    }

    fn quick_register(&mut self, hit: ViewerHit, effects: &mut Vec<InteractionEffect>) {
        self.pending_selection = None;
        self.select(None, effects);
        effects.push(InteractionEffect::QuickRegister(hit));
    }

    fn select(&mut self, hit: Option<ViewerHit>, effects: &mut Vec<InteractionEffect>) {
        if self.selected != hit {
            self.selected = hit;
            effects.push(InteractionEffect::SelectionChanged(hit));
        }
    }
}
