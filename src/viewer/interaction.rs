// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Pointer gesture state machine.
//!
//! Turns native selection notifications and raw pointer input into two outputs: the current
//! selection (an element or a spatial point) and quick-register intents (double-click,
//! double-tap, long-press). Timers are deadlines the caller polls; see
//! [`super::runtime::drive`] for a tokio driver.

use std::time::Duration;

use glam::DVec2;
use tokio::time::Instant;

use super::info_panel::{panel_anchor, PanelLayout};
use super::{ElementId, SpatialResolver, ViewerHit};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct GestureConfig {
    pub selection_debounce: Duration,
    pub long_press: Duration,
    /// Pointer travel in pixels beyond which a press no longer counts as stationary.
    pub move_tolerance: f64,
    pub double_tap_window: Duration,
    /// Maximum distance in pixels between the two presses of a double tap.
    pub double_tap_distance: f64,
}

impl Default for GestureConfig {
    fn default() -> Self {
        Self {
            selection_debounce: Duration::from_millis(200),
            long_press: Duration::from_millis(500),
            move_tolerance: 5.0,
            double_tap_window: Duration::from_millis(300),
            double_tap_distance: 20.0,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PointerButton {
    Primary,
    Secondary,
    Middle,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEvent {
    /// The engine's own selection changed; `None` when it was cleared.
    SelectionChanged { element: Option<ElementId> },
    PointerDown {
        position: DVec2,
        button: PointerButton,
        on_marker: bool,
    },
    PointerMove { position: DVec2, on_marker: bool },
    PointerUp { position: DVec2, on_marker: bool },
    PointerCancel,
    DoubleClick { position: DVec2, on_marker: bool },
    ContextMenu,
    CameraChanged { container_width: f64 },
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub enum InteractionEffect {
    SelectionChanged(Option<ViewerHit>),
    QuickRegister(ViewerHit),
    /// The platform's default handling (context menu) should be suppressed.
    SuppressDefault,
    /// New info panel position; `None` hides it.
    PanelAnchor(Option<DVec2>),
}

#[derive(Debug, Clone, Copy, PartialEq)]
struct PendingSelection {
    element: ElementId,
    deadline: Instant,
}

#[derive(Debug, Clone, Default)]
pub struct InteractionController {
    config: GestureConfig,
    panel: PanelLayout,
    selected: Option<ViewerHit>,
    latest_pointer: Option<DVec2>,
    down: Option<DVec2>,
    last_tap: Option<(Instant, DVec2)>,
    pending_selection: Option<PendingSelection>,
    long_press_deadline: Option<Instant>,
}

// Event handlers and timer processing for `InteractionController`.
include!("interaction/handlers.rs");

fn moved_beyond(from: DVec2, to: DVec2, tolerance: f64) -> bool {
    (to - from).length() > tolerance
}
