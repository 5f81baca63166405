// SPDX-FileCopyrightText: 2026 Bruno Meilick
// SPDX-License-Identifier: LicenseRef-Punchlist-FreeUse-NoCopy-NoDerivatives
//
// All rights reserved.
//
// This file is part of Punchlist and is proprietary software.
// Unauthorized copying, modification, or distribution is prohibited.

//! Tokio driver for [`InteractionController`].

use tokio::sync::mpsc;
use tokio::time::{sleep_until, Instant};

use super::{InteractionController, InteractionEffect, InteractionEvent, SpatialResolver};

/// Feeds `events` into `controller` and fires its timers until the event channel closes or the
/// effect receiver goes away. The controller is torn down on exit.
pub async fn drive(
    controller: &mut InteractionController,
    resolver: SpatialResolver<'_>,
    mut events: mpsc::Receiver<InteractionEvent>,
    effects: mpsc::UnboundedSender<InteractionEffect>,
) {
    loop {
        let deadline = controller.next_deadline();
        let emitted = tokio::select! {
            biased;
            () = wait_for(deadline) => controller.poll_timers(&resolver, Instant::now()),
            event = events.recv() => match event {
                Some(event) => controller.handle(&resolver, event, Instant::now()),
                None => break,
            },
        };
        if emitted.into_iter().any(|effect| effects.send(effect).is_err()) {
            tracing::debug!("effect receiver dropped; stopping interaction driver");
            break;
        }
    }
    controller.teardown();
}

async fn wait_for(deadline: Option<Instant>) {
    match deadline {
        Some(deadline) => sleep_until(deadline).await,
        None => std::future::pending().await,
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use glam::{DVec2, DVec3};
    use tokio::sync::mpsc;
    use tokio::time::sleep;

    use super::drive;
    use crate::viewer::testing::FakeScene;
    use crate::viewer::{
        ElementId, GestureConfig, InteractionController, InteractionEffect, InteractionEvent,
        PointerButton, SpatialResolver, ViewerHit,
    };

    fn scene() -> FakeScene {
        FakeScene::new().with_hit_region(
            DVec2::new(100.0, 100.0),
            DVec2::new(200.0, 200.0),
            ElementId(7),
            Some(DVec3::ONE),
        )
    }

    #[tokio::test(start_paused = true)]
    async fn long_press_fires_on_the_clock() {
        let scene = scene();
        let mut controller = InteractionController::new(GestureConfig::default());
        let (events_tx, events_rx) = mpsc::channel(8);
        let (effects_tx, mut effects_rx) = mpsc::unbounded_channel();

        let script = async move {
            events_tx
                .send(InteractionEvent::PointerDown {
                    position: DVec2::new(150.0, 150.0),
                    button: PointerButton::Primary,
                    on_marker: false,
                })
                .await
                .expect("send");
            sleep(Duration::from_millis(600)).await;
            events_tx
                .send(InteractionEvent::PointerUp {
                    position: DVec2::new(150.0, 150.0),
                    on_marker: false,
                })
                .await
                .expect("send");
        };
        tokio::join!(
            drive(&mut controller, SpatialResolver::new(&scene), events_rx, effects_tx),
            script
        );

        assert_eq!(
            effects_rx.recv().await,
            Some(InteractionEffect::QuickRegister(ViewerHit::Element {
                id: ElementId(7),
                point: DVec3::ONE,
            }))
        );
        assert_eq!(effects_rx.recv().await, None);
        assert_eq!(controller.next_deadline(), None);
    }

    #[tokio::test]
    async fn overdue_long_press_wins_over_a_queued_pointer_up() {
        let scene = scene();
        let config = GestureConfig {
            long_press: Duration::from_millis(20),
            ..GestureConfig::default()
        };
        let mut controller = InteractionController::new(config);
        let (events_tx, events_rx) = mpsc::channel(8);
        let (effects_tx, mut effects_rx) = mpsc::unbounded_channel();
        let at = DVec2::new(150.0, 150.0);

        let script = async move {
            events_tx
                .send(InteractionEvent::PointerDown {
                    position: at,
                    button: PointerButton::Primary,
                    on_marker: false,
                })
                .await
                .expect("send");
            // Let the driver take the press, then stall the whole runtime past the deadline.
            tokio::task::yield_now().await;
            tokio::task::yield_now().await;
            std::thread::sleep(Duration::from_millis(40));
            events_tx
                .try_send(InteractionEvent::PointerUp {
                    position: at,
                    on_marker: false,
                })
                .expect("queue pointer up");
        };
        tokio::join!(
            drive(&mut controller, SpatialResolver::new(&scene), events_rx, effects_tx),
            script
        );

        assert!(matches!(
            effects_rx.recv().await,
            Some(InteractionEffect::QuickRegister(ViewerHit::Element { .. }))
        ));
        assert_eq!(effects_rx.recv().await, None);
    }

    #[tokio::test(start_paused = true)]
    async fn selection_debounce_fires_on_the_clock() {
        let scene = scene();
        let mut controller = InteractionController::new(GestureConfig::default());
        let (events_tx, events_rx) = mpsc::channel(8);
        let (effects_tx, mut effects_rx) = mpsc::unbounded_channel();

        let script = async move {
            for event in [
                InteractionEvent::PointerMove {
                    position: DVec2::new(150.0, 150.0),
                    on_marker: false,
                },
                InteractionEvent::SelectionChanged {
                    element: Some(ElementId(7)),
                },
            ] {
                events_tx.send(event).await.expect("send");
            }
            sleep(Duration::from_millis(250)).await;
        };
        tokio::join!(
            drive(&mut controller, SpatialResolver::new(&scene), events_rx, effects_tx),
            script
        );

        assert!(matches!(
            effects_rx.recv().await,
            Some(InteractionEffect::SelectionChanged(Some(ViewerHit::Element { .. })))
        ));
        assert_eq!(effects_rx.recv().await, None);
    }
}
