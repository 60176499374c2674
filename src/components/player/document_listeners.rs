// Document-level listeners a player needs while it is mounted: scrubbing that
// leaves the progress bar, and a last snapshot when the page is hidden.
use super::{persist_snapshot, seek_at_pointer, SnapshotMirror};
use crate::registry::InstanceId;
use crate::state::PlayerState;
use crate::storage::PlayerStore;
use dioxus::prelude::*;
use wasm_bindgen::{closure::Closure, JsCast};
use web_sys::{window, MouseEvent};

pub(super) struct DocumentListeners {
    on_move: Closure<dyn FnMut(MouseEvent)>,
    on_up: Closure<dyn FnMut()>,
    on_page_hide: Closure<dyn FnMut()>,
}

impl DocumentListeners {
    pub(super) fn attach(
        id: InstanceId,
        mut state: Signal<PlayerState>,
        store: PlayerStore,
        mirror: SnapshotMirror,
    ) -> Option<Self> {
        let window = window()?;
        let document = window.document()?;

        let on_move = Closure::wrap(Box::new(move |event: MouseEvent| {
            if state.peek().is_dragging {
                seek_at_pointer(id, state, f64::from(event.client_x()));
            }
        }) as Box<dyn FnMut(MouseEvent)>);

        let on_up = Closure::wrap(Box::new(move || {
            if state.peek().is_dragging {
                state.write().end_drag();
            }
        }) as Box<dyn FnMut()>);

        let on_page_hide = Closure::wrap(Box::new(move || {
            persist_snapshot(id, &store, &mirror.borrow());
        }) as Box<dyn FnMut()>);

        document
            .add_event_listener_with_callback("mousemove", on_move.as_ref().unchecked_ref())
            .ok()?;
        document
            .add_event_listener_with_callback("mouseup", on_up.as_ref().unchecked_ref())
            .ok()?;
        window
            .add_event_listener_with_callback("pagehide", on_page_hide.as_ref().unchecked_ref())
            .ok()?;

        Some(Self {
            on_move,
            on_up,
            on_page_hide,
        })
    }

    pub(super) fn detach(&self) {
        let Some(window) = window() else {
            return;
        };
        if let Some(document) = window.document() {
            let _ = document.remove_event_listener_with_callback(
                "mousemove",
                self.on_move.as_ref().unchecked_ref(),
            );
            let _ = document.remove_event_listener_with_callback(
                "mouseup",
                self.on_up.as_ref().unchecked_ref(),
            );
        }
        let _ = window.remove_event_listener_with_callback(
            "pagehide",
            self.on_page_hide.as_ref().unchecked_ref(),
        );
    }
}
