use super::{change_volume, seek_at_pointer, toggle_mute, toggle_play, PlayerContext};
use crate::components::Icon;
use crate::media;
use dioxus::prelude::*;

/// Play/Pause button laid over the cover art.
#[component]
pub(super) fn PlayPauseButton() -> Element {
    let PlayerContext { id, state, .. } = use_context::<PlayerContext>();
    let playing = state().is_playing;

    rsx! {
        div {
            class: "play-btn",
            onclick: move |evt: MouseEvent| {
                evt.stop_propagation();
                toggle_play(id, state);
            },
            div { class: if playing { "play-icon playing" } else { "play-icon" },
                if playing {
                    Icon { name: "pause".to_string(), class: "icon".to_string() }
                } else {
                    Icon { name: "play".to_string(), class: "icon".to_string() }
                }
            }
        }
    }
}

/// Click or drag anywhere on the bar to seek. Dragging continues outside the
/// bar through document-level listeners.
#[component]
pub(super) fn ProgressBar() -> Element {
    let PlayerContext { id, mut state, .. } = use_context::<PlayerContext>();
    let percent = state().progress_percent();
    let container_id = media::progress_element_id(id);

    rsx! {
        div {
            id: "{container_id}",
            class: "progress-container",
            onclick: move |evt: MouseEvent| {
                seek_at_pointer(id, state, evt.client_coordinates().x);
            },
            onmousedown: move |evt: MouseEvent| {
                state.write().begin_drag();
                seek_at_pointer(id, state, evt.client_coordinates().x);
            },
            div { class: "progress-bar", style: "width: {percent}%;" }
        }
    }
}

#[component]
pub(super) fn MuteButton() -> Element {
    let PlayerContext { id, state, .. } = use_context::<PlayerContext>();
    let muted = state().muted;

    rsx! {
        button {
            r#type: "button",
            class: "control-btn",
            title: if muted { "Unmute" } else { "Mute" },
            onclick: move |_| toggle_mute(id, state),
            if muted {
                Icon { name: "volume-muted".to_string(), class: "icon".to_string() }
            } else {
                Icon { name: "volume".to_string(), class: "icon".to_string() }
            }
        }
    }
}

#[component]
pub(super) fn VolumeSlider() -> Element {
    let PlayerContext { id, state, store } = use_context::<PlayerContext>();
    let percent = state().volume_percent();

    let on_volume_input = move |e: Event<FormData>| {
        if let Ok(val) = e.value().parse::<f64>() {
            change_volume(id, state, &store, val / 100.0);
        }
    };

    rsx! {
        input {
            r#type: "range",
            class: "volume-slider",
            min: "0",
            max: "100",
            value: "{percent}",
            oninput: on_volume_input,
        }
        span { class: "volume-display", "{percent}" }
    }
}
