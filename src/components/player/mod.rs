use crate::components::{sleep_ms, AUTOPLAY_DELAY_MS, POLL_INTERVAL_MS};
use crate::config::PlayerConfig;
use crate::error::StoreError;
use crate::media::{self, PlayRejection};
use crate::registry::{self, InstanceId, PlayerCommand};
use crate::state::{format_time, pointer_ratio, PlayerState, ResumePlan};
use crate::storage::{PlaybackSnapshot, PlayerStore};
use dioxus::prelude::*;
use std::cell::RefCell;
use std::rc::Rc;
use tracing::{debug, info, warn};

mod controls;
#[cfg(target_arch = "wasm32")]
mod document_listeners;

use controls::{MuteButton, PlayPauseButton, ProgressBar, VolumeSlider};

/// Shared with the control components of one player.
#[derive(Clone, PartialEq)]
pub(crate) struct PlayerContext {
    pub id: InstanceId,
    pub state: Signal<PlayerState>,
    pub store: PlayerStore,
}

/// Latest record to persist when the player goes away.
pub(crate) type SnapshotMirror = Rc<RefCell<PlaybackSnapshot>>;

#[component]
pub fn MusicPlayer(id: InstanceId, config: PlayerConfig) -> Element {
    let store = use_hook(PlayerStore::platform);
    let (initial, plan) = use_hook(|| restore(id, &config, &store));
    let mut state = use_signal(|| initial);
    {
        let store = store.clone();
        use_context_provider(|| PlayerContext { id, state, store });
    }

    let mirror: SnapshotMirror =
        use_hook(|| Rc::new(RefCell::new(state.peek().snapshot(&config.src))));

    // Push the restored volume into the element once it exists.
    use_effect(move || {
        let current = state.peek();
        media::set_volume(id, current.volume);
        media::set_muted(id, current.muted);
    });

    {
        let mirror = mirror.clone();
        let configured_src = config.src.clone();
        use_effect(move || {
            *mirror.borrow_mut() = state.read().snapshot(&configured_src);
        });
    }

    use_future(move || async move {
        if plan.autoplay {
            sleep_ms(AUTOPLAY_DELAY_MS).await;
            info!(instance = id, "autoplay");
            play(id, state).await;
        }
    });

    {
        let store = store.clone();
        let mirror = mirror.clone();
        let configured_src = config.src.clone();
        use_future(move || {
            let store = store.clone();
            let mirror = mirror.clone();
            let configured_src = configured_src.clone();
            async move {
                loop {
                    sleep_ms(POLL_INTERVAL_MS).await;
                    let drained = registry::drain_player(id);
                    for command in drained.commands {
                        apply_command(id, state, &store, command);
                    }
                    if drained.closing {
                        // The removal may land before effects run again.
                        *mirror.borrow_mut() = state.peek().snapshot(&configured_src);
                        registry::release(id);
                        break;
                    }
                }
            }
        });
    }

    #[cfg(target_arch = "wasm32")]
    {
        let listeners = use_hook(|| {
            Rc::new(document_listeners::DocumentListeners::attach(
                id,
                state,
                store.clone(),
                mirror.clone(),
            ))
        });
        use_drop(move || {
            if let Some(listeners) = &*listeners {
                listeners.detach();
            }
        });
    }

    {
        let store = store.clone();
        let mirror = mirror.clone();
        use_drop(move || persist_snapshot(id, &store, &mirror.borrow()));
    }

    let current = state();
    let mut root_class = String::from("wp-music-player");
    if current.is_playing {
        root_class.push_str(" playing");
    }
    if config.fixed {
        root_class.push_str(" fixed");
    }
    if config.mini {
        root_class.push_str(" mini");
    }
    let cover_style = config.cover_style().unwrap_or_default();
    let theme = config.theme.clone();
    let audio_id = media::audio_element_id(id);
    let title = current.title.clone();
    let artist = current.artist.clone();
    let src = current.src.clone();
    let elapsed = format_time(current.current_time);
    let total = format_time(current.duration);

    rsx! {
        div { class: "{root_class}", style: "--wp-theme: {theme};",
            div { class: "player-cover", style: "{cover_style}", PlayPauseButton {} }
            div { class: "player-info",
                div { class: "song-title", "{title}" }
                div { class: "song-artist", "{artist}" }
                ProgressBar {}
                div { class: "time-display",
                    span { "{elapsed}" }
                    span { "{total}" }
                }
                div { class: "controls",
                    MuteButton {}
                    VolumeSlider {}
                }
            }
        }
        audio {
            id: "{audio_id}",
            preload: "metadata",
            r#loop: config.loop_playback,
            src: "{src}",
            onplay: move |_| state.write().mark_playing(),
            onpause: move |_| state.write().mark_stopped(),
            onended: move |_| state.write().mark_stopped(),
            ontimeupdate: move |_| {
                if let Some((time, duration)) = media::position(id) {
                    state.write().record_time(time, duration);
                }
            },
            onloadedmetadata: move |_| {
                if let Some((_, duration)) = media::position(id) {
                    state.write().record_duration(duration);
                }
                let pending = state.write().take_pending_seek();
                if let Some(at) = pending {
                    debug!(instance = id, at, "resuming position");
                    media::seek(id, at);
                }
            },
            onerror: move |_| {
                warn!(instance = id, src = %state.peek().src, "audio failed to load");
            },
            "Your browser does not support audio playback."
        }
    }
}

/// Initial state and autoplay decision from the persisted records.
fn restore(
    id: InstanceId,
    config: &PlayerConfig,
    store: &PlayerStore,
) -> (PlayerState, ResumePlan) {
    let stored = store.load_snapshot();
    match &stored {
        Err(StoreError::Json { .. }) => {
            warn!(instance = id, "discarding malformed playback snapshot");
            if let Err(err) = store.clear_snapshot() {
                debug!(instance = id, "could not clear snapshot: {err}");
            }
        }
        Err(err) => debug!(instance = id, "playback snapshot unavailable: {err}"),
        Ok(_) => {}
    }

    let plan = ResumePlan::resolve(config, &stored);
    info!(
        instance = id,
        src = %config.src,
        start_at = ?plan.start_at,
        autoplay = plan.autoplay,
        "restored playback state"
    );

    let mut state = PlayerState::new(config);
    state.resume_from(&plan);
    match store.load_volume() {
        Ok(Some(volume)) => {
            state.set_volume(volume);
        }
        Ok(None) => {}
        Err(err) => debug!(instance = id, "saved volume unavailable: {err}"),
    }
    (state, plan)
}

pub(crate) async fn play(id: InstanceId, mut state: Signal<PlayerState>) {
    match media::play(id).await {
        Ok(()) => state.write().mark_playing(),
        Err(PlayRejection::NotAllowed) => {
            info!(instance = id, "playback needs a user interaction with the page first");
        }
        Err(PlayRejection::MissingElement) => {
            debug!(instance = id, "no audio element to play");
        }
        Err(PlayRejection::Other(reason)) => {
            warn!(instance = id, "playback failed: {reason}");
        }
    }
}

pub(crate) fn pause(id: InstanceId, mut state: Signal<PlayerState>) {
    media::pause(id);
    state.write().mark_stopped();
}

pub(crate) fn toggle_play(id: InstanceId, state: Signal<PlayerState>) {
    if state.peek().is_playing {
        pause(id, state);
    } else {
        spawn(play(id, state));
    }
}

pub(crate) fn toggle_mute(id: InstanceId, mut state: Signal<PlayerState>) {
    let muted = state.write().toggle_muted();
    media::set_muted(id, muted);
}

pub(crate) fn change_volume(
    id: InstanceId,
    mut state: Signal<PlayerState>,
    store: &PlayerStore,
    volume: f64,
) {
    let volume = state.write().set_volume(volume);
    media::set_volume(id, volume);
    if let Err(err) = store.save_volume(volume) {
        debug!(instance = id, "could not persist volume: {err}");
    }
}

/// Seek to where the pointer sits over the progress bar.
pub(crate) fn seek_at_pointer(id: InstanceId, mut state: Signal<PlayerState>, client_x: f64) {
    let Some((left, width)) = media::progress_bounds(id) else {
        return;
    };
    let Some(ratio) = pointer_ratio(client_x, left, width) else {
        return;
    };
    let target = state.write().seek_to_ratio(ratio);
    if let Some(target) = target {
        media::seek(id, target);
    }
}

pub(crate) fn persist_snapshot(id: InstanceId, store: &PlayerStore, snapshot: &PlaybackSnapshot) {
    match store.save_snapshot(snapshot) {
        Ok(()) => debug!(instance = id, at = snapshot.current_time, "saved playback snapshot"),
        Err(err) => debug!(instance = id, "could not persist playback snapshot: {err}"),
    }
}

fn apply_command(
    id: InstanceId,
    mut state: Signal<PlayerState>,
    store: &PlayerStore,
    command: PlayerCommand,
) {
    match command {
        PlayerCommand::Play => {
            spawn(play(id, state));
        }
        PlayerCommand::Pause => pause(id, state),
        PlayerCommand::TogglePlay => toggle_play(id, state),
        PlayerCommand::ToggleMute => toggle_mute(id, state),
        PlayerCommand::SetVolume(volume) => change_volume(id, state, store, volume),
        PlayerCommand::SetTitle(title) => state.write().title = title,
        PlayerCommand::SetArtist(artist) => state.write().artist = artist,
        PlayerCommand::SetSrc(src) => state.write().src = src,
    }
}
