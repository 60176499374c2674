//! Page-facing surface: the `<wp-music-player>` tag, the global
//! `WPMusicPlayer` constructor, and `<script data-wp-music-config>`
//! auto-initialization. Everything here only talks to the registry.
#![cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]

use crate::config::PlayerConfig;
use crate::error::ConfigError;
use crate::registry::{self, InstanceId, PlayerCommand};

pub const ELEMENT_TAG: &str = "wp-music-player";
pub const GLOBAL_CONSTRUCTOR: &str = "WPMusicPlayer";
pub const INITIALIZED_FLAG: &str = "wpMusicPlayerInitialized";
pub const CONFIG_SCRIPT_SELECTOR: &str = "script[data-wp-music-config]";
pub const MOUNT_ROOT_ID: &str = "wp-music-player-root";

/// Start a player from a JSON options object.
pub fn create_from_json(json: &str) -> Result<InstanceId, ConfigError> {
    let config = PlayerConfig::from_json(json)?;
    Ok(registry::mount(config))
}

/// Scriptable handle returned by the global constructor.
#[cfg_attr(
    target_arch = "wasm32",
    wasm_bindgen::prelude::wasm_bindgen(js_name = WPMusicPlayerHandle)
)]
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PlayerHandle {
    id: InstanceId,
}

impl PlayerHandle {
    pub fn new(id: InstanceId) -> Self {
        Self { id }
    }

    fn send(&self, command: PlayerCommand) {
        if !registry::send(self.id, command) {
            tracing::debug!(instance = self.id, "ignoring call on a destroyed player");
        }
    }
}

#[cfg_attr(
    target_arch = "wasm32",
    wasm_bindgen::prelude::wasm_bindgen(js_class = WPMusicPlayerHandle)
)]
impl PlayerHandle {
    #[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen(getter))]
    pub fn id(&self) -> InstanceId {
        self.id
    }

    pub fn play(&self) {
        self.send(PlayerCommand::Play);
    }

    pub fn pause(&self) {
        self.send(PlayerCommand::Pause);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen(js_name = togglePlay))]
    pub fn toggle_play(&self) {
        self.send(PlayerCommand::TogglePlay);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen(js_name = toggleMute))]
    pub fn toggle_mute(&self) {
        self.send(PlayerCommand::ToggleMute);
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen(js_name = setVolume))]
    pub fn set_volume(&self, volume: f64) {
        self.send(PlayerCommand::SetVolume(volume));
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen(js_name = setTitle))]
    pub fn set_title(&self, title: String) {
        self.send(PlayerCommand::SetTitle(title));
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen(js_name = setArtist))]
    pub fn set_artist(&self, artist: String) {
        self.send(PlayerCommand::SetArtist(artist));
    }

    #[cfg_attr(target_arch = "wasm32", wasm_bindgen::prelude::wasm_bindgen(js_name = setSrc))]
    pub fn set_src(&self, src: String) {
        self.send(PlayerCommand::SetSrc(src));
    }

    /// Persists the playback snapshot and removes the player from the page.
    /// Calls made before this one still take effect.
    pub fn destroy(&self) {
        if !registry::unmount(self.id) {
            tracing::debug!(instance = self.id, "player already destroyed");
        }
    }
}

#[cfg(target_arch = "wasm32")]
pub use browser::{already_installed, ensure_mount_root, install};

#[cfg(target_arch = "wasm32")]
mod browser {
    use super::*;
    use tracing::{info, warn};
    use wasm_bindgen::{closure::Closure, prelude::*, JsCast};
    use web_sys::{window, Element};

    #[wasm_bindgen(inline_js = r#"
export function define_player_element(tag, connect, disconnect) {
    if (typeof customElements === 'undefined' || customElements.get(tag)) {
        return false;
    }
    class PlayerElement extends HTMLElement {
        connectedCallback() {
            if (this.__playerId === undefined) {
                this.__playerId = connect(this);
            }
        }
        disconnectedCallback() {
            if (this.__playerId !== undefined) {
                disconnect(this.__playerId);
                this.__playerId = undefined;
            }
        }
    }
    customElements.define(tag, PlayerElement);
    return true;
}

export function expose_constructor(name, factory) {
    window[name] = function (options) { return factory(options); };
}
"#)]
    extern "C" {
        fn define_player_element(
            tag: &str,
            connect: &js_sys::Function,
            disconnect: &js_sys::Function,
        ) -> bool;
        fn expose_constructor(name: &str, factory: &js_sys::Function);
    }

    pub fn already_installed() -> bool {
        window()
            .and_then(|w| js_sys::Reflect::get(&w, &JsValue::from_str(INITIALIZED_FLAG)).ok())
            .map(|flag| flag.is_truthy())
            .unwrap_or(false)
    }

    /// The Dioxus root every player renders into, appended to `<body>`.
    pub fn ensure_mount_root() -> Option<()> {
        let document = window()?.document()?;
        if document.get_element_by_id(MOUNT_ROOT_ID).is_some() {
            return Some(());
        }
        let root = document.create_element("div").ok()?;
        root.set_id(MOUNT_ROOT_ID);
        document.body()?.append_child(&root).ok()?;
        Some(())
    }

    /// Register the tag, the global constructor and auto-initialization.
    pub fn install() {
        if already_installed() {
            return;
        }
        register_element();
        register_constructor();
        schedule_auto_init();
        if let Some(w) = window() {
            let _ = js_sys::Reflect::set(&w, &JsValue::from_str(INITIALIZED_FLAG), &JsValue::TRUE);
        }
        info!("music widget installed");
    }

    fn register_element() {
        let connect = Closure::wrap(Box::new(move |element: Element| -> InstanceId {
            let config = PlayerConfig::from_attributes(|name| element.get_attribute(name));
            registry::mount(config)
        }) as Box<dyn FnMut(Element) -> InstanceId>);
        let disconnect = Closure::wrap(Box::new(move |id: InstanceId| {
            registry::unmount(id);
        }) as Box<dyn FnMut(InstanceId)>);

        let defined = define_player_element(
            ELEMENT_TAG,
            connect.as_ref().unchecked_ref(),
            disconnect.as_ref().unchecked_ref(),
        );
        if !defined {
            warn!("custom element <{ELEMENT_TAG}> unavailable or already defined");
        }
        connect.forget();
        disconnect.forget();
    }

    fn register_constructor() {
        let factory = Closure::wrap(Box::new(move |options: JsValue| -> Result<JsValue, JsValue> {
            let json = options_to_json(&options)?;
            let id = create_from_json(&json)
                .map_err(|e| JsValue::from(JsError::new(&e.to_string())))?;
            Ok(JsValue::from(PlayerHandle::new(id)))
        }) as Box<dyn FnMut(JsValue) -> Result<JsValue, JsValue>>);
        expose_constructor(GLOBAL_CONSTRUCTOR, factory.as_ref().unchecked_ref());
        factory.forget();
    }

    fn options_to_json(options: &JsValue) -> Result<String, JsValue> {
        if options.is_undefined() || options.is_null() {
            return Ok("{}".to_string());
        }
        if !options.is_object() {
            return Err(JsError::new(&ConfigError::NotAnObject.to_string()).into());
        }
        let json = js_sys::JSON::stringify(options)?;
        Ok(String::from(json))
    }

    fn schedule_auto_init() {
        let Some(document) = window().and_then(|w| w.document()) else {
            return;
        };
        if document.ready_state() != "loading" {
            auto_init();
            return;
        }
        let on_ready = Closure::once_into_js(auto_init);
        let _ = document
            .add_event_listener_with_callback("DOMContentLoaded", on_ready.unchecked_ref());
    }

    fn auto_init() {
        let Some(document) = window().and_then(|w| w.document()) else {
            return;
        };
        let Ok(Some(script)) = document.query_selector(CONFIG_SCRIPT_SELECTOR) else {
            return;
        };
        let text = script.text_content().unwrap_or_default();
        match create_from_json(&text) {
            Ok(id) => info!(instance = id, "player created from config script"),
            Err(err) => warn!("ignoring config script: {err}"),
        }
    }
}
