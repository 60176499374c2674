// Thin pass-through calls to the native audio element of one player instance.
use crate::registry::InstanceId;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen::JsCast;
#[cfg(target_arch = "wasm32")]
use web_sys::{window, HtmlAudioElement};

pub fn audio_element_id(id: InstanceId) -> String {
    format!("wp-audio-player-{id}")
}

pub fn progress_element_id(id: InstanceId) -> String {
    format!("wp-progress-container-{id}")
}

/// Why `play()` did not start playback.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
#[derive(Debug, Clone, PartialEq)]
pub enum PlayRejection {
    /// Autoplay policy: the user has not interacted with the page yet.
    NotAllowed,
    Other(String),
    MissingElement,
}

#[cfg(target_arch = "wasm32")]
fn audio_element(id: InstanceId) -> Option<HtmlAudioElement> {
    let document = window()?.document()?;
    document
        .get_element_by_id(&audio_element_id(id))?
        .dyn_into::<HtmlAudioElement>()
        .ok()
}

/// Ask the element to play and wait for the browser's verdict.
#[cfg(target_arch = "wasm32")]
pub async fn play(id: InstanceId) -> Result<(), PlayRejection> {
    let Some(audio) = audio_element(id) else {
        return Err(PlayRejection::MissingElement);
    };
    let promise = audio.play().map_err(rejection_from_js)?;
    wasm_bindgen_futures::JsFuture::from(promise)
        .await
        .map(|_| ())
        .map_err(rejection_from_js)
}

#[cfg(target_arch = "wasm32")]
fn rejection_from_js(err: wasm_bindgen::JsValue) -> PlayRejection {
    match err.dyn_ref::<web_sys::DomException>() {
        Some(ex) if ex.name() == "NotAllowedError" => PlayRejection::NotAllowed,
        Some(ex) => PlayRejection::Other(format!("{}: {}", ex.name(), ex.message())),
        None => PlayRejection::Other(format!("{err:?}")),
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub async fn play(_id: InstanceId) -> Result<(), PlayRejection> {
    Err(PlayRejection::MissingElement)
}

#[cfg(target_arch = "wasm32")]
pub fn pause(id: InstanceId) {
    if let Some(audio) = audio_element(id) {
        let _ = audio.pause();
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn pause(_id: InstanceId) {}

#[cfg(target_arch = "wasm32")]
pub fn seek(id: InstanceId, position: f64) {
    if let Some(audio) = audio_element(id) {
        audio.set_current_time(position.max(0.0));
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn seek(_id: InstanceId, _position: f64) {}

#[cfg(target_arch = "wasm32")]
pub fn set_volume(id: InstanceId, volume: f64) {
    if let Some(audio) = audio_element(id) {
        audio.set_volume(volume.clamp(0.0, 1.0));
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn set_volume(_id: InstanceId, _volume: f64) {}

#[cfg(target_arch = "wasm32")]
pub fn set_muted(id: InstanceId, muted: bool) {
    if let Some(audio) = audio_element(id) {
        audio.set_muted(muted);
    }
}

#[cfg(not(target_arch = "wasm32"))]
pub fn set_muted(_id: InstanceId, _muted: bool) {}

/// `(current_time, duration)`; duration is NaN until metadata loads.
#[cfg(target_arch = "wasm32")]
pub fn position(id: InstanceId) -> Option<(f64, f64)> {
    audio_element(id).map(|a| (a.current_time(), a.duration()))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn position(_id: InstanceId) -> Option<(f64, f64)> {
    None
}

/// Horizontal extent `(left, width)` of the progress bar in client pixels.
#[cfg(target_arch = "wasm32")]
pub fn progress_bounds(id: InstanceId) -> Option<(f64, f64)> {
    let document = window()?.document()?;
    let rect = document
        .get_element_by_id(&progress_element_id(id))?
        .get_bounding_client_rect();
    Some((rect.left(), rect.width()))
}

#[cfg(not(target_arch = "wasm32"))]
pub fn progress_bounds(_id: InstanceId) -> Option<(f64, f64)> {
    None
}
