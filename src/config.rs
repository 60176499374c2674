//! Player configuration parsed from an options object, a JSON config script,
//! or the attributes of a `<wp-music-player>` tag.

use crate::error::ConfigError;
use serde::{Deserialize, Deserializer};
use serde_json::Value;

pub const DEFAULT_TITLE: &str = "My Music";
pub const DEFAULT_ARTIST: &str = "Artist";
pub const DEFAULT_VOLUME: f64 = 0.5;
pub const DEFAULT_THEME: &str = "#ff6b6b";

/// Immutable configuration of one player instance.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayerConfig {
    pub src: String,
    pub title: String,
    pub artist: String,
    pub cover: Option<String>,
    pub loop_playback: bool,
    pub autoplay: bool,
    pub volume: f64,
    pub fixed: bool,
    pub mini: bool,
    pub theme: String,
}

impl Default for PlayerConfig {
    fn default() -> Self {
        Self {
            src: String::new(),
            title: DEFAULT_TITLE.to_string(),
            artist: DEFAULT_ARTIST.to_string(),
            cover: None,
            loop_playback: true,
            autoplay: false,
            volume: DEFAULT_VOLUME,
            fixed: true,
            mini: true,
            theme: DEFAULT_THEME.to_string(),
        }
    }
}

/// Options as the page hands them over; every key is optional.
///
/// Pages often generate the options server-side, so values arrive loosely
/// typed (`"volume":"0.6"`, `"autoplay":"1"`). A value that cannot be read
/// counts as missing rather than rejecting the whole object.
#[derive(Debug, Default, Deserialize)]
struct RawOptions {
    #[serde(default, deserialize_with = "loose_text")]
    src: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    title: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    artist: Option<String>,
    #[serde(default, deserialize_with = "loose_text")]
    cover: Option<String>,
    #[serde(default, rename = "loop", deserialize_with = "loose_flag")]
    loop_playback: Option<bool>,
    #[serde(default, deserialize_with = "loose_flag")]
    autoplay: Option<bool>,
    #[serde(default, deserialize_with = "loose_number")]
    volume: Option<f64>,
    #[serde(default, deserialize_with = "loose_flag")]
    fixed: Option<bool>,
    #[serde(default, deserialize_with = "loose_flag")]
    mini: Option<bool>,
    #[serde(default, deserialize_with = "loose_text")]
    theme: Option<String>,
}

fn loose_text<'de, D>(deserializer: D) -> Result<Option<String>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::String(text) => Some(text),
        Value::Number(number) => Some(number.to_string()),
        _ => None,
    })
}

/// Booleans, numbers (non-zero is on) and the usual spellings in strings.
fn loose_flag<'de, D>(deserializer: D) -> Result<Option<bool>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Bool(flag) => Some(flag),
        Value::Number(number) => number.as_f64().map(|n| n != 0.0),
        Value::String(text) => match text.trim().to_ascii_lowercase().as_str() {
            "true" | "1" | "yes" | "on" => Some(true),
            "false" | "0" | "no" | "off" => Some(false),
            _ => None,
        },
        _ => None,
    })
}

fn loose_number<'de, D>(deserializer: D) -> Result<Option<f64>, D::Error>
where
    D: Deserializer<'de>,
{
    Ok(match Value::deserialize(deserializer)? {
        Value::Number(number) => number.as_f64(),
        Value::String(text) => text.trim().parse::<f64>().ok(),
        _ => None,
    })
}

impl From<RawOptions> for PlayerConfig {
    fn from(raw: RawOptions) -> Self {
        let defaults = PlayerConfig::default();
        Self {
            src: raw.src.unwrap_or_default(),
            title: non_empty(raw.title).unwrap_or(defaults.title),
            artist: non_empty(raw.artist).unwrap_or(defaults.artist),
            cover: non_empty(raw.cover),
            loop_playback: raw.loop_playback.unwrap_or(defaults.loop_playback),
            autoplay: raw.autoplay.unwrap_or(defaults.autoplay),
            volume: normalize_volume(raw.volume),
            fixed: raw.fixed.unwrap_or(defaults.fixed),
            mini: raw.mini.unwrap_or(defaults.mini),
            theme: non_empty(raw.theme)
                .filter(|t| is_safe_css_value(t))
                .unwrap_or(defaults.theme),
        }
    }
}

impl PlayerConfig {
    /// Parse a JSON options object, e.g. the body of a
    /// `<script data-wp-music-config>` block.
    pub fn from_json(json: &str) -> Result<Self, ConfigError> {
        let value: serde_json::Value = serde_json::from_str(json)?;
        if !value.is_object() {
            return Err(ConfigError::NotAnObject);
        }
        let raw: RawOptions = serde_json::from_value(value)?;
        Ok(raw.into())
    }

    /// Build a configuration from tag attributes.
    ///
    /// Flags that default to on (`loop`, `fixed`, `mini`) are only switched off
    /// by the literal `false`; `autoplay` is only switched on by `true`.
    pub fn from_attributes<F>(attr: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let raw = RawOptions {
            src: attr("src"),
            title: attr("title"),
            artist: attr("artist"),
            cover: attr("cover"),
            loop_playback: Some(attr("loop").as_deref() != Some("false")),
            autoplay: Some(attr("autoplay").as_deref() == Some("true")),
            volume: attr("volume").and_then(|v| v.trim().parse::<f64>().ok()),
            fixed: Some(attr("fixed").as_deref() != Some("false")),
            mini: Some(attr("mini").as_deref() != Some("false")),
            theme: attr("theme"),
        };
        raw.into()
    }

    /// Inline style for the cover area, if a cover is configured.
    pub fn cover_style(&self) -> Option<String> {
        self.cover.as_ref().map(|url| {
            format!(
                "background-image: url('{}'); background-size: cover; background-position: center;",
                escape_css_url(url)
            )
        })
    }
}

fn non_empty(value: Option<String>) -> Option<String> {
    value.filter(|v| !v.trim().is_empty())
}

fn normalize_volume(volume: Option<f64>) -> f64 {
    match volume {
        Some(v) if v.is_finite() => v.clamp(0.0, 1.0),
        _ => DEFAULT_VOLUME,
    }
}

/// Colors end up inside a `style` attribute; anything that could close the
/// declaration is rejected.
fn is_safe_css_value(value: &str) -> bool {
    value
        .chars()
        .all(|c| {
            c.is_ascii_alphanumeric() || matches!(c, '#' | '(' | ')' | ',' | '.' | '%' | ' ' | '-')
        })
}

fn escape_css_url(url: &str) -> String {
    url.replace('\\', "%5C")
        .replace('\'', "%27")
        .replace('"', "%22")
        .replace('\n', "")
        .replace('\r', "")
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;

    fn attrs(pairs: &[(&str, &str)]) -> impl Fn(&str) -> Option<String> {
        let map: HashMap<String, String> = pairs
            .iter()
            .map(|(k, v)| (k.to_string(), v.to_string()))
            .collect();
        move |name| map.get(name).cloned()
    }

    #[test]
    fn empty_object_yields_defaults() {
        let config = PlayerConfig::from_json("{}").unwrap();
        assert_eq!(config, PlayerConfig::default());
        assert!(config.loop_playback);
        assert!(!config.autoplay);
        assert_eq!(config.volume, 0.5);
    }

    #[test]
    fn json_options_are_applied() {
        let config = PlayerConfig::from_json(
            r#"{"src":"/a.mp3","title":"Song","artist":"Band","cover":"/c.jpg",
                "loop":false,"autoplay":true,"volume":0.8,"fixed":false,"mini":false,
                "theme":"rgb(10, 20, 30)"}"#,
        )
        .unwrap();
        assert_eq!(config.src, "/a.mp3");
        assert_eq!(config.title, "Song");
        assert_eq!(config.artist, "Band");
        assert_eq!(config.cover.as_deref(), Some("/c.jpg"));
        assert!(!config.loop_playback);
        assert!(config.autoplay);
        assert_eq!(config.volume, 0.8);
        assert!(!config.fixed);
        assert!(!config.mini);
        assert_eq!(config.theme, "rgb(10, 20, 30)");
    }

    #[test]
    fn empty_strings_fall_back_to_defaults() {
        let config = PlayerConfig::from_json(r#"{"title":"","artist":"  ","cover":""}"#).unwrap();
        assert_eq!(config.title, DEFAULT_TITLE);
        assert_eq!(config.artist, DEFAULT_ARTIST);
        assert!(config.cover.is_none());
    }

    #[test]
    fn volume_is_clamped() {
        assert_eq!(PlayerConfig::from_json(r#"{"volume":3}"#).unwrap().volume, 1.0);
        assert_eq!(PlayerConfig::from_json(r#"{"volume":-1}"#).unwrap().volume, 0.0);
        assert_eq!(PlayerConfig::from_json(r#"{"volume":0}"#).unwrap().volume, 0.0);
    }

    #[test]
    fn non_object_json_is_rejected() {
        assert!(matches!(
            PlayerConfig::from_json("[1,2]"),
            Err(ConfigError::NotAnObject)
        ));
        assert!(matches!(
            PlayerConfig::from_json("{not json"),
            Err(ConfigError::Json(_))
        ));
    }

    #[test]
    fn unsafe_theme_is_replaced() {
        let config =
            PlayerConfig::from_json(r#"{"theme":"red; background: url(x)"}"#).unwrap();
        assert_eq!(config.theme, DEFAULT_THEME);
    }

    #[test]
    fn attribute_flags_follow_literal_values() {
        let config = PlayerConfig::from_attributes(attrs(&[]));
        assert!(config.loop_playback);
        assert!(!config.autoplay);
        assert!(config.fixed);
        assert!(config.mini);

        let config = PlayerConfig::from_attributes(attrs(&[
            ("loop", "false"),
            ("autoplay", "true"),
            ("fixed", "false"),
            ("mini", "no"),
        ]));
        assert!(!config.loop_playback);
        assert!(config.autoplay);
        assert!(!config.fixed);
        assert!(config.mini);

        let config = PlayerConfig::from_attributes(attrs(&[("autoplay", "yes")]));
        assert!(!config.autoplay);
    }

    #[test]
    fn attribute_volume_parsing() {
        let config = PlayerConfig::from_attributes(attrs(&[("volume", "0.3")]));
        assert_eq!(config.volume, 0.3);
        let config = PlayerConfig::from_attributes(attrs(&[("volume", "loud")]));
        assert_eq!(config.volume, DEFAULT_VOLUME);
    }

    #[test]
    fn loosely_typed_options_are_coerced() {
        let config = PlayerConfig::from_json(
            r#"{"src":"/a.mp3","title":"Song","volume":"0.6","autoplay":"1",
                "loop":0,"mini":"false"}"#,
        )
        .unwrap();
        assert_eq!(config.src, "/a.mp3");
        assert_eq!(config.title, "Song");
        assert_eq!(config.volume, 0.6);
        assert!(config.autoplay);
        assert!(!config.loop_playback);
        assert!(!config.mini);
        assert!(config.fixed);

        let config = PlayerConfig::from_json(r#"{"autoplay":1,"fixed":"yes"}"#).unwrap();
        assert!(config.autoplay);
        assert!(config.fixed);
    }

    #[test]
    fn unreadable_values_fall_back_without_rejecting_the_rest() {
        let config = PlayerConfig::from_json(
            r#"{"src":"/b.mp3","volume":"loud","autoplay":[true],"loop":"maybe","title":{"x":1},
                "artist":null}"#,
        )
        .unwrap();
        assert_eq!(config.src, "/b.mp3");
        assert_eq!(config.volume, DEFAULT_VOLUME);
        assert!(!config.autoplay);
        assert!(config.loop_playback);
        assert_eq!(config.title, DEFAULT_TITLE);
        assert_eq!(config.artist, DEFAULT_ARTIST);
    }

    #[test]
    fn cover_style_escapes_quotes() {
        let config = PlayerConfig {
            cover: Some("/img/it's.jpg".to_string()),
            ..PlayerConfig::default()
        };
        let style = config.cover_style().unwrap();
        assert!(style.contains("url('/img/it%27s.jpg')"));
        assert!(PlayerConfig::default().cover_style().is_none());
    }
}
