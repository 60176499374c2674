//! Explicit player state the view renders from.
//!
//! Native media events and user input are applied here as plain method calls,
//! so every transition can be exercised without a browser.

use crate::config::PlayerConfig;
use crate::error::StoreError;
use crate::storage::PlaybackSnapshot;

/// Where playback starts and whether it starts on its own.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct ResumePlan {
    pub start_at: Option<f64>,
    pub autoplay: bool,
}

impl ResumePlan {
    /// Decide from the stored snapshot. A snapshot only counts when it was
    /// written for the same source; anything else falls back to the
    /// configured autoplay flag.
    pub fn resolve(
        config: &PlayerConfig,
        stored: &Result<Option<PlaybackSnapshot>, StoreError>,
    ) -> Self {
        match stored {
            Ok(Some(snapshot)) if snapshot.src == config.src => Self {
                start_at: Some(snapshot.current_time)
                    .filter(|t| t.is_finite() && *t > 0.0),
                autoplay: snapshot.is_playing,
            },
            _ => Self {
                start_at: None,
                autoplay: config.autoplay,
            },
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct PlayerState {
    pub title: String,
    pub artist: String,
    pub src: String,
    pub is_playing: bool,
    pub is_dragging: bool,
    pub current_time: f64,
    pub duration: f64,
    pub volume: f64,
    pub muted: bool,
    pending_seek: Option<f64>,
}

impl PlayerState {
    pub fn new(config: &PlayerConfig) -> Self {
        Self {
            title: config.title.clone(),
            artist: config.artist.clone(),
            src: config.src.clone(),
            is_playing: false,
            is_dragging: false,
            current_time: 0.0,
            duration: 0.0,
            volume: config.volume,
            muted: false,
            pending_seek: None,
        }
    }

    /// Remember where to resume; applied once metadata is available.
    pub fn resume_from(&mut self, plan: &ResumePlan) {
        if let Some(at) = plan.start_at {
            self.pending_seek = Some(at);
            self.current_time = at;
        }
    }

    pub fn take_pending_seek(&mut self) -> Option<f64> {
        self.pending_seek.take()
    }

    pub fn mark_playing(&mut self) {
        self.is_playing = true;
    }

    /// `pause` and `ended` both land here.
    pub fn mark_stopped(&mut self) {
        self.is_playing = false;
    }

    pub fn record_duration(&mut self, duration: f64) {
        if duration.is_finite() && duration > 0.0 {
            self.duration = duration;
        }
    }

    /// Apply a `timeupdate`. Ignored while the user scrubs so the bar follows
    /// the pointer instead of the element.
    pub fn record_time(&mut self, current_time: f64, duration: f64) -> bool {
        if self.is_dragging {
            return false;
        }
        self.record_duration(duration);
        if current_time.is_finite() {
            self.current_time = current_time.max(0.0);
        }
        true
    }

    pub fn has_duration(&self) -> bool {
        self.duration.is_finite() && self.duration > 0.0
    }

    /// Progress in percent, 0 until the duration is known.
    pub fn progress_percent(&self) -> f64 {
        if !self.has_duration() {
            return 0.0;
        }
        (self.current_time / self.duration * 100.0).clamp(0.0, 100.0)
    }

    /// Target time for a ratio of the progress bar width.
    ///
    /// Returns `None` before the duration is known or when the pointer is
    /// outside the bar.
    pub fn seek_to_ratio(&mut self, ratio: f64) -> Option<f64> {
        if !self.has_duration() || !(0.0..=1.0).contains(&ratio) {
            return None;
        }
        let target = ratio * self.duration;
        self.current_time = target;
        Some(target)
    }

    pub fn begin_drag(&mut self) {
        self.is_dragging = true;
    }

    pub fn end_drag(&mut self) {
        self.is_dragging = false;
    }

    pub fn set_volume(&mut self, volume: f64) -> f64 {
        if volume.is_finite() {
            self.volume = volume.clamp(0.0, 1.0);
        }
        self.volume
    }

    pub fn volume_percent(&self) -> u32 {
        (self.volume * 100.0).round() as u32
    }

    pub fn toggle_muted(&mut self) -> bool {
        self.muted = !self.muted;
        self.muted
    }

    /// Record written on destroy. It is keyed by the configured source, not
    /// one swapped in later with `setSrc`, so the next page load with the
    /// same configuration finds it.
    pub fn snapshot(&self, configured_src: &str) -> PlaybackSnapshot {
        PlaybackSnapshot {
            src: configured_src.to_string(),
            current_time: self.current_time,
            is_playing: self.is_playing,
        }
    }
}

/// `m:ss`, minutes unpadded.
pub fn format_time(seconds: f64) -> String {
    if !seconds.is_finite() || seconds < 0.0 {
        return "0:00".to_string();
    }
    let total = seconds.floor() as u64;
    format!("{}:{:02}", total / 60, total % 60)
}

/// Ratio of a pointer's x position across an element starting at `left`.
pub fn pointer_ratio(client_x: f64, left: f64, width: f64) -> Option<f64> {
    if !(width.is_finite() && width > 0.0) {
        return None;
    }
    Some((client_x - left) / width)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(src: &str, autoplay: bool) -> PlayerConfig {
        PlayerConfig {
            src: src.to_string(),
            autoplay,
            ..PlayerConfig::default()
        }
    }

    fn snapshot(src: &str, at: f64, playing: bool) -> PlaybackSnapshot {
        PlaybackSnapshot {
            src: src.to_string(),
            current_time: at,
            is_playing: playing,
        }
    }

    fn loaded(duration: f64) -> PlayerState {
        let mut state = PlayerState::new(&PlayerConfig::default());
        state.record_duration(duration);
        state
    }

    #[test]
    fn test_format_time() {
        assert_eq!(format_time(0.0), "0:00");
        assert_eq!(format_time(5.9), "0:05");
        assert_eq!(format_time(65.0), "1:05");
        assert_eq!(format_time(3600.0), "60:00");
        assert_eq!(format_time(f64::NAN), "0:00");
        assert_eq!(format_time(f64::INFINITY), "0:00");
    }

    #[test]
    fn test_resume_matching_source() {
        let plan = ResumePlan::resolve(
            &config("/a.mp3", false),
            &Ok(Some(snapshot("/a.mp3", 42.0, true))),
        );
        assert_eq!(plan.start_at, Some(42.0));
        assert!(plan.autoplay);

        let plan = ResumePlan::resolve(
            &config("/a.mp3", true),
            &Ok(Some(snapshot("/a.mp3", 42.0, false))),
        );
        assert!(!plan.autoplay);
    }

    #[test]
    fn test_resume_other_source_uses_config() {
        let plan = ResumePlan::resolve(
            &config("/b.mp3", true),
            &Ok(Some(snapshot("/a.mp3", 42.0, false))),
        );
        assert_eq!(plan.start_at, None);
        assert!(plan.autoplay);
    }

    #[test]
    fn test_resume_storage_failure_uses_config() {
        let plan = ResumePlan::resolve(&config("/a.mp3", true), &Err(StoreError::Unavailable));
        assert_eq!(plan, ResumePlan { start_at: None, autoplay: true });

        let plan = ResumePlan::resolve(&config("/a.mp3", false), &Ok(None));
        assert_eq!(plan, ResumePlan { start_at: None, autoplay: false });
    }

    #[test]
    fn test_resume_position_applied_once() {
        let mut state = PlayerState::new(&config("/a.mp3", false));
        state.resume_from(&ResumePlan { start_at: Some(30.0), autoplay: false });
        assert_eq!(state.current_time, 30.0);
        assert_eq!(state.take_pending_seek(), Some(30.0));
        assert_eq!(state.take_pending_seek(), None);
    }

    #[test]
    fn test_play_pause_transitions() {
        let mut state = loaded(100.0);
        state.mark_playing();
        assert!(state.is_playing);
        state.mark_stopped();
        assert!(!state.is_playing);
    }

    #[test]
    fn test_timeupdate_ignored_while_dragging() {
        let mut state = loaded(100.0);
        assert!(state.record_time(10.0, 100.0));
        assert_eq!(state.progress_percent(), 10.0);

        state.begin_drag();
        assert!(!state.record_time(50.0, 100.0));
        assert_eq!(state.current_time, 10.0);

        state.end_drag();
        assert!(state.record_time(50.0, 100.0));
        assert_eq!(state.progress_percent(), 50.0);
    }

    #[test]
    fn test_progress_without_duration() {
        let mut state = PlayerState::new(&PlayerConfig::default());
        state.record_time(12.0, f64::NAN);
        assert_eq!(state.progress_percent(), 0.0);
        assert!(!state.has_duration());
    }

    #[test]
    fn test_seek_requires_duration_and_ratio_in_range() {
        let mut state = PlayerState::new(&PlayerConfig::default());
        assert_eq!(state.seek_to_ratio(0.5), None);

        let mut state = loaded(200.0);
        assert_eq!(state.seek_to_ratio(0.25), Some(50.0));
        assert_eq!(state.current_time, 50.0);
        assert_eq!(state.seek_to_ratio(1.2), None);
        assert_eq!(state.seek_to_ratio(-0.1), None);
        assert_eq!(state.current_time, 50.0);
    }

    #[test]
    fn test_pointer_ratio() {
        assert_eq!(pointer_ratio(150.0, 100.0, 200.0), Some(0.25));
        assert_eq!(pointer_ratio(50.0, 100.0, 200.0), Some(-0.25));
        assert_eq!(pointer_ratio(150.0, 100.0, 0.0), None);
    }

    #[test]
    fn test_volume_and_mute() {
        let mut state = PlayerState::new(&PlayerConfig::default());
        assert_eq!(state.volume_percent(), 50);
        assert_eq!(state.set_volume(37.0 / 100.0), 0.37);
        assert_eq!(state.volume_percent(), 37);
        assert_eq!(state.set_volume(1.5), 1.0);
        assert_eq!(state.set_volume(f64::NAN), 1.0);

        assert!(state.toggle_muted());
        assert!(!state.toggle_muted());
    }

    #[test]
    fn test_snapshot_keyed_by_configured_source() {
        let mut state = loaded(100.0);
        state.src = "/swapped.mp3".to_string();
        state.record_time(12.0, 100.0);
        state.mark_playing();
        assert_eq!(state.snapshot("/a.mp3"), snapshot("/a.mp3", 12.0, true));
    }
}
