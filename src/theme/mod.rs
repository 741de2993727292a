//! Theme resolution: light/dark presentation state and theme-aware covers
//!
//! Server-rendered output is produced before the client knows the visitor's
//! color scheme, so theme-dependent choices wait for [`Readiness::Mounted`].
//! Until then the light-first ordering is used, which is also what the
//! static HTML contains.

use serde::Serialize;

use crate::content::{Covers, Post};

/// Presentation theme
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum ThemeMode {
    #[default]
    Light,
    Dark,
}

/// Whether client-side hydration has completed
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Readiness {
    #[default]
    Pending,
    Mounted,
}

/// Theme state owned by a rendered page
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ThemeState {
    pub mode: ThemeMode,
    pub readiness: Readiness,
}

impl ThemeState {
    /// State of server-rendered output
    pub fn server() -> Self {
        Self::default()
    }

    /// State after hydration with the resolved mode
    pub fn mounted(mode: ThemeMode) -> Self {
        Self {
            mode,
            readiness: Readiness::Mounted,
        }
    }

    /// Mark hydration complete, keeping the current mode
    pub fn mount(&mut self) {
        self.readiness = Readiness::Mounted;
    }

    /// Flip light/dark
    pub fn toggle(&mut self) {
        self.mode = match self.mode {
            ThemeMode::Light => ThemeMode::Dark,
            ThemeMode::Dark => ThemeMode::Light,
        };
    }

    /// Back to the pre-hydration state, as on navigation
    pub fn reset(&mut self) {
        *self = Self::default();
    }

    /// Mode that theme-dependent choices may use
    pub fn effective_mode(&self) -> ThemeMode {
        match self.readiness {
            Readiness::Mounted => self.mode,
            Readiness::Pending => ThemeMode::Light,
        }
    }

    pub fn is_dark(&self) -> bool {
        self.effective_mode() == ThemeMode::Dark
    }
}

/// Pick the cover for the current theme
pub fn select_cover<'a>(covers: &'a Covers, state: &ThemeState) -> Option<&'a str> {
    match state.effective_mode() {
        ThemeMode::Dark => covers.dark_first(),
        ThemeMode::Light => covers.light_first(),
    }
}

/// Cover of a post for the current theme
pub fn post_cover<'a>(post: &'a Post, state: &ThemeState) -> Option<&'a str> {
    select_cover(&post.covers, state)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn covers() -> Covers {
        Covers {
            default: None,
            light: Some("L".to_string()),
            dark: Some("D".to_string()),
        }
    }

    #[test]
    fn test_dark_mounted_prefers_dark() {
        let state = ThemeState::mounted(ThemeMode::Dark);
        assert_eq!(select_cover(&covers(), &state), Some("D"));
    }

    #[test]
    fn test_light_mounted_prefers_light() {
        let state = ThemeState::mounted(ThemeMode::Light);
        assert_eq!(select_cover(&covers(), &state), Some("L"));
    }

    #[test]
    fn test_unmounted_ignores_theme() {
        for mode in [ThemeMode::Light, ThemeMode::Dark] {
            let state = ThemeState {
                mode,
                readiness: Readiness::Pending,
            };
            assert_eq!(select_cover(&covers(), &state), Some("L"));
        }
    }

    #[test]
    fn test_fallback_chain() {
        let dark_only = Covers {
            dark: Some("D".to_string()),
            default: Some("C".to_string()),
            ..Default::default()
        };
        assert_eq!(
            select_cover(&dark_only, &ThemeState::mounted(ThemeMode::Light)),
            Some("D")
        );

        let generic = Covers {
            default: Some("C".to_string()),
            ..Default::default()
        };
        assert_eq!(
            select_cover(&generic, &ThemeState::mounted(ThemeMode::Dark)),
            Some("C")
        );
        assert_eq!(select_cover(&Covers::default(), &ThemeState::server()), None);
    }

    #[test]
    fn test_toggle_mount_and_reset() {
        let mut state = ThemeState::server();
        state.toggle();
        assert!(!state.is_dark());
        state.mount();
        assert!(state.is_dark());
        state.reset();
        assert_eq!(state, ThemeState::server());
    }
}
