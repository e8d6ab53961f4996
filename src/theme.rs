//! Theme preference: one persisted string, read once at startup, written on
//! every toggle. Storage failures are absorbed — the in-memory value keeps the
//! toggle working for the rest of the page load.

use crate::sequencer::EffectError;

pub const THEME_KEY: &str = "theme";

#[derive(Clone, Copy, PartialEq, Eq, Debug)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Light => "light",
            Self::Dark => "dark",
        }
    }

    pub fn from_str(value: &str) -> Option<Self> {
        match value {
            "light" => Some(Self::Light),
            "dark" => Some(Self::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            Self::Light => Self::Dark,
            Self::Dark => Self::Light,
        }
    }

    pub fn toggle_label(self) -> String {
        let next = self.toggled().as_str();
        format!("Switch to {next} theme")
    }

    pub fn pressed(self) -> bool {
        matches!(self, Self::Dark)
    }

    pub fn icon(self) -> &'static str {
        match self {
            Self::Light => "◐",
            Self::Dark => "◑",
        }
    }
}

/// Seam over the single persisted key. The wasm side backs this with
/// `web_sys::Storage`; tests use in-memory and failing stores.
pub trait ThemeStore {
    fn load(&self) -> Result<Option<String>, EffectError>;
    fn save(&mut self, value: &str) -> Result<(), EffectError>;
}

pub struct ThemePreference<S: ThemeStore> {
    store: S,
    current: Theme,
}

impl<S: ThemeStore> ThemePreference<S> {
    /// Read the stored preference once. Missing, unreadable, or unrecognized
    /// values all fall back to `Light`.
    pub fn load(store: S) -> Self {
        let current = store
            .load()
            .ok()
            .flatten()
            .and_then(|value| Theme::from_str(&value))
            .unwrap_or(Theme::Light);
        Self { store, current }
    }

    pub fn current(&self) -> Theme {
        self.current
    }

    pub fn toggle(&mut self) -> Theme {
        self.current = self.current.toggled();
        // StorageUnavailable is absorbed; the in-memory value stands.
        let _ = self.store.save(self.current.as_str());
        self.current
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::rc::Rc;

    #[derive(Clone, Default)]
    struct MemoryStore {
        value: Rc<RefCell<Option<String>>>,
    }

    impl ThemeStore for MemoryStore {
        fn load(&self) -> Result<Option<String>, EffectError> {
            Ok(self.value.borrow().clone())
        }

        fn save(&mut self, value: &str) -> Result<(), EffectError> {
            *self.value.borrow_mut() = Some(value.to_string());
            Ok(())
        }
    }

    struct UnavailableStore;

    impl ThemeStore for UnavailableStore {
        fn load(&self) -> Result<Option<String>, EffectError> {
            Err(EffectError::StorageUnavailable)
        }

        fn save(&mut self, _value: &str) -> Result<(), EffectError> {
            Err(EffectError::StorageUnavailable)
        }
    }

    #[test]
    fn missing_preference_defaults_to_light() {
        let preference = ThemePreference::load(MemoryStore::default());
        assert_eq!(preference.current(), Theme::Light);
    }

    #[test]
    fn unrecognized_preference_defaults_to_light() {
        let store = MemoryStore::default();
        *store.value.borrow_mut() = Some("sepia".to_string());
        let preference = ThemePreference::load(store);
        assert_eq!(preference.current(), Theme::Light);
    }

    #[test]
    fn stored_dark_preference_is_honored() {
        let store = MemoryStore::default();
        *store.value.borrow_mut() = Some("dark".to_string());
        let preference = ThemePreference::load(store);
        assert_eq!(preference.current(), Theme::Dark);
    }

    #[test]
    fn toggle_persists_the_new_value() {
        let store = MemoryStore::default();
        let value = Rc::clone(&store.value);
        let mut preference = ThemePreference::load(store);

        assert_eq!(preference.toggle(), Theme::Dark);
        assert_eq!(value.borrow().as_deref(), Some("dark"));
    }

    #[test]
    fn toggling_twice_round_trips() {
        let store = MemoryStore::default();
        *store.value.borrow_mut() = Some("light".to_string());
        let value = Rc::clone(&store.value);
        let mut preference = ThemePreference::load(store);

        preference.toggle();
        preference.toggle();

        assert_eq!(preference.current(), Theme::Light);
        assert_eq!(value.borrow().as_deref(), Some("light"));
    }

    #[test]
    fn unavailable_storage_is_never_fatal() {
        let mut preference = ThemePreference::load(UnavailableStore);
        assert_eq!(preference.current(), Theme::Light);

        // The write fails silently; the in-memory value still toggles.
        assert_eq!(preference.toggle(), Theme::Dark);
        assert_eq!(preference.current(), Theme::Dark);
        assert_eq!(preference.toggle(), Theme::Light);
    }

    #[test]
    fn theme_string_round_trip() {
        for theme in [Theme::Light, Theme::Dark] {
            assert_eq!(Theme::from_str(theme.as_str()), Some(theme));
        }
        assert_eq!(Theme::from_str("solarized"), None);
    }

    #[test]
    fn toggle_button_attributes_track_the_theme() {
        assert!(Theme::Dark.pressed());
        assert!(!Theme::Light.pressed());
        assert_eq!(Theme::Light.toggle_label(), "Switch to dark theme");
        assert_eq!(Theme::Dark.toggle_label(), "Switch to light theme");
        assert_ne!(Theme::Light.icon(), Theme::Dark.icon());
    }
}
