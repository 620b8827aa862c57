use crate::reactive::Signal;
use crate::store::json_store::JsonStore;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ThemePreference {
    Light,
    Dark,
}

impl ThemePreference {
    pub fn as_str(self) -> &'static str {
        match self {
            ThemePreference::Light => "light",
            ThemePreference::Dark => "dark",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "light" => Some(ThemePreference::Light),
            "dark" => Some(ThemePreference::Dark),
            _ => None,
        }
    }

    pub fn toggled(self) -> Self {
        match self {
            ThemePreference::Light => ThemePreference::Dark,
            ThemePreference::Dark => ThemePreference::Light,
        }
    }
}

/// Color scheme the terminal reports, via the `COLORFGBG` convention
/// (`"<fg>;<bg>"`, where background 7 or 15 means a light terminal).
pub fn system_preference() -> ThemePreference {
    std::env::var("COLORFGBG")
        .ok()
        .and_then(|v| preference_from_colorfgbg(&v))
        .unwrap_or(ThemePreference::Dark)
}

fn preference_from_colorfgbg(value: &str) -> Option<ThemePreference> {
    let bg: u8 = value.rsplit(';').next()?.trim().parse().ok()?;
    Some(if bg == 7 || bg == 15 {
        ThemePreference::Light
    } else {
        ThemePreference::Dark
    })
}

/// Process-wide light/dark preference. `toggle` is the only writer.
pub struct ThemeStore {
    preference: Signal<ThemePreference>,
    store: Option<JsonStore>,
}

impl ThemeStore {
    /// Use the persisted value if there is one, else `system`.
    pub fn new(store: Option<JsonStore>, system: ThemePreference) -> Self {
        let persisted = store
            .as_ref()
            .and_then(|s| s.load_preferences().theme)
            .and_then(|t| ThemePreference::parse(&t));
        let initial = persisted.unwrap_or(system);
        tracing::debug!(theme = initial.as_str(), persisted = persisted.is_some(), "theme initialized");
        Self {
            preference: Signal::new(initial),
            store,
        }
    }

    pub fn get(&self) -> ThemePreference {
        self.preference.get()
    }

    pub fn signal(&self) -> &Signal<ThemePreference> {
        &self.preference
    }

    pub fn toggle(&self) -> ThemePreference {
        let next = self.get().toggled();
        self.persist(next);
        self.preference.set(next);
        tracing::info!(theme = next.as_str(), "theme toggled");
        next
    }

    fn persist(&self, pref: ThemePreference) {
        let Some(store) = &self.store else {
            return;
        };
        let mut prefs = store.load_preferences();
        prefs.theme = Some(pref.as_str().to_string());
        if let Err(e) = store.save_preferences(&prefs) {
            tracing::warn!(error = %e, "failed to persist theme");
        }
    }
}
