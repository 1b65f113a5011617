//! Browser Adapters
//!
//! Implementations of the core capabilities on top of `window`, local
//! storage and Leptos signals.

use std::time::Duration;

use leptos::prelude::*;
use pricing_core::{AuthProvider, Navigator, Notice, NoticeKind, Notifier, User};
use pricing_runtime::FunctionsConfig;
use serde::Deserialize;

/// How long a toast stays up
const TOAST_TTL: Duration = Duration::from_secs(5);

/// `window.location`
pub struct BrowserNavigator;

impl Navigator for BrowserNavigator {
    fn origin(&self) -> String {
        web_sys::window()
            .and_then(|w| w.location().origin().ok())
            .unwrap_or_else(|| "http://localhost:3000".into())
    }

    fn redirect(&self, url: &str) {
        let Some(window) = web_sys::window() else {
            leptos::logging::error!("No window to redirect to {url}");
            return;
        };
        if let Err(e) = window.location().set_href(url) {
            leptos::logging::error!("Redirect to {url} failed: {e:?}");
        }
    }
}

/// Session persisted by the auth provider in local storage
#[derive(Deserialize)]
struct StoredSession {
    user: User,
}

/// Reads the signed-in user from the auth provider's stored session
pub struct SessionAuth {
    storage_key: String,
}

impl SessionAuth {
    pub fn new(storage_key: impl Into<String>) -> Self {
        Self {
            storage_key: storage_key.into(),
        }
    }

    /// `sb-{project ref}-auth-token`, the key the auth client writes
    pub fn for_project(config: &FunctionsConfig) -> Self {
        Self::new(format!(
            "sb-{}-auth-token",
            config.project_ref().unwrap_or("local")
        ))
    }
}

impl AuthProvider for SessionAuth {
    fn current_user(&self) -> Option<User> {
        let storage = web_sys::window()?.local_storage().ok()??;
        let raw = storage.get_item(&self.storage_key).ok()??;
        match serde_json::from_str::<StoredSession>(&raw) {
            Ok(session) => Some(session.user),
            Err(e) => {
                leptos::logging::warn!("Ignoring unreadable auth session: {e}");
                None
            }
        }
    }
}

/// A notice on screen
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct Toast {
    pub id: u64,
    pub notice: Notice,
}

/// Toast queue rendered by `Toaster`
#[derive(Clone, Copy)]
pub struct Toasts {
    items: RwSignal<Vec<Toast>>,
    next_id: StoredValue<u64>,
}

impl Default for Toasts {
    fn default() -> Self {
        Self::new()
    }
}

impl Toasts {
    pub fn new() -> Self {
        Self {
            items: RwSignal::new(Vec::new()),
            next_id: StoredValue::new(0),
        }
    }

    pub fn items(&self) -> Vec<Toast> {
        self.items.get()
    }

    pub fn dismiss(&self, id: u64) {
        self.items.update(|items| items.retain(|t| t.id != id));
    }
}

impl Notifier for Toasts {
    fn notify(&self, notice: Notice) {
        match notice.kind {
            NoticeKind::Info => leptos::logging::log!("{}: {}", notice.title, notice.description),
            NoticeKind::Destructive => {
                leptos::logging::error!("{}: {}", notice.title, notice.description);
            }
        }

        self.next_id.update_value(|n| *n += 1);
        let id = self.next_id.get_value();
        self.items.update(|items| items.push(Toast { id, notice }));

        let toasts = *self;
        set_timeout(move || toasts.dismiss(id), TOAST_TTL);
    }
}
