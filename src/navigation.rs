use std::sync::{Mutex, MutexGuard, PoisonError};

use url::Url;

/// Path of the unauthenticated entry route (loan form, callback channel).
pub const ENTRY_PATH: &str = "/";
/// Path of the authenticated profile route.
pub const PROFILE_PATH: &str = "/dashboard";

/// Where the browser should go next.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Destination {
    /// The unauthenticated entry route.
    Entry,
    /// The authenticated profile view.
    Profile,
    /// Full page navigation away from the site; the page unloads.
    External(Url),
}

impl Destination {
    /// Resolve against the site origin of `current`.
    #[must_use]
    pub fn resolve(&self, current: &Url) -> Url {
        let path = match self {
            Self::Entry => ENTRY_PATH,
            Self::Profile => PROFILE_PATH,
            Self::External(url) => return url.clone(),
        };
        let mut url = current.clone();
        url.set_path(path);
        url.set_query(None);
        url.set_fragment(None);
        url
    }
}

/// Host browser location and history.
pub trait Navigator: Send + Sync + 'static {
    /// The address currently shown.
    fn current_url(&self) -> Url;

    /// Replace the visible address without reloading or adding a history entry.
    fn replace_url(&self, url: Url);

    /// Navigate to `destination`.
    fn navigate(&self, destination: Destination);
}

/// Navigator that tracks location in memory and records every navigation.
#[derive(Debug)]
pub struct MemoryNavigator {
    inner: Mutex<NavigatorState>,
}

#[derive(Debug)]
struct NavigatorState {
    current: Url,
    visited: Vec<Destination>,
}

impl MemoryNavigator {
    #[must_use]
    pub fn new(start: Url) -> Self {
        Self {
            inner: Mutex::new(NavigatorState {
                current: start,
                visited: Vec::new(),
            }),
        }
    }

    /// Every destination passed to [`Navigator::navigate`], oldest first.
    #[must_use]
    pub fn visited(&self) -> Vec<Destination> {
        self.lock().visited.clone()
    }

    #[must_use]
    pub fn last_destination(&self) -> Option<Destination> {
        self.lock().visited.last().cloned()
    }

    fn lock(&self) -> MutexGuard<'_, NavigatorState> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Navigator for MemoryNavigator {
    fn current_url(&self) -> Url {
        self.lock().current.clone()
    }

    fn replace_url(&self, url: Url) {
        self.lock().current = url;
    }

    fn navigate(&self, destination: Destination) {
        let mut state = self.lock();
        tracing::debug!(?destination, "Navigating");
        state.current = destination.resolve(&state.current);
        state.visited.push(destination);
    }
}
