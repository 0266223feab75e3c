//! App-wide yewdux store.
//!
//! The [`DashboardSession`](proxyscope_core::DashboardSession) owns the
//! engine state and pushes a fresh [`DashboardView`] here on every change;
//! components only read from the store.

use proxyscope_api_models::ActionAck;
use proxyscope_core::{ActionKind, DashboardView};
use yewdux::store::Store;

use crate::models::{ToastKind, ToastQueue};

/// Global application store for shared state.
#[derive(Clone, Debug, PartialEq, Store, Default)]
pub struct AppStore {
    /// Latest derived dashboard view.
    pub view: DashboardView,
    /// Visible toasts.
    pub toasts: ToastQueue,
}

/// Replace the rendered view.
pub fn apply_view(store: &mut AppStore, view: DashboardView) {
    store.view = view;
}

/// Queue a toast.
pub fn push_toast(store: &mut AppStore, message: impl Into<String>, kind: ToastKind) -> u64 {
    store.toasts.push(message, kind)
}

/// Drop a toast by id.
pub fn dismiss_toast(store: &mut AppStore, id: u64) {
    store.toasts.dismiss(id);
}

/// Toast text for an accepted action; the server message wins when present.
#[must_use]
pub fn success_message(kind: ActionKind, ack: &ActionAck) -> String {
    ack.message
        .as_deref()
        .map(str::trim)
        .filter(|message| !message.is_empty())
        .map_or_else(|| format!("{} completed", kind.label()), str::to_string)
}

/// Select options, with a server-reported value outside the list appended
/// so the control still shows what the scheduler uses.
#[must_use]
pub fn select_options(options: &[u32], current: u32) -> Vec<u32> {
    let mut values = options.to_vec();
    if current > 0 && !values.contains(&current) {
        values.push(current);
        values.sort_unstable();
    }
    values
}
