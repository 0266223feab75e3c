use std::rc::Rc;

use gloo::console;
use gloo::dialogs::alert;
use gloo_timers::callback::Interval;
use proxyscope_core::{
    ActionFailure, DashboardSession, DispatchOutcome, Notifier, POLL_INTERVAL_MS, ProxyFilter,
    RemoteError, Resource, SchedulerAction, SchedulerGateway, SettingsStore,
};
use yew::prelude::*;
use yewdux::prelude::{Dispatch, use_selector};

use crate::components::blocklist::BlocklistPanel;
use crate::components::controls::{ControlBar, ExitFooter};
use crate::components::proxy_table::ProxyTable;
use crate::components::scheduler_info::SchedulerInfo;
use crate::components::toast::ToastHost;
use crate::models::ToastKind;
use crate::services::api::HttpGateway;
use crate::store::{AppStore, apply_view, dismiss_toast, push_toast, success_message};
use preferences::{API_BASE_URL, BrowserStorage};

mod preferences;

/// Action failures block on an alert like the rest of the browser; poll
/// failures only reach the console.
struct BrowserNotifier {
    dispatch: Dispatch<AppStore>,
}

impl Notifier for BrowserNotifier {
    fn action_failed(&self, failure: &ActionFailure) {
        let message = failure.to_string();
        console::error!(message.clone());
        let toast = message.clone();
        self.dispatch.reduce_mut(move |store| {
            push_toast(store, toast, ToastKind::Error);
        });
        alert(&message);
    }

    fn poll_failed(&self, resource: Resource, error: &RemoteError) {
        console::error!(format!("Failed to fetch {}: {error}", resource.as_str()));
    }
}

fn build_session(dispatch: &Dispatch<AppStore>) -> DashboardSession {
    let session = DashboardSession::new(
        Rc::new(HttpGateway::new(API_BASE_URL)) as Rc<dyn SchedulerGateway>,
        SettingsStore::load(Box::new(BrowserStorage)),
        Rc::new(BrowserNotifier {
            dispatch: dispatch.clone(),
        }) as Rc<dyn Notifier>,
    );
    {
        let dispatch = dispatch.clone();
        session.subscribe(move |view| {
            let view = view.clone();
            dispatch.reduce_mut(move |store| apply_view(store, view));
        });
    }
    let initial = session.view();
    dispatch.reduce_mut(move |store| apply_view(store, initial));
    session
}

#[function_component(ProxyScopeApp)]
fn proxyscope_app() -> Html {
    let dispatch = Dispatch::<AppStore>::new();
    let session = {
        let dispatch = dispatch.clone();
        use_memo(move |_| build_session(&dispatch), ())
    };
    let view = use_selector(|store: &AppStore| store.view.clone());
    let toasts = use_selector(|store: &AppStore| store.toasts.items().to_vec());

    {
        let session = session.clone();
        use_effect_with_deps(
            move |_| {
                let mount = (*session).clone();
                yew::platform::spawn_local(async move {
                    mount.poller().mount().await;
                });
                let ticking = (*session).clone();
                let timer = Interval::new(POLL_INTERVAL_MS, move || {
                    let poller = ticking.poller();
                    yew::platform::spawn_local(async move {
                        poller.tick().await;
                    });
                });
                move || {
                    drop(timer);
                    session.teardown();
                }
            },
            (),
        );
    }

    let on_action = {
        let session = session.clone();
        let dispatch = dispatch.clone();
        Callback::from(move |action: SchedulerAction| {
            let dispatcher = session.dispatcher();
            let dispatch = dispatch.clone();
            yew::platform::spawn_local(async move {
                match dispatcher.dispatch(action).await {
                    Ok(DispatchOutcome::Completed(ack)) => {
                        let message = success_message(action.kind(), &ack);
                        dispatch.reduce_mut(move |store| {
                            push_toast(store, message, ToastKind::Success);
                        });
                    }
                    Ok(DispatchOutcome::Failed(_) | DispatchOutcome::Ignored) => {}
                    Err(err) => {
                        let message = err.to_string();
                        dispatch.reduce_mut(move |store| {
                            push_toast(store, message, ToastKind::Error);
                        });
                    }
                }
            });
        })
    };
    let on_filter = {
        let session = session.clone();
        Callback::from(move |filter: ProxyFilter| session.set_filter(filter))
    };
    let on_cycle_sort = {
        let session = session.clone();
        Callback::from(move |()| {
            session.cycle_sort();
        })
    };
    let on_add = {
        let session = session.clone();
        Callback::from(move |input: String| match session.add_blocked(&input) {
            Ok(_) => true,
            Err(err) => {
                alert(&err.to_string());
                false
            }
        })
    };
    let on_remove = {
        let session = session.clone();
        Callback::from(move |country: String| {
            session.remove_blocked(&country);
        })
    };
    let on_dismiss = {
        let dispatch = dispatch.clone();
        Callback::from(move |id: u64| dispatch.reduce_mut(|store| dismiss_toast(store, id)))
    };

    html! {
        <div class="app-container">
            <ControlBar
                controls={view.controls}
                interval_seconds={view.interval_seconds}
                threads={view.threads}
                on_action={on_action.clone()}
            />
            <SchedulerInfo status={view.status.clone()} />
            <ProxyTable view={(*view).clone()} {on_filter} {on_cycle_sort} />
            <BlocklistPanel entries={view.blocklist.clone()} {on_add} {on_remove} />
            <ExitFooter button={view.controls.stop_and_exit} {on_action} />
            <ToastHost toasts={(*toasts).clone()} {on_dismiss} />
        </div>
    }
}

/// Mount the dashboard into `#root`, or the document body when absent.
pub fn run_app() {
    console_error_panic_hook::set_once();
    if let Some(root) = gloo::utils::document().get_element_by_id("root") {
        yew::Renderer::<ProxyScopeApp>::with_root(root).render();
    } else {
        yew::Renderer::<ProxyScopeApp>::new().render();
    }
}
