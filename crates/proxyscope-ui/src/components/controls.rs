use proxyscope_core::settings::{INTERVAL_OPTIONS_SECS, THREAD_OPTIONS};
use proxyscope_core::view::display::{ButtonState, interval_label};
use proxyscope_core::{ControlState, SchedulerAction};
use web_sys::HtmlSelectElement;
use yew::prelude::*;

use crate::store::select_options;

#[derive(Properties, PartialEq)]
pub(crate) struct ControlBarProps {
    pub(crate) controls: ControlState,
    pub(crate) interval_seconds: u32,
    pub(crate) threads: u32,
    pub(crate) on_action: Callback<SchedulerAction>,
}

#[function_component(ControlBar)]
pub(crate) fn control_bar(props: &ControlBarProps) -> Html {
    let controls = props.controls;
    let on_interval = props.on_action.reform(SchedulerAction::SetInterval);
    let on_threads = props.on_action.reform(SchedulerAction::SetThreads);

    html! {
        <header class="header-controls">
            <div class="button-group">
                {action_button("btn-start", controls.start, SchedulerAction::Start, &props.on_action)}
                {action_button("btn-stop", controls.stop, SchedulerAction::Stop, &props.on_action)}
                {action_button("btn-pause", controls.pause, SchedulerAction::Pause, &props.on_action)}
                {action_button("btn-resume", controls.resume, SchedulerAction::Resume, &props.on_action)}
                {action_button("btn-refresh", controls.refresh, SchedulerAction::Refresh, &props.on_action)}
            </div>
            <div class="settings-group">
                {number_select(
                    "time-interval-select",
                    "Interval:",
                    &select_options(&INTERVAL_OPTIONS_SECS, props.interval_seconds),
                    props.interval_seconds,
                    controls.interval_enabled,
                    interval_label,
                    on_interval,
                )}
                {number_select(
                    "validation-threads-select",
                    "Threads:",
                    &select_options(&THREAD_OPTIONS, props.threads),
                    props.threads,
                    controls.threads_enabled,
                    |threads| threads.to_string(),
                    on_threads,
                )}
            </div>
        </header>
    }
}

#[derive(Properties, PartialEq)]
pub(crate) struct ExitFooterProps {
    pub(crate) button: ButtonState,
    pub(crate) on_action: Callback<SchedulerAction>,
}

#[function_component(ExitFooter)]
pub(crate) fn exit_footer(props: &ExitFooterProps) -> Html {
    html! {
        <footer class="footer-actions">
            {action_button("btn-exit", props.button, SchedulerAction::StopAndExit, &props.on_action)}
        </footer>
    }
}

fn action_button(
    class: &'static str,
    state: ButtonState,
    action: SchedulerAction,
    on_action: &Callback<SchedulerAction>,
) -> Html {
    let onclick = on_action.reform(move |_: MouseEvent| action);
    html! {
        <button class={classes!("btn", class)} disabled={!state.enabled} {onclick}>
            {state.label}
        </button>
    }
}

fn number_select(
    id: &'static str,
    label: &'static str,
    options: &[u32],
    selected: u32,
    enabled: bool,
    caption: impl Fn(u32) -> String,
    on_select: Callback<u32>,
) -> Html {
    let onchange = Callback::from(move |event: Event| {
        let value = event
            .target_dyn_into::<HtmlSelectElement>()
            .and_then(|select| select.value().parse::<u32>().ok());
        if let Some(value) = value {
            on_select.emit(value);
        }
    });
    html! {
        <div class="select-group">
            <label for={id}>{label}</label>
            <select {id} class="select-control" disabled={!enabled} {onchange}>
                {for options.iter().map(|&value| html! {
                    <option key={value} value={value.to_string()} selected={value == selected}>
                        {caption(value)}
                    </option>
                })}
            </select>
        </div>
    }
}
