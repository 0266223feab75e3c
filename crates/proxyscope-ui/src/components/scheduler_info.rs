use proxyscope_core::SchedulerSnapshot;
use proxyscope_core::view::display::{SCHEDULER_LOADING_MESSAGE, format_optional_timestamp};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct SchedulerInfoProps {
    pub(crate) status: Option<SchedulerSnapshot>,
}

#[function_component(SchedulerInfo)]
pub(crate) fn scheduler_info(props: &SchedulerInfoProps) -> Html {
    let Some(status) = props.status.as_ref() else {
        return html! {
            <div class="scheduler-info"><p>{SCHEDULER_LOADING_MESSAGE}</p></div>
        };
    };
    html! {
        <div class="scheduler-info">
            <p>
                {"Status: "}
                <span class={classes!("status-text", format!("status-{}", status.state.as_str()))}>
                    {status.state.display_label()}
                </span>
            </p>
            <p>{format!("Proxies: {} (Valid: {})", status.current_proxy_count, status.valid_proxy_count)}</p>
            <p>{format!("Last Run: {}", format_optional_timestamp(status.last_run.as_deref()))}</p>
            <p>{format!("Next Run: {}", format_optional_timestamp(status.next_run.as_deref()))}</p>
            <p>{format!("Threads: {}", status.validation_threads)}</p>
        </div>
    }
}
