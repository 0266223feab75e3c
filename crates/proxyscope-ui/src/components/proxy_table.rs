use proxyscope_core::view::display::NO_MATCH_MESSAGE;
use proxyscope_core::{DashboardView, ProxyFilter, ProxyRow};
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct ProxyTableProps {
    pub(crate) view: DashboardView,
    pub(crate) on_filter: Callback<ProxyFilter>,
    pub(crate) on_cycle_sort: Callback<()>,
}

#[function_component(ProxyTable)]
pub(crate) fn proxy_table(props: &ProxyTableProps) -> Html {
    let view = &props.view;
    if let Some(message) = view.table.message() {
        return html! {
            <main class="table-area">
                <p class="no-data-message prominent">{message}</p>
            </main>
        };
    }

    let current = view.filter_sort.filter;
    let filters = ProxyFilter::all().into_iter().map(|filter| {
        let onclick = props.on_filter.reform(move |_: MouseEvent| filter);
        let class = classes!("filter-btn", (filter == current).then_some("active"));
        html! {
            <button key={filter.label()} {class} {onclick}>
                {format!("{} ({})", filter.label(), view.counts.for_filter(filter))}
            </button>
        }
    });
    let on_sort = props.on_cycle_sort.reform(|_: MouseEvent| ());

    html! {
        <main class="table-area">
            <div class="table-controls">
                <div class="filter-group">{for filters}</div>
                <button class="sort-btn" disabled={!view.sort_enabled()} onclick={on_sort}>
                    {view.filter_sort.sort.label()}
                </button>
            </div>
            if view.shows_no_match() {
                <p class="no-data-message">{NO_MATCH_MESSAGE}</p>
            } else {
                <div class="table-responsive-wrapper">
                    <table class="proxy-table">
                        <thead>
                            <tr>
                                <th>{"Proxy"}</th>
                                <th>{"Status"}</th>
                                <th>{"Anonymity"}</th>
                                <th>{"Country"}</th>
                                <th>{"Response Time"}</th>
                                <th>{"Last Checked"}</th>
                                <th>{"Source"}</th>
                            </tr>
                        </thead>
                        <tbody>
                            {for view.rows.iter().map(render_row)}
                        </tbody>
                    </table>
                </div>
            }
        </main>
    }
}

fn render_row(row: &ProxyRow) -> Html {
    let status_class = if row.is_valid { "valid" } else { "invalid" };
    html! {
        <tr key={row.key.clone()} class={classes!("proxy-row", format!("status-row-{status_class}"))}>
            <td class="cell-proxy-string">{row.proxy.clone()}</td>
            <td><span class={classes!("status-badge", format!("status-{status_class}"))}>{row.status}</span></td>
            <td>{row.anonymity.clone()}</td>
            <td>{row.country.clone()}</td>
            <td>{row.response_time.clone()}</td>
            <td>{row.last_checked.clone()}</td>
            <td>{row.source.clone()}</td>
        </tr>
    }
}
