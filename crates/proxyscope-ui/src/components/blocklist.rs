use web_sys::HtmlInputElement;
use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub(crate) struct BlocklistPanelProps {
    pub(crate) entries: Vec<String>,
    /// Returns `true` when the entry was accepted, which clears the input.
    pub(crate) on_add: Callback<String, bool>,
    pub(crate) on_remove: Callback<String>,
}

#[function_component(BlocklistPanel)]
pub(crate) fn blocklist_panel(props: &BlocklistPanelProps) -> Html {
    let draft = use_state(String::new);

    let oninput = {
        let draft = draft.clone();
        Callback::from(move |event: InputEvent| {
            if let Some(input) = event.target_dyn_into::<HtmlInputElement>() {
                draft.set(input.value());
            }
        })
    };
    let submit = {
        let draft = draft.clone();
        let on_add = props.on_add.clone();
        Callback::from(move |()| {
            if on_add.emit((*draft).clone()) {
                draft.set(String::new());
            }
        })
    };
    let onkeypress = {
        let submit = submit.clone();
        Callback::from(move |event: KeyboardEvent| {
            if event.key() == "Enter" {
                submit.emit(());
            }
        })
    };
    let onclick = submit.reform(|_: MouseEvent| ());

    html! {
        <section class="blocklist-section">
            <h2 class="blocklist-title">{"Country Blocklist"}</h2>
            <div class="blocklist-input-group">
                <input
                    type="text"
                    class="blocklist-input"
                    placeholder="Enter Country Code/Name (e.g., US, China)"
                    value={(*draft).clone()}
                    {oninput}
                    {onkeypress}
                />
                <button class="btn btn-add-blocklist" {onclick}>{"Add to Blocklist"}</button>
            </div>
            if props.entries.is_empty() {
                <p class="blocklist-empty-message">{"No countries are currently blocked."}</p>
            } else {
                <ul class="blocked-countries-list">
                    {for props.entries.iter().map(|country| {
                        let country = country.clone();
                        let onclick = props.on_remove.reform({
                            let country = country.clone();
                            move |_: MouseEvent| country.clone()
                        });
                        html! {
                            <li key={country.clone()} class="blocked-country-item">
                                <span>{country.clone()}</span>
                                <button
                                    class="btn-remove-blocklist"
                                    title={format!("Remove {country}")}
                                    {onclick}
                                >
                                    {"\u{00d7}"}
                                </button>
                            </li>
                        }
                    })}
                </ul>
            }
        </section>
    }
}
