use dioxus::prelude::*;

use kitshop_common::currency::format_price;
use kitshop_common::filter::{ActiveFilterSet, FilterField, PriceRange};

use super::header::PanelHeader;
use super::shop_state::use_shop_state;

/// Price input text for one end of the range; the open end shows empty.
fn bound_text(value: u64, open: u64) -> String {
    if value == open {
        String::new()
    } else {
        value.to_string()
    }
}

/// Parse a price input. Blank or unreadable input means the open end.
fn parse_bound(text: &str, open: u64) -> u64 {
    let digits: String = text.chars().filter(|c| c.is_ascii_digit()).collect();
    digits.parse().unwrap_or(open)
}

/// Filter selections are edited as a draft and only reach the catalog on
/// Apply.
#[component]
pub fn FilterPanel() -> Element {
    let mut state = use_shop_state();
    let mut draft = use_signal(|| state.peek().filters.clone());

    let s = state.read();
    let options = s.filter_options.clone();
    let bounds = s.catalog_price_bounds();
    drop(s);

    let current = draft.read().clone();
    let min_text = bound_text(current.price.min, PriceRange::FULL.min);
    let max_text = bound_text(current.price.max, PriceRange::FULL.max);
    let (min_hint, max_hint) = match bounds {
        Some(range) => (format!("from {}", format_price(range.min)), format!("to {}", format_price(range.max))),
        None => ("from".to_string(), "to".to_string()),
    };

    rsx! {
        div { class: "panel filter-panel",
            PanelHeader { title: "Filters" }
            for field in FilterField::ALL {
                div { class: "form-group", key: "{field.query_key()}",
                    label { "{field.label()}" }
                    select {
                        onchange: move |evt| draft.write().set(field, evt.value()),
                        option { value: "", selected: current.get(field).is_none(), "Any" }
                        for value in options.values(field).iter().cloned() {
                            option {
                                selected: current.get(field) == Some(value.as_str()),
                                value: "{value}",
                                "{value}"
                            }
                        }
                    }
                }
            }
            div { class: "form-group price-range",
                label { "Price" }
                input {
                    r#type: "number",
                    min: "0",
                    placeholder: "{min_hint}",
                    value: "{min_text}",
                    oninput: move |evt| draft.write().price.min = parse_bound(&evt.value(), PriceRange::FULL.min),
                }
                input {
                    r#type: "number",
                    min: "0",
                    placeholder: "{max_hint}",
                    value: "{max_text}",
                    oninput: move |evt| draft.write().price.max = parse_bound(&evt.value(), PriceRange::FULL.max),
                }
            }
            div { class: "panel-actions",
                button {
                    class: "secondary",
                    onclick: move |_| {
                        draft.set(ActiveFilterSet::default());
                        state.write().reset_filters();
                    },
                    "Reset"
                }
                button {
                    class: "primary",
                    onclick: move |_| {
                        let chosen = draft.read().clone();
                        tracing::debug!("applying {} filters", chosen.active_count());
                        state.write().apply_filters(chosen);
                    },
                    "Apply"
                }
            }
        }
    }
}
