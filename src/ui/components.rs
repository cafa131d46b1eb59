/// Reusable UI components

use yew::prelude::*;

#[derive(Properties, PartialEq)]
pub struct StatCardProps {
    pub label: AttrValue,
    pub value: AttrValue,
}

#[function_component(StatCard)]
pub fn stat_card(props: &StatCardProps) -> Html {
    html! {
        <div class="stat-card">
            <div class="stat-value">{&props.value}</div>
            <div class="stat-label">{&props.label}</div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct ToggleRowProps {
    pub label: AttrValue,
    pub active: bool,
    pub ontoggle: Callback<()>,
    #[prop_or(false)]
    pub disabled: bool,
}

/// A labelled on/off switch
#[function_component(ToggleRow)]
pub fn toggle_row(props: &ToggleRowProps) -> Html {
    let onclick = {
        let ontoggle = props.ontoggle.clone();
        let disabled = props.disabled;
        Callback::from(move |_: MouseEvent| {
            if !disabled {
                ontoggle.emit(());
            }
        })
    };

    let class = if props.active { "toggle active" } else { "toggle" };

    html! {
        <div class="setting-row">
            <span class="setting-label">{&props.label}</span>
            <div
                class={class}
                role="switch"
                aria-checked={props.active.to_string()}
                onclick={onclick}
            >
                <div class="toggle-knob"></div>
            </div>
        </div>
    }
}

#[derive(Properties, PartialEq)]
pub struct EmptyStateProps {
    pub title: AttrValue,
    #[prop_or_default]
    pub hint: Option<AttrValue>,
}

#[function_component(EmptyState)]
pub fn empty_state(props: &EmptyStateProps) -> Html {
    html! {
        <div class="empty-state">
            <h3>{&props.title}</h3>
            if let Some(hint) = &props.hint {
                <p class="empty-state-hint">{hint}</p>
            }
        </div>
    }
}
