/// Saved URLs page: browse, search, export and delete captures

use chrono::{Local, Utc};
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use web_sys::{HtmlInputElement, HtmlSelectElement};
use yew::prelude::*;

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::query::{
    export_filename, export_json, filter_records, sort_by_recency, unique_domains, ExportKind,
    RecordFilter, RecordStats,
};
use crate::record::Record;
use crate::storage::{ChromeStore, RecordCollection, TrackerStore};
use crate::ui::components::{EmptyState, StatCard};
use crate::ui::{confirm, copyToClipboard, exportToFile, openTab};

#[derive(Clone, PartialEq)]
enum ViewState {
    Loading,
    Idle,
    Error(String),
}

fn store() -> TrackerStore<ChromeStore> {
    TrackerStore::new(ChromeStore)
}

#[function_component(SavedUrls)]
pub fn saved_urls() -> Html {
    let state = use_state(|| ViewState::Loading);
    let records = use_state(RecordCollection::new);
    let search_query = use_state(String::new);
    let domain_filter = use_state(String::new);
    let reload = use_state(|| 0u32);

    // Load records on mount and on every refresh
    {
        let state = state.clone();
        let records = records.clone();

        use_effect_with(*reload, move |_| {
            state.set(ViewState::Loading);
            spawn_local(async move {
                match store().load_records().await {
                    Ok(loaded) => {
                        records.set(loaded);
                        state.set(ViewState::Idle);
                    }
                    Err(e) => {
                        log::error!("Error loading URLs: {}", e);
                        state.set(ViewState::Error(format!("Failed to load: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let on_search_input = {
        let search_query = search_query.clone();
        Callback::from(move |e: InputEvent| {
            if let Some(input) = e.target_dyn_into::<HtmlInputElement>() {
                search_query.set(input.value());
            }
        })
    };

    let on_domain_change = {
        let domain_filter = domain_filter.clone();
        Callback::from(move |e: Event| {
            if let Some(select) = e.target_dyn_into::<HtmlSelectElement>() {
                domain_filter.set(select.value());
            }
        })
    };

    let on_refresh = {
        let reload = reload.clone();
        Callback::from(move |_| reload.set(*reload + 1))
    };

    let filter = RecordFilter::new(&search_query, &domain_filter);
    let visible = sort_by_recency(&filter_records(&records.records, &filter));

    let on_export = {
        let visible = visible.clone();
        Callback::from(move |_| {
            if let Err(e) = export_filtered(&visible) {
                log::error!("Error exporting URLs: {}", e);
            }
        })
    };

    let on_delete = {
        let records = records.clone();

        Callback::from(move |id: String| {
            if !confirm("Are you sure you want to delete this URL?") {
                return;
            }

            let records = records.clone();
            spawn_local(async move {
                match store().delete_record(&id).await {
                    Ok(remaining) => records.set(remaining),
                    Err(e) => log::error!("Error deleting URL: {}", e),
                }
            });
        })
    };

    let stats = RecordStats::compute(&records.records, Utc::now());
    let domains = unique_domains(&records.records);
    let display_name = TrackerConfig::default().display_name;

    html! {
        <div class="saved-urls-page">
            <header class="page-header">
                <h1>{format!("{} - Saved URLs", display_name)}</h1>
            </header>

            <div class="stats-grid">
                <StatCard label="Total URLs" value={stats.total.to_string()} />
                <StatCard label="This Week" value={stats.this_week.to_string()} />
                <StatCard label="Domains" value={stats.unique_domains.to_string()} />
            </div>

            <div class="toolbar">
                <input
                    type="text"
                    class="search-input"
                    placeholder="Search URLs, titles, domains..."
                    value={(*search_query).clone()}
                    oninput={on_search_input}
                />
                <select class="domain-filter" onchange={on_domain_change}>
                    <option value="" selected={domain_filter.is_empty()}>{"All domains"}</option>
                    { for domains.iter().map(|domain| html! {
                        <option value={domain.clone()} selected={*domain == *domain_filter}>
                            {domain.clone()}
                        </option>
                    })}
                </select>
                <Button onclick={on_refresh} variant={ButtonVariant::Secondary}>
                    {"Refresh"}
                </Button>
                <Button onclick={on_export} variant={ButtonVariant::Primary}>
                    {"Export"}
                </Button>
            </div>

            {match &*state {
                ViewState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                ViewState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                ViewState::Idle if visible.is_empty() => html! {
                    <EmptyState
                        title="No URLs found"
                        hint="Start capturing URLs with the floating + button!"
                    />
                },
                ViewState::Idle => html! {
                    <div class="url-list">
                        { for visible.iter().map(|record| html! {
                            <UrlCard
                                key={record.id.clone()}
                                record={record.clone()}
                                ondelete={on_delete.clone()}
                            />
                        })}
                    </div>
                },
            }}
        </div>
    }
}

#[derive(Properties, PartialEq)]
struct UrlCardProps {
    record: Record,
    ondelete: Callback<String>,
}

#[function_component(UrlCard)]
fn url_card(props: &UrlCardProps) -> Html {
    let record = &props.record;

    let on_open = {
        let url = record.url.clone();
        Callback::from(move |_| {
            let url = url.clone();
            spawn_local(async move {
                if let Err(e) = openTab(&url).await {
                    log::error!("Could not open tab: {:?}", e);
                }
            });
        })
    };

    let on_copy = {
        let url = record.url.clone();
        Callback::from(move |_| {
            let url = url.clone();
            spawn_local(async move {
                match copyToClipboard(&url).await {
                    Ok(()) => log::debug!("Copied {}", url),
                    Err(e) => log::error!("Failed to copy URL: {:?}", e),
                }
            });
        })
    };

    let on_delete = {
        let id = record.id.clone();
        let ondelete = props.ondelete.clone();
        Callback::from(move |_| ondelete.emit(id.clone()))
    };

    let title = if record.title.is_empty() {
        "Untitled".to_string()
    } else {
        record.title.clone()
    };
    let saved = record
        .saved_at()
        .with_timezone(&Local)
        .format("%Y-%m-%d %H:%M")
        .to_string();

    html! {
        <div class="url-card">
            <div class="url-title">{title}</div>
            <a class="url-link" href={record.url.clone()} target="_blank" rel="noopener noreferrer">
                {record.url.clone()}
            </a>
            <div class="url-meta">
                <span class="url-domain">{record.domain.clone()}</span>
                <span class="url-date">{saved}</span>
            </div>
            <div class="url-actions">
                <Button onclick={on_open} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                    {"Open"}
                </Button>
                <Button onclick={on_copy} variant={ButtonVariant::Secondary} size={ButtonSize::Small}>
                    {"Copy"}
                </Button>
                <Button onclick={on_delete} variant={ButtonVariant::Danger} size={ButtonSize::Small}>
                    {"Delete"}
                </Button>
            </div>
        </div>
    }
}

/// Download the records currently shown
fn export_filtered(records: &[Record]) -> Result<()> {
    let json = export_json(records)?;
    let slug = TrackerConfig::default().product_slug;
    let filename = export_filename(&slug, ExportKind::Filtered, Utc::now().date_naive());

    exportToFile(&json, &filename).map_err(TrackerError::dom)
}
