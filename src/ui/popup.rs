/// Popup UI: stats, settings and data management

use chrono::Utc;
use patternfly_yew::prelude::*;
use wasm_bindgen_futures::spawn_local;
use yew::prelude::*;

use crate::config::TrackerConfig;
use crate::error::{Result, TrackerError};
use crate::query::{export_filename, export_json, last_saved_relative, ExportKind, RecordStats};
use crate::record::{Record, SettingToggle, Settings};
use crate::storage::{ChromeStore, TrackerStore};
use crate::ui::components::{StatCard, ToggleRow};
use crate::ui::{alert, confirm, exportToFile, openExtensionPage};

const SAVED_URLS_PAGE: &str = "saved-urls.html";

#[derive(Clone, PartialEq)]
enum PopupState {
    Loading,
    Idle,
    Error(String),
}

#[derive(Clone, PartialEq, Default)]
struct PopupStats {
    total: usize,
    this_week: usize,
    last_saved: Option<String>,
}

impl PopupStats {
    fn from_records(records: &[Record]) -> Self {
        let now = Utc::now();
        let stats = RecordStats::compute(records, now);
        PopupStats {
            total: stats.total,
            this_week: stats.this_week,
            last_saved: last_saved_relative(records, now),
        }
    }
}

fn store() -> TrackerStore<ChromeStore> {
    TrackerStore::new(ChromeStore)
}

#[function_component(App)]
pub fn app() -> Html {
    let state = use_state(|| PopupState::Loading);
    let stats = use_state(PopupStats::default);
    let settings = use_state(Settings::default);

    // Load stats and settings on mount
    {
        let state = state.clone();
        let stats = stats.clone();
        let settings = settings.clone();

        use_effect_with((), move |_| {
            spawn_local(async move {
                match store().load_records().await {
                    Ok(records) => stats.set(PopupStats::from_records(&records.records)),
                    Err(e) => log::error!("Error loading stats: {}", e),
                }
                match store().load_settings().await {
                    Ok(loaded) => {
                        settings.set(loaded);
                        state.set(PopupState::Idle);
                    }
                    Err(e) => {
                        log::error!("Error loading settings: {}", e);
                        state.set(PopupState::Error(format!("Failed to load: {}", e)));
                    }
                }
            });
            || ()
        });
    }

    let on_view_all = Callback::from(move |_| {
        spawn_local(async move {
            if let Err(e) = openExtensionPage(SAVED_URLS_PAGE).await {
                log::error!("Could not open saved URLs: {:?}", e);
            }
        });
    });

    let on_export = Callback::from(move |_| {
        spawn_local(async move {
            match export_all().await {
                Ok(true) => {}
                Ok(false) => alert("No data to export"),
                Err(e) => {
                    log::error!("Error exporting data: {}", e);
                    alert("Error exporting data");
                }
            }
        });
    });

    let on_clear = {
        let stats = stats.clone();

        Callback::from(move |_| {
            if !confirm("Are you sure you want to clear all saved URLs? This action cannot be undone.") {
                return;
            }

            let stats = stats.clone();
            spawn_local(async move {
                match store().clear_records().await {
                    Ok(()) => {
                        stats.set(PopupStats::from_records(&[]));
                        alert("All data cleared successfully");
                    }
                    Err(e) => {
                        log::error!("Error clearing data: {}", e);
                        alert("Error clearing data");
                    }
                }
            });
        })
    };

    let on_toggle = {
        let settings = settings.clone();
        move |toggle: SettingToggle| {
            let settings = settings.clone();
            Callback::from(move |_| {
                let settings = settings.clone();
                spawn_local(async move {
                    match store().toggle_setting(toggle).await {
                        Ok(updated) => settings.set(updated),
                        Err(e) => log::error!("Error toggling setting: {}", e),
                    }
                });
            })
        }
    };

    let is_busy = matches!(*state, PopupState::Loading);
    let display_name = TrackerConfig::default().display_name;

    html! {
        <div class="padding-20">
            <h1 class="popup-title">{display_name}</h1>

            {match &*state {
                PopupState::Loading => html! {
                    <div class="loading-text-center">
                        <Spinner />
                    </div>
                },
                PopupState::Error(err) => html! {
                    <Alert r#type={AlertType::Danger} title={"Error"} inline={true}>
                        {err.clone()}
                    </Alert>
                },
                PopupState::Idle => html! {}
            }}

            <div class="stats-grid">
                <StatCard label="Total Saved" value={stats.total.to_string()} />
                <StatCard label="This Week" value={stats.this_week.to_string()} />
                <StatCard
                    label="Last Saved"
                    value={stats.last_saved.clone().unwrap_or_else(|| "Never".to_string())}
                />
            </div>

            <div class="flex-column-gap">
                <Button onclick={on_view_all} variant={ButtonVariant::Primary} block={true}>
                    {"View All Saved URLs"}
                </Button>
                <Button onclick={on_export} disabled={is_busy} variant={ButtonVariant::Secondary} block={true}>
                    {"Export Data"}
                </Button>
                <Button onclick={on_clear} disabled={is_busy} variant={ButtonVariant::Danger} block={true}>
                    {"Clear All Data"}
                </Button>
            </div>

            <div class="settings-section">
                <h2 class="settings-title">{"Settings"}</h2>
                <ToggleRow
                    label="Show notifications"
                    active={settings.get(SettingToggle::ShowNotifications)}
                    ontoggle={on_toggle(SettingToggle::ShowNotifications)}
                    disabled={is_busy}
                />
                <ToggleRow
                    label="Auto-save"
                    active={settings.get(SettingToggle::AutoSave)}
                    ontoggle={on_toggle(SettingToggle::AutoSave)}
                    disabled={is_busy}
                />
            </div>
        </div>
    }
}

/// Download every record; `Ok(false)` when there is nothing to export
async fn export_all() -> Result<bool> {
    let records = store().load_records().await?;
    if records.is_empty() {
        return Ok(false);
    }

    let json = export_json(&records.records)?;
    let slug = TrackerConfig::default().product_slug;
    let filename = export_filename(&slug, ExportKind::All, Utc::now().date_naive());

    exportToFile(&json, &filename).map_err(TrackerError::dom)?;
    Ok(true)
}
