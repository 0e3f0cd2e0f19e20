//! WebAssembly module for the poultry operations dashboard
//!
//! Provides client-side computation for:
//! - Stock ledger reconciliation (correction and revert badges, row actions)
//! - Ledger row highlighting
//! - Mortality, FCR and EPI figures

use rust_decimal::prelude::ToPrimitive;
use rust_decimal::Decimal;
use shared::metrics::{
    classify_mortality, european_production_index, feed_conversion_ratio, mortality_rate,
    MortalityThresholds,
};
use wasm_bindgen::prelude::*;
use wasm_bindgen::JsCast;

// Re-export shared types for use in JavaScript
pub use shared::models::*;
pub use shared::reconciliation::*;
pub use shared::types::*;
pub use shared::validation::*;

/// CSS class toggled on a highlighted ledger row
pub const HIGHLIGHT_CLASS: &str = "ledger-row-highlight";

/// How long a highlighted row stays highlighted
pub const HIGHLIGHT_DURATION_MS: i32 = 2000;

fn to_js_error(err: impl std::fmt::Display) -> JsValue {
    JsValue::from_str(&err.to_string())
}

fn decimal_from_f64(value: f64) -> Decimal {
    Decimal::try_from(value).unwrap_or(Decimal::ZERO)
}

fn decimal_to_f64(value: Decimal) -> f64 {
    value.to_f64().unwrap_or(0.0)
}

fn warn_issues(issues: &[LedgerIssue]) {
    for issue in issues {
        web_sys::console::warn_1(&JsValue::from_str(&format!(
            "[stock ledger] {}: {}",
            issue.code(),
            issue
        )));
    }
}

/// Serialized page data plus the issues to echo to the console
#[derive(Debug)]
struct Rendered {
    json: String,
    issues: Vec<LedgerIssue>,
}

fn render_reconciliation(entries_json: &str) -> Result<Rendered, String> {
    let entries: Vec<StockLedgerEntry> =
        shared::from_json("stock history", entries_json).map_err(|e| e.to_string())?;

    let reconciliation = reconcile_with(&entries, &ReconciliationOptions::default());
    let json = serde_json::to_string(&reconciliation.rows).map_err(|e| e.to_string())?;
    Ok(Rendered {
        json,
        issues: reconciliation.issues,
    })
}

fn render_ledger_view(context_json: &str, ledger_json: &str) -> Result<Rendered, String> {
    let context: RequestContext =
        shared::from_json("request context", context_json).map_err(|e| e.to_string())?;
    let ledger: FarmerLedger =
        shared::from_json("farmer ledger", ledger_json).map_err(|e| e.to_string())?;

    let view = LedgerView::build(
        &context,
        &ledger.farmer,
        &ledger.entries,
        &ReconciliationOptions::default(),
    );
    let json = serde_json::to_string(&view).map_err(|e| e.to_string())?;
    Ok(Rendered {
        json,
        issues: view.issues,
    })
}

/// Reconcile stock history entries into display rows (JSON in, JSON out)
#[wasm_bindgen]
pub fn reconcile_ledger(entries_json: &str) -> Result<String, JsValue> {
    let rendered = render_reconciliation(entries_json).map_err(to_js_error)?;
    warn_issues(&rendered.issues);
    Ok(rendered.json)
}

/// Build the farmer ledger page model for the active session
#[wasm_bindgen]
pub fn build_ledger_view(context_json: &str, ledger_json: &str) -> Result<String, JsValue> {
    let rendered = render_ledger_view(context_json, ledger_json).map_err(to_js_error)?;
    warn_issues(&rendered.issues);
    Ok(rendered.json)
}

/// List reference problems in a stock history without rendering it
#[wasm_bindgen]
pub fn find_ledger_issues_json(entries_json: &str) -> Result<String, JsValue> {
    let entries: Vec<StockLedgerEntry> =
        shared::from_json("stock history", entries_json).map_err(to_js_error)?;
    serde_json::to_string(&find_ledger_issues(&entries)).map_err(to_js_error)
}

/// Format a ledger type for display (`TRANSFER_OUT` -> `Transfer Out`)
#[wasm_bindgen]
pub fn format_ledger_type(entry_type: &str) -> String {
    format_type_label(entry_type)
}

/// DOM id of the row rendering `entry_id`
#[wasm_bindgen]
pub fn ledger_row_anchor(entry_id: &str) -> String {
    format!("ledger-row-{}", entry_id)
}

/// Scroll the row for `entry_id` into view and flash it. Returns false when
/// the row is not on the page.
#[wasm_bindgen]
pub fn highlight_ledger_row(entry_id: &str) -> Result<bool, JsValue> {
    let window = web_sys::window().ok_or_else(|| JsValue::from_str("no window"))?;
    let document = window
        .document()
        .ok_or_else(|| JsValue::from_str("no document"))?;

    let element = match document.get_element_by_id(&ledger_row_anchor(entry_id)) {
        Some(element) => element,
        None => return Ok(false),
    };

    let options = web_sys::ScrollIntoViewOptions::new();
    options.set_behavior(web_sys::ScrollBehavior::Smooth);
    options.set_block(web_sys::ScrollLogicalPosition::Center);
    element.scroll_into_view_with_scroll_into_view_options(&options);
    element.class_list().add_1(HIGHLIGHT_CLASS)?;

    let target = element.clone();
    let clear = Closure::once_into_js(move || {
        let _ = target.class_list().remove_1(HIGHLIGHT_CLASS);
    });
    window.set_timeout_with_callback_and_timeout_and_arguments_0(
        clear.unchecked_ref::<js_sys::Function>(),
        HIGHLIGHT_DURATION_MS,
    )?;

    Ok(true)
}

/// Calculate mortality as a percentage of DOC
#[wasm_bindgen]
pub fn calculate_mortality_rate(doc: i32, mortality: i32) -> f64 {
    mortality_rate(doc, mortality)
        .map(decimal_to_f64)
        .unwrap_or(0.0)
}

/// Classify a mortality percentage with the default thresholds
#[wasm_bindgen]
pub fn classify_mortality_rate(rate: f64) -> String {
    let status = classify_mortality(decimal_from_f64(rate), &MortalityThresholds::default());
    format!("{}", status)
}

/// Calculate feed conversion ratio from bags consumed
#[wasm_bindgen]
pub fn calculate_fcr(feed_bags: f64, bag_weight_kg: f64, live_birds: i32, average_weight_kg: f64) -> f64 {
    let feed_kg = decimal_from_f64(feed_bags).checked_mul(decimal_from_f64(bag_weight_kg));
    let live_weight =
        decimal_from_f64(average_weight_kg).checked_mul(Decimal::from(live_birds.max(0)));
    match (feed_kg, live_weight) {
        (Some(feed_kg), Some(live_weight)) => feed_conversion_ratio(feed_kg, live_weight)
            .map(decimal_to_f64)
            .unwrap_or(0.0),
        _ => 0.0,
    }
}

/// Calculate European Production Index
#[wasm_bindgen]
pub fn calculate_epi(livability_percent: f64, average_weight_kg: f64, age_days: i32, fcr: f64) -> f64 {
    european_production_index(
        decimal_from_f64(livability_percent),
        decimal_from_f64(average_weight_kg),
        age_days,
        decimal_from_f64(fcr),
    )
    .map(decimal_to_f64)
    .unwrap_or(0.0)
}
