//! FFI use-case API for Flutter-facing calls.
//!
//! # Responsibility
//! - Expose stable, use-case-level editor functions to Dart via FRB.
//! - Route every call through the single editor session of the UI thread.
//!
//! # Invariants
//! - Exported functions must not panic across FFI boundary.
//! - Failures are reported in response envelopes, never thrown.
//! - Calls made before `session_init` fail with a stable message.

use billdraft_core::{
    core_version as core_version_inner, init_logging as init_logging_inner, install_global,
    ping as ping_inner, with_global, DocumentPatch, EditorSession, FooterBlock, LineItem,
    LineItemId, ProfileId, TemplateId, TokenPatch, TotalsResult,
};
use log::warn;
use uuid::Uuid;

const SESSION_MISSING: &str = "editor session not initialized";

/// Minimal health-check API for FRB smoke integration.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn ping() -> String {
    ping_inner().to_owned()
}

/// Expose core crate version through FFI.
///
/// # FFI contract
/// - Sync call, non-blocking.
/// - Never throws; always returns a UTF-8 string.
#[flutter_rust_bridge::frb(sync)]
pub fn core_version() -> String {
    core_version_inner().to_owned()
}

/// Initializes Rust core logging once per process.
///
/// Input semantics:
/// - `level`: one of `trace|debug|info|warn|error` (case-insensitive).
/// - `log_dir`: absolute directory path where rolling logs are written.
///
/// # FFI contract
/// - Sync call; may perform small file-system setup work.
/// - Safe to call repeatedly with the same `level + log_dir` (idempotent).
/// - Returns empty string on success and error message on failure.
#[flutter_rust_bridge::frb(sync)]
pub fn init_logging(level: String, log_dir: String) -> String {
    match init_logging_inner(level.as_str(), log_dir.as_str()) {
        Ok(()) => String::new(),
        Err(err) => err.to_string(),
    }
}

/// Generic action response envelope for editor commands.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EditorActionResponse {
    /// Whether operation succeeded.
    pub ok: bool,
    /// Optional affected entity ID (line item, profile or document code).
    pub id: Option<String>,
    /// Human-readable response message for diagnostics/UI.
    pub message: String,
}

impl EditorActionResponse {
    fn success(message: impl Into<String>, id: Option<String>) -> Self {
        Self {
            ok: true,
            id,
            message: message.into(),
        }
    }

    fn failure(message: impl Into<String>) -> Self {
        Self {
            ok: false,
            id: None,
            message: message.into(),
        }
    }
}

/// Totals breakdown in currency units, rounded to minor units.
#[derive(Debug, Clone, PartialEq)]
pub struct DocumentTotalsView {
    pub subtotal: f64,
    pub discount: f64,
    pub tax: f64,
    pub retention: f64,
    pub grand_total: f64,
    /// Empty on success; otherwise why the zeros were returned.
    pub message: String,
}

impl From<TotalsResult> for DocumentTotalsView {
    fn from(value: TotalsResult) -> Self {
        Self {
            subtotal: value.subtotal,
            discount: value.discount,
            tax: value.tax,
            retention: value.retention,
            grand_total: value.grand_total,
            message: String::new(),
        }
    }
}

/// Footer block as rendered under the document body.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterBlockView {
    pub id: String,
    pub title: String,
    pub body: String,
}

impl From<FooterBlock> for FooterBlockView {
    fn from(value: FooterBlock) -> Self {
        Self {
            id: value.id,
            title: value.title,
            body: value.body,
        }
    }
}

/// Live presentation snapshot as JSON (`{ template, tokens }`).
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PresentationSnapshotResponse {
    pub ok: bool,
    /// Serialized snapshot; empty on failure.
    pub json: String,
    pub message: String,
}

/// Builds the editor session from a JSON seed and installs it.
///
/// # FFI contract
/// - Sync call; must run on the UI thread that issues all later calls.
/// - Succeeds at most once; later calls return a failure envelope.
/// - `id` carries the document code on success.
#[flutter_rust_bridge::frb(sync)]
pub fn session_init(seed_json: String) -> EditorActionResponse {
    let session = match EditorSession::from_json(seed_json.as_str()) {
        Ok(session) => session,
        Err(err) => {
            warn!("event=session_init module=ffi status=error");
            return EditorActionResponse::failure(format!("session_init failed: {err}"));
        }
    };
    let code = session.documents().with_document(|document| document.code.clone());
    match install_global(session) {
        Ok(()) => EditorActionResponse::success("session ready", Some(code)),
        Err(err) => EditorActionResponse::failure(format!("session_init failed: {err}")),
    }
}

/// Returns the current totals breakdown.
///
/// # FFI contract
/// - Sync call, pure computation.
/// - Returns zeros with a message when no session is installed.
#[flutter_rust_bridge::frb(sync)]
pub fn document_totals() -> DocumentTotalsView {
    with_global(|session| DocumentTotalsView::from(session.totals())).unwrap_or_else(|| {
        DocumentTotalsView {
            message: SESSION_MISSING.to_string(),
            ..DocumentTotalsView::from(TotalsResult::default())
        }
    })
}

/// Returns footer blocks visible for the current document kind, in order.
#[flutter_rust_bridge::frb(sync)]
pub fn visible_footer() -> Vec<FooterBlockView> {
    with_global(|session| {
        session
            .visible_footer()
            .into_iter()
            .map(FooterBlockView::from)
            .collect()
    })
    .unwrap_or_default()
}

/// Appends a line item; `id` carries the new line item ID.
#[flutter_rust_bridge::frb(sync)]
pub fn add_line_item(
    title: String,
    quantity: f64,
    unit_price: f64,
    tax_rate: Option<f64>,
    discount: Option<f64>,
) -> EditorActionResponse {
    let mut item = LineItem::new(title, quantity, unit_price);
    item.tax_rate = tax_rate;
    item.discount = discount;
    run_action("add_line_item", |session| {
        session
            .documents()
            .add_line_item(item)
            .map(|id| ("line item added", Some(id.to_string())))
            .map_err(|err| err.to_string())
    })
}

/// Replaces the line item identified by `item_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn update_line_item(
    item_id: String,
    title: String,
    quantity: f64,
    unit_price: f64,
    tax_rate: Option<f64>,
    discount: Option<f64>,
) -> EditorActionResponse {
    let id: LineItemId = match parse_id("item_id", item_id.as_str()) {
        Ok(id) => id,
        Err(message) => return EditorActionResponse::failure(message),
    };
    let mut item = LineItem::with_id(id, title, quantity, unit_price);
    item.tax_rate = tax_rate;
    item.discount = discount;
    run_action("update_line_item", |session| {
        session
            .documents()
            .update_line_item(&item)
            .map(|changed| (changed_label(changed), Some(id.to_string())))
            .map_err(|err| err.to_string())
    })
}

/// Removes the line item identified by `item_id`.
#[flutter_rust_bridge::frb(sync)]
pub fn remove_line_item(item_id: String) -> EditorActionResponse {
    let id: LineItemId = match parse_id("item_id", item_id.as_str()) {
        Ok(id) => id,
        Err(message) => return EditorActionResponse::failure(message),
    };
    run_action("remove_line_item", |session| {
        session
            .documents()
            .remove_line_item(id)
            .map(|removed| ("line item removed", Some(removed.id.to_string())))
            .map_err(|err| err.to_string())
    })
}

/// Makes `profile_id` the active profile; its saved presentation is applied.
#[flutter_rust_bridge::frb(sync)]
pub fn select_profile(profile_id: String) -> EditorActionResponse {
    let id: ProfileId = match parse_id("profile_id", profile_id.as_str()) {
        Ok(id) => id,
        Err(message) => return EditorActionResponse::failure(message),
    };
    run_action("select_profile", |session| {
        session
            .documents()
            .select_profile(id)
            .map(|changed| (changed_label(changed), Some(id.to_string())))
            .map_err(|err| err.to_string())
    })
}

/// Switches the live template.
#[flutter_rust_bridge::frb(sync)]
pub fn set_template(template: String) -> EditorActionResponse {
    run_action("set_template", |session| {
        session
            .presentation()
            .set_template(TemplateId::new(template))
            .map(|changed| (changed_label(changed), None))
            .map_err(|err| err.to_string())
    })
}

/// Merges a JSON token patch (`{"primary_color": "#112233", ...}`) into the
/// live tokens. Keys absent from the patch keep their values.
#[flutter_rust_bridge::frb(sync)]
pub fn merge_tokens(patch_json: String) -> EditorActionResponse {
    let patch: TokenPatch = match serde_json::from_str(patch_json.as_str()) {
        Ok(patch) => patch,
        Err(err) => {
            return EditorActionResponse::failure(format!("merge_tokens failed: invalid patch: {err}"))
        }
    };
    run_action("merge_tokens", |session| {
        session
            .presentation()
            .merge_tokens(&patch)
            .map(|changed| (changed_label(changed), None))
            .map_err(|err| err.to_string())
    })
}

/// Serializes the live presentation state.
#[flutter_rust_bridge::frb(sync)]
pub fn presentation_snapshot() -> PresentationSnapshotResponse {
    let encoded = with_global(|session| serde_json::to_string(&session.presentation().snapshot()));
    match encoded {
        Some(Ok(json)) => PresentationSnapshotResponse {
            ok: true,
            json,
            message: String::new(),
        },
        Some(Err(err)) => PresentationSnapshotResponse {
            ok: false,
            json: String::new(),
            message: format!("presentation_snapshot failed: {err}"),
        },
        None => PresentationSnapshotResponse {
            ok: false,
            json: String::new(),
            message: format!("presentation_snapshot failed: {SESSION_MISSING}"),
        },
    }
}

/// Applies a JSON document patch. A `kind` switch regenerates the code,
/// returned in `id`.
#[flutter_rust_bridge::frb(sync)]
pub fn patch_document(patch_json: String) -> EditorActionResponse {
    let patch: DocumentPatch = match serde_json::from_str(patch_json.as_str()) {
        Ok(patch) => patch,
        Err(err) => {
            return EditorActionResponse::failure(format!(
                "patch_document failed: invalid patch: {err}"
            ))
        }
    };
    run_action("patch_document", |session| {
        let documents = session.documents();
        documents
            .patch_document(&patch)
            .map(|changed| {
                let code = documents.with_document(|document| document.code.clone());
                (changed_label(changed), Some(code))
            })
            .map_err(|err| err.to_string())
    })
}

fn run_action(
    operation: &str,
    action: impl FnOnce(&EditorSession) -> Result<(&'static str, Option<String>), String>,
) -> EditorActionResponse {
    match with_global(action) {
        Some(Ok((message, id))) => EditorActionResponse::success(message, id),
        Some(Err(err)) => {
            warn!("event={operation} module=ffi status=error");
            EditorActionResponse::failure(format!("{operation} failed: {err}"))
        }
        None => EditorActionResponse::failure(format!("{operation} failed: {SESSION_MISSING}")),
    }
}

fn parse_id(field: &str, raw: &str) -> Result<Uuid, String> {
    Uuid::parse_str(raw.trim()).map_err(|_| format!("{field} must be a UUID, got `{raw}`"))
}

fn changed_label(changed: bool) -> &'static str {
    if changed {
        "updated"
    } else {
        "unchanged"
    }
}
