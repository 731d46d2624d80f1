// 🌐 HTTP API - JSON routes over the shared workspace
//
// Every response uses the `{ success, data, error }` envelope.
// Handlers hold the workspace lock for the whole (synchronous) operation
// and never await while holding it.

use axum::{
    extract::{Path, Query, State},
    http::{
        header::{CONTENT_DISPOSITION, CONTENT_TYPE},
        StatusCode,
    },
    response::{IntoResponse, Json, Response},
    routing::{get, patch, post, put},
    Router,
};
use chrono::{NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::entities::{Product, Supplier};
use crate::error::ProcurementError;
use crate::export::write_csv;
use crate::quality::{check_list, QualityReport};
use crate::quotation::{DraftItem, Quotation, QuotationDraft, QuotationKind, QuotationStatus, ResponseDeadline, ResponseForm};
use crate::quotation_book::{QuotationFilter, SubmitOutcome};
use crate::shopping_list::{ItemEdit, LineItem, ListFilter, ListTab, PurchaseReceipt, ShoppingList, SupplierOrder};
use crate::statistics::QuotationStats;
use crate::workspace::Workspace;

// ============================================================================
// STATE & ENVELOPE
// ============================================================================

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub workspace: Arc<RwLock<Workspace>>,

    /// Prefix for links sent to suppliers
    pub public_base_url: Arc<str>,

    pub default_deadline: ResponseDeadline,
}

impl AppState {
    pub fn new(workspace: Workspace, public_base_url: &str, default_deadline: ResponseDeadline) -> Self {
        AppState {
            workspace: Arc::new(RwLock::new(workspace)),
            public_base_url: Arc::from(public_base_url),
            default_deadline,
        }
    }
}

/// API Response wrapper
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    pub success: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
}

impl<T> ApiResponse<T> {
    pub fn ok(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            error: None,
        }
    }

    pub fn err(message: impl Into<String>) -> Self {
        Self {
            success: false,
            data: None,
            error: Some(message.into()),
        }
    }
}

#[derive(Debug)]
pub struct ApiError {
    status: StatusCode,
    message: String,
}

impl ApiError {
    fn bad_request(message: impl Into<String>) -> Self {
        ApiError {
            status: StatusCode::BAD_REQUEST,
            message: message.into(),
        }
    }
}

pub(crate) fn error_status(err: &ProcurementError) -> StatusCode {
    if err.is_not_found() {
        StatusCode::NOT_FOUND
    } else if err.is_conflict() {
        StatusCode::CONFLICT
    } else {
        match err {
            ProcurementError::InvalidDraft(_)
            | ProcurementError::InvalidPrice { .. }
            | ProcurementError::InvalidQuantity { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }
}

impl From<ProcurementError> for ApiError {
    fn from(err: ProcurementError) -> Self {
        let status = error_status(&err);
        if status == StatusCode::INTERNAL_SERVER_ERROR {
            tracing::error!(error = %err, "request failed");
        }
        ApiError {
            status,
            message: err.to_string(),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        (self.status, Json(ApiResponse::<()>::err(self.message))).into_response()
    }
}

type ApiResult<T> = Result<Json<ApiResponse<T>>, ApiError>;

fn ok<T>(data: T) -> ApiResult<T> {
    Ok(Json(ApiResponse::ok(data)))
}

// ============================================================================
// VIEWS (records plus computed totals)
// ============================================================================

#[derive(Debug, Serialize)]
pub struct QuotationView {
    #[serde(flatten)]
    pub quotation: Quotation,
    pub item_count: usize,
    pub estimated_total: f64,
    pub response_total: Option<f64>,
    pub remaining: String,
}

impl QuotationView {
    fn new(quotation: &Quotation) -> Self {
        QuotationView {
            item_count: quotation.item_count(),
            estimated_total: quotation.estimated_total(),
            response_total: quotation.response_total(),
            remaining: quotation.remaining_label(Utc::now()),
            quotation: quotation.clone(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ItemView {
    #[serde(flatten)]
    pub item: LineItem,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct OrderView {
    pub supplier_id: String,
    pub supplier_name: String,
    pub supplier_kind: String,
    pub location: String,
    pub minimum_order: f64,
    pub homologated: bool,
    pub purchased: bool,
    pub total: f64,
    pub shortfall: Option<f64>,
    pub items: Vec<ItemView>,
}

impl OrderView {
    fn new(order: &SupplierOrder) -> Self {
        OrderView {
            supplier_id: order.supplier_id.clone(),
            supplier_name: order.supplier_name.clone(),
            supplier_kind: order.supplier_kind.as_str().to_string(),
            location: order.location.clone(),
            minimum_order: order.minimum_order,
            homologated: order.homologated,
            purchased: order.purchased,
            total: order.total(),
            shortfall: order.shortfall(),
            items: order
                .items
                .iter()
                .map(|item| ItemView {
                    total: item.total(),
                    item: item.clone(),
                })
                .collect(),
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ListView {
    pub id: String,
    pub issued_on: NaiveDate,
    pub status: String,
    pub supplier_count: usize,
    pub product_count: usize,
    pub grand_total: f64,
    pub orders: Vec<OrderView>,
}

impl ListView {
    fn new(list: &ShoppingList) -> Self {
        ListView {
            id: list.id.clone(),
            issued_on: list.issued_on,
            status: list.status.as_str().to_string(),
            supplier_count: list.supplier_count(),
            product_count: list.product_count(),
            grand_total: list.grand_total(),
            orders: list.orders.iter().map(OrderView::new).collect(),
        }
    }
}

// ============================================================================
// REQUEST BODIES & QUERIES
// ============================================================================

#[derive(Debug, Default, Deserialize)]
pub struct SupplierQuery {
    pub q: Option<String>,
    pub homologated: Option<bool>,
}

#[derive(Debug, Default, Deserialize)]
pub struct SearchQuery {
    pub q: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct QuotationQuery {
    pub kind: Option<String>,
    pub status: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct HomologationBody {
    pub homologated: bool,
}

#[derive(Debug, Deserialize)]
pub struct CreateQuotationBody {
    pub name: String,
    pub supplier_id: String,
    #[serde(default)]
    pub kind: Option<QuotationKind>,

    /// Defaults to the configured deadline
    #[serde(default)]
    pub deadline_hours: Option<u32>,

    pub items: Vec<DraftItem>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Deserialize)]
pub struct DeadlineBody {
    /// 0 = no deadline
    pub hours: u32,
}

/// A price as typed by the supplier: number or text ("12,50")
#[derive(Debug, Deserialize)]
#[serde(untagged)]
pub enum RawPrice {
    Number(f64),
    Text(String),
}

impl RawPrice {
    fn as_text(&self) -> String {
        match self {
            RawPrice::Number(value) => value.to_string(),
            RawPrice::Text(text) => text.clone(),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct PriceInput {
    pub product_id: String,
    pub price: RawPrice,
}

#[derive(Debug, Deserialize)]
pub struct ResponseBody {
    pub prices: Vec<PriceInput>,
    #[serde(default)]
    pub note: String,
}

#[derive(Debug, Serialize)]
pub struct ResponseOutcome {
    pub outcome: SubmitOutcome,
    pub total: f64,
}

#[derive(Debug, Serialize)]
pub struct ShareLinks {
    pub form_path: String,
    pub message: String,
    pub whatsapp_link: String,
}

#[derive(Debug, Default, Deserialize)]
pub struct ListQuery {
    pub q: Option<String>,
    pub tab: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct ConsolidateQuery {
    pub issued_on: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
pub struct ReorderBody {
    pub active_id: String,
    pub over_id: String,
}

#[derive(Debug, Serialize)]
pub struct ReorderOutcome {
    pub moved: bool,
    pub list: ListView,
}

// ============================================================================
// SUPPLIER & PRODUCT HANDLERS
// ============================================================================

/// GET /api/health - Health check
async fn health_check() -> Json<ApiResponse<&'static str>> {
    Json(ApiResponse::ok("OK"))
}

/// GET /api/suppliers - Search suppliers
async fn list_suppliers(State(state): State<AppState>, Query(query): Query<SupplierQuery>) -> ApiResult<Vec<Supplier>> {
    let workspace = state.workspace.read().await;
    let suppliers = workspace
        .suppliers
        .search(query.q.as_deref().unwrap_or_default())
        .into_iter()
        .filter(|s| query.homologated.map_or(true, |h| s.homologated == h))
        .collect();
    ok(suppliers)
}

/// GET /api/suppliers/:id
async fn get_supplier(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<Supplier> {
    let workspace = state.workspace.read().await;
    let supplier = workspace
        .suppliers
        .find_by_id(&id)
        .ok_or(ProcurementError::SupplierNotFound(id))?;
    ok(supplier)
}

/// PUT /api/suppliers/:id/homologation
async fn set_homologation(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<HomologationBody>,
) -> ApiResult<Supplier> {
    let mut workspace = state.workspace.write().await;
    ok(workspace.suppliers.set_homologated(&id, body.homologated)?)
}

/// GET /api/products - Search the catalogue
async fn list_products(State(state): State<AppState>, Query(query): Query<SearchQuery>) -> ApiResult<Vec<Product>> {
    let workspace = state.workspace.read().await;
    let products = workspace
        .catalog
        .search(query.q.as_deref().unwrap_or_default())
        .into_iter()
        .cloned()
        .collect();
    ok(products)
}

// ============================================================================
// QUOTATION HANDLERS
// ============================================================================

/// GET /api/quotations - List quotations by kind and status
async fn list_quotations(
    State(state): State<AppState>,
    Query(query): Query<QuotationQuery>,
) -> ApiResult<Vec<QuotationView>> {
    let mut filter = QuotationFilter::default();
    if let Some(kind) = query.kind.as_deref().filter(|k| !k.is_empty()) {
        filter.kind = Some(QuotationKind::parse(kind).ok_or_else(|| ApiError::bad_request(format!("unknown kind: {}", kind)))?);
    }
    if let Some(status) = query.status.as_deref().filter(|s| !s.is_empty() && *s != "all") {
        filter.status =
            Some(QuotationStatus::parse(status).ok_or_else(|| ApiError::bad_request(format!("unknown status: {}", status)))?);
    }

    let mut workspace = state.workspace.write().await;
    workspace.quotations.refresh_statuses(Utc::now());
    ok(workspace.quotations.list(&filter).into_iter().map(QuotationView::new).collect())
}

/// POST /api/quotations - Issue a quotation from a draft
async fn create_quotation(
    State(state): State<AppState>,
    Json(body): Json<CreateQuotationBody>,
) -> Result<(StatusCode, Json<ApiResponse<QuotationView>>), ApiError> {
    let deadline = match body.deadline_hours {
        Some(hours) => ResponseDeadline::from_hours(hours)
            .ok_or_else(|| ApiError::bad_request(format!("unsupported deadline: {} hours", hours)))?,
        None => state.default_deadline,
    };
    let draft = QuotationDraft {
        name: body.name,
        supplier_id: Some(body.supplier_id),
        deadline,
        items: body.items,
        note: body.note,
    };

    let mut workspace = state.workspace.write().await;
    let Workspace {
        suppliers,
        catalog,
        quotations,
        ..
    } = &mut *workspace;
    let quotation = quotations.create(
        &draft,
        body.kind.unwrap_or(QuotationKind::Automatic),
        suppliers,
        catalog,
        Utc::now(),
    )?;

    Ok((StatusCode::CREATED, Json(ApiResponse::ok(QuotationView::new(quotation)))))
}

/// GET /api/quotations/stats - Dashboard statistics
async fn quotation_stats(State(state): State<AppState>) -> ApiResult<QuotationStats> {
    let mut workspace = state.workspace.write().await;
    workspace.quotations.refresh_statuses(Utc::now());
    ok(workspace.quotation_stats())
}

/// GET /api/quotations/:id
async fn get_quotation(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<QuotationView> {
    let workspace = state.workspace.read().await;
    ok(QuotationView::new(workspace.quotations.get(&id)?))
}

/// DELETE /api/quotations/:id
async fn delete_quotation(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<QuotationView> {
    let mut workspace = state.workspace.write().await;
    let removed = workspace.quotations.delete(&id)?;
    ok(QuotationView::new(&removed))
}

/// PUT /api/quotations/:id/deadline
async fn update_deadline(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<DeadlineBody>,
) -> ApiResult<QuotationView> {
    let deadline = ResponseDeadline::from_hours(body.hours)
        .ok_or_else(|| ApiError::bad_request(format!("unsupported deadline: {} hours", body.hours)))?;

    let mut workspace = state.workspace.write().await;
    ok(QuotationView::new(workspace.quotations.update_deadline(&id, deadline)?))
}

/// GET /api/quotations/:id/share - Message and WhatsApp link for the supplier
async fn share_quotation(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ShareLinks> {
    let workspace = state.workspace.read().await;
    let quotation = workspace.quotations.get(&id)?;
    ok(ShareLinks {
        form_path: quotation.form_path(),
        message: quotation.share_message(&state.public_base_url),
        whatsapp_link: quotation.whatsapp_link(&state.public_base_url),
    })
}

/// POST /api/quotations/:id/response - Supplier submits prices
async fn submit_response(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ResponseBody>,
) -> ApiResult<ResponseOutcome> {
    let mut workspace = state.workspace.write().await;

    let mut form = ResponseForm::new(workspace.quotations.get(&id)?);
    for input in &body.prices {
        form.set_price(&input.product_id, &input.price.as_text())?;
    }
    form.set_note(&body.note)?;
    let total = form.total();

    let outcome = workspace
        .quotations
        .submit_response(&id, form.into_response(Utc::now()))?;
    ok(ResponseOutcome { outcome, total })
}

// ============================================================================
// SHOPPING LIST HANDLERS
// ============================================================================

/// GET /api/shopping-lists - Search by tab and term
async fn list_shopping_lists(State(state): State<AppState>, Query(query): Query<ListQuery>) -> ApiResult<Vec<ListView>> {
    let tab = match query.tab.as_deref().filter(|t| !t.is_empty()) {
        Some(tab) => ListTab::parse(tab).ok_or_else(|| ApiError::bad_request(format!("unknown tab: {}", tab)))?,
        None => ListTab::default(),
    };
    let filter = ListFilter {
        tab,
        term: query.q.unwrap_or_default(),
    };

    let workspace = state.workspace.read().await;
    ok(workspace.lists.search(&filter).into_iter().map(ListView::new).collect())
}

/// POST /api/shopping-lists/consolidate - Build a list from answered quotations
async fn consolidate_lists(
    State(state): State<AppState>,
    Query(query): Query<ConsolidateQuery>,
) -> Result<(StatusCode, Json<ApiResponse<ListView>>), ApiError> {
    let issued_on = query.issued_on.unwrap_or_else(|| Utc::now().date_naive());

    let mut workspace = state.workspace.write().await;
    let list = workspace.consolidate_answers(issued_on)?;
    Ok((StatusCode::CREATED, Json(ApiResponse::ok(ListView::new(list)))))
}

/// GET /api/shopping-lists/:id
async fn get_shopping_list(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ListView> {
    let workspace = state.workspace.read().await;
    ok(ListView::new(workspace.lists.get(&id)?))
}

/// GET /api/shopping-lists/:id/quality
async fn list_quality(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<QualityReport> {
    let workspace = state.workspace.read().await;
    ok(check_list(workspace.lists.get(&id)?))
}

/// PUT /api/shopping-lists/:id/order - Drag-and-drop reorder
async fn reorder_suppliers(
    State(state): State<AppState>,
    Path(id): Path<String>,
    Json(body): Json<ReorderBody>,
) -> ApiResult<ReorderOutcome> {
    let mut workspace = state.workspace.write().await;
    let list = workspace.lists.get_mut(&id)?;
    let moved = list.reorder(&body.active_id, &body.over_id);
    ok(ReorderOutcome {
        moved,
        list: ListView::new(list),
    })
}

/// PATCH /api/shopping-lists/:id/suppliers/:sid/items/:iid
async fn edit_item(
    State(state): State<AppState>,
    Path((id, supplier_id, item_id)): Path<(String, String, String)>,
    Json(edit): Json<ItemEdit>,
) -> ApiResult<ItemView> {
    let mut workspace = state.workspace.write().await;
    let item = workspace
        .lists
        .get_mut(&id)?
        .edit_item(&supplier_id, &item_id, &edit)?;
    ok(ItemView {
        total: item.total(),
        item: item.clone(),
    })
}

/// POST /api/shopping-lists/:id/suppliers/:sid/finalize
async fn finalize_supplier(
    State(state): State<AppState>,
    Path((id, supplier_id)): Path<(String, String)>,
) -> ApiResult<PurchaseReceipt> {
    let mut workspace = state.workspace.write().await;
    ok(workspace.lists.get_mut(&id)?.finalize_supplier(&supplier_id)?)
}

/// POST /api/shopping-lists/:id/finalize
async fn finalize_list(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<PurchaseReceipt> {
    let mut workspace = state.workspace.write().await;
    ok(workspace.lists.get_mut(&id)?.finalize()?)
}

/// POST /api/shopping-lists/:id/cancel
async fn cancel_list(State(state): State<AppState>, Path(id): Path<String>) -> ApiResult<ListView> {
    let mut workspace = state.workspace.write().await;
    let list = workspace.lists.get_mut(&id)?;
    list.cancel()?;
    ok(ListView::new(list))
}

/// GET /api/shopping-lists/:id/export.csv
async fn export_csv(State(state): State<AppState>, Path(id): Path<String>) -> Result<Response, ApiError> {
    let workspace = state.workspace.read().await;
    let list = workspace.lists.get(&id)?;

    let mut buffer = Vec::new();
    write_csv(list, &mut buffer)?;

    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8".to_string()),
            (CONTENT_DISPOSITION, format!("attachment; filename=\"shopping-list-{}.csv\"", list.id)),
        ],
        buffer,
    )
        .into_response())
}

// ============================================================================
// ROUTER
// ============================================================================

pub fn router(state: AppState) -> Router {
    let api_routes = Router::new()
        .route("/health", get(health_check))
        .route("/suppliers", get(list_suppliers))
        .route("/suppliers/:id", get(get_supplier))
        .route("/suppliers/:id/homologation", put(set_homologation))
        .route("/products", get(list_products))
        .route("/quotations", get(list_quotations).post(create_quotation))
        .route("/quotations/stats", get(quotation_stats))
        .route("/quotations/:id", get(get_quotation).delete(delete_quotation))
        .route("/quotations/:id/deadline", put(update_deadline))
        .route("/quotations/:id/share", get(share_quotation))
        .route("/quotations/:id/response", post(submit_response))
        .route("/shopping-lists", get(list_shopping_lists))
        .route("/shopping-lists/consolidate", post(consolidate_lists))
        .route("/shopping-lists/:id", get(get_shopping_list))
        .route("/shopping-lists/:id/quality", get(list_quality))
        .route("/shopping-lists/:id/order", put(reorder_suppliers))
        .route("/shopping-lists/:id/suppliers/:sid/items/:iid", patch(edit_item))
        .route("/shopping-lists/:id/suppliers/:sid/finalize", post(finalize_supplier))
        .route("/shopping-lists/:id/finalize", post(finalize_list))
        .route("/shopping-lists/:id/cancel", post(cancel_list))
        .route("/shopping-lists/:id/export.csv", get(export_csv))
        .with_state(state);

    Router::new().nest("/api", api_routes)
}

// ============================================================================
// TESTS
// ============================================================================
