//! Sale CRUD, lookup and cancellation endpoints.

use std::sync::Arc;

use axum::Json;
use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use chrono::{DateTime, Utc};
use common::{BranchId, CustomerId, ProductId, SaleId, SaleItemId};
use domain::{BranchRef, CreateSale, CustomerRef, Money, SaleItemInput, UpdateSale};
use event_sink::EventSink;
use read_cache::CacheBackend;
use sale_store::SaleStore;
use sales::{SaleDto, SaleItemDto, SaleLifecycleService};
use serde::{Deserialize, Serialize};
use tokio_util::sync::CancellationToken;

use crate::error::ApiError;
use crate::response::ApiResponse;

/// Shared application state accessible from all handlers.
pub struct AppState<S, C, E>
where
    S: SaleStore,
    C: CacheBackend,
    E: EventSink,
{
    pub service: SaleLifecycleService<S, C, E>,
    /// Fired on shutdown; every request works under a child of it.
    pub shutdown: CancellationToken,
}

impl<S, C, E> AppState<S, C, E>
where
    S: SaleStore,
    C: CacheBackend,
    E: EventSink,
{
    pub fn new(service: SaleLifecycleService<S, C, E>, shutdown: CancellationToken) -> Self {
        Self { service, shutdown }
    }

    fn request_token(&self) -> CancellationToken {
        self.shutdown.child_token()
    }
}

// -- Request types --

#[derive(Deserialize)]
pub struct CreateSaleRequest {
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub branch_id: BranchId,
    pub branch_name: String,
    #[serde(default)]
    pub items: Vec<SaleItemRequest>,
}

#[derive(Deserialize)]
pub struct UpdateSaleRequest {
    /// Must match the path id when present.
    pub id: Option<SaleId>,
    #[serde(default)]
    pub is_cancelled: bool,
    /// Empty keeps the current lines.
    #[serde(default)]
    pub items: Vec<SaleItemRequest>,
}

#[derive(Deserialize)]
pub struct SaleItemRequest {
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    /// Ignored: the discount policy decides.
    #[serde(default)]
    pub discount_cents: i64,
}

impl From<SaleItemRequest> for SaleItemInput {
    fn from(req: SaleItemRequest) -> Self {
        SaleItemInput::new(
            req.product_id,
            req.product_name,
            req.quantity,
            Money::from_cents(req.unit_price_cents),
        )
        .with_discount(Money::from_cents(req.discount_cents))
    }
}

#[derive(Deserialize)]
pub struct DateRangeParams {
    pub start: DateTime<Utc>,
    pub end: DateTime<Utc>,
}

// -- Response types --

#[derive(Debug, Serialize)]
pub struct SaleResponse {
    pub id: SaleId,
    pub sale_number: String,
    pub sale_date: DateTime<Utc>,
    pub customer_id: CustomerId,
    pub customer_name: String,
    pub branch_id: BranchId,
    pub branch_name: String,
    pub is_cancelled: bool,
    pub total_amount_cents: i64,
    pub items: Vec<SaleItemResponse>,
}

#[derive(Debug, Serialize)]
pub struct SaleItemResponse {
    pub id: SaleItemId,
    pub product_id: ProductId,
    pub product_name: String,
    pub quantity: u32,
    pub unit_price_cents: i64,
    pub discount_cents: i64,
    pub total_amount_cents: i64,
}

impl From<SaleItemDto> for SaleItemResponse {
    fn from(item: SaleItemDto) -> Self {
        Self {
            id: item.id,
            product_id: item.product_id,
            product_name: item.product_name,
            quantity: item.quantity,
            unit_price_cents: item.unit_price.cents(),
            discount_cents: item.discount.cents(),
            total_amount_cents: item.total_amount.cents(),
        }
    }
}

impl From<SaleDto> for SaleResponse {
    fn from(sale: SaleDto) -> Self {
        Self {
            id: sale.id,
            sale_number: sale.sale_number,
            sale_date: sale.sale_date,
            customer_id: sale.customer_id,
            customer_name: sale.customer_name,
            branch_id: sale.branch_id,
            branch_name: sale.branch_name,
            is_cancelled: sale.is_cancelled,
            total_amount_cents: sale.total_amount.cents(),
            items: sale.items.into_iter().map(SaleItemResponse::from).collect(),
        }
    }
}

type SaleResult = Result<Json<ApiResponse<SaleResponse>>, ApiError>;
type SaleListResult = Result<Json<ApiResponse<Vec<SaleResponse>>>, ApiError>;

fn sale_list(message: &str, sales: Vec<SaleDto>) -> Json<ApiResponse<Vec<SaleResponse>>> {
    let sales = sales.into_iter().map(SaleResponse::from).collect();
    Json(ApiResponse::ok(message, sales))
}

// -- Handlers --

/// POST /sales: create a sale and price its lines.
#[tracing::instrument(skip(state, req), fields(sale_number = %req.sale_number))]
pub async fn create<S, C, E>(
    State(state): State<Arc<AppState<S, C, E>>>,
    Json(req): Json<CreateSaleRequest>,
) -> Result<(StatusCode, Json<ApiResponse<SaleResponse>>), ApiError>
where
    S: SaleStore + 'static,
    C: CacheBackend + 'static,
    E: EventSink + 'static,
{
    let cmd = CreateSale {
        sale_number: req.sale_number,
        sale_date: req.sale_date,
        customer: CustomerRef::new(req.customer_id, req.customer_name),
        branch: BranchRef::new(req.branch_id, req.branch_name),
        items: req.items.into_iter().map(SaleItemInput::from).collect(),
    };

    let sale = state.service.create(cmd, &state.request_token()).await?;

    Ok((
        StatusCode::CREATED,
        Json(ApiResponse::ok("Sale created successfully", sale.into())),
    ))
}

/// GET /sales: list every sale.
#[tracing::instrument(skip(state))]
pub async fn list<S, C, E>(State(state): State<Arc<AppState<S, C, E>>>) -> SaleListResult
where
    S: SaleStore + 'static,
    C: CacheBackend + 'static,
    E: EventSink + 'static,
{
    let sales = state.service.get_all(&state.request_token()).await?;
    Ok(sale_list("Sales retrieved successfully", sales))
}

/// GET /sales/{id}: load a sale by id.
#[tracing::instrument(skip(state))]
pub async fn get<S, C, E>(
    State(state): State<Arc<AppState<S, C, E>>>,
    Path(id): Path<String>,
) -> SaleResult
where
    S: SaleStore + 'static,
    C: CacheBackend + 'static,
    E: EventSink + 'static,
{
    let sale_id = parse_sale_id(&id)?;
    let sale = state
        .service
        .get_by_id(sale_id, &state.request_token())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sale {id} not found")))?;

    Ok(Json(ApiResponse::ok("Sale retrieved successfully", sale.into())))
}

/// GET /sales/number/{number}: load a sale by business number.
#[tracing::instrument(skip(state))]
pub async fn get_by_number<S, C, E>(
    State(state): State<Arc<AppState<S, C, E>>>,
    Path(number): Path<String>,
) -> SaleResult
where
    S: SaleStore + 'static,
    C: CacheBackend + 'static,
    E: EventSink + 'static,
{
    let sale = state
        .service
        .get_by_number(&number, &state.request_token())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sale number {number} not found")))?;

    Ok(Json(ApiResponse::ok("Sale retrieved successfully", sale.into())))
}

/// GET /sales/date-range?start=..&end=..: list sales dated within the range.
#[tracing::instrument(skip(state, params), fields(start = %params.start, end = %params.end))]
pub async fn date_range<S, C, E>(
    State(state): State<Arc<AppState<S, C, E>>>,
    Query(params): Query<DateRangeParams>,
) -> SaleListResult
where
    S: SaleStore + 'static,
    C: CacheBackend + 'static,
    E: EventSink + 'static,
{
    let sales = state
        .service
        .get_by_date_range(params.start, params.end, &state.request_token())
        .await?;
    Ok(sale_list("Sales retrieved successfully", sales))
}

/// PUT /sales/{id}: set the cancellation flag and optionally replace the lines.
#[tracing::instrument(skip(state, req))]
pub async fn update<S, C, E>(
    State(state): State<Arc<AppState<S, C, E>>>,
    Path(id): Path<String>,
    Json(req): Json<UpdateSaleRequest>,
) -> SaleResult
where
    S: SaleStore + 'static,
    C: CacheBackend + 'static,
    E: EventSink + 'static,
{
    let sale_id = parse_sale_id(&id)?;
    if req.id.is_some_and(|body_id| body_id != sale_id) {
        return Err(ApiError::BadRequest(
            "Sale id in the body does not match the path".to_string(),
        ));
    }

    let cmd = UpdateSale::new(sale_id, req.is_cancelled)
        .with_items(req.items.into_iter().map(SaleItemInput::from).collect());

    let sale = state
        .service
        .update(cmd, &state.request_token())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sale {id} not found")))?;

    Ok(Json(ApiResponse::ok("Sale updated successfully", sale.into())))
}

/// POST /sales/{id}/cancel: cancel a sale, leaving its lines alone.
#[tracing::instrument(skip(state))]
pub async fn cancel<S, C, E>(
    State(state): State<Arc<AppState<S, C, E>>>,
    Path(id): Path<String>,
) -> SaleResult
where
    S: SaleStore + 'static,
    C: CacheBackend + 'static,
    E: EventSink + 'static,
{
    let sale_id = parse_sale_id(&id)?;
    let sale = state
        .service
        .cancel(sale_id, &state.request_token())
        .await?
        .ok_or_else(|| ApiError::NotFound(format!("Sale {id} not found")))?;

    Ok(Json(ApiResponse::ok("Sale cancelled successfully", sale.into())))
}

/// DELETE /sales/{id}: hard-delete a sale.
#[tracing::instrument(skip(state))]
pub async fn delete<S, C, E>(
    State(state): State<Arc<AppState<S, C, E>>>,
    Path(id): Path<String>,
) -> Result<Json<ApiResponse<()>>, ApiError>
where
    S: SaleStore + 'static,
    C: CacheBackend + 'static,
    E: EventSink + 'static,
{
    let sale_id = parse_sale_id(&id)?;
    if !state
        .service
        .delete(sale_id, &state.request_token())
        .await?
    {
        return Err(ApiError::NotFound(format!("Sale {id} not found")));
    }

    Ok(Json(ApiResponse::empty("Sale deleted successfully")))
}

fn parse_sale_id(id: &str) -> Result<SaleId, ApiError> {
    let uuid = uuid::Uuid::parse_str(id)
        .map_err(|e| ApiError::BadRequest(format!("Invalid ID format: {e}")))?;
    Ok(SaleId::from_uuid(uuid))
}
