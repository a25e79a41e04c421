use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{patch, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{
    error::AppError,
    middleware::SelectionSessionId,
    services::checkout::CheckoutHandoff,
    services::selection::{SelectionSet, ToggleOutcome},
    sessions::{CheckoutReceipt, SelectionSession, SessionPhase},
    AppState,
};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/selection", post(open_session).get(get_selection))
        .route("/selection/toggle", patch(toggle_seat))
        .route("/selection/remove", patch(remove_seat))
        .route("/selection/clear", patch(clear_selection))
        .route("/selection/checkout", post(checkout))
}

/* ---------- helpers ---------- */

#[derive(Debug, Serialize)]
struct SelectedSeat {
    id: String,
    section: String,
    row: String,
    number: u32,
    price: String,
}

#[derive(Debug, Serialize)]
struct SelectionResponse {
    session_id: uuid::Uuid,
    phase: SessionPhase,
    seats: Vec<SelectedSeat>,
    subtotal: String,
    service_fee: String,
    total: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    receipt: Option<CheckoutReceipt>,
}

// Суммы пересчитываются на каждый ответ
fn selection_response(state: &AppState, session: SelectionSession) -> SelectionResponse {
    let summary = state.pricing.summary(&session.selection);
    let phase = session.phase();

    SelectionResponse {
        session_id: session.id,
        phase,
        seats: session
            .selection
            .iter()
            .map(|seat| SelectedSeat {
                id: seat.id.clone(),
                section: seat.section_id.clone(),
                row: seat.row_label.clone(),
                number: seat.seat_number,
                price: format!("{:.2}", seat.price),
            })
            .collect(),
        subtotal: format!("{:.2}", summary.subtotal),
        service_fee: format!("{:.2}", summary.service_fee),
        total: format!("{:.2}", summary.total),
        receipt: session.receipt,
    }
}

#[derive(Debug, Deserialize)]
struct SeatRequest {
    seat_id: String,
}

/* ---------- SESSION ---------- */

// POST /api/selection
async fn open_session(State(state): State<Arc<AppState>>) -> Result<impl IntoResponse, AppError> {
    let id = state.sessions.open().await;
    let session = state.sessions.snapshot(id).await?;
    Ok((StatusCode::CREATED, Json(selection_response(&state, session))))
}

// GET /api/selection
async fn get_selection(
    State(state): State<Arc<AppState>>,
    SelectionSessionId(id): SelectionSessionId,
) -> Result<impl IntoResponse, AppError> {
    let session = state.sessions.snapshot(id).await?;
    Ok((StatusCode::OK, Json(selection_response(&state, session))))
}

/* ---------- SEATS ---------- */

#[derive(Debug, Serialize)]
struct ToggleResponse {
    outcome: ToggleOutcome,
    #[serde(flatten)]
    selection: SelectionResponse,
}

// PATCH /api/selection/toggle
async fn toggle_seat(
    State(state): State<Arc<AppState>>,
    SelectionSessionId(id): SelectionSessionId,
    Json(req): Json<SeatRequest>,
) -> Result<impl IntoResponse, AppError> {
    // Занятость определяется картой мест, а не клиентом
    let seat = state
        .seat_map
        .find_seat(&req.seat_id)
        .ok_or_else(|| AppError::NotFound(format!("seat {} not found", req.seat_id)))?;

    if seat.booked {
        tracing::debug!("session {}: seat {} is already booked", id, seat.id);
        return Err(AppError::Conflict(format!("seat {} is already booked", seat.id)));
    }

    let (outcome, session) = state.sessions.update(id, |selection| selection.toggle(&seat)).await?;
    tracing::debug!("session {}: toggle {} -> {:?}", id, seat.id, outcome);

    Ok((
        StatusCode::OK,
        Json(ToggleResponse {
            outcome,
            selection: selection_response(&state, session),
        }),
    ))
}

// PATCH /api/selection/remove
async fn remove_seat(
    State(state): State<Arc<AppState>>,
    SelectionSessionId(id): SelectionSessionId,
    Json(req): Json<SeatRequest>,
) -> Result<impl IntoResponse, AppError> {
    let (_, session) = state.sessions.update(id, |selection| selection.remove(&req.seat_id)).await?;
    Ok((StatusCode::OK, Json(selection_response(&state, session))))
}

// PATCH /api/selection/clear
async fn clear_selection(
    State(state): State<Arc<AppState>>,
    SelectionSessionId(id): SelectionSessionId,
) -> Result<impl IntoResponse, AppError> {
    let (_, session) = state.sessions.update(id, |selection| selection.clear()).await?;
    Ok((StatusCode::OK, Json(selection_response(&state, session))))
}

/* ---------- CHECKOUT ---------- */

// POST /api/selection/checkout
async fn checkout(
    State(state): State<Arc<AppState>>,
    SelectionSessionId(id): SelectionSessionId,
) -> Result<impl IntoResponse, AppError> {
    // Выбор замораживается до ответа шлюза: повторное оформление и правки получают 419
    let selection = state.sessions.begin_checkout(id).await?;

    let receipt = match submit_selection(&state, &selection).await {
        Ok(done) => done,
        Err(e) => {
            tracing::warn!("session {}: checkout failed: {}", id, e);
            state.sessions.abort_checkout(id).await?;
            return Err(e);
        }
    };

    state.sessions.mark_submitted(id, receipt).await?;

    let session = state.sessions.snapshot(id).await?;
    Ok((StatusCode::OK, Json(selection_response(&state, session))))
}

async fn submit_selection(state: &AppState, selection: &SelectionSet) -> Result<CheckoutReceipt, AppError> {
    let handoff = CheckoutHandoff::from_selection(selection, &state.pricing)?;
    let response = state.checkout.submit(&handoff).await?;

    Ok(CheckoutReceipt {
        order_id: handoff.order_id,
        payment_id: response.payment_id,
        payment_url: response.payment_url,
        total: handoff.total,
    })
}
