//! seats.rs
//!
//! Карта мест: сводка по секциям зала и постраничный список мест
//! с фильтрами по ряду и статусу.

use axum::{
    extract::{Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::get,
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::{error::AppError, models::Seat, AppState};

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/venue", get(get_venue))
        .route("/seats", get(get_seats))
}

/* ---------- VENUE ---------- */

#[derive(Debug, Serialize)]
struct SectionResponse {
    id: String,
    display_name: String,
    unit_price: String,
    rows: Vec<String>,
    seats_per_row: u32,
    column_groups: u32,
    total_seats: u32,
    booked_seats: u32,
    free_seats: u32,
    potential_revenue: String,
}

#[derive(Debug, Serialize)]
struct VenueResponse {
    name: String,
    service_fee: String,
    total_seats: u32,
    free_seats: u32,
    sections: Vec<SectionResponse>,
}

// GET /api/venue
async fn get_venue(State(state): State<Arc<AppState>>) -> impl IntoResponse {
    let map = &state.seat_map;

    let sections: Vec<SectionResponse> = map
        .sections()
        .iter()
        .map(|section| {
            let occ = map.occupancy(section);
            SectionResponse {
                id: section.id.clone(),
                display_name: section.display_name.clone(),
                unit_price: format!("{:.2}", section.unit_price),
                rows: section.row_labels.clone(),
                seats_per_row: section.seats_per_row,
                column_groups: section.column_groups,
                total_seats: occ.total_seats,
                booked_seats: occ.booked_seats,
                free_seats: occ.free_seats,
                potential_revenue: format!("{:.2}", occ.potential_revenue),
            }
        })
        .collect();

    let response = VenueResponse {
        name: map.venue().name.clone(),
        service_fee: format!("{:.2}", state.pricing.service_fee()),
        total_seats: sections.iter().map(|s| s.total_seats).sum(),
        free_seats: sections.iter().map(|s| s.free_seats).sum(),
        sections,
    };

    tracing::debug!(
        "Venue overview: {} seats, {} free",
        response.total_seats,
        response.free_seats
    );

    (StatusCode::OK, Json(response))
}

/* ---------- SEATS ---------- */

const MAX_PAGE_SIZE: u32 = 200;

#[derive(Debug, Deserialize)]
struct SeatsQuery {
    section: String,
    page: Option<u32>,
    #[serde(rename = "pageSize")]
    page_size: Option<u32>,
    row: Option<String>,
    status: Option<String>, // FREE, BOOKED
}

#[derive(Debug, Serialize)]
struct SeatResponse {
    id: String,
    row: String,
    number: u32,
    price: String,
    status: &'static str,
}

impl From<Seat> for SeatResponse {
    fn from(seat: Seat) -> Self {
        SeatResponse {
            status: if seat.booked { "BOOKED" } else { "FREE" },
            price: format!("{:.2}", seat.price),
            id: seat.id,
            row: seat.row_label,
            number: seat.seat_number,
        }
    }
}

// GET /api/seats
async fn get_seats(
    State(state): State<Arc<AppState>>,
    Query(params): Query<SeatsQuery>,
) -> Result<impl IntoResponse, AppError> {
    let section = state
        .seat_map
        .section(&params.section)
        .ok_or_else(|| AppError::NotFound(format!("section {} not found", params.section)))?;

    if let Some(ref row) = params.row {
        if !section.row_labels.contains(row) {
            return Err(AppError::BadRequest(format!("row {} does not exist in {}", row, section.id)));
        }
    }
    let booked_filter = match params.status.as_deref() {
        None => None,
        Some("FREE") => Some(false),
        Some("BOOKED") => Some(true),
        Some(_) => return Err(AppError::BadRequest("status должен быть FREE | BOOKED".to_string())),
    };

    let page = params.page.unwrap_or(1).max(1);
    let page_size = params.page_size.unwrap_or(50).clamp(1, MAX_PAGE_SIZE);
    let offset = (page - 1).saturating_mul(page_size) as usize;

    let payload: Vec<SeatResponse> = state
        .seat_map
        .list_seats(section)
        .filter(|seat| params.row.as_ref().map_or(true, |row| &seat.row_label == row))
        .filter(|seat| booked_filter.map_or(true, |booked| seat.booked == booked))
        .skip(offset)
        .take(page_size as usize)
        .map(SeatResponse::from)
        .collect();

    Ok((StatusCode::OK, Json(payload)))
}
