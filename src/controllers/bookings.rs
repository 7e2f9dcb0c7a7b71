use axum::{
    extract::{Path, State},
    response::IntoResponse,
    routing::{get, put},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;

use crate::error::BookingError;
use crate::middleware::AuthUser;
use crate::AppState;

pub fn routes() -> Router<Arc<AppState>> {
    Router::new()
        .route("/booking", get(get_booking).post(create_booking))
        .route("/booking/{booking_id}", put(change_booking))
}

/* ---------- wire shapes ---------- */

#[derive(Debug, Deserialize)]
struct BookingRequest {
    #[serde(rename = "roomid")]
    room_id: i64,
}

#[derive(Debug, Serialize)]
struct RoomView {
    id: i64,
    name: String,
    capacity: i32,
}

#[derive(Debug, Serialize)]
struct BookingWithRoomResponse {
    id: i64,
    #[serde(rename = "Room")]
    room: RoomView,
}

#[derive(Debug, Serialize)]
struct BookingIdResponse {
    #[serde(rename = "bookingId")]
    booking_id: i64,
}

/* ---------- handlers ---------- */

// GET /booking
async fn get_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
) -> Result<impl IntoResponse, BookingError> {
    let (booking, room) = state.booking.booking_for_user(user.user_id).await?;

    Ok(Json(BookingWithRoomResponse {
        id: booking.id,
        room: RoomView {
            id: room.id,
            name: room.name,
            capacity: room.capacity,
        },
    }))
}

// POST /booking
async fn create_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Json(req): Json<BookingRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let booking = state
        .booking
        .create_booking(user.user_id, req.room_id)
        .await?;

    Ok(Json(BookingIdResponse {
        booking_id: booking.id,
    }))
}

// PUT /booking/{booking_id}
async fn change_booking(
    State(state): State<Arc<AppState>>,
    user: AuthUser,
    Path(booking_id): Path<i64>,
    Json(req): Json<BookingRequest>,
) -> Result<impl IntoResponse, BookingError> {
    let booking = state
        .booking
        .change_room(user.user_id, booking_id, req.room_id)
        .await?;

    Ok(Json(BookingIdResponse {
        booking_id: booking.id,
    }))
}
