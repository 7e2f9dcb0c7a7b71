pub mod config;
pub mod controllers;
pub mod database;
pub mod error;
pub mod middleware;
pub mod models;
pub mod services;
pub mod store;

use std::sync::Arc;

use services::booking::BookingService;
use store::postgres::{PgBookingStore, PgRoomStore, PgTicketStore};

// Shared state для всего приложения
#[derive(Clone)]
pub struct AppState {
    pub db: database::Database,
    pub config: config::Config,
    pub booking: BookingService<PgBookingStore, PgRoomStore, PgTicketStore>,
}

impl AppState {
    pub async fn new(config: config::Config) -> anyhow::Result<Arc<Self>> {
        let db = database::Database::new(&config.database.url, config.database.pool_size).await?;

        db.run_migrations().await?;

        let booking = BookingService::new(
            PgBookingStore::new(db.pool.clone()),
            PgRoomStore::new(db.pool.clone()),
            PgTicketStore::new(db.pool.clone()),
        );

        Ok(Arc::new(Self {
            db,
            config,
            booking,
        }))
    }
}
