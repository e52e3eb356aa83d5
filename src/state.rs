use sqlx::PgPool;

/// Shared application context handed to every handler and middleware via
/// axum `State`. The pool is built once at startup and injected here;
/// nothing re-initializes it behind the router's back.
#[derive(Clone)]
pub struct AppState {
    pub pool: PgPool,
}

impl AppState {
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }
}
