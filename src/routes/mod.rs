use axum::Router;

use crate::state::AppState;

pub mod admin;
pub mod auth;
pub mod banners;
pub mod categories;
pub mod coupons;
pub mod doc;
pub mod health;
pub mod pages;
pub mod params;
pub mod payments;
pub mod products;
pub mod tickets;

// Build the API router without binding state; it will be provided at the top level.
pub fn create_api_router() -> Router<AppState> {
    Router::new()
        .nest("/banners", banners::router())
        .nest("/categories", categories::router())
        .nest("/pages", pages::router())
        .nest("/products", products::router())
        .nest("/coupons", coupons::router())
        .nest("/payments", payments::router())
        .nest("/auth", auth::router())
        .nest("/tickets", tickets::router())
        .nest("/admin", admin::router())
}
