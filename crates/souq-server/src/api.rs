use std::sync::Arc;

use axum::{
    extract::{DefaultBodyLimit, Multipart, Path, State},
    http::{header, HeaderMap, Method, StatusCode},
    routing::{delete, get},
    Json, Router,
};
use serde::Serialize;
use tower_http::cors::{Any, CorsLayer};
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;
use tracing::{debug, info};

use souq_store::{Offer, OfferDraft, OfferStore};

use crate::config::ServerConfig;
use crate::error::ApiError;
use crate::locations;
use crate::uploads::{StagedBatch, UploadStore};

#[derive(Clone)]
pub struct AppState {
    pub offers: Arc<OfferStore>,
    pub uploads: Arc<UploadStore>,
    pub config: Arc<ServerConfig>,
}

pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([Method::GET, Method::POST, Method::DELETE, Method::OPTIONS])
        .allow_headers(Any);

    // Room for 4 images at the per-file limit plus form fields and framing.
    let body_limit = 4 * state.config.max_image_size + 1024 * 1024;

    Router::new()
        .route("/api/offers", get(list_offers).post(create_offer))
        .route("/api/offers/country/:country", get(list_offers_by_country))
        .route("/api/offers/city/:city", get(list_offers_by_city))
        .route("/api/offers/:id", delete(delete_offer))
        .route("/api/locations", get(list_locations))
        .nest_service("/uploads", ServeDir::new(state.uploads.base_dir()))
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state)
}

#[derive(Serialize)]
struct DeleteResponse {
    success: bool,
}

async fn list_offers(State(state): State<AppState>) -> Json<Vec<Offer>> {
    Json(state.offers.list_all().await)
}

async fn list_offers_by_country(
    State(state): State<AppState>,
    Path(country): Path<String>,
) -> Json<Vec<Offer>> {
    Json(state.offers.list_by_country(&country).await)
}

async fn list_offers_by_city(
    State(state): State<AppState>,
    Path(city): Path<String>,
) -> Json<Vec<Offer>> {
    Json(state.offers.list_by_city(&city).await)
}

async fn list_locations() -> Json<serde_json::Value> {
    Json(locations::as_json())
}

/// Text fields of the multipart create request, collected in one pass over
/// the stream alongside the image parts.
#[derive(Default)]
struct OfferFields {
    product_name: Option<String>,
    social_link: Option<String>,
    bio: Option<String>,
    price: Option<String>,
    currency: Option<String>,
    country: Option<String>,
    city: Option<String>,
}

async fn create_offer(
    State(state): State<AppState>,
    headers: HeaderMap,
    mut multipart: Multipart,
) -> Result<(StatusCode, Json<Offer>), ApiError> {
    let mut batch = state.uploads.begin_batch();

    let fields = match collect_parts(&mut multipart, &mut batch).await {
        Ok(fields) => fields,
        Err(e) => {
            batch.discard().await;
            return Err(e);
        }
    };

    let Some(product_name) = fields.product_name.filter(|v| !v.trim().is_empty()) else {
        batch.discard().await;
        return Err(ApiError::Validation("productName is required".to_string()));
    };
    let Some(social_link) = fields.social_link.filter(|v| !v.trim().is_empty()) else {
        batch.discard().await;
        return Err(ApiError::Validation("socialLink is required".to_string()));
    };

    // Enforces the exact image count; a wrong count discards the staged
    // files before the error surfaces.
    let stored = batch.finish().await?;

    let (scheme, host) = request_origin(&headers);
    let images = state.uploads.public_urls(&stored, &scheme, &host);

    let offer = state
        .offers
        .append(OfferDraft {
            product_name,
            social_link,
            bio: fields.bio.unwrap_or_default(),
            price: fields.price.unwrap_or_default(),
            currency: fields.currency.unwrap_or_default(),
            country: fields.country.unwrap_or_default(),
            city: fields.city.unwrap_or_default(),
            images,
        })
        .await?;

    info!(id = offer.id, product = %offer.product_name, "Offer created");
    Ok((StatusCode::CREATED, Json(offer)))
}

async fn collect_parts(
    multipart: &mut Multipart,
    batch: &mut StagedBatch<'_>,
) -> Result<OfferFields, ApiError> {
    let mut fields = OfferFields::default();

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ApiError::Multipart(e.to_string()))?
    {
        let name = field.name().unwrap_or("").to_string();

        if name == "images" {
            let file_name = field.file_name().unwrap_or("").to_string();
            let content_type = field.content_type().unwrap_or("").to_string();
            let data = field
                .bytes()
                .await
                .map_err(|e| ApiError::Multipart(e.to_string()))?;
            batch.add(&file_name, &content_type, &data).await?;
            continue;
        }

        let value = field
            .text()
            .await
            .map_err(|e| ApiError::Multipart(e.to_string()))?;
        match name.as_str() {
            "productName" => fields.product_name = Some(value),
            "socialLink" => fields.social_link = Some(value),
            "bio" => fields.bio = Some(value),
            "price" => fields.price = Some(value),
            "currency" => fields.currency = Some(value),
            "country" => fields.country = Some(value),
            "city" => fields.city = Some(value),
            other => debug!(field = other, "Ignoring unknown form field"),
        }
    }

    Ok(fields)
}

/// Scheme and host the client used to reach us, for building public image
/// URLs. The forwarded protocol wins over the connection's own scheme so
/// URLs stay correct behind a reverse proxy.
fn request_origin(headers: &HeaderMap) -> (String, String) {
    let scheme = headers
        .get("x-forwarded-proto")
        .and_then(|v| v.to_str().ok())
        .unwrap_or("http")
        .to_string();
    let host = headers
        .get(header::HOST)
        .and_then(|v| v.to_str().ok())
        .unwrap_or("localhost")
        .to_string();
    (scheme, host)
}

/// Deletion is idempotent "ensure absent": the response is `{success: true}`
/// whether or not a matching offer existed, and image-file cleanup failures
/// never surface. A non-numeric id cannot match any stored offer.
async fn delete_offer(
    State(state): State<AppState>,
    Path(id): Path<String>,
) -> Result<Json<DeleteResponse>, ApiError> {
    if let Ok(id) = id.parse::<i64>() {
        if let Some(removed) = state.offers.remove_by_id(id).await? {
            state.uploads.delete_files(&removed.images).await;
            info!(id, "Offer deleted");
        }
    }

    Ok(Json(DeleteResponse { success: true }))
}

pub async fn serve(state: AppState, addr: std::net::SocketAddr) -> anyhow::Result<()> {
    let app = build_router(state);

    info!(addr = %addr, "Starting HTTP API server");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
