//! Key-holding relay. Clients post a ready-made `generateContent` body; the gateway
//! attaches the provider key from its environment and passes the reply back untouched.

use actix_web::{
    http::{header, StatusCode},
    web, App, HttpResponse, HttpServer,
};

use crate::{config::GatewayConfig, error::Result, models::ErrorEnvelope};

#[derive(Clone)]
pub struct GatewayState {
    client: reqwest::Client,
    config: GatewayConfig,
}

impl GatewayState {
    pub fn new(config: GatewayConfig) -> Result<Self> {
        Ok(Self {
            client: reqwest::Client::builder().build()?,
            config,
        })
    }

    pub fn config(&self) -> &GatewayConfig {
        &self.config
    }
}

/// Mounts the relay route; anything but POST on it gets a 405.
pub fn configure(state: GatewayState) -> impl FnOnce(&mut web::ServiceConfig) {
    move |cfg: &mut web::ServiceConfig| {
        let route = state.config.route.clone();
        cfg.app_data(web::Data::new(state)).service(
            web::resource(route)
                .route(web::post().to(relay))
                .default_service(web::route().to(method_not_allowed)),
        );
    }
}

pub async fn serve(config: GatewayConfig) -> std::io::Result<()> {
    let port = config.port;
    let state = GatewayState::new(config)
        .map_err(|e| std::io::Error::new(std::io::ErrorKind::Other, e.to_string()))?;

    crate::logger::log_startup_info("bannergen gateway", env!("CARGO_PKG_VERSION"), port);
    log::info!("   Relay route: POST {}", state.config.route);
    log::info!("   Upstream: {}", state.config.upstream_url());

    HttpServer::new(move || App::new().configure(configure(state.clone())))
        .bind(("0.0.0.0", port))?
        .run()
        .await
}

async fn relay(state: web::Data<GatewayState>, body: web::Bytes) -> HttpResponse {
    // Read on every call so a key added after startup is picked up.
    let api_key = match std::env::var(&state.config.key_var) {
        Ok(key) if !key.is_empty() => key,
        _ => {
            log::error!("❌ {} is not set; refusing to relay", state.config.key_var);
            return HttpResponse::InternalServerError().json(
                ErrorEnvelope::new("Server is not configured").with_status("CONFIGURATION_ERROR"),
            );
        }
    };

    log::info!("📨 Relaying {} byte payload", body.len());
    let upstream = state
        .client
        .post(state.config.upstream_url())
        .header("x-goog-api-key", api_key)
        .header(reqwest::header::CONTENT_TYPE, "application/json")
        .body(body)
        .send()
        .await;

    let response = match upstream {
        Ok(response) => response,
        Err(e) => {
            log::error!("❌ Provider unreachable: {}", e);
            return HttpResponse::BadGateway()
                .json(ErrorEnvelope::new(format!("Provider unreachable: {}", e)));
        }
    };

    let status = StatusCode::from_u16(response.status().as_u16()).unwrap_or(StatusCode::BAD_GATEWAY);
    let content_type = response
        .headers()
        .get(reqwest::header::CONTENT_TYPE)
        .and_then(|value| value.to_str().ok())
        .unwrap_or("application/json")
        .to_string();

    match response.bytes().await {
        Ok(bytes) => {
            if !status.is_success() {
                log::warn!("⚠️  Provider returned {}, relaying as-is", status);
            }
            HttpResponse::build(status)
                .insert_header((header::CONTENT_TYPE, content_type))
                .body(bytes)
        }
        Err(e) => {
            log::error!("❌ Failed to read provider response: {}", e);
            HttpResponse::BadGateway()
                .json(ErrorEnvelope::new(format!("Failed to read provider response: {}", e)))
        }
    }
}

async fn method_not_allowed() -> HttpResponse {
    HttpResponse::MethodNotAllowed()
        .insert_header((header::ALLOW, "POST"))
        .json(ErrorEnvelope::new("Method Not Allowed"))
}
