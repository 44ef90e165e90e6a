use actix_web::{web, HttpResponse, Result};

use crate::services::hk::HkDataService;

pub async fn health_check(service: web::Data<HkDataService>) -> Result<HttpResponse> {
    Ok(HttpResponse::Ok().json(service.health()))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.route("/health", web::get().to(health_check));
}
