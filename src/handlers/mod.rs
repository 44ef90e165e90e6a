pub mod health;
pub mod hk;

use actix_web::web;

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.configure(health::config).configure(hk::config);
}
