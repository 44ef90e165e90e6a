//! 港股接口处理器
//!
//! 解析路径和查询参数，调用 `HkDataService`，并把结果统一转换为 HTTP 响应。
//! 数据源错误返回 HTTP 200 + `success=false`；只有报表类型非法返回 400。

use actix_web::{web, HttpResponse, Result};
use serde::Serialize;

use crate::models::{ApiResponse, ErrorPayload, FinancialQuery, KlineQuery, Record, ReportKind};
use crate::services::hk::{HkDataService, DEFAULT_ADJUST, DEFAULT_INDICATOR, DEFAULT_KLINE_DAYS};

/// 服务结果 -> HTTP 响应
fn respond<T>(label: &str, result: anyhow::Result<ApiResponse<T>>) -> Result<HttpResponse>
where
    T: Serialize + ErrorPayload,
{
    respond_with(label, result, |response| response)
}

/// 同 `respond`，错误响应可由 `on_error` 补充字段
fn respond_with<T, F>(
    label: &str,
    result: anyhow::Result<ApiResponse<T>>,
    on_error: F,
) -> Result<HttpResponse>
where
    T: Serialize + ErrorPayload,
    F: FnOnce(ApiResponse<T>) -> ApiResponse<T>,
{
    match result {
        Ok(response) => Ok(HttpResponse::Ok().json(response)),
        Err(e) => {
            log::error!("[HkProxy] {} 失败: {:?}", label, e);
            Ok(HttpResponse::Ok().json(on_error(ApiResponse::<T>::error(e.to_string()))))
        }
    }
}

pub async fn get_financial_report(
    service: web::Data<HkDataService>,
    path: web::Path<(String, String)>,
    query: web::Query<FinancialQuery>,
) -> Result<HttpResponse> {
    let (code, report_type) = path.into_inner();

    let kind: ReportKind = match report_type.parse() {
        Ok(kind) => kind,
        Err(e) => {
            log::warn!("[HkProxy] 报表类型无效: {}", report_type);
            let response = ApiResponse::<Vec<Record>>::error(e.to_string());
            return Ok(HttpResponse::BadRequest().json(response));
        }
    };
    let indicator = query.indicator.as_deref().unwrap_or(DEFAULT_INDICATOR);

    respond(
        "财务报表",
        service.financial_report(&code, kind, indicator).await,
    )
}

pub async fn get_kline(
    service: web::Data<HkDataService>,
    path: web::Path<String>,
    query: web::Query<KlineQuery>,
) -> Result<HttpResponse> {
    let code = path.into_inner();
    let days = query.days.unwrap_or(DEFAULT_KLINE_DAYS);
    let adjust = query.adjust.as_deref().unwrap_or(DEFAULT_ADJUST);

    respond("K线数据", service.kline(&code, days, adjust).await)
}

pub async fn get_basic(
    service: web::Data<HkDataService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    respond("基本信息", service.basic(&path.into_inner()).await)
}

pub async fn get_company(
    service: web::Data<HkDataService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    respond("公司概况", service.company(&path.into_inner()).await)
}

pub async fn get_daily_basic(
    service: web::Data<HkDataService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    respond("每日指标", service.daily_basic(&path.into_inner()).await)
}

pub async fn get_fina_indicator(
    service: web::Data<HkDataService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    respond("财务指标", service.fina_indicator(&path.into_inner()).await)
}

pub async fn get_main_biz(
    service: web::Data<HkDataService>,
    path: web::Path<String>,
) -> Result<HttpResponse> {
    respond("主营业务构成", service.main_biz(&path.into_inner()).await)
}

// 列表接口失败时也带 count: 0
pub async fn get_stock_list(service: web::Data<HkDataService>) -> Result<HttpResponse> {
    respond_with("港股通成分股列表", service.stock_list().await, |r| r.with_count(0))
}

pub async fn get_all_stocks(service: web::Data<HkDataService>) -> Result<HttpResponse> {
    respond_with("全部港股列表", service.all_stocks().await, |r| r.with_count(0))
}

pub fn config(cfg: &mut web::ServiceConfig) {
    cfg.service(
        web::scope("/hk")
            .route("/financial/{code}/{report_type}", web::get().to(get_financial_report))
            .route("/kline/{code}", web::get().to(get_kline))
            .route("/basic/{code}", web::get().to(get_basic))
            .route("/company/{code}", web::get().to(get_company))
            .route("/daily_basic/{code}", web::get().to(get_daily_basic))
            .route("/fina_indicator/{code}", web::get().to(get_fina_indicator))
            .route("/main_biz/{code}", web::get().to(get_main_biz))
            .route("/stock_list", web::get().to(get_stock_list))
            .route("/all_stocks", web::get().to(get_all_stocks)),
    );
}
