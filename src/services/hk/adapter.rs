//! 港股数据适配层
//!
//! 每类数据的处理流程一致：标准化代码 -> 调用一个数据源函数 -> 表格转记录 -> 包装统一响应。
//! 部分接口带有多级降级：主数据源失败或为空时改用备用数据源，全部失败返回空的成功响应。
//! 数据源错误以 `Err` 返回，由处理器统一转换为 `success=false`。

use std::future::Future;
use std::sync::Arc;

use anyhow::Result;

use crate::models::{
    Adjust, ApiResponse, BasicInfo, CompanyProfile, DailyBasic, FinaIndicator, HealthStatus,
    HkStock, Record, ReportIndicator, ReportKind, Row, Table,
};

use super::code::normalize_hk_code;
use super::common::{compact_date, get_hk_time, KLINE_FIELD_MAP};
use super::provider::HkDataProvider;

/// 默认报表口径
pub const DEFAULT_INDICATOR: &str = "年度";
/// 默认K线天数
pub const DEFAULT_KLINE_DAYS: usize = 180;
/// 默认复权类型
pub const DEFAULT_ADJUST: &str = "qfq";

const HK_INDUSTRY: &str = "港股";

/// 港股数据服务
#[derive(Clone)]
pub struct HkDataService {
    provider: Arc<dyn HkDataProvider>,
}

impl HkDataService {
    pub fn new(provider: Arc<dyn HkDataProvider>) -> Self {
        Self { provider }
    }

    /// 健康检查信息
    pub fn health(&self) -> HealthStatus {
        HealthStatus {
            status: "ok",
            service: "hk-data-proxy",
            version: env!("CARGO_PKG_VERSION"),
            provider: self.provider.name(),
            provider_version: self.provider.version(),
            server_time: get_hk_time(),
        }
    }

    /// 调用数据源并记录前后日志
    async fn fetch<F>(&self, what: &str, code: &str, call: F) -> Result<Table>
    where
        F: Future<Output = Result<Table>>,
    {
        log::info!("[HkProxy] 获取港股{}: {}", what, code);
        let table = call.await?;
        if table.is_empty() {
            log::warn!("[HkProxy] 警告: {} {}数据为空", code, what);
        } else {
            log::info!("[HkProxy] 成功获取 {} {} 条{}数据", code, table.len(), what);
        }
        Ok(table)
    }

    /// 降级链中的一级：失败只记录警告，返回 None
    async fn try_tier<F>(&self, what: &str, code: &str, call: F) -> Option<Table>
    where
        F: Future<Output = Result<Table>>,
    {
        match self.fetch(what, code, call).await {
            Ok(table) if !table.is_empty() => Some(table),
            Ok(_) => None,
            Err(e) => {
                log::warn!("[HkProxy] 获取{}失败 {}: {}", what, code, e);
                None
            }
        }
    }

    /// 财务报表（利润表 / 资产负债表 / 现金流量表），原样返回数据源字段
    pub async fn financial_report(
        &self,
        stock_code: &str,
        kind: ReportKind,
        indicator: &str,
    ) -> Result<ApiResponse<Vec<Record>>> {
        let code = normalize_hk_code(stock_code);
        let indicator: ReportIndicator = indicator.parse()?;
        let what = format!("{}({})", kind.label(), indicator.as_str());

        let table = self
            .fetch(&what, &code, self.provider.financial_report(&code, kind, indicator))
            .await?;

        if table.is_empty() {
            return Ok(ApiResponse::success(Vec::new())
                .with_message(format!("No data found for {}", code)));
        }
        Ok(ApiResponse::list(table.to_records()))
    }

    /// K线数据：取最近 `days` 条，列名换成英文，日期转为 YYYYMMDD
    pub async fn kline(
        &self,
        stock_code: &str,
        days: usize,
        adjust: &str,
    ) -> Result<ApiResponse<Vec<Record>>> {
        let code = normalize_hk_code(stock_code);
        let adjust: Adjust = adjust.parse()?;
        let what = format!("K线(天数: {}, 复权: {})", days, adjust.as_str());

        let table = self.fetch(&what, &code, self.provider.hist(&code, adjust)).await?;

        if table.is_empty() {
            return Ok(ApiResponse::success(Vec::new())
                .with_message(format!("No kline data found for {}", code)));
        }
        Ok(ApiResponse::list(shape_kline(table, days)))
    }

    /// 基本信息：港股通成分股中查名称 -> 确认有K线 -> 默认值
    pub async fn basic(&self, stock_code: &str) -> Result<ApiResponse<BasicInfo>> {
        let code = normalize_hk_code(stock_code);

        if let Some(table) = self
            .try_tier("港股通成分股", &code, self.provider.ggt_components())
            .await
        {
            let found = table.rows().find(|row| row.text("代码").contains(code.as_str()));
            if let Some(row) = found {
                return Ok(ApiResponse::success(basic_info(&code, &row.text("名称"))));
            }
        }

        // 不在成分股中时名称一律用代码，K线只用于在日志中区分代码是否有行情
        if self
            .try_tier("K线(基本信息备用)", &code, self.provider.hist(&code, Adjust::Forward))
            .await
            .is_none()
        {
            log::warn!("[HkProxy] {} 无成分股记录也无K线，使用默认基本信息", code);
        }

        Ok(ApiResponse::success(basic_info(&code, &code)))
    }

    /// 公司概况，数据源不可用时 data 为 null
    pub async fn company(&self, stock_code: &str) -> Result<ApiResponse<CompanyProfile>> {
        let code = normalize_hk_code(stock_code);

        match self
            .try_tier("公司概况", &code, self.provider.company_profile(&code))
            .await
        {
            Some(table) => Ok(ApiResponse::success(company_profile(&table.pivot_key_value()))),
            None => Ok(ApiResponse::empty()),
        }
    }

    /// 每日指标：估值快照 -> K线最后一条（只有日期、收盘价、换手率）-> 空列表
    pub async fn daily_basic(&self, stock_code: &str) -> Result<ApiResponse<Vec<DailyBasic>>> {
        let code = normalize_hk_code(stock_code);

        if let Some(table) = self
            .try_tier("估值指标", &code, self.provider.valuation(&code))
            .await
        {
            if let Some(row) = table.last_row() {
                return Ok(ApiResponse::success(vec![daily_basic_from_valuation(&row)]));
            }
        }

        if let Some(table) = self
            .try_tier("K线(每日指标备用)", &code, self.provider.hist(&code, Adjust::Forward))
            .await
        {
            if let Some(row) = table.last_row() {
                return Ok(ApiResponse::success(vec![daily_basic_from_kline(&row)]));
            }
        }

        Ok(ApiResponse::success(Vec::new()))
    }

    /// 财务指标
    pub async fn fina_indicator(
        &self,
        stock_code: &str,
    ) -> Result<ApiResponse<Vec<FinaIndicator>>> {
        let code = normalize_hk_code(stock_code);

        match self
            .try_tier("财务指标", &code, self.provider.financial_indicator(&code))
            .await
        {
            Some(table) => {
                let records = table.rows().map(|row| fina_indicator(&row)).collect();
                Ok(ApiResponse::list(records))
            }
            None => Ok(ApiResponse::success(Vec::new())),
        }
    }

    /// 主营业务构成：数据源不提供，固定返回空列表
    pub async fn main_biz(&self, stock_code: &str) -> Result<ApiResponse<Vec<Record>>> {
        let code = normalize_hk_code(stock_code);
        log::info!("[HkProxy] 获取港股主营业务构成: {}", code);

        Ok(ApiResponse::success(Vec::new())
            .with_message("Hong Kong stocks do not have detailed business segment data available"))
    }

    /// 港股通成分股列表
    pub async fn stock_list(&self) -> Result<ApiResponse<Vec<HkStock>>> {
        let table = self.fetch("通成分股列表", "-", self.provider.ggt_components()).await?;
        Ok(stock_list_response(&table))
    }

    /// 全部港股列表
    pub async fn all_stocks(&self) -> Result<ApiResponse<Vec<HkStock>>> {
        let table = self.fetch("全部列表", "-", self.provider.spot()).await?;
        Ok(stock_list_response(&table))
    }
}

/// 截取最近 `days` 条并转换字段
fn shape_kline(table: Table, days: usize) -> Vec<Record> {
    let mut table = table.tail(days);
    table.rename_columns(&KLINE_FIELD_MAP);
    table.map_column("date", compact_date);
    table.to_records()
}

fn basic_info(code: &str, name: &str) -> BasicInfo {
    BasicInfo {
        code: code.to_string(),
        name: name.to_string(),
        industry: HK_INDUSTRY.to_string(),
        list_date: String::new(),
    }
}

fn text_field(record: &Record, key: &str) -> String {
    record
        .get(key)
        .and_then(|v| v.as_str())
        .map(|s| s.trim().to_string())
        .unwrap_or_default()
}

fn company_profile(record: &Record) -> CompanyProfile {
    CompanyProfile {
        chairman: text_field(record, "董事长"),
        manager: text_field(record, "总经理"),
        secretary: text_field(record, "董秘"),
        reg_capital: 0.0,
        setup_date: text_field(record, "成立日期"),
        introduction: text_field(record, "公司介绍"),
        website: text_field(record, "公司网址"),
        email: text_field(record, "电子邮箱"),
        office: text_field(record, "办公地址"),
        employees: text_field(record, "员工人数").parse().unwrap_or(0),
        main_business: text_field(record, "主营业务"),
    }
}

fn trade_date(row: &Row<'_>, label: &str) -> String {
    row.text(label).replace('-', "")
}

fn daily_basic_from_valuation(row: &Row<'_>) -> DailyBasic {
    DailyBasic {
        trade_date: trade_date(row, "日期"),
        close: row.f64("收盘价"),
        pe: row.f64("市盈率"),
        pe_ttm: row.first_f64(&["市盈率TTM", "市盈率"]),
        pb: row.f64("市净率"),
        turnover_rate: row.f64("换手率"),
        total_mv: row.f64("总市值"),
        circ_mv: row.first_f64(&["流通市值", "总市值"]),
        ..DailyBasic::default()
    }
}

fn daily_basic_from_kline(row: &Row<'_>) -> DailyBasic {
    DailyBasic {
        trade_date: trade_date(row, "日期"),
        close: row.f64("收盘"),
        turnover_rate: row.f64("换手率"),
        ..DailyBasic::default()
    }
}

fn fina_indicator(row: &Row<'_>) -> FinaIndicator {
    let roe = row.f64("净资产收益率");
    let eps = row.f64("每股收益");
    FinaIndicator {
        end_date: trade_date(row, "报告期"),
        roe,
        roa: row.f64("总资产净利率"),
        gross_margin: row.f64("毛利率"),
        netprofit_margin: row.f64("净利率"),
        debt_to_assets: row.f64("资产负债率"),
        current_ratio: row.f64("流动比率"),
        quick_ratio: row.f64("速动比率"),
        eps,
        bps: row.f64("每股净资产"),
        netprofit_yoy: row.f64("净利润同比"),
        or_yoy: row.f64("营收同比"),
        roe_waa: roe,
        roe_dt: roe,
        dt_eps: eps,
        ..FinaIndicator::default()
    }
}

fn stock_list_response(table: &Table) -> ApiResponse<Vec<HkStock>> {
    if table.is_empty() {
        return ApiResponse::success(Vec::new())
            .with_count(0)
            .with_message("No HK stock data found");
    }

    let stocks: Vec<HkStock> = table
        .rows()
        .filter_map(|row| {
            let code = row.text("代码");
            let name = row.text("名称");
            if code.is_empty() || name.is_empty() {
                None
            } else {
                Some(HkStock::new(&code, &name))
            }
        })
        .collect();

    log::info!("[HkProxy] 成功获取 {} 只港股", stocks.len());
    ApiResponse::list(stocks)
}

#[cfg(test)]
mod tests {
    use super::*;
    use anyhow::anyhow;
    use async_trait::async_trait;
    use serde_json::{json, Value};
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::services::hk::common::KLINE_COLUMNS;

    /// 测试用数据源：每个接口返回固定结果，None 表示抛错
    #[derive(Default)]
    struct StubProvider {
        hist: Option<Table>,
        ggt: Option<Table>,
        valuation: Option<Table>,
        profile: Option<Table>,
        indicator: Option<Table>,
        calls: AtomicUsize,
    }

    impl StubProvider {
        fn answer(&self, table: &Option<Table>, what: &str) -> Result<Table> {
            self.calls.fetch_add(1, Ordering::SeqCst);
            table.clone().ok_or_else(|| anyhow!("{} unavailable", what))
        }
    }

    #[async_trait]
    impl HkDataProvider for StubProvider {
        fn name(&self) -> &'static str {
            "stub"
        }

        fn version(&self) -> String {
            "stub/0".to_string()
        }

        async fn financial_report(
            &self,
            _: &str,
            _: ReportKind,
            _: ReportIndicator,
        ) -> Result<Table> {
            self.answer(&None, "financial_report")
        }

        async fn hist(&self, _: &str, _: Adjust) -> Result<Table> {
            self.answer(&self.hist, "hist")
        }

        async fn ggt_components(&self) -> Result<Table> {
            self.answer(&self.ggt, "ggt")
        }

        async fn spot(&self) -> Result<Table> {
            self.answer(&None, "spot")
        }

        async fn company_profile(&self, _: &str) -> Result<Table> {
            self.answer(&self.profile, "profile")
        }

        async fn valuation(&self, _: &str) -> Result<Table> {
            self.answer(&self.valuation, "valuation")
        }

        async fn financial_indicator(&self, _: &str) -> Result<Table> {
            self.answer(&self.indicator, "indicator")
        }
    }

    fn service(stub: StubProvider) -> (HkDataService, Arc<StubProvider>) {
        let stub = Arc::new(stub);
        (HkDataService::new(stub.clone()), stub)
    }

    fn hist_table(rows: usize) -> Table {
        let mut table = Table::new(KLINE_COLUMNS);
        for i in 0..rows {
            table.push_row(vec![
                json!(format!("2024-01-{:02}", i + 1)),
                json!(300.0 + i as f64),
                json!(301.0 + i as f64),
                json!(305.0),
                json!(298.0),
                json!(1_000_000 + i),
                json!(3.0e8),
                json!(2.1),
                json!(0.5),
                json!(1.5),
                json!(0.12),
            ]);
        }
        table
    }

    #[test]
    fn test_shape_kline() {
        let records = shape_kline(hist_table(5), 2);
        assert_eq!(records.len(), 2);

        let keys: Vec<&str> = records[0].keys().map(|k| k.as_str()).collect();
        println!("  K线字段: {:?}", keys);
        assert_eq!(
            keys,
            vec![
                "date", "open", "close", "high", "low", "volume", "amount", "amplitude", "pct_chg",
                "change", "turnover_rate"
            ]
        );
        assert_eq!(records[0]["date"], json!("20240104"));
        assert_eq!(records[1]["date"], json!("20240105"));
        assert_eq!(records[1]["close"], json!(305.0));
    }

    #[tokio::test]
    async fn test_kline_invalid_adjust_is_error() {
        let (service, stub) = service(StubProvider {
            hist: Some(hist_table(3)),
            ..Default::default()
        });
        let err = service.kline("700", 10, "bfq").await.unwrap_err();
        assert!(err.to_string().contains("Invalid adjust"));
        assert_eq!(stub.calls.load(Ordering::SeqCst), 0);
    }

    #[tokio::test]
    async fn test_basic_found_in_components() {
        let mut ggt = Table::new(["代码", "名称"]);
        ggt.push_row(vec![json!("00005"), json!("汇丰控股")]);
        ggt.push_row(vec![json!("00700"), json!("腾讯控股")]);
        let (service, stub) = service(StubProvider {
            ggt: Some(ggt),
            ..Default::default()
        });

        let response = service.basic("700.HK").await.unwrap();
        let data = response.data.unwrap();
        assert_eq!(data.code, "00700");
        assert_eq!(data.name, "腾讯控股");
        assert_eq!(data.industry, "港股");
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_basic_falls_back_to_code_as_name() {
        let (service, stub) = service(StubProvider::default());

        let response = service.basic("9988").await.unwrap();
        assert!(response.success);
        let data = response.data.unwrap();
        assert_eq!(data.code, "09988");
        assert_eq!(data.name, "09988");
        // 成分股 + K线 两级都尝试过
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_company_profile_pivot() {
        let mut profile = Table::new(["项目", "值"]);
        profile.push_row(vec![json!("董事长"), json!("马化腾")]);
        profile.push_row(vec![json!("成立日期"), json!("1999-11-26")]);
        profile.push_row(vec![json!("员工人数"), json!(105417)]);
        let (service, _) = service(StubProvider {
            profile: Some(profile),
            ..Default::default()
        });

        let data = service.company("00700").await.unwrap().data.unwrap();
        assert_eq!(data.chairman, "马化腾");
        assert_eq!(data.setup_date, "1999-11-26");
        assert_eq!(data.employees, 105417);
        assert_eq!(data.manager, "");
        assert_eq!(data.reg_capital, 0.0);
    }

    #[tokio::test]
    async fn test_company_profile_failure_gives_null_data() {
        let (service, _) = service(StubProvider::default());
        let response = service.company("00700").await.unwrap();
        assert!(response.success);
        assert!(response.data.is_none());
    }

    #[tokio::test]
    async fn test_daily_basic_from_valuation() {
        let mut valuation = Table::new([
            "日期", "收盘价", "市盈率", "市盈率TTM", "市净率", "总市值", "流通市值",
        ]);
        valuation.push_row(vec![
            json!("2024-01-03"),
            json!(380.2),
            json!(22.1),
            Value::Null,
            json!(3.4),
            json!(3.6e12),
            json!(0),
        ]);
        let (service, stub) = service(StubProvider {
            valuation: Some(valuation),
            hist: Some(hist_table(3)),
            ..Default::default()
        });

        let data = service.daily_basic("700").await.unwrap().data.unwrap();
        assert_eq!(data.len(), 1);
        assert_eq!(data[0].trade_date, "20240103");
        assert_eq!(data[0].pe_ttm, 22.1);
        assert_eq!(data[0].circ_mv, 3.6e12);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 1);
    }

    #[tokio::test]
    async fn test_daily_basic_falls_back_to_kline() {
        let (service, stub) = service(StubProvider {
            hist: Some(hist_table(3)),
            ..Default::default()
        });

        let data = service.daily_basic("700").await.unwrap().data.unwrap();
        assert_eq!(data.len(), 1);
        let record = &data[0];
        println!("  备用指标: {:?}", record);
        assert_eq!(record.trade_date, "20240103");
        assert_eq!(record.close, 303.0);
        assert_eq!(record.turnover_rate, 0.12);
        assert_eq!(record.pe, 0.0);
        assert_eq!(record.pb, 0.0);
        assert_eq!(record.total_mv, 0.0);
        assert_eq!(stub.calls.load(Ordering::SeqCst), 2);
    }

    #[tokio::test]
    async fn test_daily_basic_all_tiers_fail() {
        let (service, _) = service(StubProvider::default());
        let response = service.daily_basic("700").await.unwrap();
        assert!(response.success);
        assert_eq!(response.data.unwrap().len(), 0);
    }

    #[tokio::test]
    async fn test_fina_indicator_mapping() {
        let mut indicator = Table::new(["报告期", "净资产收益率", "每股收益", "毛利率"]);
        indicator.push_row(vec![json!("2023-12-31"), json!(22.1), json!("12.4"), json!(48.1)]);
        indicator.push_row(vec![json!("2022-12-31"), json!(19.5), json!(9.9), Value::Null]);
        let (service, _) = service(StubProvider {
            indicator: Some(indicator),
            ..Default::default()
        });

        let response = service.fina_indicator("00700").await.unwrap();
        assert_eq!(response.count, Some(2));
        let data = response.data.unwrap();
        assert_eq!(data[0].end_date, "20231231");
        assert_eq!(data[0].roe_waa, 22.1);
        assert_eq!(data[0].dt_eps, 12.4);
        assert_eq!(data[1].gross_margin, 0.0);
        assert_eq!(data[1].fcff, 0.0);
    }

    #[tokio::test]
    async fn test_stock_list_skips_incomplete_rows() {
        let mut ggt = Table::new(["代码", "名称"]);
        ggt.push_row(vec![json!("00700"), json!("腾讯控股")]);
        ggt.push_row(vec![json!("00005"), Value::Null]);
        ggt.push_row(vec![json!(""), json!("无代码")]);
        let (service, _) = service(StubProvider {
            ggt: Some(ggt),
            ..Default::default()
        });

        let response = service.stock_list().await.unwrap();
        assert_eq!(response.count, Some(1));
        let data = response.data.unwrap();
        assert_eq!(data[0].ts_code, "00700.HK");
        assert_eq!(data[0].name, "腾讯控股");
    }

    #[tokio::test]
    async fn test_all_stocks_error_propagates() {
        let (service, _) = service(StubProvider::default());
        let err = service.all_stocks().await.unwrap_err();
        assert_eq!(err.to_string(), "spot unavailable");
    }

    #[test]
    fn test_health() {
        let (service, _) = service(StubProvider::default());
        let health = service.health();
        assert_eq!(health.status, "ok");
        assert_eq!(health.provider, "stub");
        assert_eq!(health.provider_version, "stub/0");
    }
}
