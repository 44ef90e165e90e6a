//! 港股数据模型
//!
//! 定义港股接口的请求参数、枚举与响应结构

use anyhow::{anyhow, Error, Result};
use serde::{Deserialize, Serialize};
use std::str::FromStr;

use super::response::ErrorPayload;

/// 财务报表类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportKind {
    /// 利润表
    Income,
    /// 资产负债表
    Balance,
    /// 现金流量表
    CashFlow,
}

impl ReportKind {
    /// 中文报表名
    pub fn label(&self) -> &'static str {
        match self {
            ReportKind::Income => "利润表",
            ReportKind::Balance => "资产负债表",
            ReportKind::CashFlow => "现金流量表",
        }
    }
}

impl FromStr for ReportKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "income" => Ok(ReportKind::Income),
            "balance" => Ok(ReportKind::Balance),
            "cashflow" => Ok(ReportKind::CashFlow),
            other => Err(anyhow!(
                "Invalid report_type: {}. Must be one of: income, balance, cashflow",
                other
            )),
        }
    }
}

/// 报表口径：年度 / 报告期
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReportIndicator {
    /// 年度
    Annual,
    /// 报告期（含中期）
    Period,
}

impl ReportIndicator {
    pub fn as_str(&self) -> &'static str {
        match self {
            ReportIndicator::Annual => "年度",
            ReportIndicator::Period => "报告期",
        }
    }
}

impl FromStr for ReportIndicator {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "年度" => Ok(ReportIndicator::Annual),
            "报告期" => Ok(ReportIndicator::Period),
            other => Err(anyhow!(
                "Invalid indicator: {}. Must be one of: 年度, 报告期",
                other
            )),
        }
    }
}

/// 复权类型
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Adjust {
    /// 不复权
    None,
    /// 前复权
    Forward,
    /// 后复权
    Backward,
}

impl Adjust {
    pub fn as_str(&self) -> &'static str {
        match self {
            Adjust::None => "",
            Adjust::Forward => "qfq",
            Adjust::Backward => "hfq",
        }
    }
}

impl FromStr for Adjust {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s.trim() {
            "" => Ok(Adjust::None),
            "qfq" => Ok(Adjust::Forward),
            "hfq" => Ok(Adjust::Backward),
            other => Err(anyhow!("Invalid adjust: {}. Must be one of: qfq, hfq, or empty", other)),
        }
    }
}

/// 财务报表查询参数
/// GET /hk/financial/{code}/{type}?indicator=年度
#[derive(Debug, Deserialize)]
pub struct FinancialQuery {
    /// 年度 或 报告期（默认 年度）
    pub indicator: Option<String>,
}

/// K线查询参数
/// GET /hk/kline/{code}?days=180&adjust=qfq
#[derive(Debug, Deserialize)]
pub struct KlineQuery {
    /// 最近N个交易日（默认 180）
    pub days: Option<usize>,
    /// 复权类型: qfq / hfq / 空（默认 qfq）
    pub adjust: Option<String>,
}

/// 股票基本信息
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BasicInfo {
    pub code: String,
    pub name: String,
    pub industry: String,
    pub list_date: String,
}

/// 公司概况
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct CompanyProfile {
    /// 董事长
    pub chairman: String,
    /// 总经理
    pub manager: String,
    /// 董秘 / 公司秘书
    pub secretary: String,
    /// 注册资本（数据源不提供，固定为 0）
    pub reg_capital: f64,
    /// 成立日期
    pub setup_date: String,
    /// 公司介绍
    pub introduction: String,
    /// 公司网址
    pub website: String,
    /// 电子邮箱
    pub email: String,
    /// 办公地址
    pub office: String,
    /// 员工人数
    pub employees: u64,
    /// 主营业务
    pub main_business: String,
}

/// 每日估值指标
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DailyBasic {
    /// 交易日期 YYYYMMDD
    pub trade_date: String,
    pub close: f64,
    pub pe: f64,
    pub pe_ttm: f64,
    pub pb: f64,
    pub ps: f64,
    pub ps_ttm: f64,
    pub turnover_rate: f64,
    pub volume_ratio: f64,
    pub dv_ratio: f64,
    pub dv_ttm: f64,
    pub total_share: f64,
    pub float_share: f64,
    pub free_share: f64,
    /// 总市值
    pub total_mv: f64,
    /// 流通市值
    pub circ_mv: f64,
}

/// 财务指标
///
/// 字段与 A 股指标接口对齐，数据源不提供的字段为 0
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct FinaIndicator {
    /// 报告期 YYYYMMDD
    pub end_date: String,
    pub roe: f64,
    pub roa: f64,
    pub gross_margin: f64,
    pub netprofit_margin: f64,
    pub debt_to_assets: f64,
    pub current_ratio: f64,
    pub quick_ratio: f64,
    pub eps: f64,
    pub bps: f64,
    pub netprofit_yoy: f64,
    pub or_yoy: f64,
    pub op_yoy: f64,
    pub ebt_yoy: f64,
    pub tr_yoy: f64,
    pub ocfps: f64,
    pub fcff: f64,
    pub fcfe: f64,
    pub assets_turn: f64,
    pub ar_turn: f64,
    pub ca_turn: f64,
    pub fa_turn: f64,
    pub saleexp_to_gr: f64,
    pub adminexp_of_gr: f64,
    pub finaexp_of_gr: f64,
    pub cash_ratio: f64,
    pub debt_to_eqt: f64,
    pub roe_waa: f64,
    pub roe_dt: f64,
    pub dt_eps: f64,
}

/// 港股列表项
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct HkStock {
    /// 如 00700.HK
    pub ts_code: String,
    pub symbol: String,
    pub name: String,
    pub market: String,
    pub stock_type: String,
}

impl HkStock {
    pub fn new(code: &str, name: &str) -> Self {
        Self {
            ts_code: format!("{}.HK", code),
            symbol: code.to_string(),
            name: name.to_string(),
            market: "HK".to_string(),
            stock_type: "HK".to_string(),
        }
    }
}

/// 健康检查响应
#[derive(Debug, Serialize)]
pub struct HealthStatus {
    pub status: &'static str,
    pub service: &'static str,
    pub version: &'static str,
    pub provider: &'static str,
    pub provider_version: String,
    /// 服务器时间（香港时间，RFC 3339）
    pub server_time: String,
}

impl ErrorPayload for BasicInfo {
    fn error_payload() -> Option<Self> {
        None
    }
}

impl ErrorPayload for CompanyProfile {
    fn error_payload() -> Option<Self> {
        None
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::ApiResponse;
    use serde_json::json;

    #[test]
    fn test_report_kind_closed_set() {
        assert_eq!("income".parse::<ReportKind>().unwrap(), ReportKind::Income);
        assert_eq!("balance".parse::<ReportKind>().unwrap(), ReportKind::Balance);
        assert_eq!("cashflow".parse::<ReportKind>().unwrap(), ReportKind::CashFlow);

        for bad in ["Income", "cash_flow", "", "profit"] {
            let err = bad.parse::<ReportKind>().unwrap_err().to_string();
            println!("  {:?} -> {}", bad, err);
            assert!(err.contains("Must be one of: income, balance, cashflow"));
        }
    }

    #[test]
    fn test_adjust_parse() {
        assert_eq!("".parse::<Adjust>().unwrap(), Adjust::None);
        assert_eq!("qfq".parse::<Adjust>().unwrap(), Adjust::Forward);
        assert_eq!(" hfq ".parse::<Adjust>().unwrap(), Adjust::Backward);
        assert!("bfq".parse::<Adjust>().is_err());
    }

    #[test]
    fn test_indicator_parse() {
        assert_eq!("年度".parse::<ReportIndicator>().unwrap(), ReportIndicator::Annual);
        assert_eq!("报告期".parse::<ReportIndicator>().unwrap(), ReportIndicator::Period);
        assert!("季度".parse::<ReportIndicator>().is_err());
    }

    #[test]
    fn test_single_object_error_has_null_data() {
        let basic =
            serde_json::to_value(ApiResponse::<BasicInfo>::error("boom".to_string())).unwrap();
        println!("  基本信息错误响应: {}", basic);
        assert_eq!(basic, json!({ "success": false, "data": null, "error": "boom" }));

        let company =
            serde_json::to_value(ApiResponse::<CompanyProfile>::error("boom".to_string())).unwrap();
        assert_eq!(company["success"], json!(false));
        assert_eq!(company["data"], serde_json::Value::Null);
        assert!(company.get("count").is_none());
    }

    #[test]
    fn test_hk_stock_codes() {
        let stock = HkStock::new("00700", "腾讯控股");
        assert_eq!(stock.ts_code, "00700.HK");
        assert_eq!(stock.symbol, "00700");
        assert_eq!(stock.market, "HK");
    }
}
