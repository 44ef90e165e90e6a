//! 东方财富港股接口实现
//!
//! 对接 push2his（历史K线）、push2（行情列表、个股快照）和数据中心（F10 财务数据），
//! 输出列名与 akshare 对应函数保持一致

use anyhow::{anyhow, Result};
use async_trait::async_trait;
use futures::stream::{self, StreamExt, TryStreamExt};
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::config::ProviderConfig;
use crate::models::{Adjust, Record, ReportIndicator, ReportKind, Table};

use super::common::{
    clean_value, date_part, parse_number, timestamp_to_hk_date, CLIST_FIELDS, CLIST_MAX_PAGES,
    CLIST_PAGE_SIZE, DATACENTER_PAGE_SIZE, EM_CLIST_PATH, EM_CLIST_UT, EM_DATACENTER_PATH,
    EM_KLINE_PATH, EM_KLINE_UT, EM_QUOTE_PATH, GGT_COMPONENTS_FS, HK_MARKET_ID, HK_SPOT_FS,
    INDICATOR_FIELDS, KLINE_COLUMNS, PROFILE_FIELDS, QUOTE_FIELDS, USER_AGENT,
};
use super::provider::HkDataProvider;

/// 东方财富数据源
pub struct EastmoneyProvider {
    client: Client,
    kline_url: Url,
    clist_url: Url,
    quote_url: Url,
    datacenter_url: Url,
    page_concurrency: usize,
}

/// 行情列表单页
#[derive(Debug, Default)]
struct ClistPage {
    total: usize,
    rows: Vec<Vec<Value>>,
}

/// 数据中心单页
#[derive(Debug, Default)]
struct DatacenterPage {
    pages: usize,
    records: Vec<Record>,
}

/// 数据中心查询条件
struct DatacenterQuery<'a> {
    report: &'a str,
    filter: String,
    sort: Option<(&'a str, &'a str)>,
}

impl EastmoneyProvider {
    /// 按配置创建数据源，接口地址无效时返回错误
    pub fn new(config: &ProviderConfig) -> Result<Self> {
        let client = Client::builder()
            .timeout(config.timeout())
            .connect_timeout(config.connect_timeout())
            .user_agent(USER_AGENT)
            .gzip(true)
            .build()?;

        let push2his = Url::parse(&config.push2his_base)
            .map_err(|e| anyhow!("无效的 push2his_base {}: {}", config.push2his_base, e))?;
        let push2 = Url::parse(&config.push2_base)
            .map_err(|e| anyhow!("无效的 push2_base {}: {}", config.push2_base, e))?;
        let datacenter = Url::parse(&config.datacenter_base)
            .map_err(|e| anyhow!("无效的 datacenter_base {}: {}", config.datacenter_base, e))?;

        Ok(Self {
            client,
            kline_url: push2his.join(EM_KLINE_PATH)?,
            clist_url: push2.join(EM_CLIST_PATH)?,
            quote_url: push2.join(EM_QUOTE_PATH)?,
            datacenter_url: datacenter.join(EM_DATACENTER_PATH)?,
            page_concurrency: config.page_concurrency.max(1),
        })
    }

    async fn get_json(&self, url: &Url, params: &[(&str, String)]) -> Result<Value> {
        log::debug!("📡 请求 {} {:?}", url, params);

        let response = self
            .client
            .get(url.clone())
            .query(params)
            .header("Referer", "https://quote.eastmoney.com/")
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(anyhow!("请求东方财富接口失败: {} {}", url.path(), response.status()));
        }

        let value: Value = response.json().await?;
        Ok(value)
    }

    async fn clist_page(&self, fs: &str, page: usize) -> Result<ClistPage> {
        let fields: Vec<&str> = CLIST_FIELDS.iter().map(|(f, _)| *f).collect();
        let params = [
            ("pn", page.to_string()),
            ("pz", CLIST_PAGE_SIZE.to_string()),
            ("po", "0".to_string()),
            ("np", "1".to_string()),
            ("ut", EM_CLIST_UT.to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fid", "f12".to_string()),
            ("fs", fs.to_string()),
            ("fields", fields.join(",")),
        ];
        let json = self.get_json(&self.clist_url, &params).await?;
        parse_clist_page(&json)
    }

    /// 拉取行情列表全部分页，首页之后的分页有限并发拉取，结果保持分页顺序
    async fn fetch_clist(&self, fs: &str) -> Result<Table> {
        let first = self.clist_page(fs, 1).await?;
        let pages = clist_page_count(first.total);
        if pages < first.total.div_ceil(CLIST_PAGE_SIZE) {
            log::warn!("⚠️ 行情列表 {} 声明共 {} 条，只拉取前 {} 页", fs, first.total, pages);
        }

        let mut table = Table::new(CLIST_FIELDS.iter().map(|(_, label)| *label));
        for row in first.rows {
            table.push_row(row);
        }

        if pages > 1 {
            let rest: Vec<ClistPage> = stream::iter(2..=pages)
                .map(|page| self.clist_page(fs, page))
                .buffered(self.page_concurrency)
                .try_collect()
                .await?;
            for page in rest {
                for row in page.rows {
                    table.push_row(row);
                }
            }
        }

        log::debug!("📈 行情列表 {} 共 {} 条（{} 页）", fs, table.len(), pages.max(1));
        Ok(table)
    }

    async fn datacenter_page(
        &self,
        query: &DatacenterQuery<'_>,
        page: usize,
    ) -> Result<DatacenterPage> {
        let mut params = vec![
            ("reportName", query.report.to_string()),
            ("columns", "ALL".to_string()),
            ("filter", query.filter.clone()),
            ("pageNumber", page.to_string()),
            ("pageSize", DATACENTER_PAGE_SIZE.to_string()),
            ("source", "F10".to_string()),
            ("client", "PC".to_string()),
        ];
        if let Some((columns, types)) = query.sort {
            params.push(("sortColumns", columns.to_string()));
            params.push(("sortTypes", types.to_string()));
        }

        let json = self.get_json(&self.datacenter_url, &params).await?;
        parse_datacenter_page(&json)
    }

    /// 拉取数据中心报表全部分页
    async fn fetch_datacenter(&self, query: DatacenterQuery<'_>) -> Result<Vec<Record>> {
        let first = self.datacenter_page(&query, 1).await?;
        let mut records = first.records;

        for page in 2..=first.pages {
            let next = self.datacenter_page(&query, page).await?;
            records.extend(next.records);
        }

        Ok(records)
    }
}

/// 行情列表总页数，上限为 `CLIST_MAX_PAGES`
fn clist_page_count(total: usize) -> usize {
    total.div_ceil(CLIST_PAGE_SIZE).min(CLIST_MAX_PAGES)
}

fn secucode_filter(code: &str) -> String {
    format!("(SECUCODE=\"{}.HK\")", code)
}

fn secid(code: &str) -> String {
    format!("{}.{}", HK_MARKET_ID, code)
}

fn report_name(kind: ReportKind) -> &'static str {
    match kind {
        ReportKind::Income => "RPT_HKF10_FN_INCOME_PC",
        ReportKind::Balance => "RPT_HKF10_FN_BALANCE_PC",
        ReportKind::CashFlow => "RPT_HKF10_FN_CASHFLOW_PC",
    }
}

fn fqt(adjust: Adjust) -> &'static str {
    match adjust {
        Adjust::None => "0",
        Adjust::Forward => "1",
        Adjust::Backward => "2",
    }
}

/// 解析历史K线
///
/// 格式: {"data":{"code":"00700","klines":["2024-01-02,300.0,302.2,303.0,298.8,12345678,3.7e9,1.40,0.73,2.20,0.13",...]}}
fn parse_kline(json: &Value) -> Result<Table> {
    let mut table = Table::new(KLINE_COLUMNS);

    let klines = match json["data"]["klines"].as_array() {
        Some(klines) => klines,
        None => return Ok(table),
    };

    for line in klines {
        let line = line
            .as_str()
            .ok_or_else(|| anyhow!("K线数据格式错误: {}", line))?;
        let mut fields = line.split(',');
        let date = fields.next().unwrap_or("").trim().to_string();

        let mut row = vec![Value::String(date)];
        row.extend(fields.map(parse_number));
        table.push_row(row);
    }

    Ok(table)
}

/// 解析行情列表单页，diff 可能是数组或以序号为键的对象
fn parse_clist_page(json: &Value) -> Result<ClistPage> {
    let data = &json["data"];
    if data.is_null() {
        return Ok(ClistPage::default());
    }

    let total = data["total"].as_u64().unwrap_or(0) as usize;
    let items: Vec<&Value> = match &data["diff"] {
        Value::Array(items) => items.iter().collect(),
        Value::Object(items) => items.values().collect(),
        _ => Vec::new(),
    };

    let rows = items
        .into_iter()
        .map(|item| {
            CLIST_FIELDS
                .iter()
                .map(|(field, _)| clean_value(item[*field].clone()))
                .collect()
        })
        .collect();

    Ok(ClistPage { total, rows })
}

/// 解析个股快照为单行估值表
fn parse_quote(json: &Value) -> Table {
    let mut table = Table::new(
        std::iter::once("日期").chain(QUOTE_FIELDS.iter().map(|(_, label)| *label)),
    );

    let data = &json["data"];
    if !data.is_object() {
        return table;
    }

    let date = data["f86"]
        .as_i64()
        .and_then(timestamp_to_hk_date)
        .map(Value::String)
        .unwrap_or(Value::Null);

    let mut row = vec![date];
    row.extend(QUOTE_FIELDS.iter().map(|(field, _)| clean_value(data[*field].clone())));
    table.push_row(row);
    table
}

/// 解析数据中心单页，result 为 null 表示无数据
fn parse_datacenter_page(json: &Value) -> Result<DatacenterPage> {
    let result = &json["result"];
    if result.is_null() {
        return Ok(DatacenterPage::default());
    }

    let records = result["data"]
        .as_array()
        .map(|items| {
            items
                .iter()
                .filter_map(|item| item.as_object().cloned())
                .collect()
        })
        .unwrap_or_default();
    let pages = result["pages"].as_u64().unwrap_or(1) as usize;

    Ok(DatacenterPage { pages, records })
}

/// 公司概况记录转为“项目/值”两列表
fn profile_table(record: &Record) -> Table {
    let mut table = Table::new(["项目", "值"]);
    for (field, label) in PROFILE_FIELDS.iter() {
        if let Some(value) = record.get(*field) {
            let value = if *field == "FOUND_DATE" { date_part(value) } else { value.clone() };
            table.push_row(vec![Value::String((*label).to_string()), value]);
        }
    }
    table
}

/// 主要财务指标记录转为中文列名表
fn indicator_table(records: Vec<Record>) -> Table {
    let mut table = Table::from_records(records);
    table.rename_columns(&INDICATOR_FIELDS);
    table.map_column("报告期", date_part);
    table
}

#[async_trait]
impl HkDataProvider for EastmoneyProvider {
    fn name(&self) -> &'static str {
        "eastmoney"
    }

    fn version(&self) -> String {
        format!("eastmoney/{}", env!("CARGO_PKG_VERSION"))
    }

    async fn financial_report(
        &self,
        code: &str,
        kind: ReportKind,
        indicator: ReportIndicator,
    ) -> Result<Table> {
        let mut filter = secucode_filter(code);
        if indicator == ReportIndicator::Annual {
            filter.push_str("(DATE_TYPE_CODE=\"001\")");
        }

        let records = self
            .fetch_datacenter(DatacenterQuery {
                report: report_name(kind),
                filter,
                sort: Some(("REPORT_DATE,STD_ITEM_CODE", "-1,1")),
            })
            .await?;
        Ok(Table::from_records(records))
    }

    async fn hist(&self, code: &str, adjust: Adjust) -> Result<Table> {
        let params = [
            ("secid", secid(code)),
            ("ut", EM_KLINE_UT.to_string()),
            ("fields1", "f1,f2,f3,f4,f5,f6".to_string()),
            ("fields2", "f51,f52,f53,f54,f55,f56,f57,f58,f59,f60,f61".to_string()),
            ("klt", "101".to_string()),
            ("fqt", fqt(adjust).to_string()),
            ("beg", "19700101".to_string()),
            ("end", "20500101".to_string()),
            ("lmt", "1000000".to_string()),
        ];
        let json = self.get_json(&self.kline_url, &params).await?;
        parse_kline(&json)
    }

    async fn ggt_components(&self) -> Result<Table> {
        self.fetch_clist(GGT_COMPONENTS_FS).await
    }

    async fn spot(&self) -> Result<Table> {
        self.fetch_clist(HK_SPOT_FS).await
    }

    async fn company_profile(&self, code: &str) -> Result<Table> {
        let records = self
            .fetch_datacenter(DatacenterQuery {
                report: "RPT_HKF10_INFO_ORGPROFILE",
                filter: secucode_filter(code),
                sort: None,
            })
            .await?;

        Ok(records
            .first()
            .map(profile_table)
            .unwrap_or_else(|| Table::new(["项目", "值"])))
    }

    async fn valuation(&self, code: &str) -> Result<Table> {
        let fields: Vec<&str> = std::iter::once("f86")
            .chain(QUOTE_FIELDS.iter().map(|(f, _)| *f))
            .collect();
        let params = [
            ("secid", secid(code)),
            ("ut", EM_KLINE_UT.to_string()),
            ("fltt", "2".to_string()),
            ("invt", "2".to_string()),
            ("fields", fields.join(",")),
        ];
        let json = self.get_json(&self.quote_url, &params).await?;
        Ok(parse_quote(&json))
    }

    async fn financial_indicator(&self, code: &str) -> Result<Table> {
        let records = self
            .fetch_datacenter(DatacenterQuery {
                report: "RPT_HKF10_FN_MAININDICATOR",
                filter: secucode_filter(code),
                sort: Some(("REPORT_DATE", "-1")),
            })
            .await?;
        Ok(indicator_table(records))
    }

    async fn dividend_payout(&self, code: &str) -> Result<Table> {
        let records = self
            .fetch_datacenter(DatacenterQuery {
                report: "RPT_HKF10_MAIN_DIVBASIC",
                filter: secucode_filter(code),
                sort: None,
            })
            .await?;
        Ok(Table::from_records(records))
    }

    async fn security_profile(&self, code: &str) -> Result<Table> {
        let records = self
            .fetch_datacenter(DatacenterQuery {
                report: "RPT_HKF10_INFO_SECURITYINFO",
                filter: secucode_filter(code),
                sort: None,
            })
            .await?;
        Ok(Table::from_records(records))
    }
}
