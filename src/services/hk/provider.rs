//! 港股数据源接口定义

use anyhow::{anyhow, Result};
use async_trait::async_trait;

use crate::models::{Adjust, ReportIndicator, ReportKind, Table};

/// 港股数据源
///
/// 每个方法对应数据源的一个函数，返回以数据源列名（中文口径）组织的表格。
/// 空表表示“该代码无数据”，不是错误。
#[async_trait]
pub trait HkDataProvider: Send + Sync {
    /// 数据源名称，用于日志和健康检查
    fn name(&self) -> &'static str;

    /// 数据源版本
    fn version(&self) -> String;

    /// 财务报表（长表：每个报表项目一行）
    async fn financial_report(
        &self,
        code: &str,
        kind: ReportKind,
        indicator: ReportIndicator,
    ) -> Result<Table>;

    /// 日线历史行情，按日期从旧到新
    async fn hist(&self, code: &str, adjust: Adjust) -> Result<Table>;

    /// 港股通成分股列表
    async fn ggt_components(&self) -> Result<Table>;

    /// 全部港股实时行情
    async fn spot(&self) -> Result<Table>;

    /// 公司概况，两列“项目/值”
    async fn company_profile(&self, code: &str) -> Result<Table>;

    /// 最新估值指标
    async fn valuation(&self, code: &str) -> Result<Table>;

    /// 主要财务指标，按报告期从新到旧
    async fn financial_indicator(&self, code: &str) -> Result<Table>;

    /// 分红派息记录
    async fn dividend_payout(&self, code: &str) -> Result<Table> {
        Err(anyhow!("{} 不支持分红派息接口: {}", self.name(), code))
    }

    /// 证券资料
    async fn security_profile(&self, code: &str) -> Result<Table> {
        Err(anyhow!("{} 不支持证券资料接口: {}", self.name(), code))
    }
}
