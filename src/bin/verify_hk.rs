//! 港股数据源验证脚本
//!
//! 依次调用数据源的各个港股接口，打印记录数、列名和样例数据，
//! 全部通过时退出码为 0。
//!
//! 用法: `verify_hk [代码]`，默认 00700

use std::env;
use std::future::Future;
use std::process;
use std::time::Duration;

use anyhow::Result;
use env_logger::Env;

use hk_data_proxy::config::AppConfig;
use hk_data_proxy::models::{Adjust, ReportIndicator, ReportKind, Table};
use hk_data_proxy::services::hk::{
    get_hk_time, normalize_hk_code, EastmoneyProvider, HkDataProvider,
};

/// 两次调用之间的间隔，避免触发数据源限流
const CALL_INTERVAL: Duration = Duration::from_millis(500);
/// 样例最多打印的行数
const SAMPLE_ROWS: usize = 3;
/// 最多打印的列名数
const SAMPLE_COLUMNS: usize = 12;

/// 检查结果汇总
#[derive(Debug, Default)]
struct Summary {
    passed: usize,
    failed: Vec<String>,
}

impl Summary {
    fn total(&self) -> usize {
        self.passed + self.failed.len()
    }

    fn pass_rate(&self) -> f64 {
        if self.total() == 0 {
            return 0.0;
        }
        self.passed as f64 * 100.0 / self.total() as f64
    }

    /// 执行一项检查并打印结果
    async fn check<F>(&mut self, name: &str, call: F)
    where
        F: Future<Output = Result<Table>>,
    {
        println!("\n🔍 {}", name);
        match call.await {
            Ok(table) => {
                println!("✅ {}: {} 条记录", name, table.len());
                print_table(&table);
                self.passed += 1;
            }
            Err(e) => {
                println!("❌ {}: {}", name, e);
                self.failed.push(name.to_string());
            }
        }
        tokio::time::sleep(CALL_INTERVAL).await;
    }
}

fn print_table(table: &Table) {
    let columns = table.columns();
    let shown: Vec<&str> = columns.iter().take(SAMPLE_COLUMNS).map(|c| c.as_str()).collect();
    if columns.len() > shown.len() {
        println!("   列名: {:?} ... 共 {} 列", shown, columns.len());
    } else {
        println!("   列名: {:?}", shown);
    }

    for row in table.rows().take(SAMPLE_ROWS) {
        let sample: Vec<String> = shown
            .iter()
            .map(|c| row.get(c).map(|v| v.to_string()).unwrap_or_default())
            .collect();
        println!("   {}", sample.join(" | "));
    }
}

#[tokio::main]
async fn main() {
    env_logger::init_from_env(Env::default().default_filter_or("warn"));

    let code = normalize_hk_code(&env::args().nth(1).unwrap_or_else(|| "00700".to_string()));
    let (config, source) = AppConfig::load();
    source.log();

    let provider = match EastmoneyProvider::new(&config.provider) {
        Ok(provider) => provider,
        Err(e) => {
            eprintln!("❌ 创建数据源失败: {}", e);
            process::exit(2);
        }
    };

    println!("{}", "=".repeat(60));
    println!("港股数据源验证 ({})", provider.version());
    println!("股票代码: {}", code);
    println!("开始时间: {}", get_hk_time());
    println!("{}", "=".repeat(60));

    let mut summary = Summary::default();
    summary.check("港股通成分股", provider.ggt_components()).await;
    summary
        .check("历史行情(前复权)", provider.hist(&code, Adjust::Forward))
        .await;
    summary.check("主要财务指标", provider.financial_indicator(&code)).await;
    summary.check("公司概况", provider.company_profile(&code)).await;
    summary.check("分红派息", provider.dividend_payout(&code)).await;
    summary.check("证券资料", provider.security_profile(&code)).await;
    summary.check("估值指标", provider.valuation(&code)).await;
    summary
        .check(
            "利润表(年度)",
            provider.financial_report(&code, ReportKind::Income, ReportIndicator::Annual),
        )
        .await;
    summary.check("全部港股行情", provider.spot()).await;

    println!("\n{}", "=".repeat(60));
    println!(
        "通过: {}/{} ({:.1}%)",
        summary.passed,
        summary.total(),
        summary.pass_rate()
    );
    if !summary.failed.is_empty() {
        println!("失败: {}", summary.failed.join(", "));
    }
    println!("结束时间: {}", get_hk_time());
    println!("{}", "=".repeat(60));

    if !summary.failed.is_empty() {
        process::exit(1);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_pass_rate() {
        let mut summary = Summary::default();
        assert_eq!(summary.pass_rate(), 0.0);

        summary.passed = 3;
        summary.failed.push("分红派息".to_string());
        assert_eq!(summary.total(), 4);
        assert_eq!(summary.pass_rate(), 75.0);
    }
}
