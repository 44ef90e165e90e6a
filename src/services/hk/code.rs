//! 港股代码标准化

use once_cell::sync::Lazy;
use regex::Regex;

/// 港股代码固定宽度
pub const HK_CODE_WIDTH: usize = 5;

static HK_SUFFIX: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"(?i)\.hk$").expect("invalid HK suffix regex"));

/// 标准化港股代码
///
/// 去掉 `.HK` 后缀（不区分大小写）和首尾空白，再左侧补零到 5 位。
/// 超过 5 位的代码原样返回。
///
/// ```
/// use hk_data_proxy::services::hk::normalize_hk_code;
/// assert_eq!(normalize_hk_code("700"), "00700");
/// assert_eq!(normalize_hk_code("00700.HK"), "00700");
/// ```
pub fn normalize_hk_code(raw: &str) -> String {
    let code = HK_SUFFIX.replace(raw.trim(), "");
    format!("{:0>width$}", code.trim(), width = HK_CODE_WIDTH)
}
