//! 通用 API 响应模型
//!
//! 定义统一的 API 响应格式

use serde::Serialize;

/// 统一 API 响应结构
///
/// 所有数据接口返回统一格式：
/// - success: 请求是否成功
/// - data: 响应数据（失败时为空列表或 null）
/// - count: 记录条数（列表类接口）
/// - error: 错误信息（仅失败时）
/// - message: 提示信息（如数据为空）
///
/// 领域错误一律以 HTTP 200 + `success=false` 返回，调用方只需解析这一种结构
#[derive(Debug, Serialize)]
pub struct ApiResponse<T> {
    /// 请求是否成功
    pub success: bool,
    /// 响应数据
    pub data: Option<T>,
    /// 记录条数
    #[serde(skip_serializing_if = "Option::is_none")]
    pub count: Option<usize>,
    /// 错误信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub error: Option<String>,
    /// 提示信息
    #[serde(skip_serializing_if = "Option::is_none")]
    pub message: Option<String>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    ///
    /// # 参数
    /// - data: 响应数据
    pub fn success(data: T) -> Self {
        Self {
            success: true,
            data: Some(data),
            count: None,
            error: None,
            message: None,
        }
    }

    /// 创建无数据的成功响应（`data: null`）
    pub fn empty() -> Self {
        Self {
            success: true,
            data: None,
            count: None,
            error: None,
            message: None,
        }
    }

    /// 附加记录条数
    pub fn with_count(mut self, count: usize) -> Self {
        self.count = Some(count);
        self
    }

    /// 附加提示信息
    pub fn with_message(mut self, message: impl Into<String>) -> Self {
        self.message = Some(message.into());
        self
    }
}

impl<T: ErrorPayload> ApiResponse<T> {
    /// 创建错误响应
    ///
    /// # 参数
    /// - error: 错误信息
    pub fn error(error: String) -> Self {
        Self {
            success: false,
            data: T::error_payload(),
            count: None,
            error: Some(error),
            message: None,
        }
    }
}

impl<T> ApiResponse<Vec<T>> {
    /// 列表成功响应，自动带上 count
    pub fn list(data: Vec<T>) -> Self {
        let count = data.len();
        Self::success(data).with_count(count)
    }
}

/// 失败响应中 `data` 字段的取值
///
/// 列表类接口失败时返回 `[]`，单对象接口返回 `null`
pub trait ErrorPayload: Sized {
    fn error_payload() -> Option<Self>;
}

impl<T> ErrorPayload for Vec<T> {
    fn error_payload() -> Option<Self> {
        Some(Vec::new())
    }
}
