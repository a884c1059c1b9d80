//! 统一响应结构
//!
//! [`ApiResponse`] 是服务端错误响应和客户端解析共用的信封结构。
//! 具体的错误枚举 (`AppError` / `ClientError`) 由各端自行定义，
//! 本模块只约定线上格式和错误码规范。
//!
//! # 错误码规范
//!
//! | 码 | 含义 | HTTP |
//! |----|------|------|
//! | E0000 | 成功 | 200 |
//! | E0002 | 验证失败 | 400 |
//! | E0003 | 资源不存在 | 404 |
//! | E0004 | 资源冲突 | 409 |
//! | E0005 | 业务规则违反 | 422 |
//! | E0006 | 无效请求 | 400 |
//! | E9001 | 内部错误 | 500 |
//! | E9002 | 数据库错误 | 500 |

use serde::{Deserialize, Serialize};

/// 成功响应码
pub const SUCCESS_CODE: &str = "E0000";

/// API 统一响应结构
///
/// ```json
/// {
///   "code": "E0000",
///   "message": "Success",
///   "data": { ... }
/// }
/// ```
#[derive(Debug, Serialize, Deserialize)]
pub struct ApiResponse<T> {
    /// 错误码 (E0000 表示成功)
    pub code: String,
    /// 消息
    pub message: String,
    /// 响应数据
    #[serde(skip_serializing_if = "Option::is_none")]
    pub data: Option<T>,
}

impl<T> ApiResponse<T> {
    /// 创建成功响应
    pub fn success(data: T) -> Self {
        Self {
            code: SUCCESS_CODE.to_string(),
            message: "Success".to_string(),
            data: Some(data),
        }
    }

    /// 创建错误响应
    pub fn error(code: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            message: message.into(),
            data: None,
        }
    }

    /// 是否为成功响应
    pub fn is_success(&self) -> bool {
        self.code == SUCCESS_CODE
    }
}
