// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # Exception 模块
//!
//! 该模块定义了服务器在请求处理生命周期中可能出现的各类异常情况。
//!
//! ## 设计意图
//! - **错误分类**：涵盖了协议解析错误、路径分类错误以及文件系统和子进程错误。
//! - **显式传播**：异常作为 `Result` 的 `Err` 部分逐层返回，由分发器统一转换为
//!   错误响应；请求处理路径上不存在 panic，也没有任何异常能越过分发器到达连接层。
//! - **用户友好**：通过实现 `std::fmt::Display`，错误信息可以直接嵌入错误页面，
//!   且始终携带客户端原始请求路径。

use std::fmt;

/// 服务器处理请求过程中发生的异常类型。
///
/// 分类阶段的变体均携带原始请求路径（而不是解析出的物理路径），
/// 错误页面需要把它回显给客户端。
#[derive(Debug, Clone)]
pub enum Exception {
    /// 客户端发送的请求字节流无法解析为合法的 UTF-8 字符串。
    RequestNotUtf8,
    /// 请求行残缺（字段不足三个），无法判定方法与版本。对应 400。
    MalformedRequestLine,
    /// 客户端使用了 GET 以外的 HTTP 方法。服务器只实现 GET，对应 405。
    UnsupportedMethod,
    /// 客户端使用了服务器不支持的 HTTP 协议版本（非 1.0 / 1.1）。
    UnsupportedHttpVersion,
    /// 路径解析出的文件系统对象不存在。在 Web 语义中对应 `404 Not Found`。
    NotFound { path: String },
    /// 解析出的路径未匹配任何分类规则，由链尾的兜底规则产生。
    UnknownObject { path: String },
    /// 文件存在但读取失败（权限不足、读取期间文件消失等）。
    ReadFailed { path: String, cause: String },
    /// 目录存在但枚举失败。
    ListFailed { path: String, cause: String },
    /// 无法启动脚本解释器执行请求的脚本文件。
    ExecFailed { path: String, cause: String },
}

/// 为 `Exception` 实现 `Display` 特性，使其支持字符串格式化输出。
///
/// 这些描述文本会原样出现在错误页面的 `<p>` 段落以及系统日志中。
impl fmt::Display for Exception {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Exception::RequestNotUtf8 => {
                write!(f, "Request bytes can't be parsed in UTF-8")
            }
            Exception::MalformedRequestLine => {
                write!(f, "Malformed HTTP request line")
            }
            Exception::UnsupportedMethod => {
                write!(f, "Unsupported request method, only GET is served")
            }
            Exception::UnsupportedHttpVersion => {
                write!(f, "Unsupported HTTP version")
            }
            Exception::NotFound { path } => {
                write!(f, "'{}' not found", path)
            }
            Exception::UnknownObject { path } => {
                write!(f, "Unknown object '{}'", path)
            }
            Exception::ReadFailed { path, cause } => {
                write!(f, "'{}' cannot be read: {}", path, cause)
            }
            Exception::ListFailed { path, cause } => {
                write!(f, "'{}' cannot be listed: {}", path, cause)
            }
            Exception::ExecFailed { path, cause } => {
                write!(f, "'{}' cannot be executed: {}", path, cause)
            }
        }
    }
}
