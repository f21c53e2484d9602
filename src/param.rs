// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 服务器协议参数与常量模块
//!
//! 该模块定义了 `tinyserve` 遵循的 HTTP 协议相关常量和数据结构，包括：
//! - 服务器可能发出的 HTTP 状态码及其原因短语（Reason Phrase）。
//! - 请求解析链使用的固定文件名与后缀名常量。
//! - HTTP 方法与版本的强类型枚举。

use lazy_static::lazy_static;
use std::collections::HashMap;

/// 服务器名称标识，用于 HTTP 响应头的 `Server` 字段
pub const SERVER_NAME: &str = "tinyserve";

/// HTTP 协议规定的换行符（Carriage Return Line Feed）
pub const CRLF: &str = "\r\n";

/// 所有响应统一使用的内容类型。
/// 服务器不做 MIME 协商，文件、目录列表和脚本输出一律按 text/html 返回。
pub const CONTENT_TYPE_HTML: &str = "text/html";

/// 目录首页文件名。目录下直接存在该文件时按文件方式返回它
pub const INDEX_FILE: &str = "index.html";

/// 脚本文件后缀名（不含点）。以该后缀结尾的常规文件可交由解释器执行
pub const SCRIPT_EXTENSION: &str = "py";

/// 隐藏条目前缀。目录列表中以该字符开头的条目一律不展示
pub const HIDDEN_PREFIX: char = '.';

lazy_static! {
    /// 服务器当前允许处理的 HTTP 方法列表。
    ///
    /// 不在该列表中的方法将触发 405 Method Not Allowed。
    pub static ref ALLOWED_METHODS: Vec<HttpRequestMethod> = {
        vec![HttpRequestMethod::Get]
    };
}

lazy_static! {
    /// HTTP 状态码与其对应的标准原因短语映射表。
    ///
    /// 只收录本服务器可能发出的状态码及其邻近值。
    /// 参考标准：[RFC 9110: HTTP Semantics](https://www.rfc-editor.org/rfc/rfc9110.html)。
    pub static ref STATUS_CODES: HashMap<u16, &'static str> = {
        let mut map = HashMap::new();
        // 2xx: 成功响应 (Successful)
        map.insert(200, "OK");
        map.insert(204, "No Content");

        // 3xx: 重定向 (Redirection)
        map.insert(301, "Moved Permanently");
        map.insert(304, "Not Modified");

        // 4xx: 客户端错误 (Client Error)
        map.insert(400, "Bad Request");
        map.insert(403, "Forbidden");
        map.insert(404, "Not Found");
        map.insert(405, "Method Not Allowed");
        map.insert(408, "Request Timeout");
        map.insert(414, "URI Too Long");

        // 5xx: 服务端错误 (Server Error)
        map.insert(500, "Internal Server Error");
        map.insert(501, "Not Implemented");
        map.insert(503, "Service Unavailable");
        map.insert(505, "HTTP Version Not Supported");
        map
    };
}

/// 支持的 HTTP 协议版本
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpVersion {
    /// HTTP/1.0 版本
    V1_0,
    /// HTTP/1.1 版本
    V1_1,
}

/// 标准 HTTP 请求方法。
///
/// 本服务器只实现 GET；其他方法在解析阶段即被拒绝，因此无需列出。
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum HttpRequestMethod {
    /// 获取资源
    Get,
}

use std::fmt;

impl fmt::Display for HttpVersion {
    /// 将枚举格式化为 HTTP 报文中的版本字符串
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpVersion::V1_0 => write!(f, "1.0"),
            HttpVersion::V1_1 => write!(f, "1.1"),
        }
    }
}

impl fmt::Display for HttpRequestMethod {
    /// 将枚举格式化为 HTTP 标准大写方法名
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match *self {
            HttpRequestMethod::Get => write!(f, "GET"),
        }
    }
}
