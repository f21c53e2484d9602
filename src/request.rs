// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # HTTP 请求处理模块
//!
//! 该模块负责将 TCP 流中读取的原始字节码解析为强类型的 `Request` 结构体。
//! 它涵盖了：
//! 1. 请求行（Request-Line）的解析（方法、路径、版本）。
//! 2. 常用 HTTP 标头（Headers）的提取。
//! 3. 客户端地址的记录（用于日志审计）。

use crate::{exception::Exception, param::*};
use log::error;

use std::net::SocketAddr;

/// 表示一个完整的 HTTP 请求元数据。
///
/// 该结构体在请求被接收时构建，在响应发出后随即丢弃；请求之间不共享任何状态。
#[derive(Debug, Clone)]
pub struct Request {
    /// HTTP 请求方法（目前只有 GET 能通过解析）
    method: HttpRequestMethod,
    /// 请求的资源路径，保持请求行上的原始形态
    path: String,
    /// HTTP 协议版本
    version: HttpVersion,
    /// 客户端标识字符串
    user_agent: String,
    /// 客户端地址（主机与端口）
    client_addr: SocketAddr,
}

impl Request {
    /// 从原始字节缓冲区尝试构建 `Request` 实例。
    ///
    /// # 逻辑步骤
    /// 1. 验证编码：确保请求数据是合法的 UTF-8 字符串。
    /// 2. 解析请求行：提取方法、路径和协议版本。
    /// 3. 迭代解析标头：目前只关心 `User-Agent`。
    ///
    /// # 参数
    /// * `buffer` - 从网络 Socket 读取的原始数据。
    /// * `client_addr` - 对端地址，由连接层提供。
    /// * `id` - 全局请求 ID，用于追踪日志。
    ///
    /// # 错误处理
    /// 请求格式不符合 HTTP 规范、使用了 GET 以外的方法或不支持的版本时，
    /// 返回相应的 `Exception`。
    pub fn try_from(
        buffer: &[u8],
        client_addr: SocketAddr,
        id: u128,
    ) -> Result<Self, Exception> {
        // 1. 将字节流转换为字符串，失败则判定为非法的 HTTP 请求
        let request_string = match String::from_utf8(buffer.to_vec()) {
            Ok(string) => string,
            Err(_) => {
                error!("[ID{}]无法解析HTTP请求", id);
                return Err(Exception::RequestNotUtf8);
            }
        };

        let request_lines: Vec<&str> = request_string.split(CRLF).collect();

        // 2. 解析请求行 (e.g., "GET /index.html HTTP/1.1")
        let first_line_parts: Vec<&str> = request_lines[0].split(" ").collect();

        // 残缺的请求行无法判定方法与版本，按格式错误处理（400），
        // 不能归为方法不支持（405）
        if first_line_parts.len() < 3 {
            error!("[ID{}]HTTP请求行格式不正确：{}", id, request_lines[0]);
            return Err(Exception::MalformedRequestLine);
        }

        // 解析方法名。本服务器只处理 GET，其余方法一律在此拒绝
        let method_str = first_line_parts[0].to_uppercase();
        let method = match method_str.as_str() {
            "GET" => HttpRequestMethod::Get,
            _ => {
                error!("[ID{}]不支持的HTTP请求方法：{}", id, &method_str);
                return Err(Exception::UnsupportedMethod);
            }
        };

        // 解析协议版本
        let version_str = first_line_parts.last().unwrap().to_uppercase();
        let version = match version_str.as_str() {
            "HTTP/1.1" => HttpVersion::V1_1,
            "HTTP/1.0" => HttpVersion::V1_0,
            _ => {
                error!("[ID{}]不支持的HTTP协议版本：{}", id, &version_str);
                return Err(Exception::UnsupportedHttpVersion);
            }
        };

        // 解析路径（考虑到路径中可能包含空格的情况，虽然不规范但通过 join 尝试恢复）
        let path = if first_line_parts.len() == 3 {
            first_line_parts[1].to_string()
        } else {
            first_line_parts[1..first_line_parts.len() - 1].join(" ")
        };

        // 3. 迭代各行解析 Headers
        let mut user_agent = "".to_string();
        for line in &request_lines {
            let line_lower = line.to_lowercase();
            if line_lower.starts_with("user-agent") {
                if let Some(val) = line.split(": ").nth(1) {
                    user_agent = val.to_string();
                }
            }
        }

        Ok(Self {
            method,
            path,
            version,
            user_agent,
            client_addr,
        })
    }
}

// --- Getter 访问器实现 ---

impl Request {
    /// 获取 HTTP 协议版本
    pub fn version(&self) -> &HttpVersion {
        &self.version
    }

    /// 获取请求路径
    pub fn path(&self) -> &str {
        &self.path
    }

    /// 获取请求方法
    pub fn method(&self) -> HttpRequestMethod {
        self.method
    }

    /// 获取用户代理字符串
    pub fn user_agent(&self) -> &str {
        &self.user_agent
    }

    /// 获取客户端地址
    pub fn client_addr(&self) -> SocketAddr {
        self.client_addr
    }
}
