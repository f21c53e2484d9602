// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 请求分类链模块
//!
//! 服务器的核心逻辑：一条有序的分类规则链（Case Chain）。每条规则是一对函数：
//! 谓词 `test` 判断解析出的物理路径是否属于该类资源，动作 `act` 产出响应内容
//! 或一个类型化的 `Exception`。
//!
//! ## 契约
//! - 规则按固定顺序自上而下求值，命中即止，每个请求恰好触发一条规则。
//! - 谓词只做文件系统存在性检查，无副作用，可重复求值。
//! - 链尾的兜底规则无条件命中，保证链是全覆盖的，永远不会落空。
//!
//! ## 顺序说明
//! `script-file` 排在 `existing-file` 之后。由于任何常规文件（包括脚本）都会先
//! 被 `existing-file` 命中，该规则经由链本身不可达，脚本文件按普通文件返回源码。
//! 这是从上游沿袭下来、刻意保留的顺序，修改它会改变对外行为（见 DESIGN.md）。

use bytes::Bytes;
use lazy_static::lazy_static;

use crate::{
    exception::Exception,
    handler::{self, Content},
    param::{INDEX_FILE, SCRIPT_EXTENSION},
    util,
};

use std::path::{Path, PathBuf};

/// 一次分类所需的全部输入。
///
/// 每个请求构建一个，响应发出后丢弃。
#[derive(Debug, Clone)]
pub struct CaseContext {
    /// 服务器根目录与请求路径直接拼接得到的物理路径
    full_path: PathBuf,
    /// 客户端原始请求路径，错误消息需要回显它
    request_path: String,
    /// 执行脚本文件使用的解释器
    interpreter: String,
}

impl CaseContext {
    /// 由服务器根目录和请求路径构建分类上下文。
    ///
    /// 物理路径是两个字符串的直接拼接：不做 `..` 折叠，也不做百分号解码。
    /// 含有父目录段的请求路径因此可以逃出根目录——路径遍历校验是一项
    /// 明确排除的范围决定，而不是遗漏（见 DESIGN.md）。
    pub fn new(root: &str, request_path: &str, interpreter: &str) -> Self {
        let full_path = PathBuf::from([root, request_path].concat());
        Self {
            full_path,
            request_path: request_path.to_string(),
            interpreter: interpreter.to_string(),
        }
    }

    pub fn full_path(&self) -> &Path {
        &self.full_path
    }

    pub fn request_path(&self) -> &str {
        &self.request_path
    }

    /// 目录首页文件的物理路径。
    /// 谓词和动作使用同一条规则：`full_path` 下直接拼接 `index.html`
    fn index_path(&self) -> PathBuf {
        self.full_path.join(INDEX_FILE)
    }
}

/// 一条分类规则：谓词与动作的配对
pub struct Case {
    /// 规则名，用于日志
    pub name: &'static str,
    /// 判断该规则是否命中，只做存在性检查
    pub test: fn(&CaseContext) -> bool,
    /// 产出响应内容，或一个交由分发器渲染的异常
    pub act: fn(&CaseContext) -> Result<Content, Exception>,
}

lazy_static! {
    /// 分类规则链。进程启动时构建一次，只读共享给所有请求。
    pub static ref CASES: Vec<Case> = vec![
        Case {
            name: "existing-file",
            test: existing_file_test,
            act: existing_file_act,
        },
        Case {
            name: "no-path",
            test: no_path_test,
            act: no_path_act,
        },
        Case {
            name: "directory-with-index",
            test: directory_with_index_test,
            act: directory_with_index_act,
        },
        Case {
            name: "directory-without-index",
            test: directory_without_index_test,
            act: directory_without_index_act,
        },
        Case {
            name: "script-file",
            test: script_file_test,
            act: script_file_act,
        },
        // 兜底规则必须位于链尾
        Case {
            name: "always-fail",
            test: always_fail_test,
            act: always_fail_act,
        },
    ];
}

// --- existing-file: 常规文件按字节原样返回 ---

fn existing_file_test(ctx: &CaseContext) -> bool {
    ctx.full_path.is_file()
}

fn existing_file_act(ctx: &CaseContext) -> Result<Content, Exception> {
    serve_file(ctx, &ctx.full_path)
}

// --- no-path: 路径不存在 ---

fn no_path_test(ctx: &CaseContext) -> bool {
    !ctx.full_path.exists()
}

fn no_path_act(ctx: &CaseContext) -> Result<Content, Exception> {
    Err(Exception::NotFound {
        path: ctx.request_path.clone(),
    })
}

// --- directory-with-index: 目录下直接存在 index.html 时返回该文件 ---

fn directory_with_index_test(ctx: &CaseContext) -> bool {
    ctx.full_path.is_dir() && ctx.index_path().is_file()
}

fn directory_with_index_act(ctx: &CaseContext) -> Result<Content, Exception> {
    serve_file(ctx, &ctx.index_path())
}

// --- directory-without-index: 渲染目录列表 ---

fn directory_without_index_test(ctx: &CaseContext) -> bool {
    ctx.full_path.is_dir() && !ctx.index_path().is_file()
}

fn directory_without_index_act(ctx: &CaseContext) -> Result<Content, Exception> {
    let entries = handler::list_dir(&ctx.full_path).map_err(|e| Exception::ListFailed {
        path: ctx.request_path.clone(),
        cause: e.to_string(),
    })?;
    let page = util::listing_page(&entries);
    Ok(Content::ok(Bytes::from(page)))
}

// --- script-file: 以解释器执行脚本并返回其标准输出 ---
// 经由链不可达（existing-file 先命中任何常规文件），见模块文档

fn script_file_test(ctx: &CaseContext) -> bool {
    ctx.full_path.is_file()
        && ctx
            .full_path
            .extension()
            .map_or(false, |e| e == SCRIPT_EXTENSION)
}

fn script_file_act(ctx: &CaseContext) -> Result<Content, Exception> {
    let output = handler::run_script(&ctx.interpreter, &ctx.full_path).map_err(|e| {
        Exception::ExecFailed {
            path: ctx.request_path.clone(),
            cause: e.to_string(),
        }
    })?;
    Ok(Content::ok(output))
}

// --- always-fail: 兜底规则 ---

fn always_fail_test(_ctx: &CaseContext) -> bool {
    true
}

fn always_fail_act(ctx: &CaseContext) -> Result<Content, Exception> {
    Err(Exception::UnknownObject {
        path: ctx.request_path.clone(),
    })
}

/// 读取文件并包装为 200 内容，读取失败映射为携带请求路径的异常
fn serve_file(ctx: &CaseContext, path: &Path) -> Result<Content, Exception> {
    let bytes = handler::read_file(path).map_err(|e| Exception::ReadFailed {
        path: ctx.request_path.clone(),
        cause: e.to_string(),
    })?;
    Ok(Content::ok(bytes))
}
