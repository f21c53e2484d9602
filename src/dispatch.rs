// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 请求分发模块
//!
//! 每个请求的入口：构建分类上下文、沿规则链找到第一条命中的规则并执行其动作，
//! 把结果（内容或异常）转换为 `Response`。
//!
//! 分发器是唯一的错误汇聚点。规则动作或处理器产生的任何 `Exception` 都在这里
//! 被渲染成 404 错误页面，不会有失败越过本模块到达连接层。
//!
//! 每请求状态机：`Received → Resolving → Dispatching →
//! {Success: Writing → Done} | {Failure: ErrorRendering → Done}`。
//! 终态只有 `Done`，没有重试，也没有重入。

use log::{debug, warn};

use crate::{
    cases::{CaseContext, CASES},
    exception::Exception,
    request::Request,
    response::Response,
};

/// 分发一个已解析的 GET 请求，返回可直接写回连接的响应。
///
/// # 参数
/// * `request` - 已通过解析的请求。
/// * `root` - 服务器根目录（启动时由配置确定，此后不变）。
/// * `interpreter` - 脚本解释器名。
/// * `id` - 全局请求 ID，用于追踪日志。
pub fn dispatch(request: &Request, root: &str, interpreter: &str, id: u128) -> Response {
    // 1. 路径解析：根目录与请求路径直接拼接
    let ctx = CaseContext::new(root, request.path(), interpreter);
    debug!(
        "[ID{}]映射物理路径：{}",
        id,
        ctx.full_path().display()
    );

    // 2. 沿链分类：自上而下求值谓词，首条命中的规则执行动作。
    //    链尾的兜底规则无条件命中，循环必然在链内结束
    for case in CASES.iter() {
        if (case.test)(&ctx) {
            debug!("[ID{}]命中分类规则：{}", id, case.name);
            return match (case.act)(&ctx) {
                Ok(content) => Response::from_content(content),
                Err(e) => {
                    warn!("[ID{}]分类规则{}产生异常：{}", id, case.name, e);
                    Response::from_exception(ctx.request_path(), &e)
                }
            };
        }
    }

    // 链被错误地构造成非全覆盖时的最后防线
    warn!("[ID{}]没有任何分类规则命中，按未知对象处理", id);
    Response::from_exception(
        request.path(),
        &Exception::UnknownObject {
            path: request.path().to_string(),
        },
    )
}
