// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 内容处理器模块
//!
//! 分类规则命中后，实际产出响应内容的三个处理器都在这里：
//! - `read_file`：整体读取一个常规文件的全部字节。
//! - `list_dir`：枚举目录中的可见条目。
//! - `run_script`：以解释器同步执行脚本并捕获其标准输出。
//!
//! 处理器只返回 `io::Result`；把错误换成携带请求路径的 `Exception`
//! 是分类规则（`cases` 模块）的职责。

use bytes::Bytes;
use log::debug;

use crate::param::HIDDEN_PREFIX;

use std::{
    fs,
    io,
    path::Path,
    process::{Command, Stdio},
};

/// 一次成功分类的产物：状态码加响应体字节。
///
/// 失败的分类不会产生 `Content`，而是产生 `Exception`。
#[derive(Debug, Clone)]
pub struct Content {
    pub status: u16,
    pub bytes: Bytes,
}

impl Content {
    /// 以 200 状态包装一段响应体
    pub fn ok(bytes: Bytes) -> Self {
        Self { status: 200, bytes }
    }
}

/// 读取整个文件并返回其原始字节。
pub fn read_file(path: &Path) -> io::Result<Bytes> {
    let contents = fs::read(path)?;
    debug!("读取文件{}，共{}字节", path.display(), contents.len());
    Ok(Bytes::from(contents))
}

/// 枚举目录中的可见条目名。
///
/// 以 `.` 开头的条目被过滤掉。返回结果按名称排序：
/// 文件系统本身不保证枚举顺序，排序让同一目录的两次列表字节级一致。
pub fn list_dir(path: &Path) -> io::Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in fs::read_dir(path)? {
        let entry = entry?;
        let name = entry.file_name().to_string_lossy().into_owned();
        if name.starts_with(HIDDEN_PREFIX) {
            continue;
        }
        names.push(name);
    }
    names.sort();
    debug!("目录{}下共{}个可见条目", path.display(), names.len());
    Ok(names)
}

/// 以配置的解释器同步执行脚本，捕获其完整标准输出。
///
/// 子进程不接收任何参数和标准输入，环境沿用宿主默认值。
/// 调用会阻塞到子进程退出为止：没有超时，也不检查退出码和标准错误，
/// 进程写到标准输出的字节原样成为响应体。句柄和管道在函数返回时全部关闭。
pub fn run_script(interpreter: &str, path: &Path) -> io::Result<Bytes> {
    let output = Command::new(interpreter)
        .arg(path)
        .stdin(Stdio::null())
        .output()?;
    debug!(
        "脚本{}执行完毕，捕获标准输出{}字节",
        path.display(),
        output.stdout.len()
    );
    Ok(Bytes::from(output.stdout))
}
