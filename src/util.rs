use log::warn;
use regex::Regex;

use std::process::Command;

/// 目录列表页面。
///
/// 标记格式固定：`<ul>` 中每个可见条目一个 `<li>`，条目之间以 `<br/>` 连接。
pub fn listing_page(entries: &[String]) -> String {
    let bullets: Vec<String> = entries
        .iter()
        .map(|e| format!("<li>{}</li>", e))
        .collect();
    format!(
        "<html><body><ul>{}</ul></body></html>",
        bullets.join("<br/>")
    )
}

/// 错误页面。
///
/// 所有分发失败统一经过这里渲染，回显原始请求路径和人类可读的错误描述。
pub fn error_page(path: &str, msg: &str) -> String {
    format!(
        "<html><body><h1>Error accessing {}</h1><p>{}</p></body></html>",
        path, msg
    )
}

/// 启动时探测脚本解释器是否可用，返回解析出的版本号。
///
/// 探测失败只影响脚本请求；服务器照常启动，由调用方决定是否告警。
pub fn probe_interpreter(interpreter: &str) -> Option<String> {
    let result = Command::new(interpreter).arg("--version").output();
    match result {
        Ok(output) if output.status.success() => {
            // 部分解释器（如较老的 Python 2）把版本打到 stderr
            let text = [
                String::from_utf8_lossy(&output.stdout).to_string(),
                String::from_utf8_lossy(&output.stderr).to_string(),
            ]
            .concat();
            extract_version(&text)
        }
        _ => {
            warn!("无法运行{} --version", interpreter);
            None
        }
    }
}

/// 从解释器的版本输出中提取版本号字符串
fn extract_version(output: &str) -> Option<String> {
    let re = Regex::new(r"(\d+\.\d+(?:\.\d+)?)").unwrap();
    re.captures(output)
        .and_then(|c| c.get(1))
        .map(|m| m.as_str().to_string())
}
