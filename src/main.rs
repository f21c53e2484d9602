// Copyright (c) 2026 shaneyale (shaneyale86@gmail.com)
// All rights reserved.

//! # 串行 Web 服务器
//!
//! 该模块实现了一个严格串行（一次只处理一个请求）的小型 HTTP 文件服务器。
//! 核心功能包括：
//! - 基于分类规则链（Case Chain）的请求解析与分发
//! - 静态文件、目录首页与目录列表的 HTML 输出
//! - 同步子进程方式的脚本执行（捕获完整标准输出）
//! - 后台管理控制台（CLI 指令交互）

// --- 模块定义 ---
mod cases;      // 分类规则链与上下文
mod config;     // 配置解析与管理
mod dispatch;   // 请求分发器（唯一的错误汇聚点）
mod exception;  // 自定义异常与错误处理
mod handler;    // 文件/目录/脚本内容处理器
mod param;      // 全局常量与静态参数
mod request;    // HTTP 请求报文解析器
mod response;   // HTTP 响应报文构建器
mod util;       // 页面渲染与解释器探测

use config::Config;
use exception::Exception;
use request::Request;
use response::Response;

use log::{debug, error, info, warn};
use log4rs;
use tokio::{
    io::{AsyncBufReadExt, AsyncWriteExt, BufReader},
    net::{TcpListener, TcpStream},
    sync::mpsc,
};

use std::{
    net::{Ipv4Addr, SocketAddr, SocketAddrV4},
    sync::{Arc, Mutex},
    time::Instant,
};

/// # 程序入口点
///
/// 初始化系统环境、加载配置、探测外部依赖并启动主事件循环。
/// 运行时使用单线程（current_thread）风格：连接逐个接收、逐个处理完毕，
/// 请求之间没有并发，也没有任何共享可变状态。
#[tokio::main(flavor = "current_thread")]
async fn main() {
    // 1. 初始化日志系统：采用 log4rs 日志架构，通过外部 YAML 灵活配置级别与输出目的地
    log4rs::init_file("config/log4rs.yaml", Default::default()).unwrap();

    // 2. 环境配置加载：从 TOML 文件读取运行参数
    let config = Config::from_toml("config/development.toml");
    info!("配置文件已载入");

    // 根目录解析："."表示进程启动时的工作目录
    let root = match config.www_root() {
        "." => std::env::current_dir()
            .unwrap()
            .to_string_lossy()
            .into_owned(),
        other => other.to_string(),
    };
    info!("www root: {}", &root);

    // 3. 外部依赖探测：检查脚本解释器是否可用。
    //    探测失败不阻止启动，脚本请求届时会走普通错误路径
    let interpreter = config.interpreter().to_string();
    match util::probe_interpreter(&interpreter) {
        Some(version) => {
            info!("找到{}解释器，版本：{}", &interpreter, version);
        }
        None => {
            warn!(
                "无法找到{}解释器。服务器将继续运行，但将无法执行脚本请求。",
                &interpreter
            );
        }
    }

    // 4. 网络层初始化：
    // 支持全地址监听 (0.0.0.0) 或本地回环监听 (127.0.0.1)
    let port: u16 = config.port();
    info!("服务端将在{}端口上监听Socket连接", port);
    let address = match config.local() {
        true => Ipv4Addr::new(127, 0, 0, 1),
        false => Ipv4Addr::new(0, 0, 0, 0),
    };
    info!("服务端将在{}地址上监听Socket连接", address);
    let socket = SocketAddrV4::new(address, port);

    // 绑定端口并启动监听器
    let listener = match TcpListener::bind(socket).await {
        Ok(listener) => listener,
        Err(e) => {
            error!("无法绑定端口：{}，错误：{}", port, e);
            panic!("无法绑定端口：{}，错误：{}", port, e);
        }
    };
    info!("端口{}绑定完成", port);

    // 5. 服务器状态与生命周期管理
    // shutdown channel: 管理控制台经由该通道发出停机信号 (Graceful Shutdown)
    // served_count: 已处理完毕的请求总数
    let (shutdown_tx, mut shutdown_rx) = mpsc::channel::<()>(1);
    let served_count = Arc::new(Mutex::new(0u128));

    // 6. 启动交互式管理控制台任务
    // 该任务运行在后台，只读观察服务器状态，提供运维指令支持
    tokio::spawn({
        let served_count = Arc::clone(&served_count);
        async move {
            let stdin = tokio::io::stdin();
            let mut reader = BufReader::new(stdin);
            let mut input = String::new();
            loop {
                input.clear();
                if let Ok(_) = reader.read_line(&mut input).await {
                    let cmd = input.trim();
                    match cmd {
                        "stop" => {
                            let _ = shutdown_tx.send(()).await;
                            println!("停机指令已激活，服务器将在处理完当前请求后关闭...");
                            break;
                        }
                        "help" => {
                            println!("== Tinyserve Help ==");
                            println!("stop   - 发出停机信号");
                            println!("status - 查看当前服务器运行状态");
                            println!("help   - 显示此帮助信息");
                            println!("====================");
                        }
                        "status" => {
                            let served = *served_count.lock().unwrap();
                            println!("== Tinyserve 状态 ==");
                            println!("已处理请求数: {}", served);
                            println!("====================");
                        }
                        _ => {
                            println!("无效的命令：{}", cmd);
                        }
                    }
                } else {
                    break;
                }
            }
        }
    });

    let mut id: u128 = 0;

    // 7. 主事件循环 (Accept Loop)
    // 严格串行：当前连接处理完毕（包括可能的子进程执行）之后才接收下一个连接。
    // 停机信号与 accept 在同一个 select 中竞争，停机无需等待下一个连接到来
    loop {
        let (mut stream, addr) = tokio::select! {
            _ = shutdown_rx.recv() => {
                info!("主循环接收到停机指令，正在退出...");
                break;
            }
            result = listener.accept() => match result {
                Ok(pair) => pair,
                Err(e) => {
                    // accept 失败通常是瞬时的（句柄耗尽、对端提前断开等），
                    // 记录后继续监听，不终止服务器
                    error!("接受TCP连接失败：{}，继续监听", e);
                    continue;
                }
            },
        };
        debug!("[ID{}]新的连接：{}", id, addr);

        // 核心业务处理：在当前任务内同步完成整个请求的生命周期
        handle_connection(&mut stream, addr, id, &root, &interpreter).await;

        {
            let mut served = served_count.lock().unwrap();
            *served += 1;
        }
        id += 1; // 增加请求唯一标识序列
    }
}

/// # 连接处理器
///
/// 负责单个 TCP 流的生命周期，包括读取解析请求、执行分类分发、以及构建并发送响应。
/// 任何解析或分发失败都在本函数内转换为响应报文，绝不向上传播。
async fn handle_connection(
    stream: &mut TcpStream,
    addr: SocketAddr,
    id: u128,
    root: &str,
    interpreter: &str,
) {
    let mut buffer = vec![0; 1024];

    // 等待流进入可读状态
    if let Err(e) = stream.readable().await {
        error!("[ID{}]等待TCPStream可读时遇到错误: {}", id, e);
        return;
    }

    // 尝试非阻塞读取 HTTP 报文
    match stream.try_read(&mut buffer) {
        Ok(0) => return, // 客户端主动关闭连接
        Err(e) => {
            error!("[ID{}]读取TCPStream时遇到错误: {}", id, e);
            return;
        }
        _ => {}
    }
    debug!("[ID{}]HTTP请求接收完毕", id);

    let start_time = Instant::now();

    // 1. 协议解析阶段：将字节流转换为结构化的 Request 对象
    let request = match Request::try_from(&buffer, addr, id) {
        Ok(req) => req,
        Err(Exception::UnsupportedMethod) => {
            warn!("[ID{}]收到GET以外的请求方法，返回405", id);
            let response = Response::method_not_allowed();
            let _ = stream.write_all(&response.as_bytes()).await;
            let _ = stream.flush().await;
            return;
        }
        Err(e) => {
            error!("[ID{}]解析HTTP请求失败: {:?}", id, e);
            let response = Response::bad_request();
            let _ = stream.write_all(&response.as_bytes()).await;
            let _ = stream.flush().await;
            return;
        }
    };
    debug!("[ID{}]成功解析HTTP请求", id);

    // 2. 分类分发阶段：路径解析 + 规则链求值，失败在分发器内转换为错误页面
    let response = dispatch::dispatch(&request, root, interpreter, id);

    debug!(
        "[ID{}]HTTP响应构建完成，服务端用时{}ms。",
        id,
        start_time.elapsed().as_millis()
    );

    // 3. 结构化日志记录：便于后期审计
    info!(
        "[ID{}] {}, {}, {}, {}, {}, {}, {}, ",
        id,
        request.client_addr(),
        request.version(),
        request.path(),
        request.method(),
        response.status_code(),
        response.information(),
        request.user_agent(),
    );

    // 4. 数据发送阶段：一次性写出完整报文
    let response_bytes = response.as_bytes();
    debug!("[ID{}]发送全量响应，长度: {}", id, response_bytes.len());
    let _ = stream.write_all(&response_bytes).await;
    let _ = stream.flush().await;
}
