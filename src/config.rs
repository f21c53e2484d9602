use serde_derive::Deserialize;
use serde_derive::Serialize;

use log::{error, warn};
use std::fs::File;
use std::io::prelude::*;

#[derive(Serialize, Deserialize, Debug, Clone)]
pub struct Config {
    #[serde(default = "default_www_root")]
    www_root: String,
    #[serde(default = "default_port")]
    port: u16,
    #[serde(default = "default_local")]
    local: bool,
    #[serde(default = "default_interpreter")]
    interpreter: String,
}

fn default_www_root() -> String {
    ".".to_string()
}

fn default_port() -> u16 {
    8000
}

fn default_local() -> bool {
    true
}

fn default_interpreter() -> String {
    "python3".to_string()
}

impl Config {
    pub fn new() -> Self {
        Self {
            www_root: default_www_root(),
            port: default_port(),
            local: default_local(),
            interpreter: default_interpreter(),
        }
    }

    /// 从 TOML 文件构建配置。
    /// 配置文件缺失或无法解析时退回默认值，服务器照常启动。
    pub fn from_toml(filename: &str) -> Self {
        let mut file = match File::open(filename) {
            Ok(f) => f,
            Err(e) => {
                warn!("找不到配置文件{}（{}），使用默认配置", filename, e);
                return Config::new();
            }
        };
        let mut str_val = String::new();
        if let Err(e) = file.read_to_string(&mut str_val) {
            warn!("读取配置文件{}失败（{}），使用默认配置", filename, e);
            return Config::new();
        }

        match toml::from_str(&str_val) {
            Ok(t) => t,
            Err(_) => {
                error!("无法成功从配置文件构建配置对象，使用默认配置");
                Config::new()
            }
        }
    }
}

impl Config {
    pub fn www_root(&self) -> &str {
        &self.www_root
    }

    pub fn port(&self) -> u16 {
        self.port
    }

    pub fn local(&self) -> bool {
        self.local
    }

    pub fn interpreter(&self) -> &str {
        &self.interpreter
    }
}
