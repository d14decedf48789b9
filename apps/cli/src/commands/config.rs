//! 配置管理命令
//!
//! 配置文件位于 `<config_dir>/bpio/config.toml`：
//!
//! ```toml
//! port = "/dev/ttyACM1"
//!
//! [client]
//! transaction_timeout_ms = 500
//! ```

use super::ConnectionArgs;
use anyhow::{Context, Result, bail};
use bpio_client::ClientConfig;
use clap::Subcommand;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};

/// 默认配置文件路径
pub fn default_config_file() -> Result<PathBuf> {
    let mut path = dirs::config_dir().ok_or_else(|| anyhow::anyhow!("无法确定配置目录"))?;
    path.push("bpio");
    path.push("config.toml");
    Ok(path)
}

/// CLI 配置
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct CliConfig {
    /// 默认串口
    #[serde(skip_serializing_if = "Option::is_none")]
    pub port: Option<String>,

    /// 客户端超时等参数
    pub client: ClientConfig,
}

impl CliConfig {
    /// 从默认位置加载；文件不存在时返回默认配置
    pub fn load() -> Result<Self> {
        Self::load_from(&default_config_file()?)
    }

    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("读取配置文件失败: {}", path.display()))?;
        toml::from_str(&content).with_context(|| format!("解析配置文件失败: {}", path.display()))
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(dir) = path.parent() {
            fs::create_dir_all(dir).context("创建配置目录失败")?;
        }
        let content = toml::to_string_pretty(self).context("序列化配置失败")?;
        fs::write(path, content).context("写入配置文件失败")?;
        Ok(())
    }

    /// 命令行参数优先于配置文件
    pub fn resolve_port(&self, cli_port: Option<&str>) -> Result<String> {
        match cli_port.or(self.port.as_deref()) {
            Some(port) => Ok(port.to_string()),
            None => bail!("未指定串口：使用 --port 或 `bpio-cli config set --port <PORT>`"),
        }
    }
}

/// 配置命令
#[derive(Subcommand, Debug)]
pub enum ConfigCommand {
    /// 设置配置项（串口和波特率取自全局 --port / --baud）
    Set {
        /// 事务超时（毫秒）
        #[arg(long)]
        timeout_ms: Option<u64>,
    },

    /// 获取配置项
    Get {
        /// 配置项名称（port, baud, timeout_ms, all）
        #[arg(default_value = "all")]
        key: String,
    },

    /// 列出可用串口
    Ports,
}

impl ConfigCommand {
    pub fn execute(self, conn: &ConnectionArgs) -> Result<()> {
        let path = default_config_file()?;
        match self {
            ConfigCommand::Set { timeout_ms } => {
                let mut config = CliConfig::load_from(&path)?;
                config.apply(conn.port.clone(), conn.baud, timeout_ms);
                config.save_to(&path)?;
                println!("已保存: {}", path.display());
                Ok(())
            },
            ConfigCommand::Get { key } => {
                let config = CliConfig::load_from(&path)?;
                println!("{}", config.get(&key)?);
                Ok(())
            },
            ConfigCommand::Ports => {
                let ports = bpio_transport::available_ports()?;
                if ports.is_empty() {
                    println!("(未发现串口)");
                }
                for port in ports {
                    println!("{}", port);
                }
                Ok(())
            },
        }
    }
}

impl CliConfig {
    fn apply(&mut self, port: Option<String>, baud: Option<u32>, timeout_ms: Option<u64>) {
        if let Some(port) = port {
            self.port = Some(port);
        }
        if let Some(baud) = baud {
            self.client.baud_rate = baud;
        }
        if let Some(ms) = timeout_ms {
            self.client.transaction_timeout_ms = ms;
        }
    }

    fn get(&self, key: &str) -> Result<String> {
        Ok(match key {
            "port" => self.port.clone().unwrap_or_else(|| "(未设置)".to_string()),
            "baud" => self.client.baud_rate.to_string(),
            "timeout_ms" => self.client.transaction_timeout_ms.to_string(),
            "all" => toml::to_string_pretty(self)?,
            other => bail!("未知配置项: {}", other),
        })
    }
}
