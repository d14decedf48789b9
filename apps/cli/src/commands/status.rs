//! 设备状态查询

use super::ConnectionArgs;
use anyhow::Result;
use bpio_protocol::{StatusInfo, StatusQuery};
use clap::{Args, ValueEnum};

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum QueryArg {
    All,
    Version,
    Mode,
    Pullup,
    Psu,
    Adc,
    Io,
    Disk,
    Led,
}

impl From<QueryArg> for StatusQuery {
    fn from(arg: QueryArg) -> Self {
        match arg {
            QueryArg::All => StatusQuery::All,
            QueryArg::Version => StatusQuery::Version,
            QueryArg::Mode => StatusQuery::Mode,
            QueryArg::Pullup => StatusQuery::Pullup,
            QueryArg::Psu => StatusQuery::Psu,
            QueryArg::Adc => StatusQuery::Adc,
            QueryArg::Io => StatusQuery::Io,
            QueryArg::Disk => StatusQuery::Disk,
            QueryArg::Led => StatusQuery::Led,
        }
    }
}

/// 状态查询参数
#[derive(Args, Debug)]
pub struct StatusCommand {
    /// 查询的字段（逗号分隔，默认全部）
    #[arg(short, long, value_enum, value_delimiter = ',')]
    pub query: Vec<QueryArg>,
}

impl StatusCommand {
    pub fn execute(&self, conn: &ConnectionArgs) -> Result<()> {
        let client = conn.connect()?;
        let selector: Vec<StatusQuery> = self.query.iter().copied().map(Into::into).collect();
        let status = client.status(&selector)?;
        print!("{}", render(&status));
        client.close();
        Ok(())
    }
}

/// 按字段分组输出，未报告的组省略
fn render(status: &StatusInfo) -> String {
    let mut out = String::new();
    if let Some(v) = &status.version {
        out += &format!("Protocol:  {}.{}\n", v.protocol_major, v.protocol_minor);
        if let Some((major, minor)) = v.hardware {
            out += &format!("Hardware:  {}.{}\n", major, minor);
        }
        if let Some((major, minor)) = v.firmware {
            out += &format!("Firmware:  {}.{}", major, minor);
            if let Some(hash) = &v.firmware_git_hash {
                out += &format!(" ({})", hash);
            }
            if let Some(date) = &v.firmware_date {
                out += &format!(" {}", date);
            }
            out.push('\n');
        }
    }
    if let Some(m) = &status.mode {
        out += &format!("Mode:      {}\n", m.current);
        if !m.available.is_empty() {
            out += &format!("Available: {}\n", m.available.join(", "));
        }
        if !m.pin_labels.is_empty() {
            out += &format!("Pins:      {}\n", m.pin_labels.join(" "));
        }
        if let (Some(w), Some(r)) = (m.max_write, m.max_read) {
            out += &format!("Limits:    write {} / read {} bytes\n", w, r);
        }
    }
    if let Some(p) = &status.psu {
        out += &format!("PSU:       {}", if p.enabled { "on" } else { "off" });
        if let (Some(mv), Some(ma)) = (p.measured_mv, p.measured_ma) {
            out += &format!(", {} mV / {} mA", mv, ma);
        }
        if p.current_error {
            out += ", OVERCURRENT";
        }
        out.push('\n');
    }
    if let Some(enabled) = status.pullup_enabled {
        out += &format!("Pull-ups:  {}\n", if enabled { "on" } else { "off" });
    }
    if let Some(adc) = &status.adc_mv {
        let values: Vec<String> = adc.iter().map(|mv| format!("{}mV", mv)).collect();
        out += &format!("ADC:       {}\n", values.join(" "));
    }
    if let Some(io) = &status.io {
        out += &format!(
            "IO:        dir {:08b} value {:08b}\n",
            io.direction, io.value
        );
    }
    if let Some(d) = &status.disk {
        out += &format!("Disk:      {:.1} / {:.1} MB\n", d.used_mb, d.size_mb);
    }
    if let Some(count) = status.led_count {
        out += &format!("LEDs:      {}\n", count);
    }
    out
}
