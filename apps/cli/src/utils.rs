//! 参数解析与输出工具

use anyhow::{Context, Result, bail};
use bpio_peripherals::Rgb;

/// 解析十六进制字节串，允许空格和 `0x` 前缀（如 `"9f 00"`、`"0x9F00"`）
pub fn parse_hex_bytes(input: &str) -> Result<Vec<u8>> {
    let cleaned: String = input
        .split_whitespace()
        .map(|part| part.trim_start_matches("0x").trim_start_matches("0X"))
        .collect();
    hex::decode(&cleaned).with_context(|| format!("无效的十六进制数据: {}", input))
}

/// 解析 7 位 I2C 地址（十进制或 `0x` 十六进制）
pub fn parse_address(input: &str) -> Result<u8> {
    let value = match input.strip_prefix("0x").or_else(|| input.strip_prefix("0X")) {
        Some(hex) => u8::from_str_radix(hex, 16),
        None => input.parse::<u8>(),
    }
    .with_context(|| format!("无效的地址: {}", input))?;
    if value > 0x7F {
        bail!("地址 0x{:02X} 超出 7 位范围", value);
    }
    Ok(value)
}

/// 解析 `RRGGBB` 颜色（可带 `#` 前缀）
pub fn parse_color(input: &str) -> Result<Rgb> {
    let bytes = hex::decode(input.trim_start_matches('#'))
        .with_context(|| format!("无效的颜色: {}", input))?;
    match bytes.as_slice() {
        [r, g, b] => Ok(Rgb::new(*r, *g, *b)),
        _ => bail!("颜色需要 3 个字节（RRGGBB）: {}", input),
    }
}

/// 十六进制 + 可打印 ASCII 的一行输出
pub fn format_bytes(data: &[u8]) -> String {
    let ascii: String = data
        .iter()
        .map(|&b| {
            if b.is_ascii_graphic() || b == b' ' {
                b as char
            } else {
                '.'
            }
        })
        .collect();
    format!("{} |{}|", hex::encode_upper(data), ascii)
}
