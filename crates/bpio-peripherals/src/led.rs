//! LED 适配器
//!
//! 颜色帧布局：
//! - WS2812: G, R, B（RGBW 灯珠为 G, R, B, W）
//! - 板载 RGB: R, G, B
//! - APA102: 0xE0 | 亮度(0-31), B, G, R
//!
//! 复位/起始帧由主起止条件产生，不在数据中。

use crate::{PeripheralError, Result, require_mode};
use bpio_client::{Client, TransactionRequest};
use bpio_protocol::{LedConfig, LedType, Mode, ModeConfig};

/// APA102 最大亮度
pub const APA102_MAX_BRIGHTNESS: u8 = 31;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct Rgb {
    pub r: u8,
    pub g: u8,
    pub b: u8,
}

impl Rgb {
    pub const BLACK: Rgb = Rgb::new(0, 0, 0);

    pub const fn new(r: u8, g: u8, b: u8) -> Self {
        Self { r, g, b }
    }
}

impl From<(u8, u8, u8)> for Rgb {
    fn from((r, g, b): (u8, u8, u8)) -> Self {
        Self::new(r, g, b)
    }
}

/// 按灯珠类型编码颜色帧
pub fn encode_colors(led_type: LedType, colors: &[Rgb], brightness: u8) -> Vec<u8> {
    match led_type {
        LedType::Ws2812 => colors.iter().flat_map(|c| [c.g, c.r, c.b]).collect(),
        LedType::Onboard => colors.iter().flat_map(|c| [c.r, c.g, c.b]).collect(),
        LedType::Apa102 => {
            let global = 0xE0 | (brightness & APA102_MAX_BRIGHTNESS);
            colors
                .iter()
                .flat_map(|c| [global, c.b, c.g, c.r])
                .collect()
        },
    }
}

pub struct Led<'a> {
    client: &'a Client,
}

impl<'a> Led<'a> {
    pub fn new(client: &'a Client) -> Self {
        Self { client }
    }

    pub fn configure(&self, led_type: LedType) -> Result<()> {
        self.client
            .configure(ModeConfig::Led(LedConfig { led_type }))?;
        Ok(())
    }

    /// 当前配置的灯珠类型
    pub fn led_type(&self) -> Result<LedType> {
        match require_mode(self.client, Mode::Led)? {
            ModeConfig::Led(config) => Ok(config.led_type),
            other => Err(PeripheralError::WrongMode {
                expected: Mode::Led,
                actual: other.mode(),
            }),
        }
    }

    /// 写入原始颜色帧（带复位/起始帧）
    pub fn write(&self, data: &[u8]) -> Result<()> {
        require_mode(self.client, Mode::Led)?;
        self.client
            .transact_request(TransactionRequest::new(data, 0).bracketed())?;
        Ok(())
    }

    /// 设置第一颗灯珠颜色
    pub fn set_rgb(&self, color: Rgb) -> Result<()> {
        self.set_multiple_rgb_with_brightness(&[color], APA102_MAX_BRIGHTNESS)
    }

    pub fn set_rgb_with_brightness(&self, color: Rgb, brightness: u8) -> Result<()> {
        self.set_multiple_rgb_with_brightness(&[color], brightness)
    }

    /// 设置一颗 RGBW 灯珠（仅 WS2812）
    pub fn set_rgbw(&self, color: Rgb, white: u8) -> Result<()> {
        let led_type = self.led_type()?;
        if led_type != LedType::Ws2812 {
            return Err(PeripheralError::InvalidArgument(format!(
                "RGBW is only supported on WS2812, not {led_type:?}"
            )));
        }
        self.write(&[color.g, color.r, color.b, white])
    }

    pub fn set_multiple_rgb(&self, colors: &[Rgb]) -> Result<()> {
        self.set_multiple_rgb_with_brightness(colors, APA102_MAX_BRIGHTNESS)
    }

    /// `brightness` 只对 APA102 生效
    pub fn set_multiple_rgb_with_brightness(&self, colors: &[Rgb], brightness: u8) -> Result<()> {
        if colors.is_empty() {
            return Err(PeripheralError::InvalidArgument("no colours given".to_string()));
        }
        if brightness > APA102_MAX_BRIGHTNESS {
            return Err(PeripheralError::InvalidArgument(format!(
                "brightness {brightness} exceeds {APA102_MAX_BRIGHTNESS}"
            )));
        }
        let led_type = self.led_type()?;
        self.write(&encode_colors(led_type, colors, brightness))
    }

    /// 关闭前 `count` 颗灯珠
    pub fn clear(&self, count: usize) -> Result<()> {
        self.set_multiple_rgb(&vec![Rgb::BLACK; count.max(1)])
    }
}
