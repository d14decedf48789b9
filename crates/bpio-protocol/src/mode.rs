//! 模式配置
//!
//! 设备同一时间只运行一种模式。每种模式有自己的一组强类型参数，
//! 在编码为线上格式之前先经过 `validate()` 校验。

use crate::ProtocolError;
use crate::messages::{ConfigurationRequest, ModeConfiguration};
use num_enum::{IntoPrimitive, TryFromPrimitive};

/// 设备模式
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default)]
pub enum Mode {
    /// 未配置 / 高阻态（HiZ）
    #[default]
    None,
    Uart,
    Spi,
    I2c,
    Led,
}

impl Mode {
    /// 设备端使用的模式名
    pub fn wire_name(self) -> &'static str {
        match self {
            Mode::None => "HiZ",
            Mode::Uart => "UART",
            Mode::Spi => "SPI",
            Mode::I2c => "I2C",
            Mode::Led => "LED",
        }
    }

    /// 从设备端模式名解析（大小写不敏感）
    pub fn from_wire_name(name: &str) -> Option<Self> {
        match name.to_ascii_uppercase().as_str() {
            "HIZ" => Some(Mode::None),
            "UART" => Some(Mode::Uart),
            "SPI" => Some(Mode::Spi),
            "I2C" => Some(Mode::I2c),
            "LED" => Some(Mode::Led),
            _ => None,
        }
    }

    pub fn is_none(self) -> bool {
        self == Mode::None
    }
}

impl std::fmt::Display for Mode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.wire_name())
    }
}

/// UART 参数
///
/// 默认 115200 8N1，无流控，无信号反相。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UartConfig {
    /// 波特率（bps）
    pub speed: u32,
    /// 数据位（5-8）
    pub data_bits: u8,
    /// 偶校验（false 表示无校验）
    pub parity: bool,
    /// 停止位（1 或 2）
    pub stop_bits: u8,
    /// 硬件流控
    pub flow_control: bool,
    /// 信号反相
    pub signal_inversion: bool,
}

impl Default for UartConfig {
    fn default() -> Self {
        Self {
            speed: 115_200,
            data_bits: 8,
            parity: false,
            stop_bits: 1,
            flow_control: false,
            signal_inversion: false,
        }
    }
}

impl UartConfig {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.speed == 0 {
            return Err(ProtocolError::invalid("speed", self.speed));
        }
        if !(5..=8).contains(&self.data_bits) {
            return Err(ProtocolError::invalid("data_bits", self.data_bits));
        }
        if !matches!(self.stop_bits, 1 | 2) {
            return Err(ProtocolError::invalid("stop_bits", self.stop_bits));
        }
        Ok(())
    }
}

/// SPI 参数
///
/// 默认 1 MHz，模式 0（CPOL=0, CPHA=0），片选空闲为高。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SpiConfig {
    /// 时钟频率（Hz）
    pub speed: u32,
    /// 数据位（4-8）
    pub data_bits: u8,
    pub clock_polarity: bool,
    pub clock_phase: bool,
    /// 片选空闲电平（true = 高）
    pub chip_select_idle: bool,
}

impl Default for SpiConfig {
    fn default() -> Self {
        Self {
            speed: 1_000_000,
            data_bits: 8,
            clock_polarity: false,
            clock_phase: false,
            chip_select_idle: true,
        }
    }
}

impl SpiConfig {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.speed == 0 {
            return Err(ProtocolError::invalid("speed", self.speed));
        }
        if !(4..=8).contains(&self.data_bits) {
            return Err(ProtocolError::invalid("data_bits", self.data_bits));
        }
        Ok(())
    }
}

/// I2C 总线最高时钟（Fast-mode Plus）
pub const I2C_MAX_SPEED_HZ: u32 = 1_000_000;

/// I2C 参数
///
/// 默认 400 kHz，不启用时钟延展。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct I2cConfig {
    /// 时钟频率（Hz）
    pub speed: u32,
    pub clock_stretch: bool,
}

impl Default for I2cConfig {
    fn default() -> Self {
        Self {
            speed: 400_000,
            clock_stretch: false,
        }
    }
}

impl I2cConfig {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if self.speed == 0 || self.speed > I2C_MAX_SPEED_HZ {
            return Err(ProtocolError::invalid("speed", self.speed));
        }
        Ok(())
    }
}

/// 可寻址 LED 类型（对应设备端 submode 编号）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, TryFromPrimitive, IntoPrimitive)]
#[repr(u8)]
pub enum LedType {
    Ws2812 = 0,
    Apa102 = 1,
    /// 板载 RGB LED
    Onboard = 2,
}

impl Default for LedType {
    fn default() -> Self {
        LedType::Ws2812
    }
}

impl std::str::FromStr for LedType {
    type Err = ProtocolError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_uppercase().as_str() {
            "WS2812" => Ok(LedType::Ws2812),
            "APA102" => Ok(LedType::Apa102),
            "ONBOARD" => Ok(LedType::Onboard),
            _ => Err(ProtocolError::invalid("led_type", s)),
        }
    }
}

/// LED 参数
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct LedConfig {
    pub led_type: LedType,
}

/// 模式配置（封闭的标签联合）
///
/// 替代松散的键值参数：每个变体只包含该模式合法的字段。
///
/// # Example
///
/// ```
/// use bpio_protocol::{ModeConfig, UartConfig, Mode};
///
/// let config = ModeConfig::Uart(UartConfig { speed: 9600, ..Default::default() });
/// assert_eq!(config.mode(), Mode::Uart);
/// assert!(config.validate().is_ok());
/// ```
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum ModeConfig {
    /// 回到高阻态（无活动模式）
    #[default]
    None,
    Uart(UartConfig),
    Spi(SpiConfig),
    I2c(I2cConfig),
    Led(LedConfig),
}

impl ModeConfig {
    pub fn mode(&self) -> Mode {
        match self {
            ModeConfig::None => Mode::None,
            ModeConfig::Uart(_) => Mode::Uart,
            ModeConfig::Spi(_) => Mode::Spi,
            ModeConfig::I2c(_) => Mode::I2c,
            ModeConfig::Led(_) => Mode::Led,
        }
    }

    pub fn validate(&self) -> Result<(), ProtocolError> {
        match self {
            ModeConfig::None | ModeConfig::Led(_) => Ok(()),
            ModeConfig::Uart(c) => c.validate(),
            ModeConfig::Spi(c) => c.validate(),
            ModeConfig::I2c(c) => c.validate(),
        }
    }

    /// 转换为线上格式的模式参数
    pub fn to_wire(&self) -> ModeConfiguration {
        match *self {
            ModeConfig::None => ModeConfiguration::default(),
            ModeConfig::Uart(c) => ModeConfiguration {
                speed: Some(c.speed),
                data_bits: Some(c.data_bits),
                parity: Some(c.parity),
                stop_bits: Some(c.stop_bits),
                flow_control: Some(c.flow_control),
                signal_inversion: Some(c.signal_inversion),
                ..Default::default()
            },
            ModeConfig::Spi(c) => ModeConfiguration {
                speed: Some(c.speed),
                data_bits: Some(c.data_bits),
                clock_polarity: Some(c.clock_polarity),
                clock_phase: Some(c.clock_phase),
                chip_select_idle: Some(c.chip_select_idle),
                ..Default::default()
            },
            ModeConfig::I2c(c) => ModeConfiguration {
                speed: Some(c.speed),
                clock_stretch: Some(c.clock_stretch),
                ..Default::default()
            },
            ModeConfig::Led(c) => ModeConfiguration {
                submode: Some(c.led_type.into()),
                ..Default::default()
            },
        }
    }
}

/// PSU 设置
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum PsuSetting {
    /// 保持设备当前状态
    #[default]
    Unchanged,
    Off,
    On {
        millivolts: u32,
        /// 限流（毫安，0 表示不限流）
        milliamps: u16,
    },
}

/// PSU 输出电压范围（毫伏）
pub const PSU_MIN_MV: u32 = 800;
pub const PSU_MAX_MV: u32 = 5_000;
/// PSU 最大限流（毫安）
pub const PSU_MAX_MA: u16 = 500;

/// 与模式无关的设备设置（随配置请求一起下发）
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub struct DeviceSettings {
    pub psu: PsuSetting,
    /// 上拉电阻：`None` 保持不变
    pub pullups: Option<bool>,
}

impl DeviceSettings {
    pub fn validate(&self) -> Result<(), ProtocolError> {
        if let PsuSetting::On {
            millivolts,
            milliamps,
        } = self.psu
        {
            if !(PSU_MIN_MV..=PSU_MAX_MV).contains(&millivolts) {
                return Err(ProtocolError::invalid("psu_set_mv", millivolts));
            }
            if milliamps > PSU_MAX_MA {
                return Err(ProtocolError::invalid("psu_set_ma", milliamps));
            }
        }
        Ok(())
    }
}

/// 构建完整的配置请求（先校验，再编码）
pub fn build_configuration_request(
    config: &ModeConfig,
    settings: &DeviceSettings,
) -> Result<ConfigurationRequest, ProtocolError> {
    config.validate()?;
    settings.validate()?;

    let mut request = ConfigurationRequest {
        mode: Some(config.mode().wire_name().to_string()),
        mode_configuration: Some(config.to_wire()),
        ..Default::default()
    };

    match settings.psu {
        PsuSetting::Unchanged => {},
        PsuSetting::Off => request.psu_disable = Some(true),
        PsuSetting::On {
            millivolts,
            milliamps,
        } => {
            request.psu_enable = Some(true);
            request.psu_set_mv = Some(millivolts);
            request.psu_set_ma = Some(milliamps);
        },
    }

    match settings.pullups {
        Some(true) => request.pullup_enable = Some(true),
        Some(false) => request.pullup_disable = Some(true),
        None => {},
    }

    Ok(request)
}
