//! LED 命令

use super::ConnectionArgs;
use crate::utils;
use anyhow::Result;
use bpio_peripherals::{Led, Rgb};
use bpio_protocol::LedType;
use clap::Args;

/// LED 命令参数
#[derive(Args, Debug)]
pub struct LedCommand {
    /// 灯珠类型（ws2812, apa102, onboard）
    #[arg(short = 't', long = "type", default_value = "onboard")]
    pub led_type: LedType,

    /// 颜色列表（RRGGBB，依次对应每颗灯珠）
    #[arg(value_parser = utils::parse_color, required_unless_present = "off")]
    pub colors: Vec<Rgb>,

    /// APA102 亮度（0-31）
    #[arg(short, long, default_value_t = 31, value_parser = clap::value_parser!(u8).range(0..=31))]
    pub brightness: u8,

    /// 关闭前 N 颗灯珠
    #[arg(long, value_name = "N")]
    pub off: Option<usize>,
}

impl LedCommand {
    pub fn execute(&self, conn: &ConnectionArgs) -> Result<()> {
        let client = conn.connect()?;
        let led = Led::new(&client);
        led.configure(self.led_type)?;

        match self.off {
            Some(count) => led.clear(count)?,
            None => led.set_multiple_rgb_with_brightness(&self.colors, self.brightness)?,
        }

        client.close();
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::Parser;

    #[derive(Parser)]
    struct Wrapper {
        #[command(flatten)]
        args: LedCommand,
    }

    #[test]
    fn test_parse_colors() {
        let cmd = Wrapper::parse_from(["led", "-t", "ws2812", "FF0000", "#00FF00"]).args;
        assert_eq!(cmd.led_type, LedType::Ws2812);
        assert_eq!(cmd.colors, vec![Rgb::new(0xFF, 0, 0), Rgb::new(0, 0xFF, 0)]);
        assert_eq!(cmd.brightness, 31);
    }

    #[test]
    fn test_off_needs_no_colors() {
        let cmd = Wrapper::parse_from(["led", "--off", "8"]).args;
        assert_eq!(cmd.off, Some(8));
        assert_eq!(cmd.led_type, LedType::Onboard);
    }

    #[test]
    fn test_rejects_bad_brightness_and_missing_colors() {
        assert!(Wrapper::try_parse_from(["led", "-b", "40", "FFFFFF"]).is_err());
        assert!(Wrapper::try_parse_from(["led"]).is_err());
    }
}
