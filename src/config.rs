//! 运行配置，启动时从 `REGION_SHOT_*` 环境变量读取一次；无法解析的值告警后回退默认值

use std::env;
use std::path::PathBuf;

use log::warn;

pub const DEFAULT_OUTPUT: &str = "region_screenshot.png";
pub const DEFAULT_OVERLAY_ALPHA: u8 = 16;
pub const DEFAULT_PEN_WIDTH: i32 = 5;
pub const DEFAULT_PEN_COLOR: u32 = 0x0000FF;

const ENV_OUTPUT: &str = "REGION_SHOT_OUTPUT";
const ENV_OVERLAY_ALPHA: &str = "REGION_SHOT_OVERLAY_ALPHA";
const ENV_PEN_WIDTH: &str = "REGION_SHOT_PEN_WIDTH";
const ENV_PEN_COLOR: &str = "REGION_SHOT_PEN_COLOR";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Config {
    /// 输出 PNG 路径（覆盖已有文件）
    pub output: PathBuf,
    /// 覆盖层不透明度 0..=255
    pub overlay_alpha: u8,
    /// 选框画笔宽度（像素）
    pub pen_width: i32,
    /// 选框画笔颜色 0xRRGGBB
    pub pen_color: u32,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            output: PathBuf::from(DEFAULT_OUTPUT),
            overlay_alpha: DEFAULT_OVERLAY_ALPHA,
            pen_width: DEFAULT_PEN_WIDTH,
            pen_color: DEFAULT_PEN_COLOR,
        }
    }
}

impl Config {
    pub fn from_env() -> Self {
        Self::from_lookup(|key| env::var(key).ok())
    }

    /// 从任意键查找函数构建配置（测试用）
    pub fn from_lookup<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::default();
        if let Some(path) = lookup(ENV_OUTPUT).filter(|v| !v.trim().is_empty()) {
            config.output = PathBuf::from(path.trim());
        }
        if let Some(raw) = lookup(ENV_OVERLAY_ALPHA) {
            match raw.trim().parse::<u8>() {
                Ok(alpha) => config.overlay_alpha = alpha,
                Err(e) => warn!("ignoring {ENV_OVERLAY_ALPHA}={raw:?}: {e}"),
            }
        }
        if let Some(raw) = lookup(ENV_PEN_WIDTH) {
            match raw.trim().parse::<i32>() {
                Ok(width) if width >= 1 => config.pen_width = width,
                Ok(width) => warn!("ignoring {ENV_PEN_WIDTH}={width}: must be at least 1"),
                Err(e) => warn!("ignoring {ENV_PEN_WIDTH}={raw:?}: {e}"),
            }
        }
        if let Some(raw) = lookup(ENV_PEN_COLOR) {
            match parse_rgb(&raw) {
                Some(color) => config.pen_color = color,
                None => warn!("ignoring {ENV_PEN_COLOR}={raw:?}: expected 0xRRGGBB"),
            }
        }
        config
    }
}

fn parse_rgb(raw: &str) -> Option<u32> {
    let s = raw.trim();
    let hex = s
        .strip_prefix("0x")
        .or_else(|| s.strip_prefix("0X"))
        .or_else(|| s.strip_prefix('#'))
        .unwrap_or(s);
    if hex.is_empty() || hex.len() > 6 {
        return None;
    }
    u32::from_str_radix(hex, 16).ok()
}
