use clap::Parser;
use tray_manager::layout::BoxLayout;

/// Struct that gets generated from `RawOpt`.
#[derive(Debug, PartialEq, Eq)]
pub struct Opt {
    pub log_debug: bool,
    pub screen: Option<usize>,
    pub layout: BoxLayout,
    /// Panel color as `0xRRGGBBAA`.
    pub background: u32,
}

#[derive(Parser, Debug, PartialEq)]
#[command(author = "elkowar", version, about = "A standalone X11 system tray")]
struct RawOpt {
    /// Write out debug logs.
    #[arg(long = "debug")]
    log_debug: bool,

    /// Screen to manage the tray of. Defaults to the display's default screen.
    #[arg(long)]
    screen: Option<usize>,

    /// Width and height of every icon, in pixels
    #[arg(long, default_value_t = 24, value_parser = clap::value_parser!(u32).range(1..=65535))]
    icon_size: u32,

    /// Space between icons, in pixels
    #[arg(long, default_value_t = 9, value_parser = clap::value_parser!(u32).range(0..=65535))]
    spacing: u32,

    /// Space around the icons, in pixels
    #[arg(long, default_value_t = 0, value_parser = clap::value_parser!(u32).range(0..=65535))]
    padding: u32,

    /// Background color of the panel, as RRGGBBAA hex
    #[arg(long, default_value = "00000099", value_parser = parse_rgba)]
    background: u32,
}

impl From<RawOpt> for Opt {
    fn from(other: RawOpt) -> Self {
        let RawOpt { log_debug, screen, icon_size, spacing, padding, background } = other;
        Opt { log_debug, screen, layout: BoxLayout { icon_size, spacing, padding }, background }
    }
}

impl Opt {
    pub fn from_env() -> Self {
        RawOpt::parse().into()
    }
}

fn parse_rgba(s: &str) -> Result<u32, String> {
    let hex = s.strip_prefix('#').unwrap_or(s);
    if hex.len() != 8 {
        return Err(format!("Expected a color like 00000099 (RRGGBBAA), got '{}'", s));
    }
    u32::from_str_radix(hex, 16).map_err(|e| format!("Invalid color '{}': {}", s, e))
}
