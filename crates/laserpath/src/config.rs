use std::fmt;
use std::path::PathBuf;
use std::str::FromStr;

use lp_link::LinkFrame;
use lp_trace::PlanConfig;
use serde::{Deserialize, Serialize};

/// Per-frame processing parameters.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct FrameConfig {
    pub plan: PlanConfig,
    /// Mask pixels strictly above this value are foreground.
    pub mask_threshold: u8,
}

impl Default for FrameConfig {
    fn default() -> Self {
        Self {
            plan: PlanConfig::default(),
            mask_threshold: 127,
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    Png,
    Csv,
    Coe,
    Traj,
}

impl OutputFormat {
    pub const ALL: [Self; 4] = [Self::Png, Self::Csv, Self::Coe, Self::Traj];

    pub fn extension(self) -> &'static str {
        match self {
            Self::Png => "png",
            Self::Csv => "csv",
            Self::Coe => "coe",
            Self::Traj => "traj",
        }
    }
}

impl fmt::Display for OutputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for OutputFormat {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| s.trim().eq_ignore_ascii_case(f.extension()))
            .ok_or_else(|| format!("unknown output format {s:?} (expected png, csv, coe or traj)"))
    }
}

/// Where encoded frames are streamed.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "lowercase")]
pub enum Destination {
    Udp {
        addr: String,
    },
    /// Raw Ethernet II frames on a named network interface.
    Link {
        interface: String,
        #[serde(default)]
        frame: LinkFrame,
    },
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    pub formats: Vec<OutputFormat>,
    pub directory: PathBuf,
    pub destination: Option<Destination>,
    /// Packets per second; `None` sends back to back.
    pub rate_limit: Option<u32>,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            formats: Vec::new(),
            directory: PathBuf::from("output"),
            destination: None,
            rate_limit: None,
        }
    }
}

impl OutputConfig {
    pub fn wants(&self, format: OutputFormat) -> bool {
        self.formats.contains(&format)
    }
}

/// Everything a run needs, loadable from one JSON file.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub frame: FrameConfig,
    pub output: OutputConfig,
}
