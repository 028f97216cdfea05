// Strategy types and the strategy profile table
// Each strategy is one row: whether it attaches a priority tip, which
// endpoint receives the submission, whether confirmation is awaited and
// which pipeline events bound its timing window
//
// Numan Thabit 2025 Nov

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Submission strategy selected by the caller.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Strategy {
    Normal,
    Shio,
    Hopper,
}

impl Strategy {
    pub const ALL: [Strategy; 3] = [Strategy::Normal, Strategy::Shio, Strategy::Hopper];

    pub fn as_str(&self) -> &'static str {
        match self {
            Strategy::Normal => "normal",
            Strategy::Shio => "shio",
            Strategy::Hopper => "hopper",
        }
    }

    pub fn profile(&self) -> &'static StrategyProfile {
        match self {
            Strategy::Normal => &NORMAL,
            Strategy::Shio => &SHIO,
            Strategy::Hopper => &HOPPER,
        }
    }
}

impl fmt::Display for Strategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct UnknownStrategy(pub String);

impl fmt::Display for UnknownStrategy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "unknown strategy: {}", self.0)
    }
}

impl std::error::Error for UnknownStrategy {}

impl FromStr for Strategy {
    type Err = UnknownStrategy;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "normal" => Ok(Strategy::Normal),
            "shio" => Ok(Strategy::Shio),
            "hopper" => Ok(Strategy::Hopper),
            _ => Err(UnknownStrategy(s.to_string())),
        }
    }
}

/// Network endpoint a call is sent to.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndpointKind {
    /// Fast/priority endpoint that honours tips
    Fast,
    /// Standard fullnode
    Standard,
}

/// Pipeline events a timing window can open or close on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PipelineEvent {
    Signed,
    Submitted,
    Confirmed,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct TimingWindow {
    pub start: PipelineEvent,
    pub stop: PipelineEvent,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StrategyProfile {
    pub strategy: Strategy,
    pub attaches_tip: bool,
    pub submit_to: EndpointKind,
    /// Endpoint queried by digest after submission, if the strategy waits for it
    pub confirm_on: Option<EndpointKind>,
    pub window: TimingWindow,
}

static NORMAL: StrategyProfile = StrategyProfile {
    strategy: Strategy::Normal,
    attaches_tip: false,
    submit_to: EndpointKind::Standard,
    confirm_on: None,
    window: TimingWindow {
        start: PipelineEvent::Signed,
        stop: PipelineEvent::Submitted,
    },
};

static SHIO: StrategyProfile = StrategyProfile {
    strategy: Strategy::Shio,
    attaches_tip: true,
    submit_to: EndpointKind::Fast,
    confirm_on: None,
    window: TimingWindow {
        start: PipelineEvent::Signed,
        stop: PipelineEvent::Submitted,
    },
};

// Submission latency is excluded: the clock only covers confirmation.
static HOPPER: StrategyProfile = StrategyProfile {
    strategy: Strategy::Hopper,
    attaches_tip: true,
    submit_to: EndpointKind::Fast,
    confirm_on: Some(EndpointKind::Standard),
    window: TimingWindow {
        start: PipelineEvent::Submitted,
        stop: PipelineEvent::Confirmed,
    },
};
