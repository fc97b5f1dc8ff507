//! Negotiation flavors.

use std::fmt;
use std::str::FromStr;

/// How a client claims its baseline and how "unchanged" is signalled.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash)]
pub enum ProtocolFlavor {
    /// `A-IM` / `If-None-Match` claims; `304` for unchanged, `226` for patches.
    #[default]
    Delta,
    /// `Get-Modified-Since` claims; an empty patch for unchanged.
    ModifiedSince,
}

impl ProtocolFlavor {
    /// Returns the short name used on the command line.
    pub fn as_str(&self) -> &'static str {
        match self {
            ProtocolFlavor::Delta => "delta",
            ProtocolFlavor::ModifiedSince => "since",
        }
    }
}

impl fmt::Display for ProtocolFlavor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ProtocolFlavor {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "delta" | "etag" => Ok(ProtocolFlavor::Delta),
            "since" | "modified-since" | "gms" => Ok(ProtocolFlavor::ModifiedSince),
            other => Err(format!("unknown protocol flavor: {}", other)),
        }
    }
}
