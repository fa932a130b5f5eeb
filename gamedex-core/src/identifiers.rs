use std::{fmt, num::NonZeroU32, str::FromStr};

use serde::{Deserialize, Serialize};

/// Numeric identifier of an app in the Steam store.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(transparent)]
pub struct SteamAppId(NonZeroU32);

impl SteamAppId {
    /// Returns `None` for zero, which Steam never hands out.
    pub fn new(id: u32) -> Option<SteamAppId> {
        NonZeroU32::new(id).map(SteamAppId)
    }
    pub fn get(&self) -> u32 {
        self.0.get()
    }
}

impl fmt::Display for SteamAppId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.get())
    }
}

#[derive(Debug, thiserror::Error)]
#[error("not a valid steam app id: {:?}", _0)]
pub struct InvalidAppId(String);

impl FromStr for SteamAppId {
    type Err = InvalidAppId;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.trim()
            .parse::<u32>()
            .ok()
            .and_then(SteamAppId::new)
            .ok_or_else(|| InvalidAppId(s.to_owned()))
    }
}
