use ibc_proto::ibc::core::client::v1::Height as RawHeight;
use serde::{Deserialize, Serialize};
use std::fmt;

/// An IBC height. The derived ordering compares `revision_number` first and
/// `revision_height` second.
#[derive(
    Clone, Copy, Debug, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize,
)]
pub struct Height {
    pub revision_number: u64,
    pub revision_height: u64,
}

impl Height {
    pub const fn new(revision_number: u64, revision_height: u64) -> Self {
        Self {
            revision_number,
            revision_height,
        }
    }

    /// A zero revision height encodes "no timeout" on the wire.
    pub fn is_zero(&self) -> bool {
        self.revision_height == 0
    }

    pub fn increment(self) -> Self {
        Self::new(self.revision_number, self.revision_height.saturating_add(1))
    }

    pub fn with_revision_height(self, revision_height: u64) -> Self {
        Self::new(self.revision_number, revision_height)
    }

    /// Drops heights that mean "no timeout".
    pub fn into_timeout(self) -> Option<Self> {
        (!self.is_zero()).then_some(self)
    }
}

impl fmt::Display for Height {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}-{}", self.revision_number, self.revision_height)
    }
}

impl From<RawHeight> for Height {
    fn from(raw: RawHeight) -> Self {
        Self::new(raw.revision_number, raw.revision_height)
    }
}

impl From<Height> for RawHeight {
    fn from(height: Height) -> Self {
        RawHeight {
            revision_number: height.revision_number,
            revision_height: height.revision_height,
        }
    }
}

/// Canonical unsigned decimal: digits only, no sign and no leading zero unless the
/// value is exactly "0".
fn parse_canonical_u64(raw: &str) -> Option<u64> {
    if raw.is_empty() || !raw.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }
    if raw.len() > 1 && raw.starts_with('0') {
        return None;
    }
    raw.parse().ok()
}

/// Extracts the revision number from a chain id of the form `<name>-<revision>`.
/// Only the last hyphen-delimited group counts; anything non-canonical yields 0.
pub fn parse_revision_number(chain_id: &str) -> u64 {
    chain_id
        .rsplit_once('-')
        .and_then(|(_, suffix)| parse_canonical_u64(suffix))
        .unwrap_or(0)
}

/// Parses a `packet_timeout_height` attribute (`<revision>-<height>`). Empty input,
/// malformed input and zero heights are all treated as "no height timeout".
pub fn parse_height_attribute(raw: Option<&str>) -> Option<Height> {
    let (number, height) = raw?.split_once('-')?;
    let height = Height::new(parse_canonical_u64(number)?, parse_canonical_u64(height)?);
    height.into_timeout()
}
