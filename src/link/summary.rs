use std::{
    fmt,
    ops::{Add, AddAssign},
};

/// What a relay pass achieved.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RelaySummary {
    pub packets: usize,
    pub acks: usize,
    pub timeouts: usize,
    pub client_updates: usize,
    /// Messages the destination refused because they were already relayed
    pub rejected: usize,
}

impl RelaySummary {
    pub fn is_empty(&self) -> bool {
        *self == Self::default()
    }

    pub fn relayed(&self) -> usize {
        self.packets + self.acks + self.timeouts
    }
}

impl AddAssign for RelaySummary {
    fn add_assign(&mut self, other: Self) {
        self.packets += other.packets;
        self.acks += other.acks;
        self.timeouts += other.timeouts;
        self.client_updates += other.client_updates;
        self.rejected += other.rejected;
    }
}

impl Add for RelaySummary {
    type Output = Self;

    fn add(mut self, other: Self) -> Self {
        self += other;
        self
    }
}

impl fmt::Display for RelaySummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} packets, {} acks, {} timeouts, {} client updates, {} rejected",
            self.packets, self.acks, self.timeouts, self.client_updates, self.rejected
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn summaries_add_up() {
        let a = RelaySummary {
            packets: 2,
            client_updates: 1,
            ..Default::default()
        };
        let b = RelaySummary {
            acks: 3,
            rejected: 1,
            ..Default::default()
        };
        let total = a + b;
        assert_eq!(total.relayed(), 5);
        assert!(!total.is_empty());
        assert!(RelaySummary::default().is_empty());
        assert_eq!(
            total.to_string(),
            "2 packets, 3 acks, 0 timeouts, 1 client updates, 1 rejected"
        );
    }
}
