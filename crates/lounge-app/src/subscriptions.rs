//! Subscription bookkeeping.

use lounge_proto::Channel;

/// Tracks live channel bindings so teardown unsubscribes exactly once per
/// subscribe.
#[derive(Debug, Default)]
pub struct SubscriptionSet {
    channels: Vec<Channel>,
}

impl SubscriptionSet {
    /// Empty set.
    pub fn new() -> Self {
        Self::default()
    }

    /// Record a successful subscribe.
    pub fn record(&mut self, channel: Channel) {
        if self.channels.contains(&channel) {
            tracing::warn!(channel = %channel, "channel already subscribed");
            return;
        }
        self.channels.push(channel);
    }

    /// Take every live binding, leaving the set empty. A second drain
    /// yields nothing, which is what makes teardown idempotent.
    pub fn drain(&mut self) -> Vec<Channel> {
        std::mem::take(&mut self.channels)
    }

    /// Whether any binding is live.
    pub fn is_empty(&self) -> bool {
        self.channels.is_empty()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn drain_empties_and_second_drain_is_empty() {
        let mut subs = SubscriptionSet::new();
        subs.record(Channel::LoungeQueue);
        subs.record(Channel::VisitorPrivate(31));

        assert_eq!(subs.drain().len(), 2);
        assert!(subs.drain().is_empty());
        assert!(subs.is_empty());
    }

    #[test]
    fn duplicate_records_are_dropped() {
        let mut subs = SubscriptionSet::new();
        subs.record(Channel::LoungeQueue);
        subs.record(Channel::LoungeQueue);

        assert_eq!(subs.drain().len(), 1);
    }
}
