//! "Assistant is composing" flag of a chat instance.

use std::sync::atomic::{AtomicBool, Ordering};

use shopchat_types::event::ChatEvent;

use crate::event::bus::EventBus;

/// Bot typing flag, published to observers on every change.
pub struct TypingIndicator {
    bot: AtomicBool,
    events: EventBus,
}

impl TypingIndicator {
    pub fn new(events: EventBus) -> Self {
        Self {
            bot: AtomicBool::new(false),
            events,
        }
    }

    /// Set the bot typing flag and notify observers.
    pub fn set_typing(&self, bot: bool) {
        self.bot.store(bot, Ordering::SeqCst);
        self.events.publish(ChatEvent::TypingChanged { bot });
    }

    /// Whether the bot is currently composing a reply.
    pub fn is_typing(&self) -> bool {
        self.bot.load(Ordering::SeqCst)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_set_typing_publishes_each_change() {
        let bus = EventBus::new(8);
        let mut rx = bus.subscribe();
        let typing = TypingIndicator::new(bus);

        assert!(!typing.is_typing());
        typing.set_typing(true);
        assert!(typing.is_typing());
        typing.set_typing(false);
        assert!(!typing.is_typing());

        assert!(matches!(rx.try_recv().unwrap(), ChatEvent::TypingChanged { bot: true }));
        assert!(matches!(rx.try_recv().unwrap(), ChatEvent::TypingChanged { bot: false }));
    }
}
