// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Topic derivation.
//!
//! The entire routing protocol is one naming rule: a message of type `T`
//! travels on topic `"<namespace>.<T>"`. Both sides of an exchange must use
//! the same namespace prefix or messages will never be received; there is
//! no wildcard or content-based routing.

use crate::msg::{Message, MessageType};

/// Default topic namespace for the CMASI message set.
pub const DEFAULT_NAMESPACE: &str = "afrl.cmasi";

/// Derives publish/subscribe topics from message type identity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TopicRouter {
    namespace: String,
}

impl TopicRouter {
    pub fn new(namespace: impl Into<String>) -> Self {
        Self {
            namespace: namespace.into(),
        }
    }

    pub fn namespace(&self) -> &str {
        &self.namespace
    }

    /// Topic for a message instance. Pure function of the message's type:
    /// two messages of the same type always map to the same topic.
    pub fn topic_for(&self, msg: &dyn Message) -> String {
        format!("{}.{}", self.namespace, msg.type_name())
    }

    /// Topic for a message type, for subscribing before any instance exists.
    pub fn topic_for_type<T: MessageType>(&self) -> String {
        format!("{}.{}", self.namespace, T::TYPE_NAME)
    }
}

impl Default for TopicRouter {
    fn default() -> Self {
        Self::new(DEFAULT_NAMESPACE)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::cmasi::{AirVehicleState, MissionCommand};
    use crate::msg::MessageFactory;
    use std::collections::HashSet;

    #[test]
    fn topic_matches_naming_convention() {
        let router = TopicRouter::default();
        assert_eq!(
            router.topic_for(&MissionCommand::default()),
            "afrl.cmasi.MissionCommand"
        );
        assert_eq!(
            router.topic_for_type::<AirVehicleState>(),
            "afrl.cmasi.AirVehicleState"
        );
    }

    #[test]
    fn derivation_is_deterministic_and_injective() {
        let router = TopicRouter::default();
        let factory = MessageFactory::cmasi();

        let mut seen = HashSet::new();
        for name in factory.type_names() {
            let msg = factory.create(name).expect("registered");
            let first = router.topic_for(msg.as_ref());
            let second = router.topic_for(msg.as_ref());
            assert_eq!(first, second);
            assert!(seen.insert(first), "topic collision for {}", name);
        }
        assert_eq!(seen.len(), factory.len());
    }

    #[test]
    fn custom_namespace_prefixes_topics() {
        let router = TopicRouter::new("test.ns");
        assert_eq!(
            router.topic_for(&MissionCommand::default()),
            "test.ns.MissionCommand"
        );
    }
}
