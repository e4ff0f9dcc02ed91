// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Message type registry.

use super::{Message, MessageType};
use std::collections::HashMap;

/// Process-wide registry mapping a message type name to a constructor for
/// that type.
///
/// Built once at startup and read-only afterward; the codec uses it to
/// instantiate the right concrete message when decoding nested objects.
pub struct MessageFactory {
    ctors: HashMap<&'static str, fn() -> Box<dyn Message>>,
}

fn construct<T: MessageType>() -> Box<dyn Message> {
    Box::new(T::default())
}

impl MessageFactory {
    /// Empty registry. Most callers want [`MessageFactory::cmasi`].
    pub fn new() -> Self {
        Self {
            ctors: HashMap::new(),
        }
    }

    /// Registry covering the whole CMASI message set.
    pub fn cmasi() -> Self {
        use super::cmasi::*;

        let mut factory = Self::new();
        factory.register::<Location3D>();
        factory.register::<Waypoint>();
        factory.register::<MissionCommand>();
        factory.register::<GoToWaypointAction>();
        factory.register::<AirVehicleState>();
        factory.register::<CameraAction>();
        factory.register::<CameraConfiguration>();
        factory.register::<CameraState>();
        factory
    }

    pub fn register<T: MessageType>(&mut self) {
        self.ctors.insert(T::TYPE_NAME, construct::<T>);
    }

    /// Instantiate a default message by type name, or `None` if unregistered.
    pub fn create(&self, type_name: &str) -> Option<Box<dyn Message>> {
        self.ctors.get(type_name).map(|ctor| ctor())
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.ctors.contains_key(type_name)
    }

    pub fn type_names(&self) -> impl Iterator<Item = &'static str> + '_ {
        self.ctors.keys().copied()
    }

    pub fn len(&self) -> usize {
        self.ctors.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ctors.is_empty()
    }
}

impl Default for MessageFactory {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::msg::cmasi::{AirVehicleState, MissionCommand};

    #[test]
    fn cmasi_registry_creates_by_name() {
        let factory = MessageFactory::cmasi();
        assert_eq!(factory.len(), 8);

        let msg = factory.create("MissionCommand").expect("registered type");
        assert_eq!(msg.type_name(), MissionCommand::TYPE_NAME);
        assert!(msg.as_any().is::<MissionCommand>());

        assert!(factory.create("NoSuchMessage").is_none());
    }

    #[test]
    fn register_is_idempotent_per_name() {
        let mut factory = MessageFactory::new();
        factory.register::<AirVehicleState>();
        factory.register::<AirVehicleState>();
        assert_eq!(factory.len(), 1);
        assert!(factory.contains("AirVehicleState"));
    }
}
