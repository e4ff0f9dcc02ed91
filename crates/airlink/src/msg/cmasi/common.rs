// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Shared CMASI structures: locations, waypoints, status enums.

use crate::codec::{
    decode_object_as, encode_object, CodecError, CodecResult, Cursor, CursorMut,
};
use crate::msg::{impl_message_identity, MessageFactory};

/// Altitude reference for a [`Location3D`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum AltitudeType {
    /// Above ground level.
    AGL,
    /// Above mean sea level.
    #[default]
    MSL,
}

impl AltitudeType {
    pub(crate) fn to_wire(self) -> i32 {
        match self {
            AltitudeType::AGL => 0,
            AltitudeType::MSL => 1,
        }
    }

    pub(crate) fn from_wire(value: i32) -> CodecResult<Self> {
        match value {
            0 => Ok(AltitudeType::AGL),
            1 => Ok(AltitudeType::MSL),
            other => Err(CodecError::DecoderFailed {
                reason: format!("invalid AltitudeType discriminant {}", other),
            }),
        }
    }
}

/// Approval/progress state of a mission command.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum CommandStatusType {
    #[default]
    Pending,
    Approved,
    InProcess,
    Executed,
    Cancelled,
}

impl CommandStatusType {
    pub(crate) fn to_wire(self) -> i32 {
        match self {
            CommandStatusType::Pending => 0,
            CommandStatusType::Approved => 1,
            CommandStatusType::InProcess => 2,
            CommandStatusType::Executed => 3,
            CommandStatusType::Cancelled => 4,
        }
    }

    pub(crate) fn from_wire(value: i32) -> CodecResult<Self> {
        match value {
            0 => Ok(CommandStatusType::Pending),
            1 => Ok(CommandStatusType::Approved),
            2 => Ok(CommandStatusType::InProcess),
            3 => Ok(CommandStatusType::Executed),
            4 => Ok(CommandStatusType::Cancelled),
            other => Err(CodecError::DecoderFailed {
                reason: format!("invalid CommandStatusType discriminant {}", other),
            }),
        }
    }
}

/// A point in 3D space, WGS-84 degrees and meters.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Location3D {
    pub latitude: f64,
    pub longitude: f64,
    pub altitude: f32,
    pub altitude_type: AltitudeType,
}

impl Location3D {
    fn encode(&self, cur: &mut CursorMut<'_>) -> CodecResult<()> {
        cur.write_f64_le(self.latitude)?;
        cur.write_f64_le(self.longitude)?;
        cur.write_f32_le(self.altitude)?;
        cur.write_i32_le(self.altitude_type.to_wire())
    }

    fn decode(&mut self, cur: &mut Cursor<'_>, _factory: &MessageFactory) -> CodecResult<()> {
        self.latitude = cur.read_f64_le()?;
        self.longitude = cur.read_f64_le()?;
        self.altitude = cur.read_f32_le()?;
        self.altitude_type = AltitudeType::from_wire(cur.read_i32_le()?)?;
        Ok(())
    }
}

impl_message_identity!(Location3D, "Location3D");

/// One point along a mission route, with the speed profile to fly it.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Waypoint {
    pub location: Location3D,
    /// Waypoint number, unique within the owning command.
    pub number: i64,
    /// Number of the waypoint to fly to next (0 = end of route).
    pub next_waypoint: i64,
    /// Commanded airspeed, m/s.
    pub speed: f32,
    /// Commanded climb rate, m/s.
    pub climb_rate: f32,
}

impl Waypoint {
    fn encode(&self, cur: &mut CursorMut<'_>) -> CodecResult<()> {
        encode_object(cur, &self.location)?;
        cur.write_i64_le(self.number)?;
        cur.write_i64_le(self.next_waypoint)?;
        cur.write_f32_le(self.speed)?;
        cur.write_f32_le(self.climb_rate)
    }

    fn decode(&mut self, cur: &mut Cursor<'_>, factory: &MessageFactory) -> CodecResult<()> {
        self.location = decode_object_as::<Location3D>(cur, factory)?;
        self.number = cur.read_i64_le()?;
        self.next_waypoint = cur.read_i64_le()?;
        self.speed = cur.read_f32_le()?;
        self.climb_rate = cur.read_f32_le()?;
        Ok(())
    }
}

impl_message_identity!(Waypoint, "Waypoint");
