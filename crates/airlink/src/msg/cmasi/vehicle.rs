// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Vehicle commands and telemetry.

use super::common::{CommandStatusType, Location3D, Waypoint};
use crate::codec::{
    decode_object_as, decode_object_list_as, encode_object, encode_object_list, CodecResult,
    Cursor, CursorMut,
};
use crate::msg::{impl_message_identity, MessageFactory};

/// Full route command for one vehicle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct MissionCommand {
    pub command_id: i64,
    pub vehicle_id: i64,
    pub status: CommandStatusType,
    pub waypoint_list: Vec<Waypoint>,
    /// Number of the waypoint to fly to first.
    pub first_waypoint: i64,
}

impl MissionCommand {
    fn encode(&self, cur: &mut CursorMut<'_>) -> CodecResult<()> {
        cur.write_i64_le(self.command_id)?;
        cur.write_i64_le(self.vehicle_id)?;
        cur.write_i32_le(self.status.to_wire())?;
        encode_object_list(cur, &self.waypoint_list)?;
        cur.write_i64_le(self.first_waypoint)
    }

    fn decode(&mut self, cur: &mut Cursor<'_>, factory: &MessageFactory) -> CodecResult<()> {
        self.command_id = cur.read_i64_le()?;
        self.vehicle_id = cur.read_i64_le()?;
        self.status = CommandStatusType::from_wire(cur.read_i32_le()?)?;
        self.waypoint_list = decode_object_list_as::<Waypoint>(cur, factory)?;
        self.first_waypoint = cur.read_i64_le()?;
        Ok(())
    }
}

impl_message_identity!(MissionCommand, "MissionCommand");

/// Redirect the vehicle to a waypoint of its current mission.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct GoToWaypointAction {
    pub waypoint_number: i64,
}

impl GoToWaypointAction {
    fn encode(&self, cur: &mut CursorMut<'_>) -> CodecResult<()> {
        cur.write_i64_le(self.waypoint_number)
    }

    fn decode(&mut self, cur: &mut Cursor<'_>, _factory: &MessageFactory) -> CodecResult<()> {
        self.waypoint_number = cur.read_i64_le()?;
        Ok(())
    }
}

impl_message_identity!(GoToWaypointAction, "GoToWaypointAction");

/// Periodic state report from the vehicle.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct AirVehicleState {
    pub id: i64,
    /// Vehicle clock, milliseconds since mission epoch.
    pub time: i64,
    /// True airspeed, m/s.
    pub airspeed: f32,
    pub groundspeed: f32,
    /// Heading, degrees clockwise from true north.
    pub heading: f32,
    /// Remaining energy as a percentage of capacity.
    pub energy_available: f32,
    pub current_waypoint: i64,
    pub location: Location3D,
}

impl AirVehicleState {
    fn encode(&self, cur: &mut CursorMut<'_>) -> CodecResult<()> {
        cur.write_i64_le(self.id)?;
        cur.write_i64_le(self.time)?;
        cur.write_f32_le(self.airspeed)?;
        cur.write_f32_le(self.groundspeed)?;
        cur.write_f32_le(self.heading)?;
        cur.write_f32_le(self.energy_available)?;
        cur.write_i64_le(self.current_waypoint)?;
        encode_object(cur, &self.location)
    }

    fn decode(&mut self, cur: &mut Cursor<'_>, factory: &MessageFactory) -> CodecResult<()> {
        self.id = cur.read_i64_le()?;
        self.time = cur.read_i64_le()?;
        self.airspeed = cur.read_f32_le()?;
        self.groundspeed = cur.read_f32_le()?;
        self.heading = cur.read_f32_le()?;
        self.energy_available = cur.read_f32_le()?;
        self.current_waypoint = cur.read_i64_le()?;
        self.location = decode_object_as::<Location3D>(cur, factory)?;
        Ok(())
    }
}

impl_message_identity!(AirVehicleState, "AirVehicleState");
