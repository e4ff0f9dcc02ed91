// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! CMASI message set.
//!
//! The Common Mission Automation Services Interface types exchanged with
//! the vehicle: route commands, camera tasking, and the telemetry reports
//! that answer them. Topic names are derived from these type names, e.g.
//! `MissionCommand` publishes on `afrl.cmasi.MissionCommand`.

mod camera;
mod common;
mod vehicle;

pub use camera::{CameraAction, CameraConfiguration, CameraState};
pub use common::{AltitudeType, CommandStatusType, Location3D, Waypoint};
pub use vehicle::{AirVehicleState, GoToWaypointAction, MissionCommand};
