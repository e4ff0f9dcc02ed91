// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Simulated vehicle for `--loopback` runs.
//!
//! Answers each command with the telemetry the station script awaits, so
//! the full mission can be exercised without a broker or a vehicle.

use airlink::codec::MessageCodec;
use airlink::msg::cmasi::{
    AirVehicleState, CameraAction, CameraConfiguration, CameraState, GoToWaypointAction,
    MissionCommand,
};
use airlink::msg::{Message, MessageFactory};
use airlink::routing::TopicRouter;
use airlink::transport::{Direction, LoopbackBus, Transport};
use std::thread;
use std::time::Duration;

/// How long the vehicle waits for the next command before shutting down.
const COMMAND_TIMEOUT: Duration = Duration::from_secs(2);

/// Start the simulated vehicle on `bus`. It answers four commands (or goes
/// quiet after [`COMMAND_TIMEOUT`]) and then exits.
pub fn spawn_vehicle(
    bus: &LoopbackBus,
    router: &TopicRouter,
) -> Result<thread::JoinHandle<()>, airlink::Error> {
    let mut rx = bus.channel();
    rx.open(Direction::Read)?;
    rx.subscribe(&router.topic_for_type::<MissionCommand>())?;
    rx.subscribe(&router.topic_for_type::<GoToWaypointAction>())?;
    rx.subscribe(&router.topic_for_type::<CameraAction>())?;
    let mut tx = bus.channel();
    tx.open(Direction::Write)?;

    let router = router.clone();
    Ok(thread::spawn(move || {
        let factory = MessageFactory::cmasi();
        let codec = MessageCodec::new(&factory);
        let mut buf = Vec::new();
        let mut wire = Vec::new();
        let mut camera_actions = 0usize;
        let mut replies = 0usize;

        while replies < 4 {
            let received = match rx.receive(&mut buf, Some(COMMAND_TIMEOUT)) {
                Ok(received) => received,
                Err(e) => {
                    log::info!("[SIM] vehicle going quiet: {}", e);
                    return;
                }
            };
            log::info!("[SIM] vehicle received command on {}", received.topic);

            let command_type = received
                .topic
                .rsplit('.')
                .next()
                .unwrap_or_default()
                .to_string();
            let telemetry: Box<dyn Message> = match command_type.as_str() {
                "MissionCommand" | "GoToWaypointAction" => Box::new(AirVehicleState {
                    id: 400,
                    time: 1_000 * (replies as i64 + 1),
                    airspeed: 26.0,
                    groundspeed: 24.5,
                    heading: 270.0,
                    energy_available: 88.0,
                    current_waypoint: 1,
                    ..Default::default()
                }),
                "CameraAction" => {
                    camera_actions += 1;
                    if camera_actions == 1 {
                        Box::new(CameraConfiguration {
                            payload_id: 1,
                            min_horizontal_fov: 5.0,
                            max_horizontal_fov: 60.0,
                            video_stream_horizontal_resolution: 1920,
                            video_stream_vertical_resolution: 1080,
                        })
                    } else {
                        Box::new(CameraState {
                            payload_id: 1,
                            horizontal_field_of_view: 30.0,
                            ..Default::default()
                        })
                    }
                }
                other => {
                    log::warn!("[SIM] ignoring unexpected command type {}", other);
                    continue;
                }
            };

            if let Err(e) = codec
                .serialize(telemetry.as_ref(), &mut wire)
                .and_then(|n| tx.publish(&router.topic_for(telemetry.as_ref()), &wire[..n]))
            {
                log::warn!("[SIM] failed to answer {}: {}", command_type, e);
                continue;
            }
            replies += 1;
        }
        log::info!("[SIM] vehicle finished after {} replies", replies);
    }))
}
