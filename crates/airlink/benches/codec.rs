// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Codec round-trip benchmarks for representative mission messages.

use airlink::codec::MessageCodec;
use airlink::msg::cmasi::{AirVehicleState, Location3D, MissionCommand, Waypoint};
use airlink::msg::MessageFactory;
use criterion::{black_box, criterion_group, criterion_main, Criterion};

fn route_command(waypoints: usize) -> MissionCommand {
    MissionCommand {
        command_id: 1,
        vehicle_id: 400,
        waypoint_list: (0..waypoints)
            .map(|i| Waypoint {
                location: Location3D {
                    latitude: 35.0 + i as f64 * 0.001,
                    longitude: -120.5 - i as f64 * 0.001,
                    altitude: 450.0,
                    ..Default::default()
                },
                number: i as i64 + 1,
                next_waypoint: ((i + 2) % (waypoints + 1)) as i64,
                speed: 27.5,
                climb_rate: 0.5,
            })
            .collect(),
        first_waypoint: 1,
        ..Default::default()
    }
}

fn bench_serialize(c: &mut Criterion) {
    let factory = MessageFactory::cmasi();
    let codec = MessageCodec::new(&factory);
    let command = route_command(16);
    let mut buf = Vec::new();

    c.bench_function("serialize_mission_command_16wp", |b| {
        b.iter(|| {
            let n = codec
                .serialize(black_box(&command), &mut buf)
                .expect("serialize");
            black_box(n);
        })
    });
}

fn bench_deserialize(c: &mut Criterion) {
    let factory = MessageFactory::cmasi();
    let codec = MessageCodec::new(&factory);
    let command = route_command(16);
    let mut wire = Vec::new();
    codec.serialize(&command, &mut wire).expect("serialize");

    c.bench_function("deserialize_mission_command_16wp", |b| {
        b.iter(|| {
            let mut out = MissionCommand::default();
            codec
                .deserialize(black_box(&wire), &mut out)
                .expect("deserialize");
            black_box(out.waypoint_list.len());
        })
    });
}

fn bench_state_roundtrip(c: &mut Criterion) {
    let factory = MessageFactory::cmasi();
    let codec = MessageCodec::new(&factory);
    let state = AirVehicleState {
        id: 400,
        time: 123_456,
        airspeed: 26.0,
        groundspeed: 24.5,
        heading: 270.0,
        energy_available: 88.0,
        current_waypoint: 2,
        location: Location3D {
            latitude: 35.027,
            longitude: -120.581,
            altitude: 450.0,
            ..Default::default()
        },
    };
    let mut wire = Vec::new();

    c.bench_function("roundtrip_air_vehicle_state", |b| {
        b.iter(|| {
            codec.serialize(&state, &mut wire).expect("serialize");
            let mut out = AirVehicleState::default();
            codec.deserialize(&wire, &mut out).expect("deserialize");
            black_box(out.id);
        })
    });
}

criterion_group!(
    benches,
    bench_serialize,
    bench_deserialize,
    bench_state_roundtrip
);
criterion_main!(benches);
