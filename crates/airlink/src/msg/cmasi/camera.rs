// SPDX-License-Identifier: Apache-2.0 OR MIT
// Copyright (c) 2025-2026 naskel.com

//! Camera payload tasking and state.

use super::common::Location3D;
use crate::codec::{decode_object_as, encode_object, CodecResult, Cursor, CursorMut};
use crate::msg::{impl_message_identity, MessageFactory};

/// Point the camera / set its field of view.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraAction {
    pub payload_id: i64,
    /// Requested horizontal field of view, degrees.
    pub horizontal_field_of_view: f32,
}

impl CameraAction {
    fn encode(&self, cur: &mut CursorMut<'_>) -> CodecResult<()> {
        cur.write_i64_le(self.payload_id)?;
        cur.write_f32_le(self.horizontal_field_of_view)
    }

    fn decode(&mut self, cur: &mut Cursor<'_>, _factory: &MessageFactory) -> CodecResult<()> {
        self.payload_id = cur.read_i64_le()?;
        self.horizontal_field_of_view = cur.read_f32_le()?;
        Ok(())
    }
}

impl_message_identity!(CameraAction, "CameraAction");

/// Static capabilities of a camera payload.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraConfiguration {
    pub payload_id: i64,
    pub min_horizontal_fov: f32,
    pub max_horizontal_fov: f32,
    pub video_stream_horizontal_resolution: u32,
    pub video_stream_vertical_resolution: u32,
}

impl CameraConfiguration {
    fn encode(&self, cur: &mut CursorMut<'_>) -> CodecResult<()> {
        cur.write_i64_le(self.payload_id)?;
        cur.write_f32_le(self.min_horizontal_fov)?;
        cur.write_f32_le(self.max_horizontal_fov)?;
        cur.write_u32_le(self.video_stream_horizontal_resolution)?;
        cur.write_u32_le(self.video_stream_vertical_resolution)
    }

    fn decode(&mut self, cur: &mut Cursor<'_>, _factory: &MessageFactory) -> CodecResult<()> {
        self.payload_id = cur.read_i64_le()?;
        self.min_horizontal_fov = cur.read_f32_le()?;
        self.max_horizontal_fov = cur.read_f32_le()?;
        self.video_stream_horizontal_resolution = cur.read_u32_le()?;
        self.video_stream_vertical_resolution = cur.read_u32_le()?;
        Ok(())
    }
}

impl_message_identity!(CameraConfiguration, "CameraConfiguration");

/// Current camera pose, including the ground point at frame center.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct CameraState {
    pub payload_id: i64,
    pub horizontal_field_of_view: f32,
    pub centerpoint: Location3D,
}

impl CameraState {
    fn encode(&self, cur: &mut CursorMut<'_>) -> CodecResult<()> {
        cur.write_i64_le(self.payload_id)?;
        cur.write_f32_le(self.horizontal_field_of_view)?;
        encode_object(cur, &self.centerpoint)
    }

    fn decode(&mut self, cur: &mut Cursor<'_>, factory: &MessageFactory) -> CodecResult<()> {
        self.payload_id = cur.read_i64_le()?;
        self.horizontal_field_of_view = cur.read_f32_le()?;
        self.centerpoint = decode_object_as::<Location3D>(cur, factory)?;
        Ok(())
    }
}

impl_message_identity!(CameraState, "CameraState");
