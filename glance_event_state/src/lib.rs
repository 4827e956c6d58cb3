// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! Glance Event State: input state machines for gaze-driven selection.
//!
//! - [`dwell`]: turns a stream of resolved targets into at-most-once selections
//!   after attention rests on one target for a configured duration.
//! - [`arbiter`]: fuses a pointer stream and a gaze stream, giving the pointer
//!   authority while it moves and handing back to gaze after a quiet period.
//!
//! Every operation takes an explicit millisecond timestamp; nothing here reads a
//! clock or owns a timer. Each machine reports its next `deadline()` and expects
//! a `poll(now)` no later than that, which keeps them deterministic under test
//! and lets any event loop drive them.
//!
//! This crate is `no_std`.

#![no_std]

pub mod arbiter;
pub mod dwell;
