// Copyright 2025 the Glance Authors
// SPDX-License-Identifier: Apache-2.0 OR MIT

//! A simulated AAC board driven by scripted gaze and mouse input.
//!
//! This example shows how to combine:
//! - `glance_targets` for the board layout and exact hit testing,
//! - `glance_tracker` for the capability lifecycle, tolerant resolution, and dwell selection,
//! - a host loop that sleeps until `next_deadline` between input events.
//!
//! Run:
//! - `RUST_LOG=glance_tracker=debug cargo run -p glance_demos --example aac_board`

use glance_targets::{HitTest, NodeFlags, TargetNode, TargetTree};
use glance_tracker::{
    AcquisitionTicket, ActivationError, Activator, CapabilityError, EyeTrackingController,
    GazeCapability, TrackingConfig,
};
use kurbo::{Point, Rect, Vec2};
use tracing::info;

const CONFIG: &str = "(
    enabled: true,
    dwell_time_ms: 1500,
    hit_tolerance: 40.0,
    pointer_inactivity_ms: 3000,
)";

/// Symbols on a 3x2 grid of 120 px cells with 20 px gutters.
const SYMBOLS: [&str; 6] = ["I", "want", "more", "drink", "play", "stop"];

/// Backend whose acquisition completes at a fixed simulated time.
#[derive(Debug, Default)]
struct SimulatedCamera {
    warming_up: Option<(AcquisitionTicket, u64)>,
}

impl GazeCapability for SimulatedCamera {
    fn begin_acquisition(&mut self, ticket: AcquisitionTicket) -> Result<(), CapabilityError> {
        info!(ticket = ticket.get(), "camera warming up");
        self.warming_up = Some((ticket, 300));
        Ok(())
    }

    fn pause(&mut self) -> Result<(), CapabilityError> {
        Ok(())
    }

    fn resume(&mut self) -> Result<(), CapabilityError> {
        Ok(())
    }

    fn end(&mut self) -> Result<(), CapabilityError> {
        self.warming_up = None;
        Ok(())
    }
}

/// The board: a target tree plus the sentence being built.
#[derive(Debug)]
struct Board {
    tree: TargetTree<&'static str>,
    sentence: Vec<&'static str>,
}

impl Board {
    fn new() -> Self {
        let mut tree = TargetTree::new();
        let root = tree.insert(
            None,
            TargetNode {
                bounds: Rect::new(0.0, 0.0, 440.0, 300.0),
                ..TargetNode::default()
            },
        );
        for (i, symbol) in SYMBOLS.into_iter().enumerate() {
            let (col, row) = (i % 3, i / 3);
            let origin = Point::new(20.0 + col as f64 * 140.0, 20.0 + row as f64 * 140.0);
            let cell = tree.insert(
                Some(root),
                TargetNode {
                    bounds: Rect::from_origin_size(origin, (120.0, 120.0)),
                    target: Some(symbol),
                    ..TargetNode::default()
                },
            );
            // The label inside each cell is pickable but untagged; hits walk up to the cell.
            tree.insert(
                Some(cell),
                TargetNode {
                    bounds: Rect::from_origin_size(origin + Vec2::new(10.0, 90.0), (100.0, 20.0)),
                    flags: NodeFlags::VISIBLE | NodeFlags::PICKABLE,
                    ..TargetNode::default()
                },
            );
        }
        Self {
            tree,
            sentence: Vec::new(),
        }
    }

    fn center_of(&self, symbol: &'static str) -> Point {
        self.tree
            .node_of(&symbol)
            .and_then(|id| self.tree.bounds(id))
            .map_or(Point::ZERO, |r| r.center())
    }
}

impl HitTest<&'static str> for Board {
    fn hit_test(&self, point: Point) -> Option<&'static str> {
        self.tree.hit_test(point)
    }
}

impl Activator<&'static str> for Board {
    fn activate(&mut self, target: &&'static str) -> Result<(), ActivationError> {
        if !self.tree.contains_target(target) {
            return Err(ActivationError::Detached);
        }
        if *target == "stop" {
            self.sentence.clear();
        } else {
            self.sentence.push(*target);
        }
        println!("board says: {}", self.sentence.join(" "));
        Ok(())
    }
}

#[derive(Clone, Copy, Debug)]
enum Input {
    Gaze(Point),
    Mouse(Point),
}

/// Gaze wanders near each symbol in turn, with a mouse nudge in the middle.
fn script(board: &Board) -> Vec<(u64, Input)> {
    let mut events = Vec::new();
    let mut now = 400;
    for (symbol, hold) in [("I", 1700), ("want", 600), ("more", 1800), ("drink", 1700)] {
        let center = board.center_of(symbol);
        for step in 0..hold / 33 {
            // Deterministic jitter, sometimes spilling into the gutter.
            let phase = (now + step * 33) as f64 / 90.0;
            let jitter = Vec2::new(phase.sin() * 70.0, (phase * 1.7).cos() * 30.0);
            events.push((now + step * 33, Input::Gaze(center + jitter)));
        }
        now += hold;
    }
    // The caregiver grabs the mouse and points at "play", then lets go.
    events.push((now, Input::Mouse(board.center_of("play"))));
    for step in 0..150 {
        events.push((now + 40 + step * 33, Input::Gaze(board.center_of("stop"))));
    }
    events
}

fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "glance_tracker=info".into()),
        )
        .init();

    let config = match TrackingConfig::from_ron(CONFIG) {
        Ok(config) => config,
        Err(err) => {
            eprintln!("bad config: {err}");
            return;
        }
    };
    let mut ui = Board::new();
    let events = script(&ui);
    let mut controller: EyeTrackingController<&str, _> =
        EyeTrackingController::new(SimulatedCamera::default(), config);

    for (at, input) in events {
        // Deliver the acquisition result once the warm-up has elapsed.
        let warming_up = controller.capability().warming_up;
        if let Some((ticket, ready_at)) = warming_up
            && ready_at <= at
        {
            controller.capability_mut().warming_up = None;
            controller.acquisition_finished(ticket, Ok(()));
        }
        // Run timers that fall before the next input.
        while let Some(deadline) = controller.next_deadline().filter(|&d| d <= at) {
            controller.tick(deadline, &mut ui);
        }
        match input {
            Input::Gaze(point) => controller.on_gaze_sample(point, at, &mut ui),
            Input::Mouse(point) => controller.on_pointer_move(point, at, &mut ui),
        };

        let feedback = controller.feedback();
        if at % 500 < 33 {
            info!(
                at,
                source = ?feedback.source,
                hovered = ?feedback.hovered,
                progress = feedback.progress,
                "feedback"
            );
        }
    }

    controller.terminate();
    println!("final sentence: {}", ui.sentence.join(" "));
}
