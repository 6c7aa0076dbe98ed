//! Frame consumers for the headless runner
//!
//! The simulation hands out `FrameSnapshot`s; everything here runs after a
//! tick has committed and never touches agent state.

use anyhow::Result;

use crate::simulation::{Axis, FrameSnapshot, Rgb, VehicleKind};

/// Frame units covered by one terminal column
const CELL_WIDTH: f32 = 20.0;
/// Frame units covered by one terminal row
const CELL_HEIGHT: f32 = 40.0;

/// Receives one snapshot per tick
pub trait FrameSink {
    fn emit(&mut self, frame: &FrameSnapshot) -> Result<()>;
}

fn glyph(kind: VehicleKind) -> char {
    match kind {
        VehicleKind::Car => 'C',
        VehicleKind::Motorcycle => 'M',
        VehicleKind::Auto => 'A',
        VehicleKind::Bus => 'B',
        VehicleKind::Truck => 'T',
        VehicleKind::Ambulance => 'E',
    }
}

/// Render a snapshot as a coarse character grid
pub fn ascii_map(frame: &FrameSnapshot) -> String {
    let cols = (frame.width / CELL_WIDTH).ceil().max(1.0) as usize;
    let rows = (frame.height / CELL_HEIGHT).ceil().max(1.0) as usize;
    let road = &frame.road;

    let mut grid = vec![vec![' '; cols]; rows];
    for (row, line) in grid.iter_mut().enumerate() {
        let cy = (row as f32 + 0.5) * CELL_HEIGHT;
        let on_horizontal = road.horizontal_top < cy && cy < road.horizontal_bottom;
        for (col, cell) in line.iter_mut().enumerate() {
            let cx = (col as f32 + 0.5) * CELL_WIDTH;
            let on_vertical = road.vertical_left < cx && cx < road.vertical_right;
            *cell = match (on_horizontal, on_vertical) {
                (true, true) => '+',
                (true, false) => '-',
                (false, true) => '|',
                (false, false) => ' ',
            };
        }
    }

    for rect in &frame.rects {
        let center = rect.rect.center();
        if center.x < 0.0 || center.y < 0.0 {
            continue;
        }
        let col = (center.x / CELL_WIDTH) as usize;
        let row = (center.y / CELL_HEIGHT) as usize;
        if row < rows && col < cols {
            grid[row][col] = glyph(rect.kind);
        }
    }

    let lamp = |axis: Axis| if frame.lamp(axis) == Rgb::GREEN { "GREEN" } else { "RED" };
    let mut out = format!(
        "tick {} | signal {} | H {} ({}) | V {} ({})\n",
        frame.tick,
        frame.phase.state,
        frame.counts.horizontal,
        lamp(Axis::Horizontal),
        frame.counts.vertical,
        lamp(Axis::Vertical),
    );
    for line in grid {
        out.extend(line);
        out.push('\n');
    }
    out
}

/// Prints the terminal map every `every` ticks
pub struct AsciiSink {
    every: u64,
}

impl AsciiSink {
    pub fn new(every: u64) -> Self {
        Self { every: every.max(1) }
    }
}

impl FrameSink for AsciiSink {
    fn emit(&mut self, frame: &FrameSnapshot) -> Result<()> {
        if frame.tick % self.every == 0 {
            println!("{}", ascii_map(frame));
        }
        Ok(())
    }
}

/// Keeps every snapshot in memory
#[derive(Default)]
pub struct FrameRecorder {
    pub frames: Vec<FrameSnapshot>,
}

impl FrameSink for FrameRecorder {
    fn emit(&mut self, frame: &FrameSnapshot) -> Result<()> {
        self.frames.push(frame.clone());
        Ok(())
    }
}
