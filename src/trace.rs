//! Pointer trace replay files
//!
//! A trace is a CSV file with a header row `t_ms,kind,id,x,y`:
//!
//! ```text
//! t_ms,kind,id,x,y
//! 0,mouse_down,,70,70
//! 16,mouse_move,,110,70
//! 500,resize,,280,280
//! 900,mouse_up,,110,70
//! ```
//!
//! `id` is the touch identifier and is left empty for mouse rows. `resize`
//! rows carry the new container width and height in `x` and `y`. `lost` rows
//! need no coordinates.

use std::path::Path;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::info;

use crate::geometry::Vec2;
use crate::pointer::{PointerInput, TouchPoint};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TraceKind {
    MouseDown,
    MouseMove,
    MouseUp,
    TouchStart,
    TouchMove,
    TouchEnd,
    TouchCancel,
    Resize,
    Lost,
}

/// Raw CSV row
#[derive(Debug, Clone, Deserialize)]
struct TraceRow {
    t_ms: u64,
    kind: TraceKind,
    id: Option<i64>,
    x: Option<f64>,
    y: Option<f64>,
}

#[derive(Debug, Clone, PartialEq)]
pub enum TraceAction {
    Input(PointerInput),
    /// New container size, kept centered on the old container
    Resize { width: f64, height: f64 },
}

/// One replay step, offset from the start of the trace
#[derive(Debug, Clone, PartialEq)]
pub struct TraceStep {
    pub at: Duration,
    pub action: TraceAction,
}

impl TraceRow {
    fn point(&self, line: usize) -> Result<Vec2> {
        match (self.x, self.y) {
            (Some(x), Some(y)) if x.is_finite() && y.is_finite() => Ok(Vec2::new(x, y)),
            _ => bail!("line {}: {:?} needs finite x and y", line, self.kind),
        }
    }

    fn touch(&self, line: usize) -> Result<Vec<TouchPoint>> {
        let Some(id) = self.id else {
            bail!("line {}: {:?} needs a touch id", line, self.kind);
        };
        let position = self.point(line)?;
        Ok(vec![TouchPoint { id, position }])
    }

    fn into_step(self, line: usize) -> Result<TraceStep> {
        let action = match self.kind {
            TraceKind::MouseDown => TraceAction::Input(PointerInput::MouseDown {
                position: self.point(line)?,
            }),
            TraceKind::MouseMove => TraceAction::Input(PointerInput::MouseMove {
                position: self.point(line)?,
                primary_down: None,
            }),
            TraceKind::MouseUp => TraceAction::Input(PointerInput::MouseUp {
                position: self.point(line)?,
            }),
            TraceKind::TouchStart => TraceAction::Input(PointerInput::TouchStart {
                changed: self.touch(line)?,
            }),
            TraceKind::TouchMove => TraceAction::Input(PointerInput::TouchMove {
                changed: self.touch(line)?,
                active: None,
            }),
            TraceKind::TouchEnd => TraceAction::Input(PointerInput::TouchEnd {
                changed: self.touch(line)?,
            }),
            TraceKind::TouchCancel => TraceAction::Input(PointerInput::TouchCancel {
                changed: self.touch(line)?,
            }),
            TraceKind::Lost => TraceAction::Input(PointerInput::Lost),
            TraceKind::Resize => {
                let size = self.point(line)?;
                if size.x <= 0.0 || size.y <= 0.0 {
                    bail!("line {}: resize needs a positive width and height", line);
                }
                TraceAction::Resize {
                    width: size.x,
                    height: size.y,
                }
            }
        };

        Ok(TraceStep {
            at: Duration::from_millis(self.t_ms),
            action,
        })
    }
}

/// Parse trace CSV content. Timestamps must not go backwards.
pub fn parse_trace(content: &str) -> Result<Vec<TraceStep>> {
    let mut reader = csv::ReaderBuilder::new()
        .trim(csv::Trim::All)
        .comment(Some(b'#'))
        .from_reader(content.as_bytes());

    let mut steps: Vec<TraceStep> = Vec::new();
    for (index, result) in reader.deserialize().enumerate() {
        // Header is line 1
        let line = index + 2;
        let row: TraceRow = result.with_context(|| format!("Failed to parse trace row {}", line))?;
        let step = row.into_step(line)?;

        if let Some(previous) = steps.last() {
            if step.at < previous.at {
                bail!(
                    "line {}: timestamp {}ms goes backwards (previous {}ms)",
                    line,
                    step.at.as_millis(),
                    previous.at.as_millis()
                );
            }
        }
        steps.push(step);
    }

    Ok(steps)
}

/// Read and parse a trace file
pub async fn load_trace(path: impl AsRef<Path>) -> Result<Vec<TraceStep>> {
    let path = path.as_ref();
    let content = tokio::fs::read_to_string(path)
        .await
        .with_context(|| format!("Failed to read trace file: {}", path.display()))?;

    let steps = parse_trace(&content).with_context(|| format!("Invalid trace file: {}", path.display()))?;
    info!("Loaded {} trace steps from {}", steps.len(), path.display());
    Ok(steps)
}
