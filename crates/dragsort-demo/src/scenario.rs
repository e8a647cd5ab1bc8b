#![forbid(unsafe_code)]

use std::str::FromStr;
use std::time::Duration;

use clap::Args;
use dragsort_core::{PointerButton, PointerPosition};
use dragsort_runtime::{
    MemoryBackend, ReorderConfig, ReorderCoordinator, ReorderDispatch, ReorderEffect,
    ReorderTransition, SimpleItem, drive,
};
use futures::executor::block_on;

use crate::error::{DemoError, Result};
use crate::report::{FrameSample, FramesReport, ScenarioReport, StepReport};

const POINTER_ID: u32 = 1;
const FRAME_MS: u64 = 16;
const MAX_ITEMS: usize = 10_000;
const MAX_FRAMES: usize = 10_000;

/// Seeded entries for the company values manager.
pub const COMPANY_VALUES: [(&str, &str); 5] = [
    ("integrity", "Act with integrity"),
    ("customers", "Customers first"),
    ("ownership", "Own the outcome"),
    ("curiosity", "Stay curious"),
    ("craft", "Sweat the craft"),
];

/// `FROM:DELTA_PX`: press on the item at committed slot `FROM` and release
/// `DELTA_PX` pixels away (negative is up).
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DragSpec {
    pub from: usize,
    pub delta_px: f64,
}

impl FromStr for DragSpec {
    type Err = String;

    fn from_str(s: &str) -> std::result::Result<Self, Self::Err> {
        let (from, delta) = s
            .split_once(':')
            .ok_or_else(|| format!("expected FROM:DELTA_PX, got {s:?}"))?;
        let from = from
            .trim()
            .parse::<usize>()
            .map_err(|e| format!("invalid FROM {from:?}: {e}"))?;
        let delta_px = delta
            .trim()
            .parse::<f64>()
            .map_err(|e| format!("invalid DELTA_PX {delta:?}: {e}"))?;
        if !delta_px.is_finite() {
            return Err(format!("DELTA_PX must be finite, got {delta_px}"));
        }
        Ok(Self { from, delta_px })
    }
}

#[derive(Debug, Clone, Default, Args)]
pub struct ValuesArgs {
    /// Make the backend reject the first persist.
    #[arg(long = "fail-persist")]
    pub fail_persist: bool,
}

#[derive(Debug, Clone, Args)]
pub struct ListArgs {
    /// Number of items in the list.
    #[arg(long, default_value_t = 5)]
    pub items: usize,

    /// Drag to perform, as FROM:DELTA_PX.
    #[arg(long, allow_hyphen_values = true)]
    pub drag: DragSpec,

    /// Make the backend reject the persist.
    #[arg(long = "fail-persist")]
    pub fail_persist: bool,
}

#[derive(Debug, Clone, Args)]
pub struct FramesArgs {
    #[arg(long, default_value_t = 5)]
    pub items: usize,

    #[arg(long, allow_hyphen_values = true)]
    pub drag: DragSpec,

    /// Frames to sample after the release, 16ms apart.
    #[arg(long, default_value_t = 12)]
    pub frames: usize,
}

struct Session {
    coordinator: ReorderCoordinator<SimpleItem>,
    backend: MemoryBackend<SimpleItem>,
    steps: Vec<StepReport>,
    transitions: Vec<ReorderTransition>,
}

impl Session {
    fn new(config: &ReorderConfig, items: Vec<SimpleItem>) -> Self {
        Self {
            coordinator: ReorderCoordinator::new(*config, items.clone()),
            backend: MemoryBackend::new(items),
            steps: Vec::new(),
            transitions: Vec::new(),
        }
    }

    fn record(&mut self, dispatch: &ReorderDispatch) {
        if let Some(transition) = dispatch.transition() {
            self.transitions.push(*transition);
        }
    }

    fn item_height(&self) -> f64 {
        self.coordinator.config().item_height
    }

    /// Press, capture, move in four increments, release at the end.
    fn press_and_drag(&mut self, drag: DragSpec) -> Result<usize> {
        let Some(original_index) = self.coordinator.order().original_at(drag.from) else {
            return Err(DemoError::invalid(format!(
                "--drag slot {} is outside a list of {}",
                drag.from,
                self.coordinator.len()
            )));
        };
        let height = self.item_height();
        let origin = drag.from as f64 * height + height / 2.0;

        let down = self.coordinator.pointer_down(
            original_index,
            POINTER_ID,
            PointerButton::Primary,
            PointerPosition::new(0.0, origin),
        );
        if let Some(reason) = down.ignored_reason() {
            return Err(DemoError::exit(
                10,
                format!("pointer down was ignored: {reason:?}"),
            ));
        }
        self.record(&down);
        let capture = self.coordinator.capture_acquired(POINTER_ID);
        self.record(&capture);

        for step in 1..=4u32 {
            let y = origin + drag.delta_px * f64::from(step) / 4.0;
            let moved = self
                .coordinator
                .pointer_move(POINTER_ID, PointerPosition::new(0.0, y));
            self.record(&moved);
        }
        Ok(original_index)
    }

    fn release(&mut self, drag: DragSpec) -> ReorderDispatch {
        let height = self.item_height();
        let y = drag.from as f64 * height + height / 2.0 + drag.delta_px;
        let up = self.coordinator.pointer_up(
            POINTER_ID,
            PointerButton::Primary,
            PointerPosition::new(0.0, y),
        );
        self.record(&up);
        up
    }

    fn settle(&mut self, action: String, dispatch: ReorderDispatch) {
        self.steps.push(StepReport {
            action,
            optimistic: self.coordinator.ordered_ids(),
            committed: matches!(dispatch.effect(), Some(ReorderEffect::Committed { .. })),
        });
        let resolved = block_on(drive(&mut self.coordinator, &mut self.backend, dispatch.cmd));
        for dispatch in &resolved {
            self.record(dispatch);
        }
    }

    fn drag(&mut self, drag: DragSpec) -> Result<()> {
        let original_index = self.press_and_drag(drag)?;
        let up = self.release(drag);
        let id = self.coordinator.items()[original_index].id.clone();
        self.settle(format!("drag {id} {:+}px", drag.delta_px), up);
        Ok(())
    }

    fn nudge(&mut self, original_index: usize, delta: isize) {
        let dispatch = self.coordinator.move_by(original_index, delta);
        self.record(&dispatch);
        let id = self.coordinator.items()[original_index].id.clone();
        self.settle(format!("move {id} by {delta:+}"), dispatch);
    }

    fn into_report(self, scenario: &str, before: Vec<String>) -> ScenarioReport {
        ScenarioReport {
            scenario: scenario.to_owned(),
            item_height: self.item_height(),
            before,
            steps: self.steps,
            final_order: self.coordinator.ordered_ids(),
            stored: self.backend.items().to_vec(),
            persist_calls: self.backend.persist_calls(),
            reload_calls: self.backend.reload_calls(),
            transitions: self.transitions,
        }
    }
}

#[must_use]
pub fn company_values() -> Vec<SimpleItem> {
    COMPANY_VALUES
        .iter()
        .enumerate()
        .map(|(position, (id, title))| SimpleItem::new(*id, position as i64, *title))
        .collect()
}

fn numbered_items(count: usize) -> Result<Vec<SimpleItem>> {
    if count == 0 || count > MAX_ITEMS {
        return Err(DemoError::invalid(format!(
            "--items must be between 1 and {MAX_ITEMS}, got {count}"
        )));
    }
    Ok((0..count)
        .map(|i| SimpleItem::new(format!("item-{}", i + 1), i as i64, format!("Item {}", i + 1)))
        .collect())
}

/// Company values manager: lift "ownership" two rows to the top, then
/// nudge "craft" up one place from the keyboard.
pub fn run_values(config: &ReorderConfig, args: &ValuesArgs) -> Result<ScenarioReport> {
    let items = company_values();
    let before: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
    let mut session = Session::new(config, items);
    if args.fail_persist {
        session.backend.fail_next_persist("values store rejected the order");
    }

    let rows = 2.0 * session.item_height();
    session.drag(DragSpec {
        from: 2,
        delta_px: -rows,
    })?;
    session.nudge(4, -1);

    Ok(session.into_report("values", before))
}

pub fn run_list(config: &ReorderConfig, args: &ListArgs) -> Result<ScenarioReport> {
    let items = numbered_items(args.items)?;
    let before: Vec<String> = items.iter().map(|item| item.id.clone()).collect();
    let mut session = Session::new(config, items);
    if args.fail_persist {
        session.backend.fail_next_persist("list store rejected the order");
    }
    session.drag(args.drag)?;
    Ok(session.into_report("list", before))
}

/// Sample render frames for one drag: the held pose, then `frames`
/// ticks after the release while the items glide into place.
pub fn run_frames(config: &ReorderConfig, args: &FramesArgs) -> Result<FramesReport> {
    if args.frames == 0 || args.frames > MAX_FRAMES {
        return Err(DemoError::invalid(format!(
            "--frames must be between 1 and {MAX_FRAMES}, got {}",
            args.frames
        )));
    }
    let items = numbered_items(args.items)?;
    let mut session = Session::new(config, items);

    session.press_and_drag(args.drag)?;
    session.coordinator.tick(Duration::from_millis(FRAME_MS));
    let mut frames = vec![FrameSample {
        frame: 0,
        elapsed_ms: 0,
        items: session.coordinator.frames(),
    }];

    let up = session.release(args.drag);
    session.settle("release".into(), up);
    for frame in 1..=args.frames {
        session.coordinator.tick(Duration::from_millis(FRAME_MS));
        frames.push(FrameSample {
            frame,
            elapsed_ms: frame as u64 * FRAME_MS,
            items: session.coordinator.frames(),
        });
    }

    Ok(FramesReport {
        scenario: "frames".into(),
        item_height: session.item_height(),
        drop_order: session.coordinator.ordered_ids(),
        frames,
        settled: session.coordinator.is_settled(),
    })
}
