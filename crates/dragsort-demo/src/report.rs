#![forbid(unsafe_code)]

use std::fmt::Write as _;

use dragsort_core::ItemFrame;
use dragsort_runtime::{ReorderEffect, ReorderTransition, SimpleItem};
use serde::Serialize;

/// One user action inside a scenario.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct StepReport {
    pub action: String,
    /// Committed order right after the action, before persistence resolved.
    pub optimistic: Vec<String>,
    pub committed: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct ScenarioReport {
    pub scenario: String,
    pub item_height: f64,
    pub before: Vec<String>,
    pub steps: Vec<StepReport>,
    pub final_order: Vec<String>,
    /// Backend contents after the last step.
    pub stored: Vec<SimpleItem>,
    pub persist_calls: usize,
    pub reload_calls: usize,
    pub transitions: Vec<ReorderTransition>,
}

impl ScenarioReport {
    #[must_use]
    pub fn rolled_back(&self) -> bool {
        self.transitions
            .iter()
            .any(|transition| matches!(transition.effect, ReorderEffect::PersistRejected { .. }))
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FrameSample {
    pub frame: usize,
    pub elapsed_ms: u64,
    pub items: Vec<ItemFrame>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FramesReport {
    pub scenario: String,
    pub item_height: f64,
    pub drop_order: Vec<String>,
    /// Frame 0 is the held drag; the rest follow the release.
    pub frames: Vec<FrameSample>,
    pub settled: bool,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Report {
    Scenario(ScenarioReport),
    Frames(FramesReport),
}

impl Report {
    pub fn to_json(&self) -> serde_json::Result<String> {
        serde_json::to_string_pretty(self)
    }

    #[must_use]
    pub fn render_text(&self) -> String {
        match self {
            Self::Scenario(report) => render_scenario(report),
            Self::Frames(report) => render_frames(report),
        }
    }
}

fn render_scenario(report: &ScenarioReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "scenario: {}", report.scenario);
    let _ = writeln!(out, "before:   {}", report.before.join(", "));
    for step in &report.steps {
        let marker = if step.committed { "*" } else { "=" };
        let _ = writeln!(
            out,
            "  {marker} {:<28} {}",
            step.action,
            step.optimistic.join(", ")
        );
    }
    let _ = writeln!(out, "final:    {}", report.final_order.join(", "));
    if report.rolled_back() {
        let _ = writeln!(out, "persist rejected; order reloaded from backend");
    }
    let _ = writeln!(
        out,
        "backend:  {} persist call(s), {} reload call(s)",
        report.persist_calls, report.reload_calls
    );
    for item in &report.stored {
        let _ = writeln!(out, "  {:>3}. {} ({})", item.position + 1, item.title, item.id);
    }
    out
}

fn render_frames(report: &FramesReport) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "scenario: {}", report.scenario);
    let _ = writeln!(out, "dropped:  {}", report.drop_order.join(", "));
    for sample in &report.frames {
        let offsets: Vec<String> = sample
            .items
            .iter()
            .map(|frame| {
                let lift = if frame.stack_order > 0 { "^" } else { "" };
                format!("{:7.2}{lift}", frame.vertical_offset)
            })
            .collect();
        let _ = writeln!(
            out,
            "  #{:<3} {:>5}ms  {}",
            sample.frame,
            sample.elapsed_ms,
            offsets.join(" ")
        );
    }
    let _ = writeln!(out, "settled:  {}", report.settled);
    out
}
