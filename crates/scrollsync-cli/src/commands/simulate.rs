//! Headless restore cycle against a synthetic surface
//!
//! Useful for checking how a saved progress value maps onto a given
//! geometry without opening the reader.

use std::cell::RefCell;
use std::rc::Rc;

use anyhow::{bail, Result};
use clap::Args;

use scrollsync_core::{
    AppConfig, IndicatorGeometry, IndicatorStyle, ProgressRestorer, RestoreDecision,
    RestoreOutcome, ScrollRange, ScrollSurface, ScrollSync, UiQueue, View,
};

#[derive(Debug, Clone, Args)]
pub struct SimulateArgs {
    /// Total content height in logical units
    #[arg(long)]
    pub content_height: f64,
    /// Visible viewport height in logical units
    #[arg(long)]
    pub viewport_height: f64,
    /// Saved progress to restore, 0.0 to 1.0
    #[arg(long)]
    pub progress: f64,
    /// Top content inset
    #[arg(long, default_value_t = 0.0)]
    pub inset_top: f64,
    /// Bottom content inset
    #[arg(long, default_value_t = 0.0)]
    pub inset_bottom: f64,
    /// Offset the surface starts at before restoring
    #[arg(long, default_value_t = 0.0)]
    pub offset: f64,
}

#[derive(Debug)]
pub struct SimulationReport {
    pub decision: RestoreDecision,
    pub outcome: Option<RestoreOutcome>,
    pub range: ScrollRange,
    pub offset: f64,
    pub progress: Option<f64>,
    /// Every progress value the observer delivered, in order
    pub updates: Vec<f64>,
    pub indicator: IndicatorGeometry,
}

pub fn simulate(args: &SimulateArgs, config: &AppConfig) -> Result<SimulationReport> {
    for (name, value) in [
        ("content-height", args.content_height),
        ("viewport-height", args.viewport_height),
        ("progress", args.progress),
        ("inset-top", args.inset_top),
        ("inset-bottom", args.inset_bottom),
        ("offset", args.offset),
    ] {
        if !value.is_finite() {
            bail!("--{} must be a finite number", name);
        }
    }

    let queue = UiQueue::new();
    let window = View::new_window("window");
    let reader = View::new_scroll(
        "surface",
        ScrollSurface::new(args.content_height, args.viewport_height)
            .with_insets(args.inset_top, args.inset_bottom)
            .with_offset(args.offset),
    );
    let anchor = View::new_overlay("anchor");
    window.add_child(&reader);
    window.add_child(&anchor);

    let updates = Rc::new(RefCell::new(Vec::new()));
    let sink = Rc::clone(&updates);
    let restorer = ProgressRestorer::with_tolerance(queue.clone(), config.sync.restore_tolerance);
    let mut sync = ScrollSync::with_restorer(queue.clone(), restorer, move |progress| {
        sink.borrow_mut().push(progress);
    });
    sync.set_debug_logging(config.general.debug_logging);

    let decision = sync.on_render(&anchor, true, Some(args.progress));
    queue.run_until_idle(8);

    let Some(surface) = reader.surface() else {
        bail!("simulated view has no scroll surface");
    };
    let snapshot = surface.snapshot();
    let style = IndicatorStyle {
        min_track_height: config.ui.indicator.min_track_height,
        thumb_height: config.ui.indicator.thumb_height,
        ..Default::default()
    };
    let progress = sync.live_progress();
    let updates = updates.borrow().clone();

    Ok(SimulationReport {
        decision,
        outcome: sync.last_restore_outcome(),
        range: snapshot.range(),
        offset: snapshot.content_offset_y,
        progress,
        updates,
        indicator: IndicatorGeometry::compute(
            progress.unwrap_or(0.0),
            snapshot.viewport_height,
            &style,
        ),
    })
}

pub async fn run(config: &AppConfig, args: &SimulateArgs) -> Result<()> {
    let report = simulate(args, config)?;

    println!("Decision:   {:?}", report.decision);
    match report.outcome {
        Some(outcome) => println!("Outcome:    {:?}", outcome),
        None => println!("Outcome:    (no restore ran)"),
    }
    println!("Range:      {:.2} ..= {:.2}", report.range.min_y, report.range.max_y);
    println!("Offset:     {:.2}", report.offset);
    match report.progress {
        Some(progress) => println!("Progress:   {:.4}", progress),
        None => println!("Progress:   (not observed)"),
    }
    println!(
        "Indicator:  track {:.1}, thumb {:.1} at {:.1}",
        report.indicator.track_height, report.indicator.thumb_height, report.indicator.thumb_offset
    );
    println!("Updates:    {}", report.updates.len());

    Ok(())
}
