//! Headless replay of a scripted gesture.
//!
//! A script is a TOML file describing a static list and a sequence of steps:
//! raw touch events, convenience drags, animation frames and the public
//! controller operations. Every presenter and listener call is recorded with
//! the step and the clock time at which it happened.

use std::cell::RefCell;
use std::fmt::Write as _;
use std::path::Path;
use std::rc::Rc;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

use overscroll_core::{
    AppConfig, FooterPresenter, HeaderPresenter, LayoutSnapshot, ListHost, OverScrollController,
    PhysicsConfig, TouchEvent,
};

/// Frame interval of the simulated clock
const FRAME_MS: i64 = 16;

/// Frames after which a `frames` step gives up waiting for rest
const MAX_FRAMES: usize = 10_000;

#[derive(Debug, Clone, Deserialize)]
pub struct Script {
    /// Replaces the configured physics when present
    #[serde(default)]
    pub physics: Option<PhysicsConfig>,
    #[serde(default)]
    pub list: ListSetup,
    #[serde(default, rename = "step")]
    pub steps: Vec<Step>,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct ListSetup {
    pub position: ListPosition,
    /// Content items, header row not included
    pub items: usize,
    pub viewport: i32,
    /// Header rest height; 0 leaves the header unmeasured
    pub header_rest_height: i32,
    pub load_more: bool,
}

impl Default for ListSetup {
    fn default() -> Self {
        Self {
            position: ListPosition::Top,
            items: 50,
            viewport: 800,
            header_rest_height: 80,
            load_more: true,
        }
    }
}

/// Where the static list is scrolled to
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ListPosition {
    #[default]
    Top,
    Middle,
    Bottom,
    /// Content shorter than the viewport
    Short,
}

impl ListPosition {
    fn layout(self, items: usize, viewport: i32) -> LayoutSnapshot {
        let count = items + 1;
        let last = count.saturating_sub(1);
        match self {
            ListPosition::Top => LayoutSnapshot {
                item_count: count,
                first_visible: 0,
                last_visible: last.min(12),
                first_item_top: 0,
                last_item_bottom: viewport + 40,
                viewport_height: viewport,
            },
            ListPosition::Middle => {
                let first = (count / 3).max(1);
                LayoutSnapshot {
                    item_count: count,
                    first_visible: first,
                    last_visible: (first + 12).min(last.saturating_sub(1)),
                    first_item_top: -10,
                    last_item_bottom: viewport + 20,
                    viewport_height: viewport,
                }
            }
            ListPosition::Bottom => LayoutSnapshot {
                item_count: count,
                first_visible: last.saturating_sub(12).max(1),
                last_visible: last,
                first_item_top: -30,
                last_item_bottom: viewport,
                viewport_height: viewport,
            },
            ListPosition::Short => LayoutSnapshot {
                item_count: count,
                first_visible: 0,
                last_visible: last,
                first_item_top: 0,
                last_item_bottom: viewport / 2,
                viewport_height: viewport,
            },
        }
    }
}

fn default_release() -> bool {
    true
}

#[derive(Debug, Clone, Deserialize)]
#[serde(tag = "action", rename_all = "snake_case")]
pub enum Step {
    Down { y: f32, at: i64 },
    Move { y: f32, at: i64 },
    Up { y: f32, at: i64 },
    Cancel { y: f32, at: i64 },
    /// A press at `from`, then `moves` moves of `by` pixels one frame apart
    Drag {
        from: f32,
        by: f32,
        moves: u32,
        at: i64,
        #[serde(default = "default_release")]
        release: bool,
    },
    /// Run animation frames until the controller is at rest or `until` is reached
    Frames { until: Option<i64> },
    /// Scroll the static list somewhere else
    Position { position: ListPosition },
    FlingReachedEdge { at: i64 },
    FinishRefreshing,
    FinishRefreshingWithoutAnimation,
    FinishLoadingMore {
        #[serde(default)]
        no_more_data: bool,
    },
    ResetFooter,
    EnableLoadMore { enable: bool },
    Refresh { context: Option<String> },
    LoadMore,
    TapFooter,
    MeasureHeader { height: i32 },
}

/// One presenter or listener call
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct Observation {
    pub step: usize,
    pub at: i64,
    pub event: String,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FinalState {
    pub time_ms: i64,
    pub offset: i32,
    pub header_height: i32,
    pub footer_visible: bool,
    pub refreshing: bool,
    pub loading_more: bool,
    pub load_more_enabled: bool,
}

#[derive(Debug, Clone, Serialize)]
pub struct Report {
    pub events: Vec<Observation>,
    #[serde(rename = "final")]
    pub final_state: FinalState,
}

impl Report {
    pub fn contains(&self, event: &str) -> bool {
        self.events.iter().any(|o| o.event == event)
    }

    pub fn position(&self, event: &str) -> Option<usize> {
        self.events.iter().position(|o| o.event == event)
    }

    fn to_text(&self) -> String {
        let mut out = String::new();
        for o in &self.events {
            let _ = writeln!(out, "{:>7}ms  #{:<3} {}", o.at, o.step, o.event);
        }
        let f = &self.final_state;
        let _ = writeln!(
            out,
            "\nat {}ms: offset {}, header {}, footer {}, refreshing {}, loading more {}, load more {}",
            f.time_ms,
            f.offset,
            f.header_height,
            if f.footer_visible { "shown" } else { "hidden" },
            f.refreshing,
            f.loading_more,
            if f.load_more_enabled { "enabled" } else { "disabled" },
        );
        out
    }
}

type Log = Rc<RefCell<Vec<String>>>;

/// Static list that keeps whatever the controller applies
struct ScriptHost {
    layout: LayoutSnapshot,
    offset: i32,
    header_height: i32,
    footer_visible: bool,
}

impl ListHost for ScriptHost {
    fn layout(&self) -> LayoutSnapshot {
        self.layout
    }

    fn apply_offset(&mut self, offset: i32) -> overscroll_core::Result<()> {
        self.offset = offset;
        Ok(())
    }

    fn apply_header_height(&mut self, height: i32) -> overscroll_core::Result<()> {
        self.header_height = height;
        Ok(())
    }

    fn apply_footer_visibility(&mut self, visible: bool) -> overscroll_core::Result<()> {
        self.footer_visible = visible;
        Ok(())
    }
}

struct HeaderLog(Log);

impl HeaderLog {
    fn push(&self, event: String) {
        self.0.borrow_mut().push(format!("header {}", event));
    }
}

impl HeaderPresenter for HeaderLog {
    fn on_start_pulling(&mut self) {
        self.push("start_pulling".into());
    }
    fn on_pull(&mut self, distance: i32) {
        self.push(format!("pull {}", distance));
    }
    fn on_reach_above_rest_height(&mut self) {
        self.push("reach_above_rest_height".into());
    }
    fn on_reach_below_rest_height(&mut self) {
        self.push("reach_below_rest_height".into());
    }
    fn on_start_refreshing(&mut self) {
        self.push("start_refreshing".into());
    }
    fn on_end_refreshing(&mut self) {
        self.push("end_refreshing".into());
    }
}

struct FooterLog(Log);

impl FooterLog {
    fn push(&self, event: String) {
        self.0.borrow_mut().push(format!("footer {}", event));
    }
}

impl FooterPresenter for FooterLog {
    fn on_reset(&mut self) {
        self.push("reset".into());
    }
    fn on_start_pulling(&mut self) {
        self.push("start_pulling".into());
    }
    fn on_reach_above_threshold(&mut self) {
        self.push("reach_above_threshold".into());
    }
    fn on_reach_below_threshold(&mut self) {
        self.push("reach_below_threshold".into());
    }
    fn on_start_loading_more(&mut self) {
        self.push("start_loading_more".into());
    }
    fn on_end_loading_more(&mut self, no_more_data: bool) {
        self.push(format!("end_loading_more no_more_data={}", no_more_data));
    }
    fn on_cancel_pulling(&mut self) {
        self.push("cancel_pulling".into());
    }
}

struct Simulation {
    controller: OverScrollController<ScriptHost, String>,
    log: Log,
    events: Vec<Observation>,
    setup: ListSetup,
    now: i64,
}

impl Simulation {
    fn new(setup: ListSetup, physics: PhysicsConfig) -> Result<Self> {
        let host = ScriptHost {
            layout: setup.position.layout(setup.items, setup.viewport),
            offset: 0,
            header_height: 0,
            footer_visible: false,
        };
        let log: Log = Rc::default();
        let mut controller = OverScrollController::new(host, physics);

        let on_refresh = log.clone();
        let on_end = log.clone();
        controller.set_on_refresh_listener(
            move |context: Option<String>, _| {
                on_refresh.borrow_mut().push(match context {
                    Some(context) => format!("listener refresh {}", context),
                    None => "listener refresh".to_string(),
                })
            },
            move |_| {
                on_end
                    .borrow_mut()
                    .push("listener refresh_animation_end".to_string())
            },
        );
        let on_load_more = log.clone();
        controller.set_on_load_more_listener(move |_| {
            on_load_more
                .borrow_mut()
                .push("listener load_more".to_string())
        });

        controller.attach_header(Box::new(HeaderLog(log.clone())))?;
        if setup.header_rest_height > 0 {
            controller.set_header_rest_height(setup.header_rest_height)?;
        }
        controller.attach_footer(Box::new(FooterLog(log.clone())));
        controller.enable_load_more(setup.load_more);

        let mut simulation = Self {
            controller,
            log,
            events: Vec::new(),
            setup,
            now: 0,
        };
        simulation.collect(0);
        Ok(simulation)
    }

    fn collect(&mut self, step: usize) {
        let at = self.now;
        self.events.extend(
            self.log
                .borrow_mut()
                .drain(..)
                .map(|event| Observation { step, at, event }),
        );
    }

    fn touch(&mut self, event: TouchEvent, step: usize) {
        self.now = event.sample.timestamp_ms;
        self.controller.on_touch(event);
        self.collect(step);
    }

    fn frames(&mut self, until: Option<i64>, step: usize) {
        for _ in 0..MAX_FRAMES {
            if until.is_some_and(|t| self.now >= t) {
                return;
            }
            self.now += FRAME_MS;
            let animating = self.controller.on_frame(self.now);
            self.collect(step);
            if !animating && until.is_none() {
                return;
            }
        }
        tracing::warn!("Animation still running after {} frames", MAX_FRAMES);
    }

    fn run(&mut self, step_index: usize, step: &Step) -> Result<()> {
        let step_no = step_index + 1;
        match *step {
            Step::Down { y, at } => self.touch(TouchEvent::down(y, at), step_no),
            Step::Move { y, at } => self.touch(TouchEvent::moved(y, at), step_no),
            Step::Up { y, at } => self.touch(TouchEvent::up(y, at), step_no),
            Step::Cancel { y, at } => self.touch(TouchEvent::cancel(y, at), step_no),
            Step::Drag {
                from,
                by,
                moves,
                at,
                release,
            } => {
                self.touch(TouchEvent::down(from, at), step_no);
                let mut y = from;
                let mut t = at;
                for _ in 0..moves {
                    y += by;
                    t += FRAME_MS;
                    self.touch(TouchEvent::moved(y, t), step_no);
                }
                if release {
                    self.touch(TouchEvent::up(y, t + FRAME_MS), step_no);
                }
            }
            Step::Frames { until } => self.frames(until, step_no),
            Step::Position { position } => {
                self.controller.host_mut().layout =
                    position.layout(self.setup.items, self.setup.viewport);
            }
            Step::FlingReachedEdge { at } => {
                self.now = at;
                self.controller.on_fling_reached_edge(at);
            }
            Step::FinishRefreshing => self.controller.finish_refreshing(),
            Step::FinishRefreshingWithoutAnimation => {
                self.controller.finish_refreshing_without_animation()
            }
            Step::FinishLoadingMore { no_more_data } => {
                self.controller.finish_loading_more(no_more_data)
            }
            Step::ResetFooter => self.controller.reset_load_more_footer_view(),
            Step::EnableLoadMore { enable } => self.controller.enable_load_more(enable),
            Step::Refresh { ref context } => {
                self.controller.start_refresh_manually(context.clone())
            }
            Step::LoadMore => self.controller.start_loading_more_manually(),
            Step::TapFooter => self.controller.on_footer_tap(),
            Step::MeasureHeader { height } => {
                self.controller
                    .set_header_rest_height(height)
                    .with_context(|| format!("step {}", step_no))?;
            }
        }
        self.collect(step_no);
        Ok(())
    }

    fn finish(self) -> Report {
        let host = self.controller.host();
        let final_state = FinalState {
            time_ms: self.now,
            offset: host.offset,
            header_height: host.header_height,
            footer_visible: host.footer_visible,
            refreshing: self.controller.is_refreshing(),
            loading_more: self.controller.is_loading_more(),
            load_more_enabled: self.controller.is_loading_more_enabled(),
        };
        Report {
            events: self.events,
            final_state,
        }
    }
}

/// Replay a parsed script
pub fn simulate(script: &Script, physics: &PhysicsConfig) -> Result<Report> {
    let physics = script.physics.clone().unwrap_or_else(|| physics.clone());
    physics.validate()?;

    let mut simulation = Simulation::new(script.list.clone(), physics)?;
    for (index, step) in script.steps.iter().enumerate() {
        simulation.run(index, step)?;
    }
    Ok(simulation.finish())
}

pub fn run(config: &AppConfig, path: &Path, json: bool) -> Result<()> {
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("Failed to read script {}", path.display()))?;
    let script: Script = toml::from_str(&content)
        .with_context(|| format!("Failed to parse script {}", path.display()))?;
    tracing::debug!("Replaying {} steps", script.steps.len());

    let report = simulate(&script, &config.physics)?;
    if json {
        println!("{}", serde_json::to_string_pretty(&report)?);
    } else {
        print!("{}", report.to_text());
    }
    Ok(())
}
