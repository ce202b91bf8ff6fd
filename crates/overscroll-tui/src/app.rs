use std::cell::RefCell;
use std::rc::Rc;
use std::sync::Arc;
use std::time::Instant;

use anyhow::Result;
use crossterm::event::{MouseEvent, MouseEventKind};
use tracing::{debug, warn};

use overscroll_core::{AppConfig, OverScrollController, TouchAction, TouchDisposition};

use crate::event::LoadResult;
use crate::input::{touch_from_mouse, Action};
use crate::list::{demo_items, DemoList, ScreenRow};
use crate::theme::Theme;
use crate::views::{FooterView, HeaderView, SharedFooter, SharedHeader};

/// Spinner frames shown while a load is in flight
const SPINNER: [char; 4] = ['|', '/', '-', '\\'];

/// Fraction of the host fling velocity left after one second
const MOMENTUM_DECAY_PER_SECOND: f32 = 0.02;

/// The host fling stops below this speed, in px/s
const MOMENTUM_STOP_SPEED: f32 = 30.0;

/// Rows scrolled per wheel notch
const WHEEL_ROWS: i32 = 3;

/// Who asked for a refresh, passed through the controller as its context
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefreshSource {
    Startup,
    Keyboard,
}

/// Work requested by the controller's listeners
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Job {
    /// `None` when the header was pulled
    Refresh(Option<RefreshSource>),
    LoadMore,
    /// The header finished collapsing after a refresh
    RefreshSettled,
}

/// A simulated load to run in the background
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PendingLoad {
    pub delay_ms: u64,
    pub result: LoadResult,
}

/// The list's own fling after the controller handed a release back
#[derive(Debug, Clone, Copy)]
struct Momentum {
    /// px/s, positive moves the content down
    velocity: f32,
    last_ms: i64,
}

/// Application state
pub struct App {
    pub controller: OverScrollController<DemoList, RefreshSource>,
    pub header: SharedHeader,
    pub footer: SharedFooter,
    jobs: Rc<RefCell<Vec<Job>>>,
    pub config: Arc<AppConfig>,
    pub theme: Theme,
    pub status_message: Option<String>,
    pub should_quit: bool,
    /// First terminal row of the list area
    list_top: u16,
    list_rows: u16,
    header_measured: bool,
    /// Last pointer position of a drag the list scrolls itself, in pixels
    drag_y: Option<f32>,
    press_row: Option<u16>,
    momentum: Option<Momentum>,
    spinner_frame: usize,
    clock: Instant,
}

impl App {
    pub fn new(config: Arc<AppConfig>, theme: Theme) -> Result<Self> {
        let mut list = DemoList::new(config.demo.row_pixels);
        list.set_items(demo_items(0, config.demo.initial_items));

        let header = SharedHeader::default();
        let footer = SharedFooter::default();
        let jobs: Rc<RefCell<Vec<Job>>> = Rc::default();

        let mut controller = OverScrollController::new(list, config.physics.clone());
        controller.attach_header(Box::new(HeaderView::new(header.clone())))?;
        controller.attach_footer(Box::new(FooterView::new(footer.clone())));
        controller.enable_load_more(true);

        let on_refresh = jobs.clone();
        let on_settled = jobs.clone();
        controller.set_on_refresh_listener(
            move |source, _| on_refresh.borrow_mut().push(Job::Refresh(source)),
            move |_| on_settled.borrow_mut().push(Job::RefreshSettled),
        );
        let on_load_more = jobs.clone();
        controller.set_on_load_more_listener(move |_| on_load_more.borrow_mut().push(Job::LoadMore));

        Ok(Self {
            controller,
            header,
            footer,
            jobs,
            config,
            theme,
            status_message: None,
            should_quit: false,
            list_top: 0,
            list_rows: 0,
            header_measured: false,
            drag_y: None,
            press_row: None,
            momentum: None,
            spinner_frame: 0,
            clock: Instant::now(),
        })
    }

    /// Milliseconds since the app started
    pub fn now_ms(&self) -> i64 {
        self.clock.elapsed().as_millis() as i64
    }

    pub fn list(&self) -> &DemoList {
        self.controller.host()
    }

    pub fn list_rows(&self) -> u16 {
        self.list_rows
    }

    /// Refresh once the header can be shown
    pub fn refresh_on_startup(&mut self) {
        self.controller
            .start_refresh_manually(Some(RefreshSource::Startup));
    }

    /// Record the list area; the first call measures the header
    pub fn set_viewport(&mut self, top: u16, rows: u16) {
        self.list_top = top;
        if rows != self.list_rows {
            self.list_rows = rows;
            self.controller.host_mut().set_viewport_rows(rows);
        }
        if !self.header_measured {
            let height = self.config.demo.header_rows * self.config.demo.row_pixels;
            match self.controller.set_header_rest_height(height) {
                Ok(()) => self.header_measured = true,
                Err(e) => warn!("Header measurement rejected: {}", e),
            }
        }
    }

    /// Drain the work queued by the controller's listeners
    pub fn take_jobs(&mut self) -> Vec<Job> {
        std::mem::take(&mut *self.jobs.borrow_mut())
    }

    /// Turn a job into the load it stands for; `None` when there is nothing to fetch
    pub fn plan(&mut self, job: Job) -> Option<PendingLoad> {
        let demo = &self.config.demo;
        match job {
            Job::Refresh(source) => {
                debug!("Refresh requested by {:?}", source);
                Some(PendingLoad {
                    delay_ms: demo.refresh_delay_ms,
                    result: LoadResult::Refreshed {
                        items: demo_items(0, demo.initial_items),
                    },
                })
            }
            Job::LoadMore => {
                let len = self.list().items().len();
                let count = demo.page_size.min(demo.max_items.saturating_sub(len));
                Some(PendingLoad {
                    delay_ms: demo.load_delay_ms,
                    result: LoadResult::LoadedMore {
                        items: demo_items(len, count),
                        reached_end: len + count >= demo.max_items,
                    },
                })
            }
            Job::RefreshSettled => {
                self.status_message = Some(format!("{} items", self.list().items().len()));
                None
            }
        }
    }

    /// Hand a finished load back to the list and the controller
    pub fn apply_result(&mut self, result: LoadResult) {
        match result {
            LoadResult::Refreshed { items } => {
                let count = items.len();
                self.controller.host_mut().set_items(items);
                self.controller.finish_refreshing();
                self.controller.reset_load_more_footer_view();
                self.status_message = Some(format!("Refreshed {} items", count));
            }
            LoadResult::LoadedMore { items, reached_end } => {
                let count = items.len();
                self.controller.host_mut().extend(items);
                self.controller.finish_loading_more(reached_end);
                self.status_message = Some(if reached_end {
                    "No more data".to_string()
                } else {
                    format!("Loaded {} more items", count)
                });
            }
        }
    }

    pub fn handle_action(&mut self, action: Action) {
        let row_pixels = self.list().row_pixels();
        match action {
            Action::Quit => self.should_quit = true,
            Action::Refresh => self
                .controller
                .start_refresh_manually(Some(RefreshSource::Keyboard)),
            Action::LoadMore => self.controller.start_loading_more_manually(),
            Action::ToggleLoadMore => {
                let enable = !self.controller.is_loading_more_enabled();
                self.controller.enable_load_more(enable);
                self.status_message = Some(format!(
                    "Load more {}",
                    if enable { "enabled" } else { "disabled" }
                ));
            }
            Action::TapFooter => self.controller.on_footer_tap(),
            Action::ScrollUp => self.scroll_list(-row_pixels),
            Action::ScrollDown => self.scroll_list(row_pixels),
            Action::JumpToTop => {
                self.momentum = None;
                self.controller.host_mut().scroll_to_top();
            }
            Action::JumpToBottom => {
                self.momentum = None;
                self.controller.host_mut().scroll_to_bottom();
            }
            Action::None => {}
        }
    }

    fn scroll_list(&mut self, dy: i32) {
        self.momentum = None;
        self.controller.host_mut().scroll_by(dy);
    }

    pub fn handle_mouse(&mut self, mouse: MouseEvent, now_ms: i64) {
        let row_pixels = self.list().row_pixels();
        let wheel = match mouse.kind {
            MouseEventKind::ScrollDown => WHEEL_ROWS,
            MouseEventKind::ScrollUp => -WHEEL_ROWS,
            _ => 0,
        };
        if wheel != 0 {
            self.scroll_list(wheel * row_pixels);
            return;
        }
        let Some(touch) = touch_from_mouse(&mouse, self.list_top, row_pixels, now_ms) else {
            return;
        };

        let was_dragging = self.controller.is_dragging();
        let disposition = self.controller.on_touch(touch);
        let y = touch.sample.y;
        match touch.action {
            TouchAction::Down => {
                self.momentum = None;
                self.drag_y = Some(y);
                self.press_row = Some(mouse.row);
            }
            TouchAction::Move => {
                if let Some(last) = self.drag_y.replace(y) {
                    // moves inside the slop and the one crossing it stay put
                    if was_dragging && disposition == TouchDisposition::PassThrough {
                        self.controller.host_mut().scroll_by((last - y) as i32);
                    }
                }
            }
            TouchAction::Up | TouchAction::Cancel => {
                self.drag_y = None;
                if self.press_row.take() == Some(mouse.row) && self.is_footer_row(mouse.row) {
                    self.controller.on_footer_tap();
                } else if disposition == TouchDisposition::PassThrough {
                    let velocity = self.controller.release_velocity();
                    if velocity.abs() > MOMENTUM_STOP_SPEED {
                        self.momentum = Some(Momentum {
                            velocity,
                            last_ms: now_ms,
                        });
                    }
                }
            }
        }
    }

    fn is_footer_row(&self, row: u16) -> bool {
        let Some(index) = row.checked_sub(self.list_top) else {
            return false;
        };
        self.list()
            .screen_rows(self.list_rows)
            .get(index as usize)
            .is_some_and(|r| *r == ScreenRow::Footer)
    }

    /// Advance the list fling and the controller's animation
    pub fn on_tick(&mut self, now_ms: i64) {
        self.step_momentum(now_ms);
        self.controller.on_frame(now_ms);
        if self.controller.is_refreshing() || self.controller.is_loading_more() {
            self.spinner_frame = (self.spinner_frame + 1) % SPINNER.len();
        }
    }

    fn step_momentum(&mut self, now_ms: i64) {
        let Some(mut momentum) = self.momentum.take() else {
            return;
        };
        let dt = (now_ms - momentum.last_ms).max(0) as f32 / 1000.0;
        momentum.last_ms = now_ms;

        let dy = -(momentum.velocity * dt).round() as i32;
        let moved = self.controller.host_mut().scroll_by(dy);
        if moved != dy {
            debug!("List fling reached an edge");
            self.controller.on_fling_reached_edge(now_ms);
            return;
        }

        momentum.velocity *= MOMENTUM_DECAY_PER_SECOND.powf(dt);
        if momentum.velocity.abs() > MOMENTUM_STOP_SPEED {
            self.momentum = Some(momentum);
        }
    }

    /// True while the loop should poll at the animation frame rate
    pub fn needs_fast_update(&self) -> bool {
        self.controller.is_animating() || self.controller.is_touching() || self.momentum.is_some()
    }

    pub fn spinner(&self) -> char {
        SPINNER[self.spinner_frame]
    }
}
