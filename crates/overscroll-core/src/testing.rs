//! Recording doubles shared by the unit tests.

use std::cell::RefCell;
use std::rc::Rc;

use crate::config::PhysicsConfig;
use crate::controller::OverScrollController;
use crate::host::{LayoutSnapshot, ListHost};
use crate::presenter::{FooterEvent, FooterPresenter, HeaderEvent, HeaderPresenter};
use crate::{Error, Result};

pub const VIEWPORT: i32 = 800;
pub const REST: i32 = 80;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Entry {
    Header(HeaderEvent),
    Footer(FooterEvent),
    Refresh(Option<&'static str>),
    RefreshAnimationEnd,
    LoadMore,
}

#[derive(Debug, Clone, Default)]
pub struct Journal(Rc<RefCell<Vec<Entry>>>);

impl Journal {
    pub fn push(&self, entry: Entry) {
        self.0.borrow_mut().push(entry);
    }

    pub fn entries(&self) -> Vec<Entry> {
        self.0.borrow().clone()
    }

    pub fn count(&self, entry: &Entry) -> usize {
        self.0.borrow().iter().filter(|e| *e == entry).count()
    }

    pub fn position(&self, entry: &Entry) -> Option<usize> {
        self.0.borrow().iter().position(|e| e == entry)
    }

    pub fn clear(&self) {
        self.0.borrow_mut().clear();
    }
}

pub struct RecordingHeader(pub Journal);

impl HeaderPresenter for RecordingHeader {
    fn on_start_pulling(&mut self) {
        self.0.push(Entry::Header(HeaderEvent::StartPulling));
    }
    fn on_pull(&mut self, distance: i32) {
        self.0.push(Entry::Header(HeaderEvent::Pull(distance)));
    }
    fn on_reach_above_rest_height(&mut self) {
        self.0.push(Entry::Header(HeaderEvent::ReachAboveRestHeight));
    }
    fn on_reach_below_rest_height(&mut self) {
        self.0.push(Entry::Header(HeaderEvent::ReachBelowRestHeight));
    }
    fn on_start_refreshing(&mut self) {
        self.0.push(Entry::Header(HeaderEvent::StartRefreshing));
    }
    fn on_end_refreshing(&mut self) {
        self.0.push(Entry::Header(HeaderEvent::EndRefreshing));
    }
}

pub struct RecordingFooter(pub Journal);

impl FooterPresenter for RecordingFooter {
    fn on_reset(&mut self) {
        self.0.push(Entry::Footer(FooterEvent::Reset));
    }
    fn on_start_pulling(&mut self) {
        self.0.push(Entry::Footer(FooterEvent::StartPulling));
    }
    fn on_reach_above_threshold(&mut self) {
        self.0.push(Entry::Footer(FooterEvent::ReachAboveThreshold));
    }
    fn on_reach_below_threshold(&mut self) {
        self.0.push(Entry::Footer(FooterEvent::ReachBelowThreshold));
    }
    fn on_start_loading_more(&mut self) {
        self.0.push(Entry::Footer(FooterEvent::StartLoadingMore));
    }
    fn on_end_loading_more(&mut self, no_more_data: bool) {
        self.0.push(Entry::Footer(FooterEvent::EndLoadingMore { no_more_data }));
    }
    fn on_cancel_pulling(&mut self) {
        self.0.push(Entry::Footer(FooterEvent::CancelPulling));
    }
}

/// A host with a fixed layout that records what it is told
#[derive(Debug, Clone)]
pub struct FakeHost {
    pub layout: LayoutSnapshot,
    pub offset: i32,
    pub header_height: i32,
    pub footer_visible: bool,
    pub fail: bool,
}

impl FakeHost {
    fn with_layout(layout: LayoutSnapshot) -> Self {
        Self {
            layout,
            offset: 0,
            header_height: REST,
            footer_visible: false,
            fail: false,
        }
    }

    /// A long list scrolled to its first item
    pub fn at_top() -> Self {
        Self::with_layout(LayoutSnapshot {
            item_count: 50,
            first_visible: 0,
            last_visible: 12,
            first_item_top: 0,
            last_item_bottom: VIEWPORT + 40,
            viewport_height: VIEWPORT,
        })
    }

    /// A long list scrolled to its last item
    pub fn at_bottom() -> Self {
        Self::with_layout(LayoutSnapshot {
            item_count: 50,
            first_visible: 37,
            last_visible: 49,
            first_item_top: -30,
            last_item_bottom: VIEWPORT,
            viewport_height: VIEWPORT,
        })
    }

    /// A long list somewhere in the middle
    pub fn in_middle() -> Self {
        Self::with_layout(LayoutSnapshot {
            item_count: 50,
            first_visible: 20,
            last_visible: 32,
            first_item_top: -10,
            last_item_bottom: VIEWPORT + 20,
            viewport_height: VIEWPORT,
        })
    }
}

impl ListHost for FakeHost {
    fn layout(&self) -> LayoutSnapshot {
        self.layout
    }

    fn apply_offset(&mut self, offset: i32) -> Result<()> {
        if self.fail {
            return Err(Error::Host("detached".into()));
        }
        self.offset = offset;
        Ok(())
    }

    fn apply_header_height(&mut self, height: i32) -> Result<()> {
        if self.fail {
            return Err(Error::Host("detached".into()));
        }
        self.header_height = height;
        Ok(())
    }

    fn apply_footer_visibility(&mut self, visible: bool) -> Result<()> {
        if self.fail {
            return Err(Error::Host("detached".into()));
        }
        self.footer_visible = visible;
        Ok(())
    }
}

pub type TestController = OverScrollController<FakeHost, &'static str>;

/// Controller with a measured header, an enabled footer and recording listeners
pub fn controller(host: FakeHost) -> (TestController, Journal) {
    let journal = Journal::default();
    let mut controller = bare_controller(host, &journal);
    controller
        .attach_header(Box::new(RecordingHeader(journal.clone())))
        .unwrap();
    controller.set_header_rest_height(REST).unwrap();
    controller.attach_footer(Box::new(RecordingFooter(journal.clone())));
    controller.enable_load_more(true);
    journal.clear();
    (controller, journal)
}

/// Controller with listeners only, nothing attached
pub fn bare_controller(host: FakeHost, journal: &Journal) -> TestController {
    let mut controller = OverScrollController::new(host, PhysicsConfig::default());

    let on_refresh = journal.clone();
    let on_end = journal.clone();
    controller.set_on_refresh_listener(
        move |context, _| on_refresh.push(Entry::Refresh(context)),
        move |_| on_end.push(Entry::RefreshAnimationEnd),
    );
    let on_load = journal.clone();
    controller.set_on_load_more_listener(move |_| on_load.push(Entry::LoadMore));
    controller
}

/// Tick the controller until it stops asking for frames
pub fn run_frames(controller: &mut TestController, start_ms: i64) -> i64 {
    let mut now = start_ms;
    for _ in 0..1_000 {
        now += 16;
        if !controller.on_frame(now) {
            return now;
        }
    }
    panic!("animation never settled");
}
