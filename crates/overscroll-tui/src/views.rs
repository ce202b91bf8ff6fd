//! Text header and footer presenters.
//!
//! The views write into shared state cells that the widgets read when they
//! draw, the controller owns the presenter halves.

use std::cell::RefCell;
use std::rc::Rc;

use overscroll_core::{FooterPresenter, HeaderPresenter};

pub const PULL_TO_REFRESH: &str = "Pull To Refresh";
pub const RELEASE_TO_REFRESH: &str = "Release To Refresh";
pub const REFRESHING: &str = "Loading...";

pub const CLICK_TO_LOAD_MORE: &str = "Click to load more";
pub const PULL_TO_LOAD_MORE: &str = "Pull to load more";
pub const RELEASE_TO_LOAD_MORE: &str = "Release to load more";
pub const LOADING_MORE: &str = "Loading...";
pub const NO_MORE_DATA: &str = "No more data";

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct HeaderState {
    pub label: &'static str,
    /// Total pull distance in pixels
    pub pull_distance: i32,
    pub refreshing: bool,
    /// The arrow points up once a release would refresh
    pub armed: bool,
}

impl Default for HeaderState {
    fn default() -> Self {
        Self {
            label: PULL_TO_REFRESH,
            pull_distance: 0,
            refreshing: false,
            armed: false,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FooterState {
    pub label: &'static str,
    pub loading: bool,
    pub no_more_data: bool,
}

impl Default for FooterState {
    fn default() -> Self {
        Self {
            label: CLICK_TO_LOAD_MORE,
            loading: false,
            no_more_data: false,
        }
    }
}

pub type SharedHeader = Rc<RefCell<HeaderState>>;
pub type SharedFooter = Rc<RefCell<FooterState>>;

pub struct HeaderView {
    state: SharedHeader,
}

impl HeaderView {
    pub fn new(state: SharedHeader) -> Self {
        Self { state }
    }
}

impl HeaderPresenter for HeaderView {
    fn on_start_pulling(&mut self) {
        let mut state = self.state.borrow_mut();
        state.label = PULL_TO_REFRESH;
        state.armed = false;
    }

    fn on_pull(&mut self, distance: i32) {
        self.state.borrow_mut().pull_distance = distance;
    }

    fn on_reach_above_rest_height(&mut self) {
        let mut state = self.state.borrow_mut();
        state.label = RELEASE_TO_REFRESH;
        state.armed = true;
    }

    fn on_reach_below_rest_height(&mut self) {
        let mut state = self.state.borrow_mut();
        state.label = PULL_TO_REFRESH;
        state.armed = false;
    }

    fn on_start_refreshing(&mut self) {
        let mut state = self.state.borrow_mut();
        state.label = REFRESHING;
        state.refreshing = true;
        state.armed = false;
    }

    fn on_end_refreshing(&mut self) {
        *self.state.borrow_mut() = HeaderState::default();
    }
}

pub struct FooterView {
    state: SharedFooter,
}

impl FooterView {
    pub fn new(state: SharedFooter) -> Self {
        Self { state }
    }

    fn set_label(&self, label: &'static str) {
        self.state.borrow_mut().label = label;
    }
}

impl FooterPresenter for FooterView {
    fn on_reset(&mut self) {
        *self.state.borrow_mut() = FooterState::default();
    }

    fn on_start_pulling(&mut self) {
        self.set_label(PULL_TO_LOAD_MORE);
    }

    fn on_reach_above_threshold(&mut self) {
        self.set_label(RELEASE_TO_LOAD_MORE);
    }

    fn on_reach_below_threshold(&mut self) {
        self.set_label(PULL_TO_LOAD_MORE);
    }

    fn on_start_loading_more(&mut self) {
        let mut state = self.state.borrow_mut();
        state.label = LOADING_MORE;
        state.loading = true;
    }

    fn on_end_loading_more(&mut self, no_more_data: bool) {
        let mut state = self.state.borrow_mut();
        state.loading = false;
        state.no_more_data = no_more_data;
        state.label = if no_more_data {
            NO_MORE_DATA
        } else {
            CLICK_TO_LOAD_MORE
        };
    }

    fn on_cancel_pulling(&mut self) {
        self.set_label(CLICK_TO_LOAD_MORE);
    }
}
