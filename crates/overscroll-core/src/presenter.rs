//! Capability sets for the header and footer views.
//!
//! Any type implementing the method set can act as a presenter; the
//! controller only ever talks to them through these traits.

/// Refresh header presenter
pub trait HeaderPresenter {
    fn on_start_pulling(&mut self);

    /// `distance` is the total pull: header height plus any extra over-scroll
    fn on_pull(&mut self, distance: i32);

    fn on_reach_above_rest_height(&mut self);
    fn on_reach_below_rest_height(&mut self);

    fn on_start_refreshing(&mut self);
    fn on_end_refreshing(&mut self);
}

/// Load-more footer presenter
pub trait FooterPresenter {
    fn on_reset(&mut self);
    fn on_start_pulling(&mut self);

    fn on_reach_above_threshold(&mut self);
    fn on_reach_below_threshold(&mut self);

    fn on_start_loading_more(&mut self);
    fn on_end_loading_more(&mut self, no_more_data: bool);

    fn on_cancel_pulling(&mut self);
}

/// A header notification, queued until the state transition has completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum HeaderEvent {
    StartPulling,
    Pull(i32),
    ReachAboveRestHeight,
    ReachBelowRestHeight,
    StartRefreshing,
    EndRefreshing,
}

impl HeaderEvent {
    pub fn dispatch(self, presenter: &mut dyn HeaderPresenter) {
        match self {
            HeaderEvent::StartPulling => presenter.on_start_pulling(),
            HeaderEvent::Pull(distance) => presenter.on_pull(distance),
            HeaderEvent::ReachAboveRestHeight => presenter.on_reach_above_rest_height(),
            HeaderEvent::ReachBelowRestHeight => presenter.on_reach_below_rest_height(),
            HeaderEvent::StartRefreshing => presenter.on_start_refreshing(),
            HeaderEvent::EndRefreshing => presenter.on_end_refreshing(),
        }
    }
}

/// A footer notification, queued until the state transition has completed
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum FooterEvent {
    Reset,
    StartPulling,
    ReachAboveThreshold,
    ReachBelowThreshold,
    StartLoadingMore,
    EndLoadingMore { no_more_data: bool },
    CancelPulling,
}

impl FooterEvent {
    pub fn dispatch(self, presenter: &mut dyn FooterPresenter) {
        match self {
            FooterEvent::Reset => presenter.on_reset(),
            FooterEvent::StartPulling => presenter.on_start_pulling(),
            FooterEvent::ReachAboveThreshold => presenter.on_reach_above_threshold(),
            FooterEvent::ReachBelowThreshold => presenter.on_reach_below_threshold(),
            FooterEvent::StartLoadingMore => presenter.on_start_loading_more(),
            FooterEvent::EndLoadingMore { no_more_data } => {
                presenter.on_end_loading_more(no_more_data)
            }
            FooterEvent::CancelPulling => presenter.on_cancel_pulling(),
        }
    }
}
