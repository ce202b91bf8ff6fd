//! Top-level over-scroll coordinator.
//!
//! [`OverScrollController`] owns the header and footer pull zones, the
//! gesture state machine and the spring-back animator, and drives a host list
//! through the [`ListHost`] seam. The host feeds it touch events, animation
//! frames and layout measurements; the controller answers with offsets,
//! header heights and presenter notifications.
//!
//! Every public operation completes its state transition before any presenter
//! or listener runs. Listeners receive a [`Requests`] queue instead of the
//! controller itself; whatever they queue is applied once the current batch of
//! notifications has been delivered.

use tracing::{debug, trace, warn};

use crate::config::PhysicsConfig;
use crate::edge::{at_bottom_edge, at_top_edge};
use crate::gesture::{route_drag, DragSurface, GestureStateMachine, GestureStep, TouchEvent};
use crate::host::{LayoutSnapshot, ListHost};
use crate::presenter::{FooterEvent, FooterPresenter, HeaderEvent, HeaderPresenter};
use crate::pull::{Damping, FooterZone, HeaderZone, PullEvent, PullPhase};
use crate::scroll::{AnimationKind, ScrollAnimator};
use crate::{Error, Result};

/// Upper bound on notify/apply rounds in one flush
const MAX_FLUSH_ROUNDS: usize = 64;

/// Whether the controller took a touch event or the host should handle it
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum TouchDisposition {
    Consumed,
    /// The host applies its default scrolling
    PassThrough,
}

/// An operation queued from inside a listener
#[derive(Debug, Clone, PartialEq)]
pub enum Request<C> {
    FinishRefreshing,
    FinishRefreshingWithoutAnimation,
    FinishLoadingMore { no_more_data: bool },
    ResetLoadMoreFooter,
    EnableLoadMore(bool),
    StartRefreshManually(Option<C>),
    StartLoadingMoreManually,
}

/// Deferred command queue handed to listeners
#[derive(Debug)]
pub struct Requests<C> {
    queue: Vec<Request<C>>,
}

impl<C> Default for Requests<C> {
    fn default() -> Self {
        Self { queue: Vec::new() }
    }
}

impl<C> Requests<C> {
    pub fn push(&mut self, request: Request<C>) {
        self.queue.push(request);
    }

    pub fn finish_refreshing(&mut self) {
        self.push(Request::FinishRefreshing);
    }

    pub fn finish_refreshing_without_animation(&mut self) {
        self.push(Request::FinishRefreshingWithoutAnimation);
    }

    pub fn finish_loading_more(&mut self, no_more_data: bool) {
        self.push(Request::FinishLoadingMore { no_more_data });
    }

    pub fn reset_load_more_footer_view(&mut self) {
        self.push(Request::ResetLoadMoreFooter);
    }

    pub fn enable_load_more(&mut self, enable: bool) {
        self.push(Request::EnableLoadMore(enable));
    }

    pub fn start_refresh_manually(&mut self, context: Option<C>) {
        self.push(Request::StartRefreshManually(context));
    }

    pub fn start_loading_more_manually(&mut self) {
        self.push(Request::StartLoadingMoreManually);
    }

    pub fn is_empty(&self) -> bool {
        self.queue.is_empty()
    }

    fn take(&mut self) -> Vec<Request<C>> {
        std::mem::take(&mut self.queue)
    }
}

/// A notification waiting for its transition to complete
enum Notice<C> {
    Header(HeaderEvent),
    Footer(FooterEvent),
    Refresh(Option<C>),
    RefreshAnimationEnd,
    LoadMore,
}

type RefreshListener<C> = Box<dyn FnMut(Option<C>, &mut Requests<C>)>;
type Listener<C> = Box<dyn FnMut(&mut Requests<C>)>;

struct Header {
    zone: HeaderZone,
    presenter: Box<dyn HeaderPresenter>,
}

struct Footer {
    presenter: Box<dyn FooterPresenter>,
    /// `Some` while load-more is enabled
    zone: Option<FooterZone>,
}

/// Over-scroll, pull-to-refresh and pull-to-load-more for one host list
///
/// `C` is the context type handed to the refresh listener by
/// [`start_refresh_manually`](Self::start_refresh_manually).
pub struct OverScrollController<H: ListHost, C = ()> {
    host: H,
    config: PhysicsConfig,
    damping: Damping,
    load_more_threshold: i32,

    gesture: GestureStateMachine,
    animator: ScrollAnimator,
    offset: i32,

    header: Option<Header>,
    footer: Option<Footer>,

    refreshing: bool,
    /// A finished refresh is springing back
    cancelling: bool,
    hide_header_on_settle: bool,
    loading_more: bool,
    /// Manual refresh waiting for the header to be measured
    deferred_refresh: Option<Option<C>>,

    /// Velocity of the last release the host took over
    release_velocity: f32,
    /// Running animation was not started by the user (fling, self-correction)
    passive_motion: bool,

    outbox: Vec<Notice<C>>,
    requests: Requests<C>,
    on_refresh: Option<RefreshListener<C>>,
    on_refresh_animation_end: Option<Listener<C>>,
    on_load_more: Option<Listener<C>>,
}

fn report(result: Result<()>, what: &str) {
    if let Err(e) = result {
        warn!("Host failed to apply {}: {}", what, e);
    }
}

impl<H: ListHost, C> OverScrollController<H, C> {
    pub fn new(host: H, config: PhysicsConfig) -> Self {
        Self {
            damping: Damping::new(config.damping),
            load_more_threshold: config.load_more_threshold_px(),
            gesture: GestureStateMachine::new(&config),
            animator: ScrollAnimator::from_config(&config),
            config,
            host,
            offset: 0,
            header: None,
            footer: None,
            refreshing: false,
            cancelling: false,
            hide_header_on_settle: false,
            loading_more: false,
            deferred_refresh: None,
            release_velocity: 0.0,
            passive_motion: false,
            outbox: Vec::new(),
            requests: Requests::default(),
            on_refresh: None,
            on_refresh_animation_end: None,
            on_load_more: None,
        }
    }

    pub fn host(&self) -> &H {
        &self.host
    }

    pub fn host_mut(&mut self) -> &mut H {
        &mut self.host
    }

    pub fn config(&self) -> &PhysicsConfig {
        &self.config
    }

    /// Current over-scroll offset; negative reveals the top
    #[inline]
    pub fn offset(&self) -> i32 {
        self.offset
    }

    #[inline]
    pub fn header_reveal_height(&self) -> i32 {
        self.header.as_ref().map_or(0, |h| h.zone.reveal_height())
    }

    #[inline]
    pub fn header_rest_height(&self) -> i32 {
        self.header.as_ref().map_or(0, |h| h.zone.rest_height())
    }

    pub fn header_phase(&self) -> Option<PullPhase> {
        self.header.as_ref().map(|h| h.zone.phase())
    }

    pub fn footer_reveal_height(&self) -> i32 {
        self.footer_zone().map_or(0, |z| z.reveal_height())
    }

    pub fn footer_phase(&self) -> Option<PullPhase> {
        self.footer_zone().map(|z| z.phase())
    }

    #[inline]
    pub fn is_refreshing(&self) -> bool {
        self.refreshing
    }

    #[inline]
    pub fn is_loading_more(&self) -> bool {
        self.loading_more
    }

    pub fn is_loading_more_enabled(&self) -> bool {
        self.footer_zone().is_some()
    }

    /// True while frames are needed
    pub fn is_animating(&self) -> bool {
        self.animator.is_animating()
    }

    pub fn is_touching(&self) -> bool {
        self.gesture.is_touching()
    }

    /// The current touch has moved past the slop
    pub fn is_dragging(&self) -> bool {
        self.gesture.is_dragging()
    }

    /// Velocity of the last release handed to the host, in px/s
    ///
    /// Positive means the finger moved down. Zero once the overshoot was
    /// consumed or a new touch began.
    pub fn release_velocity(&self) -> f32 {
        self.release_velocity
    }

    fn footer_zone(&self) -> Option<&FooterZone> {
        self.footer.as_ref().and_then(|f| f.zone.as_ref())
    }

    fn footer_zone_mut(&mut self) -> Option<&mut FooterZone> {
        self.footer.as_mut().and_then(|f| f.zone.as_mut())
    }

    // ---- attachment -------------------------------------------------------

    /// Attach the refresh header; only one header is allowed
    pub fn attach_header(&mut self, presenter: Box<dyn HeaderPresenter>) -> Result<()> {
        if self.header.is_some() {
            return Err(Error::InvalidArgument(
                "a refresh header is already attached".to_string(),
            ));
        }

        let mut zone = HeaderZone::new(0, 0);
        if self.deferred_refresh.is_some() {
            zone.set_phase(PullPhase::Activating);
        }
        self.header = Some(Header { zone, presenter });
        debug!("Refresh header attached");
        Ok(())
    }

    /// Report the header's natural height once the host has measured it
    ///
    /// The first measurement collapses the header, or starts a manual
    /// refresh that was requested before the header could show.
    pub fn set_header_rest_height(&mut self, height: i32) -> Result<()> {
        if height <= 0 {
            return Err(Error::InvalidArgument(format!(
                "header rest height must be positive, got {}",
                height
            )));
        }
        let Some(header) = self.header.as_mut() else {
            return Err(Error::InvalidArgument(
                "no refresh header attached".to_string(),
            ));
        };

        let first_measure = header.zone.rest_height() == 0;
        header.zone.set_rest_height(height);
        if !first_measure {
            trace!("Header re-measured at {}px", height);
            return Ok(());
        }
        debug!("Header measured at {}px", height);

        match self.deferred_refresh.take() {
            Some(context) => {
                header.zone.set_phase(PullPhase::Idle);
                self.start_refresh(context);
            }
            None => self.force_header_height(0),
        }
        self.flush();
        Ok(())
    }

    /// Attach the load-more footer
    ///
    /// The footer stays hidden until load-more is enabled. A later call
    /// replaces the presenter and disables load-more again.
    pub fn attach_footer(&mut self, presenter: Box<dyn FooterPresenter>) {
        self.footer = Some(Footer {
            presenter,
            zone: None,
        });
        report(self.host.apply_footer_visibility(false), "footer visibility");
        debug!("Load-more footer attached");
    }

    pub fn set_on_refresh_listener<F, G>(&mut self, on_refresh: F, on_refresh_animation_end: G)
    where
        F: FnMut(Option<C>, &mut Requests<C>) + 'static,
        G: FnMut(&mut Requests<C>) + 'static,
    {
        self.on_refresh = Some(Box::new(on_refresh));
        self.on_refresh_animation_end = Some(Box::new(on_refresh_animation_end));
    }

    pub fn set_on_load_more_listener<F>(&mut self, on_load_more: F)
    where
        F: FnMut(&mut Requests<C>) + 'static,
    {
        self.on_load_more = Some(Box::new(on_load_more));
    }

    // ---- public operations ------------------------------------------------

    /// End a refresh; the header springs back and collapses
    pub fn finish_refreshing(&mut self) {
        self.run(Request::FinishRefreshing);
    }

    /// End a refresh; the offset springs back and the header collapses at once when it settles
    pub fn finish_refreshing_without_animation(&mut self) {
        self.run(Request::FinishRefreshingWithoutAnimation);
    }

    pub fn finish_loading_more(&mut self, no_more_data: bool) {
        self.run(Request::FinishLoadingMore { no_more_data });
    }

    pub fn reset_load_more_footer_view(&mut self) {
        self.run(Request::ResetLoadMoreFooter);
    }

    pub fn enable_load_more(&mut self, enable: bool) {
        self.run(Request::EnableLoadMore(enable));
    }

    pub fn start_refresh_manually(&mut self, context: Option<C>) {
        self.run(Request::StartRefreshManually(context));
    }

    pub fn start_loading_more_manually(&mut self) {
        self.run(Request::StartLoadingMoreManually);
    }

    /// A tap or click on the footer
    pub fn on_footer_tap(&mut self) {
        if self.is_loading_more_enabled() && !self.loading_more {
            self.start_loading_more();
        } else {
            trace!("Footer tap ignored");
        }
        self.flush();
    }

    fn run(&mut self, request: Request<C>) {
        self.apply(request);
        self.flush();
    }

    fn apply(&mut self, request: Request<C>) {
        match request {
            Request::FinishRefreshing => self.finish_refresh(false),
            Request::FinishRefreshingWithoutAnimation => self.finish_refresh(true),
            Request::FinishLoadingMore { no_more_data } => self.finish_loading(no_more_data),
            Request::ResetLoadMoreFooter => self.reset_footer(),
            Request::EnableLoadMore(enable) => self.set_load_more_enabled(enable),
            Request::StartRefreshManually(context) => self.start_refresh(context),
            Request::StartLoadingMoreManually => {
                if !self.is_loading_more_enabled() {
                    self.set_load_more_enabled(true);
                }
                if !self.is_loading_more_enabled() {
                    debug!("No footer attached, manual load-more ignored");
                } else if self.loading_more {
                    trace!("Already loading more");
                } else {
                    self.start_loading_more();
                }
            }
        }
    }

    // ---- input ------------------------------------------------------------

    /// Feed one raw touch event
    pub fn on_touch(&mut self, event: TouchEvent) -> TouchDisposition {
        let disposition = match self.gesture.handle(event) {
            GestureStep::Pressed => {
                self.interrupt();
                self.rest_disposition()
            }
            GestureStep::Still => TouchDisposition::Consumed,
            GestureStep::Pending | GestureStep::DragStarted => self.rest_disposition(),
            GestureStep::Drag(delta) => {
                let damping = self.damping;
                route_drag(self, delta, damping);
                self.rest_disposition()
            }
            GestureStep::Released { velocity } => self.release(velocity, event.sample.timestamp_ms),
        };
        self.flush();
        disposition
    }

    /// Advance the running animation; returns true while more frames are needed
    pub fn on_frame(&mut self, now_ms: i64) -> bool {
        if let Some(frame) = self.animator.compute(now_ms) {
            match frame.kind {
                AnimationKind::Fling => self.set_offset(frame.offset),
                AnimationKind::SpringBack => {
                    let delta = frame.offset - self.virtual_offset();
                    if delta < 0 {
                        self.scroll_down(-delta);
                    } else if delta > 0 {
                        self.scroll_up(-delta);
                    }
                }
            }
            if frame.finished {
                trace!("{:?} animation finished at {}", frame.kind, frame.offset);
            }
            self.maybe_settle();
        }

        if self.animator.is_finished() {
            if self.needs_correction() {
                self.start_self_correction(now_ms);
            } else {
                self.passive_motion = false;
            }
        }

        self.flush();
        self.animator.is_animating()
    }

    /// The host's own fling hit an edge
    ///
    /// Uses the velocity of the last release the host took over. Returns true
    /// when an overshoot animation was started.
    pub fn on_fling_reached_edge(&mut self, now_ms: i64) -> bool {
        if self.animator.is_animating() || self.gesture.is_touching() {
            return false;
        }
        let velocity = std::mem::take(&mut self.release_velocity);
        if velocity.abs() <= self.config.min_fling_velocity_px() {
            return false;
        }

        let layout = self.host.layout();
        // finger moving down carries the content to its top
        let toward_top = velocity > 0.0;
        let at_edge = if toward_top {
            at_top_edge(&layout)
        } else {
            at_bottom_edge(&layout)
        };
        if !at_edge {
            return false;
        }

        let overshoot = self.fling_overshoot(velocity.abs(), layout.viewport_height);
        if overshoot == 0 {
            return false;
        }
        let target = if toward_top {
            self.offset - overshoot
        } else {
            self.offset + overshoot
        };

        debug!("Fling overshoot {}px at velocity {:.0}px/s", overshoot, velocity);
        self.passive_motion = true;
        self.animator
            .start(self.offset, target, now_ms, AnimationKind::Fling);
        true
    }

    /// Distance at which a decelerating curve starting at `speed` comes to rest
    fn fling_overshoot(&self, speed: f32, viewport_height: i32) -> i32 {
        let slope = self.animator.interpolator().initial_slope();
        if slope <= 0.0 {
            return 0;
        }
        let seconds = self.animator.duration_ms() as f64 / 1000.0;
        let distance = (speed as f64 * seconds / slope) as i32;
        let limit = (viewport_height as f32 * self.config.max_fling_overscroll_ratio) as i32;
        distance.clamp(0, limit.max(0))
    }

    // ---- gesture internals ------------------------------------------------

    /// Touch-down: stop animations and close a refresh cycle that is settling
    fn interrupt(&mut self) {
        self.animator.cancel();
        self.passive_motion = false;
        self.release_velocity = 0.0;

        if self.cancelling {
            self.close_refresh_cycle();
        }
        if let Some(header) = self.header.as_mut() {
            if !self.refreshing {
                header.zone.resume();
            }
        }
        let loading = self.loading_more;
        if let Some(zone) = self.footer_zone_mut() {
            if !loading {
                zone.resume();
            }
        }
    }

    fn release(&mut self, velocity: f32, now_ms: i64) -> TouchDisposition {
        if self.offset != 0 || (!self.refreshing && self.header_reveal_height() > 0) {
            self.spring_back_on_release(now_ms);
            TouchDisposition::Consumed
        } else {
            self.release_velocity = velocity;
            TouchDisposition::PassThrough
        }
    }

    fn rest_disposition(&self) -> TouchDisposition {
        if (!self.refreshing && self.header_reveal_height() > 0) || self.offset != 0 {
            TouchDisposition::Consumed
        } else {
            TouchDisposition::PassThrough
        }
    }

    /// Release: activate what was pulled far enough, spring back the rest
    fn spring_back_on_release(&mut self, now_ms: i64) {
        let header = self.header_reveal_height();
        let rest = self.header_rest_height();
        let mut from = self.offset;

        if rest > 0 && header == rest {
            if !self.refreshing {
                self.trigger_refresh(None);
            }
        } else {
            from -= header;
        }

        if from == 0 {
            return;
        }

        if self.is_loading_more_enabled() && !self.loading_more {
            if from >= self.load_more_threshold {
                self.start_loading_more();
            } else if from > 0 {
                let mut events = Vec::new();
                if let Some(zone) = self.footer_zone_mut() {
                    zone.cancel(&mut events);
                }
                self.queue_footer_events(&events);
            }
        }

        if !self.cancelling {
            trace!("Spring back from {}", from);
            self.passive_motion = false;
            self.animator.start(from, 0, now_ms, AnimationKind::SpringBack);
        }
    }

    /// The offset the spring-back animates, with a collapsing header counted in
    fn virtual_offset(&self) -> i32 {
        let header = self.header_reveal_height();
        if !self.hide_header_on_settle && !self.refreshing && header > 0 {
            self.offset - header
        } else {
            self.offset
        }
    }

    fn needs_correction(&self) -> bool {
        !self.gesture.is_touching()
            && (self.offset != 0 || (!self.refreshing && self.header_reveal_height() > 0))
    }

    /// Bring an inconsistent resting state back to rest; never activates anything
    fn start_self_correction(&mut self, now_ms: i64) {
        let from = self.virtual_offset();
        if from == 0 {
            warn!(
                "Cannot settle offset {} with header height {}",
                self.offset,
                self.header_reveal_height()
            );
            return;
        }
        trace!("Self-correcting spring back from {}", from);
        self.passive_motion = true;
        self.animator.start(from, 0, now_ms, AnimationKind::SpringBack);
    }

    // ---- scroll application -----------------------------------------------

    fn set_offset(&mut self, offset: i32) {
        self.offset = offset;
        report(self.host.apply_offset(offset), "offset");

        if self.header.is_some() && offset < 0 && !self.refreshing {
            if !self.cancelling && !self.passive_motion {
                let distance = self.header_reveal_height() - offset;
                self.outbox.push(Notice::Header(HeaderEvent::Pull(distance)));
            }
        } else if !self.loading_more {
            let passive = self.passive_motion;
            let mut events = Vec::new();
            if let Some(zone) = self.footer_zone_mut() {
                if passive && !zone.phase().is_muted() {
                    zone.set_phase(PullPhase::Settling);
                }
                zone.set_reveal_height(offset.max(0), &mut events);
            }
            self.queue_footer_events(&events);
        }
    }

    /// Grow or shrink the header by `delta`, returning what it could not take
    fn absorb_header(&mut self, delta: i32) -> i32 {
        let passive = self.passive_motion;
        let Some(header) = self.header.as_mut() else {
            return delta;
        };
        if passive && !header.zone.phase().is_muted() {
            header.zone.set_phase(PullPhase::Settling);
        }

        let mut events = Vec::new();
        let residual = header.zone.apply_delta(delta, &mut events);
        let height = header.zone.reveal_height();
        self.queue_header_events(&events);
        report(self.host.apply_header_height(height), "header height");
        residual
    }

    /// Set the header height without notifications
    fn force_header_height(&mut self, height: i32) {
        if let Some(header) = self.header.as_mut() {
            header.zone.sync_reveal_height(height);
            report(self.host.apply_header_height(height), "header height");
        }
    }

    fn queue_header_events(&mut self, events: &[PullEvent]) {
        for event in events {
            let event = match *event {
                PullEvent::StartPulling => HeaderEvent::StartPulling,
                PullEvent::Pull(distance) => HeaderEvent::Pull(distance),
                PullEvent::ReachAboveBoundary => HeaderEvent::ReachAboveRestHeight,
                PullEvent::ReachBelowBoundary => HeaderEvent::ReachBelowRestHeight,
                PullEvent::CancelPulling => continue,
            };
            self.outbox.push(Notice::Header(event));
        }
    }

    fn queue_footer_events(&mut self, events: &[PullEvent]) {
        for event in events {
            let event = match *event {
                PullEvent::StartPulling => FooterEvent::StartPulling,
                PullEvent::ReachAboveBoundary => FooterEvent::ReachAboveThreshold,
                PullEvent::ReachBelowBoundary => FooterEvent::ReachBelowThreshold,
                PullEvent::CancelPulling => FooterEvent::CancelPulling,
                PullEvent::Pull(_) => continue,
            };
            self.outbox.push(Notice::Footer(event));
        }
    }

    // ---- refresh ----------------------------------------------------------

    fn trigger_refresh(&mut self, context: Option<C>) {
        self.refreshing = true;
        if let Some(header) = self.header.as_mut() {
            header.zone.set_phase(PullPhase::Active);
        }
        debug!("Refresh triggered");
        self.outbox.push(Notice::Header(HeaderEvent::StartRefreshing));
        self.outbox.push(Notice::Refresh(context));
    }

    fn start_refresh(&mut self, context: Option<C>) {
        if self.refreshing {
            trace!("Already refreshing, manual refresh ignored");
            return;
        }
        if self.cancelling {
            // the previous cycle ends before the next one starts
            self.animator.cancel();
            self.passive_motion = false;
            self.close_refresh_cycle();
        }

        let rest = self.header_rest_height();
        if rest == 0 {
            debug!("Header not measured yet, manual refresh deferred");
            if let Some(header) = self.header.as_mut() {
                header.zone.set_phase(PullPhase::Activating);
            }
            self.deferred_refresh = Some(context);
            return;
        }

        self.deferred_refresh = None;
        if let Some(header) = self.header.as_mut() {
            header.zone.resume();
            let mut events = Vec::new();
            header.zone.set_reveal_height(rest, &mut events);
            self.queue_header_events(&events);
            report(self.host.apply_header_height(rest), "header height");
        }
        self.trigger_refresh(context);
    }

    fn finish_refresh(&mut self, hide_header: bool) {
        if !self.refreshing {
            trace!("Not refreshing, finish ignored");
            return;
        }

        self.refreshing = false;
        self.cancelling = true;
        self.hide_header_on_settle = hide_header;
        if let Some(header) = self.header.as_mut() {
            header.zone.set_phase(PullPhase::Settling);
        }

        let from = if hide_header {
            self.offset
        } else {
            self.offset - self.header_reveal_height()
        };
        debug!("Refresh finished, settling from {}", from);
        self.passive_motion = false;
        self.animator
            .start_on_next_frame(from, 0, AnimationKind::SpringBack);
    }

    fn maybe_settle(&mut self) {
        if !self.cancelling || self.offset != 0 {
            return;
        }
        if self.header_reveal_height() != 0 && !self.hide_header_on_settle {
            return;
        }
        self.close_refresh_cycle();
    }

    fn close_refresh_cycle(&mut self) {
        self.cancelling = false;
        if std::mem::take(&mut self.hide_header_on_settle) {
            self.force_header_height(0);
        }
        if let Some(header) = self.header.as_mut() {
            header.zone.resume();
        }
        debug!("Refresh cycle closed");
        self.outbox.push(Notice::Header(HeaderEvent::EndRefreshing));
        self.outbox.push(Notice::RefreshAnimationEnd);
    }

    // ---- load more --------------------------------------------------------

    fn start_loading_more(&mut self) {
        self.loading_more = true;
        if let Some(zone) = self.footer_zone_mut() {
            zone.set_phase(PullPhase::Active);
        }
        debug!("Load more triggered");
        self.outbox.push(Notice::Footer(FooterEvent::StartLoadingMore));
        self.outbox.push(Notice::LoadMore);
    }

    fn finish_loading(&mut self, no_more_data: bool) {
        if !self.loading_more {
            trace!("Not loading more, finish ignored");
            return;
        }
        self.loading_more = false;

        let reveal = self.offset.max(0);
        if let Some(zone) = self.footer_zone_mut() {
            zone.sync_reveal_height(reveal);
            zone.set_phase(if reveal > 0 {
                PullPhase::Settling
            } else {
                PullPhase::Idle
            });
            self.outbox.push(Notice::Footer(FooterEvent::EndLoadingMore { no_more_data }));
        }
        debug!("Load more finished, no more data: {}", no_more_data);
    }

    fn fresh_footer_zone(&self) -> FooterZone {
        let mut zone = FooterZone::new(0, self.load_more_threshold);
        let reveal = self.offset.max(0);
        if reveal > 0 {
            zone.sync_reveal_height(reveal);
            zone.set_phase(PullPhase::Settling);
        }
        zone
    }

    fn set_load_more_enabled(&mut self, enable: bool) {
        let zone = enable.then(|| self.fresh_footer_zone());
        let Some(footer) = self.footer.as_mut() else {
            debug!("No footer attached, load-more stays disabled");
            return;
        };
        if enable == footer.zone.is_some() {
            return;
        }

        footer.zone = zone;
        report(self.host.apply_footer_visibility(enable), "footer visibility");
        debug!("Load more {}", if enable { "enabled" } else { "disabled" });
        if enable {
            self.outbox.push(Notice::Footer(FooterEvent::Reset));
        }
    }

    fn reset_footer(&mut self) {
        if self.footer.is_none() {
            return;
        }
        if !self.is_loading_more_enabled() {
            // enabling resets
            self.set_load_more_enabled(true);
            return;
        }

        let loading = self.loading_more;
        let reveal = self.offset.max(0);
        if let Some(zone) = self.footer_zone_mut() {
            if !loading {
                zone.sync_reveal_height(reveal);
                zone.set_phase(if reveal > 0 {
                    PullPhase::Settling
                } else {
                    PullPhase::Idle
                });
            }
        }
        self.outbox.push(Notice::Footer(FooterEvent::Reset));
    }

    // ---- notification -----------------------------------------------------

    /// Deliver queued notifications, then apply what listeners asked for
    fn flush(&mut self) {
        for _ in 0..MAX_FLUSH_ROUNDS {
            for notice in std::mem::take(&mut self.outbox) {
                self.deliver(notice);
            }

            let requests = self.requests.take();
            if requests.is_empty() && self.outbox.is_empty() {
                return;
            }
            for request in requests {
                self.apply(request);
            }
        }
        warn!(
            "Listeners kept queueing requests, {} notifications dropped",
            self.outbox.len()
        );
        self.outbox.clear();
        self.requests.take();
    }

    fn deliver(&mut self, notice: Notice<C>) {
        match notice {
            Notice::Header(event) => {
                trace!("Header event: {:?}", event);
                if let Some(header) = self.header.as_mut() {
                    event.dispatch(header.presenter.as_mut());
                }
            }
            Notice::Footer(event) => {
                trace!("Footer event: {:?}", event);
                if let Some(footer) = self.footer.as_mut() {
                    event.dispatch(footer.presenter.as_mut());
                }
            }
            Notice::Refresh(context) => {
                if let Some(listener) = self.on_refresh.as_mut() {
                    listener(context, &mut self.requests);
                }
            }
            Notice::RefreshAnimationEnd => {
                if let Some(listener) = self.on_refresh_animation_end.as_mut() {
                    listener(&mut self.requests);
                }
            }
            Notice::LoadMore => {
                if let Some(listener) = self.on_load_more.as_mut() {
                    listener(&mut self.requests);
                }
            }
        }
    }
}

impl<H: ListHost, C> DragSurface for OverScrollController<H, C> {
    fn layout(&self) -> LayoutSnapshot {
        self.host.layout()
    }

    fn offset(&self) -> i32 {
        self.offset
    }

    fn header_reveal(&self) -> i32 {
        self.header_reveal_height()
    }

    /// Reveal the header first, then push the content down
    fn scroll_down(&mut self, delta: i32) {
        let mut delta = delta;
        if !self.refreshing && self.offset <= 0 && at_top_edge(&self.host.layout()) {
            let header = self.header_reveal_height();
            if header < self.header_rest_height() {
                delta = self.absorb_header(delta);
                if delta == 0 {
                    return;
                }
            }
        }
        self.set_offset(self.offset - delta);
    }

    /// Undo a top over-scroll, collapse the header, then over-scroll the bottom
    fn scroll_up(&mut self, delta: i32) {
        let mut delta = delta;
        let offset = self.offset;
        if offset < 0 {
            if offset < delta {
                self.set_offset(offset - delta);
                return;
            }
            self.set_offset(0);
            delta -= offset;
            if delta == 0 {
                return;
            }
        }

        if !self.refreshing && self.header_reveal_height() > 0 {
            delta = self.absorb_header(delta);
            if delta == 0 {
                return;
            }
        }

        if at_bottom_edge(&self.host.layout()) {
            self.set_offset(self.offset - delta);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::*;

    fn drag(controller: &mut TestController, deltas: &[f32], start_ms: i64) -> i64 {
        let mut y = 100.0;
        let mut now = start_ms;
        controller.on_touch(TouchEvent::down(y, now));
        // cross the slop first
        y += 10.0;
        now += 10;
        controller.on_touch(TouchEvent::moved(y, now));
        for delta in deltas {
            y += delta;
            now += 16;
            controller.on_touch(TouchEvent::moved(y, now));
        }
        now
    }

    fn release(controller: &mut TestController, now_ms: i64) -> TouchDisposition {
        controller.on_touch(TouchEvent::up(0.0, now_ms + 200))
    }

    fn header(event: HeaderEvent) -> Entry {
        Entry::Header(event)
    }

    fn footer(event: FooterEvent) -> Entry {
        Entry::Footer(event)
    }

    #[test]
    fn test_damped_pull_reaches_rest_height_once() {
        let (mut c, journal) = controller(FakeHost::at_top());
        drag(&mut c, &[20.0; 11], 0);

        assert_eq!(c.header_reveal_height(), REST);
        assert_eq!(c.host().header_height, REST);
        // the overflow of the last step went to the offset
        assert_eq!(c.offset(), -4);
        assert_eq!(journal.count(&header(HeaderEvent::StartPulling)), 1);
        assert_eq!(journal.count(&header(HeaderEvent::ReachAboveRestHeight)), 1);
        assert_eq!(journal.count(&header(HeaderEvent::ReachBelowRestHeight)), 0);
        assert!(journal
            .entries()
            .contains(&header(HeaderEvent::Pull(8))));
    }

    #[test]
    fn test_slop_crossing_move_is_not_applied() {
        let (mut c, _) = controller(FakeHost::at_top());
        c.on_touch(TouchEvent::down(100.0, 0));
        c.on_touch(TouchEvent::moved(130.0, 10));
        assert_eq!(c.header_reveal_height(), 0);
        assert_eq!(c.offset(), 0);
    }

    #[test]
    fn test_boundary_events_once_per_crossing() {
        let (mut c, journal) = controller(FakeHost::at_top());
        let now = drag(&mut c, &[20.0; 11], 0);
        assert_eq!(c.offset(), -4);

        // back below the rest height, wiggle, and up again
        let mut y = 0.0;
        let mut t = now;
        for delta in [-30.0, -30.0, 5.0, -5.0, 5.0, 60.0, 60.0] {
            y += delta;
            t += 16;
            c.on_touch(TouchEvent::moved(320.0 + y, t));
        }

        assert_eq!(journal.count(&header(HeaderEvent::ReachBelowRestHeight)), 1);
        assert_eq!(journal.count(&header(HeaderEvent::ReachAboveRestHeight)), 2);
        assert_eq!(journal.count(&header(HeaderEvent::StartPulling)), 1);
    }

    #[test]
    fn test_release_at_rest_height_refreshes_and_round_trips() {
        let (mut c, journal) = controller(FakeHost::at_top());
        let now = drag(&mut c, &[20.0; 11], 0);

        assert_eq!(release(&mut c, now), TouchDisposition::Consumed);
        assert!(c.is_refreshing());
        assert_eq!(c.header_phase(), Some(PullPhase::Active));
        assert_eq!(journal.count(&Entry::Refresh(None)), 1);
        let start = journal.position(&header(HeaderEvent::StartRefreshing)).unwrap();
        assert!(start < journal.position(&Entry::Refresh(None)).unwrap());

        // the overflow springs back, the header stays
        let now = run_frames(&mut c, now + 200);
        assert_eq!(c.offset(), 0);
        assert_eq!(c.header_reveal_height(), REST);

        c.finish_refreshing();
        c.finish_refreshing();
        run_frames(&mut c, now);

        assert_eq!(c.offset(), 0);
        assert_eq!(c.header_reveal_height(), 0);
        assert_eq!(c.host().header_height, 0);
        assert!(!c.is_refreshing());
        assert_eq!(c.header_phase(), Some(PullPhase::Idle));
        assert_eq!(journal.count(&header(HeaderEvent::EndRefreshing)), 1);
        assert_eq!(journal.count(&Entry::RefreshAnimationEnd), 1);
        let end = journal.position(&header(HeaderEvent::EndRefreshing)).unwrap();
        assert!(end < journal.position(&Entry::RefreshAnimationEnd).unwrap());
    }

    #[test]
    fn test_finish_refreshing_is_idempotent() {
        let (mut c, journal) = controller(FakeHost::at_top());
        c.finish_refreshing();
        assert!(!c.is_animating());
        assert!(journal.entries().is_empty());

        c.start_refresh_manually(Some("first"));
        c.finish_refreshing();
        let task = c.animator.task().cloned();
        c.finish_refreshing();
        assert_eq!(c.animator.task().cloned(), task);
        run_frames(&mut c, 0);
        assert_eq!(journal.count(&Entry::RefreshAnimationEnd), 1);
    }

    #[test]
    fn test_release_below_rest_height_springs_back_quietly() {
        let (mut c, journal) = controller(FakeHost::at_top());
        let now = drag(&mut c, &[20.0; 4], 0);
        assert_eq!(c.header_reveal_height(), 32);

        assert_eq!(release(&mut c, now), TouchDisposition::Consumed);
        run_frames(&mut c, now + 200);
        assert_eq!(c.header_reveal_height(), 0);
        assert_eq!(c.offset(), 0);
        assert!(!c.is_refreshing());
        assert_eq!(journal.count(&Entry::Refresh(None)), 0);
    }

    #[test]
    fn test_finish_without_animation_collapses_on_settle() {
        let (mut c, journal) = controller(FakeHost::at_top());
        c.start_refresh_manually(None);
        assert_eq!(c.header_reveal_height(), REST);

        c.finish_refreshing_without_animation();
        assert!(c.is_animating());
        // the header holds its height until the offset settles
        assert_eq!(c.header_reveal_height(), REST);
        c.on_frame(16);
        assert_eq!(c.header_reveal_height(), 0);
        assert_eq!(c.host().header_height, 0);
        assert_eq!(journal.count(&Entry::RefreshAnimationEnd), 1);
    }

    #[test]
    fn test_finish_from_inside_refresh_listener() {
        let journal = Journal::default();
        let mut c = bare_controller(FakeHost::at_top(), &journal);
        c.attach_header(Box::new(RecordingHeader(journal.clone())))
            .unwrap();
        c.set_header_rest_height(REST).unwrap();

        let seen = journal.clone();
        c.set_on_refresh_listener(
            move |context, requests| {
                seen.push(Entry::Refresh(context));
                requests.finish_refreshing();
            },
            |_| {},
        );

        c.start_refresh_manually(Some("inline"));
        assert!(!c.is_refreshing());
        assert!(c.is_animating());
        run_frames(&mut c, 0);
        assert_eq!(c.header_reveal_height(), 0);
        assert_eq!(journal.count(&header(HeaderEvent::EndRefreshing)), 1);
    }

    #[test]
    fn test_manual_refresh_before_measure_is_deferred() {
        let journal = Journal::default();
        let mut c = bare_controller(FakeHost::at_top(), &journal);
        c.attach_header(Box::new(RecordingHeader(journal.clone())))
            .unwrap();

        c.start_refresh_manually(Some("boot"));
        assert!(!c.is_refreshing());
        assert_eq!(c.header_phase(), Some(PullPhase::Activating));

        c.set_header_rest_height(REST).unwrap();
        assert!(c.is_refreshing());
        assert_eq!(c.header_reveal_height(), REST);
        assert_eq!(journal.count(&Entry::Refresh(Some("boot"))), 1);
    }

    #[test]
    fn test_first_measure_collapses_header() {
        let journal = Journal::default();
        let mut c = bare_controller(FakeHost::at_top(), &journal);
        c.attach_header(Box::new(RecordingHeader(journal.clone())))
            .unwrap();
        c.set_header_rest_height(REST).unwrap();
        assert_eq!(c.host().header_height, 0);
        assert_eq!(c.header_rest_height(), REST);
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn test_attach_errors() {
        let (mut c, journal) = controller(FakeHost::at_top());
        assert!(matches!(
            c.attach_header(Box::new(RecordingHeader(journal))),
            Err(Error::InvalidArgument(_))
        ));
        assert!(matches!(
            c.set_header_rest_height(0),
            Err(Error::InvalidArgument(_))
        ));

        let mut bare = bare_controller(FakeHost::at_top(), &Journal::default());
        assert!(bare.set_header_rest_height(80).is_err());
    }

    #[test]
    fn test_manual_refresh_while_refreshing_is_ignored() {
        let (mut c, journal) = controller(FakeHost::at_top());
        c.start_refresh_manually(Some("a"));
        c.start_refresh_manually(Some("b"));
        assert_eq!(journal.count(&Entry::Refresh(Some("a"))), 1);
        assert_eq!(journal.count(&Entry::Refresh(Some("b"))), 0);
        assert_eq!(journal.count(&header(HeaderEvent::StartRefreshing)), 1);
    }

    #[test]
    fn test_touch_down_closes_finishing_refresh() {
        let (mut c, journal) = controller(FakeHost::at_top());
        c.start_refresh_manually(None);
        c.finish_refreshing();
        c.on_frame(0);
        c.on_frame(100);
        assert!(c.header_reveal_height() > 0);

        c.on_touch(TouchEvent::down(50.0, 120));
        assert!(!c.is_animating());
        assert_eq!(journal.count(&header(HeaderEvent::EndRefreshing)), 1);
        assert_eq!(journal.count(&Entry::RefreshAnimationEnd), 1);

        // releasing lets the half-collapsed header finish collapsing
        c.on_touch(TouchEvent::up(50.0, 130));
        run_frames(&mut c, 130);
        assert_eq!(c.header_reveal_height(), 0);
        assert_eq!(journal.count(&Entry::RefreshAnimationEnd), 1);
    }

    #[test]
    fn test_manual_refresh_while_collapsing_closes_previous_cycle() {
        let (mut c, journal) = controller(FakeHost::at_top());
        c.start_refresh_manually(Some("a"));
        c.finish_refreshing();
        c.on_frame(0);
        c.on_frame(100);
        assert!(c.header_reveal_height() > 0 && c.header_reveal_height() < REST);

        c.start_refresh_manually(Some("b"));
        assert!(c.is_refreshing());
        assert!(!c.is_animating());
        assert_eq!(journal.count(&header(HeaderEvent::EndRefreshing)), 1);
        assert_eq!(journal.count(&Entry::RefreshAnimationEnd), 1);
        assert_eq!(journal.count(&Entry::Refresh(Some("b"))), 1);

        // the first cycle ends before the second starts
        let entries = journal.entries();
        let end = entries
            .iter()
            .position(|e| *e == Entry::RefreshAnimationEnd)
            .unwrap();
        let second_start = entries
            .iter()
            .rposition(|e| *e == header(HeaderEvent::StartRefreshing))
            .unwrap();
        assert!(end < second_start);

        // nothing pushes the list past the header
        let mut now = 116;
        while c.on_frame(now) {
            assert!(c.offset() >= 0);
            now += 16;
        }
        assert_eq!(c.offset(), 0);
        assert_eq!(c.header_reveal_height(), REST);

        // a touch during the second refresh does not end it
        c.on_touch(TouchEvent::down(50.0, now + 10));
        assert!(c.is_refreshing());
        assert_eq!(journal.count(&header(HeaderEvent::EndRefreshing)), 1);
        assert_eq!(journal.count(&Entry::RefreshAnimationEnd), 1);
        c.on_touch(TouchEvent::up(50.0, now + 20));

        c.finish_refreshing();
        run_frames(&mut c, now + 40);
        assert_eq!(c.header_reveal_height(), 0);
        assert_eq!(journal.count(&Entry::RefreshAnimationEnd), 2);
    }

    #[test]
    fn test_fling_at_rest_top_edge_passes_through() {
        let (mut c, _) = controller(FakeHost::at_top());
        c.on_touch(TouchEvent::down(100.0, 0));
        c.on_touch(TouchEvent::moved(90.0, 10));
        c.on_touch(TouchEvent::moved(80.0, 20));
        let disposition = c.on_touch(TouchEvent::up(70.0, 30));
        assert_eq!(disposition, TouchDisposition::PassThrough);
        assert!(!c.is_animating());
        assert_eq!(c.offset(), 0);
    }

    #[test]
    fn test_drag_in_middle_passes_through() {
        let (mut c, _) = controller(FakeHost::in_middle());
        c.on_touch(TouchEvent::down(100.0, 0));
        c.on_touch(TouchEvent::moved(120.0, 10));
        let disposition = c.on_touch(TouchEvent::moved(150.0, 26));
        assert_eq!(disposition, TouchDisposition::PassThrough);
        assert_eq!(c.offset(), 0);
        assert_eq!(c.header_reveal_height(), 0);
    }

    #[test]
    fn test_host_fling_overshoots_then_settles_without_refresh() {
        let (mut c, journal) = controller(FakeHost::in_middle());
        c.on_touch(TouchEvent::down(100.0, 0));
        c.on_touch(TouchEvent::moved(120.0, 10));
        c.on_touch(TouchEvent::moved(160.0, 20));
        assert_eq!(
            c.on_touch(TouchEvent::up(200.0, 30)),
            TouchDisposition::PassThrough
        );

        // the host's own fling carries the list to its top
        c.host_mut().layout = FakeHost::at_top().layout;
        assert!(c.on_fling_reached_edge(100));
        assert_eq!(c.animator.task().map(|t| t.to), Some(-200));
        assert!(c.on_frame(150));
        assert!(c.offset() < 0);

        run_frames(&mut c, 150);
        assert_eq!(c.offset(), 0);
        assert_eq!(c.header_reveal_height(), 0);
        assert!(!c.is_refreshing());
        assert!(journal.entries().is_empty());
    }

    #[test]
    fn test_slow_fling_does_not_overshoot() {
        let (mut c, _) = controller(FakeHost::at_top());
        c.on_touch(TouchEvent::down(100.0, 0));
        c.on_touch(TouchEvent::up(100.0, 500));
        assert!(!c.on_fling_reached_edge(600));
    }

    fn pull_footer(c: &mut TestController, deltas: &[f32]) -> i64 {
        drag(c, &deltas.iter().map(|d| -d).collect::<Vec<_>>(), 0)
    }

    #[test]
    fn test_footer_threshold_then_load_more() {
        let (mut c, journal) = controller(FakeHost::at_bottom());
        let now = pull_footer(&mut c, &[40.0; 12]);
        assert!(c.offset() >= c.config().load_more_threshold_px());

        release(&mut c, now);
        assert!(c.is_loading_more());
        let above = journal.position(&footer(FooterEvent::ReachAboveThreshold)).unwrap();
        let start = journal.position(&footer(FooterEvent::StartLoadingMore)).unwrap();
        assert!(above < start);
        assert!(start < journal.position(&Entry::LoadMore).unwrap());

        // a second activation needs an end or reset in between
        let now = run_frames(&mut c, now + 200);
        assert_eq!(c.offset(), 0);
        let now = pull_footer(&mut c, &[40.0; 12]);
        release(&mut c, now);
        c.on_footer_tap();
        c.start_loading_more_manually();
        assert_eq!(journal.count(&footer(FooterEvent::StartLoadingMore)), 1);

        c.finish_loading_more(false);
        c.on_footer_tap();
        assert_eq!(journal.count(&footer(FooterEvent::StartLoadingMore)), 2);
        let end = journal
            .position(&footer(FooterEvent::EndLoadingMore { no_more_data: false }))
            .unwrap();
        assert!(end < journal.entries().len() - 1);
    }

    #[test]
    fn test_footer_released_below_threshold_cancels() {
        let (mut c, journal) = controller(FakeHost::at_bottom());
        let now = pull_footer(&mut c, &[40.0; 3]);
        let reveal = c.offset();
        assert!(reveal > 25 && reveal < 50, "offset {}", reveal);

        release(&mut c, now);
        run_frames(&mut c, now + 200);
        assert!(!c.is_loading_more());
        assert_eq!(journal.count(&footer(FooterEvent::CancelPulling)), 1);
        assert_eq!(journal.count(&Entry::LoadMore), 0);
        assert_eq!(c.footer_phase(), Some(PullPhase::Idle));
    }

    #[test]
    fn test_disable_while_loading_then_finish() {
        let (mut c, journal) = controller(FakeHost::at_bottom());
        c.start_loading_more_manually();
        assert!(c.is_loading_more());

        c.enable_load_more(false);
        assert!(!c.is_loading_more_enabled());
        assert!(!c.host().footer_visible);

        c.finish_loading_more(true);
        assert!(!c.is_loading_more());
        assert_eq!(
            journal.count(&footer(FooterEvent::EndLoadingMore { no_more_data: true })),
            0
        );

        c.enable_load_more(true);
        assert_eq!(c.footer_phase(), Some(PullPhase::Idle));
        assert_eq!(journal.count(&footer(FooterEvent::Reset)), 1);
    }

    #[test]
    fn test_manual_load_more_enables_footer() {
        let (mut c, journal) = controller(FakeHost::at_bottom());
        c.enable_load_more(false);
        c.start_loading_more_manually();
        assert!(c.is_loading_more_enabled());
        assert!(c.host().footer_visible);
        assert_eq!(journal.count(&Entry::LoadMore), 1);
    }

    #[test]
    fn test_reset_footer_view() {
        let (mut c, journal) = controller(FakeHost::at_bottom());
        c.enable_load_more(false);
        c.reset_load_more_footer_view();
        assert!(c.is_loading_more_enabled());
        assert_eq!(journal.count(&footer(FooterEvent::Reset)), 1);

        c.reset_load_more_footer_view();
        assert_eq!(journal.count(&footer(FooterEvent::Reset)), 2);
    }

    #[test]
    fn test_host_errors_are_swallowed() {
        let mut host = FakeHost::at_top();
        host.fail = true;
        let (mut c, journal) = controller(host);
        let now = drag(&mut c, &[20.0; 11], 0);
        release(&mut c, now);
        assert!(c.is_refreshing());
        assert_eq!(journal.count(&Entry::Refresh(None)), 1);
    }

    #[test]
    fn test_requests_from_load_more_listener() {
        let journal = Journal::default();
        let mut c = bare_controller(FakeHost::at_bottom(), &journal);
        c.attach_footer(Box::new(RecordingFooter(journal.clone())));
        c.enable_load_more(true);
        c.set_on_load_more_listener(|requests| {
            requests.finish_loading_more(true);
            requests.enable_load_more(false);
        });

        c.on_footer_tap();
        assert!(!c.is_loading_more());
        assert!(!c.is_loading_more_enabled());
        assert_eq!(
            journal.count(&footer(FooterEvent::EndLoadingMore { no_more_data: true })),
            1
        );
    }
}
