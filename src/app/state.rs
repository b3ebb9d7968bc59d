//! Central application state.
//!
//! All mutable state lives here so that rendering can be a pure function
//! over `&AppState` and input handling a set of `&mut AppState` operations.
//! Every delayed effect is a [`Task`] parked in one scheduler and run by
//! [`AppState::advance`]; the runtime feeds in wall time, tests feed in
//! whatever they like.

use ratatui::layout::Rect;

use crate::config::AppConfig;
use crate::core::{
    carousel::{self, RoleCarousel},
    clock::{Debounce, Millis, Scheduler, Throttle, TimerId},
    counters::{SkillBar, SkillBars, StatCounter, StatsAnimator, COUNTER_FRAME},
    effects::{self, CursorFollower, NameEntrance, ParticleField, Ripples, Typewriter},
    filter::{FilterStep, FilterTimer, ProjectFilter},
    form::{ContactForm, FormPhase, Submission, SubmitOutcome, SubmitPolicy, RESET_AFTER, RESET_FADE},
    nav::{NavController, ScrollRequest},
    notice::{NoticeKind, Notices, NOTICE_LIFETIME, RESUME_UNAVAILABLE},
    observe::{VisibilityMode, VisibilityObserver},
    page::{PageModel, PageSpec, Region},
    reveal::{Cascade, RevealEngine, RevealStep},
    scroll::{ScrollGeometry, ScrollState, ScrollTracker, RESIZE_SETTLE, SCROLL_FRAME_BUDGET},
    smooth::SmoothScroll,
    theme::{PreferenceStore, ThemePreference, ThemeStore},
    tracking::{ScrollDepthTracker, TrackingEvent, TrackingSink},
};
use crate::ui::layout::AppLayout;

/// Document pixels per terminal column.
pub const PX_PER_COL: f64 = 8.0;
/// Scroll-depth milestones are sampled at most once per second.
const DEPTH_SAMPLE_INTERVAL: Millis = 1000;
/// Reveal check run once after load, independent of scrolling.
const LOAD_CHECK_DELAY: Millis = 1000;
/// Decorative orbit items around the brand glyph.
const ORBIT_ITEMS: usize = 6;
const SMOOTH_SPEED: f64 = 0.2;
/// Frame-driven effects never replay more than this many missed frames.
const MAX_CATCHUP_FRAMES: u64 = 8;

/// Everything that can be waiting on the clock.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Task {
    ScrollPass,
    DepthSample,
    ResizeSettle,
    LoadCheck,
    FallbackVisibility,
    Reveal(RevealStep),
    CarouselAdvance,
    CarouselReveal,
    CounterFrame,
    SkillFill(usize),
    SubmitSettle,
    FormReset,
    FormRestore,
    Filter(FilterStep),
    NoticeExpire(u64),
    NameReveal(usize),
    TypeStart,
}

/// Where keyboard input goes.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum Focus {
    #[default]
    Page,
    /// Editing the contact form field at this index.
    Form(usize),
}

/// Top-level application state.
pub struct AppState {
    /// The page snapshot.
    pub page: PageModel,
    /// User settings and keybindings.
    pub config: AppConfig,
    pub focus: Focus,
    /// Controls the main event loop.
    pub should_quit: bool,
    /// Full terminal area from the last draw / resize.
    pub terminal_area: Rect,
    pub resume_url: Option<String>,
    pub endpoint: Option<String>,
    /// Submissions waiting for the network runtime.
    pub outbox: Vec<Submission>,

    pub nav: NavController,
    pub carousel: RoleCarousel,
    pub stats: StatsAnimator,
    pub skills: SkillBars,
    pub form: ContactForm,
    pub filter: ProjectFilter,
    pub notices: Notices,
    pub name: NameEntrance,
    pub typewriter: Typewriter,
    pub follower: CursorFollower,
    pub ripples: Ripples,
    pub particles: ParticleField,

    scheduler: Scheduler<Task>,
    scroll_throttle: Throttle,
    depth_throttle: Throttle,
    resize: Debounce,
    scroll_y: f64,
    tracker: ScrollTracker,
    reveal: RevealEngine,
    observer: VisibilityObserver<Region>,
    smooth: SmoothScroll,
    carousel_timer: Option<TimerId>,
    themes: ThemeStore<Box<dyn PreferenceStore>>,
    sinks: Vec<Box<dyn TrackingSink>>,
    depth: ScrollDepthTracker,
    effects_on: bool,
    last_frame: Millis,
}

impl AppState {
    pub fn new(
        spec: &PageSpec,
        config: AppConfig,
        prefs: Box<dyn PreferenceStore>,
        sinks: Vec<Box<dyn TrackingSink>>,
    ) -> Self {
        let page = PageModel::build(spec, config.px_per_row);

        let mut observer = VisibilityObserver::new();
        for (region, span) in page.regions() {
            observer.observe(region, span);
        }

        let stats = spec.stats().map(|s| StatCounter::new(&s.label, s.target)).collect();
        let skills = spec.skills().map(|s| SkillBar::new(&s.label, s.percent)).collect();
        let endpoint = config.endpoint.clone().or_else(|| spec.contact_endpoint.clone());

        Self {
            nav: NavController::default(),
            carousel: RoleCarousel::new(spec.roles.clone()),
            stats: StatsAnimator::new(stats),
            skills: SkillBars::new(skills),
            form: ContactForm::standard(config.submit_policy),
            filter: ProjectFilter::new(&page),
            notices: Notices::default(),
            name: NameEntrance::new(&page.title),
            typewriter: Typewriter::new(page.tagline.clone().unwrap_or_default()),
            follower: CursorFollower::default(),
            ripples: Ripples::default(),
            particles: ParticleField::seeded(effects::PARTICLE_COUNT, 0.0, 0.0),
            focus: Focus::Page,
            should_quit: false,
            terminal_area: Rect::default(),
            resume_url: spec.resume_url.clone(),
            endpoint,
            outbox: Vec::new(),

            scheduler: Scheduler::new(),
            scroll_throttle: Throttle::new(SCROLL_FRAME_BUDGET),
            depth_throttle: Throttle::new(DEPTH_SAMPLE_INTERVAL),
            resize: Debounce::new(RESIZE_SETTLE),
            scroll_y: 0.0,
            tracker: ScrollTracker::new(ORBIT_ITEMS),
            reveal: RevealEngine::new(&page),
            observer,
            smooth: SmoothScroll::new(SMOOTH_SPEED),
            carousel_timer: None,
            themes: ThemeStore::load(prefs),
            sinks,
            depth: ScrollDepthTracker::default(),
            effects_on: false,
            last_frame: 0,
            page,
            config,
        }
    }

    /// Page load: derived scroll state and the load-time timers.  Sections
    /// wait for the first scroll or the load check before revealing.
    pub fn boot(&mut self, area: Rect) {
        self.terminal_area = area;
        self.apply_viewport();
        self.run_pass(false);

        self.scheduler.schedule(LOAD_CHECK_DELAY, Task::LoadCheck);
        let words: Vec<_> = self.name.schedule().collect();
        for (index, delay) in words {
            self.scheduler.schedule(delay, Task::NameReveal(index));
        }
        if self.config.visibility == VisibilityMode::FixedDelay {
            self.scheduler.schedule(carousel::START_DELAY, Task::FallbackVisibility);
        }
        if self.page.tagline.is_some() {
            self.scheduler.schedule(effects::TYPE_START, Task::TypeStart);
        }
        tracing::info!(
            sections = self.page.sections.len(),
            visibility = self.config.visibility.as_str(),
            "page booted"
        );
    }

    // ── clock ──────────────────────────────────────────────────

    pub fn now(&self) -> Millis {
        self.scheduler.now()
    }

    /// Run every task due at or before `now`, in order.
    pub fn advance(&mut self, now: Millis) {
        while let Some((_, task)) = self.scheduler.pop_due(now) {
            self.dispatch(task);
        }
        self.scheduler.advance_to(now);
    }

    /// One display frame: timers, smooth scrolling and frame-driven effects.
    pub fn frame(&mut self, now: Millis) {
        self.advance(now);
        let dt = now.saturating_sub(self.last_frame);
        let frames = (now / SCROLL_FRAME_BUDGET).saturating_sub(self.last_frame / SCROLL_FRAME_BUDGET);
        self.last_frame = now;

        if let Some(y) = self.smooth.tick(dt) {
            self.set_scroll(y);
        }
        if self.effects_on {
            for _ in 0..frames.min(MAX_CATCHUP_FRAMES) {
                self.follower.step();
                self.particles.step();
            }
        }
        self.ripples.expire(now);
    }

    pub fn pending_timers(&self) -> usize {
        self.scheduler.pending()
    }

    fn dispatch(&mut self, task: Task) {
        let now = self.scheduler.now();
        tracing::trace!(?task, now, "timer fired");
        match task {
            Task::ScrollPass => {
                self.scroll_throttle.flush(now);
                self.run_pass(true);
            }
            Task::DepthSample => {
                self.depth_throttle.flush(now);
                self.sample_depth();
            }
            Task::ResizeSettle => {
                self.resize.settle();
                self.settle_resize();
            }
            Task::LoadCheck => self.check_reveals(),
            Task::FallbackVisibility => {
                for region in self.observer.drain_all() {
                    self.on_region_visible(region);
                }
            }
            Task::Reveal(step) => {
                let children = RevealEngine::show(&mut self.page, step);
                self.schedule_cascades(children);
            }
            Task::CarouselAdvance => {
                if self.carousel.advance() {
                    self.scheduler.schedule(carousel::GAP, Task::CarouselReveal);
                    self.carousel_timer = Some(self.scheduler.schedule(carousel::INTERVAL, Task::CarouselAdvance));
                }
            }
            Task::CarouselReveal => {
                self.carousel.reveal();
            }
            Task::CounterFrame => {
                if self.stats.sample(now) {
                    self.scheduler.schedule(COUNTER_FRAME, Task::CounterFrame);
                }
            }
            Task::SkillFill(index) => {
                if self.skills.apply(index) {
                    tracing::debug!(index, "skill bar filled");
                }
            }
            Task::SubmitSettle => {
                if self.form.settle() {
                    self.scheduler.schedule(RESET_AFTER, Task::FormReset);
                }
            }
            Task::FormReset => {
                if self.form.begin_reset() {
                    self.scheduler.schedule(RESET_FADE, Task::FormRestore);
                }
            }
            Task::FormRestore => {
                self.form.finish_reset();
            }
            Task::Filter(step) => {
                let (follow, relayout) = self.filter.apply(&mut self.page, step);
                self.schedule_filter(follow);
                if relayout {
                    self.resync_layout();
                }
            }
            Task::NoticeExpire(id) => {
                self.notices.dismiss(id);
            }
            Task::NameReveal(index) => {
                self.name.show(index);
            }
            Task::TypeStart => self.typewriter.start(now),
        }
    }

    // ── scrolling ──────────────────────────────────────────────

    pub fn scroll_y(&self) -> f64 {
        self.scroll_y
    }

    /// Derived values from the last scroll pass.
    pub fn scroll_state(&self) -> &ScrollState {
        self.tracker.state()
    }

    pub fn orbit_rotations(&self) -> Vec<f64> {
        self.tracker.orbit_rotations()
    }

    pub fn is_smooth_scrolling(&self) -> bool {
        self.smooth.is_animating()
    }

    /// `(width, height)` of the page viewport in document pixels.
    pub fn viewport(&self) -> (f64, f64) {
        let body = AppLayout::from_area(self.terminal_area).body_area;
        (
            f64::from(body.width) * PX_PER_COL,
            f64::from(body.height) * self.page.px_per_row(),
        )
    }

    pub fn geometry(&self) -> ScrollGeometry {
        ScrollGeometry {
            scroll_y: self.scroll_y,
            document_height: self.page.document_height(),
            viewport_height: self.viewport().1,
        }
    }

    /// First page row visible at the top of the body.
    pub fn first_row(&self) -> usize {
        (self.scroll_y / self.page.px_per_row()).floor() as usize
    }

    /// User scroll by `rows` terminal rows; cancels any smooth scroll.
    pub fn scroll_by(&mut self, rows: f64) {
        self.smooth.cancel();
        let y = self.scroll_y + rows * self.page.px_per_row();
        self.set_scroll(y);
    }

    /// Scroll by whole viewports.
    pub fn page_by(&mut self, pages: f64) {
        let (_, height) = self.viewport();
        let rows = (height / self.page.px_per_row() - 1.0).max(1.0);
        self.scroll_by(pages * rows);
    }

    /// Jump directly (no easing).
    pub fn scroll_to(&mut self, y: f64) {
        self.smooth.cancel();
        self.set_scroll(y);
    }

    fn set_scroll(&mut self, y: f64) {
        let y = self.geometry().clamp(y);
        if y != self.scroll_y {
            self.scroll_y = y;
            self.request_pass();
        }
    }

    fn request_pass(&mut self) {
        if self.scroll_throttle.hit(&mut self.scheduler, Task::ScrollPass) {
            self.run_pass(true);
        }
    }

    /// Scroll tracker → navigation → reveal → visibility → depth tracking.
    /// Reveals are skipped on the load pass.
    fn run_pass(&mut self, reveal: bool) {
        let geometry = self.geometry();
        self.tracker.update(&geometry);
        let active = self.nav.sync(&mut self.page, geometry.scroll_y);
        self.tracker.set_active(active);

        if reveal {
            self.check_reveals();
        }

        if self.config.visibility == VisibilityMode::Observe {
            for region in self.observer.poll(geometry.scroll_y, geometry.viewport_height) {
                self.on_region_visible(region);
            }
        }

        if self.depth_throttle.hit(&mut self.scheduler, Task::DepthSample) {
            self.sample_depth();
        }

        let state = self.tracker.state();
        tracing::debug!(
            scroll_y = state.scroll_y,
            progress = state.progress_percent,
            active = state.active_section.as_deref().unwrap_or("-"),
            "scroll pass"
        );
    }

    fn check_reveals(&mut self) {
        let (_, height) = self.viewport();
        let cascades = self.reveal.check(&mut self.page, self.scroll_y, height);
        self.schedule_cascades(cascades);
    }

    fn schedule_cascades(&mut self, cascades: Vec<Cascade>) {
        for Cascade { delay, step } in cascades {
            self.scheduler.schedule(delay, Task::Reveal(step));
        }
    }

    fn on_region_visible(&mut self, region: Region) {
        let now = self.scheduler.now();
        tracing::debug!(?region, now, "region visible");
        match region {
            Region::Roles => {
                if self.carousel.start() {
                    self.carousel_timer = Some(self.scheduler.schedule(carousel::INTERVAL, Task::CarouselAdvance));
                }
            }
            Region::Stats => {
                if self.stats.trigger(now) && self.stats.is_running() {
                    self.scheduler.schedule(COUNTER_FRAME, Task::CounterFrame);
                }
            }
            Region::Skill(index) => {
                if let Some(delay) = self.skills.on_visible(index) {
                    self.scheduler.schedule(delay, Task::SkillFill(index));
                }
            }
        }
    }

    fn sample_depth(&mut self) {
        let progress = self.tracker.state().progress_percent;
        for milestone in self.depth.observe(progress) {
            self.track(TrackingEvent::scroll_depth(milestone));
        }
    }

    // ── viewport ───────────────────────────────────────────────

    /// Terminal resized: rendering follows at once, recomputation is
    /// debounced.
    pub fn resize(&mut self, area: Rect) {
        self.terminal_area = area;
        self.resize.hit(&mut self.scheduler, Task::ResizeSettle);
    }

    fn settle_resize(&mut self) {
        let (width, _) = self.viewport();
        tracing::debug!(width, "resize settled");
        self.nav.on_resize(width);
        self.apply_viewport();
        self.resync_layout();
    }

    fn apply_viewport(&mut self) {
        let (width, height) = self.viewport();
        self.effects_on = effects::effects_enabled(width);
        if self.particles.bounds() == (0.0, 0.0) {
            self.particles = ParticleField::seeded(effects::PARTICLE_COUNT, width, height);
        } else {
            self.particles.resize(width, height);
        }
    }

    /// Re-sync point: rebuild the layout and move pending observers.
    fn resync_layout(&mut self) {
        self.page.relayout();
        self.observer.resync(&self.page.regions());
        let clamped = self.geometry().clamp(self.scroll_y);
        self.scroll_y = clamped;
        self.request_pass();
    }

    pub fn effects_on(&self) -> bool {
        self.effects_on
    }

    // ── navigation ─────────────────────────────────────────────

    /// Follow the nav link targeting `target`.
    pub fn click_link(&mut self, target: &str) {
        let Some(label) = self
            .page
            .links()
            .iter()
            .find(|l| l.target == target)
            .map(|l| l.label.clone())
        else {
            return;
        };
        self.track(TrackingEvent::click(label));
        if let Some(request) = self.nav.click(&self.page, target) {
            self.start_scroll(request);
        }
    }

    /// Follow the keyboard-focused nav link.
    pub fn follow_focused_link(&mut self) {
        let target = self.page.links().get(self.nav.focused()).map(|l| l.target.clone());
        if let Some(target) = target {
            self.click_link(&target);
        }
    }

    fn start_scroll(&mut self, request: ScrollRequest) {
        let top = self.geometry().clamp(request.top);
        if request.smooth {
            self.smooth.set_target(self.scroll_y, top);
        } else {
            self.scroll_to(top);
        }
    }

    pub fn toggle_menu(&mut self) {
        self.track(TrackingEvent::click("menu"));
        self.nav.toggle_menu();
    }

    // ── theme ──────────────────────────────────────────────────

    pub fn theme(&self) -> ThemePreference {
        self.themes.current()
    }

    pub fn toggle_theme(&mut self) {
        self.track(TrackingEvent::click("theme"));
        if let Err(err) = self.themes.toggle() {
            tracing::warn!(%err, "theme preference not saved");
            self.post_notice(NoticeKind::Error, "Could not save the theme preference");
        }
    }

    // ── project filter ─────────────────────────────────────────

    pub fn cycle_filter(&mut self) {
        if self.filter.is_empty() {
            return;
        }
        let timers = self.filter.cycle(&mut self.page);
        let label = format!("filter:{}", self.filter.selected());
        self.track(TrackingEvent::click(label));
        self.schedule_filter(timers);
    }

    fn schedule_filter(&mut self, timers: Vec<FilterTimer>) {
        for FilterTimer { delay, step } in timers {
            self.scheduler.schedule(delay, Task::Filter(step));
        }
    }

    // ── contact form ───────────────────────────────────────────

    /// Move keyboard focus into the form and scroll it into view.
    pub fn focus_form(&mut self) {
        let Some(target) = self.page.sections.iter().find(|s| s.blocks.form).map(|s| s.id.clone()) else {
            return;
        };
        self.focus = Focus::Form(0);
        if let Some(request) = self.nav.click(&self.page, &target) {
            self.start_scroll(request);
        }
    }

    pub fn leave_form(&mut self) {
        self.focus = Focus::Page;
    }

    pub fn form_next_field(&mut self) {
        if let Focus::Form(i) = self.focus {
            self.focus = Focus::Form((i + 1) % self.form.fields().len().max(1));
        }
    }

    pub fn form_prev_field(&mut self) {
        if let Focus::Form(i) = self.focus {
            let n = self.form.fields().len().max(1);
            self.focus = Focus::Form((i + n - 1) % n);
        }
    }

    pub fn form_type(&mut self, c: char) {
        if let Focus::Form(i) = self.focus {
            if let Some(field) = self.form.field_mut(i) {
                field.push(c);
            }
        }
    }

    pub fn form_backspace(&mut self) {
        if let Focus::Form(i) = self.focus {
            if let Some(field) = self.form.field_mut(i) {
                field.backspace();
            }
        }
    }

    pub fn form_submit(&mut self) {
        self.track(TrackingEvent::click("submit"));
        match self.form.submit() {
            SubmitOutcome::Blocked => tracing::debug!("submit blocked by validation"),
            SubmitOutcome::Ignored => {}
            SubmitOutcome::Dispatched(submission) => {
                tracing::info!(fields = submission.fields.len(), "contact form submitted");
                self.outbox.push(submission);
                if let SubmitPolicy::Optimistic { settle } = self.form.policy() {
                    self.scheduler.schedule(settle, Task::SubmitSettle);
                }
            }
        }
    }

    /// Network result for a dispatched submission.
    pub fn acknowledge(&mut self, result: Result<(), String>) {
        match &result {
            Ok(()) => tracing::info!("submission delivered"),
            Err(err) => tracing::warn!(%err, "submission failed"),
        }
        if self.form.acknowledge(result) && *self.form.phase() == FormPhase::Sent {
            self.scheduler.schedule(RESET_AFTER, Task::FormReset);
        }
    }

    // ── resume ─────────────────────────────────────────────────

    /// Open the resume link with `opener`; any failure becomes a notice.
    pub fn open_resume<F>(&mut self, opener: F)
    where
        F: FnOnce(&str) -> anyhow::Result<()>,
    {
        self.track(TrackingEvent::click("resume"));
        let opened = match self.resume_url.as_deref() {
            Some(url) => match opener(url) {
                Ok(()) => true,
                Err(err) => {
                    tracing::warn!(url, %err, "resume link failed");
                    false
                }
            },
            None => false,
        };
        if opened {
            self.post_notice(NoticeKind::Success, "Resume opened in your browser");
        } else {
            self.post_notice(NoticeKind::Info, RESUME_UNAVAILABLE);
        }
    }

    // ── notices & tracking ─────────────────────────────────────

    pub fn post_notice(&mut self, kind: NoticeKind, text: impl Into<String>) {
        let id = self.notices.push(kind, text, self.scheduler.now());
        self.scheduler.schedule(NOTICE_LIFETIME, Task::NoticeExpire(id));
    }

    fn track(&mut self, event: TrackingEvent) {
        for sink in &mut self.sinks {
            sink.record(&event);
        }
    }

    // ── pointer effects ────────────────────────────────────────

    pub fn pointer_moved(&mut self, x: f64, y: f64) {
        if self.effects_on {
            self.follower.point(x, y);
        }
    }

    pub fn ripple(&mut self, element: effects::Rect, click: (f64, f64)) {
        if self.effects_on {
            self.ripples.spawn(element, click, self.scheduler.now());
        }
    }

    // ── teardown ───────────────────────────────────────────────

    /// Stop the carousel and cancel every pending timer.
    pub fn teardown(&mut self) -> usize {
        self.carousel.stop();
        if let Some(id) = self.carousel_timer.take() {
            self.scheduler.cancel(id);
        }
        let cancelled = self.scheduler.clear();
        tracing::info!(cancelled, "timers cancelled at teardown");
        cancelled
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::carousel::CarouselPhase;
    use crate::core::form::SubmitPolicy;
    use crate::core::page::CardDisplay;
    use crate::core::theme::MemoryStore;
    use std::cell::RefCell;
    use std::rc::Rc;

    // 16 px rows, 100×23 terminal → 800×320 px viewport.
    const PAGE: &str = r#"{
        "title": "T",
        "tagline": "Hello there",
        "roles": ["a", "b", "c"],
        "resume_url": "https://example.com/cv.pdf",
        "sections": [
            {"id": "home", "lines": ["x"], "tagline": true, "roles": true,
             "stats": [{"label": "commits", "target": 137}]},
            {"id": "skills", "title": "Skills",
             "lines": ["", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", "", ""],
             "skills": [{"label": "Rust", "percent": 90}]},
            {"id": "projects", "cards": [
                {"title": "p0", "category": "web", "lines": ["l"]},
                {"title": "p1", "category": "ml"}]},
            {"id": "contact", "contact_form": true}
        ]
    }"#;

    #[derive(Clone, Default)]
    struct Recorder(Rc<RefCell<Vec<TrackingEvent>>>);

    impl TrackingSink for Recorder {
        fn record(&mut self, event: &TrackingEvent) {
            self.0.borrow_mut().push(event.clone());
        }
    }

    fn area() -> Rect {
        Rect::new(0, 0, 100, 23)
    }

    fn booted_with(config: AppConfig) -> (AppState, Recorder) {
        let spec = PageSpec::from_json(PAGE).unwrap();
        let recorder = Recorder::default();
        let mut state = AppState::new(
            &spec,
            config,
            Box::new(MemoryStore::default()),
            vec![Box::new(recorder.clone())],
        );
        state.boot(area());
        (state, recorder)
    }

    fn booted() -> (AppState, Recorder) {
        booted_with(AppConfig::default())
    }

    fn run_frames(state: &mut AppState, from: Millis, to: Millis) {
        let mut t = from;
        while t <= to {
            state.frame(t);
            t += SCROLL_FRAME_BUDGET;
        }
    }

    #[test]
    fn layout_assumptions() {
        let (state, _) = booted();
        assert_eq!(state.viewport(), (800.0, 320.0));
        assert_eq!(state.page.document_height(), 656.0);
        assert_eq!(state.geometry().max_scroll(), 336.0);
        assert!(state.effects_on());
    }

    #[test]
    fn load_check_reveals_what_is_on_screen_with_stagger() {
        let (mut state, _) = booted();
        state.advance(0);
        assert!(!state.page.sections[0].revealed());
        assert!(!state.page.sections[0].visible);
        state.advance(999);
        assert!(!state.page.sections[0].visible);
        state.advance(1000);
        assert!(state.page.sections[0].visible);
        assert!(state.page.sections[1].revealed());
        assert!(!state.page.sections[1].visible);
        state.advance(1199);
        assert!(!state.page.sections[1].visible);
        state.advance(1200);
        assert!(state.page.sections[1].visible);
        assert!(!state.page.sections[2].revealed());
    }

    #[test]
    fn scrolling_before_the_load_check_reveals_early() {
        let (mut state, _) = booted();
        state.advance(100);
        state.scroll_to(16.0);
        state.advance(100);
        assert!(state.page.sections[0].visible);
        state.advance(300);
        assert!(state.page.sections[1].visible);
    }

    #[test]
    fn title_words_enter_one_by_one_after_load() {
        let spec = PageSpec::from_json(&PAGE.replace(r#""title": "T""#, r#""title": "Ada Love Lace""#)).unwrap();
        let mut state = AppState::new(&spec, AppConfig::default(), Box::new(MemoryStore::default()), Vec::new());
        state.boot(area());
        let shown = |s: &AppState| s.name.parts().filter(|(_, on)| *on).count();
        state.advance(999);
        assert_eq!(shown(&state), 0);
        state.advance(1000);
        assert_eq!(shown(&state), 1);
        state.advance(1199);
        assert_eq!(shown(&state), 2);
        state.advance(1200);
        assert!(state.name.is_complete());
    }

    #[test]
    fn carousel_cycles_with_gap() {
        let (mut state, _) = booted();
        assert_eq!(state.carousel.phase(), CarouselPhase::Running);
        state.advance(2999);
        assert_eq!(state.carousel.active(), Some(0));
        state.advance(3000);
        assert_eq!(state.carousel.active(), None);
        state.advance(3299);
        assert_eq!(state.carousel.active(), None);
        state.advance(3300);
        assert_eq!(state.carousel.active(), Some(1));
        state.advance(6300);
        assert_eq!(state.carousel.active(), Some(2));
        state.advance(9300);
        assert_eq!(state.carousel.active(), Some(0));
    }

    #[test]
    fn counters_finish_on_time_even_with_sparse_frames() {
        let (mut state, _) = booted();
        assert_eq!(state.stats.counters()[0].current(), 3);
        state.advance(1000);
        assert_eq!(state.stats.counters()[0].current(), 63);
        state.advance(2249);
        assert_eq!(state.stats.counters()[0].current(), 135);
        state.advance(2250);
        assert_eq!(state.stats.counters()[0].current(), 137);
        assert!(!state.stats.is_running());
    }

    #[test]
    fn skill_bar_fills_300ms_after_it_scrolls_into_view() {
        let (mut state, _) = booted();
        state.advance(1000);
        assert_eq!(state.skills.bars()[0].fill(), None);
        state.scroll_to(336.0);
        state.advance(1299);
        assert_eq!(state.skills.bars()[0].fill(), None);
        state.advance(1300);
        assert_eq!(state.skills.bars()[0].fill(), Some(90));
    }

    #[test]
    fn scroll_passes_are_throttled_with_trailing_run() {
        let (mut state, _) = booted();
        state.advance(1000);
        state.scroll_to(10.0);
        assert_eq!(state.scroll_state().scroll_y, 10.0);
        state.scroll_to(20.0);
        state.scroll_to(30.0);
        assert_eq!(state.scroll_state().scroll_y, 10.0);
        state.advance(1015);
        assert_eq!(state.scroll_state().scroll_y, 10.0);
        state.advance(1016);
        assert_eq!(state.scroll_state().scroll_y, 30.0);
    }

    #[test]
    fn fixed_delay_mode_fires_everything_after_load() {
        let config = AppConfig {
            visibility: VisibilityMode::FixedDelay,
            ..AppConfig::default()
        };
        let (mut state, _) = booted_with(config);
        state.advance(999);
        assert_eq!(state.carousel.phase(), CarouselPhase::Idle);
        assert!(!state.stats.is_triggered());
        state.advance(1000);
        assert_eq!(state.carousel.phase(), CarouselPhase::Running);
        assert!(state.stats.is_triggered());
        // far below the viewport, but the fallback does not care
        state.advance(1300);
        assert_eq!(state.skills.bars()[0].fill(), Some(90));
    }

    #[test]
    fn depth_milestones_fire_once_in_order() {
        let (mut state, recorder) = booted();
        let max = state.geometry().max_scroll();
        for (t, progress) in [(1000, 0.2), (2000, 0.3), (3000, 0.2), (4000, 0.3)] {
            state.advance(t);
            state.scroll_to(max * progress);
        }
        state.advance(5000);
        state.scroll_to(max);
        state.advance(10_000);
        let labels: Vec<String> = recorder
            .0
            .borrow()
            .iter()
            .filter(|e| e.action == "scroll_depth")
            .map(|e| e.label.clone())
            .collect();
        assert_eq!(labels, vec!["25%", "50%", "75%", "100%"]);
    }

    #[test]
    fn nav_click_smooth_scrolls_and_closes_menu() {
        let (mut state, recorder) = booted();
        state.toggle_menu();
        state.click_link("skills");
        assert!(!state.nav.menu_open());
        assert!(state.is_smooth_scrolling());
        run_frames(&mut state, 16, 3000);
        // 96 - 80 header offset
        assert_eq!(state.scroll_y(), 16.0);
        assert!(!state.is_smooth_scrolling());
        assert!(recorder.0.borrow().contains(&TrackingEvent::click("Skills")));
    }

    #[test]
    fn click_target_is_clamped_to_max_scroll() {
        let (mut state, _) = booted();
        state.click_link("contact");
        run_frames(&mut state, 16, 5000);
        assert_eq!(state.scroll_y(), 336.0);
    }

    #[test]
    fn user_scroll_cancels_smooth_scroll() {
        let (mut state, _) = booted();
        state.click_link("contact");
        state.frame(16);
        state.scroll_by(1.0);
        assert!(!state.is_smooth_scrolling());
    }

    #[test]
    fn resize_is_debounced_and_closes_menu_when_wide() {
        let (mut state, _) = booted();
        state.advance(1000);
        state.nav.toggle_menu();
        for t in [1000, 1100, 1200] {
            state.advance(t);
            state.resize(Rect::new(0, 0, 120, 23));
        }
        state.advance(1449);
        assert!(state.nav.menu_open());
        state.advance(1450);
        assert!(!state.nav.menu_open());
    }

    #[test]
    fn narrow_viewport_disables_effects() {
        let (mut state, _) = booted();
        state.resize(Rect::new(0, 0, 80, 23));
        state.advance(250);
        assert!(!state.effects_on());
        state.pointer_moved(10.0, 10.0);
        assert_eq!(state.follower.pointer, (0.0, 0.0));
    }

    #[test]
    fn theme_toggle_is_tracked() {
        let (mut state, recorder) = booted();
        assert_eq!(state.theme(), ThemePreference::Dark);
        state.toggle_theme();
        assert_eq!(state.theme(), ThemePreference::Light);
        assert!(recorder.0.borrow().contains(&TrackingEvent::click("theme")));
    }

    fn fill_form(state: &mut AppState) {
        state.focus_form();
        for (i, text) in ["Ada", "ada@example.com", "Hi there", "Hello, world"].into_iter().enumerate() {
            state.focus = Focus::Form(i);
            for c in text.chars() {
                state.form_type(c);
            }
        }
    }

    #[test]
    fn optimistic_submit_lifecycle() {
        let (mut state, _) = booted();
        state.advance(1000);
        fill_form(&mut state);
        state.form_submit();
        assert_eq!(state.outbox.len(), 1);
        assert_eq!(state.form.phase(), &FormPhase::Submitting);

        state.acknowledge(Err("connection refused".into()));
        state.advance(2999);
        assert_eq!(state.form.phase(), &FormPhase::Submitting);
        state.advance(3000);
        assert_eq!(state.form.phase(), &FormPhase::Sent);
        state.advance(7000);
        assert_eq!(state.form.phase(), &FormPhase::Resetting);
        state.advance(7300);
        assert_eq!(state.form.phase(), &FormPhase::Editing);
        assert!(state.form.fields().iter().all(|f| f.value().is_empty()));
    }

    #[test]
    fn invalid_submit_sends_nothing() {
        let (mut state, _) = booted();
        state.focus_form();
        state.form_type('A');
        state.form_submit();
        assert!(state.outbox.is_empty());
        assert_eq!(state.form.phase(), &FormPhase::Editing);
    }

    #[test]
    fn acknowledged_submit_waits_for_the_network() {
        let config = AppConfig {
            submit_policy: SubmitPolicy::Acknowledged,
            ..AppConfig::default()
        };
        let (mut state, _) = booted_with(config);
        fill_form(&mut state);
        state.form_submit();
        state.advance(10_000);
        assert_eq!(state.form.phase(), &FormPhase::Submitting);
        state.acknowledge(Err("HTTP 503".into()));
        assert_eq!(state.form.phase(), &FormPhase::Failed);
        assert_eq!(state.form.fields()[0].value(), "Ada");

        state.form_submit();
        state.acknowledge(Ok(()));
        assert_eq!(state.form.phase(), &FormPhase::Sent);
        state.advance(14_000);
        assert_eq!(state.form.phase(), &FormPhase::Resetting);
    }

    #[test]
    fn failed_resume_raises_a_notice_that_expires() {
        let (mut state, _) = booted();
        state.advance(100);
        state.open_resume(|_| anyhow::bail!("no opener"));
        assert_eq!(state.notices.latest().map(|n| n.text.as_str()), Some(RESUME_UNAVAILABLE));
        state.advance(5099);
        assert_eq!(state.notices.len(), 1);
        state.advance(5100);
        assert!(state.notices.is_empty());

        let mut opened = None;
        state.open_resume(|url| {
            opened = Some(url.to_string());
            Ok(())
        });
        assert_eq!(opened.as_deref(), Some("https://example.com/cv.pdf"));
        assert_eq!(state.notices.latest().map(|n| n.kind), Some(NoticeKind::Success));
    }

    #[test]
    fn filter_removes_cards_from_layout() {
        let (mut state, _) = booted();
        let height = state.page.document_height();
        state.cycle_filter();
        assert_eq!(state.filter.selected(), "web");
        let p1 = &state.page.sections[2].children[1];
        assert_eq!(p1.display, CardDisplay::FadingOut);
        state.advance(300);
        assert_eq!(state.page.sections[2].children[1].display, CardDisplay::Removed);
        assert_eq!(state.page.document_height(), height - 16.0);
        state.advance(400);
        assert_eq!(state.page.sections[2].children[0].display, CardDisplay::Shown);
    }

    #[test]
    fn typewriter_starts_after_load() {
        let (mut state, _) = booted();
        state.advance(2699);
        assert_eq!(state.typewriter.shown(state.now()), "");
        state.advance(2700 + 30 * 4);
        assert_eq!(state.typewriter.shown(state.now()), "Hello");
    }

    #[test]
    fn teardown_cancels_everything() {
        let (mut state, _) = booted();
        state.advance(10);
        assert!(state.pending_timers() > 0);
        assert!(state.teardown() > 0);
        assert_eq!(state.pending_timers(), 0);
        assert_eq!(state.carousel.phase(), CarouselPhase::Stopped);
        state.advance(100_000);
        assert_eq!(state.carousel.active(), Some(0));
        assert_eq!(state.pending_timers(), 0);
    }
}
