//! The minimap panel: event handling, render scheduling and paint.
//!
//! A panel is a cheap handle around shared state. The host keeps only a weak
//! listener, so dropping every handle (or calling [`GlancePanel::dispose`])
//! ends the subscription.

use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Weak};

use parking_lot::{Mutex, RwLock};

use crate::fold_layout::FoldLayout;
use crate::host::{EditorHost, EditorListener, ListenerId, MarkupHighlighter, MarkupKind, SelectionState};
use crate::overlay::{paint_markup, paint_selections, OverlayContext, OverlayStyle};
use crate::{
    Bitmap, DirtyLock, GlanceConfig, GlanceError, JobState, LockState, Minimap, Position, RayonExecutor, Rectangle, RenderExecutor, RenderJob, RenderOutcome,
    Result, ScrollState, ScrollbarState, Size,
};

/// Opacity of the minimap over the overlays beneath it.
pub const COMPOSITE_OPACITY: f32 = 0.8;

/// Counters over the panel's lifetime.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct RenderStats {
    pub scheduled: usize,
    pub completed: usize,
    pub canceled: usize,
    /// Highest number of passes ever running at once.
    pub max_concurrent: usize,
}

struct PanelShared {
    host: Arc<dyn EditorHost>,
    executor: Arc<dyn RenderExecutor>,
    config: RwLock<GlanceConfig>,
    style: RwLock<OverlayStyle>,
    render_lock: DirtyLock,
    scroll_state: RwLock<ScrollState>,
    minimap: RwLock<Minimap>,
    /// Last composed minimap slice, reused while a pass is in flight.
    composed: Mutex<Option<Bitmap>>,
    scrollbar: Mutex<ScrollbarState>,
    current_job: Mutex<Option<RenderJob>>,
    next_job_id: AtomicU64,
    listener: Mutex<Option<ListenerId>>,
    preferred_size: RwLock<Size>,
    fault: Mutex<Option<String>>,
    disposed: AtomicBool,
    running: AtomicUsize,
    stats: Mutex<RenderStats>,
}

#[derive(Clone)]
pub struct GlancePanel {
    shared: Arc<PanelShared>,
}

struct PanelListener {
    shared: Weak<PanelShared>,
}

impl GlancePanel {
    /// Creates a panel, subscribes it to `host` and schedules the first render.
    pub fn new(host: Arc<dyn EditorHost>, mut config: GlanceConfig, executor: Arc<dyn RenderExecutor>) -> Self {
        config.validate();
        let shared = Arc::new(PanelShared {
            host,
            executor,
            config: RwLock::new(config),
            style: RwLock::new(OverlayStyle::default()),
            render_lock: DirtyLock::new(),
            scroll_state: RwLock::new(ScrollState::new()),
            minimap: RwLock::new(Minimap::new()),
            composed: Mutex::new(None),
            scrollbar: Mutex::new(ScrollbarState::new()),
            current_job: Mutex::new(None),
            next_job_id: AtomicU64::new(1),
            listener: Mutex::new(None),
            preferred_size: RwLock::new(Size::ZERO),
            fault: Mutex::new(None),
            disposed: AtomicBool::new(false),
            running: AtomicUsize::new(0),
            stats: Mutex::new(RenderStats::default()),
        });

        let listener = Arc::new(PanelListener {
            shared: Arc::downgrade(&shared),
        });
        *shared.listener.lock() = Some(shared.host.subscribe(listener));

        let panel = Self { shared };
        panel.shared.refresh();
        panel
    }

    /// Creates a panel rendering on its own rayon pool of `config.render_threads`.
    ///
    /// # Errors
    ///
    /// Returns an error if the thread pool cannot be built.
    pub fn with_thread_pool(host: Arc<dyn EditorHost>, config: GlanceConfig) -> Result<Self> {
        let executor = RayonExecutor::new(config.render_threads)?;
        Ok(Self::new(host, config, Arc::new(executor)))
    }

    pub fn config(&self) -> GlanceConfig {
        self.shared.config.read().clone()
    }

    pub fn preferred_size(&self) -> Size {
        *self.shared.preferred_size.read()
    }

    pub fn scroll_state(&self) -> ScrollState {
        self.shared.scroll_state.read().clone()
    }

    pub fn render_stats(&self) -> RenderStats {
        *self.shared.stats.lock()
    }

    pub fn lock_state(&self) -> LockState {
        self.shared.render_lock.state()
    }

    pub fn current_job_state(&self) -> Option<JobState> {
        self.shared.current_job.lock().as_ref().map(RenderJob::state)
    }

    /// Message of the fault that collapsed the panel, if any.
    pub fn fault(&self) -> Option<String> {
        self.shared.fault.lock().clone()
    }

    pub fn is_disposed(&self) -> bool {
        self.shared.disposed.load(Ordering::Acquire)
    }

    pub fn is_disabled(&self) -> bool {
        self.shared.is_disabled()
    }

    pub fn set_overlay_style(&self, style: OverlayStyle) {
        *self.shared.style.write() = style;
        self.shared.host.request_repaint();
    }

    /// Recomputes geometry and size, then schedules a render.
    pub fn refresh(&self) {
        self.shared.refresh();
    }

    pub fn on_config_changed(&self, mut config: GlanceConfig) {
        config.validate();
        *self.shared.config.write() = config;
        *self.shared.fault.lock() = None;
        self.shared.refresh();
    }

    /// Runs a render pass if none is in flight, otherwise marks the running one stale.
    pub fn update_image(&self) {
        self.shared.update_image();
    }

    /// Composes the panel into `target`, whose size is the panel size.
    ///
    /// # Errors
    ///
    /// Fails when the rendered bitmap is inconsistent or the composition
    /// buffer cannot be allocated. The panel collapses to zero size.
    pub fn paint(&self, target: &mut Bitmap) -> Result<()> {
        self.shared.paint(target)
    }

    /// Unsubscribes from the host, cancels the pass in flight and drops the
    /// rendered bitmaps.
    pub fn dispose(&self) {
        let shared = &self.shared;
        if shared.disposed.swap(true, Ordering::AcqRel) {
            return;
        }
        if let Some(job) = shared.current_job.lock().as_ref() {
            job.cancel();
        }
        if let Some(id) = shared.listener.lock().take() {
            shared.host.unsubscribe(id);
        }
        *shared.preferred_size.write() = Size::ZERO;
        // a running pass still holds the minimap; it releases it when it stops
        shared.release_buffers();
        log::debug!("glance panel: disposed");
    }

    pub fn mouse_pressed(&self, y: i32) {
        let config = self.shared.config.read().clone();
        let scroll_state = self.scroll_state();
        let target = self.shared.scrollbar.lock().mouse_pressed(y, &scroll_state, &config);
        if let Some(offset) = target {
            self.shared.host.scroll_to(offset);
        }
        self.shared.host.request_repaint();
    }

    pub fn mouse_moved(&self, y: i32) {
        let width = self.shared.config.read().width;
        let scroll_state = self.scroll_state();
        let target = self.shared.scrollbar.lock().mouse_moved(y, &scroll_state, width);
        if let Some(offset) = target {
            self.shared.host.scroll_to(offset);
        }
        self.shared.host.request_repaint();
    }

    pub fn mouse_released(&self) {
        self.shared.scrollbar.lock().mouse_released();
        self.shared.host.request_repaint();
    }

    pub fn mouse_exited(&self) {
        self.shared.scrollbar.lock().mouse_exited();
        self.shared.host.request_repaint();
    }

    pub fn mouse_wheel(&self, delta_y: i32) {
        let offset = self.shared.scrollbar.lock().mouse_wheel(delta_y, &self.scroll_state());
        self.shared.host.scroll_to(offset);
    }
}

impl PanelShared {
    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire) || self.host.is_disposed()
    }

    fn is_disabled(&self) -> bool {
        if self.is_disposed() || self.fault.lock().is_some() {
            return true;
        }
        let config = self.config.read();
        if config.disabled {
            return true;
        }
        let text = self.host.text();
        if text.len() > config.max_document_length || text.line_count() < config.min_line_count {
            return true;
        }
        let container = self.host.container_width();
        container == 0 || container < config.min_window_width
    }

    fn update_size(&self) {
        let size = if self.is_disabled() {
            Size::ZERO
        } else {
            Size::new(self.config.read().width, 0)
        };
        *self.preferred_size.write() = size;
    }

    fn update_geometry(&self) {
        let config = self.config.read().clone();
        let text = self.host.text();
        let layout = FoldLayout::new(&text, &self.host.fold_regions());
        let mut scroll_state = self.scroll_state.write();
        scroll_state.compute_dimensions(layout.visual_line_count(&text), self.host.line_height(), &config);
        scroll_state.recompute_visible(self.host.visible_area());
    }

    fn refresh(self: &Arc<Self>) {
        if self.is_disposed() {
            return;
        }
        self.update_geometry();
        self.update_size();
        self.update_image();
        self.host.request_repaint();
    }

    fn update_image(self: &Arc<Self>) {
        if self.is_disabled() {
            return;
        }
        if !self.render_lock.acquire() {
            return;
        }
        self.schedule();
    }

    fn schedule(self: &Arc<Self>) {
        let job = RenderJob::new(self.next_job_id.fetch_add(1, Ordering::Relaxed));
        *self.current_job.lock() = Some(job.clone());
        self.stats.lock().scheduled += 1;
        log::debug!("glance panel: scheduling render {}", job.id());

        let shared = Arc::clone(self);
        self.executor.spawn(Box::new(move || shared.run_job(job)));
    }

    fn run_job(self: &Arc<Self>, job: RenderJob) {
        if self.is_disposed() {
            job.finish(false);
            self.release_gate();
            return;
        }
        if !job.start() {
            self.on_canceled(&job);
            return;
        }

        let running = self.running.fetch_add(1, Ordering::AcqRel) + 1;
        {
            let mut stats = self.stats.lock();
            stats.max_concurrent = stats.max_concurrent.max(running);
        }

        let config = self.config.read().clone();
        let scroll_state = self.scroll_state.read().clone();
        let result = self.minimap.write().render(self.host.as_ref(), &config, &scroll_state, job.token());
        self.running.fetch_sub(1, Ordering::AcqRel);

        match result {
            Ok(RenderOutcome::Canceled) => self.on_canceled(&job),
            Ok(outcome) => {
                job.finish(true);
                self.stats.lock().completed += 1;
                log::debug!("glance panel: render {} finished ({outcome:?})", job.id());
                let rerender = self.render_lock.finish();
                if self.is_disposed() {
                    self.release_buffers();
                    return;
                }
                if rerender {
                    self.update_image();
                }
                self.host.request_repaint();
            }
            Err(err) => {
                job.finish(false);
                self.release_gate();
                if err.is_fatal() {
                    self.set_fault(&err);
                } else {
                    log::warn!("glance panel: render {} failed: {err}", job.id());
                }
            }
        }
    }

    fn on_canceled(self: &Arc<Self>, job: &RenderJob) {
        job.finish(false);
        self.stats.lock().canceled += 1;
        log::debug!("glance panel: render {} canceled", job.id());
        if self.is_disabled() {
            self.release_gate();
            return;
        }
        // the bitmap is partial: hand the held gate straight to the next pass
        self.render_lock.clean();
        self.schedule();
    }

    fn release_gate(&self) {
        self.render_lock.release();
        self.render_lock.clean();
        if self.is_disposed() {
            self.release_buffers();
        }
    }

    fn release_buffers(&self) {
        *self.composed.lock() = None;
        if let Some(mut minimap) = self.minimap.try_write() {
            minimap.release();
        }
    }

    fn set_fault(&self, err: &GlanceError) {
        log::error!("glance panel: {err}, collapsing panel");
        *self.fault.lock() = Some(err.to_string());
        *self.preferred_size.write() = Size::ZERO;
        self.host.request_repaint();
    }

    fn cancel_in_flight(&self) {
        if let Some(job) = self.current_job.lock().as_ref() {
            if matches!(job.state(), JobState::Queued | JobState::Running) {
                job.cancel();
            }
        }
    }

    fn paint(&self, target: &mut Bitmap) -> Result<()> {
        if self.is_disabled() {
            return Ok(());
        }
        let config = self.config.read().clone();
        let style = *self.style.read();
        let scroll_state = self.scroll_state.read().clone();
        let text = self.host.text();
        let layout = FoldLayout::new(&text, &self.host.fold_regions());
        let selection = self.host.selection();
        let markup = self.host.highlighters_overlapping(0, text.len());
        let ctx = OverlayContext {
            text: &text,
            layout: &layout,
            pixels_per_line: config.pixels_per_line,
            width: config.width,
            visible_start: scroll_state.visible_start,
        };

        let minimap = if self.render_lock.locked() { None } else { self.minimap.try_read() };
        let Some(minimap) = minimap else {
            // pass in flight: previous frame over live overlays
            paint_overlays(target, &ctx, &markup, &selection, &style);
            if let Some(buf) = self.composed.lock().as_ref() {
                buf.composite_onto(target, Position::default(), COMPOSITE_OPACITY);
            }
            self.scrollbar.lock().paint(target, &scroll_state, &config);
            return Ok(());
        };

        let bitmap = minimap.bitmap();
        if let Err(err) = bitmap.check_layout() {
            self.set_fault(&err);
            return Err(err);
        }

        let mut composed = self.composed.lock();
        let buf = match composed.take() {
            Some(mut buf) if buf.fits(target.width(), target.height()) => {
                buf.clear();
                buf
            }
            _ => match Bitmap::new(target.width(), target.height()) {
                Ok(buf) => buf,
                Err(err) => {
                    self.set_fault(&err);
                    return Err(err);
                }
            },
        };
        let buf = composed.insert(buf);
        if !text.is_empty() {
            buf.draw_image(
                bitmap,
                Rectangle::from(0, scroll_state.visible_start, scroll_state.document_width, scroll_state.visible_end - scroll_state.visible_start),
                Rectangle::from(0, 0, scroll_state.document_width, scroll_state.draw_height),
            );
        }
        drop(minimap);

        paint_overlays(target, &ctx, &markup, &selection, &style);
        buf.composite_onto(target, Position::default(), COMPOSITE_OPACITY);
        self.scrollbar.lock().paint(target, &scroll_state, &config);
        Ok(())
    }

    fn document_changed(self: &Arc<Self>) {
        if self.is_disposed() {
            return;
        }
        self.cancel_in_flight();
        self.refresh();
    }

    fn fold_changed(self: &Arc<Self>) {
        self.refresh();
    }

    fn visible_area_changed(&self, area: Rectangle) {
        if self.is_disposed() {
            return;
        }
        self.scroll_state.write().recompute_visible(area);
        self.host.request_repaint();
    }

    fn selection_changed(&self) {
        if !self.is_disposed() {
            self.host.request_repaint();
        }
    }

    fn component_resized(self: &Arc<Self>) {
        self.refresh();
    }
}

fn paint_overlays(target: &mut Bitmap, ctx: &OverlayContext<'_>, markup: &[MarkupHighlighter], selection: &SelectionState, style: &OverlayStyle) {
    paint_markup(target, ctx, markup, MarkupKind::Vcs);
    paint_selections(target, ctx, selection, style);
    paint_markup(target, ctx, markup, MarkupKind::Other);
    paint_markup(target, ctx, markup, MarkupKind::ErrorStripe);
}

impl Drop for PanelShared {
    fn drop(&mut self) {
        if let Some(id) = self.listener.get_mut().take() {
            self.host.unsubscribe(id);
        }
    }
}

impl EditorListener for GlancePanel {
    fn document_changed(&self) {
        self.shared.document_changed();
    }

    fn fold_changed(&self) {
        self.shared.fold_changed();
    }

    fn visible_area_changed(&self, area: Rectangle) {
        self.shared.visible_area_changed(area);
    }

    fn selection_changed(&self) {
        self.shared.selection_changed();
    }

    fn component_resized(&self) {
        self.shared.component_resized();
    }
}

impl EditorListener for PanelListener {
    fn document_changed(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.document_changed();
        }
    }

    fn fold_changed(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.fold_changed();
        }
    }

    fn visible_area_changed(&self, area: Rectangle) {
        if let Some(shared) = self.shared.upgrade() {
            shared.visible_area_changed(area);
        }
    }

    fn selection_changed(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.selection_changed();
        }
    }

    fn component_resized(&self) {
        if let Some(shared) = self.shared.upgrade() {
            shared.component_resized();
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::host::memory::MemoryEditor;
    use crate::QueuedExecutor;

    fn lines(count: usize) -> String {
        (0..count).map(|i| format!("let value_{i} = {i};")).collect::<Vec<_>>().join("\n")
    }

    fn bitmap_len(panel: &GlancePanel) -> usize {
        panel.shared.minimap.read().bitmap().pixels().len()
    }

    #[test]
    fn test_dispose_drops_bitmaps() {
        let editor = Arc::new(MemoryEditor::new(&lines(50)));
        let executor = Arc::new(QueuedExecutor::new());
        let panel = GlancePanel::new(editor, GlanceConfig::default(), executor.clone());
        executor.run_pending();
        let mut target = Bitmap::new(110, 300).unwrap();
        panel.paint(&mut target).unwrap();
        assert!(bitmap_len(&panel) > 0);
        assert!(panel.shared.composed.lock().is_some());

        panel.dispose();
        assert_eq!(bitmap_len(&panel), 0);
        assert!(panel.shared.composed.lock().is_none());
    }

    #[test]
    fn test_dispose_during_pass_drops_bitmap_when_pass_stops() {
        let editor = Arc::new(MemoryEditor::new(&lines(50)));
        let executor = Arc::new(QueuedExecutor::new());
        let panel = GlancePanel::new(editor.clone(), GlanceConfig::default(), executor.clone());
        executor.run_pending();

        editor.edit(&lines(60));
        {
            // hold the minimap as a running pass would
            let _pass = panel.shared.minimap.write();
            panel.dispose();
        }
        assert!(bitmap_len(&panel) > 0);
        executor.run_pending();
        assert_eq!(bitmap_len(&panel), 0);
        assert_eq!(panel.lock_state(), LockState::Idle);
    }
}
