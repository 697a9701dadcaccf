//! In-memory editor host.
//!
//! Backs embedders that keep their own model outside a real editor, and the
//! tests and benchmarks of this crate.

use std::collections::HashMap;
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::Arc;

use parking_lot::RwLock;

use super::{
    EditorHost, EditorListener, FoldRegion, FoldingModel, HighlightToken, Highlighter, ListenerId, MarkupHighlighter, MarkupModel, SelectionModel,
    SelectionState, TextBuffer, TextSnapshot, ViewportModel,
};
use crate::{Color, Rectangle};

struct EditorState {
    text: TextSnapshot,
    tokens: Option<Vec<HighlightToken>>,
    folds: Vec<FoldRegion>,
    markup: Vec<MarkupHighlighter>,
    visible_area: Rectangle,
    line_height: i32,
    container_width: i32,
    selection: SelectionState,
    default_foreground: Color,
}

pub struct MemoryEditor {
    state: RwLock<EditorState>,
    listeners: RwLock<HashMap<ListenerId, Arc<dyn EditorListener>>>,
    next_listener: AtomicU64,
    stamp: AtomicU64,
    repaints: AtomicUsize,
    scrolled_to: RwLock<Option<i32>>,
    disposed: AtomicBool,
}

impl MemoryEditor {
    pub fn new(text: &str) -> Self {
        Self {
            state: RwLock::new(EditorState {
                text: TextSnapshot::new(text, 1),
                tokens: None,
                folds: Vec::new(),
                markup: Vec::new(),
                visible_area: Rectangle::from(0, 0, 800, 600),
                line_height: 16,
                container_width: 1024,
                selection: SelectionState::default(),
                default_foreground: Color::new(0xA9, 0xB7, 0xC6),
            }),
            listeners: RwLock::new(HashMap::new()),
            next_listener: AtomicU64::new(1),
            stamp: AtomicU64::new(1),
            repaints: AtomicUsize::new(0),
            scrolled_to: RwLock::new(None),
            disposed: AtomicBool::new(false),
        }
    }

    /// Replaces the text without notifying listeners. Explicit tokens are
    /// kept, so they may now be stale.
    pub fn replace_text(&self, text: &str) {
        let stamp = self.stamp.fetch_add(1, Ordering::AcqRel) + 1;
        self.state.write().text = TextSnapshot::new(text, stamp);
    }

    /// Replaces the text, drops explicit tokens and notifies listeners.
    pub fn edit(&self, text: &str) {
        self.replace_text(text);
        self.state.write().tokens = None;
        self.fire(|l| l.document_changed());
    }

    pub fn set_tokens(&self, tokens: Vec<HighlightToken>) {
        self.state.write().tokens = Some(tokens);
    }

    pub fn set_folds(&self, folds: Vec<FoldRegion>) {
        self.state.write().folds = folds;
        self.fire(|l| l.fold_changed());
    }

    pub fn set_markup(&self, markup: Vec<MarkupHighlighter>) {
        self.state.write().markup = markup;
    }

    pub fn set_selection(&self, selection: SelectionState) {
        self.state.write().selection = selection;
        self.fire(|l| l.selection_changed());
    }

    pub fn set_visible_area(&self, area: Rectangle) {
        self.state.write().visible_area = area;
        self.fire(|l| l.visible_area_changed(area));
    }

    pub fn set_line_height(&self, line_height: i32) {
        self.state.write().line_height = line_height.max(1);
    }

    pub fn set_container_width(&self, width: i32) {
        self.state.write().container_width = width;
        self.fire(|l| l.component_resized());
    }

    pub fn set_default_foreground(&self, color: Color) {
        self.state.write().default_foreground = color;
    }

    pub fn dispose(&self) {
        self.disposed.store(true, Ordering::Release);
    }

    pub fn repaint_count(&self) -> usize {
        self.repaints.load(Ordering::Acquire)
    }

    pub fn listener_count(&self) -> usize {
        self.listeners.read().len()
    }

    /// Last offset passed to [`ViewportModel::scroll_to`].
    pub fn scrolled_to(&self) -> Option<i32> {
        *self.scrolled_to.read()
    }

    fn fire(&self, event: impl Fn(&dyn EditorListener)) {
        let listeners: Vec<_> = self.listeners.read().values().cloned().collect();
        for listener in listeners {
            event(listener.as_ref());
        }
    }
}

impl TextBuffer for MemoryEditor {
    fn text(&self) -> TextSnapshot {
        self.state.read().text.clone()
    }
}

impl Highlighter for MemoryEditor {
    fn tokens(&self, from: usize) -> Box<dyn Iterator<Item = HighlightToken> + '_> {
        let state = self.state.read();
        let tokens = match &state.tokens {
            Some(tokens) => tokens.iter().filter(|t| t.end_offset > from).copied().collect(),
            None if state.text.is_empty() => Vec::new(),
            None => vec![HighlightToken::new(0..state.text.len(), None)],
        };
        Box::new(tokens.into_iter())
    }

    fn default_foreground(&self) -> Color {
        self.state.read().default_foreground
    }
}

impl FoldingModel for MemoryEditor {
    fn fold_regions(&self) -> Vec<FoldRegion> {
        self.state.read().folds.clone()
    }
}

impl MarkupModel for MemoryEditor {
    fn highlighters_overlapping(&self, start: usize, end: usize) -> Vec<MarkupHighlighter> {
        self.state.read().markup.iter().filter(|h| h.overlaps(start, end)).cloned().collect()
    }
}

impl ViewportModel for MemoryEditor {
    fn visible_area(&self) -> Rectangle {
        self.state.read().visible_area
    }

    fn line_height(&self) -> i32 {
        self.state.read().line_height
    }

    fn container_width(&self) -> i32 {
        self.state.read().container_width
    }

    fn scroll_to(&self, y: i32) {
        *self.scrolled_to.write() = Some(y);
        let area = {
            let mut state = self.state.write();
            state.visible_area.start.y = y.max(0);
            state.visible_area
        };
        self.fire(|l| l.visible_area_changed(area));
    }
}

impl SelectionModel for MemoryEditor {
    fn selection(&self) -> SelectionState {
        self.state.read().selection.clone()
    }
}

impl EditorHost for MemoryEditor {
    fn subscribe(&self, listener: Arc<dyn EditorListener>) -> ListenerId {
        let id = ListenerId(self.next_listener.fetch_add(1, Ordering::AcqRel));
        self.listeners.write().insert(id, listener);
        id
    }

    fn unsubscribe(&self, id: ListenerId) {
        self.listeners.write().remove(&id);
    }

    fn request_repaint(&self) {
        self.repaints.fetch_add(1, Ordering::AcqRel);
    }

    fn is_disposed(&self) -> bool {
        self.disposed.load(Ordering::Acquire)
    }
}
