use alloc::sync::Arc;

use virtual_dnd::{AutoScrollConfig, DragSessionOptions, PlaceholderOptions};

use crate::DragEvent;

/// A callback fired for every drag lifecycle event.
pub type OnDragEvent<K, L, D> = Arc<dyn Fn(&DragEvent<K, L, D>) + Send + Sync>;

/// Configuration for [`crate::DndController`].
pub struct DndOptions<K, L, D = ()> {
    pub session: DragSessionOptions,
    pub placeholder: PlaceholderOptions,
    pub on_event: Option<OnDragEvent<K, L, D>>,
}

impl<K, L, D> DndOptions<K, L, D> {
    pub fn new() -> Self {
        Self {
            session: DragSessionOptions::default(),
            placeholder: PlaceholderOptions::default(),
            on_event: None,
        }
    }

    pub fn with_session(mut self, session: DragSessionOptions) -> Self {
        self.session = session;
        self
    }

    pub fn with_placeholder(mut self, placeholder: PlaceholderOptions) -> Self {
        self.placeholder = placeholder;
        self
    }

    pub fn with_on_event(
        mut self,
        on_event: Option<impl Fn(&DragEvent<K, L, D>) + Send + Sync + 'static>,
    ) -> Self {
        self.on_event = on_event.map(|f| Arc::new(f) as _);
        self
    }
}

impl<K, L, D> Default for DndOptions<K, L, D> {
    fn default() -> Self {
        Self::new()
    }
}

impl<K, L, D> Clone for DndOptions<K, L, D> {
    fn clone(&self) -> Self {
        Self {
            session: self.session,
            placeholder: self.placeholder,
            on_event: self.on_event.clone(),
        }
    }
}

impl<K, L, D> core::fmt::Debug for DndOptions<K, L, D> {
    fn fmt(&self, f: &mut core::fmt::Formatter<'_>) -> core::fmt::Result {
        f.debug_struct("DndOptions")
            .field("session", &self.session)
            .field("placeholder", &self.placeholder)
            .field("on_event", &self.on_event.is_some())
            .finish()
    }
}

/// Per-list registration settings.
#[derive(Clone, Copy, Debug, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct ListConfig {
    /// Keep the preview and the cursor inside the list container while dragging over it.
    pub constrain_to_container: bool,
    /// `None` registers the container without edge scrolling.
    pub auto_scroll: Option<AutoScrollConfig>,
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            constrain_to_container: false,
            auto_scroll: Some(AutoScrollConfig::default()),
        }
    }
}

impl ListConfig {
    pub fn with_constrain_to_container(mut self, constrain: bool) -> Self {
        self.constrain_to_container = constrain;
        self
    }

    pub fn with_auto_scroll(mut self, auto_scroll: Option<AutoScrollConfig>) -> Self {
        self.auto_scroll = auto_scroll;
        self
    }

    pub(crate) fn scroll_config(&self) -> AutoScrollConfig {
        self.auto_scroll
            .unwrap_or_else(|| AutoScrollConfig::default().with_threshold(0.0))
    }
}
