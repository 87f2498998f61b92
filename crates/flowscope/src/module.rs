//! The module adapter fed by an upstream dataflow.
//!
//! Messages carry one or more objects; bare geometries are accepted and
//! wrapped into meshes with the default material. A message that breaks the
//! contract is rejected whole and the scene keeps its previous content.

use std::sync::Arc;
use std::time::Instant;

use flowscope_core::{FlowscopeError, Geometry, Material, Object3D, Result, ViewerConfig};
use flowscope_render::{EventResponse, InputEvent, Platform, ViewportId};

use crate::journal::Journal;
use crate::state::ViewerState;
use crate::view::ViewerView;

/// Title of the journal page written by each render.
pub const RENDER_PAGE_TITLE: &str = "render";

/// One value delivered on the module input.
#[derive(Debug, Clone)]
pub enum InputItem {
    Object(Object3D),
    Geometry(Arc<Geometry>),
}

impl From<Object3D> for InputItem {
    fn from(object: Object3D) -> Self {
        Self::Object(object)
    }
}

impl From<Geometry> for InputItem {
    fn from(geometry: Geometry) -> Self {
        Self::Geometry(Arc::new(geometry))
    }
}

impl From<Arc<Geometry>> for InputItem {
    fn from(geometry: Arc<Geometry>) -> Self {
        Self::Geometry(geometry)
    }
}

/// A message on the module input.
#[derive(Debug, Clone, Default)]
pub struct InputMessage {
    pub objects: Vec<InputItem>,
}

impl InputMessage {
    pub fn new<I, T>(items: I) -> Self
    where
        I: IntoIterator<Item = T>,
        T: Into<InputItem>,
    {
        Self {
            objects: items.into_iter().map(Into::into).collect(),
        }
    }

    /// Checks the input contract and normalizes every item into an object.
    pub fn resolve(self) -> Result<Vec<Object3D>> {
        if self.objects.is_empty() {
            return Err(FlowscopeError::ContractViolation(
                "expected one or more objects".into(),
            ));
        }
        self.objects
            .into_iter()
            .enumerate()
            .map(|(index, item)| match item {
                InputItem::Object(object) => Ok(object),
                InputItem::Geometry(geometry) if geometry.is_empty() => {
                    Err(FlowscopeError::ContractViolation(format!(
                        "item {index}: geometry has no triangles"
                    )))
                }
                InputItem::Geometry(geometry) => {
                    Ok(Object3D::mesh(geometry, Material::default_mesh()))
                }
            })
            .collect()
    }
}

/// A viewer node: configuration, state, view and journal.
#[derive(Debug)]
pub struct ViewerModule<P: Platform> {
    config: ViewerConfig,
    state: ViewerState<P>,
    view: ViewerView,
    journal: Journal,
}

impl<P: Platform> ViewerModule<P> {
    pub fn new(config: ViewerConfig, platform: P) -> Self {
        let state = ViewerState::new(&config, platform);
        Self {
            config,
            state,
            view: ViewerView::new(),
            journal: Journal::new(),
        }
    }

    pub fn config(&self) -> &ViewerConfig {
        &self.config
    }

    pub fn state(&self) -> &ViewerState<P> {
        &self.state
    }

    pub fn state_mut(&mut self) -> &mut ViewerState<P> {
        &mut self.state
    }

    pub fn view(&self) -> &ViewerView {
        &self.view
    }

    pub fn journal(&self) -> &Journal {
        &self.journal
    }

    /// Handles one input message: resolves it and renders the result.
    pub fn process(&mut self, message: InputMessage) -> Result<()> {
        let objects = message.resolve().inspect_err(|e| {
            log::warn!("input rejected: {e}");
        })?;
        let page = self.journal.add_page(RENDER_PAGE_TITLE);
        self.state.render(objects, page);
        Ok(())
    }

    pub fn connected(&mut self, viewport: ViewportId) {
        self.view.connected(viewport);
    }

    pub fn disconnected(&mut self, viewport: ViewportId) -> bool {
        self.view.disconnected(&mut self.state, viewport)
    }

    pub fn flush_deferred(&mut self) -> usize {
        self.view.flush_deferred(&mut self.state)
    }

    pub fn dispatch_input(
        &mut self,
        viewport: ViewportId,
        event: &InputEvent,
        at: Instant,
    ) -> EventResponse {
        self.view.dispatch(&mut self.state, viewport, event, at)
    }
}
