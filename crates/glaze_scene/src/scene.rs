//! The scene: element arena, nesting, and render scheduling.

use std::sync::Arc;

use slotmap::SlotMap;

use glaze_core::{ControlParams, EngineConfig, LivenessToken, Point, Rect};
use glaze_gpu::{
    FrameInfo, GlassRenderer, GlassUniforms, RenderSource, SurfaceGeometry,
};
use glaze_snapshot::{Bitmap, Snapshot, SnapshotService};

use crate::element::{ElementId, ElementKind, GlassElement};
use crate::error::SceneError;
use crate::options::{ButtonOptions, ContainerOptions, ReadyCallback};
use crate::probe::ContentProbe;

/// Where a planned draw samples its backdrop from.
enum PlanSource {
    /// The shared page snapshot at a capture generation
    Page(u64),
    /// The parent element's already-rendered target
    Parent(ElementId),
}

struct RenderPlan {
    id: ElementId,
    source: PlanSource,
    geometry: SurfaceGeometry,
}

/// In-flight mount: the capture half of element initialization.
///
/// `begin_mount` hands this out so the capture can run without
/// borrowing the scene; `complete_mount` applies the outcome, and the
/// liveness token quietly discards it if the element was destroyed in
/// the meantime.
pub struct MountTicket {
    id: ElementId,
    token: LivenessToken,
    service: Arc<SnapshotService>,
    region: Option<Rect>,
}

impl MountTicket {
    pub fn element(&self) -> ElementId {
        self.id
    }

    /// Perform the capture. Failures degrade to an absent snapshot; the
    /// element renders transparent rather than erroring into the host.
    pub async fn capture(self) -> MountOutcome {
        let result = match self.region {
            Some(region) => self.service.capture_region(region).await,
            None => self.service.capture().await,
        };
        let snapshot = match result {
            Ok(snapshot) => Some(snapshot),
            Err(e) => {
                tracing::warn!("mount capture failed, degrading to transparent: {e}");
                None
            }
        };
        MountOutcome {
            id: self.id,
            token: self.token,
            snapshot,
        }
    }
}

/// Resolved capture, to be applied with [`Scene::complete_mount`].
pub struct MountOutcome {
    id: ElementId,
    token: LivenessToken,
    snapshot: Option<Arc<Snapshot>>,
}

/// A scene of glass elements over one snapshot service.
pub struct Scene {
    elements: SlotMap<ElementId, GlassElement>,
    /// Creation order; render traversal visits roots in this order
    order: Vec<ElementId>,
    renderer: Option<GlassRenderer>,
    snapshots: Arc<SnapshotService>,
    config: EngineConfig,
}

impl Scene {
    pub fn new(snapshots: Arc<SnapshotService>, config: EngineConfig) -> Self {
        Self {
            elements: SlotMap::with_key(),
            order: Vec::new(),
            renderer: None,
            snapshots,
            config,
        }
    }

    /// Attach the GPU renderer. A scene without one still tracks
    /// geometry and state (headless hosts, tests).
    pub fn attach_renderer(&mut self, renderer: GlassRenderer) {
        self.renderer = Some(renderer);
    }

    pub fn renderer(&self) -> Option<&GlassRenderer> {
        self.renderer.as_ref()
    }

    pub fn snapshot_service(&self) -> &Arc<SnapshotService> {
        &self.snapshots
    }

    pub fn config(&self) -> &EngineConfig {
        &self.config
    }

    pub fn element(&self, id: ElementId) -> Option<&GlassElement> {
        self.elements.get(id)
    }

    pub fn len(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    // ------------------------------------------------------------------
    // Creation
    // ------------------------------------------------------------------

    /// Create a container wrapping arbitrary host content.
    pub fn create_container(&mut self, options: ContainerOptions) -> Result<ElementId, SceneError> {
        self.check_capacity()?;
        let params = options.resolved_params();
        let kind = ElementKind::Container {
            background: options.background,
            capture_region: options.capture_region,
        };
        let element = GlassElement::new(kind, options.shape, params, options.on_ready);
        Ok(self.insert(element))
    }

    /// Create a button sized to fit its label.
    pub fn create_button(&mut self, options: ButtonOptions) -> Result<ElementId, SceneError> {
        self.check_capacity()?;
        options.validate()?;
        let params = options.resolved_params();
        let kind = ElementKind::Button {
            label: options.text.clone(),
            font_size: options.size,
            warp_enabled: options.warp,
            on_click: options.on_click.clone(),
            warp: 0.0,
            press: Point::ZERO,
        };
        let mut element = GlassElement::new(kind, options.shape, params, options.on_ready);
        element.size = GlassElement::intrinsic_button_size(&options.text, options.size);
        element.physical_size = element.size.to_physical(self.config.scale_factor);
        Ok(self.insert(element))
    }

    fn check_capacity(&self) -> Result<(), SceneError> {
        if self.elements.len() >= self.config.max_elements {
            return Err(SceneError::TooManyElements {
                cap: self.config.max_elements,
            });
        }
        Ok(())
    }

    fn insert(&mut self, element: GlassElement) -> ElementId {
        let id = self.elements.insert(element);
        self.order.push(id);
        id
    }

    // ------------------------------------------------------------------
    // Host-driven state
    // ------------------------------------------------------------------

    /// Replace an element's control parameters. Out-of-range fields are
    /// clamped, never rejected.
    pub fn apply_effect(&mut self, id: ElementId, params: ControlParams) -> Result<(), SceneError> {
        let element = self.elements.get_mut(id).ok_or(SceneError::UnknownElement)?;
        element.params = params.clamped();
        element.dirty = true;
        Ok(())
    }

    /// Install the measurement probe for an element's wrapped content.
    pub fn set_content_probe(
        &mut self,
        id: ElementId,
        probe: impl ContentProbe + 'static,
    ) -> Result<(), SceneError> {
        let element = self.elements.get_mut(id).ok_or(SceneError::UnknownElement)?;
        element.probe = Some(Box::new(probe));
        Ok(())
    }

    /// Position an element manually (parent-relative when nested,
    /// page-space otherwise).
    pub fn set_offset(&mut self, id: ElementId, offset: Point) -> Result<(), SceneError> {
        let element = self.elements.get_mut(id).ok_or(SceneError::UnknownElement)?;
        if element.offset != offset {
            element.offset = offset;
            self.mark_subtree_dirty(id);
        }
        Ok(())
    }

    /// Re-measure the element's content and resize its target.
    ///
    /// Idempotent: repeated calls with unchanged layout do nothing. A
    /// probe that cannot measure (detached content) is a no-op retried
    /// on the next trigger. Returns whether anything changed.
    pub fn update_size_from_content(&mut self, id: ElementId) -> Result<bool, SceneError> {
        let Scene {
            elements,
            renderer,
            config,
            ..
        } = self;
        let element = elements.get_mut(id).ok_or(SceneError::UnknownElement)?;

        let Some(size) = element.measure() else {
            tracing::trace!("content probe detached, size update skipped");
            return Ok(false);
        };

        let mut moved = false;
        if !element.nested {
            if let Some(origin) = element.probe.as_ref().and_then(|p| p.origin()) {
                if element.offset != origin {
                    element.offset = origin;
                    moved = true;
                }
            }
        }

        let physical = size.to_physical(config.scale_factor);
        let resized = physical != element.physical_size;
        if resized {
            element.size = size;
            element.physical_size = physical;
            if let (Some(renderer), Some(gpu)) = (renderer.as_ref(), element.gpu.as_mut()) {
                renderer.resize_element(gpu, physical);
            }
        } else {
            element.size = size;
        }

        if resized || moved {
            self.mark_subtree_dirty(id);
        }
        Ok(resized || moved)
    }

    /// Page-space origin of an element: its own offset plus every
    /// ancestor's, recomputed from current state on each call.
    pub fn position(&self, id: ElementId) -> Option<Point> {
        let mut element = self.elements.get(id)?;
        let mut origin = element.offset;
        while let Some(parent_id) = element.parent {
            match self.elements.get(parent_id) {
                Some(parent) => {
                    origin = origin.plus(parent.offset);
                    element = parent;
                }
                None => break,
            }
        }
        Some(origin)
    }

    // ------------------------------------------------------------------
    // Nesting
    // ------------------------------------------------------------------

    /// Nest `child` inside `parent`: the child samples the parent's
    /// rendered output instead of re-capturing the page, and positions
    /// itself relative to the parent's origin.
    pub fn add_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), SceneError> {
        if parent == child {
            return Err(SceneError::InvalidOptions("an element cannot nest itself"));
        }
        if !self.elements.contains_key(parent) || !self.elements.contains_key(child) {
            return Err(SceneError::UnknownElement);
        }
        // Nesting an ancestor under its descendant would cycle the
        // traversal; refuse up front.
        let mut cursor = self.elements[parent].parent;
        while let Some(ancestor) = cursor {
            if ancestor == child {
                return Err(SceneError::InvalidOptions("nesting would form a cycle"));
            }
            cursor = self.elements.get(ancestor).and_then(|e| e.parent);
        }

        if self.elements[child].parent == Some(parent) {
            return Ok(());
        }
        if let Some(previous) = self.elements[child].parent {
            self.remove_child(previous, child)?;
        }

        let [parent_elem, child_elem] = self
            .elements
            .get_disjoint_mut([parent, child])
            .ok_or(SceneError::UnknownElement)?;
        parent_elem.children.push(child);
        child_elem.parent = Some(parent);
        child_elem.nested = true;
        child_elem.dirty = true;
        Ok(())
    }

    /// Detach `child` from `parent` without destroying either side.
    /// Removing a child that is not attached is a no-op.
    pub fn remove_child(&mut self, parent: ElementId, child: ElementId) -> Result<(), SceneError> {
        let Some(parent_elem) = self.elements.get_mut(parent) else {
            return Err(SceneError::UnknownElement);
        };
        let had = parent_elem.children.iter().any(|&c| c == child);
        parent_elem.children.retain(|&mut c| c != child);
        if !had {
            return Ok(());
        }
        if let Some(child_elem) = self.elements.get_mut(child) {
            child_elem.parent = None;
            child_elem.nested = false;
            child_elem.dirty = true;
        }
        Ok(())
    }

    // ------------------------------------------------------------------
    // Mounting
    // ------------------------------------------------------------------

    /// Start asynchronous initialization: returns the ticket whose
    /// `capture` future performs the snapshot capture without borrowing
    /// the scene.
    pub fn begin_mount(&self, id: ElementId) -> Result<MountTicket, SceneError> {
        let element = self.elements.get(id).ok_or(SceneError::UnknownElement)?;
        let region = match &element.kind {
            ElementKind::Container { capture_region, .. } => *capture_region,
            ElementKind::Button { .. } => None,
        };
        Ok(MountTicket {
            id,
            token: element.liveness.token(),
            service: Arc::clone(&self.snapshots),
            region,
        })
    }

    /// Apply a resolved capture. If the element was destroyed while the
    /// capture was in flight, the outcome is discarded without touching
    /// any state.
    pub fn complete_mount(&mut self, outcome: MountOutcome) {
        if !outcome.token.is_live() {
            tracing::debug!("discarding capture for torn-down element");
            return;
        }
        let Scene {
            elements, renderer, ..
        } = self;
        let Some(element) = elements.get_mut(outcome.id) else {
            tracing::debug!("discarding capture for removed element");
            return;
        };

        element.snapshot = outcome.snapshot;
        element.dirty = true;

        if let Some(renderer) = renderer.as_mut() {
            Self::ensure_gpu(renderer, element);
        }
    }

    /// Convenience wrapper: begin, capture, and complete in one call.
    pub async fn mount(&mut self, id: ElementId) -> Result<(), SceneError> {
        let ticket = self.begin_mount(id)?;
        let outcome = ticket.capture().await;
        self.complete_mount(outcome);
        Ok(())
    }

    fn ensure_gpu(renderer: &mut GlassRenderer, element: &mut GlassElement) {
        if element.gpu.is_some() || element.gpu_failed || element.physical_size.is_empty() {
            return;
        }
        match renderer.create_element(element.kind.program_kind(), element.physical_size) {
            Ok(gpu) => element.gpu = Some(gpu),
            Err(e) => {
                // Fatal for this element only: it stays invisible.
                tracing::error!("glass program compilation failed: {e}");
                element.gpu_failed = true;
            }
        }
    }

    // ------------------------------------------------------------------
    // Rendering
    // ------------------------------------------------------------------

    /// Render every dirty element, parents before their children.
    ///
    /// A nested child samples its parent's target once the parent has
    /// rendered a frame; until then it falls back to the page snapshot
    /// offset by the accumulated parent origins (visually approximate,
    /// never a crash).
    pub fn render_frame(&mut self, frame: FrameInfo) {
        if self.renderer.is_none() {
            return;
        }

        // Upload every snapshot generation elements will sample.
        let generations: Vec<Arc<Snapshot>> = self
            .traversal_order()
            .iter()
            .filter_map(|&id| self.elements.get(id))
            .filter_map(|e| e.snapshot.clone())
            .collect();
        if let Some(renderer) = self.renderer.as_mut() {
            for snapshot in &generations {
                renderer.sync_snapshot(snapshot);
            }
        }

        let mut plans = Vec::new();
        for id in self.traversal_order() {
            let Some(element) = self.elements.get(id) else {
                continue;
            };
            if !element.dirty || element.physical_size.is_empty() || element.gpu_failed {
                continue;
            }
            let Some(source) = self.resolve_source(element) else {
                continue;
            };
            let geometry = self.geometry_for(id, element, &source);
            plans.push(RenderPlan {
                id,
                source,
                geometry,
            });
        }

        let scale = self.config.scale_factor;
        let mut newly_ready: Vec<(ReadyCallback, ElementId)> = Vec::new();
        // Children that rendered against the page-snapshot fallback this
        // frame; re-dirtied after the loop so they re-render from their
        // parent's finished surface next frame.
        let mut refresh_children: Vec<ElementId> = Vec::new();

        let Scene {
            elements, renderer, ..
        } = self;
        let Some(renderer) = renderer.as_mut() else {
            return;
        };

        for plan in plans {
            let rendered = match plan.source {
                PlanSource::Page(generation) => {
                    let Some(element) = elements.get_mut(plan.id) else {
                        continue;
                    };
                    Self::ensure_gpu(renderer, element);
                    let Some(gpu) = element.gpu.as_mut() else {
                        continue;
                    };
                    let uniforms =
                        GlassUniforms::compose(&element.params, &plan.geometry, &frame, scale);
                    renderer.render_element(gpu, RenderSource::Snapshot { generation }, &uniforms)
                }
                PlanSource::Parent(parent_id) => {
                    let Some([element, parent]) =
                        elements.get_disjoint_mut([plan.id, parent_id])
                    else {
                        continue;
                    };
                    Self::ensure_gpu(renderer, element);
                    let (Some(gpu), Some(parent_gpu)) =
                        (element.gpu.as_mut(), parent.gpu.as_ref())
                    else {
                        continue;
                    };
                    let uniforms =
                        GlassUniforms::compose(&element.params, &plan.geometry, &frame, scale);
                    let source = RenderSource::View {
                        view: parent_gpu.target().view(),
                        key: glaze_gpu::SourceKey::Target(parent_gpu.target().id()),
                    };
                    renderer.render_element(gpu, source, &uniforms)
                }
            };

            match rendered {
                Ok(true) => {
                    if let Some(element) = elements.get_mut(plan.id) {
                        element.dirty = false;
                        if !element.ready {
                            element.ready = true;
                            refresh_children.extend(element.children.iter().copied());
                            if let Some(callback) = element.on_ready.clone() {
                                newly_ready.push((callback, plan.id));
                            }
                        }
                    }
                }
                Ok(false) => {
                    // Source texture not resident yet; retried next frame.
                }
                Err(e) => {
                    tracing::error!("glass render failed: {e}");
                    if let Some(element) = elements.get_mut(plan.id) {
                        element.gpu_failed = true;
                    }
                }
            }
        }

        for child in refresh_children {
            if let Some(element) = elements.get_mut(child) {
                element.dirty = true;
            }
        }

        // Fire outside the element borrows; hosts may re-enter the
        // scene from the callback on their next turn.
        for (callback, id) in newly_ready {
            callback(id);
        }
    }

    /// Roots in creation order, children depth-first after their parent.
    fn traversal_order(&self) -> Vec<ElementId> {
        let mut order = Vec::with_capacity(self.elements.len());
        for &id in &self.order {
            let Some(element) = self.elements.get(id) else {
                continue;
            };
            if element.parent.is_none() {
                self.push_subtree(id, &mut order);
            }
        }
        order
    }

    fn push_subtree(&self, id: ElementId, out: &mut Vec<ElementId>) {
        out.push(id);
        if let Some(element) = self.elements.get(id) {
            for &child in element.children.iter() {
                self.push_subtree(child, out);
            }
        }
    }

    fn resolve_source(&self, element: &GlassElement) -> Option<PlanSource> {
        if element.nested {
            if let Some(parent_id) = element.parent {
                let parent_ready = self
                    .elements
                    .get(parent_id)
                    .map(|p| p.ready && p.gpu.is_some())
                    .unwrap_or(false);
                if parent_ready {
                    return Some(PlanSource::Parent(parent_id));
                }
            }
        }
        element
            .snapshot
            .as_ref()
            .map(|snapshot| PlanSource::Page(snapshot.generation()))
    }

    fn geometry_for(
        &self,
        id: ElementId,
        element: &GlassElement,
        source: &PlanSource,
    ) -> SurfaceGeometry {
        let scale = self.config.scale_factor;
        let (source_size, source_rect) = match source {
            PlanSource::Page(_) => match element.snapshot.as_ref() {
                Some(snapshot) => {
                    let page_rect = Rect::from_origin_size(
                        self.position(id).unwrap_or(element.offset),
                        element.size,
                    );
                    (snapshot.bitmap().size(), snapshot.source_rect(page_rect))
                }
                None => (glaze_core::PhysicalSize::default(), Rect::ZERO),
            },
            PlanSource::Parent(parent_id) => {
                let parent_size = self
                    .elements
                    .get(*parent_id)
                    .map(|p| p.physical_size)
                    .unwrap_or_default();
                let bounds =
                    Rect::new(0.0, 0.0, parent_size.width as f32, parent_size.height as f32);
                let rect = Rect::from_origin_size(element.offset, element.size)
                    .scaled(scale)
                    .intersection(&bounds)
                    .unwrap_or(Rect::ZERO);
                (parent_size, rect)
            }
        };

        let mut geometry = SurfaceGeometry::new(element.physical_size, source_size, source_rect);
        geometry.corner_radius =
            element.shape.corner_radius(element.size, element.params.corner_radius) * scale;
        geometry.shape_kind = element.shape.kind_id();
        geometry.label_rect = element.label_rect(scale);
        if let ElementKind::Button { warp, press, .. } = &element.kind {
            geometry.warp = *warp;
            geometry.press = *press;
        }
        geometry
    }

    /// The uniforms an element would upload this frame. Exposed for
    /// hosts and tests inspecting the composed state without a GPU.
    pub fn uniforms_for(&self, id: ElementId, frame: &FrameInfo) -> Option<GlassUniforms> {
        let element = self.elements.get(id)?;
        let source = self
            .resolve_source(element)
            .unwrap_or(PlanSource::Page(0));
        let geometry = self.geometry_for(id, element, &source);
        Some(GlassUniforms::compose(
            &element.params,
            &geometry,
            frame,
            self.config.scale_factor,
        ))
    }

    /// Read an element's rendered target back into a bitmap.
    pub fn read_element(&self, id: ElementId) -> Option<Bitmap> {
        let renderer = self.renderer.as_ref()?;
        let gpu = self.elements.get(id)?.gpu.as_ref()?;
        match renderer.read_target(gpu.target()) {
            Ok(bitmap) => Some(bitmap),
            Err(e) => {
                tracing::warn!("target readback failed: {e}");
                None
            }
        }
    }

    // ------------------------------------------------------------------
    // Pointer interaction
    // ------------------------------------------------------------------

    /// Dispatch a pointer press. The topmost button whose page rect
    /// contains the point receives it; its click callback is invoked
    /// synchronously with the label. Returns whether a button handled
    /// the press.
    pub fn pointer_down(&mut self, point: Point) -> bool {
        let order = self.traversal_order();
        let scale = self.config.scale_factor;

        for &id in order.iter().rev() {
            let Some(position) = self.position(id) else {
                continue;
            };
            let Some(element) = self.elements.get_mut(id) else {
                continue;
            };
            if !element.kind.is_button() {
                continue;
            }
            let bounds = Rect::from_origin_size(position, element.size);
            if !bounds.contains(point) {
                continue;
            }

            let mut clicked: Option<(crate::options::ClickCallback, String)> = None;
            if let ElementKind::Button {
                label,
                warp_enabled,
                on_click,
                warp,
                press,
                ..
            } = &mut element.kind
            {
                if *warp_enabled {
                    *warp = 1.0;
                    *press = Point::new(
                        (point.x - position.x) * scale,
                        (point.y - position.y) * scale,
                    );
                    element.dirty = true;
                }
                if let Some(callback) = on_click.clone() {
                    clicked = Some((callback, label.clone()));
                }
            }

            if let Some((callback, label)) = clicked {
                callback(&label);
            }
            return true;
        }
        false
    }

    /// Release all pressed buttons (warp animates back to rest).
    pub fn pointer_up(&mut self) {
        for (_, element) in self.elements.iter_mut() {
            if let ElementKind::Button { warp, .. } = &mut element.kind {
                if *warp != 0.0 {
                    *warp = 0.0;
                    element.dirty = true;
                }
            }
        }
    }

    // ------------------------------------------------------------------
    // Teardown
    // ------------------------------------------------------------------

    /// Destroy an element: revoke its liveness, release its GPU
    /// resources, detach it from its parent, and orphan (not destroy)
    /// its children. Destroying an already-removed element is a no-op.
    pub fn destroy(&mut self, id: ElementId) -> bool {
        let Some(element) = self.elements.remove(id) else {
            return false;
        };
        element.liveness.revoke();

        if let Some(parent_id) = element.parent {
            if let Some(parent) = self.elements.get_mut(parent_id) {
                parent.children.retain(|&mut c| c != id);
            }
        }
        for &child_id in element.children.iter() {
            if let Some(child) = self.elements.get_mut(child_id) {
                child.parent = None;
                child.nested = false;
                child.dirty = true;
            }
        }
        self.order.retain(|&e| e != id);
        // GPU resources drop with the element.
        true
    }

    fn mark_subtree_dirty(&mut self, id: ElementId) {
        let mut stack = vec![id];
        while let Some(current) = stack.pop() {
            if let Some(element) = self.elements.get_mut(current) {
                element.dirty = true;
                stack.extend(element.children.iter().copied());
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::sync::Mutex;

    use glaze_core::{Color, PhysicalSize, Shape, Size};
    use glaze_snapshot::SolidSource;

    use crate::options::{ButtonOptions, ContainerOptions};
    use crate::probe::FixedProbe;

    fn runtime() -> tokio::runtime::Runtime {
        tokio::runtime::Runtime::new().expect("tokio runtime")
    }

    fn service() -> Arc<SnapshotService> {
        Arc::new(SnapshotService::new(
            Arc::new(SolidSource::new(Color::WHITE, Size::new(1280.0, 960.0))),
            EngineConfig::immediate(),
        ))
    }

    fn scene() -> Scene {
        Scene::new(service(), EngineConfig::immediate())
    }

    fn scene_with_scale(scale: f32) -> Scene {
        Scene::new(
            service(),
            EngineConfig::immediate().with_scale_factor(scale),
        )
    }

    #[test]
    fn target_tracks_measured_size_times_scale_factor() {
        let mut scene = scene_with_scale(2.0);
        let id = scene.create_container(ContainerOptions::new()).unwrap();
        let probe = FixedProbe::new(Size::new(400.0, 200.0), Point::new(50.0, 80.0));
        scene.set_content_probe(id, probe.clone()).unwrap();

        assert!(scene.update_size_from_content(id).unwrap());
        let element = scene.element(id).unwrap();
        assert_eq!(element.physical_size(), PhysicalSize::new(800, 400));
        assert_eq!(element.offset(), Point::new(50.0, 80.0));

        // Unchanged layout: idempotent, nothing re-dirties
        assert!(!scene.update_size_from_content(id).unwrap());

        probe.set_size(Size::new(500.0, 200.0));
        assert!(scene.update_size_from_content(id).unwrap());
        assert_eq!(
            scene.element(id).unwrap().physical_size(),
            PhysicalSize::new(1000, 400)
        );
    }

    #[test]
    fn detached_probe_is_a_noop_retried_later() {
        let mut scene = scene();
        let id = scene.create_container(ContainerOptions::new()).unwrap();
        let probe = FixedProbe::new(Size::new(100.0, 100.0), Point::ZERO);
        probe.detach();
        scene.set_content_probe(id, probe.clone()).unwrap();

        assert!(!scene.update_size_from_content(id).unwrap());
        assert_eq!(scene.element(id).unwrap().physical_size(), PhysicalSize::default());

        probe.set_size(Size::new(100.0, 100.0));
        assert!(scene.update_size_from_content(id).unwrap());
        assert_eq!(
            scene.element(id).unwrap().physical_size(),
            PhysicalSize::new(100, 100)
        );
    }

    #[test]
    fn apply_effect_clamps_instead_of_rejecting() {
        let mut scene = scene();
        let id = scene.create_container(ContainerOptions::new()).unwrap();

        let raw = ControlParams {
            tint_strength: 1.5,
            glass_opacity: -2.0,
            ..ControlParams::default()
        };
        scene.apply_effect(id, raw).unwrap();

        let params = scene.element(id).unwrap().params();
        assert_eq!(params.tint_strength, 1.0);
        assert_eq!(params.glass_opacity, 0.0);
    }

    #[test]
    fn elements_share_one_snapshot_until_reset() {
        let mut scene = scene();
        let a = scene.create_container(ContainerOptions::new()).unwrap();
        let b = scene.create_container(ContainerOptions::new()).unwrap();

        runtime().block_on(async {
            scene.mount(a).await.unwrap();
            scene.mount(b).await.unwrap();
        });

        let snap_a = scene.element(a).unwrap().snapshot().unwrap().clone();
        let snap_b = scene.element(b).unwrap().snapshot().unwrap().clone();
        assert!(Arc::ptr_eq(&snap_a, &snap_b));
        assert_eq!(scene.snapshot_service().capture_count(), 1);

        scene.snapshot_service().reset();
        let c = scene.create_container(ContainerOptions::new()).unwrap();
        runtime().block_on(async {
            scene.mount(c).await.unwrap();
        });

        let snap_c = scene.element(c).unwrap().snapshot().unwrap().clone();
        assert!(!Arc::ptr_eq(&snap_a, &snap_c));
        assert_ne!(snap_a.generation(), snap_c.generation());
        assert_eq!(scene.snapshot_service().capture_count(), 2);
    }

    #[test]
    fn add_and_remove_child_round_trip() {
        let mut scene = scene();
        let parent = scene.create_container(ContainerOptions::new()).unwrap();
        let child = scene.create_button(ButtonOptions::new("Hi")).unwrap();

        scene.add_child(parent, child).unwrap();
        assert_eq!(scene.element(parent).unwrap().children(), &[child]);
        assert!(scene.element(child).unwrap().is_nested());
        assert_eq!(scene.element(child).unwrap().parent(), Some(parent));

        scene.remove_child(parent, child).unwrap();
        assert!(scene.element(parent).unwrap().children().is_empty());
        assert!(!scene.element(child).unwrap().is_nested());
        assert_eq!(scene.element(child).unwrap().parent(), None);

        // Removing again is a no-op, not an error
        scene.remove_child(parent, child).unwrap();
        assert!(scene.element(child).is_some());
        assert!(scene.element(parent).is_some());
    }

    #[test]
    fn nesting_cycles_are_refused() {
        let mut scene = scene();
        let a = scene.create_container(ContainerOptions::new()).unwrap();
        let b = scene.create_container(ContainerOptions::new()).unwrap();

        scene.add_child(a, b).unwrap();
        assert!(matches!(
            scene.add_child(b, a),
            Err(SceneError::InvalidOptions(_))
        ));
        assert!(matches!(
            scene.add_child(a, a),
            Err(SceneError::InvalidOptions(_))
        ));
    }

    #[test]
    fn teardown_during_inflight_capture_discards_the_result() {
        let mut scene = scene();
        let id = scene.create_container(ContainerOptions::new()).unwrap();
        let ticket = scene.begin_mount(id).unwrap();

        // Element is torn down while the capture is still in flight.
        assert!(scene.destroy(id));
        assert!(scene.element(id).is_none());

        let outcome = runtime().block_on(ticket.capture());
        scene.complete_mount(outcome);

        // Late resolution mutated nothing: no resurrected element, no
        // stray state.
        assert!(scene.element(id).is_none());
        assert!(scene.is_empty());
    }

    #[test]
    fn destroy_is_exactly_once_and_orphans_children() {
        let mut scene = scene();
        let parent = scene.create_container(ContainerOptions::new()).unwrap();
        let child = scene.create_button(ButtonOptions::new("Hi")).unwrap();
        scene.add_child(parent, child).unwrap();

        assert!(scene.destroy(parent));
        // The child survives its parent, detached and un-nested.
        let orphan = scene.element(child).unwrap();
        assert_eq!(orphan.parent(), None);
        assert!(!orphan.is_nested());

        // Second destroy is a no-op
        assert!(!scene.destroy(parent));
    }

    #[test]
    fn rounded_container_end_to_end_uniforms() {
        let mut scene = scene();
        let id = scene
            .create_container(
                ContainerOptions::new()
                    .shape(Shape::Rounded)
                    .border_radius(24.0)
                    .tint_opacity(0.2),
            )
            .unwrap();
        scene
            .set_content_probe(id, FixedProbe::new(Size::new(400.0, 200.0), Point::ZERO))
            .unwrap();
        scene.update_size_from_content(id).unwrap();
        runtime().block_on(async {
            scene.mount(id).await.unwrap();
        });

        let element = scene.element(id).unwrap();
        assert_eq!(element.physical_size(), PhysicalSize::new(400, 200));

        let uniforms = scene.uniforms_for(id, &FrameInfo::default()).unwrap();
        assert_eq!(uniforms.resolution[0], 400.0);
        assert_eq!(uniforms.resolution[1], 200.0);
        assert_eq!(uniforms.shape[0], 24.0);
        assert_eq!(uniforms.tint[3], 0.2);
    }

    #[test]
    fn nested_button_tracks_container_origin_without_recapture() {
        let mut scene = scene();
        let container = scene.create_container(ContainerOptions::new()).unwrap();
        let probe = FixedProbe::new(Size::new(400.0, 200.0), Point::new(100.0, 100.0));
        scene.set_content_probe(container, probe.clone()).unwrap();
        scene.update_size_from_content(container).unwrap();

        let button = scene
            .create_button(ButtonOptions::new("Hi").size(18.0))
            .unwrap();
        scene.add_child(container, button).unwrap();
        scene.set_offset(button, Point::new(30.0, 40.0)).unwrap();

        runtime().block_on(async {
            scene.mount(container).await.unwrap();
            scene.mount(button).await.unwrap();
        });
        let captures_before = scene.snapshot_service().capture_count();

        assert_eq!(scene.position(button), Some(Point::new(130.0, 140.0)));

        // The container moves and grows; the button's page position
        // follows without any fresh page capture.
        probe.set_origin(Point::new(200.0, 150.0));
        probe.set_size(Size::new(500.0, 250.0));
        scene.update_size_from_content(container).unwrap();

        assert_eq!(scene.position(button), Some(Point::new(230.0, 190.0)));
        assert_eq!(scene.snapshot_service().capture_count(), captures_before);
        // The resize re-dirtied the subtree so the next frame re-renders
        // parent before child.
        assert!(scene.element(button).unwrap().is_ready() == false);
    }

    #[test]
    fn pointer_down_clicks_the_topmost_button_synchronously() {
        let mut scene = scene();
        let clicks = Arc::new(Mutex::new(Vec::<String>::new()));
        let seen = Arc::clone(&clicks);

        let button = scene
            .create_button(
                ButtonOptions::new("Tap me")
                    .size(18.0)
                    .on_click(Arc::new(move |label| {
                        seen.lock().unwrap().push(label.to_string());
                    })),
            )
            .unwrap();
        scene.set_offset(button, Point::new(100.0, 100.0)).unwrap();

        let size = scene.element(button).unwrap().size();
        let inside = Point::new(100.0 + size.width / 2.0, 100.0 + size.height / 2.0);
        assert!(scene.pointer_down(inside));
        assert_eq!(clicks.lock().unwrap().as_slice(), &["Tap me".to_string()]);

        // Warp engages on press and releases on pointer_up.
        match &scene.element(button).unwrap().kind {
            ElementKind::Button { warp, .. } => assert_eq!(*warp, 1.0),
            _ => unreachable!(),
        }
        scene.pointer_up();
        match &scene.element(button).unwrap().kind {
            ElementKind::Button { warp, .. } => assert_eq!(*warp, 0.0),
            _ => unreachable!(),
        }

        // Misses fall through
        assert!(!scene.pointer_down(Point::new(5.0, 5.0)));
    }

    #[test]
    fn button_options_validate_at_construction() {
        let mut scene = scene();
        assert!(matches!(
            scene.create_button(ButtonOptions::new("  ")),
            Err(SceneError::InvalidOptions(_))
        ));
        assert!(matches!(
            scene.create_button(ButtonOptions::new("ok").size(0.0)),
            Err(SceneError::InvalidOptions(_))
        ));
    }

    #[test]
    fn element_cap_is_enforced() {
        let mut config = EngineConfig::immediate();
        config.max_elements = 2;
        let mut scene = Scene::new(service(), config);

        scene.create_container(ContainerOptions::new()).unwrap();
        scene.create_container(ContainerOptions::new()).unwrap();
        assert!(matches!(
            scene.create_container(ContainerOptions::new()),
            Err(SceneError::TooManyElements { cap: 2 })
        ));
    }

    #[test]
    fn capture_failure_degrades_to_absent_snapshot() {
        struct Failing;
        impl glaze_snapshot::SnapshotSource for Failing {
            fn rasterize(
                &self,
                _region: Option<Rect>,
                _scale: f32,
            ) -> Result<glaze_snapshot::Bitmap, glaze_snapshot::CaptureError> {
                Err(glaze_snapshot::CaptureError::Source("tainted".into()))
            }
            fn viewport(&self) -> Size {
                Size::new(800.0, 600.0)
            }
        }

        let service = Arc::new(SnapshotService::new(
            Arc::new(Failing),
            EngineConfig::immediate(),
        ));
        let mut scene = Scene::new(service, EngineConfig::immediate());
        let id = scene.create_container(ContainerOptions::new()).unwrap();

        runtime().block_on(async {
            scene.mount(id).await.unwrap();
        });

        // The element exists and is simply transparent: no snapshot, no
        // readiness, no crash.
        let element = scene.element(id).unwrap();
        assert!(element.snapshot().is_none());
        assert!(!element.is_ready());
    }

    #[test]
    fn ready_fires_only_after_a_rendered_frame() {
        let mut scene = scene();
        let fired = Arc::new(AtomicUsize::new(0));
        let counter = Arc::clone(&fired);
        let id = scene
            .create_container(
                ContainerOptions::new().on_ready(Arc::new(move |_| {
                    counter.fetch_add(1, Ordering::SeqCst);
                })),
            )
            .unwrap();

        runtime().block_on(async {
            scene.mount(id).await.unwrap();
        });

        // No renderer attached: the surface can never become ready.
        scene.render_frame(FrameInfo::default());
        assert!(!scene.element(id).unwrap().is_ready());
        assert_eq!(fired.load(Ordering::SeqCst), 0);
    }
}
