//! Grid engine - main entry point for running a refinement session

use hecs::World;
use log::{debug, info, warn};
use macrodata_logic::constants::timing::{HOVER_KEY_LOCK_MS, NOTICE_MS};
use macrodata_logic::controls::Command;
use macrodata_logic::session::{ConfigErrors, SessionConfig};
use macrodata_logic::shapes::{CellPos, ShapeKind};
use macrodata_logic::storage::{footer_anchor, StorageBank, StorageError};
use macrodata_logic::viewport::{ScreenRect, Viewport};
use rand::rngs::StdRng;
use rand::SeedableRng;
use thiserror::Error;

use crate::components::*;
use crate::events::{dispatch, Cue, EngineEvent, Notice, NoticeKind, ProgressListener};
use crate::generation::{place_layout, place_shapes, LayoutError, PlacementReport};
use crate::grid::Grid;
use crate::input::InputEvent;
use crate::systems::*;

/// Errors raised while building a session.
#[derive(Debug, Error)]
pub enum EngineError {
    #[error(transparent)]
    Config(#[from] ConfigErrors),
    #[error(transparent)]
    Layout(#[from] LayoutError),
}

fn make_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// One refinement session: grid, shapes, viewport, boxes and the transfer
/// pipeline, driven by input events and `update` ticks.
pub struct GridEngine {
    /// ECS world holding one entity per shape still on the grid
    pub world: World,
    pub(crate) config: SessionConfig,
    pub(crate) grid: Grid,
    pub(crate) registry: ShapeRegistry,
    pub(crate) viewport: Viewport,
    pub(crate) storage: StorageBank,
    pub(crate) pipeline: TransferPipeline,
    pub(crate) help_pulse: HelpPulse,
    pub(crate) report: PlacementReport,
    pub(crate) hovered: Option<CellPos>,
    pub(crate) notice: Option<Notice>,
    pub(crate) box_anchors: [Option<ScreenRect>; 5],
    pub(crate) overall_fired: bool,
    pub(crate) clock_ms: f64,
    pub(crate) rng: StdRng,
    hover_key_locked_until: f64,
    muted: bool,
    events: Vec<EngineEvent>,
    listener: Option<Box<dyn ProgressListener>>,
}

impl GridEngine {
    /// Validate `config`, fill the grid and scatter shapes at random.
    pub fn new(config: SessionConfig) -> Result<Self, EngineError> {
        let config = config.validated()?;
        let mut rng = make_rng(config.seed);
        let mut grid = Grid::new(config.rows, config.cols, &mut rng);
        let mut world = World::new();
        let mut registry = ShapeRegistry::new();

        let report = place_shapes(
            &mut world,
            &mut grid,
            &mut registry,
            config.shapes_per_category,
            &mut rng,
        );

        Ok(Self::assemble(config, world, grid, registry, report, rng))
    }

    /// Like [`GridEngine::new`] but with every shape at an explicit anchor.
    pub fn from_layout(
        config: SessionConfig,
        placements: &[(ShapeKind, CellPos)],
    ) -> Result<Self, EngineError> {
        let config = config.validated()?;
        let mut rng = make_rng(config.seed);
        let mut grid = Grid::new(config.rows, config.cols, &mut rng);
        let mut world = World::new();
        let mut registry = ShapeRegistry::new();

        let report = place_layout(&mut world, &mut grid, &mut registry, placements)?;

        Ok(Self::assemble(config, world, grid, registry, report, rng))
    }

    fn assemble(
        config: SessionConfig,
        world: World,
        grid: Grid,
        registry: ShapeRegistry,
        report: PlacementReport,
        rng: StdRng,
    ) -> Self {
        info!(
            "Session created: {}x{} grid, {}/{} shapes placed",
            config.rows, config.cols, report.placed, report.requested
        );

        Self {
            world,
            viewport: Viewport::new(
                config.geometry(),
                config.container_width,
                config.container_height,
            ),
            storage: StorageBank::new(config.shapes_per_category, config.increment_policy),
            pipeline: TransferPipeline::new(),
            help_pulse: HelpPulse::new(config.help_pulse_interval_ms),
            muted: config.muted,
            config,
            grid,
            registry,
            report,
            hovered: None,
            notice: None,
            box_anchors: [None; 5],
            overall_fired: false,
            clock_ms: 0.0,
            rng,
            hover_key_locked_until: 0.0,
            events: Vec::new(),
            listener: None,
        }
    }

    // ── Input ───────────────────────────────────────────────────────────

    /// Feed one UI event.
    pub fn handle_input(&mut self, event: InputEvent) {
        match event {
            InputEvent::PointerMove { x, y } => {
                let cell = self.viewport.cell_at(x, y);
                self.hover(cell);
            }
            InputEvent::PointerLeave => self.hover(None),
            InputEvent::PointerDrag { dx, dy } => self.viewport.pan_by(dx, dy),
            InputEvent::Wheel { x, y, delta_y } => self.viewport.zoom_wheel(x, y, delta_y),
            InputEvent::KeyDown { key, repeat } => {
                let Some(command) = self.config.key_bindings.resolve(key) else {
                    return;
                };
                // held keys only keep panning
                if repeat && !matches!(command, Command::Pan(_)) {
                    return;
                }
                self.command(command);
            }
        }
    }

    fn hover(&mut self, cell: Option<CellPos>) {
        self.hovered = cell;
        let outcome = hover_system(&mut self.world, &self.grid, cell);
        if outcome.first_visit {
            self.cue(Cue::FirstVisit);
        }
    }

    /// Run a command directly, bypassing key bindings.
    pub fn command(&mut self, command: Command) {
        match command {
            Command::ToggleBox(index) => match self.storage.toggle_open(index) {
                Ok(open) => {
                    self.emit(EngineEvent::BoxToggled { index, open });
                    self.rearm_help_pulse();
                }
                Err(e) => debug!("Ignoring toggle: {}", e),
            },
            Command::OpenHoveredBox => self.open_hovered_box(),
            Command::Confirm => self.confirm(),
            Command::Pan(direction) => {
                let (dx, dy) = direction.delta();
                self.viewport.pan_by(dx, dy);
            }
        }
    }

    fn open_hovered_box(&mut self) {
        if self.clock_ms < self.hover_key_locked_until {
            debug!("Hover-open key locked for {:.0}ms", self.hover_key_locked_until - self.clock_ms);
            return;
        }
        self.hover_key_locked_until = self.clock_ms + HOVER_KEY_LOCK_MS;

        match self.hovered_kind() {
            Some(kind) => {
                let index = self.storage.open_for(kind);
                self.emit(EngineEvent::BoxToggled { index, open: true });
                self.rearm_help_pulse();
            }
            None => {
                debug!("Hover-open key rejected: no shape under pointer");
                self.raise_notice(NoticeKind::NoShapeHovered);
            }
        }
    }

    /// Category of the live shape under the pointer.
    fn hovered_kind(&self) -> Option<ShapeKind> {
        let id = self.hovered.and_then(|pos| self.grid.shape_at(pos))?;
        let entity = self.registry.entity(id)?;
        if self.world.get::<&Completed>(entity).is_ok() {
            return None;
        }
        self.world.get::<&Shape>(entity).ok().map(|shape| shape.kind)
    }

    fn confirm(&mut self) {
        if !self.pipeline.is_idle() {
            debug!("Confirm ignored: transfer in flight");
            return;
        }
        let Some(selected) = selected_shape(&self.world) else {
            debug!("Confirm rejected: nothing selected");
            self.raise_notice(NoticeKind::NothingSelected);
            return;
        };
        if !selected.is_ready() {
            debug!(
                "Confirm ignored: shape #{} has {}/{} cells visited",
                selected.id,
                selected.visited.len(),
                selected.cells.len()
            );
            return;
        }
        if !self.storage.is_open_for(selected.kind) {
            debug!("Confirm rejected: box {} is not open", selected.kind.box_index());
            self.raise_notice(NoticeKind::WrongContainer);
            return;
        }
        self.arm_transfer(selected);
    }

    fn arm_transfer(&mut self, selected: ShapeSnapshot) {
        let target = self.box_anchor(selected.kind.box_index()).center();
        let digits = build_flight(selected.id, &selected.cells, &self.grid, &self.viewport, target);

        if self.world.insert_one(selected.entity, Completed).is_err() {
            warn!("Shape #{} vanished before its transfer", selected.id);
            return;
        }
        if let Ok(mut selection) = self.world.get::<&mut Selection>(selected.entity) {
            selection.clear();
        }

        let transfer = Transfer::new(
            selected.entity,
            selected.id,
            selected.kind,
            selected.cells,
            digits,
            self.clock_ms,
        );
        self.pipeline.arm(transfer);

        let percent = self.storage.record_completion(selected.kind);
        debug!(
            "Transfer armed: shape #{} ({}) -> box {} at {:.2}%",
            selected.id,
            selected.kind,
            selected.kind.box_index(),
            percent
        );
        self.emit(EngineEvent::ShapeCompleted {
            kind: selected.kind,
            shape_id: selected.id,
        });

        if self.storage.all_complete() && !self.overall_fired {
            self.overall_fired = true;
            info!("All storage boxes complete");
            self.emit(EngineEvent::OverallComplete);
            self.cue(Cue::Win);
        }
    }

    // ── Time ────────────────────────────────────────────────────────────

    /// Advance the engine clock by `elapsed_ms` and fire due timers.
    pub fn update(&mut self, elapsed_ms: f64) {
        self.clock_ms += elapsed_ms.max(0.0);
        let now = self.clock_ms;

        for step in self.pipeline.tick(now) {
            match step {
                TransferStep::Started => {}
                TransferStep::Landed => self.cue(Cue::Landing),
                TransferStep::Finished(transfer) => self.settle(transfer),
            }
        }

        if self.notice.is_some_and(|n| n.is_expired(now)) {
            self.notice = None;
        }

        if let Some(kind) = self.help_pulse.tick(now) {
            self.emit(EngineEvent::HelpPulse { kind });
        }

        spawn_phase_system(&mut self.grid, now);
    }

    /// Regenerate the cells of a finished transfer and drop its shape.
    fn settle(&mut self, transfer: Transfer) {
        self.grid.refresh_cells(&transfer.cells, self.clock_ms, &mut self.rng);
        let _ = self.world.despawn(transfer.entity);
        self.registry.remove(transfer.shape_id);
        self.pipeline.finish();
        debug!("Transfer settled: shape #{}", transfer.shape_id);
        self.emit(EngineEvent::ShapeSettled {
            shape_id: transfer.shape_id,
        });
    }

    // ── Events ──────────────────────────────────────────────────────────

    /// Install the outbound callback receiver, replacing any previous one.
    pub fn set_listener(&mut self, listener: Box<dyn ProgressListener>) {
        self.listener = Some(listener);
    }

    /// Take every event queued since the last drain.
    pub fn drain_events(&mut self) -> Vec<EngineEvent> {
        std::mem::take(&mut self.events)
    }

    fn emit(&mut self, event: EngineEvent) {
        if let Some(listener) = self.listener.as_deref_mut() {
            dispatch(listener, &event);
        }
        self.events.push(event);
    }

    fn cue(&mut self, cue: Cue) {
        if !self.muted {
            self.emit(EngineEvent::Cue(cue));
        }
    }

    fn raise_notice(&mut self, kind: NoticeKind) {
        self.notice = Some(Notice {
            kind,
            expires_at_ms: self.clock_ms + NOTICE_MS,
        });
        self.emit(EngineEvent::Notice(kind));
    }

    pub(crate) fn rearm_help_pulse(&mut self) {
        let open = self.storage.open_box().map(|b| b.kind());
        self.help_pulse.rearm(open, self.clock_ms);
    }

    // ── Accessors ───────────────────────────────────────────────────────

    pub fn config(&self) -> &SessionConfig {
        &self.config
    }

    pub fn grid(&self) -> &Grid {
        &self.grid
    }

    pub fn viewport(&self) -> &Viewport {
        &self.viewport
    }

    pub fn storage(&self) -> &StorageBank {
        &self.storage
    }

    pub fn transfer_phase(&self) -> TransferPhase {
        self.pipeline.phase()
    }

    /// The shape in flight, if any.
    pub fn active_transfer(&self) -> Option<&Transfer> {
        self.pipeline.active()
    }

    pub fn selected_shape(&self) -> Option<ShapeSnapshot> {
        selected_shape(&self.world)
    }

    /// Every shape still on the grid, ordered by id.
    pub fn shapes(&self) -> Vec<ShapeSnapshot> {
        shape_snapshots(&self.world)
    }

    pub fn placement_report(&self) -> &PlacementReport {
        &self.report
    }

    /// `20 ×` the number of full boxes.
    pub fn overall_percent(&self) -> u32 {
        self.storage.overall_percent()
    }

    pub fn notice(&self) -> Option<&Notice> {
        self.notice.as_ref()
    }

    pub fn hovered_cell(&self) -> Option<CellPos> {
        self.hovered
    }

    /// Engine clock in milliseconds since the session started.
    pub fn clock_ms(&self) -> f64 {
        self.clock_ms
    }

    pub fn set_muted(&mut self, muted: bool) {
        self.muted = muted;
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    /// Report where box `index` is drawn on screen.
    pub fn set_box_anchor(&mut self, index: u8, rect: ScreenRect) -> Result<(), StorageError> {
        let slot = self
            .box_anchors
            .get_mut((index as usize).wrapping_sub(1))
            .ok_or(StorageError::InvalidBox(index))?;
        *slot = Some(rect);
        Ok(())
    }

    /// Screen rectangle of box `index`, falling back to the footer layout.
    pub fn box_anchor(&self, index: u8) -> ScreenRect {
        let (width, height) = self.viewport.container_size();
        (index as usize)
            .checked_sub(1)
            .and_then(|i| self.box_anchors.get(i).copied().flatten())
            .unwrap_or_else(|| footer_anchor(index, width, height))
    }

    /// The grid container changed size.
    pub fn resize(&mut self, container_width: f32, container_height: f32) {
        self.viewport.resize(container_width, container_height);
        self.config.container_width = container_width;
        self.config.container_height = container_height;
    }

    // ── Persistence ─────────────────────────────────────────────────────

    /// Save the session to a writer
    pub fn save<W: std::io::Write>(&self, writer: W) -> Result<(), crate::persistence::SaveError> {
        crate::persistence::save_session(writer, self)
    }

    /// Replace this session with one read from `reader`. The listener and
    /// mute state are kept.
    pub fn load<R: std::io::Read>(&mut self, reader: R) -> Result<(), crate::persistence::SaveError> {
        let loaded = crate::persistence::load_session(reader)?;

        self.rng = make_rng(loaded.config.seed);
        self.help_pulse = HelpPulse::new(loaded.config.help_pulse_interval_ms);
        self.config = loaded.config;
        self.world = loaded.world;
        self.registry = loaded.registry;
        self.grid = loaded.grid;
        self.viewport = loaded.viewport;
        self.storage = loaded.storage;
        self.report = loaded.report;
        self.box_anchors = loaded.box_anchors;
        self.overall_fired = loaded.overall_fired;
        self.clock_ms = loaded.clock_ms;

        // Transient state starts fresh
        self.pipeline = TransferPipeline::new();
        self.hovered = None;
        self.notice = None;
        self.hover_key_locked_until = 0.0;
        self.events.clear();

        for (entity, shape_id, cells) in loaded.in_flight {
            self.grid.refresh_cells(&cells, self.clock_ms, &mut self.rng);
            let _ = self.world.despawn(entity);
            self.registry.remove(shape_id);
            debug!("Settled in-flight shape #{} on load", shape_id);
        }
        self.rearm_help_pulse();

        Ok(())
    }
}
