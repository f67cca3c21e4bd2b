use std::collections::BTreeSet;

use glam::Vec3;
use tracing::{debug, info, warn};

use super::{
    DefeatReason, ExitRule, HudMessage, LevelBodies, LevelCatalog, LevelId, LevelOutcome,
    LevelSetupError, OutcomeTrigger, TextEmphasis, TransitionPayload, UiElement,
    DEFAULT_HUD_MESSAGE_TTL, DEFEAT_COLOR, PROMPT_COLOR, VICTORY_COLOR,
};
use crate::app::{InputAggregator, InputFrame, PointerPress, TickCommands, TouchLayout};
use crate::assets::{AssetLoader, LevelInstanceId, LoadTicket};
use crate::controller::{CharacterController, ControllerConfig};
use crate::inventory::{InventoryLedger, InventorySnapshot};
use crate::locale::{LocalizationResolver, DEFAULT_LANGUAGE};
use crate::physics::{BodyHandle, ObjectPicker, PhysicsWorld};
use crate::save::{LiveState, SaveOverrides, SaveStore, AUTO_SLOT, MANUAL_SLOT};

pub const DEFAULT_PICKUP_REACH: f32 = 20.0;

const COLLECTABLE_MARKERS: [&str; 2] = ["key", "item"];
const CONTROL_HINTS: [&str; 3] = ["save_game", "load_game", "load_auto"];

#[derive(Debug, Clone, PartialEq)]
pub struct MachineConfig {
    pub controller: ControllerConfig,
    pub touch_layout: TouchLayout,
    pub pickup_reach: f32,
    pub hud_message_ttl: f32,
    pub initial_language: String,
    pub viewport: (u32, u32),
}

impl Default for MachineConfig {
    fn default() -> Self {
        Self {
            controller: ControllerConfig::default(),
            touch_layout: TouchLayout::default(),
            pickup_reach: DEFAULT_PICKUP_REACH,
            hud_message_ttl: DEFAULT_HUD_MESSAGE_TTL,
            initial_language: DEFAULT_LANGUAGE.to_string(),
            viewport: (1280, 720),
        }
    }
}

/// Owns one level instance at a time and decides what survives into the
/// next. Driven once per simulation step through [`LevelStateMachine::tick`].
#[derive(Debug)]
pub struct LevelStateMachine {
    catalog: LevelCatalog,
    saves: SaveStore,
    locale: LocalizationResolver,
    config: MachineConfig,
    input: InputAggregator,
    ledger: InventoryLedger,
    controller: CharacterController,
    language: String,
    current: Option<LevelId>,
    instance: LevelInstanceId,
    pending_assets: BTreeSet<String>,
    pending_payload: Option<TransitionPayload>,
    bodies: Option<LevelBodies>,
    outcome: LevelOutcome,
    is_game_over: bool,
    end_screen: Vec<UiElement>,
    hud_messages: Vec<HudMessage>,
}

impl LevelStateMachine {
    pub fn new(
        catalog: LevelCatalog,
        saves: SaveStore,
        locale: LocalizationResolver,
        config: MachineConfig,
    ) -> Self {
        let first = catalog.first().id.clone();
        Self {
            input: InputAggregator::new(config.viewport),
            controller: CharacterController::detached(config.controller),
            language: config.initial_language.clone(),
            catalog,
            saves,
            locale,
            config,
            ledger: InventoryLedger::default(),
            current: None,
            instance: LevelInstanceId(0),
            pending_assets: BTreeSet::new(),
            pending_payload: None,
            bodies: None,
            outcome: LevelOutcome::Loading { level: first },
            is_game_over: false,
            end_screen: Vec::new(),
            hud_messages: Vec::new(),
        }
    }

    /// Starts a fresh run at the first catalog level.
    pub fn begin<W>(
        &mut self,
        world: &mut W,
        assets: &mut dyn AssetLoader,
    ) -> Result<(), LevelSetupError>
    where
        W: PhysicsWorld + ?Sized,
    {
        let first = self.catalog.first().id.clone();
        self.begin_at(&first, world, assets)
    }

    pub fn begin_at<W>(
        &mut self,
        level: &LevelId,
        world: &mut W,
        assets: &mut dyn AssetLoader,
    ) -> Result<(), LevelSetupError>
    where
        W: PhysicsWorld + ?Sized,
    {
        let payload = TransitionPayload {
            inventory: InventorySnapshot::default(),
            position: None,
            language: self.language.clone(),
        };
        self.load_level(level.clone(), payload, world, assets)
    }

    pub fn tick<W>(
        &mut self,
        dt: f32,
        world: &mut W,
        assets: &mut dyn AssetLoader,
    ) -> Result<(), LevelSetupError>
    where
        W: PhysicsWorld + ObjectPicker + ?Sized,
    {
        self.tick_hud(dt);
        let frame = self.input.sample();
        let commands = self.input.take_commands();

        if commands.cycle_language && !matches!(self.outcome, LevelOutcome::Loading { .. }) {
            self.language = self.locale.next_language(&self.language);
            info!(language = %self.language, "language_changed");
            if let LevelOutcome::Transitioning { payload, .. } = &mut self.outcome {
                payload.language = self.language.clone();
            }
        }

        // Contacts stepped outside Active decide nothing.
        if !self.outcome.is_active() {
            world.drain_contacts();
        }

        match self.outcome.clone() {
            LevelOutcome::Loading { .. } => self.poll_loading(world, assets),
            LevelOutcome::Active => {
                self.tick_active(&frame, &commands, world);
                Ok(())
            }
            LevelOutcome::Victory { reset_target } => {
                if commands.pointer.is_some() {
                    self.outcome = LevelOutcome::AwaitingRestart {
                        reset_target: Some(reset_target),
                    };
                }
                Ok(())
            }
            LevelOutcome::Defeat { reset_target, .. } => {
                if commands.pointer.is_some() {
                    self.outcome = LevelOutcome::AwaitingRestart { reset_target };
                }
                Ok(())
            }
            LevelOutcome::AwaitingRestart { reset_target } => {
                self.dispatch_reset(reset_target, world, assets)
            }
            LevelOutcome::Transitioning { next, payload } => {
                self.load_level(next, payload, world, assets)
            }
        }
    }

    fn tick_hud(&mut self, dt: f32) {
        for message in &mut self.hud_messages {
            message.ttl_seconds -= dt;
        }
        self.hud_messages.retain(|message| message.ttl_seconds > 0.0);
    }

    fn push_hud(&mut self, message_key: &'static str) {
        self.hud_messages
            .retain(|message| message.message_key != message_key);
        self.hud_messages.push(HudMessage {
            message_key,
            ttl_seconds: self.config.hud_message_ttl,
        });
    }

    fn load_level<W>(
        &mut self,
        level: LevelId,
        payload: TransitionPayload,
        world: &mut W,
        assets: &mut dyn AssetLoader,
    ) -> Result<(), LevelSetupError>
    where
        W: PhysicsWorld + ?Sized,
    {
        let Some(def) = self.catalog.get(&level) else {
            return Err(LevelSetupError::UnknownLevel {
                level: level.to_string(),
            });
        };
        let requested = def.assets.iter().cloned().collect::<BTreeSet<_>>();

        self.teardown(world);
        self.instance = LevelInstanceId(self.instance.0.saturating_add(1));
        for asset in &requested {
            assets.request(LoadTicket {
                instance: self.instance,
                asset: asset.clone(),
            });
        }

        info!(
            level = %level,
            instance = %self.instance,
            assets = requested.len(),
            items = payload.inventory.len(),
            "level_loading"
        );
        self.pending_assets = requested;
        self.language = payload.language.clone();
        self.pending_payload = Some(payload);
        self.current = Some(level.clone());
        self.outcome = LevelOutcome::Loading { level };
        Ok(())
    }

    fn teardown<W>(&mut self, world: &mut W)
    where
        W: PhysicsWorld + ?Sized,
    {
        if let Some(bodies) = self.bodies.take() {
            for body in bodies.owned {
                world.destroy(body);
            }
        }
        world.drain_contacts();
        self.controller.release_body();
        self.input.remove_touch_controls();
        self.end_screen.clear();
    }

    fn poll_loading<W>(
        &mut self,
        world: &mut W,
        assets: &mut dyn AssetLoader,
    ) -> Result<(), LevelSetupError>
    where
        W: PhysicsWorld + ?Sized,
    {
        for completion in assets.poll_completed() {
            if completion.ticket.instance != self.instance {
                debug!(
                    instance = %completion.ticket.instance,
                    asset = %completion.ticket.asset,
                    "stale_asset_ignored"
                );
                continue;
            }
            match completion.result {
                Ok(_) => {
                    self.pending_assets.remove(&completion.ticket.asset);
                }
                Err(source) => {
                    return Err(LevelSetupError::Asset {
                        level: self.current_level_name(),
                        source,
                    });
                }
            }
        }

        if self.pending_assets.is_empty() {
            self.finish_setup(world)?;
        }
        Ok(())
    }

    fn finish_setup<W>(&mut self, world: &mut W) -> Result<(), LevelSetupError>
    where
        W: PhysicsWorld + ?Sized,
    {
        let level_name = self.current_level_name();
        let def = self
            .current
            .as_ref()
            .and_then(|level| self.catalog.get(level))
            .ok_or_else(|| LevelSetupError::UnknownLevel {
                level: level_name.clone(),
            })?;
        let payload = self.pending_payload.take().unwrap_or_else(|| TransitionPayload {
            inventory: InventorySnapshot::default(),
            position: None,
            language: self.language.clone(),
        });

        let bodies = def.setup_level(world, payload.position)?;
        self.controller = CharacterController::new(bodies.player, self.config.controller, world);
        self.ledger.start_level(payload.inventory);
        self.language = payload.language;
        self.input.install_touch_controls(self.config.touch_layout);
        self.is_game_over = false;
        self.end_screen.clear();
        self.bodies = Some(bodies);
        self.outcome = LevelOutcome::Active;

        info!(
            level = %level_name,
            instance = %self.instance,
            items = self.ledger.current().len(),
            language = %self.language,
            "level_active"
        );
        Ok(())
    }

    fn tick_active<W>(&mut self, frame: &InputFrame, commands: &TickCommands, world: &mut W)
    where
        W: PhysicsWorld + ObjectPicker + ?Sized,
    {
        if commands.save_slot {
            self.save_manual(world);
        }
        if commands.load_slot && self.load_from(MANUAL_SLOT) {
            return;
        }
        if commands.load_auto && self.load_from(AUTO_SLOT) {
            return;
        }
        if let Some(press) = commands.pointer.as_ref() {
            self.handle_pointer(press, world);
        }

        self.controller.tick(frame, world);
        self.check_outcome_triggers(world);
    }

    fn live_state<W>(&self, world: &W) -> LiveState
    where
        W: PhysicsWorld + ?Sized,
    {
        LiveState {
            level: self.current_level_name(),
            inventory: self.ledger.current(),
            language: self.language.clone(),
            position: self.player_position(world),
        }
    }

    fn player_position<W>(&self, world: &W) -> Option<Vec3>
    where
        W: PhysicsWorld + ?Sized,
    {
        self.bodies
            .as_ref()
            .and_then(|bodies| world.body_state(bodies.player))
            .map(|state| state.position)
    }

    fn save_manual<W>(&mut self, world: &W)
    where
        W: PhysicsWorld + ?Sized,
    {
        let live = self.live_state(world);
        match self.saves.save(MANUAL_SLOT, &live, &SaveOverrides::none()) {
            Ok(_) => self.push_hud("saved_to_slot"),
            Err(error) => warn!(slot = MANUAL_SLOT, error = %error, "save_write_failed"),
        }
    }

    fn auto_save(&mut self, live: &LiveState, overrides: &SaveOverrides) -> bool {
        match self.saves.save(AUTO_SLOT, live, overrides) {
            Ok(_) => true,
            Err(error) => {
                warn!(slot = AUTO_SLOT, error = %error, "save_write_failed");
                false
            }
        }
    }

    /// Queues a transition into the saved level. Returns false, with a HUD
    /// notice, when the slot is empty, unreadable or names an unknown level.
    fn load_from(&mut self, slot: &str) -> bool {
        let Some(record) = self.saves.load(slot) else {
            info!(slot, "save_not_found");
            self.push_hud("no_save_found");
            return false;
        };
        if !self.catalog.contains(&record.level) {
            warn!(slot, level = %record.level, "save_names_unknown_level");
            self.push_hud("no_save_found");
            return false;
        }

        info!(slot, level = %record.level, timestamp = %record.timestamp, "save_loaded");
        self.outcome = LevelOutcome::Transitioning {
            next: LevelId::new(record.level),
            payload: TransitionPayload {
                inventory: record.inventory,
                position: record.position.map(|position| position.to_vec3()),
                language: record.language,
            },
        };
        true
    }

    fn handle_pointer<W>(&mut self, press: &PointerPress, world: &mut W)
    where
        W: PhysicsWorld + ObjectPicker + ?Sized,
    {
        if self.is_game_over {
            return;
        }
        let Some(bodies) = self.bodies.as_ref() else {
            return;
        };

        let collectable = world
            .pick(press)
            .into_iter()
            .filter(|hit| hit.distance < self.config.pickup_reach)
            .filter_map(|hit| {
                let name = bodies.interactables.get(&hit.body)?;
                COLLECTABLE_MARKERS
                    .iter()
                    .any(|marker| name.contains(marker))
                    .then(|| (hit.body, name.clone()))
            })
            .collect::<Vec<_>>();

        for (body, name) in collectable {
            self.collect(body, name, world);
        }
    }

    fn collect<W>(&mut self, body: BodyHandle, name: String, world: &mut W)
    where
        W: PhysicsWorld + ?Sized,
    {
        if let Some(bodies) = self.bodies.as_mut() {
            bodies.forget(body);
        }
        world.destroy(body);
        let inventory = self.ledger.pickup(name.clone());
        info!(item = %name, items = inventory.len(), "item_collected");

        let live = self.live_state(world);
        if self.auto_save(&live, &SaveOverrides::none()) {
            self.push_hud("progress_saved");
        }
    }

    /// Drains contact events and commits at most one outcome per instance.
    /// Once the latch is set further calls change nothing.
    pub fn check_outcome_triggers<W>(&mut self, world: &mut W)
    where
        W: PhysicsWorld + ?Sized,
    {
        let contacts = world.drain_contacts();
        if self.is_game_over || !self.outcome.is_active() {
            return;
        }
        let (Some(level), Some(bodies)) = (self.current.as_ref(), self.bodies.as_ref()) else {
            return;
        };
        let Some(def) = self.catalog.get(level) else {
            return;
        };

        let player = world.body_state(bodies.player);
        let trigger = def.on_tick(bodies, player, &contacts);
        let exit = def.exit.clone();
        match trigger {
            None => {}
            Some(OutcomeTrigger::Hazard) => self.defeat(DefeatReason::Hazard, None),
            Some(OutcomeTrigger::Fell) => self.defeat(DefeatReason::Fell, None),
            Some(OutcomeTrigger::GoalReached) => self.reach_exit(exit, world),
        }
    }

    fn reach_exit<W>(&mut self, exit: ExitRule, world: &W)
    where
        W: PhysicsWorld + ?Sized,
    {
        match exit {
            ExitRule::Advance { next } => {
                let live = self.live_state(world);
                let overrides = SaveOverrides::none()
                    .with_level(next.as_str())
                    .with_position(None);
                self.auto_save(&live, &overrides);
                self.is_game_over = true;
                info!(from = %live.level, to = %next, "level_exit_reached");
                self.outcome = LevelOutcome::Transitioning {
                    next,
                    payload: TransitionPayload {
                        inventory: self.ledger.current(),
                        position: None,
                        language: self.language.clone(),
                    },
                };
            }
            ExitRule::Terminal {
                required_item,
                reset_to,
            } => {
                if self.ledger.current().contains(&required_item) {
                    self.display_end_screen("you_win", VICTORY_COLOR);
                    info!(reset_to = %reset_to, "victory");
                    self.outcome = LevelOutcome::Victory {
                        reset_target: reset_to,
                    };
                } else {
                    self.defeat(DefeatReason::MissingKey, Some(reset_to));
                }
            }
        }
    }

    fn defeat(&mut self, reason: DefeatReason, reset_target: Option<LevelId>) {
        self.display_end_screen(reason.message_key(), DEFEAT_COLOR);
        info!(
            level = %self.current_level_name(),
            reason = ?reason,
            "defeat"
        );
        self.outcome = LevelOutcome::Defeat {
            reason,
            reset_target,
        };
    }

    /// Pushes the title and restart prompt and sets the latch. Returns false
    /// without touching anything when the latch is already set.
    pub fn display_end_screen(&mut self, title_key: &'static str, color: [u8; 3]) -> bool {
        if self.is_game_over {
            return false;
        }
        self.is_game_over = true;
        self.end_screen.push(UiElement {
            message_key: title_key,
            color,
            emphasis: TextEmphasis::Title,
        });
        self.end_screen.push(UiElement {
            message_key: "restart",
            color: PROMPT_COLOR,
            emphasis: TextEmphasis::Prompt,
        });
        true
    }

    fn dispatch_reset<W>(
        &mut self,
        reset_target: Option<LevelId>,
        world: &mut W,
        assets: &mut dyn AssetLoader,
    ) -> Result<(), LevelSetupError>
    where
        W: PhysicsWorld + ?Sized,
    {
        match reset_target {
            None => {
                let inventory = self.ledger.rollback_to_level_start();
                let level = match self.current.clone() {
                    Some(level) => level,
                    None => self.catalog.first().id.clone(),
                };
                info!(level = %level, items = inventory.len(), "level_restart");
                let payload = TransitionPayload {
                    inventory,
                    position: None,
                    language: self.language.clone(),
                };
                self.load_level(level, payload, world, assets)
            }
            Some(target) => {
                self.ledger.start_level(InventorySnapshot::default());
                info!(level = %target, "run_reset");
                let payload = TransitionPayload {
                    inventory: InventorySnapshot::default(),
                    position: None,
                    language: self.language.clone(),
                };
                self.load_level(target, payload, world, assets)
            }
        }
    }

    fn current_level_name(&self) -> String {
        self.current
            .as_ref()
            .map(LevelId::to_string)
            .unwrap_or_default()
    }

    pub fn input_mut(&mut self) -> &mut InputAggregator {
        &mut self.input
    }

    pub fn input(&self) -> &InputAggregator {
        &self.input
    }

    pub fn outcome(&self) -> &LevelOutcome {
        &self.outcome
    }

    pub fn is_game_over(&self) -> bool {
        self.is_game_over
    }

    pub fn inventory(&self) -> InventorySnapshot {
        self.ledger.current()
    }

    pub fn language(&self) -> &str {
        &self.language
    }

    pub fn current_level(&self) -> Option<&LevelId> {
        self.current.as_ref()
    }

    pub fn instance(&self) -> LevelInstanceId {
        self.instance
    }

    pub fn player_body(&self) -> Option<BodyHandle> {
        self.bodies.as_ref().map(|bodies| bodies.player)
    }

    pub fn end_screen(&self) -> &[UiElement] {
        &self.end_screen
    }

    pub fn hud_messages(&self) -> &[HudMessage] {
        &self.hud_messages
    }

    pub fn saves(&self) -> &SaveStore {
        &self.saves
    }

    pub fn saves_mut(&mut self) -> &mut SaveStore {
        &mut self.saves
    }

    pub fn locale(&self) -> &LocalizationResolver {
        &self.locale
    }

    pub fn is_right_to_left(&self) -> bool {
        self.locale.is_right_to_left(&self.language)
    }

    /// Inventory line, then end screen, then transient notices, all resolved
    /// in the current language.
    pub fn hud_lines(&self) -> Vec<String> {
        let mut lines = Vec::with_capacity(2 + self.end_screen.len() + self.hud_messages.len());
        lines.push(format!(
            "{}: {}",
            self.locale.resolve(&self.language, "inventory"),
            self.ledger.current().join(", ")
        ));
        if self.outcome.is_active() {
            let hints = CONTROL_HINTS
                .iter()
                .map(|key| self.locale.resolve(&self.language, *key))
                .collect::<Vec<_>>();
            lines.push(hints.join(" "));
        }
        lines.extend(
            self.end_screen
                .iter()
                .map(|element| self.locale.resolve(&self.language, element.message_key).to_string()),
        );
        lines.extend(
            self.hud_messages
                .iter()
                .map(|message| self.locale.resolve(&self.language, message.message_key).to_string()),
        );
        lines
    }
}
