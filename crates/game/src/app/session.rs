use chipquest_engine::app::InputAggregator;
use chipquest_engine::{
    LevelCatalog, LevelId, LevelSetupError, LevelStateMachine, LocalizationResolver,
    MachineConfig, ManifestAssetLoader, SandboxWorld, SaveStore, Simulation,
};
use tracing::info;

use super::levels::ASSET_MANIFEST;

const HUD_SEPARATOR: &str = " | ";

/// The level machine wired to the headless sandbox world and the manifest
/// asset loader.
pub(crate) struct GameSession {
    machine: LevelStateMachine,
    world: SandboxWorld,
    assets: ManifestAssetLoader,
}

impl GameSession {
    pub(crate) fn start(
        catalog: LevelCatalog,
        saves: SaveStore,
        locale: LocalizationResolver,
        config: MachineConfig,
        start_level: Option<LevelId>,
    ) -> Result<Self, LevelSetupError> {
        let mut session = Self {
            machine: LevelStateMachine::new(catalog, saves, locale, config),
            world: SandboxWorld::new(),
            assets: ManifestAssetLoader::new(ASSET_MANIFEST),
        };
        match start_level {
            Some(level) => session
                .machine
                .begin_at(&level, &mut session.world, &mut session.assets)?,
            None => session
                .machine
                .begin(&mut session.world, &mut session.assets)?,
        }
        Ok(session)
    }

    #[cfg(test)]
    pub(crate) fn machine(&self) -> &LevelStateMachine {
        &self.machine
    }
}

impl Simulation for GameSession {
    fn input_mut(&mut self) -> &mut InputAggregator {
        self.machine.input_mut()
    }

    fn tick(&mut self, dt_seconds: f32) -> Result<(), LevelSetupError> {
        self.machine
            .tick(dt_seconds, &mut self.world, &mut self.assets)?;
        self.world.step(dt_seconds);
        self.world.set_focus(self.machine.player_body());
        Ok(())
    }

    fn hud_title(&self) -> String {
        compose_hud(self.machine.hud_lines(), self.machine.is_right_to_left())
    }

    fn shutdown(&mut self) {
        info!(
            level = ?self.machine.current_level().map(LevelId::as_str),
            items = self.machine.inventory().len(),
            "session_closed"
        );
    }
}

/// Right-to-left languages list HUD segments from the right.
fn compose_hud(mut lines: Vec<String>, right_to_left: bool) -> String {
    if right_to_left {
        lines.reverse();
    }
    lines.join(HUD_SEPARATOR)
}
