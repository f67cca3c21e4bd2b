use std::collections::BTreeMap;

use glam::{Vec2, Vec3};

use super::*;
use crate::app::PointerPress;
use crate::assets::{AssetHandle, AssetLoader, LoadCompletion, LoadTicket, ManifestAssetLoader};
use crate::inventory::InventorySnapshot;
use crate::locale::{LocaleTable, LocalizationResolver};
use crate::physics::{
    BodyDesc, BodyHandle, BodyState, ContactEvent, ContactWatchId, ObjectPicker, PhysicsWorld,
    PickHit,
};
use crate::sandbox::SandboxWorld;
use crate::save::{SaveStore, AUTO_SLOT, MANUAL_SLOT};

const DT: f32 = 1.0 / 60.0;

#[derive(Debug, Clone)]
struct ScriptedBody {
    name: String,
    state: BodyState,
    mass: f32,
}

/// Physics double: bodies stay where they are placed, contacts and pick
/// results are injected by name.
#[derive(Debug, Default)]
struct ScriptedWorld {
    next_body: u64,
    bodies: BTreeMap<BodyHandle, ScriptedBody>,
    next_watch: u64,
    watches: Vec<(ContactWatchId, BodyHandle, BodyHandle)>,
    contacts: Vec<ContactEvent>,
    pick_script: Vec<(String, f32)>,
    impulses: Vec<(BodyHandle, f32)>,
}

impl ScriptedWorld {
    fn handle_named(&self, name: &str) -> Option<BodyHandle> {
        self.bodies
            .iter()
            .rev()
            .find(|(_, body)| body.name == name)
            .map(|(handle, _)| *handle)
    }

    fn place(&mut self, name: &str, position: Vec3) {
        let handle = self.handle_named(name).expect("body to place");
        if let Some(body) = self.bodies.get_mut(&handle) {
            body.state.position = position;
        }
    }

    fn touch(&mut self, a: &str, b: &str) {
        let a = self.handle_named(a).expect("first body");
        let b = self.handle_named(b).expect("second body");
        let events = self
            .watches
            .iter()
            .filter(|(_, wa, wb)| (*wa == a && *wb == b) || (*wa == b && *wb == a))
            .map(|(watch, wa, wb)| ContactEvent {
                watch: *watch,
                a: *wa,
                b: *wb,
            })
            .collect::<Vec<_>>();
        self.contacts.extend(events);
    }

    fn script_pick(&mut self, name: &str, distance: f32) {
        self.pick_script.push((name.to_string(), distance));
    }

    fn has_body(&self, name: &str) -> bool {
        self.handle_named(name).is_some()
    }

    fn position_of(&self, name: &str) -> Vec3 {
        let handle = self.handle_named(name).expect("body");
        self.bodies[&handle].state.position
    }
}

impl PhysicsWorld for ScriptedWorld {
    fn spawn_box(&mut self, desc: BodyDesc) -> BodyHandle {
        let handle = BodyHandle(self.next_body);
        self.next_body += 1;
        self.bodies.insert(
            handle,
            ScriptedBody {
                name: desc.name,
                state: BodyState {
                    position: desc.position,
                    velocity: Vec3::ZERO,
                },
                mass: desc.mass,
            },
        );
        handle
    }

    fn body_state(&self, body: BodyHandle) -> Option<BodyState> {
        self.bodies.get(&body).map(|body| body.state)
    }

    fn set_velocity(&mut self, body: BodyHandle, velocity: Vec3) -> bool {
        self.bodies
            .get_mut(&body)
            .map(|body| body.state.velocity = velocity)
            .is_some()
    }

    fn apply_impulse_y(&mut self, body: BodyHandle, impulse: f32) -> bool {
        self.impulses.push((body, impulse));
        match self.bodies.get_mut(&body) {
            Some(body) => {
                body.state.velocity.y += impulse / body.mass.max(1.0);
                true
            }
            None => false,
        }
    }

    fn set_angular_factor(&mut self, body: BodyHandle, _factor: Vec3) -> bool {
        self.bodies.contains_key(&body)
    }

    fn set_friction(&mut self, body: BodyHandle, _friction: f32) -> bool {
        self.bodies.contains_key(&body)
    }

    fn watch_contact(&mut self, a: BodyHandle, b: BodyHandle) -> ContactWatchId {
        let id = ContactWatchId(self.next_watch);
        self.next_watch += 1;
        self.watches.push((id, a, b));
        id
    }

    fn drain_contacts(&mut self) -> Vec<ContactEvent> {
        std::mem::take(&mut self.contacts)
    }

    fn destroy(&mut self, body: BodyHandle) -> bool {
        self.watches.retain(|(_, a, b)| *a != body && *b != body);
        self.bodies.remove(&body).is_some()
    }
}

impl ObjectPicker for ScriptedWorld {
    fn pick(&self, _press: &PointerPress) -> Vec<PickHit> {
        self.pick_script
            .iter()
            .filter_map(|(name, distance)| {
                Some(PickHit {
                    body: self.handle_named(name)?,
                    name: name.clone(),
                    distance: *distance,
                })
            })
            .collect()
    }
}

/// Holds every completion until released, to test stale instance handling.
#[derive(Debug, Default)]
struct GatedLoader {
    requested: Vec<LoadTicket>,
}

impl AssetLoader for GatedLoader {
    fn request(&mut self, ticket: LoadTicket) {
        self.requested.push(ticket);
    }

    fn poll_completed(&mut self) -> Vec<LoadCompletion> {
        Vec::new()
    }
}

fn level_one() -> LevelDef {
    LevelDef::new(
        "Level1",
        ExitRule::Advance {
            next: LevelId::new("Level2"),
        },
    )
    .with_assets(["chip", "key", "flag"])
    .with_spawn(Vec3::new(11.0, 3.0, 0.0))
    .with_prop(PropDef::fixed(
        "kill_floor",
        PropRole::KillFloor,
        Vec3::new(0.0, -10.0, 0.0),
        Vec3::new(100.0, 1.0, 100.0),
    ))
    .with_prop(PropDef::fixed(
        "key",
        PropRole::Pickup,
        Vec3::new(8.0, 9.5, 0.0),
        Vec3::new(0.5, 2.0, 0.5),
    ))
    .with_prop(PropDef::fixed(
        "flag",
        PropRole::Goal,
        Vec3::new(-12.0, 5.8, 0.0),
        Vec3::new(1.2, 7.6, 1.2),
    ))
    .with_hazard(PLAYER_BODY_NAME, "kill_floor")
}

fn level_two() -> LevelDef {
    LevelDef::new(
        "Level2",
        ExitRule::Terminal {
            required_item: "key".to_string(),
            reset_to: LevelId::new("Level1"),
        },
    )
    .with_assets(["chip", "flag"])
    .with_spawn(Vec3::new(11.0, 3.0, 0.0))
    .with_prop(PropDef::fixed(
        "kill_floor",
        PropRole::KillFloor,
        Vec3::new(0.0, -10.0, 0.0),
        Vec3::new(100.0, 1.0, 100.0),
    ))
    .with_prop(PropDef::fixed(
        "flag",
        PropRole::Goal,
        Vec3::new(-12.0, 5.8, 0.0),
        Vec3::new(1.2, 7.6, 1.2),
    ))
    .with_hazard(PLAYER_BODY_NAME, "kill_floor")
}

fn locale() -> LocalizationResolver {
    let mut table = LocaleTable::new();
    table.insert("en", "inventory", "Inventory");
    table.insert("en", "you_win", "YOU WIN!");
    table.insert("en", "game_over", "GAME OVER");
    table.insert("en", "no_key", "NO KEY FOUND");
    table.insert("en", "restart", "Click to Restart");
    table.insert("en", "no_save_found", "No Save Found!");
    table.insert("en", "save_game", "[K] Save");
    table.insert("en", "load_game", "[L] Load");
    table.insert("en", "load_auto", "[O] Load Auto-Save");
    table.insert("zh", "inventory", "物品栏");
    table.insert("ar", "inventory", "المخزون");
    LocalizationResolver::new(table)
}

struct Harness {
    machine: LevelStateMachine,
    world: ScriptedWorld,
    assets: ManifestAssetLoader,
}

impl Harness {
    fn new() -> Self {
        let catalog = LevelCatalog::new(vec![level_one(), level_two()]).expect("catalog");
        let mut harness = Self {
            machine: LevelStateMachine::new(
                catalog,
                SaveStore::in_memory(),
                locale(),
                MachineConfig::default(),
            ),
            world: ScriptedWorld::default(),
            assets: ManifestAssetLoader::new(["chip", "key", "flag"]),
        };
        harness
            .machine
            .begin(&mut harness.world, &mut harness.assets)
            .expect("begin");
        harness
    }

    fn tick(&mut self) {
        self.machine
            .tick(DT, &mut self.world, &mut self.assets)
            .expect("tick");
    }

    fn tick_until_active(&mut self) {
        for _ in 0..4 {
            if self.machine.outcome().is_active() {
                return;
            }
            self.tick();
        }
        assert!(self.machine.outcome().is_active(), "{:?}", self.machine.outcome());
    }

    fn click(&mut self) {
        self.machine
            .input_mut()
            .press_pointer(Vec2::new(100.0, 100.0));
    }

    fn pick_key(&mut self) {
        self.world.script_pick("key", 5.0);
        self.click();
        self.tick();
        self.world.pick_script.clear();
    }

    fn walk_to_flag(&mut self) {
        self.world.place(PLAYER_BODY_NAME, Vec3::new(-10.6, 3.25, 0.0));
        self.tick();
    }
}

fn level(id: &str) -> LevelId {
    LevelId::new(id)
}

#[test]
fn loading_waits_for_asset_completions() {
    let mut harness = Harness::new();
    assert_eq!(
        harness.machine.outcome(),
        &LevelOutcome::Loading {
            level: level("Level1")
        }
    );
    assert!(!harness.world.has_body(PLAYER_BODY_NAME));

    harness.tick();

    assert!(harness.machine.outcome().is_active());
    assert_eq!(
        harness.world.position_of(PLAYER_BODY_NAME),
        Vec3::new(11.0, 3.0, 0.0)
    );
    assert!(harness.machine.input().has_touch_controls());
}

#[test]
fn full_run_with_key_ends_in_victory_and_resets_to_first_level() {
    let mut harness = Harness::new();
    harness.tick_until_active();

    harness.pick_key();
    assert_eq!(harness.machine.inventory(), InventorySnapshot::new(["key"]));
    assert!(!harness.world.has_body("key"));
    assert!(harness.machine.saves().has_save(AUTO_SLOT));

    harness.walk_to_flag();
    match harness.machine.outcome() {
        LevelOutcome::Transitioning { next, payload } => {
            assert_eq!(next, &level("Level2"));
            assert_eq!(payload.inventory, InventorySnapshot::new(["key"]));
            assert_eq!(payload.position, None);
        }
        other => panic!("expected transition, got {other:?}"),
    }
    let auto = harness.machine.saves().load(AUTO_SLOT).expect("auto-save");
    assert_eq!(auto.level, "Level2");
    assert_eq!(auto.position, None);

    harness.tick();
    harness.tick_until_active();
    assert_eq!(harness.machine.current_level(), Some(&level("Level2")));
    assert_eq!(harness.machine.inventory(), InventorySnapshot::new(["key"]));
    assert!(!harness.world.has_body("key"));

    harness.walk_to_flag();
    assert_eq!(
        harness.machine.outcome(),
        &LevelOutcome::Victory {
            reset_target: level("Level1")
        }
    );
    let end_screen = harness.machine.end_screen();
    assert_eq!(end_screen.len(), 2);
    assert_eq!(end_screen[0].message_key, "you_win");
    assert_eq!(end_screen[0].color, VICTORY_COLOR);
    assert!(harness.machine.hud_lines().contains(&"YOU WIN!".to_string()));

    harness.click();
    harness.tick();
    assert_eq!(
        harness.machine.outcome(),
        &LevelOutcome::AwaitingRestart {
            reset_target: Some(level("Level1"))
        }
    );

    harness.tick();
    harness.tick_until_active();
    assert_eq!(harness.machine.current_level(), Some(&level("Level1")));
    assert!(harness.machine.inventory().is_empty());
    assert!(harness.machine.end_screen().is_empty());
    assert_eq!(
        harness.world.position_of(PLAYER_BODY_NAME),
        Vec3::new(11.0, 3.0, 0.0)
    );
    assert!(harness.world.has_body("key"));
}

#[test]
fn terminal_exit_without_key_is_no_key_defeat() {
    let mut harness = Harness::new();
    harness.tick_until_active();
    harness.walk_to_flag();
    harness.tick();
    harness.tick_until_active();

    harness.walk_to_flag();

    assert_eq!(
        harness.machine.outcome(),
        &LevelOutcome::Defeat {
            reason: DefeatReason::MissingKey,
            reset_target: Some(level("Level1")),
        }
    );
    assert_eq!(harness.machine.end_screen()[0].message_key, "no_key");
    assert_eq!(harness.machine.end_screen()[0].color, DEFEAT_COLOR);

    harness.click();
    harness.tick();
    harness.tick();
    harness.tick_until_active();
    assert_eq!(harness.machine.current_level(), Some(&level("Level1")));
    assert!(harness.machine.inventory().is_empty());
}

#[test]
fn outcome_latch_ignores_repeated_triggers() {
    let mut harness = Harness::new();
    harness.tick_until_active();

    harness.world.touch(PLAYER_BODY_NAME, "kill_floor");
    harness.tick();
    assert_eq!(
        harness.machine.outcome(),
        &LevelOutcome::Defeat {
            reason: DefeatReason::Hazard,
            reset_target: None,
        }
    );
    assert!(harness.machine.is_game_over());

    harness.world.touch(PLAYER_BODY_NAME, "kill_floor");
    harness.world.place(PLAYER_BODY_NAME, Vec3::new(0.0, -50.0, 0.0));
    harness.machine.check_outcome_triggers(&mut harness.world);
    harness.machine.check_outcome_triggers(&mut harness.world);
    harness.tick();

    assert_eq!(harness.machine.end_screen().len(), 2);
    assert!(!harness.machine.display_end_screen("you_win", VICTORY_COLOR));
    assert_eq!(harness.machine.end_screen().len(), 2);
    assert!(matches!(
        harness.machine.outcome(),
        LevelOutcome::Defeat {
            reason: DefeatReason::Hazard,
            ..
        }
    ));
}

#[test]
fn falling_defeat_rolls_inventory_back_to_level_start() {
    let mut harness = Harness::new();
    harness.tick_until_active();
    harness.pick_key();
    harness.walk_to_flag();
    harness.tick();
    harness.tick_until_active();

    // Level2 starts holding the key; pick up nothing and fall.
    harness.world.place(PLAYER_BODY_NAME, Vec3::new(0.0, -31.0, 0.0));
    harness.tick();
    assert_eq!(
        harness.machine.outcome(),
        &LevelOutcome::Defeat {
            reason: DefeatReason::Fell,
            reset_target: None,
        }
    );
    assert_eq!(harness.machine.end_screen()[0].message_key, "game_over");

    harness.click();
    harness.tick();
    harness.tick();
    harness.tick_until_active();
    assert_eq!(harness.machine.current_level(), Some(&level("Level2")));
    assert_eq!(harness.machine.inventory(), InventorySnapshot::new(["key"]));
}

#[test]
fn restart_in_same_level_drops_items_picked_up_there() {
    let mut harness = Harness::new();
    harness.tick_until_active();
    harness.pick_key();

    harness.world.touch(PLAYER_BODY_NAME, "kill_floor");
    harness.tick();
    harness.click();
    harness.tick();
    harness.tick();
    harness.tick_until_active();

    assert_eq!(harness.machine.current_level(), Some(&level("Level1")));
    assert!(harness.machine.inventory().is_empty());
    assert!(harness.world.has_body("key"));
}

#[test]
fn clicks_during_active_play_do_not_restart() {
    let mut harness = Harness::new();
    harness.tick_until_active();

    harness.click();
    harness.tick();

    assert!(harness.machine.outcome().is_active());
}

#[test]
fn pickup_respects_reach_and_name_markers() {
    let mut harness = Harness::new();
    harness.tick_until_active();

    harness.world.script_pick("key", 25.0);
    harness.world.script_pick("flag", 1.0);
    harness.click();
    harness.tick();

    assert!(harness.machine.inventory().is_empty());
    assert!(harness.world.has_body("key"));
    assert!(!harness.machine.saves().has_save(AUTO_SLOT));
}

#[test]
fn manual_save_and_load_restore_level_inventory_and_position() {
    let mut harness = Harness::new();
    harness.tick_until_active();
    harness.pick_key();
    harness.world.place(PLAYER_BODY_NAME, Vec3::new(4.0, 3.0, 0.0));

    harness.machine.input_mut().set_key(crate::app::InputAction::SaveSlot, true);
    harness.tick();
    harness.machine.input_mut().set_key(crate::app::InputAction::SaveSlot, false);
    let saved = harness.machine.saves().load(MANUAL_SLOT).expect("slot1");
    assert_eq!(saved.level, "Level1");
    assert_eq!(saved.inventory, InventorySnapshot::new(["key"]));
    assert_eq!(saved.position.map(|p| p.to_vec3()), Some(Vec3::new(4.0, 3.0, 0.0)));

    // Die and restart, losing the key, then load the slot.
    harness.world.touch(PLAYER_BODY_NAME, "kill_floor");
    harness.tick();
    harness.click();
    harness.tick();
    harness.tick();
    harness.tick_until_active();
    assert!(harness.machine.inventory().is_empty());

    harness.machine.input_mut().set_key(crate::app::InputAction::LoadSlot, true);
    harness.tick();
    assert!(matches!(
        harness.machine.outcome(),
        LevelOutcome::Transitioning { .. }
    ));
    harness.tick();
    harness.tick_until_active();

    assert_eq!(harness.machine.inventory(), InventorySnapshot::new(["key"]));
    assert_eq!(
        harness.world.position_of(PLAYER_BODY_NAME),
        Vec3::new(4.0, 3.0, 0.0)
    );
}

#[test]
fn loading_empty_slot_shows_notice_and_keeps_playing() {
    let mut harness = Harness::new();
    harness.tick_until_active();

    harness.machine.input_mut().set_key(crate::app::InputAction::LoadAuto, true);
    harness.tick();

    assert!(harness.machine.outcome().is_active());
    assert!(harness
        .machine
        .hud_lines()
        .contains(&"No Save Found!".to_string()));

    for _ in 0..200 {
        harness.tick();
    }
    assert!(harness.machine.hud_messages().is_empty());
}

#[test]
fn control_hints_show_only_during_play() {
    let mut harness = Harness::new();
    assert_eq!(harness.machine.hud_lines().len(), 1);

    harness.tick_until_active();
    assert_eq!(
        harness.machine.hud_lines()[1],
        "[K] Save [L] Load [O] Load Auto-Save"
    );

    harness.world.place(PLAYER_BODY_NAME, Vec3::new(11.0, -31.0, 0.0));
    harness.tick();
    assert!(harness.machine.is_game_over());
    assert_eq!(
        harness.machine.hud_lines(),
        ["Inventory: ", "GAME OVER", "Click to Restart"]
    );
}

#[test]
fn save_naming_unknown_level_is_treated_as_missing() {
    let mut harness = Harness::new();
    harness.tick_until_active();
    let live = crate::save::LiveState {
        level: "Level9".to_string(),
        inventory: InventorySnapshot::default(),
        language: "en".to_string(),
        position: None,
    };
    harness
        .machine
        .saves_mut()
        .save(MANUAL_SLOT, &live, &crate::save::SaveOverrides::none())
        .expect("save");

    harness.machine.input_mut().set_key(crate::app::InputAction::LoadSlot, true);
    harness.tick();

    assert!(harness.machine.outcome().is_active());
    assert_eq!(harness.machine.current_level(), Some(&level("Level1")));
}

#[test]
fn language_cycles_and_survives_transition() {
    let mut harness = Harness::new();
    harness.tick_until_active();

    harness
        .machine
        .input_mut()
        .set_key(crate::app::InputAction::CycleLanguage, true);
    harness.tick();
    harness
        .machine
        .input_mut()
        .set_key(crate::app::InputAction::CycleLanguage, false);
    assert_eq!(harness.machine.language(), "zh");
    assert!(harness.machine.hud_lines()[0].starts_with("物品栏"));

    harness
        .machine
        .input_mut()
        .set_key(crate::app::InputAction::CycleLanguage, true);
    harness.tick();
    assert_eq!(harness.machine.language(), "ar");
    assert!(harness.machine.is_right_to_left());

    harness.walk_to_flag();
    harness.tick();
    harness.tick_until_active();
    assert_eq!(harness.machine.language(), "ar");
}

#[test]
fn language_cycled_while_transitioning_reaches_next_level() {
    let mut harness = Harness::new();
    harness.tick_until_active();
    harness.walk_to_flag();
    assert!(matches!(
        harness.machine.outcome(),
        LevelOutcome::Transitioning { .. }
    ));

    harness
        .machine
        .input_mut()
        .set_key(crate::app::InputAction::CycleLanguage, true);
    harness.tick();
    harness
        .machine
        .input_mut()
        .set_key(crate::app::InputAction::CycleLanguage, false);
    harness.tick_until_active();

    assert_eq!(harness.machine.current_level(), Some(&level("Level2")));
    assert_eq!(harness.machine.language(), "zh");
}

#[test]
fn contacts_do_not_accumulate_on_outcome_screen() {
    let catalog = LevelCatalog::new(vec![level_one(), level_two()]).expect("catalog");
    let mut machine = LevelStateMachine::new(
        catalog,
        SaveStore::in_memory(),
        locale(),
        MachineConfig::default(),
    );
    let mut world = SandboxWorld::new();
    let mut assets = ManifestAssetLoader::new(["chip", "key", "flag"]);
    machine.begin(&mut world, &mut assets).expect("begin");

    // Nothing under the spawn point: the player drops onto the kill floor.
    for _ in 0..600 {
        machine.tick(DT, &mut world, &mut assets).expect("tick");
        world.step(DT);
        if machine.is_game_over() {
            break;
        }
    }
    assert!(matches!(
        machine.outcome(),
        LevelOutcome::Defeat {
            reason: DefeatReason::Hazard,
            ..
        }
    ));

    // The player rests on the kill floor, so every step reports the contact.
    for _ in 0..600 {
        machine.tick(DT, &mut world, &mut assets).expect("tick");
        world.step(DT);
    }
    assert!(world.drain_contacts().len() <= 1);
    assert!(matches!(machine.outcome(), LevelOutcome::Defeat { .. }));
}

#[test]
fn stale_asset_completions_are_ignored() {
    let catalog = LevelCatalog::new(vec![level_one(), level_two()]).expect("catalog");
    let mut machine = LevelStateMachine::new(
        catalog,
        SaveStore::in_memory(),
        locale(),
        MachineConfig::default(),
    );
    let mut world = ScriptedWorld::default();
    let mut gated = GatedLoader::default();
    machine.begin(&mut world, &mut gated).expect("begin");
    let stale_instance = machine.instance();

    // Restart before the first instance finished loading.
    machine
        .begin_at(&level("Level2"), &mut world, &mut gated)
        .expect("begin level2");
    assert_ne!(machine.instance(), stale_instance);

    struct Replay(Vec<LoadCompletion>);
    impl AssetLoader for Replay {
        fn request(&mut self, _ticket: LoadTicket) {}
        fn poll_completed(&mut self) -> Vec<LoadCompletion> {
            std::mem::take(&mut self.0)
        }
    }
    let stale = gated
        .requested
        .iter()
        .filter(|ticket| ticket.instance == stale_instance)
        .map(|ticket| LoadCompletion {
            ticket: ticket.clone(),
            result: Ok(AssetHandle(0)),
        })
        .collect::<Vec<_>>();
    let mut replay = Replay(stale);
    machine.tick(DT, &mut world, &mut replay).expect("tick");

    assert_eq!(
        machine.outcome(),
        &LevelOutcome::Loading {
            level: level("Level2")
        }
    );
    assert!(!world.has_body(PLAYER_BODY_NAME));

    let current = gated
        .requested
        .iter()
        .filter(|ticket| ticket.instance == machine.instance())
        .map(|ticket| LoadCompletion {
            ticket: ticket.clone(),
            result: Ok(AssetHandle(1)),
        })
        .collect::<Vec<_>>();
    let mut replay = Replay(current);
    machine.tick(DT, &mut world, &mut replay).expect("tick");
    assert!(machine.outcome().is_active());
}

#[test]
fn failed_asset_surfaces_setup_error() {
    let catalog = LevelCatalog::new(vec![level_one(), level_two()]).expect("catalog");
    let mut machine = LevelStateMachine::new(
        catalog,
        SaveStore::in_memory(),
        locale(),
        MachineConfig::default(),
    );
    let mut world = ScriptedWorld::default();
    let mut assets = ManifestAssetLoader::new(["chip", "flag"]);
    machine.begin(&mut world, &mut assets).expect("begin");

    let error = machine
        .tick(DT, &mut world, &mut assets)
        .expect_err("key asset missing");
    assert!(matches!(error, LevelSetupError::Asset { ref level, .. } if level == "Level1"));
}

#[test]
fn controller_jump_goes_through_machine() {
    let mut harness = Harness::new();
    harness.tick_until_active();

    harness.machine.input_mut().set_key(crate::app::InputAction::Jump, true);
    harness.tick();

    let player = harness.machine.player_body().expect("player");
    assert_eq!(harness.world.impulses, vec![(player, 7.0)]);
}

#[test]
fn catalog_rejects_unknown_exit_and_duplicates() {
    assert_eq!(
        LevelCatalog::new(vec![level_one()]).map(|_| ()),
        Err(CatalogError::UnknownExitTarget {
            level: "Level1".to_string(),
            target: "Level2".to_string(),
        })
    );
    assert_eq!(
        LevelCatalog::new(vec![level_one(), level_two(), level_two()]).map(|_| ()),
        Err(CatalogError::DuplicateLevel {
            level: "Level2".to_string(),
        })
    );
    assert_eq!(LevelCatalog::new(Vec::new()).map(|_| ()), Err(CatalogError::Empty));
}

#[test]
fn unknown_hazard_body_fails_before_spawning() {
    let def = level_one().with_hazard("cube", "kill_floor");
    let mut world = ScriptedWorld::default();

    let error = def.setup_level(&mut world, None).expect_err("no cube prop");

    assert!(matches!(error, LevelSetupError::UnknownHazardBody { ref name, .. } if name == "cube"));
    assert!(world.bodies.is_empty());
}

#[test]
fn goal_proximity_is_measured_to_goal_surface() {
    let def = level_one();
    let mut world = ScriptedWorld::default();
    let bodies = def.setup_level(&mut world, None).expect("setup");

    assert!(def.exit_condition(&bodies, Vec3::new(-10.6, 3.25, 0.0)));
    assert!(def.exit_condition(&bodies, Vec3::new(-9.0, 3.25, 0.0)));
    assert!(!def.exit_condition(&bodies, Vec3::new(-8.5, 3.25, 0.0)));
}
