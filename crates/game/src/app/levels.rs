use chipquest_engine::level::PLAYER_BODY_NAME;
use chipquest_engine::{CatalogError, ExitRule, LevelCatalog, LevelDef, LevelId, PropDef, PropRole};
use glam::Vec3;

pub(crate) const LEVEL_ONE: &str = "Level1";
pub(crate) const LEVEL_TWO: &str = "Level2";
pub(crate) const KEY_ITEM: &str = "key";

/// Every asset name the manifest loader can resolve.
pub(crate) const ASSET_MANIFEST: [&str; 6] = ["chip", "cube", "flag", "platform", "key", "small"];

const SPAWN: Vec3 = Vec3::new(11.0, 3.0, 0.0);
const PLATFORM_SIZE: Vec3 = Vec3::new(8.0, 2.0, 2.0);
const FLAG_POSITION: Vec3 = Vec3::new(-12.0, 5.8, 0.0);
const FLAG_SIZE: Vec3 = Vec3::new(1.2, 7.6, 1.2);

fn kill_floor() -> PropDef {
    PropDef::fixed(
        "kill_floor",
        PropRole::KillFloor,
        Vec3::new(0.0, -10.0, 0.0),
        Vec3::new(100.0, 1.0, 100.0),
    )
}

fn flag() -> PropDef {
    PropDef::fixed("flag", PropRole::Goal, FLAG_POSITION, FLAG_SIZE)
}

fn platform(name: &str, x: f32) -> PropDef {
    PropDef::fixed(name, PropRole::Platform, Vec3::new(x, 1.0, 0.0), PLATFORM_SIZE)
}

fn level_one() -> LevelDef {
    LevelDef::new(
        LEVEL_ONE,
        ExitRule::Advance {
            next: LevelId::new(LEVEL_TWO),
        },
    )
    .with_assets(["chip", "cube", "flag", "platform", "key"])
    .with_spawn(SPAWN)
    .with_prop(kill_floor())
    .with_prop(flag())
    .with_prop(platform("platform_east", 8.0))
    .with_prop(platform("platform_west", -9.0))
    .with_prop(PropDef::dynamic(
        "cube",
        Vec3::new(8.0, 2.0, 0.0),
        Vec3::splat(2.0),
        5.0,
    ))
    .with_prop(PropDef::fixed(
        KEY_ITEM,
        PropRole::Pickup,
        Vec3::new(8.0, 9.5, 0.0),
        Vec3::new(0.5, 2.0, 0.5),
    ))
    .with_hazard(PLAYER_BODY_NAME, "kill_floor")
    .with_hazard("cube", "kill_floor")
}

fn level_two() -> LevelDef {
    LevelDef::new(
        LEVEL_TWO,
        ExitRule::Terminal {
            required_item: KEY_ITEM.to_string(),
            reset_to: LevelId::new(LEVEL_ONE),
        },
    )
    .with_assets(["chip", "small", "flag", "platform"])
    .with_spawn(SPAWN)
    .with_prop(kill_floor())
    .with_prop(flag())
    .with_prop(PropDef::fixed(
        "small_platform",
        PropRole::Platform,
        Vec3::new(0.0, 1.0, 0.0),
        Vec3::splat(2.0),
    ))
    .with_prop(platform("platform_east", 9.0))
    .with_prop(platform("platform_west", -9.0))
    .with_hazard(PLAYER_BODY_NAME, "kill_floor")
}

pub(crate) fn build_catalog() -> Result<LevelCatalog, CatalogError> {
    LevelCatalog::new(vec![level_one(), level_two()])
}
