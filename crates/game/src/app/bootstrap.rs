use std::env;

use chipquest_engine::{
    resolve_app_paths, AppError, FileSaveBackend, LevelCatalog, LevelId, LocaleTable,
    LocalizationResolver, LoopConfig, MachineConfig, SaveStore, DEFAULT_LANGUAGE,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use super::levels;
use super::session::GameSession;

const LANGUAGE_ENV_VAR: &str = "CHIPQUEST_LANG";
const START_LEVEL_ENV_VAR: &str = "CHIPQUEST_START_LEVEL";
const LOCALES_XML: &str = include_str!("../../assets/locales.xml");

pub(crate) struct AppWiring {
    pub(crate) config: LoopConfig,
    pub(crate) session: GameSession,
}

pub(crate) fn build_app() -> Result<AppWiring, AppError> {
    init_tracing();
    info!("=== Chip Quest Startup ===");

    let app_paths = resolve_app_paths()?;
    info!(
        root = %app_paths.root.display(),
        assets_dir = %app_paths.assets_dir.display(),
        saves_dir = %app_paths.saves_dir.display(),
        "startup"
    );

    let locale = LocalizationResolver::new(LocaleTable::from_xml(LOCALES_XML)?);
    let catalog = levels::build_catalog()?;
    let language = language_from_env(env::var(LANGUAGE_ENV_VAR).ok(), &locale);
    let start_level = start_level_from_env(env::var(START_LEVEL_ENV_VAR).ok(), &catalog);

    let config = LoopConfig::default();
    let machine_config = MachineConfig {
        initial_language: language,
        viewport: (config.window_width, config.window_height),
        ..MachineConfig::default()
    };
    let saves = SaveStore::new(FileSaveBackend::new(app_paths.saves_dir));
    let session = GameSession::start(catalog, saves, locale, machine_config, start_level)?;

    Ok(AppWiring { config, session })
}

fn init_tracing() {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_thread_names(true)
        .compact()
        .init();
}

fn language_from_env(raw: Option<String>, locale: &LocalizationResolver) -> String {
    let Some(value) = raw.map(|value| value.trim().to_string()) else {
        return DEFAULT_LANGUAGE.to_string();
    };
    if locale.table().has_language(&value) {
        value
    } else {
        warn!(
            env_var = LANGUAGE_ENV_VAR,
            value = value.as_str(),
            "unknown language; falling back to default"
        );
        DEFAULT_LANGUAGE.to_string()
    }
}

fn start_level_from_env(raw: Option<String>, catalog: &LevelCatalog) -> Option<LevelId> {
    let value = raw?.trim().to_string();
    if value.is_empty() {
        return None;
    }
    if catalog.contains(&value) {
        Some(LevelId::new(value))
    } else {
        warn!(
            env_var = START_LEVEL_ENV_VAR,
            value = value.as_str(),
            "unknown start level; starting at first level"
        );
        None
    }
}
