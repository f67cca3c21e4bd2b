mod bootstrap;
mod levels;
mod session;

pub(crate) use bootstrap::build_app;
