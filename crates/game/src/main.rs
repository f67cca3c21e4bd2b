mod app;

use chipquest_engine::run_app;
use tracing::error;

fn main() {
    let wiring = match app::build_app() {
        Ok(wiring) => wiring,
        Err(err) => {
            error!(error = %err, "startup_failed");
            std::process::exit(1);
        }
    };

    if let Err(err) = run_app(wiring.config, Box::new(wiring.session)) {
        error!(error = %err, "run_failed");
        std::process::exit(1);
    }
}
