mod aggregator;
mod host_input;
mod input;
mod loop_runner;
mod touch;

pub use aggregator::{InputAggregator, InputFrame, TickCommands};
pub use host_input::{action_for_key, HostInputCollector};
pub use input::{InputAction, KeyboardSource, PointerPress};
pub use loop_runner::{run_app, AppError, LoopConfig, Simulation, SLOW_FRAME_ENV_VAR};
pub use touch::{
    TouchControls, TouchLayout, TouchPhase, DEFAULT_JOYSTICK_RADIUS_PX, DEFAULT_JUMP_ZONE_START,
};
