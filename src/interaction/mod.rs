mod state;

pub use state::{HoverChange, InteractionPhase, InteractionState};
