pub mod scheduler;
pub mod task;

pub use scheduler::{Pass, Scheduler};
pub use task::{Dispatcher, StageWork, TaskStage, TransitionTable};
