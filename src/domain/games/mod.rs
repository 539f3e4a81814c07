// Game-specific rules, boards and tuning.

pub mod daily_grind;
pub mod mug_shot;
pub mod procrastination;
pub mod true_color;
pub mod unique;
