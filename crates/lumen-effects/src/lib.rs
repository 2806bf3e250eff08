//! Maps structural section changes to lighting effects, drawn from
//! light-show-type-specific pools, and applies them through an
//! [`EffectSink`].

mod controller;
mod effect;
mod pools;
mod sink;

pub use controller::EffectController;
pub use effect::Effect;
pub use sink::EffectSink;
