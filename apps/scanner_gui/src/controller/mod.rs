//! Controller layer: UI events, the batch card instance, and command
//! orchestration.

pub mod card;
pub mod events;
pub mod orchestration;
