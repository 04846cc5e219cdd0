//! Lockbox engine: the compartment access controller.
//!
//! This crate contains the access state machine together with the pieces it
//! drives: the code buffer, keypress classification, the lock actuator pulse
//! sequencer, the lock sensor reader and a text-mode virtual display.

pub mod actuator;
pub mod code_buffer;
pub mod display;
pub mod error;
pub mod input;
pub mod sensor;
pub mod state_machine;

pub use actuator::LockActuator;
pub use code_buffer::CodeBuffer;
pub use display::{
    Alignment, VirtualDisplay, VirtualDisplayBuilder, align_text, screen_for, truncate_text,
};
pub use error::CoreFault;
pub use input::{Action, AdvanceTrigger, classify};
pub use sensor::SensorReader;
pub use state_machine::{
    AccessStateMachine, AccessStateMachineBuilder, SessionState, StateTransition, TickOutcome,
};

// Re-export the shared state types so drivers need only this crate
pub use lockbox_core::{AccessState, OperationKind, SessionSnapshot};
