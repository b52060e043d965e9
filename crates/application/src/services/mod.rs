pub mod action_interpreter;

pub use action_interpreter::ActionInterpreter;
