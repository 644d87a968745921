//! These models represent the objects passed around by the agent
//!
//! The wire formats of the LLM services we talk to all differ slightly, so
//! providers convert to and from these internal structs at their boundary.
//! The conversation itself only ever sees this representation.
pub mod message;
pub mod role;
pub mod tool;
