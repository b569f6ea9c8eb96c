//! Symbol collector (component C2): turns a parsed compilation unit into a
//! [`javastub_core::StubPlan`] of the symbols it references but doesn't
//! declare or that the [`javastub_index::ContextIndex`] doesn't already
//! know about.

mod collector;
mod error;
mod local;
mod resolve;

pub use collector::{collect, CollectOutcome};
pub use error::{Error, Result};
pub use local::{declared_members, declared_types, simple_name_lookup, DeclaredMembers};
pub use resolve::{Resolver, TypeResolution};
