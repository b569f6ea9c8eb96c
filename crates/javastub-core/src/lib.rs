//! Shared data model for the partial-method stub compiler.
//!
//! This crate is intentionally small and has no filesystem or process
//! dependencies: it holds the [`TypeRef`]/[`StubPlan`] value types (spec §3)
//! and the external request/outcome contract (spec §6) that every other
//! crate in the workspace builds on.

mod contract;
mod name;
mod plan;
mod type_ref;

pub use contract::{
    AmbiguityPolicy, DepMode, MethodId, Options, Outcome, Request, SliceMode, Status,
};
pub use name::{InternedName, Name, NameInterner};
pub use plan::{
    CtorKey, CtorStub, FieldKey, FieldStub, MethodKey, MethodStub, MirrorTarget, StubPlan,
    TypeKind, TypeParamStub, TypeStub, Visibility,
};
pub use type_ref::{dot_to_dollar_for_nested, simple_name_of, Primitive, TypeRef, TypeRefKind, TOP_TYPE};
