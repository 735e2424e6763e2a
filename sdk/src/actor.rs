//! Actor trait
//!
//! This module defines the `Actor` trait: the full capability set the engine
//! consumes from the controlled character. The scheduler never inspects actor
//! internals beyond these signals, and it is the sole submitter of
//! directives; an implementation can therefore assume strictly serialized
//! `submit` calls, each bracketed by idle waits.

use async_trait::async_trait;

/// The controlled character.
///
/// Implementations wrap whatever runtime actually talks and moves: an
/// in-process character controller, a remote animation service, or a test
/// double. Directives are opaque strings in the canonical command grammar;
/// the actor is free to interpret or reject them, but it never reports a
/// failure back: the engine observes progress only through the two busy
/// predicates.
#[async_trait]
pub trait Actor: Send + Sync {
    /// Stable identity of this character, used to parameterize script
    /// requests. Read once at session start.
    fn identity(&self) -> &str;

    /// True while the character is producing speech output.
    async fn is_speaking(&self) -> bool;

    /// True while the character is carrying out a non-speech action
    /// (walking, gesturing, ...).
    async fn is_performing_action(&self) -> bool;

    /// Hand a directive to the character. Fire-and-forget: completion is
    /// observed via `is_speaking` / `is_performing_action` going false.
    async fn submit(&self, directive: &str);
}
