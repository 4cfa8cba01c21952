//! Declarative trackers
//!
//! A tracker binds a syntactic category (object creations, property
//! accesses) to an ordered list of conditions and a message payload. Every
//! visited node of the category evaluates the conditions left to right; when
//! all hold, a diagnostic is reported immediately.
//!
//! ```text
//! ObjectCreationTracker::track(registry, &RULE, &["message"], vec![
//!     MatchConstructor(NETWORK_CREDENTIAL),
//!     ArgumentAtIndexIs(1, SYSTEM_STRING),
//!     ArgumentAtIndexIsConst(1),
//! ])
//! ```

mod object_creation;
mod property_access;

pub use object_creation::{ObjectCreationCondition, ObjectCreationTracker};
pub use property_access::{PropertyAccessCondition, PropertyAccessTracker};

use crate::language::Language;
use crate::rule::{NodeContext, RuleDescriptor, RuleRegistry};
use crate::syntax::KindSet;
use std::fmt::Debug;

/// A predicate over one node visit
///
/// Conditions fail closed: an unresolved symbol or a node without the
/// expected shape evaluates to `false`.
pub trait Condition: Debug + Send + Sync + 'static {
    fn evaluate<L: Language>(&self, ctx: &NodeContext<'_, L>) -> bool;
}

/// Register `conditions` on `kinds`; report `message_args` when all of them hold
pub(crate) fn track<L, C>(
    registry: &mut RuleRegistry<L>,
    kinds: KindSet<L::Kind>,
    descriptor: &'static RuleDescriptor,
    message_args: &[&str],
    conditions: Vec<C>,
) where
    L: Language,
    C: Condition,
{
    let args: Vec<String> = message_args.iter().map(|a| a.to_string()).collect();
    log::debug!(
        "tracking {} on {} kind(s) with {} condition(s)",
        descriptor.id,
        kinds.as_slice().len(),
        conditions.len()
    );

    registry.register_node_action(descriptor, kinds, move |ctx| {
        if conditions.iter().all(|c| c.evaluate(ctx)) {
            let node = ctx.node();
            ctx.report(descriptor, node, &args);
        }
    });
}
