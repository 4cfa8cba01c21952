//! Built-in rules
//!
//! | Rule  | Grammars | Default  | Detects                                   |
//! |-------|----------|----------|-------------------------------------------|
//! | S2068 | C#, VB   | enabled  | hard-coded credentials                    |
//! | S127  | C#       | enabled  | `for` counters updated in the loop body   |
//! | S2436 | C#       | disabled | types and methods with many type params   |
//! | S1186 | C#       | enabled  | empty method bodies                       |
//! | S6354 | C#, VB   | enabled  | direct `DateTime.Now` access              |

pub mod credentials;
pub mod empty_method;
pub mod generic_parameters;
pub mod loop_counter;
pub mod time_provider;

pub use credentials::{CredentialWordSet, CredentialWords, HardcodedCredentials};
pub use empty_method::EmptyMethod;
pub use generic_parameters::TooManyGenericParameters;
pub use loop_counter::LoopCounterChanged;
pub use time_provider::TestableTimeProvider;

use crate::config::RuleSettings;
use crate::language::{CSharp, VisualBasic};
use crate::rule::{Rule, RuleDescriptor};
use std::sync::Arc;

/// Descriptors of every built-in rule, in catalog order
pub fn all_descriptors() -> Vec<&'static RuleDescriptor> {
    vec![
        &credentials::DESCRIPTOR,
        &loop_counter::DESCRIPTOR,
        &generic_parameters::DESCRIPTOR,
        &empty_method::DESCRIPTOR,
        &time_provider::DESCRIPTOR,
    ]
}

/// Look up a descriptor by rule id (case-insensitive)
pub fn find_descriptor(id: &str) -> Option<&'static RuleDescriptor> {
    all_descriptors()
        .into_iter()
        .find(|d| d.id.eq_ignore_ascii_case(id))
}

pub fn csharp_rules(settings: &RuleSettings) -> Vec<Box<dyn Rule<CSharp>>> {
    vec![
        Box::new(HardcodedCredentials::new(Arc::clone(&settings.credential_words))),
        Box::new(LoopCounterChanged),
        Box::new(TooManyGenericParameters {
            max_in_class: settings.max_generic_parameters_in_class,
            max_in_method: settings.max_generic_parameters_in_method,
        }),
        Box::new(EmptyMethod),
        Box::new(TestableTimeProvider),
    ]
}

pub fn visual_basic_rules(settings: &RuleSettings) -> Vec<Box<dyn Rule<VisualBasic>>> {
    vec![
        Box::new(HardcodedCredentials::new(Arc::clone(&settings.credential_words))),
        Box::new(TestableTimeProvider),
    ]
}
