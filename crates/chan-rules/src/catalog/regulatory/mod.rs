//! Licensing and coordination rules

mod sband;
mod xband;

use crate::registry::RuleRegistry;

pub(super) fn register(registry: &mut RuleRegistry) {
    xband::register(registry);
    sband::register(registry);
}
