//! Rules protecting the contact scheduler's view of channels

mod channel_naming;
mod gs_class_annos;
mod gs_provider_validation;
mod gs_template_class_annos;
mod halftrack_consistency;
mod interval_charge_constraint;
mod link_profiles;
mod sband_bidirs;
mod shared_separation_constraint_sets;
mod template_channels_enable_legal_flags;
mod window_params;

use crate::registry::RuleRegistry;

pub(super) fn register(registry: &mut RuleRegistry) {
    channel_naming::register(registry);
    template_channels_enable_legal_flags::register(registry);
    gs_class_annos::register(registry);
    gs_template_class_annos::register(registry);
    link_profiles::register(registry);
    sband_bidirs::register(registry);
    window_params::register(registry);
    shared_separation_constraint_sets::register(registry);
    interval_charge_constraint::register(registry);
    halftrack_consistency::register(registry);
    gs_provider_validation::register(registry);
}
