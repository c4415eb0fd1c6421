//! Rules guarding what the constellation pipeline derives from channels

mod adcs_config_consistency;
mod otc_p1_lsc_consistency;
mod pls_consistency;
mod radio_band_consistency;

use crate::registry::RuleRegistry;

pub(super) fn register(registry: &mut RuleRegistry) {
    pls_consistency::register(registry);
    radio_band_consistency::register(registry);
    adcs_config_consistency::register(registry);
    otc_p1_lsc_consistency::register(registry);
}
