//! Cross-file consistency of templates and asset configs

use crate::error::TemplateValidationError;
use crate::input::{class_annos_of, AssetConfig};

/// Satellite and GS templates must define the same channel ids
///
/// # Errors
/// [`TemplateValidationError::ChannelSetMismatch`] for the first channel found
/// in one file but not the other, satellite side first.
pub fn check_template_channel_sets(
    sat_file: &str,
    sat_templates: &AssetConfig,
    gs_file: &str,
    gs_templates: &AssetConfig,
) -> Result<(), TemplateValidationError> {
    let mismatch = |channel: &str, present_in: &str, absent_from: &str| TemplateValidationError::ChannelSetMismatch {
        channel: channel.to_string(),
        present_in: present_in.to_string(),
        absent_from: absent_from.to_string(),
    };
    if let Some(channel) = sat_templates.keys().find(|k| !gs_templates.contains_key(*k)) {
        return Err(mismatch(channel.as_str(), sat_file, gs_file));
    }
    if let Some(channel) = gs_templates.keys().find(|k| !sat_templates.contains_key(*k)) {
        return Err(mismatch(channel.as_str(), gs_file, sat_file));
    }
    Ok(())
}

/// No two GS template channels may share classification annotations
///
/// # Errors
/// [`TemplateValidationError::DuplicateAnnotations`] naming the first pair,
/// larger id first.
pub fn check_unique_class_annos(gs_file: &str, gs_templates: &AssetConfig) -> Result<(), TemplateValidationError> {
    let annotated: Vec<(&String, _)> = gs_templates
        .iter()
        .map(|(id, value)| (id, value.as_object().map(class_annos_of).unwrap_or_default()))
        .collect();

    for (i, (first, first_annos)) in annotated.iter().enumerate() {
        for (second, second_annos) in &annotated[i + 1..] {
            if first_annos == second_annos {
                let (larger, smaller) = if first > second { (first, second) } else { (second, first) };
                return Err(TemplateValidationError::DuplicateAnnotations {
                    file: gs_file.to_string(),
                    first: (*larger).clone(),
                    second: (*smaller).clone(),
                });
            }
        }
    }
    Ok(())
}

/// Every channel id an asset configures must exist in its template file
///
/// # Errors
/// [`TemplateValidationError::UnknownChannel`] for the first unknown id.
pub fn check_allowed_keys(
    template_file: &str,
    templates: &AssetConfig,
    asset: &str,
    config: &AssetConfig,
) -> Result<(), TemplateValidationError> {
    match config.keys().find(|k| !templates.contains_key(*k)) {
        None => Ok(()),
        Some(channel) => Err(TemplateValidationError::UnknownChannel {
            channel: channel.clone(),
            asset: asset.to_string(),
            template_file: template_file.to_string(),
        }),
    }
}
