//! Subcommand implementations
//!
//! Each command works through a [`Session`]; editing commands funnel their
//! per-channel logic through [`Session::apply_update`].

use std::path::PathBuf;

use chan_rules::{input::class_annos_of, AssetConfig, AssetKind, Environment};
use chan_store::{yaml, AssetSelector, ChannelSelector, Inventory, StoreError};
use chan_tree::{lookup, ChannelRecord, ChannelValue};

use crate::audit::{default_inspections, AuditReport};
use crate::duplicate::{DuplicatePlan, DuplicateRequest};
use crate::error::{CommandError, CommandResult};
use crate::fields::{modify, FieldEdits};
use crate::session::{record_diff, ProcessFlags, Session};

/// Environment, assets and channels a command acts on
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Targets {
    /// Environment whose configs are read and written
    pub env: Environment,
    /// Assets to act on
    pub assets: AssetSelector,
    /// Channels to act on
    pub channels: ChannelSelector,
}

impl Targets {
    fn resolve(&self, session: &Session<'_>) -> CommandResult<(Vec<String>, Vec<String>)> {
        let assets = session.store.locate_assets(self.env, &self.assets)?;
        let channels = session.store.locate_channels(&self.channels)?;
        Ok((assets, channels))
    }
}

/// Both template files, loaded once per command
struct TemplateSet {
    gs: AssetConfig,
    gs_file: String,
    sat: AssetConfig,
    sat_file: String,
}

impl TemplateSet {
    fn load(session: &Session<'_>) -> CommandResult<Self> {
        let layout = session.store.layout();
        Ok(Self {
            gs: session.store.templates(AssetKind::GroundStation)?,
            gs_file: layout.template_file_name(AssetKind::GroundStation).to_string(),
            sat: session.store.templates(AssetKind::Satellite)?,
            sat_file: layout.template_file_name(AssetKind::Satellite).to_string(),
        })
    }

    fn record(&self, kind: AssetKind, channel: &str) -> Result<&ChannelRecord, StoreError> {
        let (templates, file) = match kind {
            AssetKind::GroundStation => (&self.gs, &self.gs_file),
            AssetKind::Satellite => (&self.sat, &self.sat_file),
        };
        templates
            .get(channel)
            .and_then(ChannelValue::as_object)
            .ok_or_else(|| StoreError::MissingTemplate {
                channel: channel.to_string(),
                file: file.clone(),
            })
    }
}

/// `add`: seed channels from templates, then apply edits
///
/// # Errors
/// Selector, load and save failures; per-channel errors with `fail_fast`.
pub fn add(session: &mut Session<'_>, targets: &Targets, edits: &FieldEdits, flags: ProcessFlags) -> CommandResult<()> {
    let (assets, channels) = targets.resolve(session)?;
    let templates = TemplateSet::load(session)?;
    session.apply_update(targets.env, &assets, &channels, flags, |slot| {
        if slot.existing.is_some() {
            return Err(CommandError::AlreadyExists {
                asset: slot.asset.to_string(),
                channel: slot.channel.to_string(),
            });
        }
        let template = templates.record(AssetKind::infer(slot.asset), slot.channel)?;
        modify(template, edits)
    })
}

/// `edit`: modify existing channels
///
/// # Errors
/// See [`add`].
pub fn edit(session: &mut Session<'_>, targets: &Targets, edits: &FieldEdits, flags: ProcessFlags) -> CommandResult<()> {
    let (assets, channels) = targets.resolve(session)?;
    session.apply_update(targets.env, &assets, &channels, flags, |slot| match slot.existing {
        Some(existing) => modify(existing, edits),
        None => Err(CommandError::NoConfiguration {
            asset: slot.asset.to_string(),
            channel: slot.channel.to_string(),
        }),
    })
}

/// `delete`: remove channels
///
/// # Errors
/// See [`add`]; absent channels fail only with `require_existing`.
pub fn delete(
    session: &mut Session<'_>,
    targets: &Targets,
    require_existing: bool,
    flags: ProcessFlags,
) -> CommandResult<()> {
    let (assets, channels) = targets.resolve(session)?;
    session.apply_update(targets.env, &assets, &channels, flags, |slot| {
        if slot.existing.is_none() && require_existing {
            return Err(CommandError::NothingToDelete {
                asset: slot.asset.to_string(),
                channel: slot.channel.to_string(),
            });
        }
        Ok(None)
    })
}

/// `duplicate`: derive a channel with a new PLS next to `source`
///
/// Template entries for the new id are derived from the source templates
/// when missing. Only assets configuring `source` receive the copy.
///
/// # Errors
/// Unsupported source channels, naming failures, and see [`add`].
pub fn duplicate(
    session: &mut Session<'_>,
    env: Environment,
    assets: &AssetSelector,
    source: &str,
    request: DuplicateRequest,
    flags: ProcessFlags,
) -> CommandResult<()> {
    let templates = TemplateSet::load(session)?;
    let annos = class_annos_of(templates.record(AssetKind::GroundStation, source)?);
    let plan = DuplicatePlan::new(request, &annos)?;
    tracing::info!(source, channel = %plan.channel, "duplicating channel");

    add_template_entries(session, &templates, &plan, source)?;

    let mut holders = Vec::new();
    for asset in session.store.locate_assets(env, assets)? {
        let config = session.store.load_asset(env, &asset)?;
        if config.get(source).is_some_and(ChannelValue::is_object) {
            holders.push(asset);
        }
    }

    let channels = [plan.channel.clone()];
    session.apply_update(env, &holders, &channels, flags, |slot| {
        if slot.existing.is_some() {
            return Err(CommandError::AlreadyExists {
                asset: slot.asset.to_string(),
                channel: slot.channel.to_string(),
            });
        }
        match slot.config.get(source).and_then(ChannelValue::as_object) {
            Some(original) => plan.derive(original).map(Some),
            None => Ok(None),
        }
    })
}

fn add_template_entries(
    session: &mut Session<'_>,
    templates: &TemplateSet,
    plan: &DuplicatePlan,
    source: &str,
) -> CommandResult<()> {
    for (kind, current, file) in [
        (AssetKind::GroundStation, &templates.gs, &templates.gs_file),
        (AssetKind::Satellite, &templates.sat, &templates.sat_file),
    ] {
        // Both kinds may share one file; reread so the second pass keeps the first.
        let mut updated = if templates.gs_file == templates.sat_file && kind == AssetKind::Satellite {
            session.store.templates(kind)?
        } else {
            current.clone()
        };
        if updated.contains_key(&plan.channel) {
            continue;
        }
        let derived = plan.derive(templates.record(kind, source)?)?;
        updated.insert(plan.channel.clone(), ChannelValue::Object(derived));
        session.store.save_templates(kind, &updated)?;
        session.console.line(format!("Added {} to {file}.", plan.channel))?;
    }
    Ok(())
}

/// `audit`: usable and rejected channels of every satellite / GS pair
///
/// # Errors
/// Selector, load and inventory failures.
pub fn audit(
    session: &mut Session<'_>,
    inventory: &mut dyn Inventory,
    env: Environment,
    satellites: &AssetSelector,
    ground_stations: &AssetSelector,
    matches_only: bool,
) -> CommandResult<()> {
    let sats = session.store.locate_assets(env, satellites)?;
    let stations = session.store.locate_assets(env, ground_stations)?;
    let inspections = default_inspections();

    for sat in &sats {
        let sat_config = session.store.load_asset(env, sat)?;
        let satellite = inventory.asset(env, AssetKind::Satellite, sat)?;
        for gs in &stations {
            let gs_config = session.store.load_asset(env, gs)?;
            let ground_station = inventory.asset(env, AssetKind::GroundStation, gs)?;
            let report = AuditReport::build(
                sat,
                gs,
                &sat_config,
                &gs_config,
                &satellite,
                &ground_station,
                &inspections,
            );
            if !report.shared.is_empty() || !matches_only {
                session.console.line(report.to_string())?;
            }
        }
    }
    Ok(())
}

/// `normalize`: rewrite asset configs with sorted keys
///
/// # Errors
/// Load and save failures.
pub fn normalize(session: &mut Session<'_>, env: Environment, assets: &AssetSelector) -> CommandResult<()> {
    for asset in session.store.locate_assets(env, assets)? {
        let config = session.store.load_asset(env, &asset)?;
        session.store.save_asset(env, &asset, &config)?;
        tracing::info!(%env, asset, "normalized config");
    }
    Ok(())
}

/// `format`: rewrite template files with sorted keys
///
/// # Errors
/// Load and save failures.
pub fn format(session: &mut Session<'_>) -> CommandResult<()> {
    for kind in [AssetKind::GroundStation, AssetKind::Satellite] {
        let templates = session.store.templates(kind)?;
        session.store.save_templates(kind, &templates)?;
        let file = session.store.layout().template_file_name(kind);
        session.console.line(format!("Formatted {file}."))?;
    }
    Ok(())
}

/// `query`: print records, or one dot-path field of each
///
/// # Errors
/// Selector, load and YAML failures.
pub fn query(session: &mut Session<'_>, targets: &Targets, field: Option<&str>) -> CommandResult<()> {
    let (assets, channels) = targets.resolve(session)?;
    for asset in &assets {
        let config = session.store.load_asset(targets.env, asset)?;
        for channel in &channels {
            let Some(record) = config.get(channel).filter(|v| v.is_object()) else {
                continue;
            };
            let value = match field {
                None => Some(record),
                Some(path) => lookup(path, record),
            };
            match value {
                Some(value) => {
                    session.console.line(format!("{asset}: {channel}"))?;
                    session.console.text(indent(&yaml::dump(value)?))?;
                }
                None => session.console.line(format!("{asset}: {channel}: <unset>"))?,
            }
        }
    }
    Ok(())
}

fn indent(text: &str) -> String {
    text.lines().map(|line| format!("  {line}\n")).collect()
}

/// `diff`: compare the same channels on two assets
///
/// # Errors
/// Selector, load and YAML failures.
pub fn diff(
    session: &mut Session<'_>,
    env: Environment,
    first: &str,
    second: &str,
    channels: &ChannelSelector,
) -> CommandResult<()> {
    let channels = session.store.locate_channels(channels)?;
    let first_config = session.store.load_asset(env, first)?;
    let second_config = session.store.load_asset(env, second)?;
    for channel in &channels {
        let a = first_config.get(channel).and_then(ChannelValue::as_object);
        let b = second_config.get(channel).and_then(ChannelValue::as_object);
        if a.is_none() && b.is_none() {
            continue;
        }
        let diff = record_diff(a, b)?;
        if diff.is_empty() {
            session.console.line(format!("{channel} is identical on {first} and {second}."))?;
        } else {
            session.console.line(format!("{channel} from {first} to {second}. Diff:"))?;
            session.console.text(diff)?;
        }
    }
    Ok(())
}

/// Rename `old` to `new`, keeping the key's position
#[must_use]
pub fn rename_key(config: &AssetConfig, old: &str, new: &str) -> AssetConfig {
    config
        .iter()
        .map(|(key, value)| {
            let key = if key == old { new.to_string() } else { key.clone() };
            (key, value.clone())
        })
        .collect()
}

/// `rename`: change a channel id in every template and asset config
///
/// Conflicts are checked everywhere before anything is written.
///
/// # Errors
/// [`CommandError::ChannelExists`] if `new` is already in use, a missing
/// template for `old`, and load and save failures.
pub fn rename(session: &mut Session<'_>, old: &str, new: &str, yes: bool) -> CommandResult<()> {
    let templates = TemplateSet::load(session)?;
    for kind in [AssetKind::GroundStation, AssetKind::Satellite] {
        templates.record(kind, old)?;
    }
    if templates.gs.contains_key(new) || templates.sat.contains_key(new) {
        return Err(CommandError::ChannelExists(new.to_string()));
    }

    let mut affected: Vec<(Environment, String, AssetConfig)> = Vec::new();
    for env in Environment::ALL {
        for asset in session.store.locate_assets(env, &AssetSelector::All)? {
            let config = session.store.load_asset(env, &asset)?;
            if config.contains_key(new) {
                return Err(CommandError::ChannelExists(new.to_string()));
            }
            if config.contains_key(old) {
                affected.push((env, asset, config));
            }
        }
    }

    let layout = session.store.layout();
    let mut files: Vec<PathBuf> = vec![layout.template_file(AssetKind::GroundStation)];
    let sat_file = layout.template_file(AssetKind::Satellite);
    if !files.contains(&sat_file) {
        files.push(sat_file);
    }
    files.extend(affected.iter().map(|(env, asset, _)| layout.asset_file(*env, asset)));
    let listing: Vec<String> = files.iter().map(|f| format!("  {}", layout.display(f))).collect();

    if !yes {
        session.console.line(format!("Renaming {old} to {new} in:"))?;
        session.console.line(listing.join("\n"))?;
        if !session.console.confirm("Rename channel?")? {
            session.console.line("Canceled.")?;
            return Ok(());
        }
    }

    session
        .store
        .save_templates(AssetKind::GroundStation, &rename_key(&templates.gs, old, new))?;
    if templates.sat_file != templates.gs_file {
        session
            .store
            .save_templates(AssetKind::Satellite, &rename_key(&templates.sat, old, new))?;
    }
    for (env, asset, config) in &affected {
        session.store.save_asset(*env, asset, &rename_key(config, old, new))?;
        tracing::info!(%env, asset, old, new, "renamed channel");
    }
    session
        .console
        .line(format!("Renamed {old} to {new} in {} files.", files.len()))?;
    Ok(())
}
