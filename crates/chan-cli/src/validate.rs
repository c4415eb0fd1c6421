//! `validate`: templates, shared sets, asset configs, then the rule engine

use chan_rules::{
    templates::{check_allowed_keys, check_template_channel_sets, check_unique_class_annos},
    AssetConfig, AssetKind, Environment, RuleEngine, RuleRegistry, RuleSelection, RuleViolation, ValidationReport,
    ValidationRuleInput,
};
use chan_store::AssetSelector;
use indexmap::IndexMap;

use crate::error::CommandResult;
use crate::session::Session;

/// Filters for one `validate` run
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ValidateOptions {
    /// Substring of the rule module
    pub module: Option<String>,
    /// Substring of the rule name
    pub function: Option<String>,
    /// Assets to check; every asset when unset
    pub assets: Option<AssetSelector>,
    /// Environments to check; the configured list when empty
    pub environments: Vec<Environment>,
}

impl ValidateOptions {
    fn selection(&self) -> RuleSelection {
        let mut selection = RuleSelection::all();
        if let Some(module) = &self.module {
            selection = selection.with_module(module.clone());
        }
        if let Some(function) = &self.function {
            selection = selection.with_name(function.clone());
        }
        selection
    }
}

struct Templates {
    sat_file: String,
    sat: AssetConfig,
    gs_file: String,
    gs: AssetConfig,
}

/// Run every check, stopping at the first structural failure
///
/// # Errors
/// Schema and template errors as found, then
/// [`chan_rules::RuleViolationError`] after the rules of an environment
/// have all run if any ENFORCE rule failed.
pub fn validate(session: &mut Session<'_>, registry: &RuleRegistry, options: &ValidateOptions) -> CommandResult<()> {
    let templates = check_templates(session)?;
    let environments = if options.environments.is_empty() {
        session.config.environments.clone()
    } else {
        options.environments.clone()
    };
    for env in environments {
        let input = check_environment(session, &templates, env, options.assets.as_ref())?;
        session.console.line(format!("Running validation rules on {env} config ..."))?;
        let report = RuleEngine::new(registry).with_selection(options.selection()).run(&input);
        print_report(session, &report)?;
        report.into_result()?;
        session.console.line(format!("Validation complete for {env}"))?;
    }
    Ok(())
}

fn check_templates(session: &mut Session<'_>) -> CommandResult<Templates> {
    let schemas = session.store.schemas()?;
    let layout = session.store.layout();
    let sat_file = layout.template_file_name(AssetKind::Satellite).to_string();
    let gs_file = layout.template_file_name(AssetKind::GroundStation).to_string();

    session.console.line("Checking that satellite templates conform to the schema...")?;
    let sat = session.store.templates(AssetKind::Satellite)?;
    schemas.for_kind(AssetKind::Satellite).validate_channels(&sat_file, &sat)?;
    session.console.line("PASS")?;

    session.console.line("Checking that ground station templates conform to the schema...")?;
    let gs = session.store.templates(AssetKind::GroundStation)?;
    schemas.for_kind(AssetKind::GroundStation).validate_channels(&gs_file, &gs)?;
    session.console.line("PASS")?;

    session
        .console
        .line("Checking that satellite and ground station templates have the same set of channels")?;
    check_template_channel_sets(&sat_file, &sat, &gs_file, &gs)?;
    session.console.line("PASS")?;

    session
        .console
        .line("Checking that in GS templates, classification annotations are unique to channel ID")?;
    check_unique_class_annos(&gs_file, &gs)?;
    session.console.line("PASS")?;

    Ok(Templates { sat_file, sat, gs_file, gs })
}

fn check_environment(
    session: &mut Session<'_>,
    templates: &Templates,
    env: Environment,
    assets: Option<&AssetSelector>,
) -> CommandResult<ValidationRuleInput> {
    let schemas = session.store.schemas()?;
    let mut input = ValidationRuleInput::new(env);
    input.sat_templates = templates.sat.clone();
    input.gs_templates = templates.gs.clone();

    session
        .console
        .line(format!("Checking {env} shared constraint sets conform to the schema ..."))?;
    for set in session.store.shared_sets(env)? {
        session.console.text(format!("{}... ", set.name))?;
        let location = session.store.layout().display(&set.file);
        schemas.shared_sets().validate(&location, &set.document)?;
        input.shared_constraint_sets.insert(set.name, set.document);
        session.console.line("PASS")?;
    }

    let mut located = session.store.locate_assets(env, assets.unwrap_or(&AssetSelector::All))?;
    located.sort();
    let (satellites, stations): (Vec<String>, Vec<String>) = located
        .into_iter()
        .partition(|asset| AssetKind::infer(asset) == AssetKind::Satellite);
    session.console.line(format!(
        "Starting validation for {env} config: {} satellites and {} groundstations",
        satellites.len(),
        stations.len()
    ))?;

    input.sat_configs = check_configs(session, &schemas, env, AssetKind::Satellite, &satellites)?;
    input.gs_configs = check_configs(session, &schemas, env, AssetKind::GroundStation, &stations)?;

    session.console.line(format!(
        "Checking {env} satellite configs use channel IDs from {} ...",
        templates.sat_file
    ))?;
    for (sat_id, config) in &input.sat_configs {
        check_allowed_keys(&templates.sat_file, &templates.sat, sat_id, config)?;
    }
    session.console.line("PASS")?;

    session.console.line(format!(
        "Checking {env} groundstation configs use channel IDs from {} ...",
        templates.gs_file
    ))?;
    for (gs_id, config) in &input.gs_configs {
        check_allowed_keys(&templates.gs_file, &templates.gs, gs_id, config)?;
    }
    session.console.line("PASS")?;

    Ok(input)
}

fn check_configs(
    session: &mut Session<'_>,
    schemas: &chan_rules::SchemaSet,
    env: Environment,
    kind: AssetKind,
    assets: &[String],
) -> CommandResult<IndexMap<String, AssetConfig>> {
    let label = match kind {
        AssetKind::Satellite => "satellite",
        AssetKind::GroundStation => "groundstation",
    };
    session
        .console
        .line(format!("Checking {env} {label} configs conform to the schema ..."))?;

    let mut configs = IndexMap::new();
    for asset in assets {
        session.console.text(format!("{asset}... "))?;
        let config = session.store.load_asset(env, asset)?;
        let file = session.store.layout().display(&session.store.layout().asset_file(env, asset));
        schemas.for_kind(kind).validate_channels(&file, &config)?;
        configs.insert(asset.clone(), config);
        session.console.line("PASS")?;
    }
    Ok(configs)
}

fn print_report(session: &mut Session<'_>, report: &ValidationReport) -> CommandResult<()> {
    let mut module: Option<&str> = None;
    for result in &report.results {
        if module != Some(result.module.as_str()) {
            session.console.line(format!("  Module {}", result.module))?;
            module = Some(result.module.as_str());
        }
        let verdict = if result.passed() { "PASS" } else { "FAIL" };
        session.console.line(format!("    Rule {} ... {verdict}", result.name))?;
    }

    for violation in report.complaints() {
        session.console.line(violation_block("WARN: Rule", violation))?;
    }
    for violation in report.enforced() {
        session.console.line(violation_block("ERROR:", violation))?;
    }
    Ok(())
}

fn violation_block(label: &str, violation: &RuleViolation) -> String {
    format!(
        "{label} {} failed:\n\tMode: {}\n\tModule: {}\n\tDescription: {}\n\tViolation cases: \n\t - {}",
        violation.name,
        violation.mode,
        violation.module,
        violation.description,
        violation.cases.join("\n\t - ")
    )
}
