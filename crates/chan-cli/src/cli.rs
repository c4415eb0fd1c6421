//! Command-line definition and parsing into an [`Invocation`]

use std::path::PathBuf;

use chan_rules::Environment;
use chan_store::{split_list, AssetSelector, ChannelSelector};
use chan_tree::{ChannelValue, Predicate};
use clap::{value_parser, Arg, ArgAction, ArgMatches, Command};

use crate::commands::Targets;
use crate::duplicate::DuplicateRequest;
use crate::error::{CommandError, CommandResult};
use crate::fields::{parse_bool, parse_yaml_value, read_yaml_value, EditMode, FieldEdits, DIRECTIONALITIES, YAML_FIELDS};
use crate::session::ProcessFlags;
use crate::validate::ValidateOptions;

/// Flags that apply to every subcommand
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct GlobalOptions {
    /// Debug-level logging
    pub debug: bool,
    /// Info-level logging
    pub verbose: bool,
    /// Data directory; the working directory when unset
    pub root: Option<PathBuf>,
    /// Configuration file; `<root>/channel-tool.toml` when unset
    pub config: Option<PathBuf>,
}

/// A parsed subcommand
#[derive(Debug, Clone)]
pub enum Invocation {
    Add {
        targets: Targets,
        edits: FieldEdits,
        flags: ProcessFlags,
    },
    Edit {
        targets: Targets,
        edits: FieldEdits,
        flags: ProcessFlags,
    },
    Delete {
        targets: Targets,
        require_existing: bool,
        flags: ProcessFlags,
    },
    Duplicate {
        env: Environment,
        assets: AssetSelector,
        channel: String,
        request: DuplicateRequest,
        flags: ProcessFlags,
    },
    Audit {
        env: Environment,
        satellites: AssetSelector,
        ground_stations: AssetSelector,
        matches_only: bool,
    },
    Normalize {
        env: Environment,
        assets: AssetSelector,
    },
    Format,
    Validate(ValidateOptions),
    Query {
        targets: Targets,
        field: Option<String>,
    },
    Diff {
        env: Environment,
        first: String,
        second: String,
        channels: ChannelSelector,
    },
    Rename {
        old: String,
        new: String,
        yes: bool,
    },
}

/// Single-valued flags copied into a record field as strings
const TEXT_FIELDS: [(&str, &str); 2] = [
    ("contact_type", "The contact type to use when creating contact windows from this channel."),
    (
        "contact_overhead_time",
        "Overhead (non-download) time to account for when using this contact type, in 'humantime' format.",
    ),
];

fn flag_name(field: &str) -> String {
    field.replace('_', "-")
}

fn environment_arg() -> Arg {
    Arg::new("environment")
        .required(true)
        .value_parser(value_parser!(Environment))
        .help("Which environment to configure (staging or production)")
}

fn assets_arg() -> Arg {
    Arg::new("assets")
        .required(true)
        .value_parser(value_parser!(AssetSelector))
        .help("Comma separated asset ids, an asset group, 'all_gs', 'all_sat' or 'all'")
}

fn channels_arg() -> Arg {
    Arg::new("channels")
        .required(true)
        .value_parser(value_parser!(ChannelSelector))
        .help("Comma separated channel ids, a channel group from contact_type_defs.yaml, or 'all'")
}

fn process_args(command: Command) -> Command {
    command
        .arg(
            Arg::new("yes")
                .short('y')
                .long("yes")
                .action(ArgAction::SetTrue)
                .help("Skip confirmation dialogs and make all edits"),
        )
        .arg(
            Arg::new("fail-fast")
                .short('f')
                .long("fail-fast")
                .action(ArgAction::SetTrue)
                .help("Do not continue with further edits after errors"),
        )
}

fn editing_args(mut command: Command) -> Command {
    command = command
        .arg(
            Arg::new("mode")
                .short('m')
                .long("mode")
                .default_value("overwrite")
                .value_parser(EditMode::NAMES)
                .help("How requested values combine with existing fields"),
        )
        .arg(
            Arg::new("predicate")
                .short('p')
                .long("predicate")
                .action(ArgAction::Append)
                .value_parser(Predicate::compile)
                .help("'<field> <comparator> <value>' selecting list elements; only with --mode update"),
        )
        .arg(
            Arg::new("directionality")
                .long("directionality")
                .value_parser(DIRECTIONALITIES)
                .help("The channel direction"),
        )
        .arg(
            Arg::new("allowed_license_countries")
                .long("allowed-license-countries")
                .help("Comma separated license countries this channel can be used with"),
        )
        .arg(
            Arg::new("enabled")
                .long("enabled")
                .value_parser(parse_bool)
                .help("Whether the channel is enabled for use"),
        )
        .arg(
            Arg::new("legal")
                .long("legal")
                .value_parser(parse_bool)
                .help("Whether the channel is licensed for legal use"),
        );

    for (field, help) in TEXT_FIELDS {
        command = command.arg(Arg::new(field).long(flag_name(field)).help(help));
    }

    for (field, _) in YAML_FIELDS {
        let file_id = format!("{field}_file");
        command = command
            .arg(
                Arg::new(field)
                    .long(flag_name(field))
                    .conflicts_with(file_id.clone())
                    .help(format!("A YAML block with the {}", field.replace('_', " "))),
            )
            .arg(
                Arg::new(file_id.clone())
                    .long(flag_name(&file_id))
                    .value_parser(value_parser!(PathBuf))
                    .help(format!("A YAML file with the {}", field.replace('_', " "))),
            );
    }
    command
}

/// The `channel-tool` command tree
#[must_use]
pub fn command() -> Command {
    Command::new("channel-tool")
        .version(env!("CARGO_PKG_VERSION"))
        .about("A utility to help with managing channels")
        .subcommand_required(true)
        .arg_required_else_help(true)
        .arg(
            Arg::new("debug")
                .long("debug")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Print the full error chain on failure"),
        )
        .arg(
            Arg::new("verbose")
                .short('v')
                .long("verbose")
                .global(true)
                .action(ArgAction::SetTrue)
                .help("Log at debug level"),
        )
        .arg(
            Arg::new("root")
                .long("root")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Data directory holding templates and asset configs"),
        )
        .arg(
            Arg::new("config")
                .long("config")
                .global(true)
                .value_parser(value_parser!(PathBuf))
                .help("Configuration file"),
        )
        .subcommand(editing_args(process_args(
            Command::new("add")
                .visible_alias("a")
                .about("Add a channel configuration from a template")
                .arg(environment_arg())
                .arg(assets_arg())
                .arg(channels_arg()),
        )))
        .subcommand(editing_args(process_args(
            Command::new("edit")
                .visible_alias("e")
                .about("Modify an existing channel configuration")
                .arg(environment_arg())
                .arg(assets_arg())
                .arg(channels_arg()),
        )))
        .subcommand(process_args(
            Command::new("delete")
                .visible_alias("d")
                .about("Delete a channel configuration")
                .arg(environment_arg())
                .arg(assets_arg())
                .arg(channels_arg())
                .arg(
                    Arg::new("require-existing")
                        .short('r')
                        .long("require-existing")
                        .action(ArgAction::SetTrue)
                        .help("Fail whenever the channel to delete does not currently exist"),
                ),
        ))
        .subcommand(process_args(
            Command::new("duplicate")
                .about("Derive a DVB channel with a different PLS and add it next to the original")
                .arg(environment_arg())
                .arg(assets_arg())
                .arg(Arg::new("channel").required(true).help("The channel to duplicate"))
                .arg(
                    Arg::new("pls")
                        .long("pls")
                        .required(true)
                        .value_parser(value_parser!(u32))
                        .help("PLS of the new channel"),
                )
                .arg(
                    Arg::new("min-elevation-deg")
                        .long("min-elevation-deg")
                        .value_parser(value_parser!(f64))
                        .help("Minimum elevation of the new link profile"),
                )
                .arg(
                    Arg::new("bitrate-kbps")
                        .long("bitrate-kbps")
                        .value_parser(value_parser!(f64))
                        .help("Downlink rate of the new link profile"),
                ),
        ))
        .subcommand(
            Command::new("audit")
                .about("Audit satellite / ground station pairs to find usable channels")
                .arg(environment_arg())
                .arg(
                    Arg::new("satellites")
                        .required(true)
                        .value_parser(value_parser!(AssetSelector))
                        .help("The satellites to audit"),
                )
                .arg(
                    Arg::new("ground_stations")
                        .required(true)
                        .value_parser(value_parser!(AssetSelector))
                        .help("The ground stations to audit"),
                )
                .arg(
                    Arg::new("matches-only")
                        .long("matches-only")
                        .action(ArgAction::SetTrue)
                        .help("Only print asset pairs that share valid channels"),
                ),
        )
        .subcommand(
            Command::new("normalize")
                .about("Rewrite asset configurations in normalized form")
                .arg(environment_arg())
                .arg(assets_arg()),
        )
        .subcommand(Command::new("format").about("Rewrite template files in normalized form"))
        .subcommand(
            Command::new("validate")
                .about("Validate all templates and extant configurations")
                .arg(Arg::new("module").long("module").help("Only run rules whose module contains this"))
                .arg(
                    Arg::new("function")
                        .long("function")
                        .help("Only run rules whose name contains this"),
                )
                .arg(
                    Arg::new("assets")
                        .long("assets")
                        .value_parser(value_parser!(AssetSelector))
                        .help("Only validate these assets"),
                )
                .arg(
                    Arg::new("environment")
                        .long("environment")
                        .action(ArgAction::Append)
                        .value_parser(value_parser!(Environment))
                        .help("Only validate this environment"),
                ),
        )
        .subcommand(
            Command::new("query")
                .about("Print channel configurations")
                .arg(environment_arg())
                .arg(assets_arg())
                .arg(channels_arg())
                .arg(
                    Arg::new("field")
                        .long("field")
                        .help("Dot-separated path of the field to print, e.g. window_parameters.forward_channels"),
                ),
        )
        .subcommand(
            Command::new("diff")
                .about("Compare channel configurations of two assets")
                .arg(environment_arg())
                .arg(Arg::new("first").required(true).help("Asset to compare from"))
                .arg(Arg::new("second").required(true).help("Asset to compare to"))
                .arg(channels_arg()),
        )
        .subcommand(
            Command::new("rename")
                .about("Rename a channel in every template and asset configuration")
                .arg(Arg::new("old").required(true).help("Current channel id"))
                .arg(Arg::new("new").required(true).help("New channel id"))
                .arg(
                    Arg::new("yes")
                        .short('y')
                        .long("yes")
                        .action(ArgAction::SetTrue)
                        .help("Skip the confirmation dialog"),
                ),
        )
}

fn required<T: Clone + Send + Sync + 'static>(args: &ArgMatches, id: &str) -> CommandResult<T> {
    args.get_one::<T>(id)
        .cloned()
        .ok_or_else(|| CommandError::invalid(id, "missing value"))
}

fn text(args: &ArgMatches, id: &str) -> CommandResult<String> {
    required::<String>(args, id)
}

fn targets(args: &ArgMatches) -> CommandResult<Targets> {
    Ok(Targets {
        env: required(args, "environment")?,
        assets: required(args, "assets")?,
        channels: required(args, "channels")?,
    })
}

fn process_flags(args: &ArgMatches) -> ProcessFlags {
    ProcessFlags {
        yes: args.get_flag("yes"),
        fail_fast: args.get_flag("fail-fast"),
    }
}

fn field_edits(args: &ArgMatches) -> CommandResult<FieldEdits> {
    let mode: EditMode = text(args, "mode")?.parse()?;
    let predicates: Vec<Predicate> = args
        .get_many::<Predicate>("predicate")
        .map(|values| values.cloned().collect())
        .unwrap_or_default();
    let mut edits = FieldEdits::new(mode).with_predicates(predicates)?;

    if let Some(directionality) = args.get_one::<String>("directionality") {
        edits.set("directionality", ChannelValue::from(directionality.clone()));
    }
    if let Some(countries) = args.get_one::<String>("allowed_license_countries") {
        edits.set("allowed_license_countries", ChannelValue::from(split_list(countries)));
    }
    for field in ["enabled", "legal"] {
        if let Some(value) = args.get_one::<bool>(field) {
            edits.set(field, ChannelValue::Bool(*value));
        }
    }
    for (field, _) in TEXT_FIELDS {
        if let Some(value) = args.get_one::<String>(field) {
            edits.set(field, ChannelValue::from(value.clone()));
        }
    }
    for (field, shape) in YAML_FIELDS {
        let flag = flag_name(field);
        if let Some(text) = args.get_one::<String>(field) {
            edits.set(field, parse_yaml_value(&flag, text, shape)?);
        } else if let Some(path) = args.get_one::<PathBuf>(&format!("{field}_file")) {
            edits.set(field, read_yaml_value(&format!("{flag}-file"), path, shape)?);
        }
    }
    Ok(edits)
}

/// Parse command-line arguments
///
/// # Errors
/// [`CommandError::InvalidValue`] for values clap accepted but the edit
/// layer rejects, such as malformed YAML.
pub fn parse(matches: &ArgMatches) -> CommandResult<(GlobalOptions, Invocation)> {
    let global = GlobalOptions {
        debug: matches.get_flag("debug"),
        verbose: matches.get_flag("verbose"),
        root: matches.get_one::<PathBuf>("root").cloned(),
        config: matches.get_one::<PathBuf>("config").cloned(),
    };

    let invocation = match matches.subcommand() {
        Some(("add", args)) => Invocation::Add {
            targets: targets(args)?,
            edits: field_edits(args)?,
            flags: process_flags(args),
        },
        Some(("edit", args)) => Invocation::Edit {
            targets: targets(args)?,
            edits: field_edits(args)?,
            flags: process_flags(args),
        },
        Some(("delete", args)) => Invocation::Delete {
            targets: targets(args)?,
            require_existing: args.get_flag("require-existing"),
            flags: process_flags(args),
        },
        Some(("duplicate", args)) => Invocation::Duplicate {
            env: required(args, "environment")?,
            assets: required(args, "assets")?,
            channel: text(args, "channel")?,
            request: DuplicateRequest {
                pls: required(args, "pls")?,
                min_elevation_deg: args.get_one::<f64>("min-elevation-deg").copied(),
                bitrate_kbps: args.get_one::<f64>("bitrate-kbps").copied(),
            },
            flags: process_flags(args),
        },
        Some(("audit", args)) => Invocation::Audit {
            env: required(args, "environment")?,
            satellites: required(args, "satellites")?,
            ground_stations: required(args, "ground_stations")?,
            matches_only: args.get_flag("matches-only"),
        },
        Some(("normalize", args)) => Invocation::Normalize {
            env: required(args, "environment")?,
            assets: required(args, "assets")?,
        },
        Some(("format", _)) => Invocation::Format,
        Some(("validate", args)) => Invocation::Validate(ValidateOptions {
            module: args.get_one::<String>("module").cloned(),
            function: args.get_one::<String>("function").cloned(),
            assets: args.get_one::<AssetSelector>("assets").cloned(),
            environments: args
                .get_many::<Environment>("environment")
                .map(|values| values.copied().collect())
                .unwrap_or_default(),
        }),
        Some(("query", args)) => Invocation::Query {
            targets: targets(args)?,
            field: args.get_one::<String>("field").cloned(),
        },
        Some(("diff", args)) => Invocation::Diff {
            env: required(args, "environment")?,
            first: text(args, "first")?,
            second: text(args, "second")?,
            channels: required(args, "channels")?,
        },
        Some(("rename", args)) => Invocation::Rename {
            old: text(args, "old")?,
            new: text(args, "new")?,
            yes: args.get_flag("yes"),
        },
        Some((other, _)) => return Err(CommandError::invalid("command", format!("unknown subcommand '{other}'"))),
        None => return Err(CommandError::invalid("command", "a subcommand is required")),
    };
    Ok((global, invocation))
}
