//! `channel-tool`: manage satellite and ground station channel configs
//!
//! The binary parses arguments with [`cli::command`], opens a [`Session`]
//! over the data directory and hands the [`Invocation`] to [`execute`].
//!
//! - [`commands`]: add, edit, delete, duplicate, audit, normalize, format,
//!   query, diff and rename
//! - [`validate`]: the full validation run
//! - [`session`]: the confirm-and-apply loop shared by editing commands
//! - [`fields`]: editing flags and how they combine with existing records

pub mod audit;
pub mod cli;
pub mod commands;
pub mod console;
pub mod diff;
pub mod duplicate;
pub mod error;
pub mod fields;
pub mod session;
pub mod table;
pub mod validate;

use std::path::Path;

use chan_rules::RuleRegistry;
use chan_store::{ChannelStore, Inventory, InventoryClient, ToolConfig};

pub use cli::{GlobalOptions, Invocation};
pub use console::Console;
pub use error::{CommandError, CommandResult};
pub use session::{ProcessFlags, Session};

/// Open the data directory
///
/// The root is `--root`, else the configured root, else `cwd`. The
/// configuration file is `--config`, else `channel-tool.toml` in the root
/// given on the command line or `cwd`.
///
/// # Errors
/// Configuration file errors.
pub fn open_session<'c>(
    global: &GlobalOptions,
    cwd: &Path,
    env_lookup: impl Fn(&str) -> Option<String>,
    console: Console<'c>,
) -> CommandResult<Session<'c>> {
    let config_dir = global.root.as_deref().unwrap_or(cwd);
    let config = ToolConfig::discover(global.config.as_deref(), config_dir)?.with_env_overrides(env_lookup);
    let root = global.root.clone().unwrap_or_else(|| config.data_root(cwd));
    tracing::debug!(root = %root.display(), "opening data directory");
    Ok(Session::new(ChannelStore::open(root), config, console))
}

/// Run one parsed subcommand
///
/// `audit` uses `inventory` when given, else an HTTP client for the
/// configured inventory service.
///
/// # Errors
/// Whatever the subcommand fails with.
pub fn execute(
    session: &mut Session<'_>,
    invocation: Invocation,
    inventory: Option<&mut dyn Inventory>,
) -> CommandResult<()> {
    match invocation {
        Invocation::Add { targets, edits, flags } => commands::add(session, &targets, &edits, flags),
        Invocation::Edit { targets, edits, flags } => commands::edit(session, &targets, &edits, flags),
        Invocation::Delete {
            targets,
            require_existing,
            flags,
        } => commands::delete(session, &targets, require_existing, flags),
        Invocation::Duplicate {
            env,
            assets,
            channel,
            request,
            flags,
        } => commands::duplicate(session, env, &assets, &channel, request, flags),
        Invocation::Audit {
            env,
            satellites,
            ground_stations,
            matches_only,
        } => match inventory {
            Some(inventory) => commands::audit(session, inventory, env, &satellites, &ground_stations, matches_only),
            None => {
                let mut client = InventoryClient::new(session.config.inventory.clone())?;
                commands::audit(session, &mut client, env, &satellites, &ground_stations, matches_only)
            }
        },
        Invocation::Normalize { env, assets } => commands::normalize(session, env, &assets),
        Invocation::Format => commands::format(session),
        Invocation::Validate(options) => validate::validate(session, &RuleRegistry::with_defaults(), &options),
        Invocation::Query { targets, field } => commands::query(session, &targets, field.as_deref()),
        Invocation::Diff {
            env,
            first,
            second,
            channels,
        } => commands::diff(session, env, &first, &second, &channels),
        Invocation::Rename { old, new, yes } => commands::rename(session, &old, &new, yes),
    }
}
