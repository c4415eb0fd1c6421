//! Error types for channel-tool commands

use chan_rules::{NamingError, RulesError, RuleViolationError, SchemaValidationError, TemplateValidationError};
use chan_store::StoreError;
use chan_tree::TreeError;

/// Errors raised while running a command
#[derive(Debug, thiserror::Error)]
pub enum CommandError {
    /// `add` on a channel the asset already configures
    #[error(
        "Configuration for {channel} already exists on {asset}.\n\
         (Tip: Use `channel-tool edit {asset} {channel}` to edit the configuration.)"
    )]
    AlreadyExists { asset: String, channel: String },

    /// `edit` on a channel the asset does not configure
    #[error(
        "No configuration for {channel} on {asset}.\n\
         (Tip: Use `channel-tool add {asset} {channel}` to add one from a template.)"
    )]
    NoConfiguration { asset: String, channel: String },

    /// `delete --require-existing` on a channel the asset does not configure
    #[error("No configuration for {channel} on {asset}.")]
    NothingToDelete { asset: String, channel: String },

    /// The source channel cannot be duplicated
    #[error("{0}")]
    Duplicate(String),

    /// A command-line value could not be interpreted
    #[error("invalid value for --{flag}: {message}")]
    InvalidValue { flag: String, message: String },

    /// `--predicate` given with a mode other than `update`
    #[error("--predicate is only valid with --mode update")]
    PredicateWithoutUpdate,

    /// `rename` target is already taken
    #[error("channel {0} already exists")]
    ChannelExists(String),

    /// Template, rule or naming failure
    #[error(transparent)]
    Rules(#[from] RulesError),

    /// Tree algebra failure
    #[error(transparent)]
    Tree(#[from] TreeError),

    /// Data directory or inventory failure
    #[error(transparent)]
    Store(#[from] StoreError),

    /// Writing to the terminal failed
    #[error("console error: {0}")]
    Console(#[from] std::io::Error),
}

impl CommandError {
    /// Invalid flag value
    pub fn invalid(flag: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidValue {
            flag: flag.into(),
            message: message.into(),
        }
    }
}

impl From<SchemaValidationError> for CommandError {
    fn from(err: SchemaValidationError) -> Self {
        Self::Rules(err.into())
    }
}

impl From<TemplateValidationError> for CommandError {
    fn from(err: TemplateValidationError) -> Self {
        Self::Rules(err.into())
    }
}

impl From<NamingError> for CommandError {
    fn from(err: NamingError) -> Self {
        Self::Rules(err.into())
    }
}

impl From<RuleViolationError> for CommandError {
    fn from(err: RuleViolationError) -> Self {
        Self::Rules(err.into())
    }
}

/// Result alias for commands
pub type CommandResult<T> = Result<T, CommandError>;
