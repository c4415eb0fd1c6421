//! One command run: store, settings, console, and the shared update loop

use chan_rules::{AssetKind, Environment, SchemaSet};
use chan_store::{yaml, ChannelStore, ToolConfig};
use chan_tree::{ChannelRecord, ChannelValue};

use crate::console::Console;
use crate::diff::unified_diff;
use crate::error::{CommandError, CommandResult};

/// Batch behaviour flags shared by editing commands
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ProcessFlags {
    /// Skip confirmation prompts
    pub yes: bool,
    /// Abort the batch on the first per-item error
    pub fail_fast: bool,
}

/// The channel an update transform is asked about
#[derive(Debug, Clone, Copy)]
pub struct Slot<'a> {
    /// Asset name
    pub asset: &'a str,
    /// Channel ID
    pub channel: &'a str,
    /// Current record; `None` when absent or `null`
    pub existing: Option<&'a ChannelRecord>,
    /// Whole config of the asset
    pub config: &'a chan_rules::AssetConfig,
}

/// State owned by a single command invocation
#[derive(Debug)]
pub struct Session<'c> {
    /// Configs of the selected environment
    pub store: ChannelStore,
    /// Settings of this run
    pub config: ToolConfig,
    /// Prompts and output
    pub console: Console<'c>,
}

impl<'c> Session<'c> {
    /// Bundle a run's store, settings and console
    #[must_use]
    pub fn new(store: ChannelStore, config: ToolConfig, console: Console<'c>) -> Self {
        Self { store, config, console }
    }

    /// Print a warning line and log it
    ///
    /// # Errors
    /// Console write failures.
    pub fn warn(&mut self, message: &str) -> CommandResult<()> {
        tracing::warn!("{message}");
        self.console.line(message)?;
        Ok(())
    }

    /// Run `transform` on every (asset, channel) pair and persist the results
    ///
    /// A `Some` result is filtered to schema properties and validated before
    /// it is stored; `None` deletes the channel. Changes are confirmed with a
    /// diff unless `flags.yes`. A failing pair is reported and skipped unless
    /// `flags.fail_fast`.
    ///
    /// # Errors
    /// Load, save and schema errors, and with `fail_fast` the first
    /// transform error.
    pub fn apply_update<F>(
        &mut self,
        env: Environment,
        assets: &[String],
        channels: &[String],
        flags: ProcessFlags,
        mut transform: F,
    ) -> CommandResult<()>
    where
        F: FnMut(Slot<'_>) -> CommandResult<Option<ChannelRecord>>,
    {
        let schemas = self.store.schemas()?;
        for asset in assets {
            let mut config = self.store.load_asset(env, asset)?;
            let mut changed = false;
            for channel in channels {
                match self.apply_one(&schemas, asset, channel, &mut config, flags, &mut transform) {
                    Ok(applied) => changed |= applied,
                    Err(err) if !flags.fail_fast => self.warn(&format!("Error: {err}"))?,
                    Err(err) => return Err(err),
                }
            }
            if changed {
                self.store.save_asset(env, asset, &config)?;
            }
        }
        Ok(())
    }

    fn apply_one<F>(
        &mut self,
        schemas: &SchemaSet,
        asset: &str,
        channel: &str,
        config: &mut chan_rules::AssetConfig,
        flags: ProcessFlags,
        transform: &mut F,
    ) -> CommandResult<bool>
    where
        F: FnMut(Slot<'_>) -> CommandResult<Option<ChannelRecord>>,
    {
        let existing = config.get(channel).and_then(ChannelValue::as_object).cloned();
        let updated = transform(Slot {
            asset,
            channel,
            existing: existing.as_ref(),
            config,
        })?;

        let updated = match updated {
            None => None,
            Some(record) => {
                let schema = schemas.for_kind(AssetKind::infer(asset));
                let record = schema.filter_properties(&record);
                schema.validate_record(&format!("{asset}: {channel}"), &record)?;
                Some(record)
            }
        };

        if updated == existing {
            self.console.line(format!("No changes for {channel} on {asset}."))?;
            return Ok(false);
        }
        if !flags.yes && !self.confirm_changes(asset, channel, existing.as_ref(), updated.as_ref())? {
            return Ok(false);
        }

        match updated {
            None => {
                if config.shift_remove(channel).is_none() {
                    return Ok(false);
                }
                tracing::info!(asset, channel, "deleted channel");
                self.console.line(format!("Deleted {channel} definition for {asset}."))?;
            }
            Some(record) => {
                config.insert(channel.to_string(), ChannelValue::Object(record));
                tracing::info!(asset, channel, "updated channel");
                self.console.line(format!("Updated {channel} definition for {asset}."))?;
            }
        }
        Ok(true)
    }

    fn confirm_changes(
        &mut self,
        asset: &str,
        channel: &str,
        existing: Option<&ChannelRecord>,
        updated: Option<&ChannelRecord>,
    ) -> CommandResult<bool> {
        let diff = record_diff(existing, updated)?;
        self.console.line(format!("Changing {channel} on {asset}. Diff:"))?;
        self.console.text(diff)?;
        if self.console.confirm("Update asset configuration?")? {
            Ok(true)
        } else {
            self.console.line("Canceled.")?;
            Ok(false)
        }
    }
}

/// Unified diff between two possibly absent records
///
/// # Errors
/// YAML dump failures.
pub fn record_diff(before: Option<&ChannelRecord>, after: Option<&ChannelRecord>) -> CommandResult<String> {
    let dump = |record: Option<&ChannelRecord>| yaml::dump_channel(record.cloned().map(ChannelValue::Object).as_ref());
    Ok(unified_diff(&dump(before)?, &dump(after)?))
}

#[cfg(test)]
mod tests {
    use super::*;
    use chan_test_utils::{TestWorkspace, GROUND_STATION, UHF_CHANNEL, XBAND_CHANNEL};
    use pretty_assertions::assert_eq;
    use serde_json::json;

    fn run<F>(ws: &TestWorkspace, answers: &str, flags: ProcessFlags, transform: F) -> (String, CommandResult<()>)
    where
        F: FnMut(Slot<'_>) -> CommandResult<Option<ChannelRecord>>,
    {
        let mut input = answers.as_bytes();
        let mut out = Vec::new();
        let result = {
            let mut session = Session::new(
                ChannelStore::open(ws.root()),
                ToolConfig::default(),
                Console::new(&mut input, &mut out),
            );
            session.apply_update(
                Environment::Staging,
                &[GROUND_STATION.to_string()],
                &[UHF_CHANNEL.to_string()],
                flags,
                transform,
            )
        };
        (String::from_utf8(out).unwrap(), result)
    }

    fn disable(slot: Slot<'_>) -> CommandResult<Option<ChannelRecord>> {
        let mut record = slot.existing.cloned().unwrap_or_default();
        record.insert("enabled".to_string(), json!(false));
        Ok(Some(record))
    }

    #[test]
    fn declined_changes_are_not_written() {
        let ws = TestWorkspace::standard();
        let (out, result) = run(&ws, "n\n", ProcessFlags::default(), disable);
        result.unwrap();
        assert!(out.starts_with(&format!("Changing {UHF_CHANNEL} on {GROUND_STATION}. Diff:\n")));
        assert!(out.contains("-enabled: true\n+enabled: false\n"));
        assert!(out.ends_with("Update asset configuration? [y/N] Canceled.\n"));
        let saved = ws.read_yaml(&format!("staging/gs/{GROUND_STATION}.yaml"));
        assert_eq!(saved[UHF_CHANNEL]["enabled"], json!(true));
    }

    #[test]
    fn confirmed_changes_are_written() {
        let ws = TestWorkspace::standard();
        let (out, result) = run(&ws, "y\n", ProcessFlags::default(), disable);
        result.unwrap();
        assert!(out.ends_with(&format!("Updated {UHF_CHANNEL} definition for {GROUND_STATION}.\n")));
        let saved = ws.read_yaml(&format!("staging/gs/{GROUND_STATION}.yaml"));
        assert_eq!(saved[UHF_CHANNEL]["enabled"], json!(false));
        assert!(saved[XBAND_CHANNEL].is_object());
    }

    #[test]
    fn identical_result_reports_no_changes() {
        let ws = TestWorkspace::standard();
        let flags = ProcessFlags { yes: true, fail_fast: false };
        let (out, result) = run(&ws, "", flags, |slot| Ok(slot.existing.cloned()));
        result.unwrap();
        assert_eq!(out, format!("No changes for {UHF_CHANNEL} on {GROUND_STATION}.\n"));
    }

    #[test]
    fn deleting_removes_the_key() {
        let ws = TestWorkspace::standard();
        let flags = ProcessFlags { yes: true, fail_fast: false };
        let (out, result) = run(&ws, "", flags, |_| Ok(None));
        result.unwrap();
        assert_eq!(out, format!("Deleted {UHF_CHANNEL} definition for {GROUND_STATION}.\n"));
        let saved = ws.read_yaml(&format!("staging/gs/{GROUND_STATION}.yaml"));
        assert!(saved.get(UHF_CHANNEL).is_none());
    }

    #[test]
    fn schema_violations_are_item_errors() {
        let ws = TestWorkspace::standard();
        let invalid = |slot: Slot<'_>| -> CommandResult<Option<ChannelRecord>> {
            let mut record = slot.existing.cloned().unwrap_or_default();
            record.insert("enabled".to_string(), json!("sometimes"));
            Ok(Some(record))
        };

        let flags = ProcessFlags { yes: true, fail_fast: false };
        let (out, result) = run(&ws, "", flags, invalid);
        result.unwrap();
        assert!(out.starts_with("Error: Validation error:"));

        let flags = ProcessFlags { yes: true, fail_fast: true };
        let (_, result) = run(&ws, "", flags, invalid);
        assert!(matches!(result, Err(CommandError::Rules(_))));
    }

    #[test]
    fn properties_outside_the_schema_are_dropped() {
        let ws = TestWorkspace::standard();
        let flags = ProcessFlags { yes: true, fail_fast: false };
        let (_, result) = run(&ws, "", flags, |slot| {
            let mut record = slot.existing.cloned().unwrap_or_default();
            record.insert("satellite_constraints".to_string(), json!({}));
            record.insert("enabled".to_string(), json!(false));
            Ok(Some(record))
        });
        result.unwrap();
        let saved = ws.read_yaml(&format!("staging/gs/{GROUND_STATION}.yaml"));
        assert!(saved[UHF_CHANNEL].get("satellite_constraints").is_none());
    }
}
