use std::io::Write;
use std::path::{Path, PathBuf};
use std::sync::Arc;

use anyhow::{bail, Context as _, Result};
use notif_core::{Context, JsonFileStore, MemoryStore, Notification, Options, PayloadBuilder};
use serde_json::{Map, Value};
use tracing::{debug, instrument};

use crate::presenter::{LogAlarms, LogPresenter};

#[derive(Clone, Debug, Default)]
pub struct AppConfig {
    pub(crate) store_dir: Option<PathBuf>,
    pub(crate) quiet: bool,
}

impl AppConfig {
    pub fn from_env() -> Result<Self> {
        Ok(Self::from_lookup(|key| std::env::var(key).ok()))
    }

    pub(crate) fn from_lookup(lookup: impl Fn(&str) -> Option<String>) -> Self {
        let mut config = Self::default();
        if let Some(dir) = lookup("NOTIF_STORE_DIR") {
            if !dir.trim().is_empty() {
                config.store_dir = Some(PathBuf::from(dir));
            }
        }
        if let Some(quiet) = lookup("NOTIF_QUIET") {
            config.quiet = matches!(quiet.trim(), "1" | "true" | "yes");
        }
        config
    }

    pub fn with_store_dir(mut self, dir: impl Into<PathBuf>) -> Self {
        self.store_dir = Some(dir.into());
        self
    }

    pub fn quiet(mut self, quiet: bool) -> Self {
        self.quiet = quiet;
        self
    }

    pub fn build_context(&self) -> Result<Context> {
        let builder = Context::builder()
            .with_presenter(Arc::new(LogPresenter::new(self.quiet)))
            .with_alarms(Arc::new(LogAlarms));
        let builder = match &self.store_dir {
            Some(dir) => {
                debug!(path = %dir.display(), "using file preference store");
                let store = JsonFileStore::open(dir)
                    .with_context(|| format!("failed to open store at {}", dir.display()))?;
                builder.with_store(Arc::new(store))
            }
            None => builder.with_store(Arc::new(MemoryStore::new())),
        };
        Ok(builder.build())
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Command {
    Show(PathBuf),
    Persist(PathBuf),
    Clear(PathBuf),
    Cancel(i32),
    List,
}

impl Command {
    pub fn parse<I, S>(args: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let args: Vec<String> = args.into_iter().map(|a| a.as_ref().to_string()).collect();
        let mut parts = args.iter().map(String::as_str);
        let command = match (parts.next(), parts.next()) {
            (Some("show"), Some(path)) => Command::Show(PathBuf::from(path)),
            (Some("persist"), Some(path)) => Command::Persist(PathBuf::from(path)),
            (Some("clear"), Some(path)) => Command::Clear(PathBuf::from(path)),
            (Some("cancel"), Some(id)) => Command::Cancel(
                id.trim()
                    .parse()
                    .with_context(|| format!("invalid notification id `{id}`"))?,
            ),
            (Some("list"), None) => Command::List,
            (Some(other), _) => bail!("unknown or incomplete command `{other}`\n{USAGE}"),
            (None, _) => bail!("{USAGE}"),
        };
        if parts.next().is_some() {
            bail!("unexpected trailing arguments\n{USAGE}");
        }
        Ok(command)
    }
}

pub const USAGE: &str =
    "usage: notif <show|persist|clear> <options.json> | notif cancel <id> | notif list";

pub fn run(config: AppConfig, command: Command, out: &mut impl Write) -> Result<()> {
    let context = config.build_context()?;
    match command {
        Command::Show(path) => show(&context, &path),
        Command::Persist(path) => persist(&context, &path),
        Command::Clear(path) => clear(&context, &path),
        Command::Cancel(id) => cancel(&context, id),
        Command::List => list(&context, out),
    }
}

#[instrument(skip(context))]
fn show(context: &Context, path: &Path) -> Result<()> {
    let options = load_options(path)?;
    let builder = payload_from(options.dict());
    let notification = Notification::with_payload(context.clone(), options, builder);
    notification.show();
    notification
        .persist()
        .with_context(|| format!("failed to persist notification {}", notification.id()))
}

#[instrument(skip(context))]
fn persist(context: &Context, path: &Path) -> Result<()> {
    let notification = Notification::new(context.clone(), load_options(path)?);
    notification
        .persist()
        .with_context(|| format!("failed to persist notification {}", notification.id()))
}

#[instrument(skip(context))]
fn clear(context: &Context, path: &Path) -> Result<()> {
    Notification::new(context.clone(), load_options(path)?).clear();
    Ok(())
}

#[instrument(skip(context))]
fn cancel(context: &Context, id: i32) -> Result<()> {
    let restored =
        Notification::restore_all(context).context("failed to read stored notifications")?;
    let notification = match restored.into_iter().find(|n| n.id() == id) {
        Some(notification) => notification,
        None => {
            let mut dict = Map::new();
            dict.insert("id".to_string(), Value::from(id));
            Notification::new(context.clone(), Options::from_map(dict))
        }
    };
    notification
        .cancel()
        .with_context(|| format!("failed to cancel notification {id}"))
}

fn list(context: &Context, out: &mut impl Write) -> Result<()> {
    for notification in Notification::restore_all(context)? {
        let marker = if notification.is_repeating() { "repeating" } else { "once" };
        writeln!(out, "{}\t{}\t{}", notification.id(), marker, notification)?;
    }
    Ok(())
}

fn load_options(path: &Path) -> Result<Options> {
    let raw = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read {}", path.display()))?;
    let options = Options::from_json(&raw)
        .with_context(|| format!("invalid notification options in {}", path.display()))?;
    if let Some(at) = options.trigger_at() {
        tracing::debug!(id = options.id(), %at, "trigger time");
    }
    Ok(options)
}

fn payload_from(dict: &Map<String, Value>) -> PayloadBuilder {
    let mut builder = PayloadBuilder::new()
        .title(str_attr(dict, "title").unwrap_or_default())
        .text(str_attr(dict, "text").unwrap_or_default());
    if let Some(channel) = str_attr(dict, "channel") {
        builder = builder.channel(channel);
    }
    if let Some(sound) = str_attr(dict, "sound") {
        builder = builder.sound(sound);
    }
    if let Some(badge) = dict
        .get("badge")
        .and_then(Value::as_u64)
        .and_then(|b| u32::try_from(b).ok())
    {
        builder = builder.badge(badge);
    }
    if let Some(ongoing) = dict.get("sticky").and_then(Value::as_bool) {
        builder = builder.ongoing(ongoing);
    }
    builder
}

fn str_attr<'a>(dict: &'a Map<String, Value>, key: &str) -> Option<&'a str> {
    dict.get(key).and_then(Value::as_str)
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;
    use tempfile::tempdir;

    #[test]
    fn parses_commands() {
        assert_eq!(Command::parse(["list"]).unwrap(), Command::List);
        assert_eq!(Command::parse(["cancel", "4"]).unwrap(), Command::Cancel(4));
        assert_eq!(
            Command::parse(["show", "a.json"]).unwrap(),
            Command::Show(PathBuf::from("a.json"))
        );
        assert!(Command::parse(["cancel", "four"]).is_err());
        assert!(Command::parse(["list", "extra"]).is_err());
        assert!(Command::parse(Vec::<String>::new()).is_err());
    }

    #[test]
    fn config_reads_store_dir_and_quiet_flag() {
        let env = |pairs: &'static [(&'static str, &'static str)]| {
            move |key: &str| {
                pairs
                    .iter()
                    .find(|(name, _)| *name == key)
                    .map(|(_, value)| value.to_string())
            }
        };

        let config = AppConfig::from_lookup(env(&[
            ("NOTIF_STORE_DIR", "/var/lib/notif"),
            ("NOTIF_QUIET", " true "),
        ]));
        assert_eq!(config.store_dir, Some(PathBuf::from("/var/lib/notif")));
        assert!(config.quiet);

        let config =
            AppConfig::from_lookup(env(&[("NOTIF_STORE_DIR", "  "), ("NOTIF_QUIET", "0")]));
        assert!(config.store_dir.is_none());
        assert!(!config.quiet);

        let config = AppConfig::from_lookup(env(&[("NOTIF_QUIET", "1")]));
        assert!(config.quiet);
        assert!(!AppConfig::from_lookup(env(&[("NOTIF_QUIET", "loud")])).quiet);
        assert!(AppConfig::from_lookup(env(&[])).store_dir.is_none());
    }

    #[test]
    fn list_writes_only_tab_separated_rows() {
        let temp = tempdir().expect("tempdir");
        let config = AppConfig::default()
            .with_store_dir(temp.path().join("store"))
            .quiet(true);
        for (name, raw) in [
            ("once.json", r#"{"id": 4, "title": "Tea", "text": "x"}"#),
            ("daily.json", r#"{"id": 5, "trigger": {"every": "day"}}"#),
        ] {
            let path = temp.path().join(name);
            std::fs::write(&path, raw).unwrap();
            run(config.clone(), Command::Show(path), &mut Vec::new()).unwrap();
        }

        let mut sink = Vec::new();
        run(config, Command::List, &mut sink).unwrap();
        let listed = String::from_utf8(sink).unwrap();
        let rows: Vec<Vec<&str>> = listed.lines().map(|l| l.split('\t').collect()).collect();
        assert_eq!(rows.len(), 2);
        assert_eq!(rows[0][..2], ["4", "once"]);
        assert_eq!(rows[1][..2], ["5", "repeating"]);
        for row in &rows {
            assert_eq!(row.len(), 3);
            let value: Value = serde_json::from_str(row[2]).unwrap();
            assert!(value.is_object());
        }
    }

    #[test]
    fn payload_reads_display_attributes() {
        let dict = json!({"title": "Tea", "text": "Steeped", "badge": 1, "sticky": true});
        let payload = payload_from(dict.as_object().unwrap()).build();
        assert_eq!(payload.title, "Tea");
        assert_eq!(payload.text, "Steeped");
        assert_eq!(payload.badge, Some(1));
        assert!(payload.ongoing);
    }

    #[test]
    fn show_list_cancel_against_file_store() {
        let temp = tempdir().expect("tempdir");
        let options_path = temp.path().join("tea.json");
        std::fs::write(
            &options_path,
            r#"{"id": 4, "title": "Tea", "trigger": {"every": "day"}}"#,
        )
        .unwrap();
        let config = AppConfig::default()
            .with_store_dir(temp.path().join("store"))
            .quiet(true);

        let mut sink = Vec::new();
        run(config.clone(), Command::Show(options_path), &mut sink).unwrap();

        run(config.clone(), Command::List, &mut sink).unwrap();
        let listed = String::from_utf8(sink).unwrap();
        assert!(listed.starts_with("4\trepeating\t"));
        assert!(listed.contains(r#""title":"Tea""#));

        run(config.clone(), Command::Cancel(4), &mut Vec::new()).unwrap();
        let mut after = Vec::new();
        run(config, Command::List, &mut after).unwrap();
        assert!(after.is_empty());
    }
}
