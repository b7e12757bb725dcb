pub mod endpoints;
pub mod export;
pub mod list;
pub mod mutate;

use std::collections::HashMap;
use std::path::PathBuf;
use std::sync::Arc;

use clap::{Parser, Subcommand};
use serde_json::Value;

use crate::config::Config;
use crate::error::{AppError, AppResult};
use crate::list::{ListView, LoadState};
use crate::record::Record;
use crate::remote::CollectionSource;
use crate::remote::registry::DEMO_SOURCE;
use crate::screen::Screen;
use crate::session::Session;

#[derive(Parser)]
#[command(
    name = "aperture",
    version,
    about = "Admin console for the photography club's blog, gallery, members and contests"
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Increase logging verbosity (-v, -vv, -vvv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Identity from the club's sign-in provider (email)
    #[arg(long = "as", value_name = "EMAIL", global = true)]
    pub identity: Option<String>,

    /// Config file (defaults to the user config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Browse built-in sample data instead of the live endpoints
    #[arg(long, global = true)]
    pub offline: bool,
}

#[derive(Subcommand)]
pub enum Command {
    /// Show configured endpoints and the screens that use them
    Endpoints,
    /// List a screen's records
    List {
        /// Screen: blog, gallery, applications, submissions, results, payments, admin
        screen: String,
        /// Case-insensitive search over the screen's searchable fields
        #[arg(long)]
        search: Option<String>,
        /// Page number (1-based)
        #[arg(long, default_value_t = 1)]
        page: usize,
        /// Output format
        #[arg(long, default_value = "terminal", value_parser = ["terminal", "json"])]
        format: String,
    },
    /// Show every field of one record
    Show { screen: String, id: String },
    /// Create a record
    Create {
        screen: String,
        /// Field assignment, repeatable: --set title="Night Walk"
        #[arg(long = "set", value_parser = parse_key_val, required = true)]
        fields: Vec<(String, Value)>,
    },
    /// Update fields of an existing record
    Update {
        screen: String,
        id: String,
        #[arg(long = "set", value_parser = parse_key_val, required = true)]
        fields: Vec<(String, Value)>,
    },
    /// Delete a record from the backing store
    Delete { screen: String, id: String },
    /// Change a record's review status (e.g. pending -> approved)
    Status {
        screen: String,
        id: String,
        status: String,
    },
    /// Export filtered records as CSV
    Export {
        screen: String,
        #[arg(long)]
        search: Option<String>,
        /// Output file (defaults to <dataset>_<date>.csv)
        #[arg(long)]
        output: Option<PathBuf>,
    },
}

/// `key=value`; values that look like JSON arrays or objects are parsed.
pub fn parse_key_val(s: &str) -> Result<(String, Value), String> {
    let (key, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected key=value, got '{s}'"))?;
    let key = key.trim();
    if key.is_empty() {
        return Err(format!("empty field name in '{s}'"));
    }
    let trimmed = value.trim_start();
    let value = if trimmed.starts_with('[') || trimmed.starts_with('{') {
        serde_json::from_str(value).unwrap_or_else(|_| Value::String(value.to_string()))
    } else {
        Value::String(value.to_string())
    };
    Ok((key.to_string(), value))
}

pub fn fields_to_record(fields: Vec<(String, Value)>) -> Record {
    let mut record = Record::new();
    for (k, v) in fields {
        record.set(&k, v);
    }
    record
}

/// Everything a command needs, passed explicitly.
pub struct Context {
    pub config: Config,
    pub session: Session,
    pub sources: HashMap<String, Arc<dyn CollectionSource>>,
    pub offline: bool,
}

impl Context {
    pub fn source_for(&self, screen: &Screen) -> AppResult<Arc<dyn CollectionSource>> {
        let key = if self.offline {
            DEMO_SOURCE
        } else {
            screen.endpoint
        };
        self.sources.get(key).cloned().ok_or_else(|| {
            AppError::EndpointNotFound(format!(
                "'{}' (add it to the config file, or use --offline for sample data)",
                screen.endpoint
            ))
        })
    }

    pub fn new_view(&self, screen: &'static Screen) -> ListView {
        ListView::new(screen, self.config.page_size, self.config.page_window)
    }

    /// Authorize, then load the screen. Fetch failures stay in the view's
    /// state; they are shown, not returned.
    pub async fn load(
        &self,
        screen: &'static Screen,
    ) -> anyhow::Result<(ListView, Arc<dyn CollectionSource>)> {
        self.session.authorize_read(screen)?;
        let source = self.source_for(screen)?;
        let mut view = self.new_view(screen);
        view.refresh(source.as_ref()).await;
        Ok((view, source))
    }
}

/// Inline banner for a failed load.
pub fn print_load_banner(view: &ListView) {
    if let LoadState::Error(message) = view.state() {
        eprintln!(
            "Error loading {}: {message}. Run the command again to retry.",
            view.screen().title
        );
    }
    if view.is_demo() {
        eprintln!("{}", crate::export::DEMO_BANNER);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_parse_key_val() {
        assert_eq!(
            parse_key_val("title=Night Walk").unwrap(),
            ("title".into(), json!("Night Walk"))
        );
        assert_eq!(
            parse_key_val("tags=[\"astro\",\"night\"]").unwrap(),
            ("tags".into(), json!(["astro", "night"]))
        );
        assert_eq!(
            parse_key_val("note=a=b").unwrap(),
            ("note".into(), json!("a=b"))
        );
        assert_eq!(
            parse_key_val("bad=[oops").unwrap(),
            ("bad".into(), json!("[oops"))
        );
        assert!(parse_key_val("novalue").is_err());
        assert!(parse_key_val("=x").is_err());
    }

    #[test]
    fn test_cli_parses() {
        let cli = Cli::try_parse_from([
            "aperture", "--as", "chair@club.example.edu", "status", "applications", "A1",
            "approved",
        ])
        .unwrap();
        assert_eq!(cli.identity.as_deref(), Some("chair@club.example.edu"));
        assert!(matches!(cli.command, Command::Status { .. }));

        let cli = Cli::try_parse_from(["aperture", "list", "blog", "--search", "night", "-vv"])
            .unwrap();
        assert_eq!(cli.verbose, 2);
        match cli.command {
            Command::List { page, format, .. } => {
                assert_eq!(page, 1);
                assert_eq!(format, "terminal");
            }
            _ => panic!("expected list"),
        }

        assert!(Cli::try_parse_from(["aperture", "create", "blog"]).is_err());
    }

    #[test]
    fn test_source_for_offline_and_missing() {
        let config = Config::default();
        let sources = crate::remote::registry::build_source_registry(&config).unwrap();
        let mut ctx = Context {
            config,
            session: Session::anonymous(),
            sources,
            offline: false,
        };
        let blog = crate::screen::find("blog").unwrap();
        assert!(matches!(
            ctx.source_for(blog),
            Err(AppError::EndpointNotFound(_))
        ));
        ctx.offline = true;
        assert!(ctx.source_for(blog).unwrap().is_demo());
    }
}
