//! CLI runner - executes commands

use crate::adapter::OperationResult;
use crate::cli::commands::{Cli, Commands};
use crate::cli::server;
use crate::config::{default_config_path, BridgeConfig};
use crate::error::{Error, Result};
use crate::query::{Filters, QuerySpec};
use crate::session::Session;
use crate::types::JsonValue;
use std::path::PathBuf;
use std::sync::Arc;

/// CLI runner
pub struct Runner {
    cli: Cli,
}

impl Runner {
    /// Create a new runner
    pub fn new(cli: Cli) -> Self {
        Self { cli }
    }

    /// Run the CLI command
    pub async fn run(&self) -> Result<()> {
        match &self.cli.command {
            Commands::Init { output, force } => self.init(output.clone(), *force),
            Commands::Test { connection } => self.test(connection.as_deref()).await,
            Commands::Query {
                connection,
                entity,
                filters,
                fields,
                limit,
                offset,
            } => {
                let spec = build_spec(entity, filters.as_deref(), fields.as_deref(), *limit, *offset)?;
                self.query(connection, &spec).await
            }
            Commands::Describe {
                connection,
                entity,
                refresh,
            } => self.describe(connection, entity, *refresh).await,
            Commands::Serve { port, stdio } => {
                let session = Arc::new(self.session()?);
                if *stdio {
                    server::serve_stdio(session).await
                } else {
                    server::serve(session, *port).await
                }
            }
        }
    }

    fn session(&self) -> Result<Session> {
        let config = BridgeConfig::load(self.cli.config.as_deref())?;
        Ok(Session::new(config))
    }

    fn init(&self, output: Option<PathBuf>, force: bool) -> Result<()> {
        let path = output
            .or_else(|| self.cli.config.clone())
            .or_else(default_config_path)
            .ok_or_else(|| Error::config("Cannot resolve a config path; pass --output"))?;
        BridgeConfig::write_template(&path, force)?;
        println!("Wrote configuration template to {}", path.display());
        Ok(())
    }

    async fn test(&self, connection: Option<&str>) -> Result<()> {
        let session = self.session()?;
        let names = match connection {
            Some(name) => vec![name.to_string()],
            None => session.profile_names().await,
        };
        if names.is_empty() {
            return Err(Error::config(
                "No connections configured; run `enterprise-bridge init` first",
            ));
        }

        let mut report = serde_json::Map::new();
        let mut failed = 0;
        for name in &names {
            let result = match session.connection(name).await {
                Ok(conn) => conn.adapter.health_check().await,
                Err(e) => OperationResult::from_error(&e),
            };
            if !result.is_success() {
                failed += 1;
            }
            report.insert(name.clone(), result.to_value());
        }
        session.shutdown().await;

        print_json(&JsonValue::Object(report))?;
        if failed > 0 {
            return Err(Error::ConnectionCheck {
                message: format!("{failed} of {} connection(s) unhealthy", names.len()),
            });
        }
        Ok(())
    }

    async fn query(&self, connection: &str, spec: &QuerySpec) -> Result<()> {
        let session = self.session()?;
        let result = session.connection(connection).await?.engine.execute(spec).await;
        session.shutdown().await;
        finish(&result)
    }

    async fn describe(&self, connection: &str, entity: &str, refresh: bool) -> Result<()> {
        let session = self.session()?;
        let result = session
            .connection(connection)
            .await?
            .discovery
            .describe(entity, refresh)
            .await;
        session.shutdown().await;
        finish(&result)
    }
}

/// Assemble a query from command-line flags
fn build_spec(
    entity: &str,
    filters: Option<&str>,
    fields: Option<&str>,
    limit: u32,
    offset: u32,
) -> Result<QuerySpec> {
    let filters: Filters = match filters {
        Some(text) => match serde_json::from_str(text)? {
            JsonValue::Object(map) => map,
            _ => return Err(Error::config("--filters must be a JSON object")),
        },
        None => Filters::new(),
    };
    let fields: Vec<&str> = fields
        .map(|list| {
            list.split(',')
                .map(str::trim)
                .filter(|f| !f.is_empty())
                .collect()
        })
        .unwrap_or_default();

    Ok(QuerySpec::new(entity)
        .with_filters(filters)
        .fields(fields)
        .limit(limit)
        .offset(offset))
}

fn print_json(value: &JsonValue) -> Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

/// Print the envelope; a failed operation becomes the process error
fn finish(result: &OperationResult) -> Result<()> {
    print_json(&result.to_value())?;
    if result.is_success() {
        Ok(())
    } else {
        Err(Error::Other(result.message().to_string()))
    }
}
