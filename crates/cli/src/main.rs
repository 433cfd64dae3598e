//! `presenton-node` CLI entry-point.
//!
//! Drives the Presenton node the way a workflow host would. Available
//! sub-commands:
//! - `generate`: start an asynchronous presentation generation.
//! - `status`: check (or wait for) a generation task.
//! - `upload`: upload a file to reference in a later generation.
//! - `verify`: check that the API key is accepted.
//! - `run`: execute a batch of items from a JSON file.

use std::collections::HashMap;
use std::path::{Path, PathBuf};
use std::time::Duration;

use anyhow::{bail, Context};
use clap::{Args, Parser, Subcommand};
use serde_json::{json, Map, Value};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use nodes::presenton::credentials::{API_KEY_FIELD, BASE_URL_FIELD};
use nodes::presenton::{
    poll_status, HttpTransportConfig, PollConfig, PresentonCredentials, PresentonNode,
};
use nodes::{BinaryData, ExecutableNode, ExecutionContext, NodeItem, NodeOutput};

#[derive(Parser)]
#[command(
    name = "presenton-node",
    about = "Generate presentations with the Presenton API",
    version
)]
struct Cli {
    /// Presenton API key.
    #[arg(long, env = "PRESENTON_API_KEY", hide_env_values = true)]
    api_key: String,

    /// Override the API base URL (staging or self-hosted).
    #[arg(long, env = "PRESENTON_BASE_URL")]
    base_url: Option<String>,

    /// Per-request timeout in seconds.
    #[arg(long, default_value_t = 30)]
    timeout_secs: u64,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand)]
enum Command {
    /// Start generating a presentation; prints the task ID response.
    Generate(GenerateArgs),
    /// Check the status of a generation task.
    Status {
        task_id: String,
        /// Keep checking until the task completes or fails.
        #[arg(long)]
        wait: bool,
        #[arg(long, default_value_t = 5)]
        interval_secs: u64,
        #[arg(long, default_value_t = 60)]
        max_attempts: u32,
    },
    /// Upload a file to Presenton.
    Upload {
        path: PathBuf,
        /// MIME type sent with the file.
        #[arg(long)]
        mime_type: Option<String>,
    },
    /// Verify the API key against the profile endpoint.
    Verify,
    /// Execute every item in a JSON array file and print the results.
    Run {
        /// Path to a JSON array of `{ "parameters": {...}, "binary": {...} }` items.
        path: PathBuf,
        /// Record failures per item instead of stopping at the first one.
        #[arg(long)]
        continue_on_fail: bool,
    },
}

#[derive(Args)]
struct GenerateArgs {
    /// Main content to generate the presentation from.
    #[arg(long)]
    content: Option<String>,
    #[arg(long)]
    instructions: Option<String>,
    /// casual, default, educational, funny, professional or sales_pitch.
    #[arg(long)]
    tone: Option<String>,
    /// concise, standard or text-heavy.
    #[arg(long)]
    verbosity: Option<String>,
    #[arg(long)]
    web_search: bool,
    /// ai-generated or stock.
    #[arg(long)]
    image_type: Option<String>,
    #[arg(long)]
    theme: Option<String>,
    /// Number of slides to generate.
    #[arg(long, default_value_t = 5, allow_negative_numbers = true)]
    slides: i64,
    #[arg(long)]
    language: Option<String>,
    #[arg(long)]
    template: Option<String>,
    #[arg(long)]
    table_of_contents: bool,
    /// Leave out the title slide.
    #[arg(long)]
    no_title_slide: bool,
    /// pptx or pdf.
    #[arg(long)]
    export_as: Option<String>,
    /// IDs of previously uploaded files (comma separated).
    #[arg(long, value_delimiter = ',')]
    files: Vec<String>,
}

impl GenerateArgs {
    fn into_parameters(self) -> Map<String, Value> {
        let mut params = Map::new();
        params.insert("operation".into(), json!("generateAsync"));
        let optional = [
            ("content", self.content),
            ("instructions", self.instructions),
            ("tone", self.tone),
            ("verbosity", self.verbosity),
            ("image_type", self.image_type),
            ("theme", self.theme),
            ("language", self.language),
            ("template", self.template),
            ("export_as", self.export_as),
        ];
        for (name, value) in optional {
            if let Some(value) = value {
                params.insert(name.into(), Value::String(value));
            }
        }
        params.insert("noOfSlides".into(), json!(self.slides));
        params.insert("web_search".into(), json!(self.web_search));
        params.insert("include_table_of_contents".into(), json!(self.table_of_contents));
        params.insert("include_title_slide".into(), json!(!self.no_title_slide));
        params.insert("files".into(), json!(self.files));
        params
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .init();

    let cli = Cli::parse();

    let node = PresentonNode::http(HttpTransportConfig {
        timeout: Duration::from_secs(cli.timeout_secs),
    })?;
    let mut secrets = HashMap::from([(API_KEY_FIELD.to_string(), cli.api_key)]);
    if let Some(base_url) = cli.base_url {
        secrets.insert(BASE_URL_FIELD.to_string(), base_url);
    }

    match cli.command {
        Command::Generate(args) => {
            let item = NodeItem::with_parameters(args.into_parameters());
            let output = run_single(&node, item, secrets).await?;
            print_json(&output)?;
        }
        Command::Status { task_id, wait: false, .. } => {
            let item = NodeItem::with_parameters(Map::from_iter([
                ("operation".to_string(), json!("checkStatus")),
                ("taskId".to_string(), json!(task_id)),
            ]));
            let output = run_single(&node, item, secrets).await?;
            print_json(&output)?;
        }
        Command::Status { task_id, wait: true, interval_secs, max_attempts } => {
            let credentials = PresentonCredentials::from_secrets(&secrets)?;
            let config = PollConfig {
                interval: Duration::from_secs(interval_secs),
                max_attempts,
            };
            let outcome = poll_status(&node, &credentials, &task_id, &config).await?;
            if !outcome.finished {
                warn!("task '{}' still running after {} checks", task_id, outcome.attempts);
            }
            print_json(&outcome.response)?;
        }
        Command::Upload { path, mime_type } => {
            let item = upload_item(&path, mime_type).await?;
            let output = run_single(&node, item, secrets).await?;
            print_json(&output)?;
        }
        Command::Verify => {
            let credentials = PresentonCredentials::from_secrets(&secrets)?;
            let profile = node.verify_credentials(&credentials).await?;
            info!("credentials accepted by {}", credentials.base_url());
            print_json(&profile)?;
        }
        Command::Run { path, continue_on_fail } => {
            let content = tokio::fs::read_to_string(&path)
                .await
                .with_context(|| format!("cannot read file {}", path.display()))?;
            let items: Vec<NodeItem> = serde_json::from_str(&content)
                .with_context(|| format!("invalid items JSON in {}", path.display()))?;

            let ctx = ExecutionContext::new(secrets).continue_on_fail(continue_on_fail);
            let outputs = node.execute(items, &ctx).await?;
            print_json(&outputs)?;
        }
    }

    Ok(())
}

/// Execute one item and return its JSON result.
async fn run_single(
    node: &PresentonNode,
    item: NodeItem,
    secrets: HashMap<String, String>,
) -> anyhow::Result<Value> {
    let ctx = ExecutionContext::new(secrets);
    let mut outputs = node.execute(vec![item], &ctx).await?;
    match outputs.pop() {
        Some(NodeOutput { json, .. }) => Ok(json),
        None => bail!("node returned no output"),
    }
}

async fn upload_item(path: &Path, mime_type: Option<String>) -> anyhow::Result<NodeItem> {
    let data = tokio::fs::read(path)
        .await
        .with_context(|| format!("cannot read file {}", path.display()))?;
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .map(str::to_owned);

    let params = Map::from_iter([("operation".to_string(), json!("uploadFile"))]);
    Ok(NodeItem::with_parameters(params).attach(
        "data",
        BinaryData {
            data,
            file_name,
            mime_type,
        },
    ))
}

fn print_json<T: serde::Serialize>(value: &T) -> anyhow::Result<()> {
    println!("{}", serde_json::to_string_pretty(value)?);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_definition_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn generate_flags_map_onto_node_parameters() {
        let cli = Cli::try_parse_from([
            "presenton-node",
            "--api-key",
            "sk-1",
            "generate",
            "--content",
            "Rust ownership",
            "--slides",
            "7",
            "--no-title-slide",
            "--files",
            "f1,f2",
        ])
        .unwrap();

        let Command::Generate(args) = cli.command else {
            panic!("expected generate");
        };
        let params = args.into_parameters();
        assert_eq!(params["operation"], "generateAsync");
        assert_eq!(params["content"], "Rust ownership");
        assert_eq!(params["noOfSlides"], 7);
        assert_eq!(params["include_title_slide"], false);
        assert_eq!(params["files"], json!(["f1", "f2"]));
        assert!(!params.contains_key("tone"));
    }

    #[tokio::test]
    async fn upload_item_uses_file_name_of_path() {
        let dir = std::env::temp_dir().join(format!("presenton-node-{}", uuid::Uuid::new_v4()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("brief.md");
        std::fs::write(&path, "# Brief").unwrap();

        let item = upload_item(&path, None).await.unwrap();
        let binary = &item.binary["data"];
        assert_eq!(binary.file_name.as_deref(), Some("brief.md"));
        assert_eq!(binary.data, b"# Brief");
        assert_eq!(item.parameters["operation"], "uploadFile");

        std::fs::remove_dir_all(&dir).unwrap();
    }
}
