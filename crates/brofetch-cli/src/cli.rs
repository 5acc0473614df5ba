//! CLI argument definitions using clap derive macros.

use std::path::{Path, PathBuf};

use anyhow::Context;
use brofetch_config::{vars, ClientOptions, ConfigLoader};
use brofetch_http::{Answer, FormData, FormValue, HttpClient, JsonBody, Method, Payload};
use brofetch_log::spans::{record_outcome, request_span, Instrument, Timer};
use clap::{ArgAction, Args, Parser, Subcommand, ValueHint};
use serde::Serialize;

use crate::error::CliError;

/// brofetch - browser-style HTTP requests
///
/// Follows redirects, retries timeouts and prints every attempt as JSON.
#[derive(Debug, Parser)]
#[command(
    name = "brofetch",
    author,
    version,
    about,
    long_about = None,
    propagate_version = true,
    arg_required_else_help = true
)]
pub struct Cli {
    /// Increase verbosity level (-v, -vv, -vvv)
    #[arg(short, long, action = ArgAction::Count, global = true)]
    pub verbose: u8,

    /// Suppress all log output except errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    pub quiet: bool,

    /// Path to configuration file
    #[arg(
        short,
        long,
        global = true,
        env = vars::BROFETCH_CONFIG,
        value_hint = ValueHint::FilePath
    )]
    pub config: Option<PathBuf>,

    /// Attempt timeout in milliseconds
    #[arg(long, global = true, value_name = "MS")]
    pub timeout: Option<u64>,

    /// Retries after a timed-out attempt
    #[arg(long, global = true, value_name = "N")]
    pub retry: Option<u32>,

    /// Maximum redirect hops to follow
    #[arg(long, global = true, value_name = "N")]
    pub max_redirects: Option<u32>,

    /// Extra request header, `name: value` (repeatable)
    #[arg(short = 'H', long = "header", global = true, value_name = "HEADER")]
    pub headers: Vec<String>,

    #[command(subcommand)]
    pub command: Command,
}

/// Available subcommands
#[derive(Debug, Subcommand)]
pub enum Command {
    /// Send a request, following redirects and retrying timeouts
    Ask(RequestArgs),

    /// Send a single attempt
    Once(RequestArgs),

    /// Send and receive JSON
    Json(RequestArgs),

    /// Fetch an HTML document
    Html(UrlArgs),

    /// Fetch a JavaScript resource
    Js(UrlArgs),

    /// POST multipart form data
    Form(FormArgs),
}

#[derive(Debug, Args)]
pub struct RequestArgs {
    /// Target URL, absolute or relative to `base_url`
    #[arg(value_hint = ValueHint::Url)]
    pub url: String,

    /// HTTP method
    #[arg(short = 'X', long, default_value = "GET", value_parser = parse_method)]
    pub method: Method,

    /// Request body
    #[arg(short = 'd', long = "data", value_name = "BODY")]
    pub data: Option<String>,
}

#[derive(Debug, Args)]
pub struct UrlArgs {
    #[arg(value_hint = ValueHint::Url)]
    pub url: String,
}

#[derive(Debug, Args)]
pub struct FormArgs {
    #[arg(value_hint = ValueHint::Url)]
    pub url: String,

    /// Form field `key=value`; `key=@path` attaches a file
    #[arg(short = 'F', long = "field", value_name = "FIELD")]
    pub fields: Vec<String>,
}

fn parse_method(s: &str) -> Result<Method, String> {
    Method::from_bytes(s.to_uppercase().as_bytes()).map_err(|e| e.to_string())
}

/// Split `name: value`.
fn parse_header(raw: &str) -> Result<(String, String), CliError> {
    let (name, value) = raw
        .split_once(':')
        .ok_or_else(|| CliError::input(format!("header must look like 'name: value', got '{raw}'")))?;
    let name = name.trim();
    if name.is_empty() {
        return Err(CliError::input(format!("empty header name in '{raw}'")));
    }
    Ok((name.to_string(), value.trim().to_string()))
}

/// Build form data from `key=value` / `key=@path` fields.
fn parse_form(fields: &[String]) -> Result<FormData, CliError> {
    let mut form = FormData::new();
    for field in fields {
        let (name, value) = field
            .split_once('=')
            .ok_or_else(|| CliError::input(format!("form field must look like 'key=value', got '{field}'")))?;
        match value.strip_prefix('@') {
            Some(path) => {
                let bytes = std::fs::read(path)
                    .map_err(|e| CliError::io_with_path("failed to read form file", e, path))?;
                let file_name = Path::new(path)
                    .file_name()
                    .map(|n| n.to_string_lossy().into_owned())
                    .unwrap_or_else(|| path.to_string());
                form.append(name, FormValue::file(file_name, bytes));
            }
            None => form.append(name, value),
        }
    }
    Ok(form)
}

impl Command {
    fn method(&self) -> Method {
        match self {
            Command::Ask(args) | Command::Once(args) | Command::Json(args) => args.method.clone(),
            Command::Html(_) | Command::Js(_) => Method::GET,
            Command::Form(_) => Method::POST,
        }
    }

    fn url(&self) -> &str {
        match self {
            Command::Ask(args) | Command::Once(args) | Command::Json(args) => &args.url,
            Command::Html(args) | Command::Js(args) => &args.url,
            Command::Form(args) => &args.url,
        }
    }
}

impl Cli {
    /// Resolve client options: config file, then `BROFETCH_*` env, then flags.
    pub fn load_options(&self) -> Result<ClientOptions, CliError> {
        let loader = ConfigLoader::new(".");
        let mut options = match &self.config {
            Some(path) => loader.load_file(path)?,
            None => loader.load()?,
        };

        options.apply_env()?;

        if let Some(timeout) = self.timeout {
            options.timeout_ms = timeout;
        }
        if let Some(retry) = self.retry {
            options.retry = retry;
        }
        if let Some(max_redirects) = self.max_redirects {
            options.max_redirects = max_redirects;
        }

        brofetch_config::validate(&options)?;
        tracing::debug!(
            timeout_ms = options.timeout_ms,
            retry = options.retry,
            max_redirects = options.max_redirects,
            "client options resolved"
        );
        Ok(options)
    }

    /// Execute the selected command and print its result.
    pub async fn execute(self, options: ClientOptions) -> Result<(), CliError> {
        let mut client = HttpClient::with_options(options)?;
        for raw in &self.headers {
            let (name, value) = parse_header(raw)?;
            client.set_req_header(name, value);
        }

        let method = self.command.method();
        let url = self.command.url().to_string();
        let span = request_span(method.as_str(), &url);
        let timer = Timer::start("command");

        let answers = async {
            match self.command {
                Command::Ask(args) => {
                    let body = args.data.map(Payload::Text);
                    let history = client.ask(&args.url, args.method, body.as_ref()).await;
                    print_json(&history)?;
                    Ok::<_, CliError>(history)
                }
                Command::Once(args) => {
                    let body = args.data.map(Payload::Text);
                    single(client.ask_once(&args.url, args.method, body.as_ref()).await)
                }
                Command::Json(args) => {
                    let body = args.data.map(JsonBody::from);
                    single(client.ask_json(&args.url, args.method, body).await?)
                }
                Command::Html(args) => single(client.ask_html(&args.url).await),
                Command::Js(args) => single(client.ask_js(&args.url).await),
                Command::Form(args) => {
                    let form = parse_form(&args.fields)?;
                    single(client.send_form_data(&args.url, &form).await)
                }
            }
        }
        .instrument(span.clone())
        .await?;

        timer.finish();

        let Some(last) = answers.last() else {
            return Ok(());
        };
        record_outcome(&span, answers.len(), last.status);

        if last.status == 0 || last.status >= 400 {
            return Err(CliError::Network {
                method: method.to_string(),
                url,
                status: last.status,
                message: last.status_message.clone(),
            });
        }
        Ok(())
    }
}

fn single(answer: Answer) -> Result<Vec<Answer>, CliError> {
    print_json(&answer)?;
    Ok(vec![answer])
}

fn print_json<T: Serialize>(value: &T) -> Result<(), CliError> {
    let rendered = serde_json::to_string_pretty(value).context("failed to render answer as JSON")?;
    println!("{rendered}");
    Ok(())
}
