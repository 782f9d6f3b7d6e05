//! Purpose: `identify` CLI entry point.
//! Role: Binary crate root; collects email/phone, runs one session submit per form, prints the result.
//! Invariants: Rendered responses go to stdout; prompts, progress, and errors go to stderr.
//! Invariants: Non-interactive errors are emitted as JSON on stderr when stderr is not a terminal.
//! Invariants: Process exit code is derived from `api::to_exit_code`.
#![allow(clippy::result_large_err)]
use std::io::{self, BufRead, IsTerminal, Write};

use clap::{Parser, ValueEnum, error::ErrorKind as ClapErrorKind};
use serde_json::{Map, Value, json};
use std::error::Error as StdError;
use tracing_subscriber::EnvFilter;

use identify::api::{
    Error, ErrorKind, FormInput, IdentityClient, RequestState, Session, to_exit_code,
};
use identify::render::render;

const DEFAULT_ENDPOINT: &str = match option_env!("IDENTIFY_ENDPOINT") {
    Some(endpoint) => endpoint,
    None => "https://bite-speed-backend.onrender.com/identify",
};

fn main() {
    let exit_code = match run() {
        Ok(code) => code,
        Err((err, color_mode)) => {
            emit_error(&err, color_mode);
            to_exit_code(err.kind())
        }
    };
    std::process::exit(exit_code);
}

fn run() -> Result<i32, (Error, ColorMode)> {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(err) => match err.kind() {
            ClapErrorKind::DisplayHelp | ClapErrorKind::DisplayVersion => {
                err.print().map_err(|io_err| {
                    (
                        Error::new(ErrorKind::Io)
                            .with_message("failed to write help")
                            .with_source(io_err),
                        ColorMode::Auto,
                    )
                })?;
                return Ok(0);
            }
            _ => {
                return Err((
                    Error::new(ErrorKind::Usage)
                        .with_message(clap_error_summary(&err))
                        .with_hint("Try `identify --help`."),
                    ColorMode::Auto,
                ));
            }
        },
    };

    init_tracing();
    let color_mode = cli.color;
    let client = IdentityClient::new(&cli.endpoint).map_err(|err| (err, color_mode))?;
    tracing::debug!(endpoint = %client.endpoint(), "identify client ready");

    let mut session = Session::new();
    if cli.interactive {
        run_interactive(&client, &mut session, cli.format, color_mode)
            .map_err(|err| (err, color_mode))?;
        return Ok(0);
    }

    let input = FormInput {
        email: cli.email,
        phone: cli.phone,
    };
    submit_with_progress(&client, &mut session, &input);
    match session.state() {
        RequestState::Succeeded(value) => {
            emit_response(value, cli.format, color_mode);
            Ok(0)
        }
        RequestState::Failed(message) => {
            let kind = session.failure_kind().unwrap_or(ErrorKind::Internal);
            Err((Error::new(kind).with_message(message.clone()), color_mode))
        }
        RequestState::Idle | RequestState::Submitting => Err((
            Error::new(ErrorKind::Internal).with_message("submission did not settle"),
            color_mode,
        )),
    }
}

#[derive(Parser)]
#[command(
    name = "identify",
    version,
    about = "Resolve a contact identity from an email and/or phone number",
    long_about = None,
    after_help = r#"EXAMPLES
  $ identify --email lorraine@hillvalley.edu --phone 123456
  $ identify --phone 123456 --format json
  $ identify --interactive
  $ identify --endpoint http://localhost:3000/identify --email mcfly@hillvalley.edu

Set RUST_LOG=debug to trace requests on stderr."#
)]
struct Cli {
    #[arg(long, help = "Email address to resolve (sent as empty string when omitted)")]
    email: Option<String>,
    #[arg(long, help = "Phone number to resolve (sent as empty string when omitted)")]
    phone: Option<String>,
    #[arg(
        long,
        default_value = DEFAULT_ENDPOINT,
        help = "Identity-resolution endpoint URL"
    )]
    endpoint: String,
    #[arg(
        long,
        default_value = "auto",
        value_enum,
        help = "Colorize the response tree and stderr labels: auto|always|never"
    )]
    color: ColorMode,
    #[arg(
        long,
        default_value = "tree",
        value_enum,
        help = "Response output format: tree|json"
    )]
    format: OutputFormat,
    #[arg(
        short,
        long,
        conflicts_with_all = ["email", "phone"],
        help = "Prompt for email and phone repeatedly until end of input"
    )]
    interactive: bool,
}

#[derive(Copy, Clone, Debug, ValueEnum)]
enum ColorMode {
    Auto,
    Always,
    Never,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
enum OutputFormat {
    Tree,
    Json,
}

impl ColorMode {
    fn use_color(self, is_tty: bool) -> bool {
        match self {
            ColorMode::Auto => is_tty,
            ColorMode::Always => true,
            ColorMode::Never => false,
        }
    }
}

fn init_tracing() {
    let env_filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("warn"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_target(false)
        .with_writer(io::stderr)
        .try_init();
}

fn run_interactive(
    client: &IdentityClient,
    session: &mut Session,
    format: OutputFormat,
    color_mode: ColorMode,
) -> Result<(), Error> {
    let stdin = io::stdin();
    let mut lines = stdin.lock().lines();
    loop {
        let Some(email) = prompt("Email: ", &mut lines)? else {
            return Ok(());
        };
        let Some(phone) = prompt("Phone Number: ", &mut lines)? else {
            return Ok(());
        };
        let input = FormInput {
            email: Some(email),
            phone: Some(phone),
        };
        submit_with_progress(client, session, &input);
        match session.state() {
            RequestState::Succeeded(value) => emit_response(value, format, color_mode),
            RequestState::Failed(message) => emit_failure_line(message, color_mode),
            RequestState::Idle | RequestState::Submitting => {}
        }
    }
}

fn prompt<I>(label: &str, lines: &mut I) -> Result<Option<String>, Error>
where
    I: Iterator<Item = io::Result<String>>,
{
    let mut stderr = io::stderr();
    let _ = write!(stderr, "{label}");
    let _ = stderr.flush();
    match lines.next() {
        Some(Ok(line)) => Ok(Some(line)),
        Some(Err(err)) => Err(Error::new(ErrorKind::Io)
            .with_message("failed to read stdin")
            .with_source(err)),
        None => Ok(None),
    }
}

fn submit_with_progress(client: &IdentityClient, session: &mut Session, input: &FormInput) {
    let show_progress = io::stderr().is_terminal();
    if show_progress {
        let mut stderr = io::stderr();
        let _ = write!(stderr, "Processing...");
        let _ = stderr.flush();
    }
    session.submit(client, input);
    if show_progress {
        // Erase the progress line.
        let mut stderr = io::stderr();
        let _ = write!(stderr, "\r\u{1b}[2K");
        let _ = stderr.flush();
    }
}

fn emit_response(value: &Value, format: OutputFormat, color_mode: ColorMode) {
    let is_tty = io::stdout().is_terminal();
    let use_color = color_mode.use_color(is_tty);
    println!("{}", response_text(value, format, is_tty, use_color));
}

/// The `Response:` header is for people; piped output stays machine-readable.
fn response_text(value: &Value, format: OutputFormat, is_tty: bool, use_color: bool) -> String {
    match format {
        OutputFormat::Tree => {
            let tree = render(value, 0);
            let body = if use_color {
                tree.to_ansi()
            } else {
                tree.to_plain()
            };
            if is_tty {
                format!("Response:\n{body}")
            } else {
                body
            }
        }
        OutputFormat::Json => serde_json::to_string_pretty(value)
            .unwrap_or_else(|_| "{\"error\":\"json encode failed\"}".to_string()),
    }
}

#[derive(Copy, Clone, Debug)]
enum AnsiColor {
    Red,
    Yellow,
}

fn colorize_label(label: &str, enabled: bool, color: AnsiColor) -> String {
    if !enabled {
        return label.to_string();
    }
    let code = match color {
        AnsiColor::Red => "31",
        AnsiColor::Yellow => "33",
    };
    format!("\u{1b}[{code}m{label}\u{1b}[0m")
}

fn emit_failure_line(message: &str, color_mode: ColorMode) {
    let use_color = color_mode.use_color(io::stderr().is_terminal());
    eprintln!("{} {message}", colorize_label("error:", use_color, AnsiColor::Red));
}

fn emit_error(err: &Error, color_mode: ColorMode) {
    let is_tty = io::stderr().is_terminal();
    if is_tty {
        eprintln!("{}", error_text(err, color_mode.use_color(is_tty)));
        return;
    }

    let value = error_json(err);
    let json = serde_json::to_string(&value).unwrap_or_else(|_| {
        "{\"error\":{\"kind\":\"Internal\",\"message\":\"json encode failed\"}}".to_string()
    });
    eprintln!("{json}");
}

fn error_causes(err: &Error) -> Vec<String> {
    let mut causes = Vec::new();
    let mut cur = err.source();
    while let Some(source) = cur {
        causes.push(source.to_string());
        cur = source.source();
    }
    causes
}

fn error_json(err: &Error) -> Value {
    let mut inner = Map::new();
    inner.insert("kind".to_string(), json!(format!("{:?}", err.kind())));
    inner.insert("message".to_string(), json!(err.user_message()));
    if let Some(hint) = err.hint() {
        inner.insert("hint".to_string(), json!(hint));
    }
    if let Some(status) = err.status() {
        inner.insert("status".to_string(), json!(status));
    }
    let causes = error_causes(err);
    if !causes.is_empty() {
        inner.insert("causes".to_string(), json!(causes));
    }

    let mut outer = Map::new();
    outer.insert("error".to_string(), Value::Object(inner));
    Value::Object(outer)
}

fn error_text(err: &Error, use_color: bool) -> String {
    let mut lines = vec![format!(
        "{} {}",
        colorize_label("error:", use_color, AnsiColor::Red),
        err.user_message()
    )];
    if let Some(hint) = err.hint() {
        lines.push(format!(
            "{} {hint}",
            colorize_label("hint:", use_color, AnsiColor::Yellow)
        ));
    }
    if let Some(cause) = error_causes(err).first() {
        lines.push(format!(
            "{} {cause}",
            colorize_label("caused by:", use_color, AnsiColor::Yellow)
        ));
    }
    lines.join("\n")
}

fn clap_error_summary(err: &clap::Error) -> String {
    for line in err.to_string().lines() {
        let trimmed = line.trim();
        if let Some(rest) = trimmed.strip_prefix("error:") {
            return rest.trim().to_string();
        }
    }
    "invalid arguments".to_string()
}
