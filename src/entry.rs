use std::ffi::OsString;
use std::process::ExitCode;
use std::time::Duration;

use clap::{ArgMatches, CommandFactory, FromArgMatches};
use tracing::info;

use crate::args::{CallArgs, Command, CorsArgs, HttpMethod, ProbeArgs};
use crate::config::types::ConfigFile;
use crate::config::{apply_config, default_config_exists, load_config, suite_settings};
use crate::error::{AppError, AppResult, ValidationError};
use crate::remote::cors::check_cors;
use crate::remote::{ClientSettings, Credentials, FunctionCall, HttpTransport, RemoteClient};
use crate::report::{export_json, generate_report, print_report, print_validation};
use crate::suite::TestSuite;

pub(crate) fn run() -> AppResult<ExitCode> {
    let Some((mut args, matches)) = parse_args()? else {
        return Ok(ExitCode::SUCCESS);
    };

    let config = load_config(args.config.as_deref())?;
    if let Some(config) = config.as_ref() {
        apply_config(&mut args, &matches, config)?;
    }

    crate::logger::init_logging(args.verbose, args.no_color);

    let runtime = tokio::runtime::Builder::new_multi_thread()
        .enable_all()
        .build()?;

    runtime.block_on(run_async(args, config.unwrap_or_default()))
}

fn parse_args() -> AppResult<Option<(ProbeArgs, ArgMatches)>> {
    let mut cmd = ProbeArgs::command();
    let raw_args: Vec<OsString> = std::env::args_os().collect();

    if should_show_help(&raw_args) {
        cmd.print_help()?;
        println!();
        return Ok(None);
    }

    let matches = cmd.get_matches_from(raw_args);
    let args = ProbeArgs::from_arg_matches(&matches)?;

    Ok(Some((args, matches)))
}

fn should_show_help(raw_args: &[OsString]) -> bool {
    let treat_as_empty =
        matches!(raw_args, [] | [_]) || matches!(raw_args, [_, second] if second == "--");
    if !treat_as_empty {
        return false;
    }

    !default_config_exists() && std::env::var_os("EDGEPROBE_BASE_URL").is_none()
}

async fn run_async(mut args: ProbeArgs, config: ConfigFile) -> AppResult<ExitCode> {
    let client = build_client(&args)?;

    match args.command.take().unwrap_or(Command::Run) {
        Command::Run => run_suite(client, &args, &config).await,
        Command::Cors(cors) => run_cors(&client, &args, &cors).await,
        Command::Call(call) => run_call(&client, &args, &call).await,
    }
}

fn build_client(args: &ProbeArgs) -> AppResult<RemoteClient<HttpTransport>> {
    let Some(base_url) = args.base_url.as_deref().filter(|url| !url.trim().is_empty()) else {
        tracing::error!("Missing base URL (set --base-url or provide in config).");
        return Err(AppError::validation(ValidationError::MissingBaseUrl));
    };
    let Some(anon_key) = args.anon_key.as_deref().filter(|key| !key.trim().is_empty()) else {
        tracing::error!("Missing anon key (set --anon-key or provide in config).");
        return Err(AppError::validation(ValidationError::MissingAnonKey));
    };

    let credentials = Credentials::new(anon_key.trim(), args.session_token.clone());
    if !credentials.has_session() {
        info!("No session token configured, authenticating with the anon key");
    }
    let settings = ClientSettings::new(
        base_url,
        credentials,
        Duration::from_millis(args.backoff_ms),
    )?;
    Ok(RemoteClient::new(HttpTransport::new()?, settings))
}

async fn run_suite(
    client: RemoteClient<HttpTransport>,
    args: &ProbeArgs,
    config: &ConfigFile,
) -> AppResult<ExitCode> {
    let settings = suite_settings(args, config.suite.as_ref(), config.contract.as_ref())?;
    info!(
        "Running test suite against {}",
        client.settings().base_url()
    );

    let mut suite = TestSuite::new(client, settings);
    let outcome = suite.run_complete_test_suite().await;

    print_report("Performance Test Report", &outcome.report);
    print_validation(&outcome.validation);
    println!("Suite Duration: {}ms", outcome.total_duration_ms);

    if let Some(path) = args.export_json.as_deref() {
        export_json(path, &outcome).await?;
        info!("Wrote report to {}", path);
    }

    Ok(exit_code(
        outcome.report.summary.failed_tests == 0 && outcome.validation.is_valid(),
    ))
}

async fn run_cors(
    client: &RemoteClient<HttpTransport>,
    args: &ProbeArgs,
    cors: &CorsArgs,
) -> AppResult<ExitCode> {
    if cors.functions.is_empty() {
        return Err(AppError::validation(ValidationError::NoCorsFunctions));
    }

    let records = check_cors(client, &cors.origin, &cors.functions, args.request_timeout).await;
    let report = generate_report(&records);
    print_report(
        &format!("CORS Preflight Report (origin {})", cors.origin),
        &report,
    );

    if let Some(path) = args.export_json.as_deref() {
        export_json(path, &report).await?;
        info!("Wrote report to {}", path);
    }

    Ok(exit_code(report.summary.failed_tests == 0))
}

async fn run_call(
    client: &RemoteClient<HttpTransport>,
    args: &ProbeArgs,
    call_args: &CallArgs,
) -> AppResult<ExitCode> {
    let mut call = if call_args.edge {
        FunctionCall::edge(call_args.name.as_str())
    } else {
        FunctionCall::rpc(call_args.name.as_str())
    }
    .with_method(call_args.method)
    .with_retries(args.retries)
    .with_timeout(args.request_timeout);

    match call_args.data.clone() {
        Some(body) => call = call.with_body(body),
        None if call_args.method == HttpMethod::Get => call.body = None,
        None => {}
    }
    for (key, value) in &call_args.query {
        call = call.with_query(key.as_str(), value.as_str());
    }

    let value = client.call(&call).await?;
    println!("{}", serde_json::to_string_pretty(&value)?);

    if let Some(path) = args.export_json.as_deref() {
        export_json(path, &value).await?;
        info!("Wrote response to {}", path);
    }

    Ok(ExitCode::SUCCESS)
}

const fn exit_code(passed: bool) -> ExitCode {
    if passed {
        ExitCode::SUCCESS
    } else {
        ExitCode::FAILURE
    }
}
