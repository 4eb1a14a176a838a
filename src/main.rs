/*
    Command line front end for the submitter.
    - `submit` collects a single Maya layer from flags. With `--out-of-process` the request is
      written to a hand-off file and this same executable is re-launched as `worker`, the way the
      artist-facing tool keeps its own process isolated from the farm client.
    - `worker` is that second half. Its stdout is the report the caller relays back to the artist.
    - `compile` and `preview` never talk to the farm.
*/
mod cli;

use anyhow::{Context, Result};
use clap::Parser;
use cli::{first_host, Cli, Commands, SetupArgs, SubmitArgs};
use cuesubmit::{
    error::SubmitError, handoff::HandoffFile, pipeline, service::HttpFarmService, setup,
    spec::Compiler, FarmConfig, JobRequest, Pipeline, SubmissionResult,
};
use std::{
    fs,
    path::Path,
    process::{Command, ExitCode},
};
use tracing_subscriber::EnvFilter;

// exit code for a request that failed validation
const INVALID_REQUEST: u8 = 2;

fn load_config(path: Option<&Path>) -> Result<FarmConfig> {
    match path {
        Some(path) => FarmConfig::load_from(path)
            .with_context(|| format!("Unable to load farm config {}", path.display())),
        None => FarmConfig::load().context("Unable to load farm config"),
    }
}

fn read_request(path: &Path) -> Result<JobRequest> {
    let data = fs::read_to_string(path)
        .with_context(|| format!("Unable to read job request {}", path.display()))?;
    serde_json::from_str(&data)
        .with_context(|| format!("{} is not a valid job request", path.display()))
}

fn print_report(result: &SubmissionResult) {
    if result.is_empty() {
        println!("Job submitted successfully");
        return;
    }
    for job in result.iter() {
        println!("Job Name: {}", job.name);
        println!("Job ID: {}", job.id);
        println!("Log Path: {}", job.log_dir.display());
    }
}

fn report_failure(err: &SubmitError) -> ExitCode {
    match err {
        SubmitError::Validation(errors) => {
            eprintln!("Job request is invalid:");
            for message in errors.messages() {
                eprintln!("  - {message}");
            }
            ExitCode::from(INVALID_REQUEST)
        }
        other => {
            eprintln!("Submission error: {other}");
            ExitCode::FAILURE
        }
    }
}

fn submit_in_process(request: &JobRequest, config: &FarmConfig) -> ExitCode {
    let outcome = Pipeline::connect(config)
        .map_err(SubmitError::from)
        .and_then(|pipeline| pipeline.run(request));

    match outcome {
        Ok(result) => {
            print_report(&result);
            ExitCode::SUCCESS
        }
        Err(e) => report_failure(&e),
    }
}

fn submit_out_of_process(
    request: &JobRequest,
    config: &FarmConfig,
    config_path: Option<&Path>,
) -> Result<ExitCode> {
    // check before spawning so the artist sees every problem at once
    if let Err(e) = pipeline::compile_checked(&Compiler::new(config), request) {
        return Ok(report_failure(&e));
    }

    // the guard removes the file on every path out of this function
    let handoff = HandoffFile::write(request).context("Unable to write hand-off file")?;
    let exe = std::env::current_exe().context("Unable to locate the cuesubmit executable")?;

    let mut worker = Command::new(exe);
    worker.arg("worker").arg(handoff.path()).arg(&config.endpoint);
    if let Some(path) = config_path {
        worker.arg("--config").arg(path);
    }

    tracing::debug!("Launching worker for {}", handoff.path().display());
    let output = worker.output().context("Unable to launch submission worker")?;
    let stdout = String::from_utf8_lossy(&output.stdout);
    let stderr = String::from_utf8_lossy(&output.stderr);

    if output.status.success() {
        println!("Submitted job to the farm.\n");
        print!("{stdout}");
        Ok(ExitCode::SUCCESS)
    } else {
        eprintln!("Failed to submit job!\n");
        let detail = if stderr.trim().is_empty() { stdout } else { stderr };
        eprint!("{detail}");
        Ok(ExitCode::FAILURE)
    }
}

fn submit(args: &SubmitArgs, mut config: FarmConfig, config_path: Option<&Path>) -> Result<ExitCode> {
    if let Some(hosts) = &args.endpoint {
        let host = first_host(hosts);
        if !host.is_empty() {
            config.endpoint = host.to_owned();
        }
    }

    let request = args.to_request();
    tracing::info!("Submitting {} to {}", request.name, config.endpoint);

    if args.out_of_process {
        submit_out_of_process(&request, &config, config_path)
    } else {
        Ok(submit_in_process(&request, &config))
    }
}

fn worker(handoff: &Path, endpoint: &str, mut config: FarmConfig) -> ExitCode {
    config.endpoint = endpoint.to_owned();
    let outcome = Pipeline::connect(&config)
        .map_err(SubmitError::from)
        .and_then(|pipeline| pipeline.run_handoff(handoff));

    match outcome {
        Ok(result) => {
            print_report(&result);
            ExitCode::SUCCESS
        }
        Err(e) => {
            // the caller relays stderr verbatim
            if let Err(path_err) = fs::remove_file(handoff) {
                tracing::trace!("Hand-off file already gone: {path_err}");
            }
            eprintln!("Submission error: {e}");
            ExitCode::FAILURE
        }
    }
}

fn compile(path: &Path, config: &FarmConfig) -> Result<ExitCode> {
    let request = read_request(path)?;
    match pipeline::compile_checked(&Compiler::new(config), &request) {
        Ok(spec) => {
            println!("{}", spec.to_xml());
            Ok(ExitCode::SUCCESS)
        }
        Err(e) => Ok(report_failure(&e)),
    }
}

fn preview(path: &Path, config: &FarmConfig) -> Result<ExitCode> {
    let request = read_request(path)?;
    let commands = pipeline::preview(&Compiler::new(config), &request)
        .context("Unable to build layer commands")?;
    for (layer, command) in commands {
        println!("{layer}: {command}");
    }
    Ok(ExitCode::SUCCESS)
}

fn run_setup(args: &SetupArgs, config: &FarmConfig) -> Result<ExitCode> {
    let endpoint = first_host(&args.endpoint);
    println!("Connecting to farm service at {endpoint}...");
    let farm = HttpFarmService::connect(endpoint, config.timeout())?;

    let report = match setup::run(&farm, &args.show) {
        Ok(report) => report,
        Err(e) => {
            eprintln!("Error setting up farm: {e}");
            return Ok(ExitCode::FAILURE);
        }
    };

    for (name, action) in &report.services {
        println!("Service {name}: {action}");
    }
    println!("Show {}: {}", report.show.0, report.show.1);

    println!("\nFarm setup complete!\n");
    let listing = setup::verification(&farm).context("Unable to list farm services, shows and hosts")?;
    print!("{listing}");
    Ok(ExitCode::SUCCESS)
}

fn main() -> ExitCode {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .with_writer(std::io::stderr)
        .try_init();

    let cli = Cli::parse();
    let config_path = cli.config.as_deref();
    let config = match load_config(config_path) {
        Ok(config) => config,
        Err(e) => {
            eprintln!("Error: {e:#}");
            return ExitCode::FAILURE;
        }
    };

    let outcome = match &cli.command {
        Commands::Submit(args) => submit(args, config, config_path),
        Commands::Worker { handoff, endpoint } => Ok(worker(handoff, endpoint, config)),
        Commands::Compile { request } => compile(request, &config),
        Commands::Preview { request } => preview(request, &config),
        Commands::Setup(args) => run_setup(args, &config),
    };

    outcome.unwrap_or_else(|e| {
        eprintln!("Error: {e:#}");
        ExitCode::FAILURE
    })
}
