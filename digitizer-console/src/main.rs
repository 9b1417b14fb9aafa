use std::path::PathBuf;

use anyhow::{Context, Result, bail};
use clap::{Args as ClapArgs, Parser, Subcommand};
use digitizer_console::config::{ConfigLoaderOptions, ConfigOverrides};
use digitizer_console::{
    ApiClient, ConfigLoader, ConsoleConfig, DigitizerApi, EventChannel,
    LiveStateStore, SceneReviewSession,
};
use digitizer_core::{BoundaryPolicy, LiveState};
use digitizer_model::{
    ByteSize, Job, JobId, JobQuery, Scene, SettingsUpdate, SourceType,
    Timecode,
};
use tracing::{info, warn};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

/// Operator console for the Digitizer backend
#[derive(Parser, Debug)]
#[command(name = "digitizer-console", version)]
#[command(about = "Watch and drive a disc/tape digitization backend")]
struct Cli {
    /// Path to a TOML configuration file
    #[arg(long, global = true, value_name = "FILE")]
    config: Option<PathBuf>,

    /// `.env` file to load instead of the one in the working directory
    #[arg(long, global = true, value_name = "FILE")]
    env_file: Option<PathBuf>,

    /// Backend base URL (overrides config and environment)
    #[arg(long, global = true, value_name = "URL")]
    server: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    timeout: Option<u64>,

    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Follow live drive, capture and job events until interrupted
    Watch,
    /// List jobs, newest first
    Jobs(JobsArgs),
    /// Show one job
    Job { id: String },
    /// Delete a job record
    DeleteJob { id: String },
    /// List the scenes of a job
    Scenes { id: String },
    /// Split the scene containing a timestamp
    Cut {
        id: String,
        /// Seconds from the start of the recording
        at: f64,
    },
    /// Remove a scene, merging it into a neighbour
    Merge {
        id: String,
        /// Scene number as listed by `scenes`
        scene: usize,
    },
    /// Move the boundaries of one scene
    Adjust(AdjustArgs),
    /// Re-run scene detection
    Analyze { id: String },
    /// Write one file per scene
    Split { id: String },
    /// Control the tape capture
    Capture {
        #[command(subcommand)]
        action: CaptureAction,
    },
    /// Show the optical drive state
    Drive,
    /// Show or change backend settings
    Settings(SettingsArgs),
}

#[derive(ClapArgs, Debug)]
struct JobsArgs {
    /// Number of jobs to fetch (defaults to the configured page size)
    #[arg(long)]
    limit: Option<u32>,
    #[arg(long, default_value_t = 0)]
    offset: u32,
    /// Only jobs from this source (`dvd` or `vhs`)
    #[arg(long)]
    source: Option<SourceType>,
}

#[derive(ClapArgs, Debug)]
struct AdjustArgs {
    id: String,
    /// Scene number as listed by `scenes`
    scene: usize,
    start: f64,
    end: f64,
    /// Refuse edits that would leave a gap or overlap instead of moving
    /// the neighbouring scenes
    #[arg(long)]
    strict: bool,
}

#[derive(Subcommand, Debug)]
enum CaptureAction {
    Start,
    Stop,
    Status,
}

#[derive(ClapArgs, Debug)]
struct SettingsArgs {
    #[arg(long)]
    output_path: Option<String>,
    #[arg(long)]
    naming_pattern: Option<String>,
    #[arg(long)]
    auto_eject: Option<bool>,
}

impl SettingsArgs {
    fn into_update(self) -> Option<SettingsUpdate> {
        let update = SettingsUpdate {
            output_path: self.output_path,
            naming_pattern: self.naming_pattern,
            auto_eject: self.auto_eject,
        };
        (!update.is_empty()).then_some(update)
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn,digitizer_console=info".into()),
        )
        .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
        .init();

    let config = load_config(&cli)?;
    let api = ApiClient::with_timeout(&config.server_url, config.request_timeout);

    match cli.command {
        Command::Watch => watch(&config).await,
        Command::Jobs(args) => list_jobs(&api, &config, args).await,
        Command::Job { id } => {
            let job = api.get_job(&JobId::new(id)).await?;
            print_job(&job);
            Ok(())
        }
        Command::DeleteJob { id } => {
            let id = JobId::new(id);
            let result = api.delete_job(&id).await?;
            if result.deleted {
                println!("deleted {id}");
            } else {
                println!("{id} was not deleted");
            }
            Ok(())
        }
        Command::Scenes { id } => {
            let mut session = SceneReviewSession::new(api, JobId::new(id));
            session.load().await?;
            print_scenes(session.scenes(), |scene| session.thumbnail_url(scene));
            Ok(())
        }
        Command::Cut { id, at } => {
            let mut session = load_session(api, id, BoundaryPolicy::default()).await?;
            let scenes = session
                .add_cut(at)
                .await
                .with_context(|| format!("cut at {}", Timecode::from_secs(at)))?;
            print_scenes(scenes, |_| None);
            Ok(())
        }
        Command::Merge { id, scene } => {
            let position = scene_position(scene)?;
            let mut session = load_session(api, id, BoundaryPolicy::default()).await?;
            let scenes = session
                .delete_scene(position)
                .await
                .with_context(|| format!("merge scene {scene}"))?;
            print_scenes(scenes, |_| None);
            Ok(())
        }
        Command::Adjust(args) => {
            let position = scene_position(args.scene)?;
            let policy = if args.strict {
                BoundaryPolicy::Strict
            } else {
                BoundaryPolicy::Reconcile
            };
            let mut session = load_session(api, args.id, policy).await?;
            let scenes = session
                .adjust_scene(position, args.start, args.end)
                .await
                .with_context(|| format!("adjust scene {}", args.scene))?;
            print_scenes(scenes, |_| None);
            Ok(())
        }
        Command::Analyze { id } => {
            let id = JobId::new(id);
            let job = api.get_job(&id).await?;
            if !job.can_analyze() {
                bail!(
                    "{id} is a {} job in state {}; only finished VHS captures \
                     can be analyzed",
                    job.source_type,
                    job.status
                );
            }
            let ack = api.analyze_scenes(&id).await?;
            println!("{}: {}", ack.job_id, ack.status);
            Ok(())
        }
        Command::Split { id } => {
            let ack = api.split_scenes(&JobId::new(id)).await?;
            println!("{}: {} ({} scenes)", ack.job_id, ack.status, ack.scene_count);
            Ok(())
        }
        Command::Capture { action } => capture(&api, action).await,
        Command::Drive => {
            let drive = api.get_drive().await?;
            println!("drive: {}", drive.status);
            Ok(())
        }
        Command::Settings(args) => {
            let settings = match args.into_update() {
                Some(update) => api.update_settings(&update).await?,
                None => api.get_settings().await?,
            };
            println!("output_path    = {}", settings.output_path);
            println!("naming_pattern = {}", settings.naming_pattern);
            println!("auto_eject     = {}", settings.auto_eject);
            Ok(())
        }
    }
}

fn load_config(cli: &Cli) -> Result<ConsoleConfig> {
    let loader = ConfigLoader::with_options(ConfigLoaderOptions {
        config_path: cli.config.clone(),
        env_file: cli.env_file.clone(),
    })
    .with_overrides(ConfigOverrides {
        server_url: cli.server.clone(),
        request_timeout_secs: cli.timeout,
        page_size: None,
    });
    let load = loader.load().context("failed to load configuration")?;
    Ok(load.config)
}

async fn load_session(
    api: ApiClient,
    id: String,
    policy: BoundaryPolicy,
) -> Result<SceneReviewSession<ApiClient>> {
    let mut session = SceneReviewSession::with_policy(api, JobId::new(id), policy);
    session
        .load()
        .await
        .with_context(|| format!("load scenes for {}", session.job_id()))?;
    Ok(session)
}

/// Scene numbers on the command line are the 1-based indices `scenes` prints.
fn scene_position(scene: usize) -> Result<usize> {
    match scene.checked_sub(1) {
        Some(position) => Ok(position),
        None => bail!("scene numbers start at 1"),
    }
}

async fn watch(config: &ConsoleConfig) -> Result<()> {
    let store = LiveStateStore::new();
    let subscription = store.subscribe(|state: &LiveState| {
        println!("{}", describe_live(state));
    });

    let mut channel = EventChannel::new(config.channel_config()?);
    channel.connect(store.clone())?;
    info!(url = %channel.config().url, "watching live events, Ctrl-C to stop");

    if let Err(err) = tokio::signal::ctrl_c().await {
        warn!(error = %err, "failed to listen for Ctrl-C");
    }

    channel.teardown().await;
    store.unsubscribe(subscription);
    Ok(())
}

async fn list_jobs(
    api: &ApiClient,
    config: &ConsoleConfig,
    args: JobsArgs,
) -> Result<()> {
    let mut query = JobQuery::default()
        .with_limit(args.limit.unwrap_or(config.default_page_size))
        .with_offset(args.offset);
    if let Some(source) = args.source {
        query = query.with_source(source);
    }

    let jobs = api.list_jobs(query).await?;
    if jobs.is_empty() {
        println!("no jobs");
    }
    for job in &jobs {
        let size = job.file_size.map(ByteSize::from_bytes);
        println!(
            "{:<24} {:<4} {:<10} {:>10} {}",
            job.id,
            job.source_type,
            job.status,
            size.map(|s| s.to_string()).unwrap_or_default(),
            job.started_at.as_deref().unwrap_or("")
        );
    }
    Ok(())
}

async fn capture(api: &ApiClient, action: CaptureAction) -> Result<()> {
    match action {
        CaptureAction::Start => {
            let started = api.start_capture().await?;
            println!("capturing into {} ({})", started.job_id, started.status);
        }
        CaptureAction::Stop => {
            let job = api.stop_capture().await?;
            print_job(&job);
        }
        CaptureAction::Status => {
            let status = api.get_capture_status().await?;
            print!("capture: {}", status.status);
            if let Some(job_id) = &status.job_id {
                print!(" job={job_id}");
            }
            if let Some(elapsed) = status.elapsed {
                print!(" elapsed={}", Timecode::from_secs(elapsed));
            }
            if let Some(size) = status
                .file_size
                .map(ByteSize::from_bytes)
                .filter(|size| !size.is_zero())
            {
                print!(" size={size}");
            }
            println!();
        }
    }
    Ok(())
}

fn print_job(job: &Job) {
    println!("id:        {}", job.id);
    println!("source:    {}", job.source_type);
    println!("status:    {}", job.status);
    if !job.status.is_terminal() {
        println!("progress:  {}%", job.progress);
    }
    println!("duration:  {}", Timecode::from_secs(job.duration()));
    for (label, parsed) in [
        ("started:  ", job.started_at_utc()),
        ("completed:", job.completed_at_utc()),
    ] {
        match parsed {
            Some(Ok(at)) => println!("{label} {}", at.format("%Y-%m-%d %H:%M:%S UTC")),
            Some(Err(err)) => warn!(job = %job.id, error = %err, "bad timestamp"),
            None => {}
        }
    }
    if let Some(path) = &job.output_path {
        println!("output:    {path}");
    }
    if let Some(size) = job.file_size {
        println!("size:      {}", ByteSize::from_bytes(size));
    }
    if let Some(analysis) = job.analysis_status {
        println!("analysis:  {analysis}");
    }
    if let Some(count) = job.scene_count {
        println!("scenes:    {count}");
    }
    if let Some(error) = &job.error {
        println!("error:     {error}");
    }
}

fn print_scenes<F>(scenes: &[Scene], thumbnail: F)
where
    F: Fn(&Scene) -> Option<String>,
{
    if scenes.is_empty() {
        println!("no scenes");
        return;
    }
    for scene in scenes {
        let mut line = format!(
            "{:>3}  {} - {}  ({})",
            scene.scene_index,
            Timecode::from_secs(scene.start_time).precise(),
            Timecode::from_secs(scene.end_time).precise(),
            Timecode::from_secs(scene.duration),
        );
        if scene.is_split() {
            line.push_str("  [split]");
        }
        if let Some(url) = thumbnail(scene) {
            line.push_str("  ");
            line.push_str(&url);
        }
        println!("{line}");
    }
}

fn describe_live(state: &LiveState) -> String {
    let mut parts = vec![
        if state.connected { "online" } else { "offline" }.to_string(),
        format!("drive={}", state.drive_status),
        format!("capture={}", state.capture_status),
    ];
    if let Some(rip) = &state.active_job {
        parts.push(format!("rip {}={}%", rip.job_id, rip.progress));
    }
    if state.is_recording()
        && let Some(capture) = &state.capture
    {
        let mut part = format!(
            "recording {} {}",
            capture.job_id,
            Timecode::from_secs(capture.elapsed)
        );
        let size = ByteSize::from_bytes(capture.file_size);
        if !size.is_zero() {
            part.push_str(&format!(" {size}"));
        }
        parts.push(part);
    }
    if let Some(analysis) = &state.analysis {
        parts.push(format!("analyzing {}={}%", analysis.job_id, analysis.progress));
    }
    if let Some(split) = &state.split {
        parts.push(format!(
            "splitting {}={}% scene {}",
            split.job_id, split.progress, split.current_scene
        ));
    }
    if let Some(job) = &state.last_failed {
        parts.push(format!(
            "failed {}: {}",
            job.id,
            job.error.as_deref().unwrap_or("unknown error")
        ));
    } else if let Some(job) = &state.last_completed {
        parts.push(format!("completed {}", job.id));
    }
    parts.join(" | ")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn settings_without_flags_is_a_read() {
        let args = SettingsArgs {
            output_path: None,
            naming_pattern: None,
            auto_eject: None,
        };
        assert_eq!(args.into_update(), None);

        let args = SettingsArgs {
            output_path: None,
            naming_pattern: None,
            auto_eject: Some(false),
        };
        let update = args.into_update().expect("update");
        assert_eq!(update.auto_eject, Some(false));
        assert!(update.output_path.is_none());
    }

    #[test]
    fn scene_numbers_are_one_based() {
        assert_eq!(scene_position(1).expect("first"), 0);
        assert_eq!(scene_position(4).expect("fourth"), 3);
        assert!(scene_position(0).is_err());
    }

    #[test]
    fn cli_parses_strict_adjust() {
        let cli = Cli::try_parse_from([
            "digitizer-console",
            "--server",
            "http://digitizer.lan",
            "adjust",
            "tape-1",
            "2",
            "10.5",
            "30",
            "--strict",
        ])
        .expect("parse");
        assert_eq!(cli.server.as_deref(), Some("http://digitizer.lan"));
        match cli.command {
            Command::Adjust(args) => {
                assert_eq!(args.scene, 2);
                assert_eq!((args.start, args.end), (10.5, 30.0));
                assert!(args.strict);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
