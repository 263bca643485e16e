use clap::error::ErrorKind;
use clap::Parser;
use shared_utils::logging::{init_logging, LogConfig};
use shared_utils::{FfmpegRunner, ShrinkError, SizeTarget, DEFAULT_FFMPEG};
use std::io;
use std::path::PathBuf;
use std::process::ExitCode;
use tracing::info;

use vid_shrink::{run, ShrinkConfig};

#[derive(Parser, Debug)]
#[command(name = "vid-shrink")]
#[command(version, about = "Re-encode a video so the output lands near a target size", long_about = None)]
struct Cli {
    /// Video to shrink
    #[arg(value_name = "INPUT")]
    input: PathBuf,

    /// Desired output size in megabytes
    #[arg(value_name = "SIZE_MB")]
    size_mb: String,

    /// ffmpeg binary to use
    #[arg(long, value_name = "PATH", default_value = DEFAULT_FFMPEG)]
    ffmpeg: PathBuf,

    /// Probe and calculate only, do not encode
    #[arg(long)]
    dry_run: bool,

    /// Print the plan as a single JSON line instead of progress text
    #[arg(long)]
    json: bool,

    #[arg(short, long)]
    verbose: bool,
}

fn main() -> ExitCode {
    let cli = match Cli::try_parse() {
        Ok(cli) => cli,
        Err(e) if matches!(e.kind(), ErrorKind::DisplayHelp | ErrorKind::DisplayVersion) => {
            let _ = e.print();
            return ExitCode::SUCCESS;
        }
        Err(e) => {
            let err = ShrinkError::Usage(e.render().to_string());
            eprint!("{}", err);
            return ExitCode::from(err.exit_code());
        }
    };

    let log_config = if cli.verbose {
        LogConfig::default().verbose()
    } else {
        LogConfig::default()
    };
    let _ = init_logging("vid_shrink", log_config);

    match execute(cli) {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            info!(error = %e, exit_code = e.exit_code(), "vid-shrink failed");
            eprintln!("error: {}", e);
            ExitCode::from(e.exit_code())
        }
    }
}

fn execute(cli: Cli) -> Result<(), ShrinkError> {
    let target: SizeTarget = cli.size_mb.parse()?;

    let runner = FfmpegRunner::locate(&cli.ffmpeg).map_err(|e| ShrinkError::ProbeInvocation {
        message: format!(
            "{} not found ({}). Install with: brew install ffmpeg / apt install ffmpeg, or pass --ffmpeg <PATH>",
            cli.ffmpeg.display(),
            e
        ),
        source: None,
    })?;

    let config = ShrinkConfig {
        input: cli.input,
        target,
        dry_run: cli.dry_run,
    };

    if cli.json {
        let report = run(&config, &runner, &mut io::sink())?;
        println!("{}", report.to_json_line()?);
    } else {
        run(&config, &runner, &mut io::stdout().lock())?;
    }

    Ok(())
}
