use std::io;
use std::path::PathBuf;
use std::process;

use clap::Parser;

use voxline_core::protocol::emitter::ResponseWriter;
use voxline_core::protocol::envelope::OneShotOutput;
use voxline_core::protocol::request_loop::{run_one_shot, run_server};
use voxline_core::transcription::domain::engine::SpeechEngine;
use voxline_core::transcription::infrastructure::whisper_engine::WhisperEngine;

/// Transcription worker speaking line-delimited JSON over stdin/stdout.
#[derive(Parser)]
#[command(name = "voxline")]
struct Cli {
    /// Audio file to transcribe (one-shot mode, exactly one output line).
    audio_file: Option<PathBuf>,

    /// Read one request per stdin line until end-of-input.
    #[arg(long)]
    server: bool,

    /// Directory holding the model weights and configuration artifacts.
    #[arg(long, default_value = "models/large-v3")]
    model_dir: PathBuf,
}

fn main() {
    env_logger::init();

    if let Err(e) = run() {
        eprintln!("Error: {e}");
        process::exit(1);
    }
}

fn run() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.server == cli.audio_file.is_some() {
        return Err("pass either an audio file or --server".into());
    }

    // The one engine handle for the process lifetime. A load failure is
    // reported once, on the protocol stream, before any request is read.
    let engine = match WhisperEngine::load(&cli.model_dir) {
        Ok(engine) => engine,
        Err(e) => {
            log::error!("startup failed: {e}");
            emit_startup_error(&e.to_string())?;
            return Err(e.into());
        }
    };
    let engine: &dyn SpeechEngine = &engine;

    if cli.server {
        let stdin = io::stdin();
        let stdout = io::stdout();
        run_server(engine, stdin.lock(), stdout.lock())?;
    } else {
        let audio = cli.audio_file.expect("checked above");
        run_one_shot(engine, &audio, io::stdout().lock())?;
    }

    Ok(())
}

fn emit_startup_error(message: &str) -> io::Result<()> {
    let mut writer = ResponseWriter::new(io::stdout().lock());
    writer.emit_one_shot(&OneShotOutput::Err {
        error: message.to_string(),
    })
}
