use std::path::PathBuf;
use std::process::ExitCode;
use std::time::{Duration, Instant};

use clap::Parser;

use simd_c_lexer::{LexerError, SourceBuffer, Token, lex, print_tokens};

/// Tokenize a C source file using lane-group byte classification.
#[derive(Debug, Parser)]
#[command(name = "simd-lexer", version, about)]
struct Args {
    /// Source file to tokenize
    file: PathBuf,

    /// Measure scan time instead of printing tokens
    #[arg(short = 't', long = "time")]
    time: bool,

    /// Number of timed scan repetitions to average over
    #[arg(long, default_value_t = 1, requires = "time")]
    repeat: u32,

    /// Print tokens as JSON instead of one lexeme per line
    #[arg(long, conflicts_with = "time")]
    json: bool,
}

fn main() -> ExitCode {
    let args = Args::parse();
    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("simd-lexer: {err}");
            ExitCode::FAILURE
        }
    }
}

fn run(args: &Args) -> Result<(), LexerError> {
    let buf = SourceBuffer::from_path(&args.file)?;

    if args.time {
        time_scan(&buf, args.repeat.max(1));
        return Ok(());
    }

    let tokens = lex(&buf);
    if args.json {
        let typed: Vec<Token> = tokens.tokens().collect::<Result<_, _>>()?;
        // Token is a plain (kind, loc) pair; serialization cannot fail.
        if let Ok(json) = serde_json::to_string_pretty(&typed) {
            println!("{json}");
        }
    } else {
        print_tokens(&tokens, buf.bytes());
    }
    Ok(())
}

fn time_scan(buf: &SourceBuffer, repeat: u32) {
    let mut total = Duration::ZERO;
    let mut token_count = 0;
    for _ in 0..repeat {
        let start = Instant::now();
        let tokens = lex(buf);
        total += start.elapsed();
        token_count = tokens.len();
    }
    let avg = total / repeat;
    let mbps = if avg.as_secs_f64() > 0.0 {
        buf.len() as f64 / avg.as_secs_f64() / 1e6
    } else {
        f64::INFINITY
    };
    println!(
        "{} bytes, {} tokens, {:?} avg over {} runs ({:.1} MB/s)",
        buf.len(),
        token_count,
        avg,
        repeat,
        mbps
    );
}
