use std::{
    fs::{self, File},
    io::{self, BufRead, BufReader, BufWriter, Write},
};

use anyhow::{bail, Context, Result};
use clap::{Args, Parser, Subcommand};
use tracing::info;
use tracing_subscriber::EnvFilter;

use slidezip::{
    config::{DEFAULT_LOOKAHEAD_CAPACITY, DEFAULT_SEARCH_CAPACITY},
    detect_framing, BinaryTokenReader, BinaryTokenWriter, DecodeStats, Decoder, EncodeStats,
    Encoder, Framing, TextTokenReader, TextTokenWriter, TokenSink, WindowConfig,
};

#[derive(Parser)]
#[command(author, version, about, long_about = None)]
struct Cli {
    /// Increase log verbosity (-v, -vv)
    #[arg(short, long, action = clap::ArgAction::Count, global = true)]
    verbose: u8,
    /// Only log errors
    #[arg(short, long, global = true, conflicts_with = "verbose")]
    quiet: bool,
    #[command(subcommand)]
    command: Commands,
}

#[derive(Args, Clone, Copy)]
struct WindowArgs {
    /// Search window size in bytes
    #[arg(long, default_value_t = DEFAULT_SEARCH_CAPACITY)]
    search_size: usize,
    /// Lookahead window size in bytes
    #[arg(long, default_value_t = DEFAULT_LOOKAHEAD_CAPACITY)]
    lookahead_size: usize,
}

impl WindowArgs {
    fn config(self) -> Result<WindowConfig> {
        WindowConfig::new(self.search_size, self.lookahead_size).context("Invalid window sizes")
    }
}

#[derive(Subcommand)]
enum Commands {
    /// Encode an input file into LZ77 tokens
    Encode {
        /// Input file path (use - for stdin)
        input: String,
        /// Token file path (use - for stdout)
        output: String,
        /// Token framing to write
        #[arg(long, value_enum, default_value_t = Framing::Text)]
        format: Framing,
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Decode a token file back into the original bytes
    Decode {
        /// Token file path (use - for stdin)
        input: String,
        /// Output file path (use - for stdout)
        output: String,
        /// Token framing to read (detected if not specified)
        #[arg(long, value_enum)]
        format: Option<Framing>,
        // Binary tokens carry their own window sizes
        #[command(flatten)]
        window: WindowArgs,
    },
    /// Encode then decode a file and check the result matches the input
    Roundtrip {
        /// Input file path
        input: String,
        /// Token file to write
        #[arg(long, default_value = "LZ77-encoded.txt")]
        tokens: String,
        /// Decoded file to write
        #[arg(long, default_value = "LZ77-decoded.txt")]
        output: String,
        /// Token framing to use
        #[arg(long, value_enum, default_value_t = Framing::Text)]
        format: Framing,
        #[command(flatten)]
        window: WindowArgs,
    },
}

// Helper to open input (file or stdin)
fn open_input(path: &str) -> Result<Box<dyn BufRead>> {
    if path == "-" {
        Ok(Box::new(BufReader::new(io::stdin())))
    } else {
        let file = File::open(path)
            .with_context(|| format!("Failed to open input file: {}", path))?;
        Ok(Box::new(BufReader::new(file)))
    }
}

// Helper to open output (file or stdout)
fn open_output(path: &str) -> Result<Box<dyn Write>> {
    if path == "-" {
        Ok(Box::new(BufWriter::new(io::stdout())))
    } else {
        let file = File::create(path)
            .with_context(|| format!("Failed to create output file: {}", path))?;
        Ok(Box::new(BufWriter::new(file)))
    }
}

// Logs go to stderr so stdout stays free for data
fn init_tracing(verbose: u8, quiet: bool) {
    let level = match (quiet, verbose) {
        (true, _) => "error",
        (false, 0) => "info",
        (false, 1) => "debug",
        (false, _) => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_writer(io::stderr)
        .with_target(false)
        .init();
}

fn encode_file(
    input: &str,
    output: &str,
    format: Framing,
    config: WindowConfig,
) -> Result<EncodeStats> {
    let mut reader = open_input(input)?;
    let writer = open_output(output)?;

    let mut sink: Box<dyn TokenSink> = match format {
        Framing::Text => Box::new(TextTokenWriter::new(writer)),
        Framing::Binary => Box::new(BinaryTokenWriter::new(writer, config)),
    };
    let stats = Encoder::new(config)
        .encode(&mut reader, sink.as_mut())
        .with_context(|| format!("LZ77 encoding failed from {} to {}", input, output))?;
    info!(
        characters = stats.symbols_consumed,
        tokens = stats.tokens,
        "{} tokens generated from {} characters",
        stats.tokens,
        stats.symbols_consumed
    );
    Ok(stats)
}

fn decode_file(
    input: &str,
    output: &str,
    format: Option<Framing>,
    window: WindowArgs,
) -> Result<DecodeStats> {
    let mut reader = open_input(input)?;
    let mut writer = open_output(output)?;

    let format = match format {
        Some(format) => format,
        None => {
            let detected = detect_framing(&mut reader)
                .with_context(|| format!("Failed to detect token framing for input {}", input))?;
            info!("Detected {:?} token framing", detected);
            detected
        }
    };

    let decoded = match format {
        Framing::Text => {
            let config = window.config()?;
            Decoder::new(config).decode(&mut TextTokenReader::new(reader), &mut writer)
        }
        Framing::Binary => {
            let mut tokens = BinaryTokenReader::open(reader)
                .with_context(|| format!("Failed to read token header from {}", input))?;
            let config = tokens.config();
            if (window.search_size, window.lookahead_size)
                != (config.search_capacity, config.lookahead_capacity)
            {
                info!(
                    search_size = config.search_capacity,
                    lookahead_size = config.lookahead_capacity,
                    "Using window sizes recorded in the token stream"
                );
            }
            Decoder::new(config).decode(&mut tokens, &mut writer)
        }
    };
    let stats = decoded
        .with_context(|| format!("LZ77 decoding failed from {} to {}", input, output))?;
    writer.flush().with_context(|| format!("Failed to flush output {}", output))?;

    info!("{} tokens processed, {} bytes written", stats.tokens, stats.bytes_written);
    Ok(stats)
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    init_tracing(cli.verbose, cli.quiet);

    match cli.command {
        Commands::Encode {
            input,
            output,
            format,
            window,
        } => {
            info!("Encoding {} to {} ({:?} tokens)...", input, output, format);
            encode_file(&input, &output, format, window.config()?)?;
            info!("Encoding successful.");
        }
        Commands::Decode {
            input,
            output,
            format,
            window,
        } => {
            info!("Decoding {} to {}...", input, output);
            decode_file(&input, &output, format, window)?;
            info!("Decoding successful.");
        }
        Commands::Roundtrip {
            input,
            tokens,
            output,
            format,
            window,
        } => {
            if input == "-" {
                bail!("Roundtrip needs a file path, not stdin");
            }
            let config = window.config()?;
            info!("Starting LZ77 encoder.");
            encode_file(&input, &tokens, format, config)?;
            info!("Starting LZ77 decoder.");
            decode_file(&tokens, &output, Some(format), window)?;

            let original = fs::read(&input).with_context(|| format!("Failed to read {}", input))?;
            let decoded = fs::read(&output).with_context(|| format!("Failed to read {}", output))?;
            if original != decoded {
                bail!("Decoded file {} differs from input {}", output, input);
            }
            info!("Roundtrip successful.");
        }
    }

    Ok(())
}
