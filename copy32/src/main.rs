use anyhow::Result;
use clap::Parser;

#[derive(Parser, Debug, Clone)]
#[command(
    name = "copy32",
    version,
    about = "Copy a file through a small fixed-size circular buffer, preserving its permission bits",
    long_about = "`copy32` streams SOURCE into DESTINATION through a circular buffer of fixed capacity, so memory use \
never depends on the file size. DESTINATION is created or truncated and ends up with the permission bits of SOURCE \
regardless of the umask.

EXAMPLE:
    # Copy a file and print transfer statistics
    copy32 /path/to/source /path/to/destination --summary

Exits with status 0 on success and 1 on any failure, which is reported as a single line on stderr."
)]
struct Args {
    // Buffer options
    /// Circular buffer capacity, e.g. "32", "4KiB"
    ///
    /// The default is deliberately tiny so that the buffer wraps around even for small files.
    #[arg(
        long,
        default_value_t = common::DEFAULT_CAPACITY,
        value_name = "SIZE",
        value_parser = parse_capacity,
        help_heading = "Buffer options"
    )]
    capacity: usize,

    // Progress & output
    /// Verbose level: -v INFO / -vv DEBUG / -vvv TRACE (default: ERROR)
    #[arg(short = 'v', long = "verbose", action = clap::ArgAction::Count, help_heading = "Progress & output")]
    verbose: u8,

    /// Print summary at the end
    #[arg(long, help_heading = "Progress & output")]
    summary: bool,

    /// Quiet mode, don't report errors
    #[arg(short = 'q', long = "quiet", help_heading = "Progress & output")]
    quiet: bool,

    // ARGUMENTS
    /// File to copy from
    #[arg()]
    src: std::path::PathBuf,

    /// File to create or truncate
    #[arg()]
    dst: std::path::PathBuf,
}

fn parse_capacity(value: &str) -> Result<usize, String> {
    let bytes = match value.parse::<u64>() {
        Ok(bytes) => bytes,
        Err(_) => value.parse::<bytesize::ByteSize>()?.as_u64(),
    };
    let capacity = usize::try_from(bytes).map_err(|err| err.to_string())?;
    common::RelayConfig { capacity }.validate()?;
    Ok(capacity)
}

fn parse_args() -> Args {
    match Args::try_parse() {
        Ok(args) => args,
        Err(error) => match error.kind() {
            clap::error::ErrorKind::DisplayHelp | clap::error::ErrorKind::DisplayVersion => {
                error.exit()
            }
            _ => {
                common::report(&common::Error::Usage);
                std::process::exit(1);
            }
        },
    }
}

fn main() -> Result<()> {
    let args = parse_args();
    let output = common::OutputConfig {
        quiet: args.quiet,
        verbose: args.verbose,
        print_summary: args.summary,
    };
    let relay = common::RelayConfig {
        capacity: args.capacity,
    };
    common::init_tracing(&output)?;
    tracing::info!("copy: {:?} -> {:?}", &args.src, &args.dst);
    let res = common::run(output, || common::copy_file(&args.src, &args.dst, &relay));
    if res.is_none() {
        std::process::exit(1);
    }
    Ok(())
}
