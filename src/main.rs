mod config_drive;
mod precommit;
mod terraform;

use userdata_mime::{
    boundary_for, expand, write_message, Destination, MarkerTable, MultipartBuilder,
    PartBuilder, PartSpec, TransferEncoding, TypeResolver,
};

use std::{
    fs::File,
    io::{self, BufReader},
    path::PathBuf,
    process,
};

use anyhow::Context;
use log::LevelFilter;
use simple_logger::SimpleLogger;
use structopt::{clap::ErrorKind, StructOpt};

const EXIT_FAILURE: i32 = 1;
const EXIT_USAGE: i32 = 2;
const EXIT_DECODE: i32 = 3;

#[derive(StructOpt, Debug)]
#[structopt(name = "cloudutil")]
struct AppArgs {
    /// Log more, repeat for even more (RUST_LOG overrides)
    #[structopt(short, long, parse(from_occurrences), global = true)]
    verbose: u8,
    #[structopt(subcommand)]
    cmd: Command,
}

#[derive(StructOpt, Debug)]
enum Command {
    /// Build a MIME multipart userdata file from part files
    WriteMime(WriteMimeArgs),
    /// Expand base64 text parts of a userdata file, for `git diff`
    Decode(DecodeArgs),
    /// Print config drive metadata as key=value lines
    Getconfig(GetconfigArgs),
    /// Print the remote name from a Terraform state file
    Getremote(GetremoteArgs),
    /// Set up the userdata diff filter and pre-commit hooks
    InstallPrecommit,
}

#[derive(StructOpt, Debug)]
struct WriteMimeArgs {
    /// Write output to FILE, `-` for standard output
    #[structopt(short, long, value_name = "FILE", default_value = "-")]
    output: Destination,
    /// Compress output with gzip
    #[structopt(short = "z", long = "gzip")]
    compress: bool,
    /// Send text parts as base64 too
    #[structopt(short, long)]
    base64: bool,
    /// MIME type for text that nothing else identifies
    #[structopt(short, long = "default", value_name = "TYPE", default_value = "text/plain")]
    default_type: String,
    /// Separator between a part's file name and its MIME type
    #[structopt(long, default_value = ":")]
    delim: String,
    /// Part files, each optionally followed by its MIME type
    #[structopt(name = "PARTFILE[:MIME/TYPE]", required = true, min_values = 1)]
    parts: Vec<String>,
}

#[derive(StructOpt, Debug)]
struct DecodeArgs {
    /// MIME multipart userdata file
    #[structopt(name = "USERDATA_FILE", parse(from_os_str))]
    file: PathBuf,
}

#[derive(StructOpt, Debug)]
struct GetconfigArgs {
    /// `[[FILE] KEY]`: metadata file instead of the config drive, and the
    /// key to print (default `meta`)
    #[structopt(name = "ARGS", max_values = 2)]
    args: Vec<String>,
}

#[derive(StructOpt, Debug)]
struct GetremoteArgs {
    /// Terraform state file
    #[structopt(long, parse(from_os_str))]
    state: Option<PathBuf>,
}

fn main() {
    let args = match AppArgs::from_iter_safe(std::env::args_os()) {
        Ok(args) => args,
        Err(e) if matches!(e.kind, ErrorKind::HelpDisplayed | ErrorKind::VersionDisplayed) => {
            e.exit()
        }
        Err(e) => {
            eprintln!("{}", e.message);
            process::exit(EXIT_USAGE);
        }
    };

    init_logging(args.verbose);

    let result = match args.cmd {
        Command::WriteMime(args) => write_mime(args),
        Command::Decode(args) => decode(args),
        Command::Getconfig(args) => config_drive::run(&args.args),
        Command::Getremote(args) => terraform::run(args.state),
        Command::InstallPrecommit => precommit::run(),
    };

    match result {
        Ok(code) => process::exit(code),
        Err(err) => {
            eprintln!("cloudutil: {:#}", err);
            process::exit(exit_code(&err));
        }
    }
}

fn init_logging(verbose: u8) {
    let level = match verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    if let Err(e) = SimpleLogger::new().with_level(level).env().init() {
        eprintln!("cloudutil: logging unavailable: {}", e);
    }
}

fn exit_code(err: &anyhow::Error) -> i32 {
    match err.downcast_ref::<userdata_mime::Error>() {
        Some(e) if e.is_decode() => EXIT_DECODE,
        _ => EXIT_FAILURE,
    }
}

fn write_mime(args: WriteMimeArgs) -> anyhow::Result<i32> {
    let resolver = TypeResolver::new(MarkerTable::default(), args.default_type);
    let mut builder = MultipartBuilder::new(boundary_for(std::env::args_os().count()));

    for arg in &args.parts {
        let spec = PartSpec::parse(arg, &args.delim);
        let content_type = spec.content_type(&resolver)?;

        let mut part = PartBuilder::new(spec.path, content_type);
        if args.base64 {
            part = part.encoding(TransferEncoding::Base64);
        }
        builder.part(part.build()?);
    }

    let message = builder.build()?;
    write_message(&message, &args.output, args.compress)?;

    Ok(0)
}

fn decode(args: DecodeArgs) -> anyhow::Result<i32> {
    let file = File::open(&args.file).with_context(|| args.file.display().to_string())?;

    let stdout = io::stdout();
    expand(BufReader::new(file), stdout.lock())?;

    Ok(0)
}
