#![forbid(unsafe_code)]
use std::io::{self, BufRead, Write};
use std::path::PathBuf;
use std::{env, ffi, fs, process};

use lzkit::codec::{self, Format};
use lzkit::Registry;

fn main() -> CodingResult {
    CodingResult::catch_panic(|| {
        let flags = Flags::from_args(env::args_os()).unwrap_or_else(|ParamError(msg)| explain(&msg));
        run_coding(flags)
    })
}

fn run_coding(flags: Flags) -> lzkit::Result<()> {
    let registry = Registry::default();

    let mut input: Box<dyn BufRead> = match flags.input {
        Stream::File(path) => Box::new(io::BufReader::with_capacity(1 << 16, fs::File::open(path)?)),
        Stream::Std => Box::new(io::BufReader::with_capacity(1 << 16, io::stdin())),
    };
    let mut output: Box<dyn Write> = match flags.output {
        Stream::File(path) => Box::new(io::BufWriter::new(fs::File::create(path)?)),
        Stream::Std => Box::new(io::BufWriter::new(io::stdout())),
    };

    match flags.operation {
        Operation::Compress => {
            let name = flags.algorithm.as_deref().unwrap_or("lz77");
            let algorithm = registry.get(name)?;
            let mut writer = flags.format.writer(&mut output);
            algorithm.compress(&mut input, &mut *writer)?;
        }
        Operation::Decompress => {
            let mut reader = codec::open(input)?;
            // An explicit algorithm must agree with the stream's own tag.
            let algorithm = match &flags.algorithm {
                Some(name) => registry.get(name)?,
                None => registry.for_reader(&*reader)?,
            };
            algorithm.decompress(&mut *reader, &mut output)?;
        }
    }

    output.flush()?;
    Ok(())
}

struct Flags {
    input: Stream,
    output: Stream,
    operation: Operation,
    algorithm: Option<String>,
    format: Format,
}

struct ParamError(String);

#[derive(Debug)]
enum Stream {
    File(PathBuf),
    Std,
}

#[derive(Debug)]
enum Operation {
    Compress,
    Decompress,
}

fn explain<T>(msg: &str) -> T {
    eprintln!("{}", msg);
    eprintln!(
        "Usage: lzkit [-c|-d] [-a <algorithm>] [-f <format>] [<input>] [<output>]\n\
        Arguments:\n\
        -c\t operation compress (default)\n\
        -d\t operation decompress\n\
        -a\t algorithm, one of: {}\n\
        -f\t wire format for compression, xml (default) or packed\n\
        <input>\tfilepath or '-' for stdin\n\
        <output>\tfilepath or '-' for stdout",
        Registry::default().names().collect::<Vec<_>>().join(", ")
    );
    process::exit(1);
}

impl Default for Flags {
    fn default() -> Flags {
        Flags {
            input: Stream::Std,
            output: Stream::Std,
            operation: Operation::Compress,
            algorithm: None,
            format: Format::Xml,
        }
    }
}

fn command() -> clap::Command<'static> {
    clap::Command::new("lzkit")
        .version(env!("CARGO_PKG_VERSION"))
        .about("Compress and decompress data into LZ77 or LZW symbol streams")
        .arg(
            clap::Arg::new("compress")
                .short('c')
                .long("compress")
                .takes_value(false),
        )
        .arg(
            clap::Arg::new("decompress")
                .short('d')
                .long("decompress")
                .takes_value(false),
        )
        .group(
            clap::ArgGroup::new("operation")
                .args(&["compress", "decompress"])
                .multiple(false),
        )
        .arg(
            clap::Arg::new("algorithm")
                .short('a')
                .long("algorithm")
                .takes_value(true),
        )
        .arg(
            clap::Arg::new("format")
                .short('f')
                .long("format")
                .takes_value(true)
                .default_value("xml")
                .value_parser(["xml", "packed"]),
        )
        .arg(
            clap::Arg::new("input")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
        .arg(
            clap::Arg::new("output")
                .default_value("-")
                .value_parser(clap::builder::ValueParser::path_buf()),
        )
}

impl Flags {
    fn from_args(mut args: impl Iterator<Item = ffi::OsString>) -> Result<Self, ParamError> {
        let mut flags = Flags::default();
        let matches = command().get_matches_from(args.by_ref());

        if matches.contains_id("decompress") {
            flags.operation = Operation::Decompress;
        }

        if let Some(name) = matches.get_one::<String>("algorithm") {
            if Registry::default().get(name).is_err() {
                return Err(ParamError(format!("unknown algorithm {:?}", name)));
            }
            flags.algorithm = Some(name.clone());
        }

        if let Some(name) = matches.get_one::<String>("format") {
            flags.format = Format::from_name(name)
                .ok_or_else(|| ParamError(format!("unknown format {:?}", name)))?;
        }

        flags.input = stream(matches.get_one::<PathBuf>("input"));
        flags.output = stream(matches.get_one::<PathBuf>("output"));
        Ok(flags)
    }
}

fn stream(path: Option<&PathBuf>) -> Stream {
    match path {
        Some(p) if *p != PathBuf::from("-") => Stream::File(p.clone()),
        _ => Stream::Std,
    }
}

enum CodingResult {
    Ok,
    Err(lzkit::Error),
    Panic,
}

impl CodingResult {
    fn catch_panic(op: fn() -> lzkit::Result<()>) -> Self {
        std::panic::catch_unwind(|| match op() {
            Ok(()) => CodingResult::Ok,
            Err(err) => CodingResult::Err(err),
        })
        .unwrap_or(CodingResult::Panic)
    }
}

impl std::process::Termination for CodingResult {
    fn report(self) -> std::process::ExitCode {
        match self {
            CodingResult::Ok => std::process::ExitCode::SUCCESS,
            CodingResult::Err(err) => {
                eprintln!("lzkit: {}", err);
                std::process::ExitCode::FAILURE
            }
            CodingResult::Panic => {
                eprintln!(
                    "The process failed irrecoverably! This should never happen and is a bug."
                );
                std::process::ExitCode::from(128)
            }
        }
    }
}
