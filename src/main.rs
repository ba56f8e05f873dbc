use std::{ffi::OsString, path::PathBuf, process::ExitCode};

use clap::{error::ErrorKind, Parser};
use env_logger::Env;
use log::{debug, LevelFilter};
use thermal_print::{Config, Error, ImageStore, Printer};

//
// thermal-print -i image.png
//
#[derive(Parser, Debug)]
#[command(about = "Print a 1-bit PNG image on the thermal printer")]
struct Options {
    /// Monochrome PNG image to print
    #[arg(short = 'i', value_name = "image.png")]
    image: PathBuf,
}

fn main() -> ExitCode {
    env_logger::Builder::new()
        .filter_level(LevelFilter::Info)
        .format_timestamp(None)
        .parse_env(Env::new().filter("THERMAL_PRINT_LOG"))
        .init();

    let result = parse_args(std::env::args_os()).and_then(|options| run(&options));
    match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(Error::BadArguments(usage)) => {
            eprint!("{}", usage);
            ExitCode::FAILURE
        }
        Err(err) => {
            eprintln!("ERROR: {}", err);
            if let Some(source) = std::error::Error::source(&err) {
                eprintln!("  caused by: {}", source);
            }
            ExitCode::FAILURE
        }
    }
}

fn parse_args<I, T>(args: I) -> Result<Options, Error>
where
    I: IntoIterator<Item = T>,
    T: Into<OsString> + Clone,
{
    Options::try_parse_from(args).map_err(|err| match err.kind() {
        ErrorKind::DisplayHelp | ErrorKind::DisplayVersion => err.exit(),
        _ => Error::BadArguments(err.to_string()),
    })
}

fn run(options: &Options) -> Result<(), Error> {
    debug!("{:?}", options);
    println!("Printing image: {}", options.image.display());

    let mut store = ImageStore::new();
    let bitmap = store.load(&options.image)?;

    let mut printer = Printer::new(Config::from_env())?;
    printer.print(bitmap)?;
    println!("Image printed");

    store.release();
    Ok(())
}
