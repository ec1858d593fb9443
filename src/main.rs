use anyhow::{self, format_err};
use clap::Parser;
use log::LevelFilter;
use log4rs::append::console::{ConsoleAppender, Target};
use log4rs::append::file::FileAppender;
use log4rs::config::{Appender, Config, Logger, Root};
use log4rs::encode::pattern::PatternEncoder;

use qangmom::interfaces::cli::{log_heading, Cli};
use qangmom::interfaces::input::Input;
use qangmom::interfaces::InputHandle;
use qangmom::io::read_qangmom_yaml;

const OUTPUT_LOGGER: &str = "qangmom-output";

/// Configures `log4rs` so that the main output goes to standard output (and optionally to a
/// file) while diagnostics go to standard error.
fn init_logging(cli: &Cli) -> Result<(), anyhow::Error> {
    let root_level = match cli.verbose {
        0 => LevelFilter::Warn,
        1 => LevelFilter::Info,
        2 => LevelFilter::Debug,
        _ => LevelFilter::Trace,
    };

    let stdout = ConsoleAppender::builder()
        .encoder(Box::new(PatternEncoder::new("{m}{n}")))
        .build();
    let stderr = ConsoleAppender::builder()
        .target(Target::Stderr)
        .encoder(Box::new(PatternEncoder::new("[{l}] {t} - {m}{n}")))
        .build();

    let mut builder = Config::builder()
        .appender(Appender::builder().build("stdout", Box::new(stdout)))
        .appender(Appender::builder().build("stderr", Box::new(stderr)));
    let mut output_logger = Logger::builder().appender("stdout");
    if let Some(output) = cli.output.as_ref() {
        let file = FileAppender::builder()
            .append(false)
            .encoder(Box::new(PatternEncoder::new("{m}{n}")))
            .build(output)
            .map_err(|err| format_err!("Unable to open `{}`: {err}", output.display()))?;
        builder = builder.appender(Appender::builder().build("output", Box::new(file)));
        output_logger = output_logger.appender("output");
    }

    let config = builder
        .logger(
            output_logger
                .additive(false)
                .build(OUTPUT_LOGGER, LevelFilter::Info),
        )
        .build(Root::builder().appender("stderr").build(root_level))?;
    log4rs::init_config(config)?;
    Ok(())
}

fn main() -> Result<(), anyhow::Error> {
    let cli = Cli::parse();
    init_logging(&cli)?;
    log_heading();

    let input = read_qangmom_yaml::<Input, _>(&cli.config)?;
    input.handle().map_err(|err| {
        log::error!("{err}");
        err
    })
}
