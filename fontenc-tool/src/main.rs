use std::error::Error as _;
use std::path::PathBuf;

use async_std::task;
use clap::Parser;
use fontenc_tool::{BuildOptions, Error};

#[derive(clap::Parser, Debug)]
#[command(about = "Relates the encoding vectors of TeX fonts to Unicode")]
struct Args {
    /// Log debug output (overridden by RUST_LOG)
    #[arg(long, short, global = true)]
    verbose: bool,
    #[command(subcommand)]
    command: Command,
}

#[derive(clap::Subcommand, Debug)]
enum Command {
    /// Print the glyph names of every encoding of an encoding file as JSON
    Dump {
        /// The encoding file, e.g. dvips-all.enc
        encoding: PathBuf,
    },
    /// Build the codepoint to Unicode tables of all fonts with an encoding
    Build {
        /// The encoding file, e.g. dvips-all.enc
        #[arg(long)]
        encoding: PathBuf,
        /// Directory containing the extracted OpenType fonts
        #[arg(long)]
        fonts: PathBuf,
        /// Directory of additional fonts, replacing fonts of the same name
        #[arg(long)]
        overrides: Option<PathBuf>,
        /// Where to write the codepoint tables
        #[arg(long)]
        encodings_out: PathBuf,
        /// Where to write the list of processed fonts
        #[arg(long)]
        font_list_out: PathBuf,
    },
}

async fn run(command: Command) -> Result<(), Error> {
    match command {
        Command::Dump { encoding } => {
            println!("{}", fontenc_tool::dump(&encoding).await?);
        }
        Command::Build {
            encoding,
            fonts,
            overrides,
            encodings_out,
            font_list_out,
        } => {
            let opts = BuildOptions {
                encoding,
                fonts,
                overrides,
            };
            let tables = fontenc_tool::build(&opts).await?;
            fontenc_tool::write_json(&encodings_out, &tables).await?;
            fontenc_tool::write_json(&font_list_out, tables.font_names()).await?;
        }
    }
    Ok(())
}

fn main() {
    let args = Args::parse();

    let default_filter = if args.verbose { "debug" } else { "info" };
    env_logger::init_from_env(env_logger::Env::new().default_filter_or(default_filter));

    if let Err(err) = task::block_on(run(args.command)) {
        log::error!("{}", err);
        let mut source = err.source();
        while let Some(cause) = source {
            log::error!("  caused by: {}", cause);
            source = cause.source();
        }
        std::process::exit(1);
    }
}
