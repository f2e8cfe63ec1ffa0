//TODO: update clap to remove the need for this
#![allow(dangerous_implicit_autorefs)]

use clap::{crate_authors, crate_description, crate_name, crate_version, App, AppSettings, Arg, SubCommand};
use flatimg::{list, pack, pack_dir, unpack, TracingReporter};
use tracing_subscriber::EnvFilter;

fn init_logging(default_level: &str) {
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

fn main() -> anyhow::Result<()> {
    let arg_image = Arg::with_name("image")
        .help("Image file")
        .required(true)
        .value_name("IMAGE");

    let matches = App::new(crate_name!())
        .author(crate_authors!(", "))
        .about(crate_description!())
        .version(crate_version!())
        .setting(AppSettings::SubcommandRequiredElseHelp)
        .arg(
            Arg::with_name("verbose")
                .help("Log every step")
                .short("v")
                .long("verbose")
                .conflicts_with("quiet"),
        )
        .arg(
            Arg::with_name("quiet")
                .help("Only log warnings and errors")
                .short("q")
                .long("quiet"),
        )
        .subcommand(
            SubCommand::with_name("pack")
                .about("Pack files into an image")
                .arg(
                    Arg::with_name("dir")
                        .help("Pack every regular file in this directory instead")
                        .short("d")
                        .long("dir")
                        .takes_value(true)
                        .value_name("DIR")
                        .conflicts_with("inputs"),
                )
                .arg(&arg_image)
                .arg(
                    Arg::with_name("inputs")
                        .help("Files to pack, in order (1 to 255)")
                        .multiple(true)
                        .required_unless("dir")
                        .value_name("FILE"),
                ),
        )
        .subcommand(
            SubCommand::with_name("unpack")
                .about("Unpack an image into a directory")
                .arg(&arg_image)
                .arg(
                    Arg::with_name("outdir")
                        .help("Directory to unpack to (created if missing)")
                        .required(true)
                        .value_name("DIR"),
                ),
        )
        .subcommand(
            SubCommand::with_name("list")
                .about("List the entries of an image")
                .arg(&arg_image),
        )
        .get_matches();

    init_logging(if matches.is_present("verbose") {
        "debug"
    } else if matches.is_present("quiet") {
        "warn"
    } else {
        "info"
    });

    let mut reporter = TracingReporter;

    if let Some(matches) = matches.subcommand_matches("pack") {
        let image = matches.value_of("image").unwrap();
        if let Some(dir) = matches.value_of("dir") {
            pack_dir(image, dir, &mut reporter)?;
        } else {
            pack(image, matches.values_of("inputs").unwrap(), &mut reporter)?;
        }
    } else if let Some(matches) = matches.subcommand_matches("unpack") {
        unpack(
            matches.value_of("image").unwrap(),
            matches.value_of("outdir").unwrap(),
            &mut reporter,
        )?;
    } else if let Some(matches) = matches.subcommand_matches("list") {
        for entry in list(matches.value_of("image").unwrap())? {
            println!("{:>3} {:>12} {}", entry.index, entry.size, entry.name);
        }
    }

    Ok(())
}
