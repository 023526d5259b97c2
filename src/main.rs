use clap::{arg, crate_version, Command};
use deflate_rs::{compress, decompress, STD_OPTIONS};

const RCH: &str = "unreachable was reached";

fn main() -> Result<(), Box<dyn std::error::Error>> {
    env_logger::init();

    let long_help = "Examples:
---------
Compress:      `deflate-rs compress -i my_file -o my_file.dfl`
Expand:        `deflate-rs expand -i my_file.dfl -o my_file`";

    let mut main_cmd = Command::new("deflate-rs")
        .about("Compress and expand DEFLATE-style bitstreams")
        .after_long_help(long_help)
        .version(crate_version!());

    main_cmd = main_cmd.subcommand(
        Command::new("compress")
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true))
            .about("compress a file"),
    );

    main_cmd = main_cmd.subcommand(
        Command::new("expand")
            .arg(arg!(-i --input <PATH> "input path").required(true))
            .arg(arg!(-o --output <PATH> "output path").required(true))
            .about("expand a file"),
    );

    let matches = main_cmd.get_matches();

    if let Some(cmd) = matches.subcommand_matches("compress") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        log::debug!("reading {path_in}");
        let dat = std::fs::read(path_in)?;
        let packed = compress(&dat, &STD_OPTIONS)?;
        log::info!("compressed {} bytes into {} bytes", dat.len(), packed.len());
        std::fs::write(path_out, packed)?;
    }

    if let Some(cmd) = matches.subcommand_matches("expand") {
        let path_in = cmd.get_one::<String>("input").expect(RCH);
        let path_out = cmd.get_one::<String>("output").expect(RCH);
        log::debug!("reading {path_in}");
        let dat = std::fs::read(path_in)?;
        let unpacked = decompress(&dat)?;
        log::info!("expanded {} bytes into {} bytes", dat.len(), unpacked.len());
        std::fs::write(path_out, unpacked)?;
    }

    Ok(())
}
