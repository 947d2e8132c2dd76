use std::env;
use std::fs::File;
use std::io::{BufReader, BufWriter, Read, Write};
use std::path::Path;
use std::process;

use getopts::Options;
use mktemp::Temp;
use ring::digest;
use tracing::Level;

use ppmac::{Config, Decoder, Encoder, Error};

fn do_compress(input: &Path, output: &Path, config: Config, stats: bool) -> Result<(), Error> {
    let inf = File::open(input)?;
    let outf = File::create(output)?;

    let enc = Encoder::new(config)?;
    let (out, st) = enc.compress_with_stats(BufReader::new(inf), BufWriter::new(outf))?;
    drop(out);

    if stats {
        let in_size = File::open(input)?.metadata()?.len();
        let out_size = File::open(output)?.metadata()?.len();
        println!("Original size: {}", in_size);
        println!("Compressed size: {}", out_size);
        if in_size > 0 {
            println!("Ratio: {:.2}", out_size as f32 / in_size as f32);
        }
        println!("Symbols: {}", st.symbols);
        println!("Escapes: {}", st.escapes);
        println!("Contexts: {}", st.contexts);
    }
    Ok(())
}

fn do_decompress(input: &Path, output: &Path, config: Config) -> Result<(), Error> {
    let inf = File::open(input)?;
    let outf = File::create(output)?;

    let dec = Decoder::new(config)?;
    let mut out = dec.decompress(BufReader::new(inf), BufWriter::new(outf))?;
    out.flush()?;
    Ok(())
}

fn file_hash(path: &Path) -> Result<digest::Digest, Error> {
    let mut buf = [0u8; 1024 * 4];
    let mut ctx = digest::Context::new(&digest::SHA256);
    let mut inf = File::open(path)?;
    let mut nread = inf.read(&mut buf[..])?;
    while nread > 0 {
        ctx.update(&buf[0..nread]);
        nread = inf.read(&mut buf[..])?;
    }
    Ok(ctx.finish())
}

/// Compress `input` into a temporary directory, decompress it again
/// and compare the result with the original.  Returns whether the
/// round trip succeeded.
fn do_test(input: &Path, config: Config) -> Result<bool, Error> {
    let temp_dir = Temp::new_dir()?;
    let compressed_name = temp_dir.to_path_buf().join("ppmac-test.compressed");
    let decompressed_name = temp_dir.to_path_buf().join("ppmac-test.decompressed");

    println!("Calculating hash for input file {}...", input.display());
    let orig_hash = file_hash(input)?;

    println!("Compressing {} to {} (order {})...", input.display(), compressed_name.display(), config.order);
    do_compress(input, &compressed_name, config, false)?;

    println!("Decompressing {} to {}...", compressed_name.display(), decompressed_name.display());
    do_decompress(&compressed_name, &decompressed_name, config)?;

    println!("Calculating hash for decompressed file {}...", decompressed_name.display());
    let decompressed_hash = file_hash(&decompressed_name)?;

    let orig_size = File::open(input)?.metadata()?.len();
    let compressed_size = File::open(&compressed_name)?.metadata()?.len();
    let decompressed_size = File::open(&decompressed_name)?.metadata()?.len();
    println!("Original size: {}", orig_size);
    println!("Compressed size: {}", compressed_size);
    if orig_size > 0 {
        println!("Ratio: {:.2}", compressed_size as f32 / orig_size as f32);
    }

    if orig_size != decompressed_size {
        println!("ERROR: original and decompressed file differ in size");
        Ok(false)
    } else if orig_hash.as_ref() != decompressed_hash.as_ref() {
        println!("ERROR: original and decompressed file hashes differ");
        Ok(false)
    } else {
        println!("OK.");
        Ok(true)
    }
}

/// Print a usage summary to stdout that describes the command syntax.
fn print_usage(program: &str, opts: &Options) {
    let brief = format!("Usage: {} [-c|-d] -i FILE -o FILE\n       {} -t -i FILE", program, program);
    print!("{}", opts.usage(&brief));
}

fn fail(msg: &str) -> ! {
    eprintln!("Error: {}", msg);
    process::exit(1);
}

pub fn main() {
    let args: Vec<String> = env::args().collect();
    let program = args[0].clone();

    let mut opts = Options::new();
    opts.optopt("i", "input", "set input file", "FILE");
    opts.optopt("o", "output", "set output file", "FILE");
    opts.optflag("c", "compress", "compress the input file");
    opts.optflag("d", "decompress", "decompress the input file");
    opts.optflag("t", "test", "test compressor on a file");
    opts.optopt("k", "order", "set context order (-1 to 16, default 3)", "N");
    opts.optopt("p", "precision", "set coder precision (11 to 62, default 32)", "BITS");
    opts.optflag("s", "stats", "print statistics");
    opts.optflag("v", "verbose", "print debug log");
    opts.optflag("h", "help", "print this help");

    let matches = match opts.parse(&args[1..]) {
        Ok(m) => m,
        Err(e) => {
            println!("Error: {}", e);
            print_usage(&program, &opts);
            process::exit(2);
        }
    };
    if matches.opt_present("h") {
        print_usage(&program, &opts);
        return;
    }

    let level = if matches.opt_present("v") { Level::DEBUG } else { Level::WARN };
    tracing_subscriber::fmt()
        .with_max_level(level)
        .with_writer(std::io::stderr)
        .init();

    let mut config = Config::default();
    if let Some(s) = matches.opt_str("k") {
        config.order = s.parse().unwrap_or_else(|_| fail(&format!("invalid order: {}", s)));
    }
    if let Some(s) = matches.opt_str("p") {
        config.precision = s.parse().unwrap_or_else(|_| fail(&format!("invalid precision: {}", s)));
    }
    if let Err(e) = config.validate() {
        fail(&e.to_string());
    }

    let result = if matches.opt_present("t") {
        match matches.opt_str("i") {
            Some(input) => match do_test(Path::new(&input), config) {
                Ok(true) => Ok(()),
                Ok(false) => process::exit(1),
                Err(e) => Err(e),
            },
            None => {
                print_usage(&program, &opts);
                process::exit(2);
            }
        }
    } else {
        match (matches.opt_str("i"), matches.opt_str("o")) {
            (Some(input), Some(output)) => {
                let (input, output) = (Path::new(&input), Path::new(&output));
                match (matches.opt_present("c"), matches.opt_present("d")) {
                    (true, false) => do_compress(input, output, config, matches.opt_present("s")),
                    (false, true) => do_decompress(input, output, config),
                    _ => {
                        println!("must specify either -c or -d");
                        print_usage(&program, &opts);
                        process::exit(2);
                    }
                }
            }
            _ => {
                print_usage(&program, &opts);
                process::exit(2);
            }
        }
    };

    if let Err(e) = result {
        fail(&e.to_string());
    }
}
