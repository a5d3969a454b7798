//! Command-line front end: denoise one PGM image.
//!
//! Usage: tvdenoise INPUT.pgm OUTPUT.pgm [--alpha A] [--tau T] [--iterations N]

use std::env;
use std::process::ExitCode;

use tv_denoise::{analyse, read_pgm_file, tv_denoise, write_pgm_file, TvConfig};

#[derive(Debug)]
struct Args {
    input: String,
    output: String,
    config: TvConfig<f32>,
}

/// What the command line asked for: run the filter, or just print usage.
#[derive(Debug)]
enum Command {
    Run(Args),
    Help,
}

fn print_usage() {
    eprintln!("usage: tvdenoise INPUT.pgm OUTPUT.pgm [--alpha A] [--tau T] [--iterations N]");
    eprintln!();
    eprintln!("  --alpha A       regularisation weight, > 0 (default 1.0)");
    eprintln!("  --tau T         step size, > 0; tau <= 0.125 guarantees convergence");
    eprintln!("                  (default 0.125)");
    eprintln!("  --iterations N  number of iterations, >= 0 (default 100)");
}

fn parse_args<I: Iterator<Item = String>>(mut argv: I) -> Result<Command, String> {
    argv.next(); // program name
    let mut positional = Vec::new();
    let mut config = TvConfig::<f32>::default();

    while let Some(arg) = argv.next() {
        match arg.as_str() {
            "--alpha" | "--tau" | "--iterations" => {
                let value = argv
                    .next()
                    .ok_or_else(|| format!("{} requires a value", arg))?;
                match arg.as_str() {
                    "--alpha" => {
                        config.alpha = value
                            .parse()
                            .map_err(|_| format!("invalid --alpha value '{}'", value))?;
                    }
                    "--tau" => {
                        config.tau = value
                            .parse()
                            .map_err(|_| format!("invalid --tau value '{}'", value))?;
                    }
                    _ => {
                        config.iterations = value
                            .parse()
                            .map_err(|_| format!("invalid --iterations value '{}'", value))?;
                    }
                }
            }
            "--help" | "-h" => return Ok(Command::Help),
            flag if flag.starts_with("--") => return Err(format!("unknown option '{}'", flag)),
            _ => positional.push(arg),
        }
    }

    if positional.len() != 2 {
        return Err("expected exactly two paths: INPUT.pgm OUTPUT.pgm".to_string());
    }
    let output = positional.pop().unwrap();
    let input = positional.pop().unwrap();
    Ok(Command::Run(Args {
        input,
        output,
        config,
    }))
}

fn run(args: &Args) -> Result<(), Box<dyn std::error::Error>> {
    let mut image = read_pgm_file(&args.input)?;

    tv_denoise(&mut image, &args.config)?;

    let stats = analyse(&image);
    println!("filtered image:");
    println!("minimum:       {:8.2}", stats.min);
    println!("maximum:       {:8.2}", stats.max);
    println!("mean:          {:8.2}", stats.mean);
    println!("standard dev.: {:8.2}", stats.std);

    let metadata = [
        ("filter", "TV regularisation with FISTA".to_string()),
        ("alpha", format!("{:.4}", args.config.alpha)),
        ("tau", format!("{:.4}", args.config.tau)),
        ("iterations", format!("{}", args.config.iterations)),
        ("min", format!("{:.4}", stats.min)),
        ("max", format!("{:.4}", stats.max)),
        ("mean", format!("{:.4}", stats.mean)),
        ("standard dev.", format!("{:.4}", stats.std)),
    ];
    write_pgm_file(&args.output, &image, &metadata)?;
    println!("output image {} successfully written", args.output);

    Ok(())
}

fn main() -> ExitCode {
    let args = match parse_args(env::args()) {
        Ok(Command::Run(args)) => args,
        Ok(Command::Help) => {
            print_usage();
            return ExitCode::SUCCESS;
        }
        Err(message) => {
            eprintln!("error: {}", message);
            eprintln!();
            print_usage();
            return ExitCode::FAILURE;
        }
    };

    match run(&args) {
        Ok(()) => ExitCode::SUCCESS,
        Err(err) => {
            eprintln!("error: {}", err);
            ExitCode::FAILURE
        }
    }
}
