use std::env;
use std::process;
use std::time::Duration;

use color_eyre::eyre::{eyre, Result, WrapErr};
use getopts::Options;
use log::LevelFilter;
use simple_logger::SimpleLogger;

use ls8::memory::StdMem;
use ls8::output::Console;
use ls8::processor::Processor;

const EXIT_SUCCESS: i32 = 0;
const EXIT_FAILURE: i32 = 1;

/// Settings taken from the command line
struct Config {
    program: String,
    clock: Option<Duration>,
    dump: bool,
    level: LevelFilter,
}

fn usage(opts: &Options, name: &str) -> String {
    opts.usage(&format!("Usage: {} [options] PROGRAM", name))
}

/// Parses the command line. Returns `None` when only the usage was requested.
fn parse_args(args: &[String]) -> Result<Option<Config>> {
    let name = args.first().map(String::as_str).unwrap_or("ls8");

    let mut opts = Options::new();
    opts.optopt("c", "clock", "execute one instruction every MS milliseconds", "MS");
    opts.optflag("d", "dump", "log a memory dump after loading and after halting");
    opts.optflag("v", "verbose", "log every executed instruction");
    opts.optflag("q", "quiet", "only log warnings and errors");
    opts.optflag("h", "help", "print this help menu");

    let matches = opts
        .parse(args.iter().skip(1))
        .map_err(|err| eyre!("{}\n{}", err, usage(&opts, name)))?;

    if matches.opt_present("h") {
        print!("{}", usage(&opts, name));
        return Ok(None);
    }

    let program = match matches.free.as_slice() {
        [program] => program.clone(),
        _ => return Err(eyre!("expected exactly one program\n{}", usage(&opts, name))),
    };

    let clock = matches
        .opt_str("c")
        .map(|ms| ms.parse::<u64>().map(Duration::from_millis))
        .transpose()
        .wrap_err("--clock expects a number of milliseconds")?;

    let dump = matches.opt_present("d");
    let level = if matches.opt_present("v") {
        LevelFilter::Debug
    } else if matches.opt_present("q") && !dump {
        LevelFilter::Warn
    } else {
        // memory dumps are logged at info
        LevelFilter::Info
    };

    Ok(Some(Config {
        program,
        clock,
        dump,
        level,
    }))
}

fn run(config: Config) -> Result<()> {
    let mut mem = StdMem::from_file(&config.program)?;
    if config.dump {
        mem.dump();
    }

    let mut cpu = Processor::new();
    let mut console = Console;
    let result = match config.clock {
        Some(period) => cpu.run_with_clock(&mut mem, &mut console, period),
        None => cpu.run_until_halt(&mut mem, &mut console),
    };

    if config.dump {
        log::info!("{}", cpu.trace());
        mem.dump();
    }

    result
        .map(|_| ())
        .wrap_err_with(|| format!("Execution of `{}` failed ({})", config.program, cpu.trace()))
}

fn init() -> Result<i32> {
    color_eyre::install()?; // rust error handling

    let args = env::args().collect::<Vec<_>>();
    let config = match parse_args(&args)? {
        Some(config) => config,
        None => return Ok(EXIT_SUCCESS),
    };

    SimpleLogger::new()
        .with_level(config.level)
        .init()
        .map_err(|err| eyre!("{}", err))?; // logging

    if let Err(err) = run(config) {
        log::error!("{:?}", err);
        return Ok(EXIT_FAILURE);
    }

    Ok(EXIT_SUCCESS)
}

fn main() {
    let exit_code = match init() {
        Ok(code) => code,
        Err(err) => {
            // the logger is not installed yet
            eprintln!("{:?}", err);
            EXIT_FAILURE
        }
    };
    process::exit(exit_code);
}

#[cfg(test)]
mod tests {
    use super::*;

    fn args(list: &[&str]) -> Vec<String> {
        list.iter().map(|arg| arg.to_string()).collect()
    }

    #[test]
    fn test_parse_defaults() -> Result<()> {
        let config = parse_args(&args(&["ls8", "mult.ls8"]))?.expect("config");

        assert_eq!(config.program, "mult.ls8");
        assert_eq!(config.clock, None);
        assert!(!config.dump);
        assert_eq!(config.level, LevelFilter::Info);

        Ok(())
    }

    #[test]
    fn test_parse_options() -> Result<()> {
        let config = parse_args(&args(&["ls8", "-c", "5", "--dump", "-v", "call.ls8"]))?
            .expect("config");

        assert_eq!(config.program, "call.ls8");
        assert_eq!(config.clock, Some(Duration::from_millis(5)));
        assert!(config.dump);
        assert_eq!(config.level, LevelFilter::Debug);

        Ok(())
    }

    #[test]
    fn test_dump_is_visible() -> Result<()> {
        for list in &[&["ls8", "-d", "a"][..], &["ls8", "-d", "-q", "a"][..]] {
            let config = parse_args(&args(list))?.expect("config");

            assert!(config.dump);
            assert!(config.level >= LevelFilter::Info);
        }

        Ok(())
    }

    #[test]
    fn test_parse_errors() {
        assert!(parse_args(&args(&["ls8"])).is_err());
        assert!(parse_args(&args(&["ls8", "a", "b"])).is_err());
        assert!(parse_args(&args(&["ls8", "-c", "fast", "a"])).is_err());
        assert!(parse_args(&args(&["ls8", "-h"])).map(|c| c.is_none()).unwrap_or(false));
    }
}
