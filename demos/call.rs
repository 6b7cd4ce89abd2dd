use std::time::Duration;

use color_eyre::eyre::Result;

use ls8::memory::StdMem;
use ls8::output::Console;
use ls8::processor::Processor;
use log::LevelFilter;
use simple_logger::SimpleLogger;

/// Runs a program calling a subroutine, ticking once every 10 ms
fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Debug)
        .init()
        .unwrap(); // logging

    let mut mem = StdMem::from_file("demos/programs/call.ls8")?;
    let mut cpu = Processor::new();

    cpu.run_with_clock(&mut mem, &mut Console, Duration::from_millis(10))?;

    Ok(())
}
