use color_eyre::eyre::Result;

use ls8::memory::StdMem;
use ls8::output::Console;
use ls8::processor::Processor;
use log::LevelFilter;
use simple_logger::SimpleLogger;

fn main() -> Result<()> {
    color_eyre::install()?; // rust error handling
    SimpleLogger::new()
        .with_level(LevelFilter::Debug)
        .init()
        .unwrap(); // logging

    let mut mem = StdMem::from_file("demos/programs/sctest.ls8")?;
    mem.dump();
    let mut cpu = Processor::new();

    cpu.run_until_halt(&mut mem, &mut Console)?;

    Ok(())
}
