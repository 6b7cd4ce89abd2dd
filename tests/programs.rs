use color_eyre::eyre::Result;

use ls8::memory::{Byte, StdMem};
use ls8::processor::registers::STACK_TOP;
use ls8::processor::Processor;

fn run(name: &str) -> Result<(Processor, Vec<Byte>)> {
    let path = format!("{}/demos/programs/{}", env!("CARGO_MANIFEST_DIR"), name);
    let mut mem = StdMem::from_file(path)?;
    let mut cpu = Processor::new();
    let mut out = Vec::new();

    cpu.run_until_halt(&mut mem, &mut out)?;

    Ok((cpu, out))
}

#[test]
fn mult() -> Result<()> {
    let (cpu, out) = run("mult.ls8")?;

    assert_eq!(out, vec![72]);
    assert_eq!(cpu.registers.get(0), Some(72));

    Ok(())
}

#[test]
fn call() -> Result<()> {
    let (cpu, out) = run("call.ls8")?;

    assert_eq!(out, vec![20, 30, 36, 60]);
    assert_eq!(cpu.registers.sp(), STACK_TOP);

    Ok(())
}

#[test]
fn stack() -> Result<()> {
    let (cpu, out) = run("stack.ls8")?;

    assert_eq!(out, vec![2, 4, 1]);
    assert_eq!(cpu.registers.sp(), STACK_TOP);

    Ok(())
}

#[test]
fn sctest() -> Result<()> {
    let (_, out) = run("sctest.ls8")?;

    assert_eq!(out, vec![1, 2, 3]);

    Ok(())
}

#[test]
fn missing_program() {
    assert!(StdMem::from_file("demos/programs/missing.ls8").is_err());
}
