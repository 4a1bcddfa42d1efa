//! Disassembler for `.ksc` script resources.
//!
//! Prints one instruction per line as `offset  mnemonic operands`. Branches
//! show their raw skip words and trailing jump byte (`w1 w2 j`); native calls
//! resolve the function name from the standard table and dump the operand
//! bytes. The listing stops with an error at the first byte that does not
//! decode, which in shipped content means the offset is data, not code.

use std::path::PathBuf;

use anyhow::{bail, Result};
use byteorder::{ByteOrder, LittleEndian};
use clap::Parser;

use karst_script::{Opcode, Operands, STANDARD_NAMES};

struct Disassembler {
    bytes: Vec<u8>,
    pos: usize,
    /// Offset of the instruction currently being decoded, for errors.
    instr: usize,
}

impl Disassembler {
    fn new(bytes: Vec<u8>, start: usize) -> Self {
        Self { bytes, pos: start, instr: start }
    }

    fn lines(&mut self) -> Result<Vec<String>> {
        let mut out = Vec::new();
        while self.pos < self.bytes.len() {
            out.push(self.one()?);
        }
        Ok(out)
    }

    fn one(&mut self) -> Result<String> {
        let offset = self.pos;
        self.instr = offset;
        let byte = self.u8()?;
        let Some(op) = Opcode::decode(byte) else {
            bail!("undecodable byte 0x{byte:02X} at offset 0x{offset:04X}");
        };

        let text = match op.operands() {
            Operands::None => op.mnemonic().to_string(),
            Operands::Imm16 => {
                let v = self.i16()?;
                format!("{} {v}", op.mnemonic())
            }
            Operands::LocalOff => {
                let off = self.i16()?;
                format!("{} {off}", op.mnemonic())
            }
            Operands::AluLocal => {
                let sub = self.u8()?;
                let off = self.i16()?;
                let name = match sub {
                    0 => "add".to_string(),
                    1 => "sub".to_string(),
                    2 => "mul".to_string(),
                    3 => "div".to_string(),
                    other => format!("op{other}"),
                };
                format!("{} {name} {off}", op.mnemonic())
            }
            Operands::StepLocal => {
                let delta = self.i8()?;
                let off = self.i16()?;
                format!("{} {delta} {off}", op.mnemonic())
            }
            Operands::CmpArm => {
                let src = self.u8()?;
                if src == 0 {
                    let imm = self.i16()?;
                    format!("{} #{imm}", op.mnemonic())
                } else {
                    format!("{} a", op.mnemonic())
                }
            }
            Operands::Branch => {
                let w1 = self.u16()?;
                let w2 = self.u16()?;
                let j = self.i8()?;
                format!("{} {w1} {w2} {j}", op.mnemonic())
            }
            Operands::JumpRel => {
                let j = self.i8()?;
                format!("{} {j}", op.mnemonic())
            }
            Operands::CallOff => {
                let target = self.u16()?;
                format!("{} 0x{target:04X}", op.mnemonic())
            }
            Operands::Native => self.native(offset)?,
        };

        Ok(format!("{offset:04X}  {text}"))
    }

    fn native(&mut self, offset: usize) -> Result<String> {
        let len = self.u8()? as usize;
        let index = self.u16()?;
        let name = STANDARD_NAMES
            .get(index as usize)
            .copied()
            .unwrap_or("?");
        if len < 2 {
            bail!("native call at 0x{offset:04X} shorter than its own function id");
        }
        let args = self.take(len - 2)?;
        let mut text = format!("native {name}");
        if !args.is_empty() {
            let hex: Vec<String> = args.iter().map(|b| format!("{b:02X}")).collect();
            text.push_str(&format!(" [{}]", hex.join(" ")));
        }
        Ok(text)
    }

    fn take(&mut self, n: usize) -> Result<Vec<u8>> {
        if self.pos + n > self.bytes.len() {
            bail!(
                "instruction at 0x{:04X} runs past the end of the file",
                self.instr
            );
        }
        let s = self.bytes[self.pos..self.pos + n].to_vec();
        self.pos += n;
        Ok(s)
    }

    fn u8(&mut self) -> Result<u8> {
        Ok(self.take(1)?[0])
    }

    fn i8(&mut self) -> Result<i8> {
        self.u8().map(|b| b as i8)
    }

    fn u16(&mut self) -> Result<u16> {
        self.take(2).map(|b| LittleEndian::read_u16(&b))
    }

    fn i16(&mut self) -> Result<i16> {
        self.u16().map(|v| v as i16)
    }
}

#[derive(Parser, Debug)]
#[command(version, about = "karst script disassembler", long_about = None)]
struct Args {
    /// The `.ksc` file to disassemble.
    input: PathBuf,

    /// Offset to start decoding at.
    #[arg(short, long, default_value_t = 0)]
    start: usize,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = Args::parse();

    let bytes = std::fs::read(&args.input)?;
    if args.start >= bytes.len() {
        bail!(
            "start offset 0x{:X} is past the end of {} ({} bytes)",
            args.start,
            args.input.display(),
            bytes.len()
        );
    }
    log::debug!("{}: {} bytes", args.input.display(), bytes.len());

    for line in Disassembler::new(bytes, args.start).lines()? {
        println!("{line}");
    }
    Ok(())
}
