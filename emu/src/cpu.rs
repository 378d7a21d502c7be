use arch::op::{Mode, Opcode};
use arch::reg;
use color_print::cformat;
use log::trace;
use serde::Serialize;

use crate::error::VmError;
use crate::memory::{Memory, RAM_SIZE};

/// What NOT writes into ACC when toggling from zero.
const ACC_SET: u16 = 0xFFFF;

/// Keeps every stack access inside the low pages even after the 8-bit
/// pointer wraps.
const STACK_MASK: u16 = 0x01FF;

/// The FVM-2000 core: flat memory plus the register file. The register
/// file is not memory-mapped and is invisible to programs except
/// through instruction semantics.
pub struct Cpu {
    mem: Memory,
    pc: u16,
    sp: u8,
    a: u8,
    x: u8,
    y: u8,
    z: bool,
    cycles: u64,
}

impl Cpu {
    /// Seed memory with an assembled image at address 0, zero-fill the
    /// rest, and reset the register file.
    pub fn new(image: &[u8]) -> Result<Self, VmError> {
        if image.len() > RAM_SIZE {
            return Err(VmError::ImageTooLarge {
                len: image.len(),
                cap: RAM_SIZE,
            });
        }
        let mut mem = Memory::new();
        mem.load(image);
        Ok(Cpu {
            mem,
            pc: 0,
            sp: 0xFF,
            a: 0,
            x: 0,
            y: 0,
            z: false,
            cycles: 0,
        })
    }

    pub fn pc(&self) -> u16 {
        self.pc
    }

    pub fn a(&self) -> u8 {
        self.a
    }

    pub fn x(&self) -> u8 {
        self.x
    }

    pub fn y(&self) -> u8 {
        self.y
    }

    pub fn flag(&self) -> bool {
        self.z
    }

    pub fn sp(&self) -> u8 {
        self.sp
    }

    pub fn cycles(&self) -> u64 {
        self.cycles
    }

    pub fn memory(&self) -> &Memory {
        &self.mem
    }

    /// Hosts feed the input ports through here.
    pub fn memory_mut(&mut self) -> &mut Memory {
        &mut self.mem
    }

    /// True when the byte at pc is the halt opcode.
    pub fn halted(&self) -> Result<bool, VmError> {
        Ok(Opcode::from(self.mem.read(self.pc)?) == Opcode::HALT)
    }

    /// One fetch-decode-execute round. The pc is advanced by the
    /// instruction's declared size before dispatch, so control-transfer
    /// handlers simply overwrite it; every instruction costs exactly
    /// one cycle.
    pub fn step(&mut self) -> Result<(), VmError> {
        let pc = self.pc;
        let op = Opcode::from(self.mem.read(pc)?);
        let d = op.descriptor();

        let addr = match d.mode {
            Mode::Absolute => self.mem.read16(pc + 1)?,
            Mode::Immediate => pc + 1,
            Mode::ZeroPage => u16::from(self.mem.read(pc + 1)?),
            Mode::Implicit | Mode::Accumulator => 0,
        };

        self.pc = pc + d.size;
        self.cycles += 1;

        if log::log_enabled!(log::Level::Trace) {
            let operand = match d.mode {
                Mode::Implicit | Mode::Accumulator => String::new(),
                _ => match reg::BUILTINS.get_by_right(&addr) {
                    Some(name) => format!(" {addr:#06X} ({name})"),
                    None => format!(" {addr:#06X}"),
                },
            };
            trace!("[{:>4}] {:04X}: {}{}", self.cycles, pc, op, operand);
        }

        self.exec(op, addr)
    }

    /// Repeat `step` until the opcode at pc is the halt sentinel,
    /// returning the cycles executed by this call. Memory holding no
    /// explicit halt keeps fetching zeroed bytes (NOP) forever.
    pub fn run(&mut self) -> Result<u64, VmError> {
        let start = self.cycles;
        while !self.halted()? {
            self.step()?;
        }
        Ok(self.cycles - start)
    }

    fn exec(&mut self, op: Opcode, addr: u16) -> Result<(), VmError> {
        match op {
            Opcode::NOP | Opcode::BRK => {}
            Opcode::LDA => self.a = self.mem.read(addr)?,
            Opcode::ADC => self.a = self.a.wrapping_add(self.mem.read(addr)?),
            Opcode::STA => self.mem.write(addr, self.a)?,
            Opcode::STAX => self.mem.write(u16::from(self.x), self.a)?,
            Opcode::LDX => self.x = self.mem.read(addr)?,
            Opcode::INX => self.x = self.x.wrapping_add(1),
            Opcode::LDY => self.y = self.mem.read(addr)?,
            Opcode::DEY => self.y = self.y.wrapping_sub(1),
            Opcode::CMY => self.z = self.y == self.mem.read(addr)?,
            Opcode::BNE => {
                if !self.z {
                    self.pc = addr;
                }
            }
            Opcode::JMP => self.pc = addr,
            Opcode::JSR => {
                self.push16(self.pc)?;
                self.pc = addr;
            }
            Opcode::RTS => self.pc = self.pull16()?,
            Opcode::NOT => {
                let acc = self.mem.read16(reg::ACC)?;
                let toggled = if acc == 0 { ACC_SET } else { 0 };
                self.mem.write16(reg::ACC, toggled)?;
            }
            // The dst field sits in the last two instruction bytes,
            // right behind the already-advanced pc.
            Opcode::MOV | Opcode::MOVI => {
                let value = self.mem.read16(addr)?;
                let dst = self.mem.read16(self.pc - 2)?;
                self.mem.write16(dst, value)?;
            }
            Opcode::ADD | Opcode::ADDI => self.alu(addr, u16::wrapping_add)?,
            Opcode::SUB | Opcode::SUBI => self.alu(addr, u16::wrapping_sub)?,
            Opcode::MUL | Opcode::MULI => self.alu(addr, u16::wrapping_mul)?,
        }
        Ok(())
    }

    /// `ACC = ACC op operand`, 16-bit wrapping, no flags.
    fn alu(&mut self, addr: u16, f: fn(u16, u16) -> u16) -> Result<(), VmError> {
        let operand = self.mem.read16(addr)?;
        let acc = self.mem.read16(reg::ACC)?;
        self.mem.write16(reg::ACC, f(acc, operand))
    }

    fn push(&mut self, value: u8) -> Result<(), VmError> {
        self.mem.write(u16::from(self.sp) & STACK_MASK, value)?;
        self.sp = self.sp.wrapping_sub(1);
        Ok(())
    }

    fn pull(&mut self) -> Result<u8, VmError> {
        self.sp = self.sp.wrapping_add(1);
        self.mem.read(u16::from(self.sp) & STACK_MASK)
    }

    /// High byte first so that pull, reading low-then-high, is the
    /// exact inverse.
    fn push16(&mut self, value: u16) -> Result<(), VmError> {
        let [lo, hi] = value.to_le_bytes();
        self.push(hi)?;
        self.push(lo)
    }

    fn pull16(&mut self) -> Result<u16, VmError> {
        let lo = self.pull()?;
        let hi = self.pull()?;
        Ok(u16::from_le_bytes([lo, hi]))
    }

    /// Observational view of the register file and the hot memory
    /// cells; never fails, a wild pc just reports NOP.
    pub fn snapshot(&self) -> Snapshot {
        Snapshot {
            pc: self.pc,
            opcode: Opcode::from(self.mem.read(self.pc).unwrap_or(0)),
            a: self.a,
            x: self.x,
            y: self.y,
            flag: self.z,
            sp: self.sp,
            top: self
                .mem
                .read(u16::from(self.sp.wrapping_add(1)) & STACK_MASK)
                .unwrap_or(0),
            acc: self.mem.read16(reg::ACC).unwrap_or(0),
        }
    }
}

/// Debug introspection, observational only.
#[derive(Debug, Clone, Serialize)]
pub struct Snapshot {
    pub pc: u16,
    pub opcode: Opcode,
    pub a: u8,
    pub x: u8,
    pub y: u8,
    pub flag: bool,
    pub sp: u8,
    pub top: u8,
    pub acc: u16,
}

impl Snapshot {
    pub fn cformat(&self) -> String {
        cformat!(
            "pc=<yellow>{:04X}</> op={} a=<blue>{:02X}</> x=<blue>{:02X}</> y=<blue>{:02X}</> z=<blue>{}</> sp=<blue>{:02X}</> top=<blue>{:02X}</> acc=<green>{:04X}</>",
            self.pc,
            self.opcode.cformat(),
            self.a,
            self.x,
            self.y,
            self.flag as u8,
            self.sp,
            self.top,
            self.acc
        )
    }
}
