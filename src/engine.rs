/*!
  The execution engine. One cycle runs through the phases

  ```text
  Fetch -> Decode -> Execute -> TimerTick -> InterruptCheck
  ```

  and the machine keeps cycling until it executes `halt` or faults. A fault is any
  `MachineError`; there is no recovery from one.

  Every `TIMER_PERIOD` cycles, if interrupts are enabled, the timer sets the pending bit of the
  PSR. The interrupt check of the same cycle then pushes the PSR and the PC, disables interrupts,
  and jumps to the handler whose address is stored at `INTERRUPT_VECTOR`. The handler returns
  with `iret`.
*/

use std::convert::TryFrom;
use std::io::Write;

use crate::bytecode::{decode_fields, Fields, Operation};
use crate::error::MachineError;
use crate::machine::{Machine, PSR_INT_EN, PSR_INT_PEND};
use crate::register::Register;

/// The timer raises an interrupt whenever the cycle counter is a multiple of this.
pub const TIMER_PERIOD: u64 = 5000;
/// The memory address holding the interrupt handler's address.
pub const INTERRUPT_VECTOR: usize = 0;

#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum Phase {
  Fetch,
  Decode,
  Execute,
  TimerTick,
  InterruptCheck
}

/// The outcome of a cycle that did not fault.
#[derive(Clone, Copy, Debug, Eq, PartialEq, Hash)]
pub enum State {
  Running,
  Halted
}

impl Machine {

  /// Runs until `halt` or a fault. Returns the number of cycles executed.
  pub fn run<W: Write>(&mut self, output: &mut W) -> Result<u64, MachineError> {
    let start = self.cpu.counter;

    #[cfg(feature = "trace_computation")]
      eprintln!("Starting at PC = {}\n{}", self.cpu.pc, self);

    while self.cycle(output)? == State::Running {}

    Ok(self.cpu.counter - start)
  }

  /// Runs exactly one cycle.
  pub fn cycle<W: Write>(&mut self, output: &mut W) -> Result<State, MachineError> {
    let mut phase  = Phase::Fetch;
    let mut fields = Fields::default();
    let mut state  = State::Running;

    loop {
      phase =
        match phase {

          Phase::Fetch => {
            self.fetch()?;
            Phase::Decode
          }

          Phase::Decode => {
            fields = decode_fields(self.cpu.ir);
            Phase::Execute
          }

          Phase::Execute => {
            state = self.execute(fields, output)?;
            Phase::TimerTick
          }

          Phase::TimerTick => {
            self.timer_tick();
            match state {
              State::Halted  => break,
              State::Running => Phase::InterruptCheck
            }
          }

          Phase::InterruptCheck => {
            self.check_interrupt();
            break;
          }

        };
    }

    #[cfg(feature = "trace_computation")]
      eprintln!("{}", self);

    Ok(state)
  }

  fn fetch(&mut self) -> Result<(), MachineError> {
    let pc = self.cpu.pc;
    match self.memory.get(pc as usize) {
      Some(word) => {
        self.cpu.ir = word;
        Ok(())
      }
      _ => Err(MachineError::PcOutOfBounds{ pc })
    }
  }

  /// Checks a register field of the current instruction.
  fn register_field(&self, code: u8) -> Result<Register, MachineError> {
    Register::from_code(code).ok_or(MachineError::InvalidRegister{ pc: self.cpu.pc, register: code })
  }

  fn advance(&mut self, offset: i32) {
    self.cpu.pc = self.cpu.pc.wrapping_add(offset as u32);
  }

  fn execute<W: Write>(&mut self, fields: Fields, output: &mut W) -> Result<State, MachineError> {
    let pc = self.cpu.pc;
    let operation =
      match Operation::try_from(fields.opcode) {
        Ok(operation) => operation,
        Err(_)        => return Err(MachineError::InvalidOpcode{ pc, opcode: fields.opcode })
      };
    let imm = fields.imm as i32;

    #[cfg(feature = "trace_computation")]
      eprintln!("Cycle {}: M[{}] = 0x{:08x} {}", self.cpu.counter + 1, pc, self.cpu.ir,
                crate::bytecode::try_decode_instruction(self.cpu.ir)
                  .map(|i| i.to_string())
                  .unwrap_or_default());

    match operation {

      Operation::Halt => {
        return Ok(State::Halted);
      }

      Operation::Nop => {
        self.advance(1);
      }

      Operation::Addi => {
        let (s, t) = (self.register_field(fields.sreg)?, self.register_field(fields.treg)?);
        self.set_register(t, self.register(s).wrapping_add(imm));
        self.advance(1);
      }

      Operation::MoveReg => {
        let (s, t) = (self.register_field(fields.sreg)?, self.register_field(fields.treg)?);
        self.set_register(t, self.register(s));
        self.advance(1);
      }

      Operation::Movei => {
        let t = self.register_field(fields.treg)?;
        self.set_register(t, imm);
        self.advance(1);
      }

      Operation::Lw => {
        let (s, t) = (self.register_field(fields.sreg)?, self.register_field(fields.treg)?);
        let word   = self.memory.read(self.register(s).wrapping_add(imm));
        self.set_register(t, word as i32);
        self.advance(1);
      }

      Operation::Sw => {
        let (s, t) = (self.register_field(fields.sreg)?, self.register_field(fields.treg)?);
        let address = self.register(s).wrapping_add(imm);
        let word    = self.register(t) as u32;
        self.memory.write(address, word);
        self.advance(1);
      }

      Operation::Blez => {
        let s = self.register_field(fields.sreg)?;
        match self.register(s) <= 0 {
          true  => self.advance(1 + imm),
          false => self.advance(1)
        }
      }

      Operation::La => {
        let t = self.register_field(fields.treg)?;
        self.set_register(t, (pc as i32).wrapping_add(1 + imm));
        self.advance(1);
      }

      Operation::Push => {
        let s = self.register_field(fields.sreg)?;
        // Decrement first, so `push sp` stores the decremented value.
        self.cpu.set_sp(self.cpu.sp().wrapping_sub(1));
        let word = self.register(s) as u32;
        self.memory.write(self.cpu.sp(), word);
        self.advance(1);
      }

      Operation::Pop => {
        let t = self.register_field(fields.treg)?;
        // Read first, so `pop sp` increments the popped value.
        let word = self.memory.read(self.cpu.sp());
        self.set_register(t, word as i32);
        self.cpu.set_sp(self.cpu.sp().wrapping_add(1));
        self.advance(1);
      }

      Operation::Add => {
        let (s, t) = (self.register_field(fields.sreg)?, self.register_field(fields.treg)?);
        self.set_register(t, self.register(s).wrapping_add(self.register(t)));
        self.advance(1);
      }

      Operation::Jmp => {
        self.advance(1 + imm);
      }

      Operation::Iret => {
        self.cpu.pc  = self.pop_word();
        self.cpu.psr = self.pop_word() & !PSR_INT_PEND;
      }

      Operation::Put => {
        let s = self.register_field(fields.sreg)?;
        output.write_all(&[self.register(s) as u8])?;
        self.advance(1);
      }

    }

    Ok(State::Running)
  }

  fn push_word(&mut self, word: u32) {
    self.cpu.set_sp(self.cpu.sp().wrapping_sub(1));
    self.memory.write(self.cpu.sp(), word);
  }

  fn pop_word(&mut self) -> u32 {
    let word = self.memory.read(self.cpu.sp());
    self.cpu.set_sp(self.cpu.sp().wrapping_add(1));
    word
  }

  fn timer_tick(&mut self) {
    self.cpu.counter += 1;
    if self.cpu.interrupts_enabled() && self.cpu.counter % TIMER_PERIOD == 0 {
      self.cpu.psr |= PSR_INT_PEND;
    }
  }

  fn check_interrupt(&mut self) {
    if self.cpu.interrupts_enabled() && self.cpu.interrupt_pending() {
      #[cfg(feature = "trace_computation")]
        eprintln!("Interrupt at cycle {}, returning to {}", self.cpu.counter, self.cpu.pc);

      // `iret` pops the PC first, so it is pushed last.
      self.push_word(self.cpu.psr);
      self.push_word(self.cpu.pc);
      // No nested interrupts.
      self.cpu.psr &= !(PSR_INT_EN | PSR_INT_PEND);
      self.cpu.pc = self.memory.read(INTERRUPT_VECTOR as i32);
    }
  }
}
