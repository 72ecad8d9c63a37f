//! Scripted bus double for exercising the protocol layer without hardware.
//!
//! Works like the expectation mocks in `embedded-hal-mock`: a test supplies the exact
//! transaction script, every trait call is checked against the next entry, and `done()`
//! asserts the script was fully consumed.
#![allow(dead_code)]

use core::convert::Infallible;

use ibutton_tag::{
    Code, IButtonBus, READ_ROM_CMD, RW1990V1_WRITE_ENABLE_CMD, RW1990V1_WRITE_FLAG_CMD,
    RW1990V2_WRITE_ENABLE_CMD, RW1990V2_WRITE_FLAG_CMD, RW2004_PROGRAM_CMD, RW2004_STATUS_CMD,
    WRITE_FLAG_ARMED, WRITE_ROM_CMD,
};

/// One expected bus transaction. Read variants carry the value the bus answers with.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BusOp {
    Reset(bool),
    WriteByte(u8),
    ReadByte(u8),
    WriteBit(bool),
    ResetSearch,
    Search(Option<Code>),
}

pub struct MockBus {
    script: Vec<BusOp>,
    pos: usize,
}

impl MockBus {
    pub fn new(script: Vec<BusOp>) -> Self {
        Self { script, pos: 0 }
    }

    fn next_op(&mut self, requested: &str) -> BusOp {
        let op = *self
            .script
            .get(self.pos)
            .unwrap_or_else(|| panic!("bus script exhausted at {requested} (op {})", self.pos));
        self.pos += 1;
        op
    }

    /// Asserts every scripted transaction was consumed.
    pub fn done(&self) {
        assert_eq!(
            self.pos,
            self.script.len(),
            "unconsumed bus script entries: {:?}",
            &self.script[self.pos..]
        );
    }
}

impl IButtonBus for MockBus {
    type BusError = Infallible;

    fn reset(&mut self) -> Result<bool, Infallible> {
        match self.next_op("reset") {
            BusOp::Reset(presence) => Ok(presence),
            other => panic!("expected {other:?}, got reset"),
        }
    }

    fn write_byte(&mut self, byte: u8) -> Result<(), Infallible> {
        match self.next_op("write_byte") {
            BusOp::WriteByte(expected) => {
                assert_eq!(byte, expected, "unexpected byte on the wire");
                Ok(())
            }
            other => panic!("expected {other:?}, got write_byte({byte:#04x})"),
        }
    }

    fn read_byte(&mut self) -> Result<u8, Infallible> {
        match self.next_op("read_byte") {
            BusOp::ReadByte(value) => Ok(value),
            other => panic!("expected {other:?}, got read_byte"),
        }
    }

    fn write_bit(&mut self, bit: bool) -> Result<(), Infallible> {
        match self.next_op("write_bit") {
            BusOp::WriteBit(expected) => {
                assert_eq!(bit, expected, "unexpected bit on the wire");
                Ok(())
            }
            other => panic!("expected {other:?}, got write_bit({bit})"),
        }
    }

    fn reset_search(&mut self) {
        match self.next_op("reset_search") {
            BusOp::ResetSearch => (),
            other => panic!("expected {other:?}, got reset_search"),
        }
    }

    fn search(&mut self) -> Result<Option<Code>, Infallible> {
        match self.next_op("search") {
            BusOp::Search(result) => Ok(result),
            other => panic!("expected {other:?}, got search"),
        }
    }

    fn crc8(data: &[u8]) -> u8 {
        crc8(data)
    }
}

/// Reference Maxim CRC-8, polynomial 0x8c, LSB first.
pub fn crc8(data: &[u8]) -> u8 {
    let mut crc = 0u8;
    for &byte in data {
        let mut cur = crc ^ byte;
        for _ in 0..8 {
            cur = if cur & 0x1 == 0x1 {
                (cur >> 1) ^ 0x8c
            } else {
                cur >> 1
            };
        }
        crc = cur;
    }
    crc
}

/// Builds a valid code from a 7-byte payload.
pub fn coded(payload: [u8; 7]) -> Code {
    let mut code = [0u8; 8];
    code[..7].copy_from_slice(&payload);
    code[7] = crc8(&payload);
    code
}

/// Script for a single-device read answering with `answer`.
pub fn read_rom_script(answer: &Code) -> Vec<BusOp> {
    let mut script = vec![BusOp::Reset(true), BusOp::WriteByte(READ_ROM_CMD)];
    script.extend(answer.iter().map(|&b| BusOp::ReadByte(b)));
    script
}

/// Script for the RW1990 v1 probe, the device answering `answer` on the flag read.
pub fn probe_v1_script(answer: u8) -> Vec<BusOp> {
    vec![
        BusOp::Reset(true),
        BusOp::WriteByte(RW1990V1_WRITE_ENABLE_CMD),
        BusOp::WriteBit(true),
        BusOp::Reset(true),
        BusOp::WriteByte(RW1990V1_WRITE_FLAG_CMD),
        BusOp::ReadByte(answer),
    ]
}

/// Script for the RW1990 v2 probe, including the disarm restore on a positive answer.
pub fn probe_v2_script(answer: u8) -> Vec<BusOp> {
    let mut script = vec![
        BusOp::Reset(true),
        BusOp::WriteByte(RW1990V2_WRITE_ENABLE_CMD),
        BusOp::WriteBit(true),
        BusOp::Reset(true),
        BusOp::WriteByte(RW1990V2_WRITE_FLAG_CMD),
        BusOp::ReadByte(answer),
    ];
    if answer == WRITE_FLAG_ARMED {
        script.extend([
            BusOp::Reset(true),
            BusOp::WriteByte(RW1990V2_WRITE_ENABLE_CMD),
            BusOp::WriteBit(false),
        ]);
    }
    script
}

/// Script for the RW2004 probe; `matched` controls whether the echoed CRC is correct.
pub fn probe_rw2004_script(matched: bool) -> Vec<BusOp> {
    let query = [RW2004_STATUS_CMD, 0x00, 0x00];
    let good = crc8(&query);
    let mut script = vec![
        BusOp::Reset(true),
        BusOp::WriteByte(query[0]),
        BusOp::WriteByte(query[1]),
        BusOp::WriteByte(query[2]),
        BusOp::ReadByte(if matched { good } else { good ^ 0xff }),
    ];
    if matched {
        script.extend([BusOp::ReadByte(0x00), BusOp::Reset(true)]);
    }
    script
}

/// Script for the pulsed-bit write shared by RW1990 v1/v2 and TM01.
pub fn pulsed_write_script(code: &Code, enable_cmd: u8, invert: bool) -> Vec<BusOp> {
    let armed = !invert;
    let mut script = vec![
        BusOp::Reset(true),
        BusOp::WriteByte(enable_cmd),
        BusOp::WriteBit(armed),
        BusOp::Reset(true),
        BusOp::WriteByte(WRITE_ROM_CMD),
    ];
    for &byte in code.iter() {
        for bit in 0..8 {
            script.push(BusOp::WriteBit(((byte >> bit) & 1 == 1) ^ invert));
        }
    }
    script.extend([
        BusOp::Reset(true),
        BusOp::WriteByte(enable_cmd),
        BusOp::WriteBit(!armed),
    ]);
    script
}

/// Script for a fully successful RW2004 byte-programming sequence.
pub fn program_script(code: &Code) -> Vec<BusOp> {
    let mut script = vec![
        BusOp::Reset(true),
        BusOp::WriteByte(RW2004_PROGRAM_CMD),
        BusOp::WriteByte(0x00),
        BusOp::WriteByte(0x00),
    ];
    for &byte in code.iter() {
        script.extend(program_byte_script(byte, byte));
    }
    script
}

/// Script for one RW2004 byte cycle: the byte, its CRC echo, the program pulse and a
/// read-back answering `echo`.
pub fn program_byte_script(byte: u8, echo: u8) -> Vec<BusOp> {
    vec![
        BusOp::WriteByte(byte),
        BusOp::ReadByte(crc8(&[byte])),
        BusOp::WriteBit(true),
        BusOp::ReadByte(echo),
    ]
}
