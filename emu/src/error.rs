use thiserror::Error;

/// Execution-time failures. The engine reports them instead of
/// trapping the process; the reference CLI still exits on the first
/// one, by choice.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Error)]
pub enum VmError {
    #[error("invalid memory read at address {addr:#06X}")]
    ReadOutOfBounds { addr: u16 },

    #[error("invalid memory write at address {addr:#06X}")]
    WriteOutOfBounds { addr: u16 },

    #[error("program image of {len} bytes exceeds the {cap}-byte memory")]
    ImageTooLarge { len: usize, cap: usize },
}
