//! Stage step implementations.

mod briefing;
mod caption;
mod cleanup;
mod detail;
mod finalize;
mod instruction;
mod verify;

pub use briefing::BriefingStep;
pub use caption::CaptionStep;
pub use cleanup::CleanupStep;
pub use detail::DetailStep;
pub use finalize::FinalizeStep;
pub use instruction::InstructionStep;
pub use verify::VerifyStep;
