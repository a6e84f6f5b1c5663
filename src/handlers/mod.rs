pub mod og;
pub mod sharing;
