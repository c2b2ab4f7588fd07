pub mod base;
pub mod bloom;
pub mod final_pass;

pub use base::{BasePass, FrameUniforms};
pub use bloom::{BloomPass, BlurUniforms};
pub use final_pass::FinalPass;
