pub mod output;

pub use output::{emit, render_human, OutputFormat};
