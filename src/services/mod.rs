pub mod analyzer;
pub mod imaging;
pub mod providers;

pub use analyzer::Analyzer;
