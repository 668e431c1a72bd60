pub mod completion;
pub mod debug;
pub mod detect;
pub mod generate;
pub mod presets;
pub mod tree;
