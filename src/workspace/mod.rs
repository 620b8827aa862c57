pub mod code_buffer;
pub mod controller;
pub mod split;
