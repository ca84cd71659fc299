pub mod console;
pub mod interface;
pub mod keyboard;
pub mod recording;
