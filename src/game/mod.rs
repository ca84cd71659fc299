pub mod dealer;
pub mod game;
pub mod input;
pub mod player;
pub mod set_validator;
pub mod table;
