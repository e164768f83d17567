pub mod protocol;
pub mod questions;
pub mod room;
pub mod room_code;
