pub mod collection;
pub mod html;
pub mod time;
pub mod token;
