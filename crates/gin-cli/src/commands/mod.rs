pub mod attack;
pub mod defend;
pub mod demo;
pub mod dispatch;
pub mod generate;
pub mod util;
