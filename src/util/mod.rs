pub use self::args::{Args, Command};

mod args;
