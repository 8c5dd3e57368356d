mod args;

pub use args::{Cli, Command, MergeArgs, TaskArgs, TaskCommand, WaitArgs};
