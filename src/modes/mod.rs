pub mod relay;

pub trait Command {
    /// Run to completion and return the process exit code.
    fn execute(&mut self) -> i32;
}
