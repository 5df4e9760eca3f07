mod relay;
mod worker;

pub use relay::RelayCommand;
pub use worker::WorkerCommand;
