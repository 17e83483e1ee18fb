pub mod pid;
pub mod rotation;
pub mod scaler;
