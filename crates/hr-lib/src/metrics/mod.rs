pub mod rate;

pub use rate::compute_hr;
