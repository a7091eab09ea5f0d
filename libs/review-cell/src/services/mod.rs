pub mod review;
pub mod window;

pub use review::ReviewService;
