pub mod types;

pub mod encode;
pub mod normalize;
pub mod validate;

pub use encode::encode;
pub use normalize::normalize;
pub use validate::validate;
