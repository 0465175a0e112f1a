pub mod common_nd;
pub mod ksg;

pub use ksg::KsgMutualInformation;
