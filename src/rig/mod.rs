pub(crate) mod cache;
pub(crate) mod geometry;
pub(crate) mod metadata;
pub(crate) mod mirror;
pub(crate) mod pose;
pub(crate) mod rotation;
