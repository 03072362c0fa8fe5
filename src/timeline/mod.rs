pub(crate) mod evaluate;
pub(crate) mod model;
pub(crate) mod playback;
pub(crate) mod record;
