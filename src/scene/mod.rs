pub(crate) mod camera;
pub(crate) mod composer;
pub(crate) mod entity;
pub(crate) mod reshuffle;
pub(crate) mod solid;
