pub(crate) mod adapter;
pub(crate) mod driver;
pub(crate) mod headless;
pub(crate) mod scheduler;
