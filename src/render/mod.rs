pub(crate) mod cpu;
pub(crate) mod record;
pub(crate) mod surface;
