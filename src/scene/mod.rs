pub(crate) mod composite;
pub(crate) mod graph;
pub(crate) mod memory;
pub(crate) mod snapshot;
