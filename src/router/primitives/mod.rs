pub(crate) mod search;

pub(crate) use search::*;
