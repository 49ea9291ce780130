mod array;
pub(crate) use array::*;
