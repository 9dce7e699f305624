pub(crate) mod meta;
pub(crate) mod output;
pub(crate) mod report;
