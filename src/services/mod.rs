mod catalog_client;
pub(crate) use catalog_client::*;

mod headless_output;
pub(crate) use headless_output::*;
