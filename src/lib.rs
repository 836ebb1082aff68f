pub(crate) mod cache;
pub(crate) mod engine;
pub(crate) mod error;
pub(crate) mod explore;
pub(crate) mod export;
pub(crate) mod options;
pub(crate) mod policy;
pub(crate) mod position;

#[allow(unused)]
pub mod prelude
{
    pub use std::str::FromStr;

    pub use log::{self};

    pub use crate::{
        cache::*,
        engine::*,
        error::{Error, Kind, Result},
        explore::*,
        export::write_tree,
        options::Options,
        policy::*,
        position::*,
    };
}
