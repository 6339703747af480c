//! Generated page content.

mod bio;

pub use bio::{
    BioError, BioGenerator, DEFAULT_BASE_URL, DEFAULT_MODEL, EMPTY_REPLY_BIO, OFFLINE_BIO,
};
