use std::path::PathBuf;

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error(transparent)]
    IO(#[from] std::io::Error),

    #[error(transparent)]
    Config(#[from] cdump_config::error::Error),

    #[error(transparent)]
    Runtime(#[from] cdump_io::error::Error),

    #[error(transparent)]
    Store(#[from] cdump_store::error::Error),

    #[error("Dump directory {0} does not exist or is not a directory")]
    DumpDirMissing(PathBuf),
}
