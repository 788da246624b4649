use anyhow::Result;
use vergen_gitcl::{BuildBuilder, Emitter, GitclBuilder};

pub fn main() -> Result<()> {
    // VERGEN_BUILD_TIMESTAMP, VERGEN_GIT_DESCRIBE and VERGEN_GIT_SHA for the startup log
    Emitter::default()
        .add_instructions(&BuildBuilder::all_build()?)?
        .add_instructions(&GitclBuilder::all_git()?)?
        .emit()?;

    Ok(())
}
