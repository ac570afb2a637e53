mod repo;

pub use repo::{RepoTestContext, commit, run};
