//! Interactive assistant for publishing a local directory to a hosted git
//! remote: analyze the directory, initialize a repository when sensible,
//! sync the branch, stage, commit, push (with remote-creation recovery), and
//! confirm the result in a browser.

pub mod classify;
pub mod git;
pub mod github;
pub mod platform;
pub mod prompt;
pub mod runner;
pub mod styling;
pub mod workflow;
