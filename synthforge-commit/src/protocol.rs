//! The safe-commit protocol (C10): stage, commit, push; on rejection, fetch + rebase;
//! on conflict or post-rebase validation failure, hard-reset and reapply from the
//! in-memory state object already produced, then retry. Bounded to `A_max` attempts.

use std::cell::RefCell;
use std::path::{Path, PathBuf};
use std::rc::Rc;

use git2::{ObjectType, PushOptions, Repository, ResetType, Signature};
use tracing::{info, instrument, warn};

use synthforge_state::contains_conflict_marker;

use crate::credentials::callbacks_with_token;
use crate::error::CommitError;

/// One file to commit, carrying the bytes already produced by the state store so
/// the protocol can reapply them verbatim after a hard reset, without re-deriving
/// anything from the working tree.
#[derive(Clone, Debug)]
pub struct FileChange {
    /// Path relative to the repository root.
    pub path: PathBuf,
    pub contents: Vec<u8>,
}

/// What `safe_commit` actually did.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum CommitOutcome {
    /// `files` was empty or produced no diff against `HEAD` — nothing staged.
    NothingToCommit,
    /// Pushed successfully, after `attempts` total push attempts.
    Pushed { attempts: u32 },
}

/// A function that re-validates a file's bytes after a rebase (e.g. "parses as
/// JSON and its `_meta.count` matches its entry count"). Injected by the caller,
/// which is the only party that knows each file's shape.
pub type Validator<'a> = dyn Fn(&Path, &[u8]) -> bool + 'a;

pub struct SafeCommitProtocol {
    repo_path: PathBuf,
    remote_name: String,
    branch: String,
    author_name: String,
    author_email: String,
    max_attempts: u32,
}

impl SafeCommitProtocol {
    pub fn new(
        repo_path: impl Into<PathBuf>,
        remote_name: impl Into<String>,
        branch: impl Into<String>,
        author_name: impl Into<String>,
        author_email: impl Into<String>,
        max_attempts: u32,
    ) -> Self {
        Self {
            repo_path: repo_path.into(),
            remote_name: remote_name.into(),
            branch: branch.into(),
            author_name: author_name.into(),
            author_email: author_email.into(),
            max_attempts,
        }
    }

    #[instrument(skip(self, files, token, validator), fields(files = files.len()))]
    pub fn safe_commit(
        &self,
        files: &[FileChange],
        message: &str,
        token: String,
        validator: &Validator,
    ) -> Result<CommitOutcome, CommitError> {
        if files.is_empty() {
            return Ok(CommitOutcome::NothingToCommit);
        }
        for file in files {
            if contains_conflict_marker(&String::from_utf8_lossy(&file.contents)) {
                return Err(CommitError::ConflictMarker { path: file.path.clone() });
            }
        }

        let repo = Repository::open(&self.repo_path)?;
        if !self.stage_and_commit(&repo, files, message)? {
            return Ok(CommitOutcome::NothingToCommit);
        }

        let mut attempt = 1;
        loop {
            if self.try_push(&repo, &token)? {
                return Ok(CommitOutcome::Pushed { attempts: attempt });
            }

            if attempt >= self.max_attempts {
                return Err(CommitError::AttemptsExhausted { attempts: attempt });
            }

            info!(attempt, "push rejected, fetching and rebasing");
            self.fetch(&repo, &token)?;
            match self.rebase_onto_remote(&repo)? {
                RebaseResult::Clean => {
                    if self.revalidate(files, validator).is_ok() {
                        attempt += 1;
                        continue;
                    }
                    warn!("post-rebase validation failed, resetting and reapplying");
                }
                RebaseResult::Conflicted => {
                    warn!("rebase conflicted, resetting and reapplying");
                }
            }

            self.hard_reset_to_remote(&repo)?;
            self.stage_and_commit(&repo, files, message)?;
            attempt += 1;
        }
    }

    fn signature(&self) -> Result<Signature<'static>, CommitError> {
        Ok(Signature::now(&self.author_name, &self.author_email)?)
    }

    /// Writes every file's bytes to disk, stages them, and commits. Returns `false`
    /// if staging produced no change against `HEAD` (nothing to commit).
    fn stage_and_commit(&self, repo: &Repository, files: &[FileChange], message: &str) -> Result<bool, CommitError> {
        for file in files {
            let full_path = self.repo_path.join(&file.path);
            if let Some(dir) = full_path.parent() {
                std::fs::create_dir_all(dir).map_err(|source| CommitError::Io { path: dir.to_path_buf(), source })?;
            }
            std::fs::write(&full_path, &file.contents)
                .map_err(|source| CommitError::Io { path: full_path.clone(), source })?;
        }

        let mut index = repo.index()?;
        for file in files {
            index.add_path(&file.path)?;
        }
        index.write()?;
        let tree_oid = index.write_tree()?;
        let tree = repo.find_tree(tree_oid)?;

        let head = repo.head().ok().and_then(|h| h.peel_to_commit().ok());
        if let Some(parent) = &head {
            if parent.tree_id() == tree_oid {
                return Ok(false);
            }
        }

        let signature = self.signature()?;
        let parents: Vec<&git2::Commit> = head.iter().collect();
        repo.commit(Some("HEAD"), &signature, &signature, message, &tree, &parents)?;
        Ok(true)
    }

    /// Attempts to push the current branch. Returns `true` on a clean push, `false`
    /// if the remote rejected it (e.g. non-fast-forward), surfacing any other error.
    fn try_push(&self, repo: &Repository, token: &str) -> Result<bool, CommitError> {
        let mut remote = repo.find_remote(&self.remote_name)?;
        let rejected: Rc<RefCell<bool>> = Rc::new(RefCell::new(false));
        let rejected_in_callback = rejected.clone();

        let mut callbacks = callbacks_with_token(token.to_string());
        callbacks.push_update_reference(move |_refname, status| {
            if status.is_some() {
                *rejected_in_callback.borrow_mut() = true;
            }
            Ok(())
        });

        let mut options = PushOptions::new();
        options.remote_callbacks(callbacks);
        let refspec = format!("refs/heads/{branch}:refs/heads/{branch}", branch = self.branch);
        remote.push(&[refspec.as_str()], Some(&mut options))?;

        Ok(!*rejected.borrow())
    }

    fn fetch(&self, repo: &Repository, token: &str) -> Result<(), CommitError> {
        let mut remote = repo.find_remote(&self.remote_name)?;
        let mut options = git2::FetchOptions::new();
        options.remote_callbacks(callbacks_with_token(token.to_string()));
        remote.fetch(&[self.branch.as_str()], Some(&mut options), None)?;
        Ok(())
    }

    fn rebase_onto_remote(&self, repo: &Repository) -> Result<RebaseResult, CommitError> {
        let upstream_ref = repo.find_reference(&format!("refs/remotes/{}/{}", self.remote_name, self.branch))?;
        let upstream = repo.reference_to_annotated_commit(&upstream_ref)?;
        let local_ref = repo.head()?;
        let local = repo.reference_to_annotated_commit(&local_ref)?;

        let mut rebase = repo.rebase(Some(&local), Some(&upstream), None, None)?;
        let signature = self.signature()?;

        while let Some(operation) = rebase.next() {
            operation?;
            if repo.index()?.has_conflicts() {
                rebase.abort()?;
                return Ok(RebaseResult::Conflicted);
            }
            rebase.commit(None, &signature, None)?;
        }
        rebase.finish(Some(&signature))?;
        Ok(RebaseResult::Clean)
    }

    fn revalidate(&self, files: &[FileChange], validator: &Validator) -> Result<(), CommitError> {
        for file in files {
            let full_path = self.repo_path.join(&file.path);
            let contents = std::fs::read(&full_path).map_err(|source| CommitError::Io { path: full_path.clone(), source })?;
            if !validator(&file.path, &contents) {
                return Err(CommitError::Validation { path: file.path.clone() });
            }
        }
        Ok(())
    }

    fn hard_reset_to_remote(&self, repo: &Repository) -> Result<(), CommitError> {
        let upstream_ref = repo.find_reference(&format!("refs/remotes/{}/{}", self.remote_name, self.branch))?;
        let target = upstream_ref.peel(ObjectType::Commit)?;
        repo.reset(&target, ResetType::Hard, None)?;
        Ok(())
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum RebaseResult {
    Clean,
    Conflicted,
}
