//! Template loading for pyskel.
//! Templates come either from the local filesystem or from a git
//! repository, which is cloned before use.
use crate::error::{Error, Result};
use crate::prompt::Prompter;
use log::debug;
use std::fs;
use std::path::{Path, PathBuf};
use url::Url;

/// Represents the source location of a template.
#[derive(Debug, PartialEq, Eq)]
pub enum TemplateSource {
    /// Local filesystem template path
    FileSystem(PathBuf),
    /// Git repository URL (HTTPS or SSH)
    Git(String),
}

impl std::fmt::Display for TemplateSource {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            TemplateSource::FileSystem(path) => {
                write!(f, "local path: '{}'", path.display())
            }
            TemplateSource::Git(repo) => write!(f, "git repository: '{repo}'"),
        }
    }
}

impl TemplateSource {
    /// Classifies a template argument as a git URL or a local path.
    pub fn from_string(s: &str) -> Self {
        if let Ok(url) = Url::parse(s) {
            if matches!(url.scheme(), "https" | "git" | "ssh") {
                return Self::Git(s.to_string());
            }
        }
        if s.starts_with("git@") {
            return Self::Git(s.to_string());
        }
        Self::FileSystem(PathBuf::from(s))
    }
}

/// Trait for loading templates from different sources.
pub trait TemplateLoader {
    /// Makes the template available locally and returns its root.
    fn load(&self) -> Result<PathBuf>;
}

/// Loader for templates from the local filesystem.
pub struct LocalLoader<P: AsRef<Path>> {
    path: P,
}

impl<P: AsRef<Path>> LocalLoader<P> {
    pub fn new(path: P) -> Self {
        Self { path }
    }
}

impl<P: AsRef<Path>> TemplateLoader for LocalLoader<P> {
    /// # Errors
    /// * `Error::TemplateDoesNotExistsError` if the path is not a directory
    fn load(&self) -> Result<PathBuf> {
        let path = self.path.as_ref();
        if !path.is_dir() {
            return Err(Error::TemplateDoesNotExistsError {
                template_dir: path.display().to_string(),
            });
        }
        Ok(path.to_path_buf())
    }
}

/// Loader for templates from git repositories.
pub struct GitLoader<'a, S: AsRef<str>> {
    prompt: &'a dyn Prompter,
    repo: S,
    clone_root: PathBuf,
    skip_overwrite_check: bool,
}

impl<'a, S: AsRef<str>> GitLoader<'a, S> {
    /// Clones into a directory named after the repository under `clone_root`.
    pub fn new(
        prompt: &'a dyn Prompter,
        repo: S,
        clone_root: PathBuf,
        skip_overwrite_check: bool,
    ) -> Self {
        Self { prompt, repo, clone_root, skip_overwrite_check }
    }

    /// Last path segment of the URL without the `.git` suffix.
    pub fn repo_name(repo_url: &str) -> &str {
        let name = repo_url
            .trim_end_matches('/')
            .rsplit(['/', ':'])
            .next()
            .unwrap_or_default()
            .trim_end_matches(".git");
        if name.is_empty() {
            "template"
        } else {
            name
        }
    }
}

impl<S: AsRef<str>> TemplateLoader for GitLoader<'_, S> {
    /// # Errors
    /// * `Error::Git2Error` if the clone fails
    fn load(&self) -> Result<PathBuf> {
        let repo_url = self.repo.as_ref();
        let repo_name = Self::repo_name(repo_url);
        let clone_path = self.clone_root.join(repo_name);

        if clone_path.exists() {
            let replace = self.prompt.confirm(
                self.skip_overwrite_check,
                format!("Directory '{}' already exists. Replace it?", clone_path.display()),
            )?;
            if !replace {
                debug!("Using existing directory '{}'.", clone_path.display());
                return Ok(clone_path);
            }
            fs::remove_dir_all(&clone_path)?;
        }
        fs::create_dir_all(&self.clone_root)?;

        debug!("Cloning '{}' to '{}'.", repo_url, clone_path.display());

        let mut callbacks = git2::RemoteCallbacks::new();
        callbacks.credentials(|_url, username_from_url, _allowed_types| {
            git2::Cred::ssh_key_from_agent(username_from_url.unwrap_or("git"))
        });

        let mut fetch_opts = git2::FetchOptions::new();
        fetch_opts.remote_callbacks(callbacks);

        let mut builder = git2::build::RepoBuilder::new();
        builder.fetch_options(fetch_opts);
        builder.clone(repo_url, &clone_path)?;

        Ok(clone_path)
    }
}

/// Returns the local root of the given template source.
pub fn load_template<S: AsRef<str>>(
    prompt: &dyn Prompter,
    template: S,
    skip_overwrite_check: bool,
) -> Result<PathBuf> {
    let template_source = TemplateSource::from_string(template.as_ref());
    println!("Using template from the {template_source}");

    let loader: Box<dyn TemplateLoader + '_> = match template_source {
        TemplateSource::Git(repo) => {
            let clone_root = std::env::temp_dir().join("pyskel-templates");
            Box::new(GitLoader::new(prompt, repo, clone_root, skip_overwrite_check))
        }
        TemplateSource::FileSystem(path) => Box::new(LocalLoader::new(path)),
    };

    loader.load()
}
