//! The python-package template shipped inside the binary.
//! Files are embedded at compile time and written to a temporary
//! directory when a run uses the bundled template.

use std::fs;
use std::path::Path;

use log::debug;
use tempfile::TempDir;

use crate::error::Result;

/// Name of the bundled template.
pub const BUNDLED_TEMPLATE: &str = "python-package";

macro_rules! embed {
    ($path:literal) => {
        ($path, include_str!(concat!("../templates/python-package/", $path)))
    };
}

/// Relative path and contents of every file of the bundled template.
pub const FILES: &[(&str, &str)] = &[
    embed!(".pyskelignore"),
    embed!("pyskel.yaml"),
    embed!("{{ project_slug }}/.github/workflows/release.yml.j2"),
    embed!("{{ project_slug }}/.github/workflows/tests.yml.j2"),
    embed!("{{ project_slug }}/.gitignore"),
    embed!("{{ project_slug }}/.pre-commit-config.yaml"),
    embed!("{{ project_slug }}/CLAUDE.md.j2"),
    embed!("{{ project_slug }}/LICENSE.j2"),
    embed!("{{ project_slug }}/Makefile.j2"),
    embed!("{{ project_slug }}/README.md.j2"),
    embed!("{{ project_slug }}/pyproject.toml.j2"),
    embed!("{{ project_slug }}/src/{{ project_slug }}/__init__.py.j2"),
    embed!("{{ project_slug }}/src/{{ project_slug }}/cli.py.j2"),
    embed!("{{ project_slug }}/src/{{ project_slug }}/py.typed"),
    embed!("{{ project_slug }}/tests/__init__.py"),
    embed!("{{ project_slug }}/tests/test_{{ project_slug }}.py.j2"),
    embed!("{{ project_slug }}/tox.ini.j2"),
];

/// Writes the embedded files under `root`.
pub fn write_bundled_template(root: &Path) -> Result<()> {
    for (relative, content) in FILES {
        let target = root.join(relative);
        if let Some(parent) = target.parent() {
            fs::create_dir_all(parent)?;
        }
        fs::write(&target, content)?;
    }
    Ok(())
}

/// Extracts the bundled template into a fresh temporary directory, which is
/// removed when the returned guard is dropped.
pub fn extract_bundled_template() -> Result<TempDir> {
    let dir = tempfile::Builder::new().prefix("pyskel-").tempdir()?;
    write_bundled_template(dir.path())?;
    debug!("Extracted the bundled template to {}", dir.path().display());
    Ok(dir)
}
