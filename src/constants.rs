//! Common constants used throughout pyskel.

/// Supported schema file names, tried in this order
pub const CONFIG_FILES: [&str; 3] = ["pyskel.yaml", "pyskel.yml", "pyskel.json"];

/// pyskel's ignore file name
pub const IGNORE_FILE: &str = ".pyskelignore";

/// Patterns that are never part of the rendered tree
pub const DEFAULT_IGNORE_PATTERNS: [&str; 9] = [
    "pyskel.yaml",
    "pyskel.yml",
    "pyskel.json",
    IGNORE_FILE,
    "hooks",
    "hooks/**",
    ".git",
    ".git/**",
    "**/.DS_Store",
];

/// Suffix marking files whose contents are rendered
pub const TEMPLATE_SUFFIX: &str = ".j2";

/// Environment variable pointing at the user defaults file
pub const CONFIG_ENV: &str = "PYSKEL_CONFIG";

/// Allowed spellings of a toggle value
pub const TOGGLE_VALUES: [&str; 2] = ["yes", "no"];
