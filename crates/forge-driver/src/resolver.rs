//! Normalization of import specifiers into module paths

use forge_sema::ModuleError;

/// Source file extensions accepted (and dropped) in import specifiers
const EXTENSIONS: [&str; 2] = ["rf", "sf"];

/// Module resolver turns an import specifier into a canonical module path.
///
/// Canonical paths are `/`-separated segments without `.`/`..` parts,
/// duplicate separators or a file extension: `./util//Strings.rf`
/// imported from `app/main` resolves to `app/util/Strings`.
#[derive(Debug, Clone, Copy, Default)]
pub struct ModuleResolver;

impl ModuleResolver {
    pub fn new() -> Self {
        Self
    }

    /// Resolve `specifier` as written in `importer` (a canonical path), if any
    pub fn resolve(&self, specifier: &str, importer: Option<&str>) -> Result<String, ModuleError> {
        let specifier = specifier.trim();
        if specifier.is_empty() {
            return Err(Self::invalid(specifier, "empty module path"));
        }

        // Check if it's a relative import (starts with ./ or ../)
        let mut segments: Vec<&str> = if Self::is_relative(specifier) {
            match importer {
                Some(importer) => Self::parent_segments(importer),
                None => Vec::new(),
            }
        } else {
            Vec::new()
        };

        for segment in specifier.split('/') {
            match segment {
                "" | "." => {}
                ".." => {
                    if segments.pop().is_none() {
                        return Err(Self::invalid(specifier, "escapes the module root"));
                    }
                }
                other => segments.push(other),
            }
        }

        let Some(last) = segments.pop() else {
            return Err(Self::invalid(specifier, "names no module"));
        };
        segments.push(Self::strip_extension(last));
        Ok(segments.join("/"))
    }

    fn is_relative(specifier: &str) -> bool {
        specifier == "." || specifier == ".." || specifier.starts_with("./") || specifier.starts_with("../")
    }

    /// Directory segments of a canonical module path
    fn parent_segments(path: &str) -> Vec<&str> {
        let mut segments: Vec<&str> = path.split('/').filter(|s| !s.is_empty()).collect();
        segments.pop();
        segments
    }

    fn strip_extension(segment: &str) -> &str {
        match segment.rsplit_once('.') {
            Some((stem, ext)) if !stem.is_empty() && EXTENSIONS.contains(&ext) => stem,
            _ => segment,
        }
    }

    fn invalid(path: &str, reason: &str) -> ModuleError {
        ModuleError::InvalidPath {
            path: path.to_string(),
            reason: reason.to_string(),
        }
    }
}
