//! Error helper functions for creating actionable error messages

use std::io;
use std::path::Path;

/// Check if an IO error is a permission denied error
pub fn is_permission_denied(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::PermissionDenied
}

/// Check if an IO error is a "not found" error
pub fn is_not_found(err: &io::Error) -> bool {
    err.kind() == io::ErrorKind::NotFound
}

/// Create an enhanced error message for file permission issues
pub fn permission_error(path: &Path, operation: &str) -> String {
    let parent_dir = path
        .parent()
        .map(|p| p.display().to_string())
        .unwrap_or_else(|| ".".to_string());

    format!(
        "Permission denied when {} '{}'\n\n\
         Possible fixes:\n\
         1. Check file permissions: ls -l '{}'\n\
         2. The .bak copy is written next to the file: ensure write access with: chmod u+w '{}'",
        operation,
        path.display(),
        path.display(),
        parent_dir
    )
}

/// Create an enhanced error message for a missing target
pub fn not_found_error(path: &Path, context: &str) -> String {
    format!(
        "File not found: '{}'\n\n\
         Context: {}\n\n\
         Possible fixes:\n\
         1. Check the file path is correct\n\
         2. Use an absolute path if the relative path is ambiguous",
        path.display(),
        context
    )
}

/// Create an enhanced error message for a target that exists but is not a regular file
pub fn not_regular_file_error(path: &Path, context: &str) -> String {
    let kind = if path.is_dir() { "a directory" } else { "a special file" };
    format!(
        "Not a regular file: '{}' is {}\n\n\
         Context: {}\n\n\
         Possible fixes:\n\
         1. Point at the stylesheet itself, e.g. '{}'",
        path.display(),
        kind,
        context,
        path.join("style.css").display()
    )
}

/// Describe an IO failure on `path`, adding fixes for the common cases
pub fn describe_io_error(path: &Path, operation: &str, err: &io::Error) -> String {
    if is_permission_denied(err) {
        permission_error(path, operation)
    } else if is_not_found(err) {
        not_found_error(path, operation)
    } else {
        format!("Failed {} '{}': {}", operation, path.display(), err)
    }
}
