//! File and file-list schema validation.
//!
//! File inputs arrive as [`FileHandle`]s carrying the byte length reported
//! by the platform; no check here ever reads content.

use std::sync::Arc;

use stillwater::Validation;

use crate::error::{finish, FieldError, FieldErrors};
use crate::path::FieldPath;
use crate::value::{FileHandle, Value};

use super::traits::SchemaLike;

type FilePredicate = Arc<dyn Fn(&FileHandle) -> bool + Send + Sync>;
type ListPredicate = Arc<dyn Fn(&[FileHandle]) -> bool + Send + Sync>;

#[derive(Clone)]
enum FileConstraint {
    MaxSize { bytes: u64, message: Option<String> },
    MinSize { bytes: u64, message: Option<String> },
    MimeTypes { allowed: Vec<String>, message: Option<String> },
    Refine { predicate: FilePredicate, message: String },
}

/// A schema for a single file.
///
/// # Example
///
/// ```rust
/// use formcheck::{validate, FileHandle, Schema, Value};
///
/// let avatar = Schema::file().max_size(5 * 1024 * 1024);
///
/// let small = Value::from(FileHandle::new("me.png", 1024, "image/png"));
/// assert!(validate(&avatar, &small).is_success());
///
/// let large = Value::from(FileHandle::new("me.png", 6 * 1024 * 1024, "image/png"));
/// assert!(validate(&avatar, &large).is_failure());
/// ```
#[derive(Clone, Default)]
pub struct FileSchema {
    constraints: Vec<FileConstraint>,
    type_error_message: Option<String>,
}

impl FileSchema {
    pub fn new() -> Self {
        Self::default()
    }

    /// Allows at most `bytes` bytes (inclusive).
    pub fn max_size(mut self, bytes: u64) -> Self {
        self.constraints.push(FileConstraint::MaxSize {
            bytes,
            message: None,
        });
        self
    }

    /// Requires at least `bytes` bytes (inclusive).
    pub fn min_size(mut self, bytes: u64) -> Self {
        self.constraints.push(FileConstraint::MinSize {
            bytes,
            message: None,
        });
        self
    }

    /// Restricts the reported MIME type. An entry ending in `/*` matches the
    /// whole family (`image/*`).
    pub fn mime_types<I, S>(mut self, allowed: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.constraints.push(FileConstraint::MimeTypes {
            allowed: allowed.into_iter().map(Into::into).collect(),
            message: None,
        });
        self
    }

    pub fn refine<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&FileHandle) -> bool + Send + Sync + 'static,
    {
        self.constraints.push(FileConstraint::Refine {
            predicate: Arc::new(predicate),
            message: message.into(),
        });
        self
    }

    /// Sets the message of the most recently added check, or the type error
    /// message when no check was added yet.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.constraints.last_mut() {
            Some(FileConstraint::MaxSize { message: m, .. })
            | Some(FileConstraint::MinSize { message: m, .. })
            | Some(FileConstraint::MimeTypes { message: m, .. }) => *m = Some(message),
            Some(FileConstraint::Refine { message: m, .. }) => *m = message,
            None => self.type_error_message = Some(message),
        }
        self
    }

    pub fn validate(&self, value: &Value, path: &FieldPath) -> Validation<FileHandle, FieldErrors> {
        let Some(file) = value.as_file() else {
            let message = self
                .type_error_message
                .clone()
                .unwrap_or_else(|| "expected file".to_string());
            return Validation::Failure(FieldErrors::single(
                FieldError::new(path.clone(), message)
                    .with_code("invalid_type")
                    .with_got(value.type_name())
                    .with_expected("file"),
            ));
        };

        self.check(file, path)
    }

    /// Runs the checks against an already extracted handle.
    fn check(&self, file: &FileHandle, path: &FieldPath) -> Validation<FileHandle, FieldErrors> {
        let errors: Vec<FieldError> = self
            .constraints
            .iter()
            .filter_map(|c| check_file(c, file, path))
            .collect();

        finish(errors, || file.clone())
    }
}

impl SchemaLike for FileSchema {
    type Output = FileHandle;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<FileHandle, FieldErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.validate(value, path).map(Value::File)
    }
}

fn mime_matches(allowed: &str, actual: &str) -> bool {
    match allowed.strip_suffix("/*") {
        Some(family) => actual
            .split_once('/')
            .is_some_and(|(actual_family, _)| actual_family.eq_ignore_ascii_case(family)),
        None => allowed.eq_ignore_ascii_case(actual),
    }
}

fn check_file(constraint: &FileConstraint, file: &FileHandle, path: &FieldPath) -> Option<FieldError> {
    match constraint {
        FileConstraint::MaxSize { bytes, message } => (file.size > *bytes).then(|| {
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("file must be at most {} bytes", bytes));
            FieldError::new(path.clone(), msg)
                .with_code("max_size")
                .with_expected(format!("at most {} bytes", bytes))
                .with_got(format!("{} bytes", file.size))
        }),
        FileConstraint::MinSize { bytes, message } => (file.size < *bytes).then(|| {
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("file must be at least {} bytes", bytes));
            FieldError::new(path.clone(), msg)
                .with_code("min_size")
                .with_expected(format!("at least {} bytes", bytes))
                .with_got(format!("{} bytes", file.size))
        }),
        FileConstraint::MimeTypes { allowed, message } => {
            if allowed.iter().any(|a| mime_matches(a, &file.mime_type)) {
                return None;
            }
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("file type must be one of {}", allowed.join(", ")));
            Some(
                FieldError::new(path.clone(), msg)
                    .with_code("mime_type")
                    .with_expected(allowed.join(", "))
                    .with_got(file.mime_type.clone()),
            )
        }
        FileConstraint::Refine { predicate, message } => {
            (!predicate(file)).then(|| FieldError::new(path.clone(), message.clone()).with_code("custom"))
        }
    }
}

#[derive(Clone)]
enum FileListConstraint {
    MinFiles { min: usize, message: Option<String> },
    MaxFiles { max: usize, message: Option<String> },
    MaxFileSize { bytes: u64, message: Option<String> },
    Refine { predicate: ListPredicate, message: String },
}

/// A schema for the file list a file input produces.
#[derive(Clone, Default)]
pub struct FileListSchema {
    constraints: Vec<FileListConstraint>,
    type_error_message: Option<String>,
}

impl FileListSchema {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn min_files(mut self, min: usize) -> Self {
        self.constraints
            .push(FileListConstraint::MinFiles { min, message: None });
        self
    }

    pub fn max_files(mut self, max: usize) -> Self {
        self.constraints
            .push(FileListConstraint::MaxFiles { max, message: None });
        self
    }

    /// Limits every file in the list to `bytes` bytes. Each oversized file
    /// reports at its own index.
    pub fn max_file_size(mut self, bytes: u64) -> Self {
        self.constraints.push(FileListConstraint::MaxFileSize {
            bytes,
            message: None,
        });
        self
    }

    pub fn refine<F>(mut self, predicate: F, message: impl Into<String>) -> Self
    where
        F: Fn(&[FileHandle]) -> bool + Send + Sync + 'static,
    {
        self.constraints.push(FileListConstraint::Refine {
            predicate: Arc::new(predicate),
            message: message.into(),
        });
        self
    }

    pub fn error(mut self, message: impl Into<String>) -> Self {
        let message = message.into();
        match self.constraints.last_mut() {
            Some(FileListConstraint::MinFiles { message: m, .. })
            | Some(FileListConstraint::MaxFiles { message: m, .. })
            | Some(FileListConstraint::MaxFileSize { message: m, .. }) => *m = Some(message),
            Some(FileListConstraint::Refine { message: m, .. }) => *m = message,
            None => self.type_error_message = Some(message),
        }
        self
    }

    /// Transforms the list into its first file.
    ///
    /// The result outputs a single [`FileHandle`]; an empty list fails with
    /// `a file is required`. Chain file checks with
    /// [`FirstFileSchema::then_check`].
    pub fn first(self) -> FirstFileSchema {
        FirstFileSchema {
            list: self,
            file: None,
            missing_message: None,
        }
    }

    pub fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Vec<FileHandle>, FieldErrors> {
        let Some(files) = value.as_file_list() else {
            let message = self
                .type_error_message
                .clone()
                .unwrap_or_else(|| "expected file list".to_string());
            return Validation::Failure(FieldErrors::single(
                FieldError::new(path.clone(), message)
                    .with_code("invalid_type")
                    .with_got(value.type_name())
                    .with_expected("file list"),
            ));
        };

        let mut errors = Vec::new();
        for constraint in &self.constraints {
            check_list(constraint, files, path, &mut errors);
        }

        finish(errors, || files.to_vec())
    }
}

impl SchemaLike for FileListSchema {
    type Output = Vec<FileHandle>;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<Vec<FileHandle>, FieldErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.validate(value, path).map(Value::FileList)
    }
}

fn check_list(
    constraint: &FileListConstraint,
    files: &[FileHandle],
    path: &FieldPath,
    errors: &mut Vec<FieldError>,
) {
    match constraint {
        FileListConstraint::MinFiles { min, message } if files.len() < *min => {
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("select at least {} file(s)", min));
            errors.push(
                FieldError::new(path.clone(), msg)
                    .with_code("min_files")
                    .with_expected(format!("at least {} files", min))
                    .with_got(format!("{} files", files.len())),
            );
        }
        FileListConstraint::MaxFiles { max, message } if files.len() > *max => {
            let msg = message
                .clone()
                .unwrap_or_else(|| format!("select at most {} file(s)", max));
            errors.push(
                FieldError::new(path.clone(), msg)
                    .with_code("max_files")
                    .with_expected(format!("at most {} files", max))
                    .with_got(format!("{} files", files.len())),
            );
        }
        FileListConstraint::MaxFileSize { bytes, message } => {
            for (index, file) in files.iter().enumerate().filter(|(_, f)| f.size > *bytes) {
                let msg = message
                    .clone()
                    .unwrap_or_else(|| format!("file must be at most {} bytes", bytes));
                errors.push(
                    FieldError::new(path.push_index(index), msg)
                        .with_code("max_size")
                        .with_expected(format!("at most {} bytes", bytes))
                        .with_got(format!("{} bytes", file.size)),
                );
            }
        }
        FileListConstraint::Refine { predicate, message } if !predicate(files) => {
            errors.push(FieldError::new(path.clone(), message.clone()).with_code("custom"));
        }
        _ => {}
    }
}

/// A file list reduced to its first file, optionally checked as a file.
///
/// Built by [`FileListSchema::first`].
///
/// # Example
///
/// ```rust
/// use formcheck::{validate, FileHandle, Schema, Value};
///
/// let avatar = Schema::file_list()
///     .first()
///     .then_check(Schema::file().max_size(5 * 1024 * 1024));
///
/// let picked = Value::from(vec![FileHandle::new("me.png", 2048, "image/png")]);
/// assert_eq!(validate(&avatar, &picked).into_result().unwrap().name, "me.png");
///
/// assert!(validate(&avatar, &Value::from(Vec::<FileHandle>::new())).is_failure());
/// ```
#[derive(Clone)]
pub struct FirstFileSchema {
    list: FileListSchema,
    file: Option<FileSchema>,
    missing_message: Option<String>,
}

impl FirstFileSchema {
    /// Checks the extracted file against `file`.
    ///
    /// These checks run on the transformed value, so they form their own
    /// node: they only run once the list checks passed.
    pub fn then_check(mut self, file: FileSchema) -> Self {
        self.file = Some(file);
        self
    }

    /// Overrides the message reported for an empty list.
    pub fn error(mut self, message: impl Into<String>) -> Self {
        self.missing_message = Some(message.into());
        self
    }

    pub fn validate(&self, value: &Value, path: &FieldPath) -> Validation<FileHandle, FieldErrors> {
        let files = match self.list.validate(value, path) {
            Validation::Success(files) => files,
            Validation::Failure(errors) => return Validation::Failure(errors),
        };

        let Some(first) = files.into_iter().next() else {
            let message = self
                .missing_message
                .clone()
                .unwrap_or_else(|| "a file is required".to_string());
            return Validation::Failure(FieldErrors::single(
                FieldError::new(path.clone(), message)
                    .with_code("file_required")
                    .with_expected("one file")
                    .with_got("0 files"),
            ));
        };

        match &self.file {
            Some(schema) => schema.check(&first, path),
            None => Validation::Success(first),
        }
    }
}

impl SchemaLike for FirstFileSchema {
    type Output = FileHandle;

    fn validate(&self, value: &Value, path: &FieldPath) -> Validation<FileHandle, FieldErrors> {
        self.validate(value, path)
    }

    fn validate_to_value(&self, value: &Value, path: &FieldPath) -> Validation<Value, FieldErrors> {
        self.validate(value, path).map(Value::File)
    }
}
