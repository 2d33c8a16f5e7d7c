use photobox_core::constants::BYTES_PER_MB;
use photobox_core::IngestLimits;
use photobox_storage::{LogicalName, StorageError};
use std::fmt::{Display, Formatter, Result as FmtResult};

use crate::upload::IncomingFile;

const BYTES_PER_GB: u64 = BYTES_PER_MB * 1024;

/// Why a batch, or a file within it, was refused.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RejectionReason {
    TooManyFiles { count: usize, max: usize },
    FileTooLarge { size: u64, max: u64 },
    InvalidName(String),
}

impl Display for RejectionReason {
    fn fmt(&self, f: &mut Formatter<'_>) -> FmtResult {
        match self {
            RejectionReason::TooManyFiles { max, .. } => {
                write!(f, "Too many files. Maximum is {}.", max)
            }
            RejectionReason::FileTooLarge { max, .. } => {
                write!(f, "File too large. Maximum size is {}.", format_size_limit(*max))
            }
            RejectionReason::InvalidName(detail) => write!(f, "Invalid file name: {}", detail),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("{reason}")]
pub struct Rejection {
    pub reason: RejectionReason,
    /// Position of the refused file. `None` for batch-level rejections.
    pub offending_index: Option<usize>,
    pub offending_file: Option<String>,
}

impl Rejection {
    fn batch(reason: RejectionReason) -> Self {
        Self {
            reason,
            offending_index: None,
            offending_file: None,
        }
    }

    fn file(index: usize, file: &IncomingFile, reason: RejectionReason) -> Self {
        Self {
            reason,
            offending_index: Some(index),
            offending_file: Some(file.name.clone()),
        }
    }
}

/// Outcome of admission: the names that may be processed, in batch order,
/// and the rejection to report once they have been.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Admission {
    pub admitted: Vec<LogicalName>,
    pub rejection: Option<Rejection>,
}

/// Batch admission policy. Performs no I/O.
#[derive(Debug, Clone, Copy)]
pub struct IngestValidator {
    limits: IngestLimits,
}

impl IngestValidator {
    pub fn new(limits: IngestLimits) -> Self {
        Self { limits }
    }

    /// Check the whole batch, reporting the first violation.
    pub fn validate(&self, batch: &[IncomingFile]) -> Result<(), Rejection> {
        self.check_count(batch.len())?;
        for (index, file) in batch.iter().enumerate() {
            self.check_file(index, file)?;
        }
        Ok(())
    }

    /// Decide which files of the batch may be processed.
    ///
    /// A count violation admits nothing. A file violation at index k admits
    /// files `0..k`, or nothing when atomic admission is configured.
    pub fn admit(&self, batch: &[IncomingFile]) -> Admission {
        if let Err(rejection) = self.check_count(batch.len()) {
            return Admission {
                admitted: Vec::new(),
                rejection: Some(rejection),
            };
        }

        let mut admitted = Vec::with_capacity(batch.len());
        for (index, file) in batch.iter().enumerate() {
            match self.check_file(index, file) {
                Ok(name) => admitted.push(name),
                Err(rejection) => {
                    if self.limits.atomic_admission {
                        admitted.clear();
                    }
                    return Admission {
                        admitted,
                        rejection: Some(rejection),
                    };
                }
            }
        }

        Admission {
            admitted,
            rejection: None,
        }
    }

    pub fn check_count(&self, count: usize) -> Result<(), Rejection> {
        if count > self.limits.max_files {
            return Err(Rejection::batch(RejectionReason::TooManyFiles {
                count,
                max: self.limits.max_files,
            }));
        }
        Ok(())
    }

    pub fn check_file(&self, index: usize, file: &IncomingFile) -> Result<LogicalName, Rejection> {
        if file.size > self.limits.max_file_size_bytes {
            return Err(Rejection::file(
                index,
                file,
                RejectionReason::FileTooLarge {
                    size: file.size,
                    max: self.limits.max_file_size_bytes,
                },
            ));
        }

        LogicalName::parse(&file.name).map_err(|e| {
            let detail = match e {
                StorageError::InvalidKey(detail) => detail,
                other => other.to_string(),
            };
            Rejection::file(index, file, RejectionReason::InvalidName(detail))
        })
    }
}

/// Human readable size limit: "1GB", "512MB" or "1000 bytes".
pub fn format_size_limit(bytes: u64) -> String {
    if bytes >= BYTES_PER_GB && bytes % BYTES_PER_GB == 0 {
        format!("{}GB", bytes / BYTES_PER_GB)
    } else if bytes >= BYTES_PER_MB && bytes % BYTES_PER_MB == 0 {
        format!("{}MB", bytes / BYTES_PER_MB)
    } else {
        format!("{} bytes", bytes)
    }
}
