use plotters::drawing::DrawingAreaErrorKind;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum PlotError {
    #[error("Data format error in {file}{}: {message}", sample_suffix(.sample))]
    DataFormatError {
        file: String,
        sample: Option<usize>,
        message: String,
    },

    #[error("Invalid column range {start}-{end}: available columns are 0-{}", .available.saturating_sub(1))]
    RangeError {
        start: usize,
        end: usize,
        available: usize,
    },

    #[error("Schema mismatch for '{label}': expected columns [{}], found [{}]", .expected.join(", "), .found.join(", "))]
    SchemaMismatchError {
        label: String,
        expected: Vec<String>,
        found: Vec<String>,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("JSON parsing error: {0}")]
    JsonError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("Image encoding error: {0}")]
    ImageError(#[from] image::ImageError),

    #[error("Rendering error: {message}")]
    RenderError { message: String },

    #[error("Configuration error in {field}: {message}")]
    ConfigValidationError { field: String, message: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Validation error: {message}")]
    ValidationError { message: String },
}

fn sample_suffix(sample: &Option<usize>) -> String {
    match sample {
        Some(index) => format!(" (sample {})", index),
        None => String::new(),
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Input,
    Configuration,
    Rendering,
    System,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl PlotError {
    pub fn data_format(file: impl Into<String>, sample: Option<usize>, message: impl Into<String>) -> Self {
        PlotError::DataFormatError {
            file: file.into(),
            sample,
            message: message.into(),
        }
    }

    pub fn category(&self) -> ErrorCategory {
        match self {
            PlotError::DataFormatError { .. }
            | PlotError::JsonError(_)
            | PlotError::RangeError { .. }
            | PlotError::SchemaMismatchError { .. }
            | PlotError::ValidationError { .. } => ErrorCategory::Input,
            PlotError::ConfigValidationError { .. }
            | PlotError::InvalidConfigValueError { .. }
            | PlotError::MissingConfigError { .. } => ErrorCategory::Configuration,
            PlotError::RenderError { .. } | PlotError::ImageError(_) => ErrorCategory::Rendering,
            PlotError::IoError(_) | PlotError::CsvError(_) => ErrorCategory::System,
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self.category() {
            ErrorCategory::Input | ErrorCategory::Configuration => ErrorSeverity::Medium,
            ErrorCategory::Rendering => ErrorSeverity::High,
            ErrorCategory::System => ErrorSeverity::Critical,
        }
    }

    pub fn recovery_suggestion(&self) -> String {
        match self {
            PlotError::DataFormatError { .. } | PlotError::JsonError(_) => {
                "Check that the recording was exported by the capture tool and every frame carries all finger/axis values".to_string()
            }
            PlotError::RangeError { available, .. } => format!(
                "Pick a column range within 0-{} with start <= end",
                available.saturating_sub(1)
            ),
            PlotError::SchemaMismatchError { .. } => {
                "Only compare recordings captured with the same sensor layout".to_string()
            }
            PlotError::IoError(_) => {
                "Verify the input path exists and the output directory is writable".to_string()
            }
            PlotError::CsvError(_) => "Verify the export directory is writable".to_string(),
            PlotError::ImageError(_) | PlotError::RenderError { .. } => {
                "Check the plot dimensions in the configuration and that system fonts are installed".to_string()
            }
            PlotError::ConfigValidationError { field, .. }
            | PlotError::InvalidConfigValueError { field, .. }
            | PlotError::MissingConfigError { field } => {
                format!("Review the '{}' entry of the configuration file", field)
            }
            PlotError::ValidationError { .. } => "Review the command arguments".to_string(),
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self {
            PlotError::DataFormatError { file, sample: Some(index), message } => {
                format!("Recording '{}' is malformed at sample {}: {}", file, index, message)
            }
            PlotError::DataFormatError { file, sample: None, message } => {
                format!("Recording '{}' is malformed: {}", file, message)
            }
            PlotError::IoError(e) => format!("File access failed: {}", e),
            other => other.to_string(),
        }
    }
}

impl<E> From<DrawingAreaErrorKind<E>> for PlotError
where
    E: std::error::Error + Send + Sync,
{
    fn from(err: DrawingAreaErrorKind<E>) -> Self {
        PlotError::RenderError {
            message: err.to_string(),
        }
    }
}

pub type Result<T> = std::result::Result<T, PlotError>;

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_data_format_message_names_sample() {
        let err = PlotError::data_format("wave.json", Some(7), "missing key 'Thumb.AccX'");
        let text = err.to_string();
        assert!(text.contains("wave.json"));
        assert!(text.contains("sample 7"));
        assert!(text.contains("Thumb.AccX"));
        assert_eq!(err.category(), ErrorCategory::Input);
    }

    #[test]
    fn test_range_error_reports_available_columns() {
        let err = PlotError::RangeError { start: 30, end: 40, available: 36 };
        assert_eq!(
            err.to_string(),
            "Invalid column range 30-40: available columns are 0-35"
        );
    }

    #[test]
    fn test_severity_ordering() {
        let io = PlotError::IoError(std::io::Error::new(std::io::ErrorKind::NotFound, "gone"));
        let input = PlotError::ValidationError { message: "bad".to_string() };
        assert!(io.severity() > input.severity());
    }
}
