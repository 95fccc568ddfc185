//! UI/backend events and error modeling for the scanner GUI controller.

pub enum UiEvent {
    /// A fresh backend state was written into the feed handle.
    StatePushed,
    /// Periodic refresh timer fired.
    RefreshTick,
    ScanCompleted {
        barcode: String,
        result: Result<(), UiError>,
    },
    ProcessCompleted(Result<(), UiError>),
    ClearCompleted(Result<(), UiError>),
    Info(String),
    Error(UiError),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum UiErrorContext {
    BackendStartup,
    Scan,
    ProcessBatch,
    ClearBatch,
}

#[derive(Debug, Clone)]
pub struct UiError {
    context: UiErrorContext,
    message: String,
}

impl UiError {
    pub fn from_message(context: UiErrorContext, message: impl Into<String>) -> Self {
        Self {
            context,
            message: message.into(),
        }
    }

    pub fn context(&self) -> UiErrorContext {
        self.context
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// Text shown in the error banner. The remote failure's message is kept
    /// verbatim behind a per-command prefix.
    pub fn banner_text(&self) -> String {
        match self.context {
            UiErrorContext::Scan => format!("Error: {}", self.message),
            UiErrorContext::ProcessBatch => format!("Error processing batch: {}", self.message),
            UiErrorContext::ClearBatch => format!("Error clearing batch: {}", self.message),
            UiErrorContext::BackendStartup => format!("Error: {}", self.message),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn banner_text_prefixes_by_command_context() {
        let scan = UiError::from_message(UiErrorContext::Scan, "no match");
        assert_eq!(scan.banner_text(), "Error: no match");

        let process = UiError::from_message(UiErrorContext::ProcessBatch, "backend down");
        assert_eq!(process.banner_text(), "Error processing batch: backend down");

        let clear = UiError::from_message(UiErrorContext::ClearBatch, "backend down");
        assert_eq!(clear.banner_text(), "Error clearing batch: backend down");
    }
}
