use crate::adapter::Output;
use std::sync::Arc;

/// Literal text. Has no node of its own; the parent splices it in.
pub(crate) struct TextInstance {
    text: Arc<str>,
    previous: Option<Arc<str>>,
}

impl TextInstance {
    pub(crate) fn new(text: Arc<str>) -> Self {
        Self {
            text,
            previous: None,
        }
    }

    pub(crate) fn begin(&mut self, text: Arc<str>) {
        self.previous = Some(std::mem::replace(&mut self.text, text));
    }

    pub(crate) fn settle(&mut self) {
        self.previous = None;
    }

    pub(crate) fn revert(&mut self) {
        if let Some(text) = self.previous.take() {
            self.text = text;
        }
    }

    pub(crate) fn output(&self) -> Output {
        Output::Text(self.text.clone())
    }
}
