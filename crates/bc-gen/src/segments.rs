//! Output segment buffers.
//!
//! Grounded on `parse.py`'s `self.segments` dict and `add`/`add_pretty`
//! methods: generated instructions accumulate into one of three named
//! buffers as they're produced, and get concatenated into the final
//! assembly text only once the whole translation unit has been walked.

/// Which NASM segment a generated line belongs in.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Segment {
    Text,
    Data,
    Bss,
}

#[derive(Default)]
pub struct Segments {
    text: Vec<String>,
    data: Vec<String>,
    bss: Vec<String>,
}

impl Segments {
    pub fn new() -> Self {
        Self::default()
    }

    fn buffer_mut(&mut self, segment: Segment) -> &mut Vec<String> {
        match segment {
            Segment::Text => &mut self.text,
            Segment::Data => &mut self.data,
            Segment::Bss => &mut self.bss,
        }
    }

    pub fn push(&mut self, segment: Segment, line: impl Into<String>) {
        self.buffer_mut(segment).push(line.into());
    }

    /// Appends a blank line to `segment` unless it's already blank or
    /// empty — keeps generated assembly visually grouped by statement
    /// without runs of blank lines.
    pub fn push_pretty(&mut self, segment: Segment) {
        let buf = self.buffer_mut(segment);
        if buf.last().is_some_and(|last| !last.is_empty()) {
            buf.push(String::new());
        }
    }

    pub fn text(&self) -> &[String] {
        &self.text
    }
    pub fn data(&self) -> &[String] {
        &self.data
    }
    pub fn bss(&self) -> &[String] {
        &self.bss
    }
}
