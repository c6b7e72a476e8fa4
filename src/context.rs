//! Render context: shared resources available to content processors.
//!
//! Processors receive a [`RenderContext`] in `process()`. Most only read the
//! style sheet. Those that need external resources (downloading an image,
//! saving a chart) reach into the context for the fetcher and output
//! directories, so callers never see how those are wired.

use std::cell::Cell;

use crate::config::DocumentConfig;
use crate::fetch::Fetch;
use crate::output::OutputDirs;
use crate::style::StyleSheet;

pub struct RenderContext<'a> {
    pub config: &'a DocumentConfig,
    pub sheet: &'a StyleSheet,
    pub fetcher: &'a dyn Fetch,
    pub output: &'a OutputDirs,
    /// Running number for headings detected in free text.
    heading_counter: Cell<u32>,
}

impl<'a> RenderContext<'a> {
    pub fn new(
        config: &'a DocumentConfig,
        sheet: &'a StyleSheet,
        fetcher: &'a dyn Fetch,
        output: &'a OutputDirs,
    ) -> Self {
        Self {
            config,
            sheet,
            fetcher,
            output,
            heading_counter: Cell::new(0),
        }
    }

    /// Width of one layout frame, the room every element measures against.
    pub fn frame_width(&self) -> f32 {
        self.config.layout.frame_width()
    }

    /// `"{n}. "` when section numbering is on, advancing the counter.
    pub fn heading_prefix(&self) -> String {
        if !self.config.section_numbering {
            return String::new();
        }
        let n = self.heading_counter.get() + 1;
        self.heading_counter.set(n);
        format!("{}. ", n)
    }
}
