//! Text-mode virtual display for the locker front panel.
//!
//! The physical panel is a small graphics screen; this module models it as a
//! grid of ASCII text lines so the controller can be exercised without the
//! pixel driver. It implements [`PresentationSink`], drawing one screen per
//! [`SessionSnapshot`], and can mirror every frame to a writer (the simulator
//! prints to stdout).
//!
//! # Character Encoding - ASCII Only
//!
//! The panel font covers printable ASCII (0x20-0x7E). Control characters are
//! stripped and non-ASCII text is rejected in debug builds.
//!
//! # Examples
//!
//! ```
//! use lockbox_core::SessionSnapshot;
//! use lockbox_engine::VirtualDisplay;
//! use lockbox_hardware::PresentationSink;
//!
//! let mut display = VirtualDisplay::new(5, 20);
//! display.render(&SessionSnapshot::default()).unwrap();
//!
//! assert_eq!(display.get_line(0).unwrap().trim_end(), "Drawer is empty");
//! ```

use std::fmt;
use std::io::Write;

use lockbox_core::{AccessState, Error, Result, SessionSnapshot, constants::CODE_LENGTH};
use lockbox_hardware::{HardwareError, PresentationSink};

/// Default number of text lines.
const DEFAULT_LINES: usize = 5;

/// Default number of characters per line.
const DEFAULT_COLUMNS: usize = 20;

/// Text alignment options for display lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Alignment {
    /// Text starts at column 0, padded with spaces on the right.
    Left,
    /// Text centered with equal padding on both sides (extra space on right if odd).
    Center,
    /// Text ends at the last column, padded with spaces on the left.
    Right,
}

/// Virtual text display.
///
/// # Thread Safety
///
/// Not synchronized. The state machine owns its presentation sink, so no
/// sharing is needed.
pub struct VirtualDisplay {
    /// Number of lines in the display.
    lines: usize,

    /// Number of columns per line.
    columns: usize,

    /// Current display buffer, each line padded to `columns`.
    buffer: Vec<String>,

    /// Where finished frames are mirrored, if anywhere.
    output: Option<Box<dyn Write + Send>>,
}

impl VirtualDisplay {
    /// Create a blank display with the given dimensions. A display always has
    /// at least one line.
    pub fn new(lines: usize, columns: usize) -> Self {
        let lines = lines.max(1);

        Self {
            lines,
            columns,
            buffer: vec![" ".repeat(columns); lines],
            output: None,
        }
    }

    pub fn builder() -> VirtualDisplayBuilder {
        VirtualDisplayBuilder::default()
    }

    /// Set text on a specific line with left alignment.
    ///
    /// Control characters are removed, and text is truncated to fit within
    /// the column width.
    ///
    /// # Errors
    ///
    /// Returns `Error::InvalidLine` if the line index is out of bounds.
    pub fn set_line(&mut self, line: usize, text: &str) -> Result<()> {
        self.set_line_aligned(line, text, Alignment::Left)
    }

    pub fn set_line_aligned(&mut self, line: usize, text: &str, align: Alignment) -> Result<()> {
        debug_assert!(text.is_ascii(), "display text must be ASCII, got {text:?}");

        if line >= self.lines {
            return Err(Error::InvalidLine {
                line,
                max: self.lines - 1,
            });
        }

        let sanitized = sanitize_text(text);
        self.buffer[line] = align_text(&sanitized, self.columns, align);
        Ok(())
    }

    /// Blank every line.
    pub fn clear(&mut self) {
        for line in &mut self.buffer {
            *line = " ".repeat(self.columns);
        }
    }

    /// Replace the whole screen with the one for `snapshot`.
    pub fn show_snapshot(&mut self, snapshot: &SessionSnapshot) -> Result<()> {
        self.clear();
        for (index, (text, align)) in screen_for(snapshot).into_iter().enumerate() {
            self.set_line_aligned(index, &text, align)?;
        }
        Ok(())
    }

    pub fn get_line(&self, line: usize) -> Result<&str> {
        if line >= self.lines {
            return Err(Error::InvalidLine {
                line,
                max: self.lines - 1,
            });
        }
        Ok(&self.buffer[line])
    }

    pub fn get_all_lines(&self) -> Vec<&str> {
        self.buffer.iter().map(String::as_str).collect()
    }

    pub fn dimensions(&self) -> (usize, usize) {
        (self.lines, self.columns)
    }

    fn write_frame(&mut self) -> std::io::Result<()> {
        let frame = self.to_string();
        if let Some(out) = self.output.as_mut() {
            out.write_all(frame.as_bytes())?;
            out.flush()?;
        }
        Ok(())
    }
}

impl fmt::Debug for VirtualDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("VirtualDisplay")
            .field("lines", &self.lines)
            .field("columns", &self.columns)
            .field("buffer", &self.buffer)
            .field("mirrored", &self.output.is_some())
            .finish()
    }
}

/// Draws the screen inside a frame, one buffer line per row.
impl fmt::Display for VirtualDisplay {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let border = format!("+{}+", "-".repeat(self.columns));
        writeln!(f, "{border}")?;
        for line in &self.buffer {
            writeln!(f, "|{line}|")?;
        }
        writeln!(f, "{border}")
    }
}

impl PresentationSink for VirtualDisplay {
    fn render(&mut self, snapshot: &SessionSnapshot) -> lockbox_hardware::Result<()> {
        self.show_snapshot(snapshot)
            .map_err(|e| HardwareError::other(e.to_string()))?;
        self.write_frame()
            .map_err(|e| HardwareError::communication(format!("display output: {e}")))
    }
}

/// Builder for constructing `VirtualDisplay` instances.
///
/// # Examples
///
/// ```
/// use lockbox_engine::VirtualDisplay;
///
/// let display = VirtualDisplay::builder()
///     .with_size(4, 16)
///     .with_output(std::io::sink())
///     .build();
///
/// assert_eq!(display.dimensions(), (4, 16));
/// ```
pub struct VirtualDisplayBuilder {
    lines: usize,
    columns: usize,
    output: Option<Box<dyn Write + Send>>,
}

impl VirtualDisplayBuilder {
    pub fn with_size(mut self, lines: usize, columns: usize) -> Self {
        self.lines = lines;
        self.columns = columns;
        self
    }

    /// Mirror every rendered frame to `output`.
    pub fn with_output(mut self, output: impl Write + Send + 'static) -> Self {
        self.output = Some(Box::new(output));
        self
    }

    pub fn build(self) -> VirtualDisplay {
        let mut display = VirtualDisplay::new(self.lines, self.columns);
        display.output = self.output;
        display
    }
}

impl Default for VirtualDisplayBuilder {
    fn default() -> Self {
        Self {
            lines: DEFAULT_LINES,
            columns: DEFAULT_COLUMNS,
            output: None,
        }
    }
}

/// Screen contents for a snapshot, top line first.
///
/// The pending code is shown masked: one `*` per typed digit, `_` for the
/// remaining positions.
pub fn screen_for(snapshot: &SessionSnapshot) -> Vec<(String, Alignment)> {
    let left = |text: &str| (text.to_string(), Alignment::Left);
    let center = |text: &str| (text.to_string(), Alignment::Center);

    match snapshot.state {
        AccessState::Idle if snapshot.occupied => {
            vec![left("Drawer is occupied"), left(""), center("A. pick up")]
        }
        AccessState::Idle => vec![left("Drawer is empty"), left(""), center("A. store")],
        AccessState::EnteringCode => {
            let typed = snapshot.pending_len.min(CODE_LENGTH);
            let masked = format!("{}{}", "*".repeat(typed), "_".repeat(CODE_LENGTH - typed));
            vec![
                left("Type your"),
                left("6-digits code"),
                left(""),
                center(&masked),
            ]
        }
        AccessState::Actuating => vec![left(""), center("Please wait...")],
        AccessState::Open => vec![left("Locker is now"), left("open")],
        AccessState::Closed => vec![
            left("Locker is now"),
            left("closed"),
            left(""),
            left("A. Done"),
            left("B. Open again"),
        ],
        AccessState::InvalidCode => vec![left(""), center("Invalid code")],
        AccessState::LockedOut => vec![left(""), center("Too many"), center("failed attempts")],
    }
}

/// Truncate text to a maximum number of characters.
pub fn truncate_text(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}

/// Pad or truncate text to exactly `width` characters.
pub fn align_text(text: &str, width: usize, alignment: Alignment) -> String {
    let char_count = text.chars().count();

    if char_count >= width {
        return truncate_text(text, width);
    }

    let padding = width - char_count;

    match alignment {
        Alignment::Left => format!("{}{}", text, " ".repeat(padding)),
        Alignment::Right => format!("{}{}", " ".repeat(padding), text),
        Alignment::Center => {
            let left_pad = padding / 2;
            let right_pad = padding - left_pad;
            format!("{}{}{}", " ".repeat(left_pad), text, " ".repeat(right_pad))
        }
    }
}

fn sanitize_text(text: &str) -> String {
    text.chars()
        .filter(|c| !c.is_control())
        .collect::<String>()
        .trim()
        .to_string()
}
