//! Number format types

/// Number format for cell display
#[derive(Debug, Clone, PartialEq, Eq, Hash, Default)]
pub enum NumberFormat {
    /// General format (default)
    #[default]
    General,

    /// Built-in format by ID
    BuiltIn(u32),

    /// Custom format string
    Custom(String),
}

/// Which parts of a point in time a date/time format displays
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DateTimeKind {
    /// Day, month or year only
    Date,
    /// Hours, minutes or seconds only
    Time,
    /// Both
    DateTime,
}

impl NumberFormat {
    /// General format
    pub const GENERAL: Self = NumberFormat::General;

    /// 0 - General
    pub const ID_GENERAL: u32 = 0;
    /// 3 - #,##0
    pub const ID_NUMBER_SEP: u32 = 3;
    /// 4 - #,##0.00
    pub const ID_NUMBER_SEP_DEC2: u32 = 4;
    /// 10 - 0.00%
    pub const ID_PERCENT_DEC2: u32 = 10;
    /// 14 - mm-dd-yy
    pub const ID_DATE_SHORT: u32 = 14;
    /// 22 - m/d/yy h:mm
    pub const ID_DATETIME: u32 = 22;

    /// Create a number format from a format string
    pub fn from_string<S: Into<String>>(format: S) -> Self {
        let format = format.into();
        if format.eq_ignore_ascii_case("general") {
            NumberFormat::General
        } else {
            NumberFormat::Custom(format)
        }
    }

    /// Create a built-in format by ID
    pub fn from_id(id: u32) -> Self {
        if id == Self::ID_GENERAL {
            NumberFormat::General
        } else {
            NumberFormat::BuiltIn(id)
        }
    }

    /// Get the format string
    pub fn format_string(&self) -> &str {
        match self {
            NumberFormat::General => "General",
            NumberFormat::BuiltIn(id) => Self::builtin_format_string(*id),
            NumberFormat::Custom(s) => s,
        }
    }

    /// Get built-in format string by ID
    fn builtin_format_string(id: u32) -> &'static str {
        match id {
            0 => "General",
            1 => "0",
            2 => "0.00",
            3 => "#,##0",
            4 => "#,##0.00",
            9 => "0%",
            10 => "0.00%",
            11 => "0.00E+00",
            12 => "# ?/?",
            13 => "# ??/??",
            14 => "mm-dd-yy",
            15 => "d-mmm-yy",
            16 => "d-mmm",
            17 => "mmm-yy",
            18 => "h:mm AM/PM",
            19 => "h:mm:ss AM/PM",
            20 => "h:mm",
            21 => "h:mm:ss",
            22 => "m/d/yy h:mm",
            37 => "#,##0 ;(#,##0)",
            38 => "#,##0 ;[Red](#,##0)",
            39 => "#,##0.00;(#,##0.00)",
            40 => "#,##0.00;[Red](#,##0.00)",
            45 => "mm:ss",
            46 => "[h]:mm:ss",
            47 => "mmss.0",
            48 => "##0.0E+0",
            49 => "@",
            _ => "General",
        }
    }

    /// Check if this is a date/time format
    pub fn is_date_format(&self) -> bool {
        self.date_time_kind().is_some()
    }

    /// Classify a date/time format, or `None` for any other format.
    ///
    /// Custom codes are inspected outside quoted literals, escaped characters
    /// and `[...]` sections, so `"Day "0` or `[Red]0.00` are not dates.
    pub fn date_time_kind(&self) -> Option<DateTimeKind> {
        match self {
            NumberFormat::General => None,
            NumberFormat::BuiltIn(id) => match id {
                14..=17 => Some(DateTimeKind::Date),
                18..=21 | 45..=47 => Some(DateTimeKind::Time),
                22 => Some(DateTimeKind::DateTime),
                _ => None,
            },
            NumberFormat::Custom(s) => classify_custom(s),
        }
    }

    /// Whether the visible section of the format contains a percent sign
    pub fn is_percent(&self) -> bool {
        visible_tokens(self.format_string()).contains('%')
    }
}

/// Format code with quoted literals, escapes and bracket sections removed.
///
/// Elapsed-time brackets (`[h]`, `[mm]`, `[ss]`) are kept as their letters.
fn visible_tokens(code: &str) -> String {
    let mut out = String::with_capacity(code.len());
    let mut chars = code.chars();
    while let Some(c) = chars.next() {
        match c {
            '"' => {
                for q in chars.by_ref() {
                    if q == '"' {
                        break;
                    }
                }
            }
            '\\' | '_' | '*' => {
                chars.next();
            }
            '[' => {
                let mut inner = String::new();
                for q in chars.by_ref() {
                    if q == ']' {
                        break;
                    }
                    inner.push(q);
                }
                let lower = inner.to_ascii_lowercase();
                if !lower.is_empty() && lower.chars().all(|c| matches!(c, 'h' | 'm' | 's')) {
                    out.push_str(&lower);
                }
            }
            _ => out.push(c.to_ascii_lowercase()),
        }
    }
    out
}

fn classify_custom(code: &str) -> Option<DateTimeKind> {
    if code.eq_ignore_ascii_case("general") {
        return None;
    }
    let tokens: Vec<char> = visible_tokens(code).chars().collect();
    let mut has_date = false;
    let mut has_time = false;

    for (i, &c) in tokens.iter().enumerate() {
        match c {
            'y' | 'd' => has_date = true,
            'h' | 's' => has_time = true,
            'm' => {
                if is_minute(&tokens, i) {
                    has_time = true;
                } else {
                    has_date = true;
                }
            }
            _ => {}
        }
    }

    match (has_date, has_time) {
        (true, true) => Some(DateTimeKind::DateTime),
        (true, false) => Some(DateTimeKind::Date),
        (false, true) => Some(DateTimeKind::Time),
        (false, false) => None,
    }
}

/// An `m` directly after an hour or directly before seconds means minutes.
fn is_minute(tokens: &[char], at: usize) -> bool {
    let before = tokens[..at]
        .iter()
        .rev()
        .find(|c| c.is_ascii_alphabetic() && **c != 'm');
    let after = tokens[at..]
        .iter()
        .find(|c| c.is_ascii_alphabetic() && **c != 'm');
    matches!(before, Some('h')) || matches!(after, Some('s'))
}
