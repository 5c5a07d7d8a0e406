//! Status line text and the loading spinner.

const SPINNER_FRAMES: [char; 4] = ['-', '\\', '|', '/'];

/// Everything the status line reports about a screen.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct StatusInfo<'a> {
    pub name: Option<&'a str>,
    pub top: usize,
    pub len: usize,
    pub x: usize,
    pub loading: bool,
    pub unlimited: bool,
    pub following: bool,
    pub search: Option<&'a str>,
    pub mouse: bool,
}

impl StatusInfo<'_> {
    /// `<name> lines:TOP/TOTAL x:X (loading...! following) search[TERM] [MOUSE]`
    pub fn text(&self) -> String {
        let mut text = String::new();
        if let Some(name) = self.name {
            text.push('<');
            text.push_str(name);
            text.push('>');
        }
        text.push_str(&format!(" lines:{}/{}", self.top + 1, self.len));
        if self.x > 0 {
            text.push_str(&format!(" x:{}", self.x));
        }
        if self.loading {
            text.push_str(" (loading...");
            if self.unlimited {
                text.push('!');
            }
            if self.following {
                text.push_str(" following");
            }
            text.push_str(") ");
        }
        if let Some(term) = self.search {
            text.push_str(&format!(" search[{term}]"));
        }
        if self.mouse {
            text.push_str(" [MOUSE]");
        }
        text
    }
}

/// Liveness indicator drawn at the right edge while a source is still loading.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct Spinner {
    frame: usize,
}

impl Spinner {
    pub fn advance(&mut self) {
        self.frame = (self.frame + 1) % SPINNER_FRAMES.len();
    }

    pub fn glyph(&self) -> char {
        SPINNER_FRAMES[self.frame]
    }
}

/// Fit `text` into `cols`, placing `spinner` in the last column when given.
pub fn compose_status(text: &str, cols: u16, spinner: Option<char>) -> String {
    let cols = cols as usize;
    let Some(glyph) = spinner else {
        return text.chars().take(cols).collect();
    };
    if cols == 0 {
        return String::new();
    }
    let body: String = text.chars().take(cols - 1).collect();
    let pad = cols - 1 - body.chars().count();
    let mut out = body;
    out.extend(std::iter::repeat(' ').take(pad));
    out.push(glyph);
    out
}

#[cfg(test)]
mod tests {
    use super::*;

    fn info() -> StatusInfo<'static> {
        StatusInfo {
            name: Some("app.log"),
            top: 0,
            len: 42,
            x: 0,
            loading: false,
            unlimited: false,
            following: false,
            search: None,
            mouse: false,
        }
    }

    #[test]
    fn minimal_status() {
        assert_eq!(info().text(), "<app.log> lines:1/42");
    }

    #[test]
    fn every_indicator() {
        let status = StatusInfo {
            top: 9,
            x: 4,
            loading: true,
            unlimited: true,
            following: true,
            search: Some("err"),
            mouse: true,
            ..info()
        };
        assert_eq!(
            status.text(),
            "<app.log> lines:10/42 x:4 (loading...! following)  search[err] [MOUSE]"
        );
    }

    #[test]
    fn unnamed_screen() {
        let status = StatusInfo { name: None, ..info() };
        assert_eq!(status.text(), " lines:1/42");
    }

    #[test]
    fn spinner_cycles() {
        let mut spinner = Spinner::default();
        let glyphs: Vec<char> = (0..5)
            .map(|_| {
                let g = spinner.glyph();
                spinner.advance();
                g
            })
            .collect();
        assert_eq!(glyphs, vec!['-', '\\', '|', '/', '-']);
    }

    #[test]
    fn spinner_sits_at_the_right_edge() {
        assert_eq!(compose_status("abc", 6, Some('|')), "abc  |");
        assert_eq!(compose_status("abcdefgh", 4, Some('/')), "abc/");
        assert_eq!(compose_status("abcdefgh", 4, None), "abcd");
    }
}
